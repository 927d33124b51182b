use homologset_dataio::{DataIoError, Format};
use homologset_engine::{Engine, EngineConfig, EngineError};
use homologset_harness::{TestCollection, state_of, tags};

const DOGS: &str = ">dog|P1.1\nMKVL\nAAG\n>cat|P2.1\nMKIL\n>wolf|P3.1\nMK-L\n";

fn seeded() -> Result<TestCollection, Box<dyn std::error::Error>> {
    let mut tc = TestCollection::new()?;
    tc.import(Format::Fasta, DOGS, &["species", "accver"])?;
    Ok(tc)
}

// ============================================================================
// Snapshots
// ============================================================================

#[test]
fn snapshot_reload_keeps_counter() -> Result<(), Box<dyn std::error::Error>> {
    let tc = seeded()?;
    let path = tc.path("dogs.hset");
    tc.engine.save_snapshot(&path)?;

    let mut reloaded = Engine::load(&path, EngineConfig::default())?;
    assert_eq!(state_of(reloaded.set()), tc.state());
    assert_eq!(reloaded.set().max_id(), 3);

    let report = reloaded.import_str(Format::Json, r#"{"species": "fox"}"#, None)?;
    assert_eq!(report.created_ids()[0].as_str(), "XX00000004");
    Ok(())
}

#[test]
fn corrupted_snapshot_is_refused() -> Result<(), Box<dyn std::error::Error>> {
    let tc = seeded()?;
    let mut bytes = tc.engine.export_bytes(Format::Snapshot, None)?;
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;

    let mut other = TestCollection::new()?;
    let err = other.engine.import_snapshot(&bytes).unwrap_err();
    assert!(matches!(err, EngineError::DataIo(DataIoError::ChecksumMismatch)));
    assert!(other.set().is_empty());
    Ok(())
}

// ============================================================================
// Text formats through files
// ============================================================================

#[test]
fn fasta_file_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let tc = seeded()?;
    let path = tc.path("dogs.fasta");
    let header = tags(&["id", "species", "accver"]);
    tc.engine.write(&path, Some(&header))?;

    let written = std::fs::read_to_string(&path)?;
    assert!(written.starts_with(">XX00000001|dog|P1.1\nMKVLAAG\n"));
    assert!(written.ends_with(">XX00000003|wolf|P3.1\nMK-L"));

    let mut reloaded = TestCollection::new()?;
    reloaded.engine.import_file(&path, Some(&header))?;
    assert_eq!(reloaded.state(), tc.state());
    Ok(())
}

#[test]
fn csv_file_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let tc = seeded()?;
    let path = tc.path("dogs.csv");
    tc.engine.write(&path, None)?;

    let written = std::fs::read_to_string(&path)?;
    assert_eq!(written.lines().next(), Some("accver,id,sequence,species"));

    let mut reloaded = TestCollection::new()?;
    let report = reloaded.engine.import_file(&path, None)?;
    assert_eq!(report.created(), 3);
    assert_eq!(reloaded.state(), tc.state());
    Ok(())
}

#[test]
fn json_export_restricted_to_tags() -> Result<(), Box<dyn std::error::Error>> {
    let tc = seeded()?;
    let out = tc
        .engine
        .export_string(Format::Json, Some(&tags(&["id", "accver"])))?;

    let value: serde_json::Value = serde_json::from_str(&out)?;
    assert_eq!(
        value,
        serde_json::json!([
            {"id": "XX00000001", "accver": "P1.1"},
            {"id": "XX00000002", "accver": "P2.1"},
            {"id": "XX00000003", "accver": "P3.1"},
        ])
    );
    Ok(())
}

#[test]
fn load_text_file_merges_into_empty_set() -> Result<(), Box<dyn std::error::Error>> {
    let tc = seeded()?;
    let path = tc.path("dogs.json");
    tc.engine.write(&path, None)?;

    let loaded = Engine::load(&path, EngineConfig::default())?;
    assert_eq!(state_of(loaded.set()), tc.state());
    Ok(())
}

#[test]
fn semicolon_delimiter_from_config() -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::from_json_str(r#"{"csv_delimiter": ";"}"#)?;
    let mut tc = TestCollection::with_config(config)?;
    tc.import(Format::Csv, "accver;organism\nP1.1;Canis, lupus\n", &[])?;

    assert_eq!(tc.text("XX00000001", "organism").as_deref(), Some("Canis, lupus"));
    let out = tc.engine.export_string(Format::Csv, Some(&tags(&["id", "organism"])))?;
    assert_eq!(out, "id;organism\nXX00000001;Canis, lupus\n");
    Ok(())
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn malformed_fasta_is_a_format_error() -> Result<(), Box<dyn std::error::Error>> {
    let mut tc = TestCollection::new()?;
    let err = tc
        .import(Format::Fasta, ">dog\nASH\nthis is not fasta\n", &["species"])
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::DataIo(DataIoError::Format { format: Format::Fasta, .. })
    ));
    assert!(tc.set().is_empty());
    Ok(())
}

#[test]
fn unknown_extension_is_refused() -> Result<(), Box<dyn std::error::Error>> {
    let tc = seeded()?;
    let err = tc.engine.write(&tc.path("dogs.txt"), None).unwrap_err();
    assert!(matches!(err, EngineError::DataIo(DataIoError::UnknownFormat(_))));
    Ok(())
}

#[test]
fn entrez_xml_export_is_unsupported() -> Result<(), Box<dyn std::error::Error>> {
    let tc = seeded()?;
    let err = tc.engine.export_string(Format::EntrezXml, None).unwrap_err();
    assert!(matches!(err, EngineError::DataIo(DataIoError::Unsupported { .. })));
    Ok(())
}

#[test]
fn missing_file_names_the_path() -> Result<(), Box<dyn std::error::Error>> {
    let tc = TestCollection::new()?;
    let path = tc.path("absent.fasta");
    let err = Engine::load(&path, EngineConfig::default()).err().ok_or("load should fail")?;
    match err {
        EngineError::DataIo(DataIoError::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}
