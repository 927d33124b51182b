//! Binary snapshot of a whole homolog set, for fast reload.
//!
//! Layout: `HSET` magic, big-endian `u32` version, 32-byte blake3 checksum of
//! the payload, then the msgpack payload. The id counter travels with the
//! homologs so a reloaded set never reissues an id.

use homologset_core::{Homolog, HomologSet, IdPrefix};
use serde::{Deserialize, Serialize};

use crate::error::DataIoError;
use crate::format::Format;

pub const MAGIC: &[u8; 4] = b"HSET";
pub const SNAPSHOT_VERSION: u32 = 1;

const HEADER_LEN: usize = 4 + 4 + 32;

#[derive(Serialize, Deserialize)]
struct SnapshotBody {
    prefix: IdPrefix,
    max_id: u64,
    homologs: Vec<Homolog>,
}

pub fn write(set: &HomologSet) -> Result<Vec<u8>, DataIoError> {
    let body = SnapshotBody {
        prefix: set.prefix(),
        max_id: set.max_id(),
        homologs: set.iter().cloned().collect(),
    };
    let payload =
        rmp_serde::to_vec(&body).map_err(|e| DataIoError::Serialization(e.to_string()))?;
    let checksum = blake3::hash(&payload);

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&SNAPSHOT_VERSION.to_be_bytes());
    bytes.extend_from_slice(checksum.as_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

pub fn read(bytes: &[u8]) -> Result<HomologSet, DataIoError> {
    if bytes.len() < HEADER_LEN || &bytes[..4] != MAGIC {
        return Err(DataIoError::format(Format::Snapshot, "missing snapshot header"));
    }
    let version = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != SNAPSHOT_VERSION {
        return Err(DataIoError::SnapshotVersion(version));
    }
    let (checksum, payload) = bytes[8..].split_at(32);
    if blake3::hash(payload).as_bytes() != checksum {
        return Err(DataIoError::ChecksumMismatch);
    }

    let body: SnapshotBody = rmp_serde::from_slice(payload)
        .map_err(|e| DataIoError::format(Format::Snapshot, e))?;
    let set = HomologSet::from_parts(body.prefix, body.max_id, body.homologs)?;
    tracing::debug!(homologs = set.len(), max_id = set.max_id(), "read snapshot");
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use homologset_core::{AttrValue, CoreError, HomologId};

    fn sample() -> HomologSet {
        let mut set = HomologSet::with_prefix(IdPrefix::parse("HS").unwrap());
        let mut dog = Homolog::with_sequence(HomologId::parse("HS00000003").unwrap(), "ASH");
        dog.set("species", "dog".into());
        dog.set("length", AttrValue::Integer(3));
        set.add(dog).unwrap();
        set
    }

    #[test]
    fn roundtrip_keeps_counter_and_attributes() {
        let set = sample();
        let restored = read(&write(&set).unwrap()).unwrap();
        assert_eq!(restored.prefix(), set.prefix());
        assert_eq!(restored.max_id(), 3);
        assert_eq!(restored.next_id().unwrap().as_str(), "HS00000004");

        let dog = restored.get_by_id("HS00000003").unwrap();
        assert_eq!(dog.attributes(), set.get_by_id("HS00000003").unwrap().attributes());
    }

    #[test]
    fn counter_survives_even_without_members() {
        let set = HomologSet::from_parts(IdPrefix::default(), 9, Vec::new()).unwrap();
        let restored = read(&write(&set).unwrap()).unwrap();
        assert_eq!(restored.max_id(), 9);
    }

    #[test]
    fn corrupted_payload_is_detected() {
        let mut bytes = write(&sample()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        assert!(matches!(read(&bytes), Err(DataIoError::ChecksumMismatch)));
    }

    #[test]
    fn foreign_bytes_are_a_format_error() {
        assert!(matches!(
            read(b"not a snapshot at all, just text....................."),
            Err(DataIoError::Format { format: Format::Snapshot, .. })
        ));
        assert!(read(b"HSET").is_err());
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut bytes = write(&sample()).unwrap();
        bytes[7] = 9;
        assert!(matches!(read(&bytes), Err(DataIoError::SnapshotVersion(9))));
    }

    #[test]
    fn oversized_counter_is_refused_on_load() {
        let body = SnapshotBody {
            prefix: IdPrefix::default(),
            max_id: u64::MAX,
            homologs: Vec::new(),
        };
        let payload = rmp_serde::to_vec(&body).unwrap();
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&SNAPSHOT_VERSION.to_be_bytes());
        bytes.extend_from_slice(blake3::hash(&payload).as_bytes());
        bytes.extend_from_slice(&payload);

        assert!(matches!(
            read(&bytes),
            Err(DataIoError::Core(CoreError::IdSpaceExhausted(_)))
        ));
    }
}
