use std::path::Path;

use crate::error::DataIoError;

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> DataIoError + '_ {
    move |source| DataIoError::Io {
        path: path.to_path_buf(),
        source,
    }
}

pub fn read_text(path: &Path) -> Result<String, DataIoError> {
    std::fs::read_to_string(path).map_err(io_error(path))
}

pub fn read_bytes(path: &Path) -> Result<Vec<u8>, DataIoError> {
    std::fs::read(path).map_err(io_error(path))
}

pub fn write_text(path: &Path, text: &str) -> Result<(), DataIoError> {
    std::fs::write(path, text).map_err(io_error(path))
}

pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), DataIoError> {
    std::fs::write(path, bytes).map_err(io_error(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("set.fasta");
        write_text(&path, ">a\nAA").unwrap();
        assert_eq!(read_text(&path).unwrap(), ">a\nAA");
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        match read_bytes(&path) {
            Err(DataIoError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
