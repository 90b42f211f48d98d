// Player snapshot import/export (JSON array of source records)

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use slotsync_recon::model::SourceRecord;

use crate::error::IoError;

pub fn read_snapshot(path: &Path) -> Result<Vec<SourceRecord>, IoError> {
    let file = File::open(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| IoError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_snapshot(path: &Path, players: &[SourceRecord]) -> Result<(), IoError> {
    let write_err = |source| IoError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, players).map_err(|source| IoError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.write_all(b"\n").map_err(write_err)?;
    writer.flush().map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_snapshot_write_then_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("players.json");
        let players = vec![
            SourceRecord {
                id: 39832,
                name: "Shohei Ohtani".into(),
                team: "LAD".into(),
                eligible_slots: vec![1, 5, 8, 11, 12, 14, 16, 17],
            },
            SourceRecord {
                id: 32801,
                name: "José Ramírez".into(),
                team: "CLE".into(),
                eligible_slots: vec![3, 7, 12, 16, 17],
            },
        ];

        write_snapshot(&path, &players).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"eligible_slots\""));
        assert!(content.ends_with("]\n"));

        assert_eq!(read_snapshot(&path).unwrap(), players);
    }

    #[test]
    fn test_malformed_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{\"players\": []}").unwrap();

        let err = read_snapshot(&path).unwrap_err();
        assert!(matches!(err, IoError::Json { .. }));
    }
}
