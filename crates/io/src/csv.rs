// Projection CSV import/export

use std::io::Read;
use std::path::Path;

use slotsync_recon::model::Table;
use tracing::{debug, warn};

use crate::error::IoError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// On-disk text encoding of a CSV, carried from read to write so a rewrite
/// keeps the bytes of every untouched cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    #[default]
    Utf8,
    /// UTF-8 with a leading byte-order mark (Excel's "CSV UTF-8").
    Utf8Bom,
    /// Not valid UTF-8; decoded as Windows-1252 (older Excel exports).
    Windows1252,
}

/// A table plus the encoding it was read in.
#[derive(Debug, Clone, Default)]
pub struct CsvFile {
    pub table: Table,
    pub encoding: TextEncoding,
}

/// Read a headed CSV. The first record is the header row; an empty file
/// yields an empty table. Rows may be ragged.
pub fn read_table(path: &Path) -> Result<CsvFile, IoError> {
    let read_err = |source| IoError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::open(path).map_err(read_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(read_err)?;

    let (content, encoding) = decode(bytes);
    let table = parse_table(&content).map_err(|source| IoError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        path = %path.display(),
        ?encoding,
        columns = table.headers.len(),
        rows = table.len(),
        "read table"
    );
    Ok(CsvFile { table, encoding })
}

/// UTF-8 first (with or without BOM); anything else is Windows-1252.
fn decode(bytes: Vec<u8>) -> (String, TextEncoding) {
    if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        if let Ok(s) = std::str::from_utf8(rest) {
            return (s.to_string(), TextEncoding::Utf8Bom);
        }
    }

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => (s, TextEncoding::Utf8),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            (decoded.into_owned(), TextEncoding::Windows1252)
        }
    }
}

fn parse_table(content: &str) -> Result<Table, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let headers = match records.next() {
        Some(record) => record?.iter().map(String::from).collect(),
        None => return Ok(Table::default()),
    };

    let mut rows = Vec::new();
    for record in records {
        rows.push(record?.iter().map(String::from).collect());
    }
    Ok(Table::new(headers, rows))
}

/// Write `table` back out in `encoding`: header verbatim, `\n` line endings,
/// short rows padded to the header width.
pub fn write_table(path: &Path, table: &Table, encoding: TextEncoding) -> Result<(), IoError> {
    let csv_err = |source| IoError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let write_err = |source| IoError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record(&table.headers).map_err(csv_err)?;

    let width = table.headers.len();
    for row in &table.rows {
        if row.len() < width {
            let mut padded = row.clone();
            padded.resize(width, String::new());
            writer.write_record(&padded).map_err(csv_err)?;
        } else {
            writer.write_record(row).map_err(csv_err)?;
        }
    }

    let utf8 = writer
        .into_inner()
        .map_err(|e| write_err(std::io::Error::new(e.error().kind(), e.to_string())))?;
    let bytes = encode(utf8, encoding, path);
    std::fs::write(path, bytes).map_err(write_err)?;

    debug!(path = %path.display(), ?encoding, rows = table.len(), "wrote table");
    Ok(())
}

fn encode(utf8: Vec<u8>, encoding: TextEncoding, path: &Path) -> Vec<u8> {
    match encoding {
        TextEncoding::Utf8 => utf8,
        TextEncoding::Utf8Bom => [UTF8_BOM, utf8.as_slice()].concat(),
        TextEncoding::Windows1252 => {
            let text = String::from_utf8_lossy(&utf8);
            let (encoded, _, unmappable) = encoding_rs::WINDOWS_1252.encode(&text);
            if unmappable {
                warn!(path = %path.display(), "text not representable in Windows-1252; writing UTF-8");
                return utf8;
            }
            encoded.into_owned()
        }
    }
}
