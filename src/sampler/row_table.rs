use crate::error::{Result, VolkitError};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

pub type Row = Vec<String>;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A comma-delimited file held fully in memory. No row is treated as a
/// header at this level.
///
/// A leading byte-order mark and the file's line ending are remembered so a
/// rewrite reproduces them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowTable {
    rows: Vec<Row>,
    bom: bool,
    crlf: bool,
}

impl RowTable {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| VolkitError::io(path, e))?;

        let bom = bytes.starts_with(UTF8_BOM);
        let crlf = uses_crlf(&bytes);

        let body = if bom { &bytes[UTF8_BOM.len()..] } else { &bytes[..] };
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(body);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| VolkitError::csv(path, e))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        tracing::debug!(path = %path.display(), rows = rows.len(), bom, crlf, "read table");
        Ok(Self { rows, bom, crlf })
    }

    /// Replaces `path` with the table contents. The rows are written to a
    /// temporary file in the same directory which is then renamed over
    /// `path`, so a failure leaves the original untouched.
    pub fn write_atomic<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp_file =
            NamedTempFile::new_in(parent).map_err(|e| VolkitError::io(parent, e))?;
        let temp_path = temp_file.path().to_path_buf();

        if self.bom {
            temp_file
                .write_all(UTF8_BOM)
                .map_err(|e| VolkitError::io(&temp_path, e))?;
        }

        {
            let terminator = if self.crlf {
                csv::Terminator::CRLF
            } else {
                csv::Terminator::Any(b'\n')
            };
            let mut writer = csv::WriterBuilder::new()
                .flexible(true)
                .terminator(terminator)
                .from_writer(temp_file.as_file_mut());
            for row in &self.rows {
                writer
                    .write_record(row)
                    .map_err(|e| VolkitError::csv(path, e))?;
            }
            writer
                .flush()
                .map_err(|e| VolkitError::io(&temp_path, e))?;
        }

        temp_file
            .as_file()
            .sync_all()
            .map_err(|e| VolkitError::io(&temp_path, e))?;

        // Keep the mode of the file being replaced rather than the temp file's 0600.
        if let Ok(metadata) = fs::metadata(path) {
            temp_file
                .as_file()
                .set_permissions(metadata.permissions())
                .map_err(|e| VolkitError::io(&temp_path, e))?;
        }

        temp_file.persist(path).map_err(|e| VolkitError::Persist {
            path: path.to_path_buf(),
            source: e,
        })?;

        tracing::debug!(path = %path.display(), rows = self.rows.len(), "wrote table");
        Ok(())
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut Vec<Row> {
        &mut self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// True when the first line break in `bytes` is `\r\n`.
fn uses_crlf(bytes: &[u8]) -> bool {
    match bytes.iter().position(|&b| b == b'\n') {
        Some(index) => index > 0 && bytes[index - 1] == b'\r',
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn row(fields: &[&str]) -> Row {
        fields.iter().map(|f| f.to_string()).collect()
    }

    fn table_of(rows: Vec<Row>) -> RowTable {
        RowTable {
            rows,
            ..RowTable::default()
        }
    }

    #[test]
    fn test_read_keeps_every_row() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("table.csv");
        fs::write(&path, "id,val\n1,a\n2,b\n").unwrap();

        let table = RowTable::read(&path).unwrap();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.rows()[0], row(&["id", "val"]));
        assert_eq!(table.rows()[2], row(&["2", "b"]));
    }

    #[test]
    fn test_read_uneven_rows() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ragged.csv");
        fs::write(&path, "a,b,c\n1\n2,3\n").unwrap();

        let table = RowTable::read(&path).unwrap();
        assert_eq!(table.rows()[1], row(&["1"]));
        assert_eq!(table.rows()[2], row(&["2", "3"]));
    }

    #[test]
    fn test_write_atomic_replaces_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("table.csv");
        fs::write(&path, "old,content\n").unwrap();

        let table = table_of(vec![row(&["id", "note"]), row(&["1", "has, comma"])]);
        table.write_atomic(&path).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "id,note\n1,\"has, comma\"\n"
        );
        assert_eq!(RowTable::read(&path).unwrap(), table);

        // No temp files left behind.
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_rewrite_keeps_byte_order_mark() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("table.csv");
        fs::write(&path, "\u{feff}id,val\n1,a\n2,b\n").unwrap();

        let mut table = RowTable::read(&path).unwrap();
        assert_eq!(table.rows()[0], row(&["id", "val"]));
        table.rows_mut().truncate(2);
        table.write_atomic(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "\u{feff}id,val\n1,a\n");
    }

    #[test]
    fn test_rewrite_keeps_crlf_line_endings() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("table.csv");
        fs::write(&path, "id,val\r\n1,a\r\n2,b\r\n").unwrap();

        let mut table = RowTable::read(&path).unwrap();
        table.rows_mut().remove(1);
        table.write_atomic(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "id,val\r\n2,b\r\n");
    }

    #[test]
    fn test_uses_crlf() {
        assert!(uses_crlf(b"a,b\r\nc"));
        assert!(!uses_crlf(b"a,b\nc\r\n"));
        assert!(!uses_crlf(b"\nx"));
        assert!(!uses_crlf(b"no newline"));
    }

    #[test]
    fn test_write_atomic_into_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("table.csv");

        let table = table_of(vec![row(&["x"])]);
        assert!(matches!(
            table.write_atomic(&path),
            Err(VolkitError::Io { .. })
        ));
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = RowTable::read(temp_dir.path().join("absent.csv"));
        assert!(matches!(result, Err(VolkitError::Io { .. })));
    }
}
