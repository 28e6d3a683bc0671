use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::domain::RawInput;

/// Reads CSV submissions whose header row names the form fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchImporter;

impl BatchImporter {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Vec<RawInput>, BatchImportError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| BatchImportError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    /// Header names are trimmed; cell values are passed on verbatim so choice fields
    /// see the same text an HTTP submission would. Blank cells are left out of the row,
    /// so they validate as missing input.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<RawInput>, BatchImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        if headers.iter().all(str::is_empty) {
            return Err(BatchImportError::MissingHeader);
        }

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let row = headers
                .iter()
                .zip(record.iter())
                .filter(|(field, value)| !field.is_empty() && !value.trim().is_empty())
                .collect::<RawInput>();
            rows.push(row);
        }

        Ok(rows)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchImportError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv input has no header row")]
    MissingHeader,
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
