//! Append-only JSON lines file sink

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::{ReportError, ReportRecord, Reporter};
use crate::taxonomy::ComplianceError;

/// Appends one [`ReportRecord`] per line to a file
#[derive(Debug)]
pub struct JsonLinesReporter {
    name: String,
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonLinesReporter {
    /// Open `path` for appending, creating it if needed
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        Ok(Self {
            name: "json_lines".to_string(),
            path,
            file: Mutex::new(file),
        })
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Reporter for JsonLinesReporter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn report(&self, error: &ComplianceError) -> Result<(), ReportError> {
        let mut line = serde_json::to_vec(&ReportRecord::now(error))?;
        line.push(b'\n');

        let mut file = self.file.lock().await;
        file.write_all(&line).await?;
        file.flush().await?;

        Ok(())
    }
}
