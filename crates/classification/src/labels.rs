//! Class label table loaded from a newline-delimited text resource

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::ClassifierError;

/// Size of the synthetic fallback table.
pub const SYNTHETIC_CLASS_COUNT: usize = 1001;

/// Ordered class labels; the line position in the resource is the class id.
#[derive(Debug, Clone)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    /// Load labels from a UTF-8 text file, one label per line, no header.
    ///
    /// # Errors
    /// Returns error if the file cannot be read.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ClassifierError> {
        let content = fs::read_to_string(path)?;
        let table = Self::parse(&content);
        debug!("Loaded {} labels", table.len());
        Ok(table)
    }

    /// Parse newline-delimited label text. Blank lines are skipped.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let labels = content
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { labels }
    }

    /// Synthetic `Class_{i}` table used when no label resource is available.
    #[must_use]
    pub fn synthetic() -> Self {
        let labels = (0..SYNTHETIC_CLASS_COUNT)
            .map(|i| format!("Class_{i}"))
            .collect();
        Self { labels }
    }

    /// Label for a class id, `None` when the id is out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of output classes the model is expected to produce.
    #[must_use]
    pub fn class_count(&self) -> usize {
        if self.labels.is_empty() {
            SYNTHETIC_CLASS_COUNT
        } else {
            self.labels.len()
        }
    }
}
