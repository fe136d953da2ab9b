//! File-backed document source used by the `extract` command.

use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use lexfuse_core::{AreaTag, DocumentSource, SourceDocument};
use std::path::PathBuf;
use tracing::debug;

/// Reads plain-text documents from disk; the fetch key is a path relative to
/// `root` (or absolute).
#[derive(Debug, Clone)]
pub struct FileDocumentSource {
    root: PathBuf,
    source_id: String,
    source_name: String,
    reference_date: Option<NaiveDate>,
    order_number: Option<String>,
    title: Option<String>,
    impact_areas: Vec<AreaTag>,
    stakeholders: Vec<AreaTag>,
}

impl FileDocumentSource {
    pub fn new(
        root: impl Into<PathBuf>,
        source_id: impl Into<String>,
        source_name: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            source_id: source_id.into(),
            source_name: source_name.into(),
            reference_date: None,
            order_number: None,
            title: None,
            impact_areas: Vec::new(),
            stakeholders: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_reference_date(mut self, date: Option<NaiveDate>) -> Self {
        self.reference_date = date;
        self
    }

    #[must_use]
    pub fn with_order_number(mut self, order_number: Option<String>) -> Self {
        self.order_number = order_number;
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    #[must_use]
    pub fn with_tags(mut self, impact_areas: Vec<AreaTag>, stakeholders: Vec<AreaTag>) -> Self {
        self.impact_areas = impact_areas;
        self.stakeholders = stakeholders;
        self
    }
}

#[async_trait]
impl DocumentSource for FileDocumentSource {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    async fn fetch(&self, key: &str) -> anyhow::Result<SourceDocument> {
        let path = self.root.join(key);
        let text = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read document {}", path.display()))?;
        debug!(path = %path.display(), bytes = text.len(), "Read source document");

        let mut document = SourceDocument::new(&self.source_id, &self.source_name, text)
            .with_impact_areas(self.impact_areas.clone())
            .with_stakeholders(self.stakeholders.clone());
        document.reference_date = self.reference_date;
        document.order_number.clone_from(&self.order_number);
        document.title.clone_from(&self.title);
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn fetch_reads_file_and_stamps_metadata() {
        let dir = std::env::temp_dir().join(format!("lexfuse_source_{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).expect("scratch dir should be created");
        std::fs::write(dir.join("eo.txt"), "Agencies shall act.").expect("file should be written");

        let date = NaiveDate::from_ymd_opt(2025, 1, 20);
        let source = FileDocumentSource::new(&dir, "white_house", "White House")
            .with_reference_date(date)
            .with_order_number(Some("14148".to_string()))
            .with_tags(vec![AreaTag::new("energy", "Energy")], Vec::new());

        let document = source.fetch("eo.txt").await.expect("document should be read");
        assert_eq!(source.source_id(), "white_house");
        assert_eq!(document.text, "Agencies shall act.");
        assert_eq!(document.source_name, "White House");
        assert_eq!(document.reference_date, date);
        assert_eq!(document.order_number.as_deref(), Some("14148"));
        assert!(document.title.is_none());
        assert_eq!(document.impact_areas, vec![AreaTag::new("energy", "Energy")]);
        assert!(document.stakeholders.is_empty());

        assert!(source.fetch("missing.txt").await.is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
