//! Record ingestion and validation

use super::category::CategoryValue;
use super::types::{AnalysisType, Document, DocumentError, InputValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

/// A document record as supplied by the document source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub categories: Vec<CategoryValue>,
    #[serde(default)]
    pub analysis_type: Option<String>,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    /// Text handed to the embedding provider when no embedding is present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl DocumentRecord {
    pub fn new(id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            timestamp,
            categories: Vec::new(),
            analysis_type: None,
            embedding: None,
            content: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn with_categories<I, C>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CategoryValue>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_analysis_type(mut self, analysis_type: impl Into<String>) -> Self {
        self.analysis_type = Some(analysis_type.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Validate this record against the corpus dimension.
    pub fn validate(&self, dimension: Option<usize>) -> Result<Document, InputValidationError> {
        let embedding = match &self.embedding {
            Some(e) => e.clone(),
            None => return Err(InputValidationError::MissingEmbedding),
        };
        if let Some(expected) = dimension {
            if !embedding.is_empty() && embedding.len() != expected {
                return Err(InputValidationError::DimensionMismatch {
                    expected,
                    found: embedding.len(),
                });
            }
        }

        let analysis_type = match &self.analysis_type {
            Some(raw) if !raw.trim().is_empty() => raw.parse::<AnalysisType>()?,
            _ => AnalysisType::default(),
        };

        let mut keys = Vec::with_capacity(self.categories.len());
        for (position, category) in self.categories.iter().enumerate() {
            match category.key() {
                Some(key) => keys.push(key),
                None => return Err(InputValidationError::InvalidCategory { position }),
            }
        }

        let name = if self.name.trim().is_empty() {
            self.id.clone()
        } else {
            self.name.clone()
        };

        Ok(Document::try_new(self.id.as_str(), name, self.timestamp, embedding)?
            .with_categories(keys)
            .with_analysis_type(analysis_type))
    }
}

/// Outcome of ingesting a batch of records.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Valid documents, in input order
    pub documents: Vec<Document>,
    /// Records that were excluded, in input order
    pub errors: Vec<DocumentError>,
    /// Embedding dimension the corpus was validated against
    pub dimension: Option<usize>,
}

/// Validate records, excluding the ones that break the ingestion contract.
///
/// The corpus dimension is `dimension` when given, otherwise the length of
/// the first record that passes validation on its own. Rejected records
/// never fix the dimension for the rest of the corpus.
pub fn ingest(records: &[DocumentRecord], dimension: Option<usize>) -> IngestReport {
    let mut report = IngestReport {
        dimension,
        ..Default::default()
    };
    let mut seen = HashSet::new();

    for record in records {
        let result = if seen.contains(record.id.as_str()) {
            Err(InputValidationError::DuplicateId)
        } else {
            record.validate(report.dimension)
        };

        match result {
            Ok(doc) => {
                report.dimension.get_or_insert(doc.dimension());
                seen.insert(record.id.clone());
                report.documents.push(doc);
            }
            Err(err) => {
                warn!(document = %record.id, reason = %err, "excluding document");
                report.errors.push(DocumentError::new(record.id.clone(), err));
            }
        }
    }

    report
}
