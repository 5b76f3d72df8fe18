//! Extraction engine
//!
//! Ties text cleaning, tagging and both pattern passes together for
//! one input text at a time.

use chrono::Datelike;

use dancerank_core::{ExtractionRecord, ReferenceSets, Result, Tagger};

use crate::tagger::ensure_aligned;
use crate::{clean_text, extract_record};

/// Extraction engine over a tagger and fixed reference sets
pub struct Extractor {
    tagger: Box<dyn Tagger>,
    references: ReferenceSets,
    /// Year used for dates written without one
    fallback_year: String,
}

impl Extractor {
    /// Create an extractor using the current year for incomplete dates
    pub fn new(tagger: Box<dyn Tagger>, references: ReferenceSets) -> Self {
        Self {
            tagger,
            references,
            fallback_year: chrono::Local::now().year().to_string(),
        }
    }

    /// Set the year used for dates without one
    pub fn with_fallback_year(mut self, year: i32) -> Self {
        self.fallback_year = year.to_string();
        self
    }

    pub fn fallback_year(&self) -> &str {
        &self.fallback_year
    }

    pub fn references(&self) -> &ReferenceSets {
        &self.references
    }

    /// Extract one record from an announcement text
    ///
    /// Fails only if the tagger fails; no match is an empty record.
    pub fn extract(&self, text: &str) -> Result<ExtractionRecord> {
        let words = clean_text(text);
        tracing::info!(words = words.len(), tagger = self.tagger.name(), "Extraction started");

        let tagged = self.tagger.tag(&words)?;
        ensure_aligned(self.tagger.as_ref(), &tagged, &words)?;

        let record = extract_record(&tagged, &words, &self.references, &self.fallback_year);
        tracing::info!(empty = record.is_empty(), "Extraction finished");
        Ok(record)
    }
}
