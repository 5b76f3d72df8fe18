//! DanceRank Extractor - Tournament result extraction pipeline
//!
//! Turns a free-text tournament announcement into one
//! [`ExtractionRecord`] by running positional pattern rules over
//! tagged and raw word sequences.

use dancerank_core::{ExtractionRecord, ReferenceSets, TaggedToken};

pub mod engine;
pub mod entity;
pub mod output;
pub mod reference;
pub mod tagger;
pub mod temporal;
pub mod text;

pub use engine::Extractor;
pub use entity::{match_entities, Couple, EntityMatches};
pub use temporal::{match_temporal, DateMention, TemporalMatches};
pub use text::clean_text;

/// Run both matchers over one input and assemble the record
///
/// Total and deterministic: any tagged sequence yields a record,
/// possibly with every slot empty.
pub fn extract_record(
    tagged: &[TaggedToken],
    words: &[String],
    references: &ReferenceSets,
    fallback_year: &str,
) -> ExtractionRecord {
    assemble(
        match_entities(tagged, references),
        match_temporal(words, fallback_year),
    )
}

/// Package matcher output into the six record slots
pub fn assemble(entities: EntityMatches, temporal: TemporalMatches) -> ExtractionRecord {
    let (sir, lady) = entities
        .couple
        .map(|couple| (couple.sir, couple.lady))
        .unwrap_or_default();

    ExtractionRecord {
        sir,
        lady,
        club: entities.club,
        locations: entities.locations,
        dates: temporal.dates.iter().map(ToString::to_string).collect(),
        ranks: temporal.ranks,
    }
}
