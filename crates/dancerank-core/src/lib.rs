//! DanceRank Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout DanceRank:
//! - Tagged token models (closed NER tag set, tokens, tagged tokens)
//! - The six-slot extraction record
//! - Reference sets of known cities and dance clubs
//! - Common error types
//! - Collaborator traits for taggers and reference resolvers
//! - Configuration management

pub mod config;

pub use config::{
    AppConfig, ConfigError, ExtractionConfig, LoggingConfig, OutputConfig, OutputFormat,
    ReferenceConfig, ReferenceSource, TaggerBackend, TaggerConfig,
};

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for DanceRank operations
#[derive(Error, Debug)]
pub enum DanceRankError {
    #[error("Tagger unavailable: {0}")]
    TaggerUnavailable(String),

    #[error("Tagger error: {0}")]
    Tagger(String),

    #[error("Failed to read reference data {path}: {source}")]
    Reference {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DanceRankError>;

// ============================================================================
// Tags and Tokens
// ============================================================================

/// Closed set of entity tags the extraction rules understand
///
/// Raw labels from richer schemes are folded into this set by
/// [`Tag::from_label`]:
/// - contains `PER` -> `Person`
/// - contains `ORG` -> `Organization`
/// - contains `LOC` -> `Location`
/// - anything else (`O`, `MISC`, unknown) -> `Other`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tag {
    Person,
    Organization,
    Location,
    Other,
}

impl Tag {
    /// Map a raw tagger label (e.g. `I-PER`, `B-ORG`, `LOCATION`, `O`)
    pub fn from_label(label: &str) -> Self {
        if label.contains("PER") {
            Self::Person
        } else if label.contains("ORG") {
            Self::Organization
        } else if label.contains("LOC") {
            Self::Location
        } else {
            Self::Other
        }
    }

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "PERSON",
            Self::Organization => "ORGANIZATION",
            Self::Location => "LOCATION",
            Self::Other => "O",
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A word together with its position in the tagged sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub position: usize,
}

/// A token paired with the tag assigned by a [`Tagger`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedToken {
    pub token: Token,
    pub tag: Tag,
}

impl TaggedToken {
    pub fn new(text: impl Into<String>, position: usize, tag: Tag) -> Self {
        Self {
            token: Token {
                text: text.into(),
                position,
            },
            tag,
        }
    }

    /// Create from a raw tagger label
    pub fn from_label(text: impl Into<String>, position: usize, label: &str) -> Self {
        Self::new(text, position, Tag::from_label(label))
    }

    pub fn text(&self) -> &str {
        &self.token.text
    }

    pub fn is(&self, tag: Tag) -> bool {
        self.tag == tag
    }
}

// ============================================================================
// Extraction Record
// ============================================================================

/// Column order of every CSV row written for a record
pub const CSV_HEADER: [&str; 6] = [
    "NAME SIR",
    "NAME LADY",
    "CLUB",
    "TOURNAMENT LOCATION",
    "DATE",
    "RANK",
];

/// The six-slot result of one extraction call
///
/// Every slot is independently optional; a record with all slots
/// empty means nothing matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    /// First and last name of the gentleman
    pub sir: Vec<String>,
    /// First and last name of the lady
    pub lady: Vec<String>,
    /// Club names resolved from the first organization mention
    pub club: Vec<String>,
    /// Tournament locations
    pub locations: Vec<String>,
    /// Dates as `day.month.year`
    pub dates: Vec<String>,
    /// Ranks as digit strings
    pub ranks: Vec<String>,
}

impl ExtractionRecord {
    /// True if no slot holds a value
    pub fn is_empty(&self) -> bool {
        self.slots().iter().all(|slot| slot.is_empty())
    }

    /// Slots in [`CSV_HEADER`] order
    pub fn slots(&self) -> [&[String]; 6] {
        [
            &self.sir,
            &self.lady,
            &self.club,
            &self.locations,
            &self.dates,
            &self.ranks,
        ]
    }

    /// One cell per slot, values joined by a single space
    pub fn cells(&self) -> Vec<String> {
        self.slots().iter().map(|slot| slot.join(" ")).collect()
    }
}

// ============================================================================
// Reference Sets
// ============================================================================

/// Known city and club names, read-only for the duration of an extraction
///
/// Ordered sets keep iteration, and therefore extraction output,
/// identical between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSets {
    cities: BTreeSet<String>,
    clubs: BTreeSet<String>,
    /// All city names joined by a single space
    city_text: String,
}

impl ReferenceSets {
    /// Create reference sets from city and club names
    pub fn new(
        cities: impl IntoIterator<Item = String>,
        clubs: impl IntoIterator<Item = String>,
    ) -> Self {
        let cities: BTreeSet<String> = cities.into_iter().collect();
        let clubs: BTreeSet<String> = clubs.into_iter().collect();
        let city_text = cities.iter().map(String::as_str).collect::<Vec<_>>().join(" ");

        Self {
            cities,
            clubs,
            city_text,
        }
    }

    /// Load both sets from a resolver
    pub fn resolve(resolver: &dyn ReferenceResolver) -> Result<Self> {
        Ok(Self::new(resolver.cities()?, resolver.clubs()?))
    }

    pub fn cities(&self) -> &BTreeSet<String> {
        &self.cities
    }

    pub fn clubs(&self) -> &BTreeSet<String> {
        &self.clubs
    }

    pub fn city_text(&self) -> &str {
        &self.city_text
    }

    /// Check whether `fragment` occurs literally inside the joined city list
    ///
    /// This is a substring test in one direction only: `"Frank"` matches
    /// the city `"Frankfurt"`, while `"Frankfurter"` does not.
    pub fn mentions_city(&self, fragment: &str) -> bool {
        !fragment.is_empty() && self.city_text.contains(fragment)
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Trait for named-entity taggers
pub trait Tagger: Send + Sync {
    /// Tag an ordered word sequence; the output has the same length
    fn tag(&self, tokens: &[String]) -> Result<Vec<TaggedToken>>;

    /// Get tagger name for logging
    fn name(&self) -> &str;
}

/// Trait for sources of known city and club names
pub trait ReferenceResolver: Send + Sync {
    fn cities(&self) -> Result<BTreeSet<String>>;

    fn clubs(&self) -> Result<BTreeSet<String>>;
}

// ============================================================================
// Tests
// ============================================================================
