//! DanceRank Configuration Management
//!
//! Handles configuration from environment variables, config files,
//! and command-line arguments with defaults matching the layout of
//! a checkout (reference lists under `Corpus/` and `data/`).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Tagger back-end configuration
    pub tagger: TaggerConfig,

    /// Reference list sources
    pub reference: ReferenceConfig,

    /// Extraction settings
    pub extraction: ExtractionConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::ParseError { message, .. } => ConfigError::ParseError { path, message },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("<inline>"),
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        self.apply_env()?;
        Ok(self)
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`; a lexicon path wins over a tagger command
    fn apply_vars(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        // Tagger
        if let Some(command) = lookup("DANCERANK_TAGGER_CMD") {
            self.tagger.backend = TaggerBackend::Command;
            self.tagger.command = command.split_whitespace().map(str::to_string).collect();
        }
        if let Some(path) = lookup("DANCERANK_LEXICON") {
            self.tagger.backend = TaggerBackend::Lexicon;
            self.tagger.lexicon_path = Some(PathBuf::from(path));
        }

        // Extraction
        if let Some(year) = lookup("DANCERANK_YEAR") {
            self.extraction.fallback_year =
                Some(year.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: "DANCERANK_YEAR".to_string(),
                    value: year.clone(),
                })?);
        }

        // Logging
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Check that the selected back-ends have what they need
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.tagger.backend {
            TaggerBackend::Command if self.tagger.command.is_empty() => {
                Err(ConfigError::MissingRequired("tagger.command".to_string()))
            }
            TaggerBackend::Lexicon if self.tagger.lexicon_path.is_none() => {
                Err(ConfigError::MissingRequired("tagger.lexicon_path".to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// Tagger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggerConfig {
    /// Which tagger implementation to use
    pub backend: TaggerBackend,

    /// Program and arguments of the external tagger
    pub command: Vec<String>,

    /// Tab-separated `word<TAB>LABEL` file for the lexicon tagger
    pub lexicon_path: Option<PathBuf>,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            backend: TaggerBackend::Command,
            // Stanford NER with the German dewac model, whitespace tokenized
            command: [
                "java",
                "-mx1g",
                "-cp",
                "stanford-ner.jar",
                "edu.stanford.nlp.ie.crf.CRFClassifier",
                "-loadClassifier",
                "german.dewac_175m_600.crf.ser.gz",
                "-tokenizerFactory",
                "edu.stanford.nlp.process.WhitespaceTokenizer",
                "-outputFormat",
                "slashTags",
                "-readStdin",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            lexicon_path: None,
        }
    }
}

/// Supported tagger back-ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaggerBackend {
    Command,
    Lexicon,
}

impl std::str::FromStr for TaggerBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "command" => Ok(Self::Command),
            "lexicon" => Ok(Self::Lexicon),
            _ => Err(ConfigError::InvalidValue {
                key: "tagger.backend".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Reference list sources
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Sources of known city names
    pub cities: Vec<ReferenceSource>,

    /// Sources of known club names (merged into one set)
    pub clubs: Vec<ReferenceSource>,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            cities: vec![ReferenceSource::Html {
                path: PathBuf::from("data/Liste_der_Staedte_in_Deutschland.html"),
                element: "dd".to_string(),
            }],
            clubs: vec![
                ReferenceSource::Lines {
                    path: PathBuf::from("Corpus/Tanzvereine"),
                },
                ReferenceSource::Html {
                    path: PathBuf::from("data/htv_vereine.html"),
                    element: "p".to_string(),
                },
            ],
        }
    }
}

/// A single reference list on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum ReferenceSource {
    /// One name per line, `#` comment lines skipped
    Lines { path: PathBuf },

    /// Saved HTML page; the first text after each `element` start tag
    Html { path: PathBuf, element: String },
}

impl ReferenceSource {
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Lines { path } | Self::Html { path, .. } => path,
        }
    }
}

/// Extraction settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Year used for dates without one; current year when unset
    pub fallback_year: Option<i32>,
}

/// Output settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

/// Output formats of the record sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidValue {
                key: "output.format".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
