//! Tagger back-ends
//!
//! - [`CommandTagger`]: pipes words through an external NER program
//!   (e.g. Stanford NER with `-outputFormat slashTags`)
//! - [`LexiconTagger`]: dictionary lookup, unknown words tagged `O`

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use dancerank_core::{
    ConfigError, DanceRankError, Result, TaggedToken, Tagger, TaggerBackend, TaggerConfig,
};

/// Build the tagger selected in the configuration
pub fn from_config(config: &TaggerConfig) -> Result<Box<dyn Tagger>> {
    match config.backend {
        TaggerBackend::Command => Ok(Box::new(CommandTagger::from_command(&config.command)?)),
        TaggerBackend::Lexicon => {
            let path = config
                .lexicon_path
                .as_ref()
                .ok_or_else(|| ConfigError::MissingRequired("tagger.lexicon_path".to_string()))?;
            Ok(Box::new(LexiconTagger::from_file(path)?))
        }
    }
}

/// Check that a tagger kept the input length
pub(crate) fn ensure_aligned(
    tagger: &dyn Tagger,
    tagged: &[TaggedToken],
    tokens: &[String],
) -> Result<()> {
    if tagged.len() != tokens.len() {
        return Err(DanceRankError::Tagger(format!(
            "{} returned {} tags for {} words",
            tagger.name(),
            tagged.len(),
            tokens.len()
        )));
    }
    Ok(())
}

// ============================================================================
// External command
// ============================================================================

/// Tagger backed by an external program
///
/// The words are written space-separated to the program's stdin; its
/// stdout must contain one `word/LABEL` pair per word.
#[derive(Debug, Clone)]
pub struct CommandTagger {
    program: String,
    args: Vec<String>,
}

impl CommandTagger {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Create from a program followed by its arguments
    pub fn from_command(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| ConfigError::MissingRequired("tagger.command".to_string()))?;
        Ok(Self::new(program.clone(), args.to_vec()))
    }
}

impl Tagger for CommandTagger {
    fn tag(&self, tokens: &[String]) -> Result<Vec<TaggedToken>> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(program = %self.program, tokens = tokens.len(), "Running external tagger");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| DanceRankError::TaggerUnavailable(format!("{}: {}", self.program, e)))?;

        // stdin is fed from its own thread while stdout and stderr drain
        let stdin = child.stdin.take();
        let input = tokens.join(" ");
        let writer = thread::spawn(move || -> std::io::Result<()> {
            if let Some(mut stdin) = stdin {
                writeln!(stdin, "{}", input)?;
            }
            Ok(())
        });

        let output = child
            .wait_with_output()
            .map_err(|e| DanceRankError::Tagger(format!("failed to read output: {}", e)))?;
        let written = writer
            .join()
            .map_err(|_| DanceRankError::Tagger("input writer panicked".to_string()))?;

        if !output.status.success() {
            return Err(DanceRankError::Tagger(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        written.map_err(|e| DanceRankError::Tagger(format!("failed to write input: {}", e)))?;

        parse_slash_tags(&String::from_utf8_lossy(&output.stdout))
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// Parse whitespace-separated `word/LABEL` pairs
///
/// The label is taken after the last `/`, so words may contain slashes.
pub fn parse_slash_tags(output: &str) -> Result<Vec<TaggedToken>> {
    output
        .split_whitespace()
        .enumerate()
        .map(|(position, pair)| {
            pair.rsplit_once('/')
                .map(|(word, label)| TaggedToken::from_label(word, position, label))
                .ok_or_else(|| DanceRankError::Tagger(format!("malformed tagger output: {}", pair)))
        })
        .collect()
}

// ============================================================================
// Lexicon
// ============================================================================

/// Dictionary-based tagger
#[derive(Debug, Clone, Default)]
pub struct LexiconTagger {
    /// word -> raw label
    entries: HashMap<String, String>,
}

impl LexiconTagger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a word with its label
    pub fn with_entry(mut self, word: impl Into<String>, label: impl Into<String>) -> Self {
        self.entries.insert(word.into(), label.into());
        self
    }

    /// Load a `word<TAB>LABEL` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| DanceRankError::Reference {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parse lexicon text, skipping blank and `#` comment lines
    pub fn parse(content: &str) -> Result<Self> {
        let mut lexicon = Self::new();

        for (number, line) in content.lines().enumerate() {
            let line = line.trim_end();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (word, label) = line.split_once('\t').ok_or_else(|| {
                DanceRankError::Tagger(format!("lexicon line {}: expected word<TAB>label", number + 1))
            })?;
            lexicon = lexicon.with_entry(word, label.trim());
        }

        tracing::debug!(entries = lexicon.len(), "Lexicon loaded");
        Ok(lexicon)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Tagger for LexiconTagger {
    fn tag(&self, tokens: &[String]) -> Result<Vec<TaggedToken>> {
        Ok(tokens
            .iter()
            .enumerate()
            .map(|(position, word)| {
                let label = self.entries.get(word).map_or("O", String::as_str);
                TaggedToken::from_label(word.as_str(), position, label)
            })
            .collect())
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}
