//! Reference list loading
//!
//! Reads the known city and club names from local files: plain
//! one-name-per-line lists or saved HTML pages (the city list page keeps
//! names in `<dd>` elements, the regional club directory in `<p>`).

use std::collections::BTreeSet;

use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;

use dancerank_core::{
    DanceRankError, ReferenceConfig, ReferenceResolver, ReferenceSource, Result,
};

/// Resolver reading every configured source from disk
#[derive(Debug, Clone, Default)]
pub struct FileReferenceResolver {
    cities: Vec<ReferenceSource>,
    clubs: Vec<ReferenceSource>,
}

impl FileReferenceResolver {
    pub fn new(cities: Vec<ReferenceSource>, clubs: Vec<ReferenceSource>) -> Self {
        Self { cities, clubs }
    }

    pub fn from_config(config: &ReferenceConfig) -> Self {
        Self::new(config.cities.clone(), config.clubs.clone())
    }

    /// Union of all names from `sources`
    fn load_all(sources: &[ReferenceSource], kind: &str) -> Result<BTreeSet<String>> {
        let mut names = BTreeSet::new();
        for source in sources {
            let loaded = load_source(source)?;
            tracing::debug!(kind, path = %source.path().display(), names = loaded.len(), "Reference source loaded");
            names.extend(loaded);
        }

        if names.is_empty() {
            tracing::warn!(kind, "Reference set is empty; matching will find nothing");
        }
        Ok(names)
    }
}

impl ReferenceResolver for FileReferenceResolver {
    fn cities(&self) -> Result<BTreeSet<String>> {
        Self::load_all(&self.cities, "cities")
    }

    fn clubs(&self) -> Result<BTreeSet<String>> {
        Self::load_all(&self.clubs, "clubs")
    }
}

/// Read one source into a list of names
pub fn load_source(source: &ReferenceSource) -> Result<Vec<String>> {
    let path = source.path();
    let content = std::fs::read_to_string(path).map_err(|e| DanceRankError::Reference {
        path: path.to_path_buf(),
        source: e,
    })?;

    match source {
        ReferenceSource::Lines { .. } => Ok(parse_lines(&content)),
        ReferenceSource::Html { element, .. } => extract_element_text(&content, element),
    }
}

/// One name per line; blank and `#` comment lines are skipped
pub fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// First non-blank text following each `<element>` start tag
pub fn extract_element_text(html: &str, element: &str) -> Result<Vec<String>> {
    let open = Regex::new(&format!(r"(?i)<{}(?:\s[^>]*)?>", regex::escape(element)))
        .with_context(|| format!("invalid element name: {}", element))?;

    let mut names = Vec::new();
    for tag in open.find_iter(html) {
        if let Some(text) = first_text_after(&html[tag.end()..]) {
            names.push(text);
        }
    }
    Ok(names)
}

/// Skip over markup until a text node with content appears
fn first_text_after(mut rest: &str) -> Option<String> {
    loop {
        let end = rest.find('<').unwrap_or(rest.len());
        let text = decode_entities(&rest[..end]);
        let text = text.trim();
        if !text.is_empty() {
            return Some(text.to_string());
        }

        let tag_end = rest[end..].find('>')?;
        rest = &rest[end + tag_end + 1..];
    }
}

/// Decimal or hex character reference, e.g. `&#8211;` or `&#x2013;`
static NUMERIC_ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&#(?:[xX]([0-9a-fA-F]{1,6})|([0-9]{1,7}));").expect("valid entity regex")
});

fn decode_entities(text: &str) -> String {
    let text = NUMERIC_ENTITY.replace_all(text, |caps: &regex::Captures| {
        let code = match (caps.get(1), caps.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (None, Some(dec)) => dec.as_str().parse().ok(),
            _ => None,
        };
        match code.and_then(char::from_u32) {
            Some('\u{a0}') => " ".to_string(),
            Some(c) => c.to_string(),
            None => caps[0].to_string(),
        }
    });

    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_parse_lines_skips_comments() {
        let names = parse_lines("# Hessen\nTanz-Club Schwarz-Silber Frankfurt\n\nTSC Schwarz-Gold Darmstadt  \n");
        assert_eq!(
            names,
            vec!["Tanz-Club Schwarz-Silber Frankfurt", "TSC Schwarz-Gold Darmstadt"]
        );
    }

    #[test]
    fn test_extract_dd_elements() {
        let html = r#"<dl>
            <dt>A</dt>
            <dd><a href="/wiki/Aachen" title="Aachen">Aachen</a></dd>
            <dd class="x">
                Aalen
            </dd>
            <DD>Bad Homburg v&amp;d Höhe</DD>
            <ddx>nope</ddx>
        </dl>"#;

        let names = extract_element_text(html, "dd").unwrap();
        assert_eq!(names, vec!["Aachen", "Aalen", "Bad Homburg v&d Höhe"]);
    }

    #[test]
    fn test_numeric_entities_are_decoded() {
        let html = "<dd>Halle&#160;(Saale)</dd><dd>Bad&#x20;Homburg</dd>\
                    <dd>Rheda&#8211;Wiedenbr&#252;ck</dd><dd>O&#39;Brien &amp;#39;</dd>\
                    <dd>Kaputt&#1114112;</dd>";
        let names = extract_element_text(html, "dd").unwrap();
        assert_eq!(
            names,
            vec![
                "Halle (Saale)",
                "Bad Homburg",
                "Rheda\u{2013}Wiedenbrück",
                "O'Brien &#39;",
                "Kaputt&#1114112;",
            ]
        );
    }

    #[test]
    fn test_extract_p_elements() {
        let html = "<div><p><strong>TSC Grün-Weiß Aquisgrana</strong><br>Adresse</p><p></p></div>";
        let names = extract_element_text(html, "p").unwrap();
        assert_eq!(names, vec!["TSC Grün-Weiß Aquisgrana"]);
    }

    #[test]
    fn test_resolver_unions_sources() {
        let mut lines = tempfile::NamedTempFile::new().unwrap();
        writeln!(lines, "# clubs\nTanz-Club Schwarz-Silber Frankfurt").unwrap();

        let mut html = tempfile::NamedTempFile::new().unwrap();
        write!(html, "<p>TSC Schwarz-Gold Darmstadt</p><p>Tanz-Club Schwarz-Silber Frankfurt</p>").unwrap();

        let resolver = FileReferenceResolver::new(
            Vec::new(),
            vec![
                ReferenceSource::Lines {
                    path: lines.path().to_path_buf(),
                },
                ReferenceSource::Html {
                    path: html.path().to_path_buf(),
                    element: "p".to_string(),
                },
            ],
        );

        let clubs = resolver.clubs().unwrap();
        assert_eq!(clubs.len(), 2);
        assert!(clubs.contains("TSC Schwarz-Gold Darmstadt"));
        assert!(resolver.cities().unwrap().is_empty());
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let source = ReferenceSource::Lines {
            path: PathBuf::from("/nonexistent/Tanzvereine"),
        };
        assert!(matches!(
            load_source(&source),
            Err(DanceRankError::Reference { .. })
        ));
    }
}
