//! Temporal and rank pattern matching
//!
//! Scans the raw word sequence with a single cursor for
//! `day month [year]` triples and placement mentions such as
//! `2 Platz`, `Platz 3` or `zweiten Rang`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Month names and abbreviations (case-sensitive)
const MONTHS: [&str; 21] = [
    "Januar",
    "Jan",
    "Februar",
    "Feb",
    "März",
    "April",
    "Apr",
    "Mai",
    "Juni",
    "Juli",
    "August",
    "Aug",
    "September",
    "Sep",
    "Sept",
    "Oktober",
    "Okt",
    "November",
    "Nov",
    "Dezember",
    "Dez",
];

static RANKING_NOUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:Platz|Stelle|Stufe|Rang)").expect("valid ranking regex"));

/// An ordinal word or digit that maps to a fixed rank
struct RankRule {
    ordinal: Regex,
    digit: &'static str,
}

impl RankRule {
    fn new(ordinal: &str, digit: &'static str) -> Self {
        Self {
            ordinal: Regex::new(ordinal).expect("valid ordinal regex"),
            digit,
        }
    }

    fn is_ordinal(&self, word: &str) -> bool {
        word == self.digit || self.ordinal.is_match(word)
    }

    /// Ordinal then noun, or noun then ordinal
    fn matches(&self, current: &str, next: &str) -> bool {
        (self.is_ordinal(current) && is_ranking_noun(next))
            || (is_ranking_noun(current) && self.is_ordinal(next))
    }
}

/// Ordinal rules in priority order; the emitted rank is the rule's digit
static RANK_RULES: Lazy<[RankRule; 3]> = Lazy::new(|| {
    [
        RankRule::new(r"(?i)^erste[mnr]?", "1"),
        RankRule::new(r"(?i)^zweite[mnr]?", "2"),
        RankRule::new(r"(?i)^dritte[mnr]?", "3"),
    ]
});

/// True for a non-empty word made only of ASCII digits
pub fn is_number(word: &str) -> bool {
    !word.is_empty() && word.bytes().all(|b| b.is_ascii_digit())
}

/// True for a month name or a number between 1 and 12
pub fn is_month(word: &str) -> bool {
    MONTHS.contains(&word)
        || (is_number(word) && word.parse::<u64>().is_ok_and(|m| (1..=12).contains(&m)))
}

fn is_ranking_noun(word: &str) -> bool {
    RANKING_NOUN.is_match(word)
}

/// Rank mentioned by two adjacent words, if any
///
/// Ordinal rules are tried first, then a bare number next to a
/// ranking noun, which is emitted verbatim.
pub fn detect_rank(current: &str, next: &str) -> Option<String> {
    if let Some(rule) = RANK_RULES.iter().find(|rule| rule.matches(current, next)) {
        return Some(rule.digit.to_string());
    }

    if is_number(current) && is_ranking_noun(next) {
        Some(current.to_string())
    } else if is_ranking_noun(current) && is_number(next) {
        Some(next.to_string())
    } else {
        None
    }
}

/// A date as written in the text, serialized as `day.month.year`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateMention {
    pub day: String,
    pub month: String,
    pub year: String,
}

impl std::fmt::Display for DateMention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.day, self.month, self.year)
    }
}

/// Result of the temporal pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemporalMatches {
    pub dates: Vec<DateMention>,
    pub ranks: Vec<String>,
}

/// Scan words for dates and ranks
///
/// The cursor moves one word at a time even after a match, so
/// adjacent matches may share words.
pub fn match_temporal(words: &[String], fallback_year: &str) -> TemporalMatches {
    let mut matches = TemporalMatches::default();

    for (i, pair) in words.windows(2).enumerate() {
        let (current, next) = (pair[0].as_str(), pair[1].as_str());

        if is_number(current) && is_month(next) {
            let year = words
                .get(i + 2)
                .map(String::as_str)
                .filter(|word| is_number(word))
                .unwrap_or(fallback_year);

            matches.dates.push(DateMention {
                day: current.to_string(),
                month: next.to_string(),
                year: year.to_string(),
            });
        } else if let Some(rank) = detect_rank(current, next) {
            matches.ranks.push(rank);
        }
    }

    tracing::debug!(
        dates = matches.dates.len(),
        ranks = matches.ranks.len(),
        "Temporal patterns matched"
    );
    matches
}
