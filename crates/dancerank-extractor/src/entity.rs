//! Entity pattern matching
//!
//! Finds the couple's names, the club and the tournament locations in a
//! tagged word sequence:
//! - Names: positional PERSON/OTHER templates, first match wins
//! - Club: the first ORGANIZATION run, resolved through a city anchor
//! - Locations: LOCATION tokens found in the city list

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use dancerank_core::{ReferenceSets, Tag, TaggedToken};

// ============================================================================
// Couple names
// ============================================================================

/// Names of one dance couple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Couple {
    pub sir: Vec<String>,
    pub lady: Vec<String>,
}

/// A positional name template, anchored on an OTHER token
///
/// `tags[k]` must match the token at offset `k + 1` from the anchor;
/// `sir` and `lady` pick name parts by offset.
struct NameTemplate {
    tags: &'static [Tag],
    sir: [usize; 2],
    lady: [usize; 2],
}

const P: Tag = Tag::Person;
const O: Tag = Tag::Other;

/// Templates in priority order
const NAME_TEMPLATES: [NameTemplate; 3] = [
    // "Guido und Doris Krams": married couple sharing a surname
    NameTemplate {
        tags: &[P, O, P, P, O],
        sir: [1, 4],
        lady: [3, 4],
    },
    // "Max Muster Erika Beispiel"
    NameTemplate {
        tags: &[P, P, P, P, O],
        sir: [1, 2],
        lady: [3, 4],
    },
    // "Max Muster und Erika Beispiel"
    NameTemplate {
        tags: &[P, P, O, P, P, O],
        sir: [1, 2],
        lady: [4, 5],
    },
];

impl NameTemplate {
    /// Try the template with its anchor at `n`
    fn apply(&self, tokens: &[TaggedToken], n: usize) -> Option<Couple> {
        let window = tokens.get(n + 1..n + 1 + self.tags.len())?;

        if !window.iter().zip(self.tags).all(|(token, tag)| token.is(*tag)) {
            return None;
        }

        let pick = |offsets: [usize; 2]| -> Vec<String> {
            offsets
                .iter()
                .map(|offset| window[offset - 1].text().to_string())
                .collect()
        };

        Some(Couple {
            sir: pick(self.sir),
            lady: pick(self.lady),
        })
    }
}

/// Find the first couple in the sequence
pub fn find_couple(tokens: &[TaggedToken]) -> Option<Couple> {
    tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| token.is(Tag::Other))
        .find_map(|(n, _)| {
            NAME_TEMPLATES
                .iter()
                .find_map(|template| template.apply(tokens, n))
        })
}

// ============================================================================
// Club
// ============================================================================

/// Maximum number of ORGANIZATION tokens in a candidate group
const ORG_GROUP_LIMIT: usize = 4;

/// Tokens that must follow the first ORGANIZATION token
const ORG_MIN_FOLLOWING: usize = 3;

/// Abbreviations and the generic club word never identify a club
static GENERIC_CLUB_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Z]{2,}|(C|club$)").expect("valid club word regex"));

/// A contiguous run of ORGANIZATION tokens
#[derive(Debug, Clone)]
pub struct OrgGroup<'a> {
    pub start: usize,
    pub tokens: Vec<&'a TaggedToken>,
}

impl<'a> OrgGroup<'a> {
    /// Collect up to four ORGANIZATION tokens beginning at `start`
    pub fn collect(tokens: &'a [TaggedToken], start: usize) -> Self {
        let tokens = tokens
            .iter()
            .skip(start)
            .take(ORG_GROUP_LIMIT)
            .take_while(|token| token.is(Tag::Organization))
            .collect();

        Self { start, tokens }
    }

    /// Index of the first member that appears in the city list
    pub fn anchor_city(&self, references: &ReferenceSets) -> Option<usize> {
        self.tokens
            .iter()
            .position(|token| references.mentions_city(token.text()))
    }
}

/// Resolve the club from the first ORGANIZATION run
///
/// Only the first ORGANIZATION token is ever considered. A club name is
/// emitted once per distinguishing group member it contains, so the
/// result may repeat a name.
pub fn find_club(tokens: &[TaggedToken], references: &ReferenceSets) -> Vec<String> {
    let Some(start) = tokens.iter().position(|token| token.is(Tag::Organization)) else {
        return Vec::new();
    };

    if start + ORG_MIN_FOLLOWING >= tokens.len() {
        tracing::debug!(start, "Organization mention too close to end of text");
        return Vec::new();
    }

    let group = OrgGroup::collect(tokens, start);
    let Some(anchor) = group.anchor_city(references) else {
        return Vec::new();
    };
    let city = group.tokens[anchor].text();

    let mut clubs = Vec::new();
    for club in references.clubs().iter().filter(|club| club.contains(city)) {
        for (i, member) in group.tokens.iter().enumerate() {
            let word = member.text();
            if i != anchor && club.contains(word) && !GENERIC_CLUB_WORD.is_match(word) {
                clubs.push(club.clone());
            }
        }
    }

    tracing::debug!(city, matches = clubs.len(), "Club resolved");
    clubs
}

// ============================================================================
// Locations
// ============================================================================

/// All LOCATION tokens that occur in the city list
pub fn find_locations(tokens: &[TaggedToken], references: &ReferenceSets) -> Vec<String> {
    tokens
        .iter()
        .filter(|token| token.is(Tag::Location) && references.mentions_city(token.text()))
        .map(|token| token.text().to_string())
        .collect()
}

// ============================================================================
// Combined pass
// ============================================================================

/// Result of the entity pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityMatches {
    pub couple: Option<Couple>,
    pub club: Vec<String>,
    pub locations: Vec<String>,
}

/// Run name, club and location matching over one tagged sequence
pub fn match_entities(tokens: &[TaggedToken], references: &ReferenceSets) -> EntityMatches {
    let matches = EntityMatches {
        couple: find_couple(tokens),
        club: find_club(tokens, references),
        locations: find_locations(tokens, references),
    };

    tracing::debug!(
        couple = matches.couple.is_some(),
        clubs = matches.club.len(),
        locations = matches.locations.len(),
        "Entity patterns matched"
    );
    matches
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a tagged sequence from (word, label) pairs
    fn tagged(pairs: &[(&str, &str)]) -> Vec<TaggedToken> {
        pairs
            .iter()
            .enumerate()
            .map(|(i, (word, label))| TaggedToken::from_label(*word, i, label))
            .collect()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn references() -> ReferenceSets {
        ReferenceSets::new(
            strings(&["Frankfurt am Main", "Kelkheim (Taunus)", "Darmstadt"]),
            strings(&[
                "Tanz-Club Schwarz-Silber Frankfurt",
                "TSC Schwarz-Gold Darmstadt",
                "Tanzsportclub Blau-Weiss Frankfurt",
            ]),
        )
    }

    #[test]
    fn test_four_person_template() {
        let tokens = tagged(&[
            ("mit", "O"),
            ("Max", "I-PER"),
            ("Muster", "I-PER"),
            ("Erika", "I-PER"),
            ("Beispiel", "I-PER"),
            ("vorn", "O"),
        ]);

        let couple = find_couple(&tokens).unwrap();
        assert_eq!(couple.sir, strings(&["Max", "Muster"]));
        assert_eq!(couple.lady, strings(&["Erika", "Beispiel"]));
    }

    #[test]
    fn test_married_couple_template() {
        let tokens = tagged(&[
            ("Paar", "O"),
            ("Guido", "I-PER"),
            ("und", "O"),
            ("Doris", "I-PER"),
            ("Krams", "I-PER"),
            ("konnten", "O"),
        ]);

        let couple = find_couple(&tokens).unwrap();
        assert_eq!(couple.sir, strings(&["Guido", "Krams"]));
        assert_eq!(couple.lady, strings(&["Doris", "Krams"]));
    }

    #[test]
    fn test_conjunction_template() {
        let tokens = tagged(&[
            ("Paar", "O"),
            ("Max", "I-PER"),
            ("Muster", "I-PER"),
            ("und", "O"),
            ("Erika", "I-PER"),
            ("Beispiel", "I-PER"),
            ("tanzten", "O"),
        ]);

        let couple = find_couple(&tokens).unwrap();
        assert_eq!(couple.sir, strings(&["Max", "Muster"]));
        assert_eq!(couple.lady, strings(&["Erika", "Beispiel"]));
    }

    #[test]
    fn test_conjunction_template_needs_seventh_token() {
        let tokens = tagged(&[
            ("Paar", "O"),
            ("Max", "I-PER"),
            ("Muster", "I-PER"),
            ("und", "O"),
            ("Erika", "I-PER"),
            ("Beispiel", "I-PER"),
        ]);

        assert!(find_couple(&tokens).is_none());
    }

    #[test]
    fn test_short_sequences_have_no_names() {
        let labels = ["O", "I-PER", "I-PER", "I-PER", "I-PER"];
        for len in 0..=labels.len() {
            let pairs: Vec<(&str, &str)> = labels[..len].iter().map(|l| ("Wort", *l)).collect();
            assert!(find_couple(&tagged(&pairs)).is_none(), "length {}", len);
        }
    }

    #[test]
    fn test_first_couple_wins() {
        let tokens = tagged(&[
            ("Paar", "O"),
            ("Guido", "I-PER"),
            ("und", "O"),
            ("Doris", "I-PER"),
            ("Krams", "I-PER"),
            ("vor", "O"),
            ("Max", "I-PER"),
            ("Muster", "I-PER"),
            ("Erika", "I-PER"),
            ("Beispiel", "I-PER"),
            ("Ende", "O"),
        ]);

        let couple = find_couple(&tokens).unwrap();
        assert_eq!(couple.sir, strings(&["Guido", "Krams"]));
    }

    #[test]
    fn test_anchor_must_be_other() {
        let tokens = tagged(&[
            ("Hessen", "I-LOC"),
            ("Max", "I-PER"),
            ("Muster", "I-PER"),
            ("Erika", "I-PER"),
            ("Beispiel", "I-PER"),
            ("vorn", "O"),
        ]);

        assert!(find_couple(&tokens).is_none());
    }

    #[test]
    fn test_misc_labels_count_as_other() {
        // MISC anchors the template and fills its OTHER slots
        let tokens = tagged(&[
            ("Taunus-Tanz-Tage", "I-MISC"),
            ("Guido", "I-PER"),
            ("und", "I-MISC"),
            ("Doris", "I-PER"),
            ("Krams", "I-PER"),
            ("Latein", "B-MISC"),
        ]);

        let couple = find_couple(&tokens).unwrap();
        assert_eq!(couple.sir, strings(&["Guido", "Krams"]));
        assert_eq!(couple.lady, strings(&["Doris", "Krams"]));
    }

    #[test]
    fn test_club_resolved_through_city() {
        let tokens = tagged(&[
            ("für", "O"),
            ("Schwarz-Silber", "I-ORG"),
            ("Frankfurt", "I-ORG"),
            ("an", "O"),
            ("den", "O"),
            ("Start", "O"),
        ]);

        assert_eq!(
            find_club(&tokens, &references()),
            strings(&["Tanz-Club Schwarz-Silber Frankfurt"])
        );
    }

    #[test]
    fn test_club_generic_words_are_ignored() {
        // "TSC" is an abbreviation and "Club" contains a capital C
        let tokens = tagged(&[
            ("vom", "O"),
            ("TSC", "I-ORG"),
            ("Club", "I-ORG"),
            ("Frankfurt", "I-ORG"),
            ("gingen", "O"),
            ("an", "O"),
        ]);

        assert!(find_club(&tokens, &references()).is_empty());
    }

    #[test]
    fn test_club_duplicates_are_kept() {
        let refs = ReferenceSets::new(
            strings(&["Frankfurt"]),
            strings(&["Blau-Weiss Rot Frankfurt"]),
        );
        let tokens = tagged(&[
            ("Blau-Weiss", "I-ORG"),
            ("Rot", "I-ORG"),
            ("Frankfurt", "I-ORG"),
            ("siegte", "O"),
        ]);

        assert_eq!(
            find_club(&tokens, &refs),
            strings(&["Blau-Weiss Rot Frankfurt", "Blau-Weiss Rot Frankfurt"])
        );
    }

    #[test]
    fn test_club_only_first_org_run() {
        // The first run has no city, the second would resolve
        let tokens = tagged(&[
            ("Landesverband", "I-ORG"),
            ("Hessen", "I-ORG"),
            ("meldet", "O"),
            ("Schwarz-Silber", "I-ORG"),
            ("Frankfurt", "I-ORG"),
            ("an", "O"),
            ("den", "O"),
            ("Start", "O"),
        ]);

        assert!(find_club(&tokens, &references()).is_empty());
    }

    #[test]
    fn test_club_needs_following_tokens() {
        let tokens = tagged(&[
            ("für", "O"),
            ("Schwarz-Silber", "I-ORG"),
            ("Frankfurt", "I-ORG"),
            ("los", "O"),
        ]);

        assert!(find_club(&tokens, &references()).is_empty());
    }

    #[test]
    fn test_org_group_is_contiguous_and_capped() {
        let tokens = tagged(&[
            ("A", "I-ORG"),
            ("B", "I-ORG"),
            ("x", "O"),
            ("C", "I-ORG"),
        ]);
        let group = OrgGroup::collect(&tokens, 0);
        assert_eq!(group.tokens.len(), 2);

        let tokens = tagged(&[
            ("A", "I-ORG"),
            ("B", "I-ORG"),
            ("C", "I-ORG"),
            ("D", "I-ORG"),
            ("E", "I-ORG"),
        ]);
        let group = OrgGroup::collect(&tokens, 0);
        assert_eq!(group.tokens.len(), 4);
    }

    #[test]
    fn test_locations_substring_direction() {
        let tokens = tagged(&[
            ("in", "O"),
            ("Kelkheim", "I-LOC"),
            ("und", "O"),
            ("Frankfurter", "I-LOC"),
            ("bei", "O"),
            ("Darm", "I-LOC"),
            ("Kelkheim", "I-LOC"),
            ("Darmstadt", "O"),
        ]);

        // Token inside the city list, never the other way round
        assert_eq!(
            find_locations(&tokens, &references()),
            strings(&["Kelkheim", "Darm", "Kelkheim"])
        );
    }

    #[test]
    fn test_empty_references_degrade() {
        let tokens = tagged(&[
            ("in", "O"),
            ("Kelkheim", "I-LOC"),
            ("Schwarz-Silber", "I-ORG"),
            ("Frankfurt", "I-ORG"),
            ("x", "O"),
            ("y", "O"),
        ]);
        let matches = match_entities(&tokens, &ReferenceSets::default());

        assert!(matches.club.is_empty());
        assert!(matches.locations.is_empty());
    }
}
