//! Clause segmentation
//!
//! Text is split into paragraphs on blank lines, whitespace inside each
//! paragraph is collapsed, and paragraphs are cut into sentences along
//! Unicode sentence boundaries. Boundaries that follow a common legal
//! abbreviation ("Inc.", "Sec.", "e.g.") or a bare enumeration marker
//! ("1.", "(a)", "iv.") are not treated as clause ends.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

/// Abbreviations that end in a period without ending the sentence
pub const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "jr", "sr", "st", "inc", "ltd", "llc", "llp", "corp", "co",
    "plc", "e.g", "i.e", "etc", "vs", "v", "viz", "cf", "al", "no", "nos", "sec", "secs", "art",
    "para", "cl", "ch", "p", "pp", "u.s", "u.k", "n.a", "approx", "dept", "est", "jan", "feb",
    "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
];

lazy_static! {
    /// A blank line, possibly holding stray spaces, tabs or form feeds
    static ref PARAGRAPH_BREAK: Regex = Regex::new(r"\n[ \t\r\x0C]*\n").unwrap();

    /// "1.", "1.2.", "(a)", "a)", "iv." standing alone
    static ref ENUMERATION_MARKER: Regex =
        Regex::new(r"^(?:\(?[0-9]{1,3}(?:\.[0-9]{1,3})*[.)]|\(?[a-zA-Z][.)]|\(?[ivxlcdmIVXLCDM]{1,6}[.)]|\([0-9a-zA-Z]{1,4}\))$")
            .unwrap();
}

#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Clauses with fewer characters are dropped
    pub min_clause_chars: usize,
    /// Also cut at semicolons, for contracts that list obligations in one sentence
    pub split_on_semicolons: bool,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            min_clause_chars: 20,
            split_on_semicolons: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Segmenter {
    config: SegmenterConfig,
    abbreviations: HashSet<&'static str>,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(SegmenterConfig::default())
    }
}

impl Segmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        Self {
            config,
            abbreviations: ABBREVIATIONS.iter().copied().collect(),
        }
    }

    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Split `text` into clauses in reading order.
    ///
    /// Every clause is trimmed, has its inner whitespace collapsed to single
    /// spaces and is at least `min_clause_chars` characters long. The same
    /// input always yields the same clauses.
    pub fn segment(&self, text: &str) -> Vec<String> {
        let mut clauses = Vec::new();

        for paragraph in PARAGRAPH_BREAK.split(text) {
            let normalized = normalize_whitespace(paragraph);
            if normalized.is_empty() {
                continue;
            }

            for sentence in self.sentences(&normalized) {
                if sentence.chars().count() >= self.config.min_clause_chars {
                    clauses.push(sentence);
                }
            }
        }

        clauses
    }

    fn sentences(&self, paragraph: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut pending = String::new();

        for fragment in paragraph.split_sentence_bounds() {
            for piece in self.split_semicolons(fragment) {
                pending.push_str(piece);
                if !piece.trim_end().ends_with(';') && self.continues_after(&pending) {
                    continue;
                }
                push_trimmed(&mut sentences, &pending);
                pending.clear();
            }
        }
        push_trimmed(&mut sentences, &pending);

        sentences
    }

    fn split_semicolons<'a>(&self, fragment: &'a str) -> Vec<&'a str> {
        if self.config.split_on_semicolons {
            fragment.split_inclusive(';').collect()
        } else {
            vec![fragment]
        }
    }

    /// Whether a boundary after `pending` is a false stop
    fn continues_after(&self, pending: &str) -> bool {
        let trimmed = pending.trim();
        if !trimmed.ends_with('.') && !trimmed.ends_with(')') {
            return false;
        }

        // Lone enumeration marker at the start of a clause
        if ENUMERATION_MARKER.is_match(trimmed) {
            return true;
        }
        if !trimmed.ends_with('.') {
            return false;
        }

        let mut words = trimmed.rsplit(char::is_whitespace);
        let last_word = words
            .next()
            .unwrap_or_default()
            .trim_start_matches(|c: char| c == '(' || c == '"' || c == '\'');
        let stem = last_word.trim_end_matches('.');

        if stem.chars().count() == 1 && stem.chars().all(char::is_alphabetic) {
            return is_initial(stem, words.next());
        }

        self.abbreviations.contains(stem.to_lowercase().as_str())
    }
}

/// Words that name a document part by letter, as in "Exhibit A."
const LETTERED_REFERENCES: &[&str] = &[
    "exhibit", "schedule", "appendix", "annex", "attachment", "rider", "addendum", "section",
    "article", "part", "clause", "item", "tab", "form",
];

/// Whether a single capital letter is a name initial ("John J. Smith")
/// rather than the end of a lettered reference ("Exhibit A.")
fn is_initial(letter: &str, previous: Option<&str>) -> bool {
    if !letter.chars().all(char::is_uppercase) {
        return false;
    }
    let previous = match previous {
        Some(word) => word.trim_start_matches(|c: char| c == '(' || c == '"' || c == '\''),
        None => return false,
    };
    let capitalised = previous.chars().next().is_some_and(char::is_uppercase);
    capitalised && !LETTERED_REFERENCES.contains(&previous.to_lowercase().as_str())
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn push_trimmed(sentences: &mut Vec<String>, pending: &str) {
    let trimmed = pending.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}
