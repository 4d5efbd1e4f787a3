use crate::corpus::vocabulary::Vocabulary;
use crate::error::{Error, Result};
use regex::{RegexSet, RegexSetBuilder};
use std::collections::BTreeSet;
use tracing::debug;

// Patterns per compiled set; keeps each automaton well under the size limit
const PATTERNS_PER_SET: usize = 256;
const SET_SIZE_LIMIT: usize = 32 * (1 << 20);

/// Dictionary matcher that finds known ingredients in free text.
///
/// Every vocabulary token is matched as a whole word, optionally followed by a
/// plural suffix, so "eggs" finds `egg` while "riceflour" does not find `rice`.
#[derive(Debug, Clone)]
pub struct IngredientExtractor {
    sets: Vec<(RegexSet, Vec<String>)>,
}

impl IngredientExtractor {
    pub fn new(vocabulary: &Vocabulary) -> Result<Self> {
        let tokens: Vec<&str> = vocabulary.iter().collect();
        let mut sets = Vec::with_capacity(tokens.len().div_ceil(PATTERNS_PER_SET));

        for chunk in tokens.chunks(PATTERNS_PER_SET) {
            let patterns: Vec<String> = chunk.iter().map(|t| word_pattern(t)).collect();
            let set = RegexSetBuilder::new(&patterns)
                .size_limit(SET_SIZE_LIMIT)
                .build()
                .map_err(|e| Error::Index(format!("Failed to compile ingredient matcher: {e}")))?;
            sets.push((set, chunk.iter().map(|t| t.to_string()).collect()));
        }

        debug!(
            "Ingredient extractor compiled {} tokens into {} sets",
            tokens.len(),
            sets.len()
        );

        Ok(Self { sets })
    }

    /// Known ingredients mentioned in `text`, sorted.
    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            return BTreeSet::new();
        }

        let mut found = BTreeSet::new();
        for (set, tokens) in &self.sets {
            for i in set.matches(&text).into_iter() {
                found.insert(tokens[i].clone());
            }
        }
        found
    }
}

fn word_pattern(token: &str) -> String {
    let starts_with_word = token.chars().next().is_some_and(is_word_char);
    let ends_with_word = token.chars().last().is_some_and(is_word_char);

    let mut alternatives = regex::escape(token);
    if ends_with_word {
        alternatives.push_str("(?:e?s)?");
        if let Some(stem) = token.strip_suffix('y').filter(|stem| !stem.is_empty()) {
            alternatives.push_str(&format!("|{}ies", regex::escape(stem)));
        }
    }

    // `\b` only holds next to a word character, so edges made of punctuation
    // ("tomato (chopped)", "1/2 cup") are delimited by non-word text instead.
    let head = if starts_with_word { r"\b" } else { r"(?:^|\W)" };
    let tail = if ends_with_word { r"\b" } else { r"(?:\W|$)" };
    format!("{head}(?:{alternatives}){tail}")
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
