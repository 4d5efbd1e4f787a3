use crate::corpus::store::Corpus;
use std::collections::BTreeSet;

/// Every distinct ingredient token in the corpus, sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    tokens: Vec<String>,
}

impl Vocabulary {
    pub fn build(corpus: &Corpus) -> Self {
        let tokens: BTreeSet<String> = corpus
            .iter()
            .flat_map(|recipe| recipe.ingredients.iter())
            .map(|ingredient| super::normalize_ingredient(ingredient))
            .filter(|token| !token.is_empty())
            .collect();

        Self {
            tokens: tokens.into_iter().collect(),
        }
    }

    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens: BTreeSet<String> = tokens
            .into_iter()
            .map(|t| super::normalize_ingredient(t.as_ref()))
            .filter(|t| !t.is_empty())
            .collect();

        Self {
            tokens: tokens.into_iter().collect(),
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.binary_search_by(|t| t.as_str().cmp(token)).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.tokens.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
