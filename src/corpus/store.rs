use crate::corpus::recipe::{parse_record, Recipe};
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// The immutable, positionally addressed recipe corpus.
#[derive(Debug, Clone)]
pub struct Corpus {
    recipes: Vec<Recipe>,
}

impl Corpus {
    /// Load the corpus from a JSON file holding an array of recipe objects
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::DataLoad(format!(
                "Failed to read recipes from {}: {}",
                path.display(),
                e
            ))
        })?;

        let corpus = Self::from_json_str(&content)
            .map_err(|e| Error::DataLoad(format!("{}: {}", path.display(), e)))?;

        info!("Loaded {} recipes from {:?}", corpus.len(), path);
        Ok(corpus)
    }

    /// Parse a corpus from JSON text. Malformed records are skipped with a
    /// warning; the load fails only when the document itself is unusable or
    /// nothing survives.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)
            .map_err(|e| Error::DataLoad(format!("Invalid JSON: {e}")))?;

        let records = match value {
            serde_json::Value::Array(records) => records,
            _ => {
                return Err(Error::DataLoad(
                    "Expected a JSON array of recipes".to_string(),
                ))
            }
        };

        let total = records.len();
        let mut recipes = Vec::with_capacity(total);
        for (position, record) in records.into_iter().enumerate() {
            match parse_record(record) {
                Ok(recipe) => recipes.push(recipe),
                Err(reason) => warn!("Skipping recipe record #{}: {}", position, reason),
            }
        }

        let skipped = total - recipes.len();
        if skipped > 0 {
            info!("Skipped {} of {} malformed recipe records", skipped, total);
        }

        if recipes.is_empty() {
            return Err(Error::DataLoad(format!(
                "No valid recipes found ({total} records read)"
            )));
        }

        Ok(Self { recipes })
    }

    pub fn from_recipes(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }

    pub fn get(&self, index: usize) -> Result<&Recipe> {
        self.recipes.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.recipes.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipe> + '_ {
        self.recipes.iter()
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }
}
