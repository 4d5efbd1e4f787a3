// Recipe store, ingredient vocabulary and the free-text ingredient matcher

pub mod extractor;
pub mod recipe;
pub mod store;
pub mod vocabulary;

// Re-exports
pub use extractor::IngredientExtractor;
pub use recipe::{normalize_ingredient, Recipe, RecipeSummary};
pub use store::Corpus;
pub use vocabulary::Vocabulary;
