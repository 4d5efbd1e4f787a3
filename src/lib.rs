pub mod config;
pub mod error;

// Retrieval engine
pub mod corpus;
pub mod embedding;
pub mod engine;
pub mod lexical;
pub mod semantic;

// Outer surfaces
pub mod api;
pub mod cli;

// Re-exports
pub use config::Settings;
pub use engine::Engine;
pub use error::{Error, Result};
