use crate::config::Settings;
use crate::corpus::{Corpus, RecipeSummary};
use crate::embedding;
use crate::engine::Engine;
use crate::semantic::SemanticIndex;
use crate::{Error, Result};
use tracing::info;

/// Load the corpus and build every index. Any failure here is fatal.
pub async fn build_engine(settings: &Settings) -> Result<Engine> {
    let corpus = Corpus::load(&settings.data.recipes_path)?;
    let embedder = embedding::from_config(&settings.embedding)?;
    Engine::build(corpus, embedder, &settings.engine, &settings.embedding).await
}

/// Recommend recipes for a list of ingredients
pub async fn recommend(settings: &Settings, ingredients: &[String], top_n: Option<usize>) -> Result<()> {
    let engine = build_engine(settings).await?;
    let top_n = top_n.unwrap_or(settings.engine.default_top_n);

    let ingredients: Vec<String> = ingredients
        .iter()
        .flat_map(|i| i.split_whitespace())
        .map(str::to_lowercase)
        .collect();

    print_recommendations(&engine.recommend(&ingredients, top_n));
    Ok(())
}

/// Extract ingredients from free text and recommend recipes for them
pub async fn ask(settings: &Settings, text: &str, top_n: Option<usize>) -> Result<()> {
    let engine = build_engine(settings).await?;
    let top_n = top_n.unwrap_or(settings.engine.default_top_n);

    let found = engine.extract_ingredients(text);
    if found.is_empty() {
        println!("No known ingredients found in: \"{text}\"");
        return Ok(());
    }
    println!(
        "Ingredients: {}",
        found.iter().cloned().collect::<Vec<_>>().join(", ")
    );

    print_recommendations(&engine.recommend_text(text, top_n));
    Ok(())
}

/// Semantic search over the corpus
pub async fn semantic(settings: &Settings, query: &str, top_n: Option<usize>) -> Result<()> {
    let engine = build_engine(settings).await?;
    let top_n = top_n.unwrap_or(settings.engine.default_top_n);

    print_recommendations(&engine.semantic_recommend(query, top_n).await);
    Ok(())
}

/// Print the known ingredients mentioned in `text`
pub async fn extract(settings: &Settings, text: &str) -> Result<()> {
    let engine = build_engine(settings).await?;
    let found = engine.extract_ingredients(text);

    if found.is_empty() {
        println!("No known ingredients found");
    } else {
        for ingredient in &found {
            println!("{ingredient}");
        }
    }
    Ok(())
}

/// Precompute the corpus embeddings into the configured cache file
pub async fn build_embeddings(settings: &Settings) -> Result<()> {
    let cache_path = settings.embedding.cache_path.as_deref().ok_or_else(|| {
        Error::Config("EMBEDDING_CACHE_PATH must be set to build embeddings".to_string())
    })?;

    let corpus = Corpus::load(&settings.data.recipes_path)?;
    let embedder = embedding::from_config(&settings.embedding)?;
    let model = embedder.model_name().to_string();

    let index = SemanticIndex::build_cached(
        &corpus,
        embedder,
        settings.embedding.batch_size,
        Some(cache_path),
    )
    .await?;

    info!("Embedding cache written to {:?}", cache_path);
    println!("\x1b[32m\u{2713}\x1b[0m Embeddings built successfully");
    println!("  Recipes: {}", index.len());
    println!("  Model: {} ({} dimensions)", model, index.dimension());
    println!("  Cache: {}", cache_path.display());
    Ok(())
}

fn print_recommendations(results: &[RecipeSummary]) {
    if results.is_empty() {
        println!("No recipes found");
        return;
    }

    println!("\nFound {} recipes:\n", results.len());
    println!(
        "{:<4} {:<40} {:<15} {:>9} {:>9}",
        "#", "Name", "Cuisine", "Calories", "Prep"
    );
    println!("{}", "-".repeat(81));

    for (rank, recipe) in results.iter().enumerate() {
        println!(
            "{:<4} {:<40} {:<15} {:>9} {:>9}",
            rank + 1,
            truncate(&recipe.name, 38),
            truncate(&recipe.cuisine, 13),
            recipe.calories,
            recipe.prep_time
        );
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
