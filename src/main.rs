use clap::Parser;
use recommender::{
    api::{handlers::AppState, routes},
    cli::{commands, Cli, Commands},
    config::Settings,
    Error, Result,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,recommender=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let settings = Settings::from_env()?;
    settings.validate()?;

    match cli.command {
        Commands::Serve { port, host } => {
            serve(settings, port, host).await?;
        }
        Commands::Recommend { ingredients, top_n } => {
            commands::recommend(&settings, &ingredients, top_n).await?;
        }
        Commands::Ask { text, top_n } => {
            commands::ask(&settings, &text, top_n).await?;
        }
        Commands::Semantic { query, top_n } => {
            commands::semantic(&settings, &query, top_n).await?;
        }
        Commands::Extract { text } => {
            commands::extract(&settings, &text).await?;
        }
        Commands::BuildEmbeddings => {
            commands::build_embeddings(&settings).await?;
        }
    }

    Ok(())
}

async fn serve(mut settings: Settings, port: Option<u16>, host: Option<String>) -> Result<()> {
    if let Some(port) = port {
        settings.server.port = port;
    }
    if let Some(host) = host {
        settings.server.host = host;
    }

    info!("Starting recipe recommender");
    info!("Recipes: {:?}", settings.data.recipes_path);
    info!("Server: {}:{}", settings.server.host, settings.server.port);

    // Every index is built before the listener binds; a failure here stops startup
    let engine = commands::build_engine(&settings).await?;
    let stats = engine.stats();

    let state = AppState {
        engine: Arc::new(engine),
        settings: settings.clone(),
    };
    let app = routes::create_router(state, &settings)?;

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    println!("\n========================================");
    println!("Recipe Recommender");
    println!("========================================");
    println!("Status: Running");
    println!("Address: http://{addr}");
    println!("Recipes: {}", stats.recipes);
    println!("Known ingredients: {}", stats.vocabulary);
    println!("Lexical features: {}", stats.lexical_features);
    println!(
        "Embedding model: {} ({} dimensions)",
        stats.embedding_model, stats.embedding_dimension
    );
    println!("\nAPI Endpoints:");
    println!("  GET  /api/recipes");
    println!("  GET  /api/recipes/:id");
    println!("  POST /api/ml-recommend");
    println!("  POST /api/nl-recommend");
    println!("  POST /api/semantic-recommend");
    println!("  POST /api/extract");
    println!("  GET  /api/stats");
    println!("\nPress Ctrl+C to stop");
    println!("========================================\n");

    info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| Error::Internal(format!("Server error: {e}")))?;

    info!("Shutting down...");
    Ok(())
}
