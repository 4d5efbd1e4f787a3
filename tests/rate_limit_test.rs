// Per-client rate limiting on the API routes. The limiter is only compiled into
// non-test builds of the library, so it is exercised from here.

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::Router;
use recommender::api::{handlers::AppState, routes::create_router};
use recommender::config::{
    DataConfig, EmbeddingConfig, EngineConfig, ServerConfig, Settings,
};
use recommender::corpus::{Corpus, Recipe};
use recommender::embedding::HashingEmbedder;
use recommender::Engine;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

async fn app(api_rate_limit: u64) -> Router {
    let settings = Settings {
        data: DataConfig {
            recipes_path: "/tmp/recipes.json".into(),
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            api_rate_limit,
            max_request_body_size: 65536,
        },
        engine: EngineConfig::default(),
        embedding: EmbeddingConfig::default(),
    };

    let corpus = Corpus::from_recipes(vec![Recipe::new("Boiled Egg", &["egg", "salt"])]);
    let engine = Engine::build(
        corpus,
        Arc::new(HashingEmbedder::new(16)),
        &settings.engine,
        &settings.embedding,
    )
    .await
    .unwrap();

    let state = AppState {
        engine: Arc::new(engine),
        settings: settings.clone(),
    };
    create_router(state, &settings).unwrap()
}

async fn stats_from(app: &Router, peer: &str) -> StatusCode {
    let addr: SocketAddr = peer.parse().unwrap();
    let request = Request::builder()
        .uri("/api/stats")
        .extension(ConnectInfo(addr))
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap().status()
}

#[tokio::test]
async fn test_clients_are_limited_independently() {
    // One request per second with a burst of two
    let app = app(1).await;

    assert_eq!(stats_from(&app, "10.0.0.1:40000").await, StatusCode::OK);
    assert_eq!(stats_from(&app, "10.0.0.1:40001").await, StatusCode::OK);
    assert_eq!(
        stats_from(&app, "10.0.0.1:40002").await,
        StatusCode::TOO_MANY_REQUESTS
    );

    // A different peer still has its full burst
    assert_eq!(stats_from(&app, "192.168.1.2:50000").await, StatusCode::OK);
    assert_eq!(stats_from(&app, "192.168.1.2:50001").await, StatusCode::OK);
}

#[tokio::test]
async fn test_health_routes_are_not_limited() {
    let app = app(1).await;
    for _ in 0..5 {
        let request = Request::builder()
            .uri("/health")
            .extension(ConnectInfo("10.0.0.9:1234".parse::<SocketAddr>().unwrap()))
            .body(Body::empty())
            .unwrap();
        let status = app.clone().oneshot(request).await.unwrap().status();
        assert_eq!(status, StatusCode::OK);
    }
}
