use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Upper bound on `API_RATE_LIMIT` (requests per second per client); the
/// limiter replenishes at most one request per millisecond.
pub const MAX_API_RATE_LIMIT: u64 = 1_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data: DataConfig,
    pub server: ServerConfig,
    pub engine: EngineConfig,
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub recipes_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_rate_limit: u64,
    pub max_request_body_size: usize,
}

/// Ranking knobs shared by both indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub default_top_n: usize,
    pub max_top_n: usize,
    pub similarity_threshold: f64,
    pub max_features: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_top_n: 5,
            max_top_n: 50,
            similarity_threshold: 0.1,
            max_features: 5000,
        }
    }
}

/// Which embedding backend the semantic index uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Sentence-transformer weights run in-process from `model_dir`
    Local,
    /// OpenAI-compatible endpoint at `url`
    Http,
    /// Feature hashing; no model files, not semantic
    Hashing,
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "http" | "remote" => Ok(Self::Http),
            "hashing" => Ok(Self::Hashing),
            other => Err(Error::Config(format!(
                "Unknown EMBEDDING_PROVIDER '{other}' (expected local, http or hashing)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    /// OpenAI-compatible base URL, required by the `http` provider
    pub url: Option<String>,
    pub model: String,
    /// Directory holding `config.json`, `tokenizer.json` and `model.safetensors`
    pub model_dir: PathBuf,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub dimension: usize,
    pub timeout_seconds: u64,
    pub batch_size: usize,
    pub cache_path: Option<PathBuf>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Local,
            url: None,
            model: "all-MiniLM-L6-v2".to_string(),
            model_dir: PathBuf::from("models/all-MiniLM-L6-v2"),
            api_key: None,
            dimension: 384,
            timeout_seconds: 10,
            batch_size: 64,
            cache_path: None,
        }
    }
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        let recipes_path = std::env::var("RECIPES_PATH")
            .unwrap_or_else(|_| "./data/recipes.json".to_string())
            .into();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid PORT value".to_string()))?;

        let api_rate_limit = std::env::var("API_RATE_LIMIT")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid API_RATE_LIMIT value".to_string()))?;

        let max_request_body_size = std::env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| "65536".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid MAX_REQUEST_BODY_SIZE value".to_string()))?;

        let default_top_n = std::env::var("DEFAULT_TOP_N")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid DEFAULT_TOP_N value".to_string()))?;

        let max_top_n = std::env::var("MAX_TOP_N")
            .unwrap_or_else(|_| "50".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid MAX_TOP_N value".to_string()))?;

        let similarity_threshold = std::env::var("SIMILARITY_THRESHOLD")
            .unwrap_or_else(|_| "0.1".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid SIMILARITY_THRESHOLD value".to_string()))?;

        let max_features = std::env::var("MAX_FEATURES")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid MAX_FEATURES value".to_string()))?;

        let embedding_url = std::env::var("EMBEDDING_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        // An endpoint alone selects the http provider
        let embedding_provider = match std::env::var("EMBEDDING_PROVIDER") {
            Ok(value) if !value.trim().is_empty() => value.parse()?,
            _ if embedding_url.is_some() => EmbeddingProvider::Http,
            _ => EmbeddingProvider::Local,
        };

        let embedding_model = std::env::var("EMBEDDING_MODEL")
            .unwrap_or_else(|_| "all-MiniLM-L6-v2".to_string());

        let embedding_model_dir = std::env::var("EMBEDDING_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("models").join(&embedding_model));

        let embedding_api_key = std::env::var("EMBEDDING_API_KEY").ok();

        let embedding_dimension = std::env::var("EMBEDDING_DIMENSION")
            .unwrap_or_else(|_| "384".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid EMBEDDING_DIMENSION value".to_string()))?;

        let embedding_timeout = std::env::var("EMBEDDING_TIMEOUT")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid EMBEDDING_TIMEOUT value".to_string()))?;

        let embedding_batch_size = std::env::var("EMBEDDING_BATCH_SIZE")
            .unwrap_or_else(|_| "64".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid EMBEDDING_BATCH_SIZE value".to_string()))?;

        let embedding_cache_path = std::env::var("EMBEDDING_CACHE_PATH")
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(Settings {
            data: DataConfig { recipes_path },
            server: ServerConfig {
                host,
                port,
                api_rate_limit,
                max_request_body_size,
            },
            engine: EngineConfig {
                default_top_n,
                max_top_n,
                similarity_threshold,
                max_features,
            },
            embedding: EmbeddingConfig {
                provider: embedding_provider,
                url: embedding_url,
                model: embedding_model,
                model_dir: embedding_model_dir,
                api_key: embedding_api_key,
                dimension: embedding_dimension,
                timeout_seconds: embedding_timeout,
                batch_size: embedding_batch_size,
                cache_path: embedding_cache_path,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("Port must be non-zero".to_string()));
        }

        if self.server.api_rate_limit == 0 || self.server.api_rate_limit > MAX_API_RATE_LIMIT {
            return Err(Error::Config(format!(
                "API rate limit must be between 1 and {MAX_API_RATE_LIMIT}"
            )));
        }

        if self.engine.default_top_n == 0 || self.engine.default_top_n > self.engine.max_top_n {
            return Err(Error::Config(format!(
                "DEFAULT_TOP_N must be between 1 and MAX_TOP_N ({})",
                self.engine.max_top_n
            )));
        }

        if !(0.0..1.0).contains(&self.engine.similarity_threshold) {
            return Err(Error::Config(
                "Similarity threshold must be in [0, 1)".to_string(),
            ));
        }

        if self.engine.max_features == 0 {
            return Err(Error::Config("MAX_FEATURES must be non-zero".to_string()));
        }

        if self.embedding.dimension == 0 {
            return Err(Error::Config(
                "Embedding dimension must be non-zero".to_string(),
            ));
        }

        if self.embedding.batch_size == 0 {
            return Err(Error::Config(
                "Embedding batch size must be non-zero".to_string(),
            ));
        }

        if self.embedding.provider == EmbeddingProvider::Http && self.embedding.url.is_none() {
            return Err(Error::Config(
                "EMBEDDING_PROVIDER=http requires EMBEDDING_URL".to_string(),
            ));
        }

        if let Some(url) = &self.embedding.url {
            let parsed = url::Url::parse(url)?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::Config(format!(
                    "Embedding URL must use http or https: {url}"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings() -> Settings {
        Settings {
            data: DataConfig {
                recipes_path: "/tmp/recipes.json".into(),
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
                api_rate_limit: 100,
                max_request_body_size: 65536,
            },
            engine: EngineConfig::default(),
            embedding: EmbeddingConfig::default(),
        }
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = test_settings();
        assert!(settings.validate().is_ok());

        settings.server.port = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rate_limit_bounds() {
        let mut settings = test_settings();
        settings.server.api_rate_limit = MAX_API_RATE_LIMIT;
        assert!(settings.validate().is_ok());

        settings.server.api_rate_limit = 0;
        assert!(settings.validate().is_err());

        settings.server.api_rate_limit = u64::from(u32::MAX) + 1;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_engine_limits_validation() {
        let mut settings = test_settings();
        settings.engine.default_top_n = 100;
        assert!(settings.validate().is_err());

        let mut settings = test_settings();
        settings.engine.similarity_threshold = 1.5;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_embedding_url_validation() {
        let mut settings = test_settings();
        settings.embedding.url = Some("https://api.example.com/v1".to_string());
        assert!(settings.validate().is_ok());

        settings.embedding.url = Some("ftp://api.example.com".to_string());
        assert!(settings.validate().is_err());

        settings.embedding.url = Some("not a url".to_string());
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_http_provider_requires_url() {
        let mut settings = test_settings();
        settings.embedding.provider = EmbeddingProvider::Http;
        assert!(settings.validate().is_err());

        settings.embedding.url = Some("http://localhost:8080/v1".to_string());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("local".parse::<EmbeddingProvider>().unwrap(), EmbeddingProvider::Local);
        assert_eq!(" HTTP ".parse::<EmbeddingProvider>().unwrap(), EmbeddingProvider::Http);
        assert_eq!("hashing".parse::<EmbeddingProvider>().unwrap(), EmbeddingProvider::Hashing);
        assert!(matches!(
            "onnx".parse::<EmbeddingProvider>(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_engine_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.default_top_n, 5);
        assert_eq!(config.max_features, 5000);
        assert!((config.similarity_threshold - 0.1).abs() < f64::EPSILON);
    }
}
