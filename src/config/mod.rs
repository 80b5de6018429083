// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration
//!
//! Every section is loaded from environment variables (a `.env` file is
//! honoured by the binaries through `dotenv`). Only `JWT_SECRET` is
//! required; everything else falls back to the defaults below.

use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Name of the vector collection holding support documents
pub const DEFAULT_COLLECTION: &str = "support_docs";

/// Dimension of `text-embedding-3-small` vectors
pub const DEFAULT_EMBEDDING_DIM: usize = 1536;

/// Upload size limit (10MB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const MIN_SECRET_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub password_iterations: u32,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_connections: usize,
    pub acquire_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub collection: String,
    pub dimension: usize,
    /// Upper bound on points read when listing documents
    pub scan_limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProvider {
    OpenAi,
    /// Local feature-hashing embedder, no network access
    Hashing,
}

impl FromStr for EmbeddingProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(EmbeddingProvider::OpenAi),
            "hashing" | "local" => Ok(EmbeddingProvider::Hashing),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct RagConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub max_top_k: usize,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
    pub index: IndexConfig,
    pub embedding: EmbeddingConfig,
    pub generation: GenerationConfig,
    pub rag: RagConfig,
}

impl AppConfig {
    /// Defaults for everything, with the given signing secret
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            server: ServerConfig {
                bind_addr: "0.0.0.0:3000".to_string(),
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
            auth: AuthConfig {
                jwt_secret: jwt_secret.into(),
                token_ttl: Duration::from_secs(24 * 60 * 60),
                password_iterations: 100_000,
            },
            database: DatabaseConfig {
                path: "./data/users.db".to_string(),
                max_connections: 20,
                acquire_timeout: Duration::from_millis(2000),
            },
            index: IndexConfig {
                url: "http://localhost:6333".to_string(),
                api_key: None,
                collection: DEFAULT_COLLECTION.to_string(),
                dimension: DEFAULT_EMBEDDING_DIM,
                scan_limit: 1000,
            },
            embedding: EmbeddingConfig {
                provider: EmbeddingProvider::OpenAi,
                base_url: "https://api.openai.com".to_string(),
                api_key: None,
                model: "text-embedding-3-small".to_string(),
                max_retries: 3,
                retry_base_delay: Duration::from_millis(500),
                request_timeout: Duration::from_secs(30),
            },
            generation: GenerationConfig {
                base_url: "https://api.openai.com".to_string(),
                api_key: None,
                model: "gpt-4".to_string(),
                temperature: 0.1,
                request_timeout: Duration::from_secs(120),
            },
            rag: RagConfig {
                chunk_size: 1000,
                chunk_overlap: 200,
                top_k: 4,
                max_top_k: 20,
            },
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let mut config = Self::new(secret);
        let vars = Vars { lookup: &lookup };

        config.server.bind_addr = vars.string("BIND_ADDR", &config.server.bind_addr);
        config.server.max_upload_bytes =
            vars.parse("MAX_UPLOAD_BYTES", config.server.max_upload_bytes)?;

        config.auth.token_ttl =
            Duration::from_secs(vars.parse("TOKEN_TTL_SECS", config.auth.token_ttl.as_secs())?);
        config.auth.password_iterations =
            vars.parse("PASSWORD_HASH_ITERATIONS", config.auth.password_iterations)?;

        config.database.path = vars.string("DATABASE_PATH", &config.database.path);
        config.database.max_connections =
            vars.parse("DB_POOL_MAX", config.database.max_connections)?;
        config.database.acquire_timeout = Duration::from_millis(vars.parse(
            "DB_POOL_TIMEOUT_MS",
            config.database.acquire_timeout.as_millis() as u64,
        )?);

        config.index.url = vars.string("QDRANT_URL", &config.index.url);
        config.index.api_key = lookup("QDRANT_API_KEY").filter(|k| !k.is_empty());
        config.index.collection = vars.string("QDRANT_COLLECTION", &config.index.collection);
        config.index.dimension = vars.parse("EMBEDDING_DIM", config.index.dimension)?;
        config.index.scan_limit = vars.parse("DOCUMENTS_SCAN_LIMIT", config.index.scan_limit)?;

        let openai_key = lookup("OPENAI_API_KEY").filter(|k| !k.is_empty());
        let openai_url = vars.string("OPENAI_BASE_URL", &config.embedding.base_url);

        config.embedding.provider = vars.parse("EMBEDDING_PROVIDER", config.embedding.provider)?;
        config.embedding.base_url = openai_url.clone();
        config.embedding.api_key = openai_key.clone();
        config.embedding.model = vars.string("EMBEDDING_MODEL", &config.embedding.model);
        config.embedding.max_retries =
            vars.parse("EMBEDDING_MAX_RETRIES", config.embedding.max_retries)?;
        config.embedding.retry_base_delay = Duration::from_millis(vars.parse(
            "EMBEDDING_RETRY_BASE_MS",
            config.embedding.retry_base_delay.as_millis() as u64,
        )?);

        config.generation.base_url = openai_url;
        config.generation.api_key = openai_key;
        config.generation.model = vars.string("CHAT_MODEL", &config.generation.model);
        config.generation.temperature =
            vars.parse("CHAT_TEMPERATURE", config.generation.temperature)?;

        config.rag.chunk_size = vars.parse("CHUNK_SIZE", config.rag.chunk_size)?;
        config.rag.chunk_overlap = vars.parse("CHUNK_OVERLAP", config.rag.chunk_overlap)?;
        config.rag.top_k = vars.parse("RETRIEVAL_TOP_K", config.rag.top_k)?;
        config.rag.max_top_k = vars.parse("RETRIEVAL_MAX_TOP_K", config.rag.max_top_k)?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Validation(format!(
                "JWT secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }
        if self.auth.token_ttl.is_zero() {
            return Err(ConfigError::Validation(
                "Token TTL must be greater than 0".to_string(),
            ));
        }
        if self.auth.password_iterations == 0 {
            return Err(ConfigError::Validation(
                "Password hash iterations must be greater than 0".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "Database pool size must be at least 1".to_string(),
            ));
        }
        if self.index.dimension == 0 {
            return Err(ConfigError::Validation(
                "Embedding dimension must be greater than 0".to_string(),
            ));
        }
        if self.rag.chunk_size == 0 || self.rag.chunk_overlap >= self.rag.chunk_size {
            return Err(ConfigError::Validation(format!(
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                self.rag.chunk_overlap, self.rag.chunk_size
            )));
        }
        if self.rag.top_k == 0 || self.rag.max_top_k < self.rag.top_k {
            return Err(ConfigError::Validation(format!(
                "Retrieval top_k ({}) must be between 1 and max_top_k ({})",
                self.rag.top_k, self.rag.max_top_k
            )));
        }
        Ok(())
    }
}

struct Vars<'a, F: Fn(&str) -> Option<String>> {
    lookup: &'a F,
}

impl<'a, F: Fn(&str) -> Option<String>> Vars<'a, F> {
    fn string(&self, key: &str, default: &str) -> String {
        (self.lookup)(key)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    fn parse<T: FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError> {
        match (self.lookup)(key).filter(|v| !v.is_empty()) {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { key, value }),
            None => Ok(default),
        }
    }
}
