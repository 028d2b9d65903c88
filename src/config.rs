use serde::Deserialize;
use std::path::Path;

/// Default config file, overridable with `HOMEWORK_CONFIG`.
pub const DEFAULT_CONFIG_PATH: &str = "homework.toml";

/// Used when `MILVUS_ADDRESS` is not set.
pub const DEFAULT_MILVUS_ADDRESS: &str = "localhost:19530";

// ──────────────────────────── TOML structure ────────────────────────────

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub vector_store: VectorStoreConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub vision: VisionConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default = "default_service_name")]
    pub name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            name: default_service_name(),
        }
    }
}

fn default_environment() -> String {
    "development".to_string()
}
fn default_service_name() -> String {
    "AI Homework Helper API".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_provider")]
    pub provider: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_table")]
    pub table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            provider: default_database_provider(),
            pool_size: default_pool_size(),
            table: default_table(),
        }
    }
}

fn default_database_provider() -> String {
    "supabase".to_string()
}
fn default_pool_size() -> u32 {
    5
}
fn default_table() -> String {
    "questions".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct VectorStoreConfig {
    #[serde(default = "default_vector_provider")]
    pub provider: String,
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            provider: default_vector_provider(),
            collection: default_collection(),
        }
    }
}

fn default_vector_provider() -> String {
    "milvus".to_string()
}
fn default_collection() -> String {
    "question_vectors".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    /// Expected vector length; 0 disables the check.
    #[serde(default = "default_dimensions")]
    pub dimensions: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            dimensions: default_dimensions(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_embedding_provider() -> String {
    "remote".to_string()
}
fn default_dimensions() -> u32 {
    512
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct VisionConfig {
    #[serde(default = "default_ocr_provider")]
    pub ocr_provider: String,
    #[serde(default = "default_rectify_provider")]
    pub rectify_provider: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            ocr_provider: default_ocr_provider(),
            rectify_provider: default_rectify_provider(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_ocr_provider() -> String {
    "demo".to_string()
}
fn default_rectify_provider() -> String {
    "passthrough".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_storage_provider")]
    pub provider: String,
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_storage_provider(),
            storage_path: default_storage_path(),
            public_base_url: default_public_base_url(),
        }
    }
}

fn default_storage_provider() -> String {
    "local".to_string()
}
fn default_storage_path() -> String {
    "./storage/uploads".to_string()
}
fn default_public_base_url() -> String {
    "/uploads".to_string()
}

// ──────────────────────────── Resolved Settings ────────────────────────────

/// Flat settings structure resolved from TOML + environment variables.
#[derive(Debug, Clone)]
pub struct Settings {
    // API
    pub host: String,
    pub port: u16,

    // Service
    pub environment: String,
    pub service_name: String,

    // Question store
    pub database_provider: String,
    pub db_pool_size: u32,
    pub questions_table: String,
    pub supabase_url: Option<String>,
    pub supabase_service_key: Option<String>,
    pub postgres_uri: Option<String>,

    // Vector index
    pub vector_store_provider: String,
    pub milvus_address: String,
    pub vector_collection: String,

    // Embedding
    pub embedding_provider: String,
    pub embedding_api_base: Option<String>,
    pub vector_dimensions: u32,
    pub embedding_timeout_secs: u64,

    // Vision
    pub ocr_provider: String,
    pub ocr_api_url: Option<String>,
    pub rectify_provider: String,
    pub rectify_api_url: Option<String>,
    pub vision_timeout_secs: u64,

    // Storage
    pub storage_provider: String,
    pub storage_path: String,
    pub public_base_url: String,
}

impl Settings {
    /// Resolve settings from a parsed TOML document and the process environment.
    ///
    /// Nothing here is validated: a missing store URL only surfaces when the
    /// store is first used, so the service can start (and answer health checks)
    /// before its backends are configured.
    pub fn from_toml(config: TomlConfig) -> Self {
        let milvus_address = std::env::var("MILVUS_ADDRESS")
            .unwrap_or_else(|_| DEFAULT_MILVUS_ADDRESS.to_string());

        Self {
            host: config.api.host,
            port: config.api.port,
            environment: config.service.environment,
            service_name: config.service.name,
            database_provider: config.database.provider,
            db_pool_size: config.database.pool_size,
            questions_table: config.database.table,
            supabase_url: env_opt("SUPABASE_URL"),
            supabase_service_key: env_opt("SUPABASE_SERVICE_KEY"),
            postgres_uri: env_opt("POSTGRES_URI"),
            vector_store_provider: config.vector_store.provider,
            milvus_address,
            vector_collection: config.vector_store.collection,
            embedding_provider: config.embedding.provider,
            embedding_api_base: env_opt("VERCEL_URL"),
            vector_dimensions: config.embedding.dimensions,
            embedding_timeout_secs: config.embedding.timeout_secs,
            ocr_provider: config.vision.ocr_provider,
            ocr_api_url: env_opt("OCR_API_URL"),
            rectify_provider: config.vision.rectify_provider,
            rectify_api_url: env_opt("RECTIFY_API_URL"),
            vision_timeout_secs: config.vision.timeout_secs,
            storage_provider: config.storage.provider,
            storage_path: config.storage.storage_path,
            public_base_url: config.storage.public_base_url,
        }
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Load settings from `HOMEWORK_CONFIG` (or `homework.toml`), falling back to
/// built-in defaults when the file does not exist.
pub fn load_settings() -> anyhow::Result<Settings> {
    // Load .env if present (ignore errors)
    let _ = dotenvy::dotenv();

    let path = std::env::var("HOMEWORK_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if Path::new(&path).exists() {
        load_settings_from_path(&path)
    } else {
        tracing::warn!("Config file {path} not found, using defaults");
        Ok(Settings::from_toml(TomlConfig::default()))
    }
}

/// Load settings from a given TOML path. Useful for testing.
pub fn load_settings_from_path(path: impl AsRef<Path>) -> anyhow::Result<Settings> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let config: TomlConfig = toml::from_str(&content)?;
    Ok(Settings::from_toml(config))
}
