use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PortraitConfig {
    pub telegram: TelegramConfig,
    pub backend: BackendConfig,
    pub storage: StorageConfig,
    pub classifier: ClassifierConfig,
}

impl PortraitConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: PortraitConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if file doesn't exist, return defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("TELEGRAM_BOT_TOKEN") {
            if !v.trim().is_empty() {
                self.telegram.token = Some(v.trim().to_string());
            }
        }
        if let Ok(v) = std::env::var("TELEGRAM_API_BASE") {
            self.telegram.api_base = v;
        }
        if let Ok(v) = std::env::var("PORTRAIT_ADMIN_IDS") {
            self.telegram.admin_ids = parse_id_list(&v);
        }
        if let Ok(v) = std::env::var("FACE_BACKEND_URL") {
            self.backend.url = v;
        }
        if let Ok(v) = std::env::var("PORTRAIT_DB_PATH") {
            self.storage.db_path = v;
        }
        if let Ok(v) = std::env::var("PORTRAIT_CLASSIFIER") {
            match v.parse() {
                Ok(strategy) => self.classifier.strategy = strategy,
                Err(e) => tracing::warn!("Ignoring PORTRAIT_CLASSIFIER: {}", e),
            }
        }
    }
}

/// Comma separated Telegram user ids; malformed entries are skipped.
fn parse_id_list(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect()
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub token: Option<String>,
    pub api_base: String,
    /// Long-poll timeout passed to getUpdates
    pub poll_timeout_secs: u64,
    /// Max characters per outgoing message
    pub chunk_size: usize,
    /// Users allowed to run /summary
    pub admin_ids: Vec<i64>,
    /// Where downloaded photos are written
    pub photo_dir: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: "https://api.telegram.org".to_string(),
            poll_timeout_secs: 30,
            chunk_size: 3500,
            admin_ids: vec![],
            photo_dir: "photos".to_string(),
        }
    }
}

impl TelegramConfig {
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Endpoint accepting raw image bytes and returning a face analysis
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8500/analyze".to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: "reports.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierStrategy {
    /// Ordered rule table, no training
    Rules,
    /// Random forest trained on synthetic profiles at startup
    #[default]
    Forest,
}

impl FromStr for ClassifierStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rules" | "rule" => Ok(ClassifierStrategy::Rules),
            "forest" | "random_forest" => Ok(ClassifierStrategy::Forest),
            other => Err(format!("unknown classifier strategy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub strategy: ClassifierStrategy,
    pub trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Synthetic training samples generated per category
    pub samples_per_class: usize,
    pub seed: u64,
    /// Below this the forest answers `mixed`
    pub min_confidence: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            strategy: ClassifierStrategy::Forest,
            trees: 250,
            max_depth: 12,
            min_samples_split: 3,
            min_samples_leaf: 2,
            samples_per_class: 40,
            seed: 42,
            min_confidence: 0.45,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
