use std::collections::BTreeMap;
use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Prefix for every environment override.
const ENV_PREFIX: &str = "SKILLS_";

/// Settings group that environment pool overrides land in
/// (`thread_pool.skills.<pool-name>`).
const ENV_POOL_GROUP: &str = "skills";

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn parse_or_warn<T: std::str::FromStr>(key: &str, value: &str) -> Option<T> {
    match value.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value, "ignoring unparseable environment override");
            None
        }
    }
}

// ── Top-level settings ────────────────────────────────────────

/// Node-wide settings handed to the plugin at startup.
///
/// Parsed from TOML, then layered with `SKILLS_*` environment overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub node: NodeSettings,

    #[serde(default)]
    pub cluster: ClusterConfig,

    /// Thread pool overrides keyed by group then pool name, i.e. the TOML
    /// table `[thread_pool.skills.websearch-crawler-threadpool]`.
    #[serde(default)]
    pub thread_pool: BTreeMap<String, BTreeMap<String, PoolSettings>>,
}

impl Settings {
    /// Parse settings from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(toml_str)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Load from an optional file, then apply environment overrides.
    /// No path means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        settings.apply_env_overrides();
        settings.validate()?;
        Ok(settings)
    }

    /// Apply `SKILLS_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(env::vars());
    }

    /// Apply `SKILLS_*` overrides from an explicit set of variables.
    ///
    /// Recognised keys: `SKILLS_PROCESSORS`, `SKILLS_NODE_NAME`,
    /// `SKILLS_CLUSTER_{HOST,PORT,USE_SSL,USERNAME,PASSWORD}` and
    /// `SKILLS_POOL_<NAME>_{SIZE,QUEUE_SIZE}` where `<NAME>` is the pool name
    /// upper-cased with `-` written as `_`.
    pub fn apply_overrides_from<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref());
            let Some(suffix) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }

            match suffix {
                "PROCESSORS" => {
                    if let Some(n) = parse_or_warn(key, value) {
                        self.node.processors = Some(n);
                    }
                }
                "NODE_NAME" => self.node.name = Some(value.to_string()),
                "CLUSTER_HOST" => self.cluster.host = value.to_string(),
                "CLUSTER_PORT" => {
                    if let Some(port) = parse_or_warn(key, value) {
                        self.cluster.port = port;
                    }
                }
                "CLUSTER_USE_SSL" => {
                    if let Some(use_ssl) = parse_or_warn(key, value) {
                        self.cluster.use_ssl = use_ssl;
                    }
                }
                "CLUSTER_USERNAME" => self.cluster.username = Some(value.to_string()),
                "CLUSTER_PASSWORD" => self.cluster.password = Some(value.to_string()),
                other => {
                    if let Some(pool) = other.strip_prefix("POOL_") {
                        self.apply_pool_override(key, pool, value);
                    }
                }
            }
        }
    }

    fn apply_pool_override(&mut self, key: &str, pool: &str, value: &str) {
        // QUEUE_SIZE must be matched before SIZE, it shares the suffix.
        let (name, is_queue) = if let Some(name) = pool.strip_suffix("_QUEUE_SIZE") {
            (name, true)
        } else if let Some(name) = pool.strip_suffix("_SIZE") {
            (name, false)
        } else {
            return;
        };
        if name.is_empty() {
            return;
        }
        let Some(n) = parse_or_warn::<usize>(key, value) else {
            return;
        };

        let pool_name = name.to_lowercase().replace('_', "-");
        let entry = self
            .thread_pool
            .entry(ENV_POOL_GROUP.to_string())
            .or_default()
            .entry(pool_name)
            .or_default();
        if is_queue {
            entry.queue_size = Some(n);
        } else {
            entry.size = Some(n);
        }
    }

    /// Reject values that can never describe a working node.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node.processors == Some(0) {
            return Err(ConfigError::Invalid(
                "node.processors must be at least 1".into(),
            ));
        }
        for (group, pools) in &self.thread_pool {
            for (name, pool) in pools {
                if pool.size == Some(0) {
                    return Err(ConfigError::Invalid(format!(
                        "thread_pool.{group}.{name}.size must be at least 1"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Processors this node may use: the `node.processors` override when
    /// set, otherwise detected parallelism.
    pub fn allocated_processors(&self) -> usize {
        self.node.processors.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Overrides for a pool registered under a settings prefix such as
    /// `thread_pool.skills`.
    pub fn pool_settings(&self, prefix: &str, name: &str) -> PoolSettings {
        let group = prefix.strip_prefix("thread_pool.").unwrap_or(prefix);
        self.thread_pool
            .get(group)
            .and_then(|pools| pools.get(name))
            .cloned()
            .unwrap_or_default()
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Settings loaded:");
        tracing::info!(
            "  node:        name={}, processors={}",
            self.node.name.as_deref().unwrap_or("(unnamed)"),
            self.allocated_processors()
        );
        tracing::info!("  cluster:     url={}", self.cluster.base_url());
        for (group, pools) in &self.thread_pool {
            for (name, pool) in pools {
                tracing::info!(
                    "  thread_pool: {}.{} size={:?} queue_size={:?}",
                    group,
                    name,
                    pool.size,
                    pool.queue_size
                );
            }
        }
    }
}

// ── Node ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeSettings {
    pub name: Option<String>,
    /// Overrides detected parallelism when set.
    pub processors: Option<usize>,
}

// ── Cluster connection ────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    #[serde(default = "default_cluster_host")]
    pub host: String,
    #[serde(default = "default_cluster_port")]
    pub port: u16,
    #[serde(default)]
    pub use_ssl: bool,
    pub username: Option<String>,
    pub password: Option<String>,
}

fn default_cluster_host() -> String {
    "localhost".into()
}

fn default_cluster_port() -> u16 {
    9200
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            host: default_cluster_host(),
            port: default_cluster_port(),
            use_ssl: false,
            username: None,
            password: None,
        }
    }
}

impl ClusterConfig {
    pub fn base_url(&self) -> String {
        let scheme = if self.use_ssl { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }

    /// Basic-auth pair, only when both halves are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((self.username.as_deref()?, self.password.as_deref()?))
    }
}

// ── Thread pools ──────────────────────────────────────────────

/// Per-pool overrides. Unset fields keep the pool's built-in default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSettings {
    pub size: Option<usize>,
    pub queue_size: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_toml_gives_defaults() {
        let s = Settings::from_toml("").unwrap();
        assert_eq!(s.node.processors, None);
        assert_eq!(s.cluster.base_url(), "http://localhost:9200");
        assert!(s.thread_pool.is_empty());
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[node]
name = "node-1"
processors = 4

[cluster]
host = "search.internal"
port = 9243
use_ssl = true
username = "admin"
password = "secret"

[thread_pool.skills.websearch-crawler-threadpool]
size = 2
queue_size = 50
"#;
        let s = Settings::from_toml(toml).unwrap();
        assert_eq!(s.allocated_processors(), 4);
        assert_eq!(s.cluster.base_url(), "https://search.internal:9243");
        assert_eq!(s.cluster.credentials(), Some(("admin", "secret")));

        let pool = s.pool_settings("thread_pool.skills", "websearch-crawler-threadpool");
        assert_eq!(pool.size, Some(2));
        assert_eq!(pool.queue_size, Some(50));
    }

    #[test]
    fn username_alone_is_not_credentials() {
        let s = Settings::from_toml("[cluster]\nusername = \"admin\"\n").unwrap();
        assert_eq!(s.cluster.credentials(), None);
    }

    #[test]
    fn unknown_pool_has_no_overrides() {
        let s = Settings::default();
        assert_eq!(
            s.pool_settings("thread_pool.skills", "missing"),
            PoolSettings::default()
        );
    }

    #[test]
    fn zero_processors_rejected() {
        let err = Settings::from_toml("[node]\nprocessors = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn zero_pool_size_rejected() {
        let toml = "[thread_pool.skills.crawler]\nsize = 0\n";
        assert!(matches!(
            Settings::from_toml(toml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        assert!(matches!(
            Settings::from_toml("[node\nprocessors = 2"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn env_overrides_apply() {
        let mut s = Settings::default();
        s.apply_overrides_from([
            ("SKILLS_PROCESSORS", "6"),
            ("SKILLS_CLUSTER_HOST", "10.0.0.5"),
            ("SKILLS_CLUSTER_PORT", "9201"),
            ("SKILLS_POOL_WEBSEARCH_CRAWLER_THREADPOOL_SIZE", "5"),
            ("SKILLS_POOL_WEBSEARCH_CRAWLER_THREADPOOL_QUEUE_SIZE", "20"),
            ("UNRELATED", "x"),
        ]);
        assert_eq!(s.allocated_processors(), 6);
        assert_eq!(s.cluster.base_url(), "http://10.0.0.5:9201");

        let pool = s.pool_settings("thread_pool.skills", "websearch-crawler-threadpool");
        assert_eq!(pool.size, Some(5));
        assert_eq!(pool.queue_size, Some(20));
    }

    #[test]
    fn bad_env_values_are_ignored() {
        let mut s = Settings::default();
        s.apply_overrides_from([("SKILLS_PROCESSORS", "many"), ("SKILLS_CLUSTER_PORT", "")]);
        assert_eq!(s.node.processors, None);
        assert_eq!(s.cluster.port, 9200);
    }

    #[test]
    fn use_ssl_override_must_be_a_bool() {
        let mut s = Settings::default();
        s.apply_overrides_from([("SKILLS_CLUSTER_USE_SSL", "true")]);
        assert!(s.cluster.use_ssl);

        s.apply_overrides_from([("SKILLS_CLUSTER_USE_SSL", "yes")]);
        assert!(s.cluster.use_ssl);
        s.apply_overrides_from([("SKILLS_CLUSTER_USE_SSL", "TRUE")]);
        assert!(s.cluster.use_ssl);

        s.apply_overrides_from([("SKILLS_CLUSTER_USE_SSL", "false")]);
        assert!(!s.cluster.use_ssl);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skills.toml");
        std::fs::write(&path, "[node]\nprocessors = 3\n").unwrap();

        let s = Settings::from_file(&path).unwrap();
        assert_eq!(s.allocated_processors(), 3);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::from_file(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn allocated_processors_detects_when_unset() {
        assert!(Settings::default().allocated_processors() >= 1);
    }
}
