pub mod config;
pub mod error;

pub use config::{load_dotenv, ClusterConfig, NodeSettings, PoolSettings, Settings};
pub use error::ConfigError;
