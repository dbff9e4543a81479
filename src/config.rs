//! # Configuration
//!
//! Layered configuration for the loader binaries, with precedence:
//! environment > config file > defaults. Environment variables carry the
//! `ORGCHART_` prefix with `__` as the nesting separator, e.g.
//! `ORGCHART_STORE__QUERY_URL`.
//!
//! # Example config file (orgchart.toml)
//! ```toml
//! data_dir = "transactions"
//!
//! [store]
//! update_url = "http://localhost:8080/entities"
//! query_url = "http://localhost:8081/v1/entities"
//!
//! [policy]
//! forbid_minister_termination_with_departments = false
//! ```

use crate::engine::EnginePolicy;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrgConfig {
    /// Directory holding the transaction CSV files.
    pub data_dir: PathBuf,
    /// Entity store endpoints.
    pub store: StoreConfig,
    /// Engine policy toggles.
    pub policy: PolicyConfig,
}

impl Default for OrgConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("transactions"),
            store: StoreConfig::default(),
            policy: PolicyConfig::default(),
        }
    }
}

impl OrgConfig {
    /// Load configuration with precedence: env > file > defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(OrgConfig::default()));
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::prefixed("ORGCHART_").split("__"))
            .extract()
    }
}

/// Entity store endpoints and readiness probing. The store exposes separate
/// update and query services.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub update_url: String,
    pub query_url: String,
    /// Readiness probe attempts before giving up.
    pub probe_attempts: u32,
    /// Delay between probe attempts, in milliseconds.
    pub probe_delay_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            update_url: "http://localhost:8080/entities".to_string(),
            query_url: "http://localhost:8081/v1/entities".to_string(),
            probe_attempts: 5,
            probe_delay_ms: 500,
        }
    }
}

/// Engine policy toggles, mirrored into [`EnginePolicy`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub forbid_minister_termination_with_departments: bool,
}

impl From<PolicyConfig> for EnginePolicy {
    fn from(config: PolicyConfig) -> Self {
        Self {
            forbid_minister_termination_with_departments: config
                .forbid_minister_termination_with_departments,
        }
    }
}
