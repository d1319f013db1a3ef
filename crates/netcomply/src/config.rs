//! Configuration loading and types

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{WrapErr, bail, eyre};
use netcomply_core::{ErrorKind, FleetConfig};
use netcomply_inventory::DeviceFilter;
use serde::{Deserialize, Serialize};

/// Route key applied to every kind without its own entry
pub const DEFAULT_ROUTE: &str = "default";

/// Built-in structured log sink, always available to routes
pub const LOG_SINK: &str = "log";

/// Top-level configuration for netcomply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run: RunConfig,
    /// Named inventory endpoints
    #[serde(default)]
    pub environments: BTreeMap<String, EnvironmentConfig>,
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub snmp: SnmpConfig,
    #[serde(default)]
    pub compliance: ComplianceConfig,
    /// Sink definitions, referenced by name from `routes`
    #[serde(default)]
    pub reporters: Vec<ReporterConfig>,
    /// Error kind (or `default`) to sink names
    #[serde(default)]
    pub routes: BTreeMap<String, Vec<String>>,
}

/// Run settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Devices checked in parallel
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Per-query timeout in seconds
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,
    /// Inventory request timeout in seconds
    #[serde(default = "default_inventory_timeout")]
    pub inventory_timeout_secs: u64,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_true")]
    pub cache_mappings: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            query_timeout_secs: default_query_timeout(),
            inventory_timeout_secs: default_inventory_timeout(),
            log_level: default_log_level(),
            cache_mappings: true,
        }
    }
}

fn default_concurrency() -> usize {
    4
}

fn default_query_timeout() -> u64 {
    5
}

fn default_inventory_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

/// One inventory endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Inventory base URL
    pub url: String,
    /// Environment variable holding the API token
    pub token_env: String,
}

/// Device selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryConfig {
    #[serde(default = "default_status")]
    pub status: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    /// Restrict the run to these device names
    #[serde(default)]
    pub devices: Vec<String>,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            status: default_status(),
            roles: Vec::new(),
            devices: Vec::new(),
            page_size: default_page_size(),
        }
    }
}

#[allow(clippy::unnecessary_wraps)]
fn default_status() -> Option<String> {
    Some("active".to_string())
}

fn default_page_size() -> usize {
    250
}

/// SNMP protocol version
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnmpVersion {
    V2c,
    #[default]
    V3,
}

/// SNMP settings; credentials are read from the environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnmpConfig {
    #[serde(default = "default_snmp_port")]
    pub port: u16,
    #[serde(default)]
    pub version: SnmpVersion,
    /// v2c community
    #[serde(default = "default_community_env")]
    pub community_env: String,
    /// v3 user name
    #[serde(default = "default_user_env")]
    pub user_env: String,
    /// v3 SHA authentication password
    #[serde(default = "default_auth_env")]
    pub auth_env: String,
    /// v3 AES privacy password
    #[serde(default = "default_priv_env")]
    pub priv_env: String,
}

impl Default for SnmpConfig {
    fn default() -> Self {
        Self {
            port: default_snmp_port(),
            version: SnmpVersion::default(),
            community_env: default_community_env(),
            user_env: default_user_env(),
            auth_env: default_auth_env(),
            priv_env: default_priv_env(),
        }
    }
}

fn default_snmp_port() -> u16 {
    161
}

fn default_community_env() -> String {
    "NETCOMPLY_SNMP_COMMUNITY".to_string()
}

fn default_user_env() -> String {
    "snmp_user".to_string()
}

fn default_auth_env() -> String {
    "snmp_auth".to_string()
}

fn default_priv_env() -> String {
    "snmp_priv".to_string()
}

/// Reconciliation thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceConfig {
    /// Devices up this many days or longer fail
    #[serde(default = "default_max_uptime_days")]
    pub max_uptime_days: u64,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            max_uptime_days: default_max_uptime_days(),
        }
    }
}

fn default_max_uptime_days() -> u64 {
    365
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    Log,
    JsonLines,
    Webhook,
}

/// A named reporting sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReporterConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub sink: SinkType,
    /// Output file for `json_lines`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Endpoint for `webhook`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read, parsed or validated
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .wrap_err_with(|| format!("failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, the default paths or use defaults
    ///
    /// Returns the config together with the file it came from, if any.
    ///
    /// # Errors
    /// Returns error if a config file exists but is invalid
    pub fn load_default(explicit: Option<&Path>) -> eyre::Result<(Self, Option<PathBuf>)> {
        // Explicit path or environment variable must exist
        let chosen = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("NETCOMPLY_CONFIG").map(PathBuf::from));
        if let Some(path) = chosen {
            return Ok((Self::load(&path)?, Some(path)));
        }

        let mut paths = vec![
            PathBuf::from("netcomply.toml"),
            PathBuf::from("/etc/netcomply/netcomply.toml"),
        ];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("netcomply/netcomply.toml"));
        }

        for path in paths {
            if path.exists() {
                return Ok((Self::load(&path)?, Some(path)));
            }
        }

        Ok((Config::default(), None))
    }

    /// Check cross references and limits
    ///
    /// # Errors
    /// Returns the first problem found
    pub fn validate(&self) -> eyre::Result<()> {
        self.fleet().validate()?;

        if self.inventory.page_size == 0 {
            bail!("inventory.page_size must be at least 1");
        }

        let mut names = HashSet::new();
        for reporter in &self.reporters {
            if !names.insert(reporter.name.as_str()) {
                bail!("reporter {:?} is defined more than once", reporter.name);
            }
            match reporter.sink {
                SinkType::Log => {}
                SinkType::JsonLines => {
                    if reporter.path.is_none() {
                        bail!("reporter {:?} needs a path", reporter.name);
                    }
                }
                SinkType::Webhook => {
                    let url = reporter
                        .url
                        .as_deref()
                        .ok_or_else(|| eyre!("reporter {:?} needs a url", reporter.name))?;
                    url::Url::parse(url).wrap_err_with(|| {
                        format!("reporter {:?} has an invalid url", reporter.name)
                    })?;
                }
            }
        }

        for (key, sinks) in &self.routes {
            if key != DEFAULT_ROUTE {
                let kind: ErrorKind = key
                    .parse()
                    .wrap_err_with(|| format!("invalid route {key:?}"))?;
                if kind.is_fatal() {
                    bail!("{kind} aborts the run and cannot be routed");
                }
            }
            for sink in sinks {
                if sink != LOG_SINK && !names.contains(sink.as_str()) {
                    bail!("route {key:?} references unknown reporter {sink:?}");
                }
            }
        }

        Ok(())
    }

    /// Look up an environment by name
    ///
    /// # Errors
    /// Returns error if the environment is not configured
    pub fn environment(&self, name: &str) -> eyre::Result<&EnvironmentConfig> {
        self.environments.get(name).ok_or_else(|| {
            let known: Vec<&str> = self.environments.keys().map(String::as_str).collect();
            if known.is_empty() {
                eyre!("environment {name:?} is not configured (no environments defined)")
            } else {
                eyre!(
                    "environment {name:?} is not configured (known: {})",
                    known.join(", ")
                )
            }
        })
    }

    /// Sink names for every routable kind
    ///
    /// Kinds with their own entry use it as is, even when it is empty; all
    /// others get the `default` route, which itself falls back to the log sink.
    pub fn resolved_routes(&self) -> BTreeMap<ErrorKind, Vec<String>> {
        let default = self
            .routes
            .get(DEFAULT_ROUTE)
            .cloned()
            .unwrap_or_else(|| vec![LOG_SINK.to_string()]);

        ErrorKind::PER_DEVICE
            .into_iter()
            .map(|kind| {
                let sinks = self
                    .routes
                    .get(kind.as_str())
                    .cloned()
                    .unwrap_or_else(|| default.clone());
                (kind, sinks)
            })
            .collect()
    }

    /// Engine settings
    pub fn fleet(&self) -> FleetConfig {
        FleetConfig {
            concurrency: self.run.concurrency,
            query_timeout: Duration::from_secs(self.run.query_timeout_secs),
            cache_mappings: self.run.cache_mappings,
            ..FleetConfig::default()
        }
        .with_max_uptime_days(self.compliance.max_uptime_days)
    }

    /// Device selection, narrowed to `names` when any are given
    pub fn device_filter(&self, names: &[String]) -> DeviceFilter {
        let names = if names.is_empty() {
            self.inventory.devices.clone()
        } else {
            names.to_vec()
        };

        DeviceFilter {
            status: self.inventory.status.clone(),
            roles: self.inventory.roles.clone(),
            names,
        }
    }
}

/// Annotated example configuration
pub fn example_toml() -> &'static str {
    include_str!("../netcomply.example.toml")
}
