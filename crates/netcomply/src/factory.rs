//! Builds the inventory client, transport and reporters from configuration

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use eyre::{Result, WrapErr, eyre};
use netcomply_core::{
    JsonLinesReporter, LogReporter, Reporter, ReporterRegistry, WebhookReporter,
};
use netcomply_inventory::{InventorySource, NetboxClient};
use netcomply_transport::{SnmpSettings, SnmpTransport, TelemetryTransport, UsmCredentials};

use crate::config::{
    Config, EnvironmentConfig, LOG_SINK, ReporterConfig, SinkType, SnmpConfig, SnmpVersion,
};

/// Read a secret from the environment
///
/// # Errors
/// Returns error if the variable is unset or blank
pub fn read_secret(var: &str) -> Result<String> {
    let value = std::env::var(var)
        .wrap_err_with(|| format!("environment variable {var} is not set"))?;
    if value.trim().is_empty() {
        return Err(eyre!("environment variable {var} is empty"));
    }
    Ok(value)
}

/// Create the inventory client for an environment
///
/// # Errors
/// Returns error if the URL or token is unusable
pub fn inventory_client(
    config: &Config,
    environment: &EnvironmentConfig,
    token: String,
) -> Result<Arc<dyn InventorySource>> {
    let client = NetboxClient::new(&environment.url, token)
        .wrap_err_with(|| format!("invalid inventory endpoint {}", environment.url))?
        .with_timeout(Duration::from_secs(config.run.inventory_timeout_secs))
        .with_page_size(config.inventory.page_size);
    Ok(Arc::new(client))
}

/// Create the SNMP transport, reading the credentials for the configured version
///
/// # Errors
/// Returns error if a credential variable is unset or blank
pub fn snmp_transport(config: &SnmpConfig) -> Result<Arc<dyn TelemetryTransport>> {
    let settings = match config.version {
        SnmpVersion::V2c => {
            let community =
                read_secret(&config.community_env).wrap_err("SNMP community not found")?;
            SnmpSettings::new(community)
        }
        SnmpVersion::V3 => {
            let credentials = UsmCredentials::new(
                read_secret(&config.user_env).wrap_err("SNMPv3 user not found")?,
                read_secret(&config.auth_env).wrap_err("SNMPv3 auth password not found")?,
                read_secret(&config.priv_env).wrap_err("SNMPv3 privacy password not found")?,
            );
            SnmpSettings::v3(credentials)
        }
    }
    .with_port(config.port);

    tracing::debug!(settings = ?settings, "SNMP transport ready");

    Ok(Arc::new(SnmpTransport::new(settings)))
}

async fn build_sink(config: &ReporterConfig) -> Result<Arc<dyn Reporter>> {
    let sink: Arc<dyn Reporter> = match config.sink {
        SinkType::Log => Arc::new(LogReporter::new().with_name(&config.name)),
        SinkType::JsonLines => {
            let path = config
                .path
                .as_ref()
                .ok_or_else(|| eyre!("reporter {:?} needs a path", config.name))?;
            let reporter = JsonLinesReporter::open(path)
                .await
                .wrap_err_with(|| format!("failed to open {}", path.display()))?
                .with_name(&config.name);
            tracing::debug!(
                name = %config.name,
                path = %reporter.path().display(),
                "appending reports"
            );
            Arc::new(reporter)
        }
        SinkType::Webhook => {
            let url = config
                .url
                .as_deref()
                .ok_or_else(|| eyre!("reporter {:?} needs a url", config.name))?;
            let mut reporter = WebhookReporter::new(url::Url::parse(url)?).with_name(&config.name);
            if let Some(secs) = config.timeout_secs {
                reporter = reporter.with_timeout(Duration::from_secs(secs));
            }
            tracing::debug!(name = %config.name, url = %reporter.url(), "posting reports");
            Arc::new(reporter)
        }
    };

    tracing::debug!(name = %sink.name(), sink = ?config.sink, "reporter ready");

    Ok(sink)
}

/// Build the reporter registry from the configured routes
///
/// # Errors
/// Returns error if a sink cannot be created or a route names an unknown sink
pub async fn build_registry(config: &Config) -> Result<ReporterRegistry> {
    let mut sinks: HashMap<&str, Arc<dyn Reporter>> = HashMap::new();
    sinks.insert(LOG_SINK, Arc::new(LogReporter::new()));

    for reporter in &config.reporters {
        sinks.insert(reporter.name.as_str(), build_sink(reporter).await?);
    }

    let mut registry = ReporterRegistry::new();
    for (kind, names) in config.resolved_routes() {
        for name in names {
            let sink = sinks
                .get(name.as_str())
                .ok_or_else(|| eyre!("route {kind} references unknown reporter {name:?}"))?;
            registry.register(kind, Arc::clone(sink));
        }
    }

    Ok(registry)
}
