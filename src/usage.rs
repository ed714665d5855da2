use std::thread;

use anyhow::{Context, Result};
use reqwest::Method;
use serde::Serialize;

use crate::api::{ApiClient, Auth};
use crate::config::{AuthType, Config, Env};

const USAGE_PATH: &str = "usage-tracking/v1/cli/events";

/// Extra properties attached to a usage event.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<AuthType>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageEvent<'a> {
    pub event_name: &'static str,
    pub action: &'static str,
    pub command: &'a str,
    pub version: &'static str,
    pub os: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portal_id: Option<u64>,
    #[serde(flatten)]
    pub meta: &'a UsageMeta,
}

impl<'a> UsageEvent<'a> {
    pub fn command(command: &'a str, meta: &'a UsageMeta, portal_id: Option<u64>) -> Self {
        Self {
            event_name: "cli-interaction",
            action: "cli-command",
            command,
            version: env!("CARGO_PKG_VERSION"),
            os: std::env::consts::OS,
            portal_id,
            meta,
        }
    }
}

/// Records that a command ran. Callers treat failures as non-fatal.
pub trait UsageTracker {
    fn track(
        &self,
        config: &Config,
        command: &str,
        meta: &UsageMeta,
        portal_id: Option<u64>,
    ) -> Result<()>;
}

/// Posts usage events to the API unless `allow_usage_tracking = false`.
///
/// The request runs on a background thread, so `track` only fails when the
/// event cannot be prepared.
pub struct HttpUsageTracker;

impl UsageTracker for HttpUsageTracker {
    fn track(
        &self,
        config: &Config,
        command: &str,
        meta: &UsageMeta,
        portal_id: Option<u64>,
    ) -> Result<()> {
        if !config.usage_tracking_enabled() {
            tracing::debug!(command, "usage tracking disabled");
            return Ok(());
        }

        let env = portal_id
            .and_then(|id| config.portal(&id.to_string()))
            .map(|portal| portal.env)
            .unwrap_or(Env::Prod);
        let client = ApiClient::new(config, env)?;
        let event = serde_json::to_value(UsageEvent::command(command, meta, portal_id))
            .context("Failed to serialize usage event")?;

        thread::Builder::new()
            .name("usage-tracking".to_string())
            .spawn(move || {
                if let Err(err) = send_event(&client, &event) {
                    tracing::debug!(error = ?err, "usage event not sent");
                }
            })
            .context("Failed to spawn usage tracking thread")?;
        Ok(())
    }
}

fn send_event(client: &ApiClient, event: &serde_json::Value) -> Result<()> {
    client
        .request(Method::POST, USAGE_PATH, &Auth::None)
        .json(event)
        .send()
        .context("Failed to send usage event")?
        .error_for_status()
        .context("Usage event was rejected")?;
    Ok(())
}
