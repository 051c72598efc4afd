use crate::config::ProbePolicy;
use crate::core::session::Session;
use crate::domain::model::HealthCheck;
use crate::utils::error::{Result, UploadError};
use futures::future::try_join_all;
use serde_json::Value;
use url::Url;

/// Pre-flight readiness check. All endpoints are probed concurrently; each
/// retries up to `policy.attempts` times with a fixed delay. The first
/// endpoint to exhaust its attempts fails the whole probe.
pub async fn probe(
    session: &Session,
    base_url: &Url,
    checks: &[HealthCheck],
    policy: &ProbePolicy,
) -> Result<()> {
    try_join_all(
        checks
            .iter()
            .map(|check| probe_endpoint(session, base_url, check, policy)),
    )
    .await?;
    Ok(())
}

async fn probe_endpoint(
    session: &Session,
    base_url: &Url,
    check: &HealthCheck,
    policy: &ProbePolicy,
) -> Result<()> {
    let url = base_url.join(&check.path)?;
    let mut last_reason = String::from("no attempts made");

    for attempt in 1..=policy.attempts {
        match probe_once(session, &url, &check.marker).await {
            Ok(()) => {
                tracing::debug!(endpoint = %url, attempt, "backend healthy");
                return Ok(());
            }
            Err(reason) => {
                tracing::warn!(endpoint = %url, attempt, %reason, "health probe attempt failed");
                last_reason = reason;
            }
        }
        if attempt < policy.attempts {
            tokio::time::sleep(policy.delay).await;
        }
    }

    Err(UploadError::Connectivity {
        endpoint: url.to_string(),
        reason: last_reason,
    })
}

async fn probe_once(
    session: &Session,
    url: &Url,
    marker: &str,
) -> std::result::Result<(), String> {
    let response = {
        let _permit = session.reserve().await.map_err(|err| err.to_string())?;
        session
            .http()
            .get(url.clone())
            .send()
            .await
            .map_err(|err| err.to_string())?
    };

    let status = response.status();
    if !status.is_success() {
        return Err(format!("status {status}"));
    }

    let body: Value = response.json().await.map_err(|err| err.to_string())?;
    if contains_marker(&body, marker) {
        Ok(())
    } else {
        Err(format!("marker '{marker}' missing from response"))
    }
}

// Containment mirrors the backend convention: marker may appear as an object
// key, an array element, or the entire string body.
fn contains_marker(body: &Value, marker: &str) -> bool {
    match body {
        Value::Object(map) => map.contains_key(marker),
        Value::Array(items) => items.iter().any(|item| item.as_str() == Some(marker)),
        Value::String(s) => s == marker,
        _ => false,
    }
}
