//! Asset-bundle update polling.
//!
//! A cancellable scheduled task fetches a JSON manifest over HTTPS on a
//! fixed interval and publishes [`UpdateEvent::UpdateAvailable`] whenever
//! the advertised version differs from the running one. Fetch failures are
//! logged and retried on the next tick — an unreachable update server must
//! never surface as an error to the user.

use std::time::Duration;

use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// What the update endpoint serves.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateManifest {
    pub version: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateEvent {
    UpdateAvailable {
        version: String,
        url: Option<String>,
    },
}

/// Owns the polling task. Dropping the poller (or calling [`stop`]) aborts
/// the task — no fire-and-forget timers.
///
/// [`stop`]: UpdatePoller::stop
pub struct UpdatePoller {
    check_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl UpdatePoller {
    /// Spawn the poller. `current_version` is compared against the
    /// manifest on every check.
    pub fn spawn(
        manifest_url: String,
        current_version: String,
        interval: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<UpdateEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (check_tx, mut check_rx) = mpsc::channel::<()>(1);

        let task = tokio::spawn(async move {
            let client = reqwest::Client::new();
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // the first interval tick fires immediately: startup check

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    cmd = check_rx.recv() => {
                        if cmd.is_none() {
                            break;
                        }
                    }
                }

                match fetch_manifest(&client, &manifest_url).await {
                    Ok(manifest) if manifest.version != current_version => {
                        info!(
                            current = %current_version,
                            available = %manifest.version,
                            "update available"
                        );
                        let event = UpdateEvent::UpdateAvailable {
                            version: manifest.version,
                            url: manifest.url,
                        };
                        if events_tx.send(event).is_err() {
                            break;
                        }
                    }
                    Ok(_) => debug!("bundle is up to date"),
                    Err(e) => warn!(error = %e, "update check failed"),
                }
            }
        });

        (Self { check_tx, task }, events_rx)
    }

    /// Force a check outside the regular cadence.
    pub fn check_now(&self) {
        let _ = self.check_tx.try_send(());
    }

    /// Cancel the polling task.
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for UpdatePoller {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn fetch_manifest(
    client: &reqwest::Client,
    url: &str,
) -> Result<UpdateManifest, reqwest::Error> {
    let response = client.get(url).send().await?.error_for_status()?;
    response.json().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_parses_with_optional_fields() {
        let manifest: UpdateManifest =
            serde_json::from_str(r#"{"version":"1.2.0"}"#).unwrap();
        assert_eq!(manifest.version, "1.2.0");
        assert!(manifest.url.is_none());

        let manifest: UpdateManifest = serde_json::from_str(
            r#"{"version":"1.3.0","url":"https://cdn.test/bundle","notes":"fixes"}"#,
        )
        .unwrap();
        assert_eq!(manifest.url.as_deref(), Some("https://cdn.test/bundle"));
    }

    #[tokio::test]
    async fn poller_stops_cleanly() {
        let (poller, mut events) = UpdatePoller::spawn(
            // unroutable: checks fail and are logged, never surfaced
            "http://127.0.0.1:9/manifest.json".into(),
            "1.0.0".into(),
            Duration::from_secs(3600),
        );
        poller.check_now();
        poller.stop();

        // no events from failed checks
        assert!(events.try_recv().is_err());
    }
}
