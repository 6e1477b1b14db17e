//! Reachability check for the app under test

use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// Poll `url` until it answers with a non-server-error status
pub async fn wait_for_app(url: &str, timeout: Duration) -> E2eResult<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;

    let start = Instant::now();
    let mut attempts = 0;

    loop {
        attempts += 1;

        match client.get(url).send().await {
            Ok(resp) if !resp.status().is_server_error() => {
                info!(url = %url, status = %resp.status(), attempts, "App is reachable");
                return Ok(());
            }
            Ok(resp) => {
                warn!("App returned {}", resp.status());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for {} to respond...", url);
                }
                if !e.is_connect() && !e.is_timeout() {
                    warn!("Reachability check error: {}", e);
                }
            }
        }

        if start.elapsed() >= timeout {
            break;
        }
        sleep(Duration::from_millis(500)).await;
    }

    Err(E2eError::AppUnreachable {
        url: url.to_string(),
        attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_app_reports_attempts() {
        let err = wait_for_app("http://127.0.0.1:1/", Duration::ZERO)
            .await
            .unwrap_err();

        match err {
            E2eError::AppUnreachable { url, attempts } => {
                assert_eq!(url, "http://127.0.0.1:1/");
                assert_eq!(attempts, 1);
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
