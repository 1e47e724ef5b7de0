//! `leadq send` — deliver a stored JSON payload to one stage endpoint.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use leadq_webhook::{DeliveryError, DeliveryStage, WebhookClient, WebhookConfig};

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Endpoint to deliver to: `qualification` or `scheduling`.
    #[arg(long)]
    pub stage: DeliveryStage,

    /// JSON file holding the payload.
    #[arg(long)]
    pub payload: PathBuf,
}

/// Execute the send subcommand.
///
/// Exits 0 with the receipt on stdout, or 1 once every attempt failed.
pub async fn run_send(args: &SendArgs, config: &WebhookConfig) -> Result<u8> {
    let payload = read_payload(&args.payload)?;
    let client = WebhookClient::new(config.clone())?;

    match client.send_stage(args.stage, &payload).await {
        Ok(receipt) => {
            println!("{}", serde_json::to_string_pretty(&receipt)?);
            Ok(0)
        }
        Err(e @ DeliveryError::Exhausted { .. }) => {
            tracing::error!(stage = %args.stage, "{e}");
            Ok(1)
        }
        Err(e) => Err(e.into()),
    }
}

fn read_payload(path: &Path) -> Result<serde_json::Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read payload: {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("payload is not valid JSON: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_json_payload() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"testType":"ab-athlete-mobile"}"#).unwrap();
        let value = read_payload(file.path()).unwrap();
        assert_eq!(value["testType"], "ab-athlete-mobile");
    }

    #[test]
    fn rejects_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not json").unwrap();
        let err = read_payload(file.path()).unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[tokio::test]
    async fn exhaustion_exits_with_one() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{}").unwrap();
        let mut config = WebhookConfig::local_mock("http://127.0.0.1:1").unwrap();
        config.max_attempts = 2;
        config.base_delay_ms = 1;
        let args = SendArgs {
            stage: DeliveryStage::Scheduling,
            payload: file.path().to_path_buf(),
        };
        assert_eq!(run_send(&args, &config).await.unwrap(), 1);
    }
}
