//! `converge`: command line client for the Converge gateway.
//!
//! Sends one transaction, prints the decoded reply as JSON on stdout and logs
//! to stderr.

#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest and clap"
)]

mod cli;
mod observability;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use converge_gateway::{ConvergeGateway, GatewayConfig};
use tracing::{error, info};

use crate::{
    cli::Cli,
    observability::{LogFormat, init_observability},
};

/// Exit status when the gateway answered without approving.
const EXIT_NOT_APPROVED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_observability(cli.log_format.unwrap_or_else(LogFormat::from_env), "info");

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_NOT_APPROVED),
        Err(e) => {
            error!(error = %e, "transaction failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Runs the selected command and reports whether the gateway approved it.
async fn run(cli: Cli) -> Result<bool> {
    let config = load_config(&cli)?;
    let gateway = ConvergeGateway::new(config).context("failed to create gateway")?;

    let request = cli.command.to_request(&gateway);
    let operation = request.operation();
    info!(%operation, endpoint = gateway.config().endpoint(), "sending transaction");

    let response = gateway
        .send(request)
        .await
        .with_context(|| format!("{operation} request failed"))?;

    let json = serde_json::to_string_pretty(&response).context("failed to encode reply")?;
    println!("{json}");

    Ok(response.is_successful())
}

fn load_config(cli: &Cli) -> Result<GatewayConfig> {
    let mut config = match &cli.config {
        Some(path) => GatewayConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => GatewayConfig::from_env().context("failed to read CONVERGE_* environment")?,
    };

    if cli.test_mode {
        config = config.with_test_mode(true);
    }
    if let Some(endpoint) = &cli.endpoint {
        config = config.with_endpoint(endpoint.clone());
    }
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests")]
mod tests {
    use converge_gateway::config::TEST_ENDPOINT;

    use super::*;

    fn config_file(contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir()
            .join(format!("converge-cli-{}-{}.toml", std::process::id(), contents.len()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_config_applies_overrides() {
        let path = config_file("merchant_id = \"000000\"\nusername = \"USERNAME\"\npassword = \"PASSWORD\"\n");
        let cli = Cli::try_parse_from([
            "converge",
            "--config",
            path.to_str().unwrap(),
            "--test-mode",
            "void",
            "SALE123",
        ])
        .unwrap();

        let config = load_config(&cli).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(config.test_mode);
        assert_eq!(config.endpoint(), TEST_ENDPOINT);
    }

    #[test]
    fn test_load_config_endpoint_override() {
        let path = config_file(
            "merchant_id = \"000000\"\nusername = \"USERNAME\"\npassword = \"PASSWORD\"\ntest_mode = true\n",
        );
        let cli = Cli::try_parse_from([
            "converge",
            "void",
            "SALE123",
            "--config",
            path.to_str().unwrap(),
            "--endpoint",
            "https://converge.example.test/VirtualMerchant",
        ])
        .unwrap();

        let config = load_config(&cli).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.endpoint(), "https://converge.example.test/VirtualMerchant");
    }

    #[test]
    fn test_load_config_missing_file() {
        let cli =
            Cli::try_parse_from(["converge", "--config", "/nonexistent/converge.toml", "void", "A"])
                .unwrap();
        let err = load_config(&cli).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/converge.toml"));
    }
}
