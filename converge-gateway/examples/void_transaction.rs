//! Void a transaction against the Converge demo environment.
//!
//! # Running this example
//!
//! ```bash
//! export CONVERGE_MERCHANT_ID=000000
//! export CONVERGE_USER_ID=USERNAME
//! export CONVERGE_PIN=PASSWORD
//! export CONVERGE_TEST_MODE=true
//! cargo run --example void_transaction -- SALE123
//! ```

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::use_debug,
    reason = "examples are allowed to use println"
)]

use converge_gateway::{ConvergeGateway, GatewayConfig, GatewayError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let reference = std::env::args().nth(1).unwrap_or_else(|| "SALE123".to_owned());

    let config = GatewayConfig::from_env()?;
    println!("Posting to {}", config.endpoint());
    let gateway = ConvergeGateway::new(config)?;

    match gateway.send(gateway.void(reference.as_str())).await {
        Ok(response) if response.is_successful() => {
            println!("Voided {}", response.transaction_reference().unwrap_or(&reference));
        }
        Ok(response) => {
            println!("Not voided ({}): {}", response.status().as_str(), response.message().unwrap_or("-"));
            for (key, value) in response.fields() {
                println!("  {key} = {value}");
            }
        }
        Err(GatewayError::MissingField { field }) => eprintln!("Missing {field}"),
        Err(e) if e.is_transport() => eprintln!("Gateway unreachable: {e}"),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
