//! Example: Changing power, mode and setpoint
//!
//! Run with: cargo run --example control -- 192.168.1.42 ECO 55
//!
//! This example demonstrates:
//! - Validating user input into a `Mode`
//! - Writing the control state
//! - Cancelling a slow operation with a `CancelToken`

use std::net::Ipv4Addr;
use std::time::Duration;

use tsmart::{CancelToken, Client, ClientConfig, Mode, TSmartError};

fn parse_mode(name: &str) -> tsmart::Result<Mode> {
    Mode::ALL
        .into_iter()
        .find(|mode| mode.to_string().eq_ignore_ascii_case(name))
        .ok_or_else(|| TSmartError::validation("mode", format!("unknown mode '{}'", name)))
}

#[tokio::main]
async fn main() -> tsmart::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let ip: Ipv4Addr = args
        .next()
        .unwrap_or_else(|| "192.168.1.42".to_string())
        .parse()
        .map_err(|_| TSmartError::validation("ip", "expected an IPv4 address"))?;
    let mode = parse_mode(&args.next().unwrap_or_else(|| "MANUAL".to_string()))?;
    let setpoint: f32 = args
        .next()
        .unwrap_or_else(|| "50".to_string())
        .parse()
        .map_err(|_| TSmartError::validation("setpoint", "expected a number"))?;

    // =========================================================================
    // Connect, with a cancel token fired by Ctrl-C
    // =========================================================================

    let token = CancelToken::new();
    let client = Client::new(ClientConfig::new(ip).with_local_port(0))
        .with_cancel_token(token.clone());

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    // =========================================================================
    // Write, then read back
    // =========================================================================

    println!("=== Setting {} to {} at {:.1} C ===\n", ip, mode, setpoint);
    client.control_write(true, mode, setpoint).await?;

    tokio::time::sleep(Duration::from_millis(500)).await;

    let status = client.control_read().await?;
    println!("Mode:     {}", status.mode);
    println!("Setpoint: {:.1} C", status.setpoint);

    Ok(())
}
