//! Example: Reading the live state of a heater
//!
//! Run with: cargo run --example status -- 192.168.1.42
//!
//! This example demonstrates:
//! - Configuring a client
//! - Reading the control state
//! - Inspecting error and warning flags

use std::net::Ipv4Addr;
use std::time::Duration;

use tsmart::{Client, ClientConfig, TSmartError};

#[tokio::main]
async fn main() -> tsmart::Result<()> {
    env_logger::init();

    let ip: Ipv4Addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "192.168.1.42".to_string())
        .parse()
        .map_err(|_| TSmartError::validation("ip", "expected an IPv4 address"))?;

    // =========================================================================
    // Connect
    // =========================================================================

    let config = ClientConfig::new(ip)
        .with_local_port(0)
        .with_attempt_timeout(Duration::from_secs(1))
        .with_attempts(3);
    let client = Client::new(config);

    // =========================================================================
    // Read
    // =========================================================================

    println!("=== Status of {} ===\n", ip);

    let status = client.control_read().await?;

    println!("Power:       {}", if status.power { "on" } else { "off" });
    println!("Mode:        {}", status.mode);
    println!("Setpoint:    {:.1} C", status.setpoint);
    println!("Upper:       {:.1} C", status.temperature_high);
    println!("Lower:       {:.1} C", status.temperature_low);
    println!("Average:     {:.2} C", status.temperature_average);
    let relay = if status.relay { "closed" } else { "open" };
    println!("Relay:       {}", relay);

    // =========================================================================
    // Faults
    // =========================================================================

    println!("\n=== Faults ===\n");

    let flags = [
        ("E01", status.error_e01),
        ("E02", status.error_e02),
        ("E03", status.error_e03),
        ("E04", status.error_e04),
        ("E05", status.error_e05),
        ("W01", status.error_w01),
        ("W02", status.error_w02),
        ("W03", status.error_w03),
    ];
    if status.has_error() {
        for (name, _) in flags.iter().filter(|(_, set)| *set) {
            println!("  {}", name);
        }
    } else {
        println!("  none");
    }

    Ok(())
}
