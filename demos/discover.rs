//! Example: Discovering heaters on the local network
//!
//! Run with: cargo run --example discover
//!
//! Set RUST_LOG=debug to see every frame sent and received.
//!
//! This example demonstrates:
//! - Broadcasting discovery rounds
//! - Reacting to each device as it is found
//! - Reading the configuration of every discovered device

use std::net::Ipv4Addr;

use tsmart::{Client, ClientConfig, DeviceHandler, Discovery, DiscoveryConfig};

#[tokio::main]
async fn main() -> tsmart::Result<()> {
    env_logger::init();

    // =========================================================================
    // Discover
    // =========================================================================

    println!("=== Discovering (4 seconds) ===\n");

    let handler = DeviceHandler::sync(|device| {
        println!(
            "  found {:<16} id={} name={}",
            device.ip_address, device.device_id, device.device_name
        );
    });
    let mut discovery = Discovery::new(DiscoveryConfig::default()).with_handler(handler);
    let devices = discovery.discover().await?;

    println!("\n{} device(s) found", devices.len());

    // =========================================================================
    // Identify
    // =========================================================================

    println!("\n=== Configuration ===\n");

    for device in &devices {
        let Ok(ip) = device.ip_address.parse::<Ipv4Addr>() else {
            continue;
        };
        // The discovery socket is closed by now, so the default local port is free.
        let client = Client::new(ClientConfig::new(ip));

        match client.configuration_read().await {
            Ok(configuration) => println!(
                "{}: firmware {} {}",
                device.device_name, configuration.firmware_name, configuration.firmware_version
            ),
            Err(e) => println!("{}: {}", device.device_name, e),
        }
    }

    Ok(())
}
