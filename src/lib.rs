//! # TSmart Immersion Heater Client
//!
//! A Rust library for discovering and controlling TSmart immersion heaters
//! over their local UDP protocol.
//!
//! The library covers the protocol only: frame encoding and decoding, the
//! checksum, request/response exchanges with retry, and broadcast discovery.
//! Polling, scheduling and home-automation glue belong to the application.
//!
//! ## Features
//!
//! - **Discovery**: broadcast rounds with per-address deduplication and a
//!   synchronous or spawning device handler
//! - **Typed results**: [`Configuration`], [`Status`] and [`Mode`] instead of raw bytes
//! - **Retry with bounds**: per-attempt timeout, attempt count and an overall
//!   operation timeout
//! - **Cancellation**: a [`CancelToken`] aborts exchanges and ends discovery early
//! - **No panics on device input**: every received frame is checked before it
//!   is read and failures are returned as `Result<T, TSmartError>`
//!
//! ## Quick Start
//!
//! ```no_run
//! use tsmart::{Client, ClientConfig, Discovery, DiscoveryConfig, Mode};
//!
//! #[tokio::main]
//! async fn main() -> tsmart::Result<()> {
//!     let devices = Discovery::new(DiscoveryConfig::default()).discover().await?;
//!
//!     for device in devices {
//!         let ip = device.ip_address.parse().expect("discovery yields IPv4 addresses");
//!         let client = Client::new(ClientConfig::new(ip));
//!
//!         let status = client.control_read().await?;
//!         println!("{} is at {:.1} C", device.device_name, status.temperature_average);
//!
//!         client.control_write(true, Mode::Manual, 60.0).await?;
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Protocol
//!
//! Every frame starts with a three byte header (command, two sub-command
//! bytes) and ends with a checksum: the XOR of all preceding bytes, XORed
//! with `0x55`. Multi-byte integers are little-endian; temperatures are in
//! tenths of a degree.
//!
//! | Command | Request | Response |
//! |---------|---------|----------|
//! | Discovery `0x01` | 4 bytes, broadcast | 43 bytes |
//! | Configuration `0x21` | 4 bytes | 326 bytes |
//! | Control read `0xF1` | 4 bytes | 30 bytes |
//! | Control write `0xF2` | 8 bytes | 4 bytes |
//!
//! A response is accepted only if its length is right, its first byte is not
//! `0x00` (device error), its first byte echoes the request command, and its
//! checksum is valid, checked in that order.
//!
//! The codec is usable without the network:
//!
//! ```
//! use tsmart::checksum::validate;
//! use tsmart::response::decode_discovery_response;
//!
//! let frame = hex::decode(
//!     "01000020000d2a9b005445534c4100000000000000000000000000000000000000000000000000000064e3",
//! ).unwrap();
//! assert!(validate(&frame));
//!
//! let device = decode_discovery_response(0x01, &frame, "192.168.1.42").unwrap();
//! assert_eq!(device.device_id, "9B2A0D");
//! assert_eq!(device.device_name, "TESLA");
//! ```
//!
//! ## Error Handling
//!
//! ```no_run
//! use tsmart::{Client, ClientConfig, TSmartError};
//! use std::net::Ipv4Addr;
//!
//! # async fn run() {
//! let client = Client::new(ClientConfig::new(Ipv4Addr::new(192, 168, 1, 42)));
//!
//! match client.control_read().await {
//!     Ok(status) if status.has_error() => println!("Heater reports a fault"),
//!     Ok(status) => println!("Mode {}", status.mode),
//!     Err(TSmartError::Timeout) => println!("Heater not responding"),
//!     Err(TSmartError::BadResponse(fault)) => println!("Unusable reply: {}", fault),
//!     Err(e) => println!("Error: {}", e),
//! }
//! # }
//! ```
//!
//! ## Configuration
//!
//! ```
//! use tsmart::ClientConfig;
//! use std::net::Ipv4Addr;
//! use std::time::Duration;
//!
//! let config = ClientConfig::new(Ipv4Addr::new(192, 168, 1, 42))
//!     .with_local_port(0)                              // Ephemeral local port (default: 1337)
//!     .with_attempt_timeout(Duration::from_secs(1))    // Per attempt (default: 2s)
//!     .with_attempts(3)                                // Attempts (default: 2)
//!     .with_operation_timeout(Duration::from_secs(4)); // Whole exchange (default: 5s)
//! ```

#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod cancel;
pub mod checksum;
mod client;
mod command;
mod discovery;
mod error;
pub mod exchange;
mod header;
mod mode;
mod models;
pub mod response;
pub mod schema;
mod transport;
pub mod utils;

// Public re-exports
pub use cancel::CancelToken;
pub use client::{
    Client, ClientConfig, DEFAULT_ATTEMPTS, DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_OPERATION_TIMEOUT,
};
pub use command::{
    encode_configuration_request, encode_control_read_request, encode_control_write_request,
    encode_discovery_request, ControlWriteCommand, QueryCommand,
};
pub use discovery::{
    DeviceHandler, Discovery, DiscoveryConfig, DISCOVERY_INTERVAL, DISCOVERY_ROUNDS,
};
pub use error::{ResponseFault, Result, TSmartError};
pub use header::{Command, FrameHeader, HEADER_SIZE};
pub use mode::Mode;
pub use models::{Configuration, DiscoveredDevice, Status};
pub use transport::{UdpTransport, MAX_PACKET_SIZE, UDP_PORT};
