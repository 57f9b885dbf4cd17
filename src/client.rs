//! High-level client for one TSmart immersion heater.
//!
//! This module provides the [`Client`] struct, which binds a device address
//! and exposes the three device operations.
//!
//! # Overview
//!
//! Each operation encodes its request, runs one exchange (see
//! [`crate::exchange`]) and decodes the accepted frame:
//!
//! | Operation | Request | Response size |
//! |-----------|---------|---------------|
//! | [`Client::configuration_read`] | `21 00 00 74` | 326 |
//! | [`Client::control_read`] | `F1 00 00 A4` | 30 |
//! | [`Client::control_write`] | 8 bytes | 4 |
//!
//! # Example
//!
//! ```no_run
//! use tsmart::{Client, ClientConfig, Mode};
//! use std::net::Ipv4Addr;
//!
//! # async fn run() -> tsmart::Result<()> {
//! let client = Client::new(ClientConfig::new(Ipv4Addr::new(192, 168, 1, 42)));
//!
//! let configuration = client.configuration_read().await?;
//! println!("{} runs {}", configuration.device_name, configuration.firmware_version);
//!
//! let status = client.control_read().await?;
//! println!("{:.1} C, mode {}", status.temperature_average, status.mode);
//!
//! client.control_write(true, Mode::Eco, 55.0).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! The `Client` holds no socket. Every call opens its own socket on the
//! configured local port and closes it before returning, so calls made
//! concurrently on one machine need distinct local ports
//! (see [`ClientConfig::with_local_port`]).

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use log::info;

use crate::cancel::CancelToken;
use crate::command::{
    encode_configuration_request, encode_control_read_request, ControlWriteCommand,
};
use crate::error::Result;
use crate::exchange::exchange;
use crate::header::Command;
use crate::mode::Mode;
use crate::models::{Configuration, Status};
use crate::response::{
    decode_configuration_response, decode_control_read_response, decode_control_write_response,
};
use crate::schema::{CONFIGURATION_RESPONSE, CONTROL_READ_RESPONSE, EMPTY_FRAME_SIZE};
use crate::transport::UDP_PORT;

/// Per-attempt receive timeout.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(2);

/// Send + receive attempts per exchange.
pub const DEFAULT_ATTEMPTS: u32 = 2;

/// Bound on a whole exchange, all attempts included.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for creating a [`Client`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Device IP address.
    pub ip_address: Ipv4Addr,
    /// Device UDP port.
    pub port: u16,
    /// Local UDP port. 0 selects an ephemeral port.
    pub local_port: u16,
    /// Receive timeout per attempt.
    pub attempt_timeout: Duration,
    /// Number of attempts, at least 1.
    pub attempts: u32,
    /// Bound on the whole exchange.
    pub operation_timeout: Duration,
}

impl ClientConfig {
    /// Creates a configuration with the protocol defaults.
    ///
    /// # Example
    ///
    /// ```
    /// use tsmart::ClientConfig;
    /// use std::net::Ipv4Addr;
    ///
    /// let config = ClientConfig::new(Ipv4Addr::new(192, 168, 1, 42));
    /// assert_eq!(config.port, 1337);
    /// assert_eq!(config.attempts, 2);
    /// ```
    pub fn new(ip_address: Ipv4Addr) -> Self {
        Self {
            ip_address,
            port: UDP_PORT,
            local_port: UDP_PORT,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            attempts: DEFAULT_ATTEMPTS,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Sets the device port (default 1337).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the local port (default 1337).
    ///
    /// # Example
    ///
    /// ```
    /// use tsmart::ClientConfig;
    /// use std::net::Ipv4Addr;
    ///
    /// // Let the OS pick a port so several clients can run at once.
    /// let config = ClientConfig::new(Ipv4Addr::new(192, 168, 1, 42)).with_local_port(0);
    /// ```
    pub fn with_local_port(mut self, port: u16) -> Self {
        self.local_port = port;
        self
    }

    /// Sets the per-attempt receive timeout (default 2 seconds).
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Sets the number of attempts (default 2). Values below 1 are raised to 1.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    /// Sets the bound on a whole exchange (default 5 seconds).
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Returns the device socket address.
    pub fn device_addr(&self) -> SocketAddr {
        SocketAddr::from((self.ip_address, self.port))
    }
}

/// Client for one TSmart immersion heater.
///
/// Each operation is one exchange: up to [`ClientConfig::attempts`] sends,
/// each followed by a receive with [`ClientConfig::attempt_timeout`].
/// Rejected frames are retried; a silent or misbehaving device yields
/// `Timeout`.
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
    cancel: Option<CancelToken>,
}

impl Client {
    /// Creates a client. No socket is opened until an operation runs.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Lets `token` abort in-flight operations with `Cancelled`.
    ///
    /// # Example
    ///
    /// ```
    /// use tsmart::{CancelToken, Client, ClientConfig};
    /// use std::net::Ipv4Addr;
    ///
    /// let token = CancelToken::new();
    /// let client = Client::new(ClientConfig::new(Ipv4Addr::new(192, 168, 1, 42)))
    ///     .with_cancel_token(token.clone());
    /// // Later, from any task:
    /// token.cancel();
    /// ```
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the device IP address.
    pub fn ip_address(&self) -> Ipv4Addr {
        self.config.ip_address
    }

    async fn request(&self, request: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        exchange(&self.config, request, expected_len, self.cancel.as_ref()).await
    }

    /// Reads device identity and firmware information.
    ///
    /// # Errors
    ///
    /// Returns `Timeout` if no valid response arrives, `Connection` or
    /// `NotFound` if the socket cannot be opened, `Cancelled` if cancelled.
    pub async fn configuration_read(&self) -> Result<Configuration> {
        let request = encode_configuration_request();
        let data = self.request(&request, CONFIGURATION_RESPONSE.size()).await?;
        let configuration = decode_configuration_response(Command::Configuration.code(), &data)?;

        info!(
            "Configuration of {}: {} {} firmware {} {}",
            self.config.ip_address,
            configuration.device_id,
            configuration.device_name,
            configuration.firmware_name,
            configuration.firmware_version
        );
        Ok(configuration)
    }

    /// Reads the live control state.
    ///
    /// # Errors
    ///
    /// Returns `BadResponse` if the accepted frame carries an unknown mode,
    /// otherwise as [`configuration_read`](Self::configuration_read).
    pub async fn control_read(&self) -> Result<Status> {
        let request = encode_control_read_request();
        let data = self.request(&request, CONTROL_READ_RESPONSE.size()).await?;
        let status = decode_control_read_response(Command::ControlRead.code(), &data)?;

        info!(
            "Status of {}: power={} mode={} setpoint={:.1} average={:.2}",
            self.config.ip_address,
            status.power,
            status.mode,
            status.setpoint,
            status.temperature_average
        );
        Ok(status)
    }

    /// Sets power, mode and setpoint (degrees Celsius).
    ///
    /// Arguments are validated before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an unrepresentable setpoint, `BadResponse`
    /// if the acknowledgement is not `F2 00 00 A7`, otherwise as
    /// [`configuration_read`](Self::configuration_read).
    pub async fn control_write(&self, power: bool, mode: Mode, setpoint: f32) -> Result<()> {
        let command = ControlWriteCommand::new(power, mode, setpoint)?;
        let data = self.request(&command.to_bytes(), EMPTY_FRAME_SIZE).await?;
        decode_control_write_response(&data)?;

        info!(
            "Control written to {}: power={} mode={} setpoint={:.1}",
            self.config.ip_address, power, mode, setpoint
        );
        Ok(())
    }
}
