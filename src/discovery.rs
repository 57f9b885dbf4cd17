//! Broadcast device discovery.
//!
//! A [`Discovery`] session binds one broadcast-capable socket, then for each
//! round sends the discovery request to the configured target and collects
//! replies until the round's listen interval has elapsed. Replies are
//! deduplicated by source address (first seen wins). A reply that cannot be
//! decoded is logged and ignored; it never ends the session.
//!
//! # Example
//!
//! ```no_run
//! use tsmart::{DeviceHandler, Discovery, DiscoveryConfig};
//!
//! # async fn run() -> tsmart::Result<()> {
//! let handler = DeviceHandler::sync(|device| {
//!     println!("found {} at {}", device.device_name, device.ip_address);
//! });
//! let mut discovery = Discovery::new(DiscoveryConfig::default()).with_handler(handler);
//! let devices = discovery.discover().await?;
//! println!("{} heater(s)", devices.len());
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr};
use std::pin::Pin;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::net::UdpSocket;
use tokio::time::Instant;

use crate::cancel::CancelToken;
use crate::command::encode_discovery_request;
use crate::error::Result;
use crate::header::Command;
use crate::models::DiscoveredDevice;
use crate::response::decode_discovery_response;
use crate::transport::{bind_socket, SocketOptions, MAX_PACKET_SIZE, UDP_PORT};

/// How long each round listens for replies.
pub const DISCOVERY_INTERVAL: Duration = Duration::from_secs(2);

/// Number of broadcast rounds per session.
pub const DISCOVERY_ROUNDS: u32 = 2;

/// Discovery session settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Where the discovery request is sent.
    pub target: SocketAddr,
    /// Local port to bind. 0 selects an ephemeral port.
    pub local_port: u16,
    /// Number of send + listen rounds.
    pub rounds: u32,
    /// Listen time per round.
    pub interval: Duration,
}

impl Default for DiscoveryConfig {
    /// Broadcasts to `255.255.255.255:1337` from local port 1337, two rounds
    /// of two seconds.
    fn default() -> Self {
        Self {
            target: SocketAddr::from((Ipv4Addr::BROADCAST, UDP_PORT)),
            local_port: UDP_PORT,
            rounds: DISCOVERY_ROUNDS,
            interval: DISCOVERY_INTERVAL,
        }
    }
}

impl DiscoveryConfig {
    /// Sets the request destination, for example a subnet broadcast address.
    ///
    /// # Example
    ///
    /// ```
    /// use std::net::{Ipv4Addr, SocketAddr};
    /// use tsmart::DiscoveryConfig;
    ///
    /// let config = DiscoveryConfig::default()
    ///     .with_target(SocketAddr::from((Ipv4Addr::new(192, 168, 1, 255), 1337)));
    /// assert_eq!(config.target.port(), 1337);
    /// ```
    pub fn with_target(mut self, target: SocketAddr) -> Self {
        self.target = target;
        self
    }

    /// Sets the local port (default 1337).
    pub fn with_local_port(mut self, port: u16) -> Self {
        self.local_port = port;
        self
    }

    /// Sets the number of rounds (default 2).
    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    /// Sets the listen interval per round (default 2 seconds).
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

type SpawnFn = dyn FnMut(DiscoveredDevice) -> BoxFuture + Send;

/// Called once for every newly discovered device.
pub enum DeviceHandler {
    /// Runs inline on the receive loop.
    Sync(Box<dyn FnMut(&DiscoveredDevice) + Send>),
    /// Produces a future that is handed to `tokio::spawn`, so a slow handler
    /// does not hold up the receive loop.
    Spawn(Box<SpawnFn>),
}

impl DeviceHandler {
    /// Wraps a synchronous callback.
    pub fn sync<F>(f: F) -> Self
    where
        F: FnMut(&DiscoveredDevice) + Send + 'static,
    {
        Self::Sync(Box::new(f))
    }

    /// Wraps a callback returning a future.
    ///
    /// # Example
    ///
    /// ```
    /// use tsmart::DeviceHandler;
    ///
    /// let handler = DeviceHandler::spawn(|device| async move {
    ///     println!("found {}", device.device_id);
    /// });
    /// ```
    pub fn spawn<F, Fut>(mut f: F) -> Self
    where
        F: FnMut(DiscoveredDevice) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::Spawn(Box::new(move |device| Box::pin(f(device)) as BoxFuture))
    }

    fn dispatch(&mut self, device: &DiscoveredDevice) {
        match self {
            Self::Sync(f) => f(device),
            Self::Spawn(f) => {
                tokio::spawn(f(device.clone()));
            }
        }
    }
}

impl std::fmt::Debug for DeviceHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("DeviceHandler::Sync"),
            Self::Spawn(_) => f.write_str("DeviceHandler::Spawn"),
        }
    }
}

/// A discovery session and the devices it has found.
///
/// The device list belongs to this value. Calling [`discover`](Self::discover)
/// again keeps devices found earlier and only adds new addresses.
#[derive(Debug)]
pub struct Discovery {
    config: DiscoveryConfig,
    handler: Option<DeviceHandler>,
    cancel: Option<CancelToken>,
    devices: Vec<DiscoveredDevice>,
}

impl Discovery {
    /// Creates a session. No socket is opened until [`discover`](Self::discover).
    pub fn new(config: DiscoveryConfig) -> Self {
        Self {
            config,
            handler: None,
            cancel: None,
            devices: Vec::new(),
        }
    }

    /// Sets the handler called for each newly discovered device.
    pub fn with_handler(mut self, handler: DeviceHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Lets `token` end the session early.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Returns the session settings.
    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Returns the devices found so far.
    pub fn devices(&self) -> &[DiscoveredDevice] {
        &self.devices
    }

    /// Runs all rounds and returns every device found by this session.
    ///
    /// If the cancel token fires, the socket is closed and the devices
    /// collected up to that point are returned.
    ///
    /// # Errors
    ///
    /// Returns `Connection` or `NotFound` if the socket cannot be bound.
    pub async fn discover(&mut self) -> Result<Vec<DiscoveredDevice>> {
        let socket = bind_socket(
            self.config.local_port,
            SocketOptions {
                broadcast: true,
                reuse_port: true,
            },
        )?;
        let request = encode_discovery_request();
        let cancel = self.cancel.clone();

        match cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => debug!("Cancelling discovery"),
                    _ = self.run_rounds(&socket, &request) => {}
                }
            }
            None => self.run_rounds(&socket, &request).await,
        }

        Ok(self.devices.clone())
    }

    async fn run_rounds(&mut self, socket: &UdpSocket, request: &[u8]) {
        let mut buffer = vec![0u8; MAX_PACKET_SIZE];

        for round in 1..=self.config.rounds {
            debug!(
                "Sending discovery message to {} (round {}/{})",
                self.config.target, round, self.config.rounds
            );
            if let Err(e) = socket.send_to(request, self.config.target).await {
                warn!("Discovery send to {} failed: {}", self.config.target, e);
            }

            let deadline = Instant::now() + self.config.interval;
            loop {
                match tokio::time::timeout_at(deadline, socket.recv_from(&mut buffer)).await {
                    Ok(Ok((size, peer))) => {
                        self.handle_datagram(&buffer[..size], peer, request.len())
                    }
                    Ok(Err(e)) => warn!("Discovery receive failed: {}", e),
                    Err(_) => break,
                }
            }
        }
    }

    fn handle_datagram(&mut self, data: &[u8], peer: SocketAddr, request_len: usize) {
        if data.len() == request_len {
            debug!("Ignoring own broadcast echo from {}", peer);
            return;
        }

        debug!("Received discovery response from {}", peer);
        let ip = peer.ip().to_string();
        let device = match decode_discovery_response(Command::Discovery.code(), data, ip) {
            Ok(device) => device,
            Err(e) => {
                debug!("Ignoring discovery reply from {}: {}", peer, e);
                return;
            }
        };

        if self
            .devices
            .iter()
            .any(|known| known.ip_address == device.ip_address)
        {
            return;
        }

        info!(
            "Discovered {} {} at {}",
            device.device_id, device.device_name, device.ip_address
        );
        if let Some(handler) = self.handler.as_mut() {
            handler.dispatch(&device);
        }
        self.devices.push(device);
    }
}
