//! Request/response exchange with retry.
//!
//! One exchange opens a socket bound to the configured local port, connects
//! it to the device and repeats a send + receive step up to
//! [`ClientConfig::attempts`] times. Each receive waits at most
//! [`ClientConfig::attempt_timeout`]. A datagram is accepted only if it passes
//! the ordered frame checks (length, device error code, type, checksum); a
//! rejected datagram is logged and the attempt is retried. The whole exchange
//! is bounded by [`ClientConfig::operation_timeout`].
//!
//! | Outcome | Error |
//! |---------|-------|
//! | socket bind/connect failed | `Connection` / `NotFound` |
//! | send failed | `Connection` |
//! | no valid frame after all attempts | `Timeout` |
//! | operation timeout elapsed | `Timeout` |
//! | cancel token fired | `Cancelled` |
//!
//! The socket is dropped, and therefore closed, on every one of these paths.

use log::{debug, warn};

use crate::cancel::CancelToken;
use crate::client::ClientConfig;
use crate::error::{Result, TSmartError};
use crate::schema::check_frame;
use crate::transport::UdpTransport;

/// Performs one request/response exchange with the configured device.
///
/// Returns the first received frame of `expected_len` bytes that answers
/// `request` and carries a valid checksum. The payload is not interpreted.
///
/// # Errors
///
/// See the module documentation.
pub async fn exchange(
    config: &ClientConfig,
    request: &[u8],
    expected_len: usize,
    cancel: Option<&CancelToken>,
) -> Result<Vec<u8>> {
    let attempts = async {
        let transport = UdpTransport::connect(config.device_addr(), config.local_port).await?;
        run_attempts(&transport, config, request, expected_len).await
    };
    let bounded = async {
        tokio::time::timeout(config.operation_timeout, attempts)
            .await
            .unwrap_or_else(|_| {
                warn!(
                    "Operation timeout ({:?}) exceeded talking to {}",
                    config.operation_timeout, config.ip_address
                );
                Err(TSmartError::Timeout)
            })
    };

    match cancel {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("Exchange with {} cancelled", config.ip_address);
                    Err(TSmartError::Cancelled)
                }
                result = bounded => result,
            }
        }
        None => bounded.await,
    }
}

async fn run_attempts(
    transport: &UdpTransport,
    config: &ClientConfig,
    request: &[u8],
    expected_len: usize,
) -> Result<Vec<u8>> {
    let request_command = request.first().copied().unwrap_or_default();

    for attempt in 1..=config.attempts {
        transport.send(request).await?;
        debug!("Sent to {} (attempt {})", config.ip_address, attempt);

        match transport.recv(config.attempt_timeout).await {
            Ok(data) => match check_frame(expected_len, request_command, &data) {
                Ok(()) => return Ok(data),
                Err(fault) => warn!(
                    "Rejected response from {} (attempt {}/{}): {}",
                    config.ip_address, attempt, config.attempts, fault
                ),
            },
            Err(TSmartError::Timeout) => warn!(
                "No response from {} within {:?} (attempt {}/{})",
                config.ip_address, config.attempt_timeout, attempt, config.attempts
            ),
            Err(e) => warn!(
                "Receive from {} failed (attempt {}/{}): {}",
                config.ip_address, attempt, config.attempts, e
            ),
        }
    }

    Err(TSmartError::Timeout)
}
