// Single-client TCP command loop
//
// Listening -> Accepted -> Reading -> (Dispatching -> Reading)* -> Closed -> Listening
//
// One connection is served at a time. Each read is one payload; its reply is
// written before the next read, so commands apply strictly in arrival order.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::sleep;
use tracing::{error, info, warn};

// local imports
use crate::config::{ServerConfig, ACCEPT_RETRY_DELAY, MOTOR_LAYOUT, PWM_TIMER, RX_BUFFER_SIZE};
use crate::messages::Response;
use crate::motor::{Board, MotorError, MotorRegistry, OutputPin, PwmChannel};
use crate::protocol::{dispatch, parse_command};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("Motor bring-up failed: {0}")]
    Motor(#[from] MotorError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
}

/// Parse one payload, actuate, and pick the reply
pub fn handle_payload<P, C>(payload: &[u8], registry: &mut MotorRegistry<P, C>) -> Response
where
    P: OutputPin,
    C: PwmChannel,
{
    info!("Received: {}", String::from_utf8_lossy(payload).trim_end());
    let cmd = parse_command(payload);
    info!(
        "motor: {} | direction: {} | speed: {}",
        cmd.motor, cmd.direction, cmd.speed
    );
    dispatch(&cmd, registry)
}

/// Serve one connection until the client disconnects.
///
/// Returns `Ok` on a clean disconnect (zero-length read) and the io error if
/// reading or writing fails.
pub async fn run_session<S, P, C>(
    stream: &mut S,
    registry: &mut MotorRegistry<P, C>,
) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
    P: OutputPin,
    C: PwmChannel,
{
    let mut rx_buffer = [0u8; RX_BUFFER_SIZE];

    loop {
        // Last byte stays free, payloads are at most RX_BUFFER_SIZE - 1 bytes
        let len = stream.read(&mut rx_buffer[..RX_BUFFER_SIZE - 1]).await?;
        if len == 0 {
            return Ok(());
        }

        let response = handle_payload(&rx_buffer[..len], registry);
        stream.write_all(response.as_bytes()).await?;
    }
}

/// Accept and serve clients one after another, forever.
///
/// Accept failures are logged and retried; a session error only ends that
/// session.
pub async fn serve<P, C>(listener: TcpListener, registry: &mut MotorRegistry<P, C>)
where
    P: OutputPin,
    C: PwmChannel,
{
    loop {
        info!("Waiting for client...");
        let (mut stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                error!("accept() failed: {}", e);
                sleep(ACCEPT_RETRY_DELAY).await;
                continue;
            }
        };

        info!("Client connected: {}", peer);
        match run_session(&mut stream, registry).await {
            Ok(()) => info!("Client {} disconnected", peer),
            Err(e) => warn!("Session with {} closed on error: {}", peer, e),
        }
        // stream dropped here, back to listening
    }
}

/// Bring up the motors on `board`, bind the TCP port and serve clients.
///
/// Only returns on a bring-up or bind failure.
pub async fn run<B: Board>(mut board: B, config: &ServerConfig) -> Result<(), RuntimeError> {
    info!("Initializing motors...");
    let mut registry = MotorRegistry::init(&mut board, &MOTOR_LAYOUT, &PWM_TIMER)?;
    info!("Registered motors: {:?}", registry.ids());

    let addr = config.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| RuntimeError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!("TCP server listening on {}", addr);

    serve(listener, &mut registry).await;
    Ok(())
}
