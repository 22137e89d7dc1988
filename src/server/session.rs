//! # Server Session
//!
//! Owns everything the robot side needs while it is being driven: the UDP
//! socket, the actuator handle, the servo change-detection state and the session
//! counters.
//!
//! ## Lifecycle
//!
//! ```text
//! ServerSession::bind(config, actuators)
//!        │
//!        ▼
//! run(shutdown) ── recv ─▶ decode ─▶ dispatch ──┐
//!        ▲                                      │
//!        └──────────────────────────────────────┘
//!        │ shutdown signal / socket error / run future dropped
//!        ▼
//! actuators.shutdown() exactly once, socket closed
//! ```
//!
//! `run` consumes the session, and the actuators sit behind an
//! [`ActuatorGuard`] that shuts them down on drop if the normal teardown path
//! was never reached (panic, or the `run` future being cancelled).

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;

use crate::common::messages::{ControlPacket, MAX_PACKET_SIZE};
use crate::server::actuators::{ActuatorError, Actuators};
use crate::server::config::ServerConfig;
use crate::server::dispatch::Dispatcher;
use crate::server::metrics::SessionMetrics;

/// Holds the actuators and guarantees a single `shutdown()` call.
pub struct ActuatorGuard<A: Actuators> {
    inner: Option<A>,
}

impl<A: Actuators> ActuatorGuard<A> {
    pub fn new(actuators: A) -> Self {
        Self {
            inner: Some(actuators),
        }
    }

    /// `None` once the actuators have been released.
    pub fn get_mut(&mut self) -> Option<&mut A> {
        self.inner.as_mut()
    }

    /// Shut the actuators down now. Later calls, and the drop, are no-ops.
    pub fn release(&mut self) -> Result<(), ActuatorError> {
        match self.inner.take() {
            Some(mut actuators) => actuators.shutdown(),
            None => Ok(()),
        }
    }
}

impl<A: Actuators> Drop for ActuatorGuard<A> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!("⚠️  {}", e);
        }
    }
}

/// One run of the robot server.
pub struct ServerSession<A: Actuators> {
    socket: UdpSocket,
    actuators: ActuatorGuard<A>,
    dispatcher: Dispatcher,
    recv_timeout: Option<Duration>,
    idle_stopped: bool,
    metrics: SessionMetrics,
}

impl<A: Actuators> ServerSession<A> {
    /// Bind the UDP socket described by `config`.
    ///
    /// # Returns
    /// - `Ok(ServerSession)`: socket bound, ready to [`run`](Self::run)
    /// - `Err`: bind failed; the actuators are shut down before returning
    pub async fn bind(config: &ServerConfig, actuators: A) -> Result<Self> {
        let mut guard = ActuatorGuard::new(actuators);
        let socket = match UdpSocket::bind(&config.server.address).await {
            Ok(socket) => socket,
            Err(e) => {
                if let Err(shutdown_err) = guard.release() {
                    warn!("⚠️  {}", shutdown_err);
                }
                return Err(e).with_context(|| {
                    format!("failed to bind UDP socket on {}", config.server.address)
                });
            }
        };

        Ok(Self::with_guard(
            socket,
            guard,
            config.control.sensitivity,
            config.recv_timeout(),
        ))
    }

    /// Wrap an already-bound socket.
    pub fn from_socket(
        socket: UdpSocket,
        actuators: A,
        sensitivity: f64,
        recv_timeout: Option<Duration>,
    ) -> Self {
        Self::with_guard(socket, ActuatorGuard::new(actuators), sensitivity, recv_timeout)
    }

    fn with_guard(
        socket: UdpSocket,
        actuators: ActuatorGuard<A>,
        sensitivity: f64,
        recv_timeout: Option<Duration>,
    ) -> Self {
        Self {
            socket,
            actuators,
            dispatcher: Dispatcher::new(sensitivity),
            recv_timeout,
            // nothing has been driven yet
            idle_stopped: true,
            metrics: SessionMetrics::new(),
        }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Serve packets until `shutdown` resolves or the socket fails, then tear down.
    ///
    /// Teardown always runs: the actuators are shut down once and the socket is
    /// closed, whichever way the loop ended.
    ///
    /// # Returns
    /// - `Ok(SessionMetrics)`: the loop ended because of `shutdown`
    /// - `Err`: a receive error ended the loop
    ///
    /// # Example
    /// ```ignore
    /// let session = ServerSession::bind(&config, LoggingActuators::new()).await?;
    /// let metrics = session.run(async { let _ = tokio::signal::ctrl_c().await; }).await?;
    /// ```
    pub async fn run<F>(mut self, shutdown: F) -> Result<SessionMetrics>
    where
        F: Future<Output = ()>,
    {
        if let Ok(addr) = self.socket.local_addr() {
            info!("📡 Listening for control packets on {}", addr);
        }

        // Serve until shutdown or a socket error
        let served = self.serve(shutdown).await;

        // Tear down: actuators first, then the socket
        let Self {
            socket,
            mut actuators,
            metrics,
            ..
        } = self;

        info!("🛑 Shutting down");
        if let Err(e) = actuators.release() {
            warn!("⚠️  {}", e);
        }
        drop(socket);

        // Log the session summary
        info!("📊 Session summary: {}", metrics.stats.summary());

        served.map(|()| metrics)
    }

    async fn serve<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        // One spare byte so an oversized datagram shows up as too long
        let mut buf = [0u8; MAX_PACKET_SIZE + 1];

        loop {
            // Race the next datagram (or receive timeout) against shutdown
            let received = tokio::select! {
                _ = &mut shutdown => None,
                received = receive(&self.socket, &mut buf, self.recv_timeout) => Some(received),
            };

            let Some(received) = received else {
                info!("Interrupt received");
                return Ok(());
            };

            // Decode and dispatch, or stop the drivetrain if idle
            match received.context("failed to receive datagram")? {
                Some((len, from)) => self.handle_datagram(&buf[..len], from),
                None => self.handle_idle(),
            }
        }
    }

    fn handle_datagram(&mut self, payload: &[u8], from: SocketAddr) {
        self.metrics.stats.packets_received += 1;
        debug!(
            "📦 Received packet from {}: {:?}",
            from,
            String::from_utf8_lossy(payload)
        );

        let packet = match ControlPacket::decode(payload) {
            Ok(packet) => packet,
            Err(e) => {
                self.metrics.stats.packets_dropped += 1;
                warn!("⚠️  Dropping malformed packet from {}: {}", from, e);
                return;
            }
        };

        let Some(actuators) = self.actuators.get_mut() else {
            return;
        };
        let outcome = self.dispatcher.dispatch(&packet, actuators);
        self.metrics.stats.record_dispatch(outcome);
        self.idle_stopped = false;
    }

    /// Receive timed out: stop the drivetrain once per idle period, hold servos.
    fn handle_idle(&mut self) {
        self.metrics.stats.idle_timeouts += 1;
        if self.idle_stopped {
            return;
        }
        warn!(
            "⏰ No control packet for {:?}, stopping drivetrain",
            self.recv_timeout.unwrap_or_default()
        );

        let Some(actuators) = self.actuators.get_mut() else {
            return;
        };
        match actuators.drive(0.0, 0.0) {
            Ok(()) => self.idle_stopped = true,
            Err(e) => {
                self.metrics.stats.actuator_errors += 1;
                warn!("⚠️  {}", e);
            }
        }
    }
}

/// `Ok(None)` means the timeout elapsed with nothing received.
async fn receive(
    socket: &UdpSocket,
    buf: &mut [u8],
    timeout: Option<Duration>,
) -> io::Result<Option<(usize, SocketAddr)>> {
    match timeout {
        None => socket.recv_from(buf).await.map(Some),
        Some(limit) => match tokio::time::timeout(limit, socket.recv_from(buf)).await {
            Ok(received) => received.map(Some),
            Err(_) => Ok(None),
        },
    }
}
