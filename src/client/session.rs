//! # Client Session
//!
//! Reads joystick events, runs them through the [`Sampler`] and sends each
//! resulting packet to the robot as one datagram. Fire-and-forget: no
//! acknowledgment, no retry, no backpressure. A failed send is logged and the
//! session keeps going.

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

use crate::client::config::ClientConfig;
use crate::client::input::InputEvent;
use crate::client::sampler::Sampler;

pub struct ClientSession {
    socket: UdpSocket,
    server: SocketAddr,
    sampler: Sampler,
    send_delay: Duration,
    sent: u64,
}

impl ClientSession {
    /// Resolve the robot address and bind the local sending socket.
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let target = &config.client.server_address;
        let server = tokio::net::lookup_host(target)
            .await
            .with_context(|| format!("failed to resolve server address {}", target))?
            .next()
            .ok_or_else(|| anyhow!("server address {} resolved to nothing", target))?;

        let socket = UdpSocket::bind(&config.client.bind_address)
            .await
            .with_context(|| format!("failed to bind UDP socket on {}", config.client.bind_address))?;

        Ok(Self::new(
            socket,
            server,
            Sampler::from_config(config),
            config.send_delay(),
        ))
    }

    pub fn new(socket: UdpSocket, server: SocketAddr, sampler: Sampler, send_delay: Duration) -> Self {
        Self {
            socket,
            server,
            sampler,
            send_delay,
            sent: 0,
        }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Process events until the source closes or `shutdown` resolves.
    ///
    /// # Returns
    /// Number of datagrams sent successfully.
    pub async fn run<F>(mut self, mut events: mpsc::Receiver<InputEvent>, shutdown: F) -> Result<u64>
    where
        F: Future<Output = ()>,
    {
        info!("🎮 Sending control packets to {}", self.server);
        tokio::pin!(shutdown);

        loop {
            let event = tokio::select! {
                _ = &mut shutdown => None,
                event = events.recv() => Some(event),
            };

            let event = match event {
                Some(Some(event)) => event,
                Some(None) => {
                    info!("Input source finished");
                    break;
                }
                None => {
                    info!("Interrupt received");
                    break;
                }
            };

            self.handle_event(&event).await;
        }

        info!("👋 Shutting down after sending {} packets", self.sent);
        Ok(self.sent)
    }

    async fn handle_event(&mut self, event: &InputEvent) {
        let Some(packet) = self.sampler.handle(event) else {
            debug!("Ignoring {:?}", event);
            return;
        };

        debug!("📤 {}", packet);
        match self.socket.send_to(&packet.encode(), self.server).await {
            Ok(_) => self.sent += 1,
            Err(e) => warn!("⚠️  Failed to send packet to {}: {}", self.server, e),
        }

        if !self.send_delay.is_zero() {
            tokio::time::sleep(self.send_delay).await;
        }
    }
}
