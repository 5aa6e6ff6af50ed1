//! Short-lived peer connection that announces transactions and serves them
//! back on request.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::time::Duration;

use flo_primitives::chainhash::Hash;
use flo_script::Network;
use flo_transaction::Transaction;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, info, trace, warn};

use crate::message::{
    read_message, write_message, InvVector, Message, VersionMessage, MSG_TX, MSG_WITNESS_TX,
};
use crate::P2pError;

/// Connection settings for [`PeerAnnouncer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerConfig {
    /// Seconds allowed for the TCP connect.
    pub connect_timeout_secs: u64,
    /// Seconds allowed for the version/verack exchange.
    pub handshake_timeout_secs: u64,
    /// Seconds to keep answering `getdata` after announcing.
    pub grace_period_secs: u64,
    /// User agent sent in `version`.
    pub user_agent: String,
}

impl PeerConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            handshake_timeout_secs: 5,
            grace_period_secs: 5,
            user_agent: concat!("/flo-sdk:", env!("CARGO_PKG_VERSION"), "/").to_string(),
        }
    }
}

struct AnnouncedTx {
    stripped: Vec<u8>,
    full: Vec<u8>,
}

/// A single outbound peer connection.
///
/// Connect, [`announce`](Self::announce) the transactions, then
/// [`serve_for`](Self::serve_for) a grace period so the peer can fetch
/// them, then [`destroy`](Self::destroy).
pub struct PeerAnnouncer {
    addr: String,
    network: Network,
    config: PeerConfig,
    stream: Option<TcpStream>,
    announced: HashMap<[u8; 32], AnnouncedTx>,
}

impl PeerAnnouncer {
    /// Create an unconnected announcer for `addr` (`host:port`).
    pub fn new(addr: impl Into<String>, network: Network, config: PeerConfig) -> Self {
        PeerAnnouncer {
            addr: addr.into(),
            network,
            config,
            stream: None,
            announced: HashMap::new(),
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Open the socket and complete the version handshake.
    ///
    /// # Returns
    /// `Timeout` if either step exceeds its configured limit, `Connect` if
    /// the socket cannot be opened, or `Protocol` if the peer misbehaves.
    /// The socket is released on any failure.
    pub async fn connect(&mut self) -> Result<(), P2pError> {
        let stream = match timeout(self.config.connect_timeout(), TcpStream::connect(&self.addr)).await
        {
            Err(_) => return Err(P2pError::Timeout("connect")),
            Ok(Err(e)) => {
                return Err(P2pError::Connect { addr: self.addr.clone(), reason: e.to_string() })
            }
            Ok(Ok(stream)) => stream,
        };
        self.stream = Some(stream);

        let result = match timeout(self.config.handshake_timeout(), self.handshake()).await {
            Err(_) => Err(P2pError::Timeout("handshake")),
            Ok(result) => result,
        };
        match result {
            Ok(()) => {
                info!(peer = %self.addr, "peer connected");
                Ok(())
            }
            Err(e) => {
                self.destroy().await;
                Err(e)
            }
        }
    }

    async fn handshake(&mut self) -> Result<(), P2pError> {
        let nonce = rand::random::<u64>();
        let version = VersionMessage::new(&self.config.user_agent, 0, nonce);
        self.send(&Message::Version(version)).await?;

        let mut got_version = false;
        let mut got_verack = false;
        while !(got_version && got_verack) {
            match self.recv().await? {
                Message::Version(v) => {
                    if v.nonce == nonce {
                        return Err(P2pError::Protocol("connected to self".to_string()));
                    }
                    debug!(peer = %self.addr, user_agent = %v.user_agent, version = v.version, "peer version");
                    got_version = true;
                    self.send(&Message::Verack).await?;
                }
                Message::Verack => got_verack = true,
                Message::Ping(n) => self.send(&Message::Pong(n)).await?,
                other => trace!(command = other.command(), "ignored during handshake"),
            }
        }
        Ok(())
    }

    /// Send one `inv` listing every transaction in `txs`.
    ///
    /// The transactions are kept so a later `getdata` can be answered.
    pub async fn announce(&mut self, txs: &[Transaction]) -> Result<(), P2pError> {
        if self.stream.is_none() {
            return Err(P2pError::NotConnected);
        }
        if txs.is_empty() {
            return Ok(());
        }

        let mut items = Vec::with_capacity(txs.len());
        for tx in txs {
            let txid: Hash = tx.tx_id();
            items.push(InvVector { kind: MSG_TX, hash: *txid.as_bytes() });
            self.announced.insert(
                *txid.as_bytes(),
                AnnouncedTx { stripped: tx.serialize(false, true), full: tx.to_bytes() },
            );
        }
        self.send(&Message::Inv(items)).await?;
        info!(peer = %self.addr, count = txs.len(), "announced transactions");
        Ok(())
    }

    /// Answer the peer for `duration` or until it hangs up.
    ///
    /// `getdata` for an announced transaction gets a `tx`, `ping` gets a
    /// `pong`, everything else is ignored.
    ///
    /// # Returns
    /// How many transactions were sent.
    pub async fn serve_for(&mut self, duration: Duration) -> Result<usize, P2pError> {
        if self.stream.is_none() {
            return Err(P2pError::NotConnected);
        }
        let deadline = Instant::now() + duration;
        let mut served = 0;

        loop {
            let msg = match timeout_at(deadline, self.recv()).await {
                Err(_) => break,
                Ok(Ok(msg)) => msg,
                Ok(Err(P2pError::Io(e))) if e.kind() == ErrorKind::UnexpectedEof => {
                    debug!(peer = %self.addr, "peer closed the connection");
                    self.stream = None;
                    break;
                }
                Ok(Err(e)) => return Err(e),
            };
            served += self.handle(msg).await?;
        }
        Ok(served)
    }

    async fn handle(&mut self, msg: Message) -> Result<usize, P2pError> {
        match msg {
            Message::GetData(items) => {
                let mut sent = 0;
                for item in items {
                    let bytes = match (item.kind, self.announced.get(&item.hash)) {
                        (MSG_TX, Some(tx)) => tx.stripped.clone(),
                        (MSG_WITNESS_TX, Some(tx)) => tx.full.clone(),
                        _ => {
                            trace!(kind = item.kind, "getdata for unknown item");
                            continue;
                        }
                    };
                    self.send(&Message::Tx(bytes)).await?;
                    sent += 1;
                }
                if sent > 0 {
                    debug!(peer = %self.addr, sent, "served transactions");
                }
                Ok(sent)
            }
            Message::Ping(n) => {
                self.send(&Message::Pong(n)).await?;
                Ok(0)
            }
            other => {
                trace!(command = other.command(), "ignored");
                Ok(0)
            }
        }
    }

    /// Close the socket. Safe to call more than once.
    pub async fn destroy(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                warn!(peer = %self.addr, error = %e, "socket shutdown failed");
            }
            debug!(peer = %self.addr, "peer disconnected");
        }
    }

    async fn send(&mut self, msg: &Message) -> Result<(), P2pError> {
        let magic = self.network.magic();
        let stream = self.stream.as_mut().ok_or(P2pError::NotConnected)?;
        write_message(stream, magic, msg).await
    }

    async fn recv(&mut self) -> Result<Message, P2pError> {
        let magic = self.network.magic();
        let stream = self.stream.as_mut().ok_or(P2pError::NotConnected)?;
        read_message(stream, magic).await
    }
}
