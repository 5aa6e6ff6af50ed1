//! Wire messages and their 24-byte frame.
//!
//! A frame is the network magic, a NUL-padded 12-byte command, the payload
//! length (u32 LE) and the first four bytes of the payload's SHA-256d,
//! followed by the payload itself.

use std::time::{SystemTime, UNIX_EPOCH};

use flo_primitives::hash::sha256d;
use flo_primitives::util::{ByteReader, ByteWriter};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::P2pError;

/// Length of a frame header.
pub const HEADER_LEN: usize = 24;
/// Width of the command field.
pub const COMMAND_LEN: usize = 12;
/// Largest payload accepted from a peer.
pub const MAX_PAYLOAD_LEN: usize = 32 * 1024 * 1024;

/// Protocol version sent in `version`.
pub const PROTOCOL_VERSION: i32 = 70015;
/// Inventory type for a transaction without witness data.
pub const MSG_TX: u32 = 1;
/// Inventory type for a transaction with witness data.
pub const MSG_WITNESS_TX: u32 = 0x4000_0001;

const NODE_NETWORK: u64 = 1;

/// One entry of an `inv` or `getdata` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvVector {
    pub kind: u32,
    /// Hash in internal byte order.
    pub hash: [u8; 32],
}

/// Payload of a `version` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMessage {
    pub version: i32,
    pub services: u64,
    pub timestamp: i64,
    pub nonce: u64,
    pub user_agent: String,
    pub start_height: i32,
    pub relay: bool,
}

impl VersionMessage {
    /// A `version` for this client with the current time.
    pub fn new(user_agent: &str, start_height: i32, nonce: u64) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        VersionMessage {
            version: PROTOCOL_VERSION,
            services: 0,
            timestamp,
            nonce,
            user_agent: user_agent.to_string(),
            start_height,
            relay: false,
        }
    }
}

/// A decoded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Version(VersionMessage),
    Verack,
    Inv(Vec<InvVector>),
    GetData(Vec<InvVector>),
    /// Serialized transaction bytes.
    Tx(Vec<u8>),
    Ping(u64),
    Pong(u64),
    /// Any command this client does not act on.
    Other { command: String, payload: Vec<u8> },
}

impl Message {
    pub fn command(&self) -> &str {
        match self {
            Message::Version(_) => "version",
            Message::Verack => "verack",
            Message::Inv(_) => "inv",
            Message::GetData(_) => "getdata",
            Message::Tx(_) => "tx",
            Message::Ping(_) => "ping",
            Message::Pong(_) => "pong",
            Message::Other { command, .. } => command,
        }
    }

    /// Serialize the payload (without the frame header).
    pub fn encode_payload(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        match self {
            Message::Version(v) => {
                w.write_u32_le(v.version as u32);
                w.write_u64_le(v.services);
                w.write_u64_le(v.timestamp as u64);
                write_net_addr(&mut w, NODE_NETWORK);
                write_net_addr(&mut w, v.services);
                w.write_u64_le(v.nonce);
                w.write_var_bytes(v.user_agent.as_bytes());
                w.write_u32_le(v.start_height as u32);
                w.write_u8(u8::from(v.relay));
            }
            Message::Verack => {}
            Message::Inv(items) | Message::GetData(items) => {
                w.write_varint((items.len() as u64).into());
                for item in items {
                    w.write_u32_le(item.kind);
                    w.write_bytes(&item.hash);
                }
            }
            Message::Tx(bytes) => w.write_bytes(bytes),
            Message::Ping(nonce) | Message::Pong(nonce) => w.write_u64_le(*nonce),
            Message::Other { payload, .. } => w.write_bytes(payload),
        }
        w.into_bytes()
    }

    /// Decode a payload received under `command`.
    pub fn decode(command: &str, payload: &[u8]) -> Result<Self, P2pError> {
        let mut r = ByteReader::new(payload);
        let msg = match command {
            "version" => {
                let version = r.read_u32_le()? as i32;
                let services = r.read_u64_le()?;
                let timestamp = r.read_u64_le()? as i64;
                r.read_bytes(26)?;
                r.read_bytes(26)?;
                let nonce = r.read_u64_le()?;
                let user_agent = String::from_utf8_lossy(r.read_var_bytes()?).into_owned();
                let start_height = r.read_u32_le()? as i32;
                // Older peers omit the relay flag.
                let relay = if r.remaining() > 0 { r.read_u8()? != 0 } else { true };
                Message::Version(VersionMessage {
                    version,
                    services,
                    timestamp,
                    nonce,
                    user_agent,
                    start_height,
                    relay,
                })
            }
            "verack" => Message::Verack,
            "inv" => Message::Inv(read_inventory(&mut r)?),
            "getdata" => Message::GetData(read_inventory(&mut r)?),
            "tx" => Message::Tx(payload.to_vec()),
            "ping" => Message::Ping(r.read_u64_le()?),
            "pong" => Message::Pong(r.read_u64_le()?),
            other => Message::Other { command: other.to_string(), payload: payload.to_vec() },
        };
        Ok(msg)
    }

    /// Serialize the full frame for `magic`.
    pub fn to_frame(&self, magic: [u8; 4]) -> Vec<u8> {
        let payload = self.encode_payload();
        let mut w = ByteWriter::with_capacity(HEADER_LEN + payload.len());
        w.write_bytes(&magic);
        let mut command = [0u8; COMMAND_LEN];
        let name = self.command().as_bytes();
        let n = name.len().min(COMMAND_LEN);
        command[..n].copy_from_slice(&name[..n]);
        w.write_bytes(&command);
        w.write_u32_le(payload.len() as u32);
        w.write_bytes(&checksum(&payload));
        w.write_bytes(&payload);
        w.into_bytes()
    }
}

/// A parsed frame header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub magic: [u8; 4],
    pub command: String,
    pub length: u32,
    pub checksum: [u8; 4],
}

impl FrameHeader {
    pub fn parse(bytes: &[u8; HEADER_LEN]) -> Result<Self, P2pError> {
        let mut r = ByteReader::new(bytes);
        let magic = r.read_array::<4>()?;
        let raw = r.read_bytes(COMMAND_LEN)?;
        let end = raw.iter().position(|b| *b == 0).unwrap_or(COMMAND_LEN);
        if raw[end..].iter().any(|b| *b != 0) {
            return Err(P2pError::Protocol("command is not NUL padded".to_string()));
        }
        let command = std::str::from_utf8(&raw[..end])
            .map_err(|_| P2pError::Protocol("command is not ascii".to_string()))?
            .to_string();
        let length = r.read_u32_le()?;
        let checksum = r.read_array::<4>()?;
        Ok(FrameHeader { magic, command, length, checksum })
    }
}

/// First four bytes of SHA-256d.
pub fn checksum(payload: &[u8]) -> [u8; 4] {
    let digest = sha256d(payload);
    [digest[0], digest[1], digest[2], digest[3]]
}

/// Read one frame and decode it.
///
/// # Returns
/// The message, or `Protocol` for a foreign magic, an oversized payload or a
/// bad checksum. A closed socket surfaces as `Io(UnexpectedEof)`.
pub async fn read_message<R>(reader: &mut R, magic: [u8; 4]) -> Result<Message, P2pError>
where
    R: AsyncRead + Unpin,
{
    let mut head = [0u8; HEADER_LEN];
    reader.read_exact(&mut head).await?;
    let header = FrameHeader::parse(&head)?;

    if header.magic != magic {
        return Err(P2pError::Protocol(format!(
            "unexpected magic {:02x?}",
            header.magic
        )));
    }
    let length = header.length as usize;
    if length > MAX_PAYLOAD_LEN {
        return Err(P2pError::Protocol(format!("payload of {} bytes is too large", length)));
    }

    let mut payload = vec![0u8; length];
    reader.read_exact(&mut payload).await?;
    if checksum(&payload) != header.checksum {
        return Err(P2pError::Protocol(format!("bad checksum on {}", header.command)));
    }
    Message::decode(&header.command, &payload)
}

/// Frame and write one message.
pub async fn write_message<W>(writer: &mut W, magic: [u8; 4], msg: &Message) -> Result<(), P2pError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&msg.to_frame(magic)).await?;
    writer.flush().await?;
    Ok(())
}

fn read_inventory(r: &mut ByteReader) -> Result<Vec<InvVector>, P2pError> {
    let count = r.read_varint()?.value() as usize;
    if count.saturating_mul(36) > r.remaining() {
        return Err(P2pError::Protocol(format!("inventory of {} entries is truncated", count)));
    }
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        let kind = r.read_u32_le()?;
        let hash = r.read_array::<32>()?;
        items.push(InvVector { kind, hash });
    }
    Ok(items)
}

// Unroutable address: services, IPv4-mapped 0.0.0.0, port 0.
fn write_net_addr(w: &mut ByteWriter, services: u64) {
    w.write_u64_le(services);
    w.write_bytes(&[0u8; 10]);
    w.write_bytes(&[0xff, 0xff, 0, 0, 0, 0]);
    w.write_bytes(&[0, 0]);
}
