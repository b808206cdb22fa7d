//! TCP transport with buffered and framed read paths

use std::io::Cursor;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufStream};
use tokio::net::TcpStream;

use thriftmark_core::{Connection, ConnectionFactory, ReplyOutcome, TransportError, Wrapper};

use crate::binary::MessageReader;

/// Largest accepted reply frame.
const MAX_FRAME_SIZE: u32 = 16 * 1024 * 1024;

/// Opens TCP connections to one target address
#[derive(Debug, Clone)]
pub struct SocketFactory {
    addr: String,
    wrapper: Wrapper,
}

impl SocketFactory {
    /// Factory for the given address and wrapper selection.
    pub fn new(addr: impl Into<String>, wrapper: Wrapper) -> Self {
        Self {
            addr: addr.into(),
            wrapper,
        }
    }
}

#[async_trait]
impl ConnectionFactory for SocketFactory {
    async fn connect(&self) -> Result<Box<dyn Connection>, TransportError> {
        let stream =
            TcpStream::connect(&self.addr)
                .await
                .map_err(|source| TransportError::Connect {
                    addr: self.addr.clone(),
                    source,
                })?;
        if let Err(error) = stream.set_nodelay(true) {
            tracing::debug!(%error, "failed to set TCP_NODELAY");
        }
        tracing::debug!(addr = %self.addr, "connection opened");

        Ok(Box::new(SocketConnection {
            stream: BufStream::new(stream),
            wrapper: self.wrapper,
        }))
    }
}

/// One open benchmark connection over TCP
///
/// Requests are written verbatim (the precomputed bytes already carry any
/// frame header); replies are parsed straight off the buffered stream, or out
/// of a length-prefixed frame when the framed wrapper is selected.
pub struct SocketConnection {
    stream: BufStream<TcpStream>,
    wrapper: Wrapper,
}

#[async_trait]
impl Connection for SocketConnection {
    async fn send_request(&mut self, request: &[u8]) -> Result<(), TransportError> {
        self.stream
            .write_all(request)
            .await
            .map_err(TransportError::Write)?;
        self.stream.flush().await.map_err(TransportError::Write)
    }

    async fn read_reply(&mut self) -> Result<ReplyOutcome, TransportError> {
        match self.wrapper {
            Wrapper::Framed => {
                let len = self.stream.read_u32().await.map_err(TransportError::Read)?;
                if len > MAX_FRAME_SIZE {
                    return Err(TransportError::Malformed(format!(
                        "oversized reply frame: {len} bytes"
                    )));
                }
                let mut frame = vec![0u8; len as usize];
                self.stream
                    .read_exact(&mut frame)
                    .await
                    .map_err(TransportError::Read)?;
                MessageReader::new(Cursor::new(frame))
                    .read_reply_outcome()
                    .await
            }
            Wrapper::Buffered => {
                MessageReader::new(&mut self.stream)
                    .read_reply_outcome()
                    .await
            }
        }
    }
}
