// Copyright (c) 2024-2025 The PicoPot Developers

//! Line channel abstraction for hiding underlying transport types

use async_trait::async_trait;
use strum::Display;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpStream, ToSocketAddrs,
    },
};

use crate::Error;

/// Bidirectional newline-delimited text channel to a device.
///
/// Implementations carry no protocol knowledge; framing and reply
/// interpretation live in [crate::DeviceHandle].
#[async_trait]
pub trait Channel {
    /// Send one request line (terminator appended here)
    async fn send_line(&mut self, line: &str) -> Result<(), Error>;

    /// Receive one response line, trimmed of the terminator.
    ///
    /// Blocks until a line arrives; callers apply their own timeouts.
    async fn recv_line(&mut self) -> Result<String, Error>;
}

/// TCP line channel, the transport the simulator listens on
pub struct TcpChannel {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TcpChannel {
    /// Connect to a listening device or simulator
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self, Error> {
        let stream = TcpStream::connect(addr).await?;
        let (read, writer) = stream.into_split();

        Ok(Self {
            reader: BufReader::new(read),
            writer,
        })
    }
}

#[async_trait]
impl Channel for TcpChannel {
    async fn send_line(&mut self, line: &str) -> Result<(), Error> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn recv_line(&mut self) -> Result<String, Error> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await?;
        if n == 0 {
            // Peer closed without answering
            return Err(Error::Io(std::io::ErrorKind::UnexpectedEof.into()));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Generic device channel (abstract over transport types)
#[derive(Display)]
#[non_exhaustive]
pub enum GenericChannel {
    Tcp(TcpChannel),
}

/// Convert a TCP channel into a generic channel
impl From<TcpChannel> for GenericChannel {
    fn from(t: TcpChannel) -> Self {
        Self::Tcp(t)
    }
}

/// Implementation of [Channel] for [GenericChannel], hiding transport types
#[async_trait]
impl Channel for GenericChannel {
    async fn send_line(&mut self, line: &str) -> Result<(), Error> {
        match self {
            Self::Tcp(t) => t.send_line(line).await,
        }
    }

    async fn recv_line(&mut self) -> Result<String, Error> {
        match self {
            Self::Tcp(t) => t.recv_line().await,
        }
    }
}
