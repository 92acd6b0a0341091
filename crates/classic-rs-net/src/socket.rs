//! Socket primitives used by the connection state machine.
//!
//! The state machine only ever polls: [`Connector::poll`] during connect and
//! [`Socket::available`] before each read, so a tick never blocks waiting on
//! the network. The TCP implementation runs the connect on the tokio runtime
//! and hands back a blocking `std` stream once it completes.

use std::io::{self, Read, Write};
use std::net::TcpStream;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::constants::READ_CHUNK_SIZE;

/// An established stream socket.
pub trait Socket: Send {
    /// Bytes that can be read right now without blocking.
    fn available(&mut self) -> io::Result<usize>;

    /// Whether a read would return immediately (data, end of stream or error).
    fn poll_readable(&mut self) -> io::Result<bool>;

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    fn shutdown(&mut self);
}

/// Result of polling an in-flight connect.
pub enum ConnectStatus {
    Pending,
    Connected(Box<dyn Socket>),
    Failed(io::Error),
}

/// Opens sockets without blocking the caller.
pub trait Connector: Send {
    /// Start connecting. Errors here mean the attempt never got off the ground.
    fn begin(&mut self, address: &str, port: u16) -> io::Result<()>;

    fn poll(&mut self) -> ConnectStatus;

    /// Abandon the attempt in flight, if any.
    fn cancel(&mut self);
}

// ---------------------------------------------------------------------------
// TCP
// ---------------------------------------------------------------------------

pub struct TcpSocket {
    stream: TcpStream,
    scratch: Vec<u8>,
}

impl TcpSocket {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            scratch: vec![0; READ_CHUNK_SIZE],
        }
    }

    /// Peek without blocking. `None` means nothing is pending yet;
    /// `Some(0)` means the peer closed the stream.
    fn peek_pending(&mut self) -> io::Result<Option<usize>> {
        if let Some(err) = self.stream.take_error()? {
            return Err(err);
        }
        self.stream.set_nonblocking(true)?;
        let peeked = self.stream.peek(&mut self.scratch);
        self.stream.set_nonblocking(false)?;

        match peeked {
            Ok(n) => Ok(Some(n)),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl Socket for TcpSocket {
    fn available(&mut self) -> io::Result<usize> {
        Ok(self.peek_pending()?.unwrap_or(0))
    }

    fn poll_readable(&mut self) -> io::Result<bool> {
        Ok(self.peek_pending()?.is_some())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn shutdown(&mut self) {
        let _ = self.stream.shutdown(std::net::Shutdown::Both);
    }
}

/// Connects on a tokio runtime and polls the result from the tick loop.
pub struct TcpConnector {
    runtime: Handle,
    pending: Option<oneshot::Receiver<io::Result<TcpStream>>>,
    task: Option<JoinHandle<()>>,
}

impl TcpConnector {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            pending: None,
            task: None,
        }
    }
}

async fn connect(target: String) -> io::Result<TcpStream> {
    let stream = tokio::net::TcpStream::connect(&target).await?;
    stream.set_nodelay(true)?;
    let stream = stream.into_std()?;
    stream.set_nonblocking(false)?;
    Ok(stream)
}

impl Connector for TcpConnector {
    fn begin(&mut self, address: &str, port: u16) -> io::Result<()> {
        self.cancel();
        let target = format!("{address}:{port}");
        let (tx, rx) = oneshot::channel();
        debug!("Spawning connect task for {target}");
        self.task = Some(self.runtime.spawn(async move {
            if tx.send(connect(target).await).is_err() {
                debug!("Connect finished after the attempt was dropped");
            }
        }));
        self.pending = Some(rx);
        Ok(())
    }

    fn cancel(&mut self) {
        self.pending = None;
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn poll(&mut self) -> ConnectStatus {
        let Some(rx) = self.pending.as_mut() else {
            return ConnectStatus::Failed(io::Error::new(
                io::ErrorKind::NotConnected,
                "no connect in progress",
            ));
        };
        match rx.try_recv() {
            Err(oneshot::error::TryRecvError::Empty) => ConnectStatus::Pending,
            Err(oneshot::error::TryRecvError::Closed) => {
                self.pending = None;
                self.task = None;
                ConnectStatus::Failed(io::Error::new(
                    io::ErrorKind::Other,
                    "connect task ended",
                ))
            }
            Ok(result) => {
                self.pending = None;
                self.task = None;
                match result {
                    Ok(stream) => ConnectStatus::Connected(Box::new(TcpSocket::new(stream))),
                    Err(e) => ConnectStatus::Failed(e),
                }
            }
        }
    }
}
