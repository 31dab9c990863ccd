use async_trait::async_trait;
use log::{debug, error, info, warn};
use std::{fmt, future::Future};

use super::errors::{RelayError, TransportError};

/// A bidirectional text-frame channel to the server.
#[async_trait]
pub trait Transport: Send {
    async fn send(&mut self, frame: String) -> Result<(), TransportError>;

    /// Next inbound text frame; `None` once the peer has closed.
    async fn recv(&mut self) -> Option<Result<String, TransportError>>;

    async fn close(&mut self) -> Result<(), TransportError>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
        };
        write!(f, "{repr}")
    }
}

/// The single server connection for a session. Once closed it stays
/// closed; there is no reconnect.
pub struct Connection<T> {
    state: ConnectionState,
    transport: Option<T>,
}

impl<T: Transport> Connection<T> {
    /// Drives `connect` to completion. A failed connect leaves the
    /// connection closed.
    pub async fn open<F>(connect: F) -> Self
    where
        F: Future<Output = Result<T, TransportError>>,
    {
        let mut connection = Self {
            state: ConnectionState::Connecting,
            transport: None,
        };
        match connect.await {
            Ok(transport) => {
                connection.transport = Some(transport);
                connection.state = ConnectionState::Open;
                info!("connection open");
            }
            Err(err) => {
                connection.state = ConnectionState::Closed;
                error!("{err}");
            }
        }
        connection
    }

    /// Wraps an already established transport.
    pub fn from_transport(transport: T) -> Self {
        Self {
            state: ConnectionState::Open,
            transport: Some(transport),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    pub async fn send(&mut self, frame: String) -> Result<(), RelayError> {
        let unavailable = RelayError::TransportUnavailable { state: self.state };
        if !self.is_open() {
            return Err(unavailable);
        }
        let Some(transport) = self.transport.as_mut() else {
            return Err(unavailable);
        };
        if let Err(err) = transport.send(frame).await {
            self.state = ConnectionState::Closed;
            return Err(err.into());
        }
        Ok(())
    }

    /// Next inbound frame. Returns `None` once the connection is lost,
    /// after which the connection is closed.
    pub async fn recv(&mut self) -> Option<String> {
        if !self.is_open() {
            return None;
        }
        let transport = self.transport.as_mut()?;
        match transport.recv().await {
            Some(Ok(frame)) => Some(frame),
            Some(Err(err)) => {
                error!("{err}");
                self.state = ConnectionState::Closed;
                None
            }
            None => {
                debug!("server closed the connection");
                self.state = ConnectionState::Closed;
                None
            }
        }
    }

    pub async fn close(&mut self) {
        if let Some(mut transport) = self.transport.take()
            && let Err(err) = transport.close().await
        {
            warn!("error while closing connection: {err}");
        }
        self.state = ConnectionState::Closed;
    }
}
