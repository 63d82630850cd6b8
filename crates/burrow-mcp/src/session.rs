//! Session lifecycle: which methods are legal in which state.
//!
//! ```text
//! Uninitialized --initialize--> Initializing --ok--> Ready
//!       ^                            |
//!       +-------- rejected ----------+
//! Ready --EOF--> ShuttingDown --drained--> Closed
//! ```
//!
//! The negotiated protocol version and peer capabilities are written once,
//! on the `Initializing -> Ready` transition, and never change afterwards.

use std::fmt;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use burrow_protocol::mcp::{methods, ClientCapabilities, Implementation};
use burrow_protocol::{error_codes, JsonRpcError};

/// Lifecycle state of the single peer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No `initialize` has succeeded yet.
    Uninitialized,
    /// An `initialize` request is being validated.
    Initializing,
    /// Handshake complete; all registered methods are legal.
    Ready,
    /// Input closed; in-flight calls are draining.
    ShuttingDown,
    /// Every call has drained.
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::ShuttingDown => "shutting_down",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Data agreed during `initialize`.
#[derive(Debug, Clone, PartialEq)]
pub struct Negotiated {
    /// Protocol version echoed back to the client.
    pub protocol_version: String,
    /// Capability flags the client declared.
    pub client_capabilities: ClientCapabilities,
    /// Client name and version, when sent.
    pub client_info: Option<Implementation>,
}

/// A method is not legal in the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Something other than `initialize` arrived before the handshake.
    #[error("session not initialized: {method} requires a successful initialize first")]
    NotInitialized { method: String },
    /// `initialize` arrived while a handshake was already in progress.
    #[error("initialize already in progress")]
    InitializeInProgress,
    /// `initialize` arrived after the handshake completed.
    #[error("session already initialized")]
    AlreadyInitialized,
    /// The session is draining or closed.
    #[error("server is shutting down")]
    ShuttingDown,
}

impl SessionError {
    /// JSON-RPC error code for this rejection.
    pub fn code(&self) -> i32 {
        match self {
            Self::NotInitialized { .. } => error_codes::NOT_INITIALIZED,
            Self::InitializeInProgress | Self::AlreadyInitialized => error_codes::INVALID_REQUEST,
            Self::ShuttingDown => error_codes::SHUTTING_DOWN,
        }
    }

    /// Converts the rejection into a JSON-RPC error object.
    pub fn to_rpc_error(&self) -> JsonRpcError {
        JsonRpcError::new(self.code(), self.to_string())
    }
}

#[derive(Debug)]
struct SessionInner {
    state: SessionState,
    negotiated: Option<Arc<Negotiated>>,
}

/// The per-process session. Owned explicitly and shared by `Arc`, so tests
/// can build as many independent sessions as they need.
#[derive(Debug)]
pub struct Session {
    inner: Mutex<SessionInner>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A fresh, uninitialized session.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SessionInner {
                state: SessionState::Uninitialized,
                negotiated: None,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    /// Negotiated handshake data, once `Ready`.
    pub fn negotiated(&self) -> Option<Arc<Negotiated>> {
        self.lock().negotiated.clone()
    }

    /// Checks whether a request for `method` may proceed in the current state.
    ///
    /// # Errors
    ///
    /// Returns the `SessionError` describing why the method is illegal now.
    pub fn admit(&self, method: &str) -> Result<(), SessionError> {
        let state = self.lock().state;
        match (state, method == methods::INITIALIZE) {
            (SessionState::ShuttingDown | SessionState::Closed, _) => {
                Err(SessionError::ShuttingDown)
            }
            (SessionState::Uninitialized, true) => Ok(()),
            (SessionState::Initializing, true) => Err(SessionError::InitializeInProgress),
            (SessionState::Uninitialized | SessionState::Initializing, false) => {
                Err(SessionError::NotInitialized {
                    method: method.to_string(),
                })
            }
            (SessionState::Ready, true) => Err(SessionError::AlreadyInitialized),
            (SessionState::Ready, false) => Ok(()),
        }
    }

    /// `Uninitialized -> Initializing`.
    ///
    /// # Errors
    ///
    /// Fails with the same rejection `admit(initialize)` would give.
    pub fn begin_initialize(&self) -> Result<(), SessionError> {
        let mut inner = self.lock();
        match inner.state {
            SessionState::Uninitialized => {
                inner.state = SessionState::Initializing;
                Ok(())
            }
            SessionState::Initializing => Err(SessionError::InitializeInProgress),
            SessionState::Ready => Err(SessionError::AlreadyInitialized),
            SessionState::ShuttingDown | SessionState::Closed => Err(SessionError::ShuttingDown),
        }
    }

    /// `Initializing -> Ready`, recording the negotiated data.
    ///
    /// Ignored unless the session is `Initializing`, so negotiated data is
    /// written at most once.
    pub fn complete_initialize(&self, negotiated: Negotiated) {
        let mut inner = self.lock();
        if inner.state != SessionState::Initializing {
            tracing::warn!(state = %inner.state, "complete_initialize outside initializing");
            return;
        }
        tracing::info!(
            protocol_version = %negotiated.protocol_version,
            client = negotiated
                .client_info
                .as_ref()
                .map(|c| c.name.as_str())
                .unwrap_or("unknown"),
            "session ready"
        );
        inner.negotiated = Some(Arc::new(negotiated));
        inner.state = SessionState::Ready;
    }

    /// `Initializing -> Uninitialized` after a rejected handshake.
    pub fn abort_initialize(&self) {
        let mut inner = self.lock();
        if inner.state == SessionState::Initializing {
            inner.state = SessionState::Uninitialized;
        }
    }

    /// Moves any live state to `ShuttingDown`.
    pub fn begin_shutdown(&self) {
        let mut inner = self.lock();
        if inner.state != SessionState::Closed && inner.state != SessionState::ShuttingDown {
            tracing::info!(from = %inner.state, "session shutting down");
            inner.state = SessionState::ShuttingDown;
        }
    }

    /// Final transition to `Closed`.
    pub fn close(&self) {
        let mut inner = self.lock();
        if inner.state != SessionState::Closed {
            tracing::info!("session closed");
            inner.state = SessionState::Closed;
        }
    }
}
