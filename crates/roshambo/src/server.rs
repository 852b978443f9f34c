//! Server builder and accept loop.
//!
//! This is the entry point for running a Roshambo server. It ties the
//! layers together: transport → protocol → session.

use std::sync::Arc;

use roshambo_protocol::{Codec, JsonCodec};
use roshambo_session::Registry;
use roshambo_transport::{Listener, WsListener};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::ServerError;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The
/// registry is the only piece that needs a lock — each session's state
/// is owned by its actor.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) registry: Mutex<Registry>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Roshambo server.
///
/// # Example
///
/// ```rust,no_run
/// use roshambo::ServerBuilder;
///
/// # async fn run() -> Result<(), roshambo::ServerError> {
/// let server = ServerBuilder::new().bind("0.0.0.0:8080").build().await?;
/// server.run().await
/// # }
/// ```
pub struct ServerBuilder {
    bind_addr: String,
}

impl ServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Binds the listener and builds the server.
    ///
    /// Uses `JsonCodec` over WebSocket — the wire format browser and CLI
    /// clients speak.
    pub async fn build(self) -> Result<Server<JsonCodec>, ServerError> {
        let listener = WsListener::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            registry: Mutex::new(Registry::new()),
            codec: JsonCodec,
        });

        Ok(Server { listener, state })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Roshambo server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct Server<C: Codec> {
    listener: WsListener,
    state: Arc<ServerState<C>>,
}

impl<C: Codec + Clone> Server<C> {
    /// Creates a new builder.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), ServerError> {
        tracing::info!("Roshambo server running");

        loop {
            match self.listener.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
