//! MCP server loop over stdio transport.
//!
//! A reader task frames stdin into lines and forwards them over a channel.
//! The loop decodes each frame, admits it against the session, and either
//! answers inline (lifecycle and listing methods) or spawns it onto a
//! `JoinSet` (`tools/call`). Every write happens here, one line at a time.
//!
//! On end of input the session moves to `ShuttingDown`, in-flight calls
//! run to completion, their responses are discarded, and the session
//! closes.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{self, JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use burrow_mcp::McpHandler;
use burrow_protocol::{
    decode, error_codes, JsonRpcErrorResponse, JsonRpcOutput, Message, RequestId,
};

use crate::error::TransportError;
use crate::transport::{FrameReader, FrameWriter, StdioTransport};

/// Default cap on concurrently executing `tools/call` requests.
pub const DEFAULT_MAX_CONCURRENT_CALLS: usize = 4;

const FRAME_BUFFER: usize = 64;

/// Server loop tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerOptions {
    /// How many `tools/call` handlers may run at once. `1` executes and
    /// answers calls strictly in arrival order.
    pub max_concurrent_calls: usize,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            max_concurrent_calls: DEFAULT_MAX_CONCURRENT_CALLS,
        }
    }
}

/// MCP server that reads from a transport and dispatches to a handler.
pub struct McpServer<R, W> {
    transport: StdioTransport<R, W>,
    handler: McpHandler,
    options: ServerOptions,
}

impl<R, W> McpServer<R, W>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin,
{
    /// Creates a new server with the given transport and handler.
    pub fn new(transport: StdioTransport<R, W>, handler: McpHandler) -> Self {
        Self {
            transport,
            handler,
            options: ServerOptions::default(),
        }
    }

    /// Replaces the loop options.
    pub fn with_options(mut self, options: ServerOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs until the input stream ends.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if a response cannot be written.
    pub async fn run(self) -> Result<(), TransportError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs until the input stream ends or `shutdown` resolves, whichever
    /// comes first. Either way in-flight calls are drained before return.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if a response cannot be written.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), TransportError>
    where
        F: Future<Output = ()>,
    {
        info!(
            max_concurrent_calls = self.options.max_concurrent_calls,
            "MCP server starting on stdio"
        );
        let (reader, writer) = self.transport.into_split();
        let (tx, mut rx) = mpsc::channel(FRAME_BUFFER);
        let reader_task = tokio::spawn(read_frames(reader, tx));

        let max = self.options.max_concurrent_calls.max(1);
        let mut conn = Connection {
            handler: self.handler,
            writer,
            in_flight: JoinSet::new(),
            pending: HashMap::new(),
            permits: Arc::new(Semaphore::new(max)),
            sequential: max == 1,
        };

        let result = conn.serve(&mut rx, shutdown).await;
        conn.drain(&mut rx).await;
        reader_task.abort();
        info!("MCP server stopped");
        result
    }
}

async fn read_frames<R>(mut reader: FrameReader<R>, tx: mpsc::Sender<Vec<u8>>)
where
    R: AsyncRead + Unpin,
{
    loop {
        match reader.receive().await {
            Ok(Some(frame)) => {
                if tx.send(frame).await.is_err() {
                    return;
                }
            }
            Ok(None) => {
                info!("stdin closed");
                return;
            }
            Err(e) => {
                warn!(error = %e, "read failed, treating as end of stream");
                return;
            }
        }
    }
}

struct Connection<W> {
    handler: McpHandler,
    writer: FrameWriter<W>,
    in_flight: JoinSet<JsonRpcOutput>,
    pending: HashMap<task::Id, RequestId>,
    permits: Arc<Semaphore>,
    sequential: bool,
}

impl<W> Connection<W>
where
    W: AsyncWrite + Unpin,
{
    async fn serve<F>(
        &mut self,
        rx: &mut mpsc::Receiver<Vec<u8>>,
        shutdown: F,
    ) -> Result<(), TransportError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                frame = rx.recv() => match frame {
                    Some(frame) => self.handle_frame(&frame).await?,
                    None => return Ok(()),
                },
                Some(joined) = self.in_flight.join_next_with_id(), if !self.in_flight.is_empty() => {
                    if let Some(output) = self.complete(joined) {
                        self.write(&output).await?;
                    }
                }
                () = &mut shutdown => {
                    info!("shutdown requested");
                    return Ok(());
                }
            }
        }
    }

    /// Waits for in-flight calls and discards their responses. Input that
    /// is still arriving is answered with `SHUTTING_DOWN`.
    async fn drain(&mut self, rx: &mut mpsc::Receiver<Vec<u8>>) {
        self.handler.session().begin_shutdown();
        let mut input_open = true;
        while !self.in_flight.is_empty() {
            tokio::select! {
                Some(joined) = self.in_flight.join_next_with_id() => {
                    if let Some(output) = self.complete(joined) {
                        debug!(id = %output.id(), "discarding response after shutdown");
                    }
                }
                frame = rx.recv(), if input_open => match frame {
                    Some(frame) => {
                        if let Err(e) = self.handle_frame(&frame).await {
                            warn!(error = %e, "write failed while draining");
                            input_open = false;
                        }
                    }
                    None => input_open = false,
                },
                else => break,
            }
        }
        self.handler.session().close();
    }

    async fn handle_frame(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        if frame.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }

        match decode(frame) {
            Ok(Message::Request(request)) => {
                debug!(method = %request.method, id = %request.id, "received request");
                if let Err(rejection) = self.handler.admit(&request) {
                    return self.write(&rejection).await;
                }
                if self.sequential || !McpHandler::runs_concurrently(&request.method) {
                    let output = self.handler.execute(&request).await;
                    return self.write(&output).await;
                }

                let handler = self.handler.clone();
                let permits = Arc::clone(&self.permits);
                let id = request.id.clone();
                let abort = self.in_flight.spawn(async move {
                    let _permit = permits.acquire_owned().await.ok();
                    handler.execute(&request).await
                });
                self.pending.insert(abort.id(), id);
                Ok(())
            }
            Ok(Message::Notification(notification)) => {
                debug!(method = %notification.method, "received notification");
                self.handler.handle_notification(&notification).await;
                Ok(())
            }
            Ok(Message::Response(response)) => {
                debug!(id = %response.id(), "ignoring response from peer");
                Ok(())
            }
            Err(e) => match e.to_response() {
                Some(response) => {
                    warn!(error = %e, id = %response.id, "malformed request");
                    self.write(&JsonRpcOutput::Error(response)).await
                }
                None => {
                    warn!(error = %e, "dropping malformed message without id");
                    Ok(())
                }
            },
        }
    }

    /// Maps a finished call task to the response it owes, if any.
    fn complete(
        &mut self,
        joined: Result<(task::Id, JsonRpcOutput), JoinError>,
    ) -> Option<JsonRpcOutput> {
        match joined {
            Ok((task_id, output)) => {
                self.pending.remove(&task_id);
                Some(output)
            }
            Err(e) => {
                error!(error = %e, "call task failed");
                self.pending.remove(&e.id()).map(|id| {
                    JsonRpcOutput::Error(JsonRpcErrorResponse::error(
                        id,
                        error_codes::INTERNAL_ERROR,
                        "internal error",
                    ))
                })
            }
        }
    }

    async fn write(&mut self, output: &JsonRpcOutput) -> Result<(), TransportError> {
        let json = output.to_json().inspect_err(|e| {
            error!(error = %e, "failed to serialize response");
        })?;
        self.writer.send(json.as_bytes()).await
    }
}
