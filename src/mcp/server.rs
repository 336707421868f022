use super::{
    api::{tools, TimerTools},
    types::{
        CallToolParams, InitializeParams, Request, Response, RpcError, INVALID_REQUEST,
        JSONRPC_VERSION, METHOD_NOT_FOUND, PARSE_ERROR,
    },
};
use crate::{error::TimerError, timers::TimerStore};
use serde_json::{json, Value};
use std::fmt::Display;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, instrument, warn};

pub const SERVER_NAME: &str = "tasktimer";
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";
/// Protocol revisions echoed back when a client asks for them
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2024-11-05", "2025-03-26", "2025-06-18"];

fn parse_error(error: impl Display) -> Response {
    warn!("Received malformed message: {error}");
    Response::failure(
        Value::Null,
        RpcError::new(PARSE_ERROR, format!("Parse error: {error}")),
    )
}

/// JSON-RPC dispatcher exposing the timer tools
#[derive(Debug)]
pub struct Server {
    store: TimerStore,
}

impl Server {
    pub fn new(store: TimerStore) -> Self {
        Self { store }
    }

    /// Handles one raw message line, `None` when nothing must be sent back
    pub fn handle_line(&self, line: &str) -> Option<Response> {
        let message: Value = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(e) => return Some(parse_error(e)),
        };
        let id = message.get("id").cloned().unwrap_or(Value::Null);

        match serde_json::from_value::<Request>(message) {
            Ok(request) if request.jsonrpc != JSONRPC_VERSION => Some(Response::failure(
                id,
                RpcError::new(
                    INVALID_REQUEST,
                    format!("Unsupported jsonrpc version: {}", request.jsonrpc),
                ),
            )),
            Ok(request) => self.handle(request),
            Err(e) => Some(Response::failure(
                id,
                RpcError::new(INVALID_REQUEST, format!("Invalid request: {e}")),
            )),
        }
    }

    #[instrument(level = "trace", skip(self, request), fields(method = %request.method))]
    pub fn handle(&self, request: Request) -> Option<Response> {
        let Some(id) = request.id else {
            debug!("Notification {}", request.method);
            return None;
        };

        Some(match self.dispatch(&request.method, request.params) {
            Ok(result) => Response::success(id, result),
            Err(error) => Response::failure(id, error),
        })
    }

    fn dispatch(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        match method {
            "initialize" => {
                let requested = serde_json::from_value::<InitializeParams>(params)
                    .ok()
                    .and_then(|p| p.protocol_version)
                    .filter(|version| SUPPORTED_PROTOCOL_VERSIONS.contains(&version.as_str()));

                Ok(json!({
                    "protocolVersion": requested.as_deref().unwrap_or(DEFAULT_PROTOCOL_VERSION),
                    "capabilities": { "tools": {} },
                    "serverInfo": {
                        "name": SERVER_NAME,
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                }))
            }
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": tools() })),
            "tools/call" => {
                let CallToolParams { name, arguments } = serde_json::from_value(params)
                    .map_err(|e| RpcError::invalid_params(format!("Invalid tool call: {e}")))?;
                let result = TimerTools(&self.store).call(&name, arguments)?;

                serde_json::to_value(result)
                    .map_err(|e| RpcError::new(INVALID_REQUEST, e.to_string()))
            }
            other => Err(RpcError::new(
                METHOD_NOT_FOUND,
                format!("Method not found: {other}"),
            )),
        }
    }

    /// Reads one message per line until EOF, writing one response line per request
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<(), TimerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            let response = match std::str::from_utf8(&buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.handle_line(line.trim()),
                Err(e) => Some(parse_error(e)),
            };

            if let Some(response) = response {
                let mut encoded = serde_json::to_vec(&response)?;
                encoded.push(b'\n');
                writer.write_all(&encoded).await?;
                writer.flush().await?;
            }
        }

        debug!("Input closed, stopping");
        Ok(())
    }

    pub async fn serve_stdio(&self) -> Result<(), TimerError> {
        info!(
            "Serving timers from {} on stdio",
            self.store.path().display()
        );

        self.serve(BufReader::new(io::stdin()), io::stdout()).await
    }
}
