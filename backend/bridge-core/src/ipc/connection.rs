//! One accepted connection: framing, authentication and dispatch.
//!
//! Requests on a connection are handled strictly one at a time. A response
//! is fully written and flushed before the next frame is read, so clients
//! always see responses in request order.

use crate::HOST_VERSION;
use crate::error::{DispatchError, FramingError};
use crate::ipc::BridgeServices;
use crate::ipc::ConnectionState;
use crate::protocol::{Directive, Request, Response, read_frame, write_frame};

use common::RedactedToken;

use std::net::SocketAddr;

use log::{error, info, warn};
use serde_json::Value;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

/// Serves `stream` until the peer disconnects or a framing error occurs.
///
/// Protocol, auth and dispatch errors are answered in-band and the loop
/// continues. Only framing and socket errors end the connection.
pub(crate) async fn handle_connection<H: 'static>(
    stream: TcpStream,
    peer: SocketAddr,
    expected_token: Option<RedactedToken>,
    services: &BridgeServices<H>,
    max_frame_bytes: u32,
) {
    info!("New connection from {}", peer);

    let (mut reader, mut writer) = stream.into_split();
    let mut state = ConnectionState::new(expected_token);

    loop {
        let payload = match read_frame(&mut reader, max_frame_bytes).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                info!("Client {} disconnected", peer);
                break;
            }
            Err(e) if e.is_truncation() => {
                info!("Client {} disconnected mid-frame: {}", peer, e);
                break;
            }
            Err(e) => {
                error!("Framing error on connection from {}: {}", peer, e);
                break;
            }
        };

        if let Err(e) = process_message(&payload, &mut state, services, &mut writer, peer).await {
            error!("Failed to send response to {}: {}", peer, e);
            break;
        }
    }

    // Best effort: the peer may already be gone.
    let _ = writer.shutdown().await;
}

/// Handles one request, writing whatever responses it produces.
///
/// # Errors
///
/// Returns [`FramingError`] only if writing to the socket failed.
pub(crate) async fn process_message<H, W>(
    payload: &[u8],
    state: &mut ConnectionState,
    services: &BridgeServices<H>,
    writer: &mut W,
    peer: SocketAddr,
) -> Result<(), FramingError>
where
    H: 'static,
    W: AsyncWrite + Unpin,
{
    let request = match Request::parse(payload) {
        Ok(request) => request,
        Err(e) => {
            warn!("Protocol error from {}: {}", peer, e);
            return send_response(writer, &Response::error(Value::Null, e.message())).await;
        }
    };
    let id = request.id.clone();

    if !state.is_authenticated() {
        if let Err(e) = state.authenticate(request.token.as_ref()) {
            warn!("Client {} auth failed: {}", peer, e.message());
            return send_response(writer, &Response::auth_failed(id, e.message())).await;
        }

        if state.requires_token() {
            info!("Client {} authenticated successfully", peer);
        }

        // A bare auth message is acknowledged and not executed.
        if request.token.is_some() && !request.has_directive() {
            return send_response(writer, &Response::auth_succeeded(id, HOST_VERSION)).await;
        }
    }

    let directive = match request.directive() {
        Ok(directive) => directive,
        Err(e) => {
            warn!("Dispatch error from {}: {}", peer, e);
            return send_response(writer, &Response::error(id, e.message())).await;
        }
    };

    match directive {
        Directive::Handler { name, params } => {
            let response = match services.handlers.invoke(&name, params, &services.queue).await {
                Ok(outcome) => Response::Handler {
                    id,
                    output: Some(outcome.output),
                    error: outcome.error,
                    result: outcome.result,
                },
                Err(e) => {
                    warn!("Handler '{}' from {} failed: {}", name, peer, e);
                    Response::Execution {
                        id,
                        output: None,
                        error: Some(handler_error_message(&name, &e)),
                    }
                }
            };
            send_response(writer, &response).await
        }
        Directive::Code {
            source,
            stream: false,
        } => {
            let outcome = services.engine.execute(source, &services.queue).await;
            let response = Response::Execution {
                id,
                output: outcome.output,
                error: outcome.error,
            };
            send_response(writer, &response).await
        }
        Directive::Code {
            source,
            stream: true,
        } => stream_execution(id, source, services, writer).await,
    }
}

fn handler_error_message(name: &str, error: &DispatchError) -> String {
    match error {
        DispatchError::HandlerFailed { message, .. } => message.clone(),
        other => format!("Handler '{name}' failed: {}", other.message()),
    }
}

/// Runs code in streaming mode: one chunk message per printed line while
/// the code runs, then exactly one terminal message.
async fn stream_execution<H, W>(
    id: Value,
    source: String,
    services: &BridgeServices<H>,
    writer: &mut W,
) -> Result<(), FramingError>
where
    H: 'static,
    W: AsyncWrite + Unpin,
{
    let (chunk_tx, mut chunk_rx) = mpsc::unbounded_channel();
    let execution = services
        .engine
        .execute_streaming(source, chunk_tx, &services.queue);
    tokio::pin!(execution);

    let outcome = loop {
        tokio::select! {
            biased;
            Some(chunk) = chunk_rx.recv() => {
                send_response(writer, &Response::chunk(id.clone(), chunk)).await?;
            }
            outcome = &mut execution => break outcome,
        }
    };

    // Lines written just before the task finished.
    while let Ok(chunk) = chunk_rx.try_recv() {
        send_response(writer, &Response::chunk(id.clone(), chunk)).await?;
    }

    let terminal = Response::Execution {
        id,
        output: outcome.output,
        error: outcome.error,
    };
    send_response(writer, &terminal).await
}

/// Serializes, frames and flushes one response.
///
/// A response that cannot be serialized is replaced by a minimal error
/// response for the same id; a frame is always written.
pub(crate) async fn send_response<W>(
    writer: &mut W,
    response: &Response,
) -> Result<(), FramingError>
where
    W: AsyncWrite + Unpin,
{
    let text = match response.to_wire() {
        Ok(text) => text,
        Err(e) => {
            error!(
                "JSON serialization error for response {}: {}",
                response.id(),
                e
            );
            let fallback = Response::serialization_fallback(response.id().clone(), &e);
            match fallback.to_wire() {
                Ok(text) => text,
                Err(e) => {
                    error!("Fallback response is not serializable either: {}", e);
                    String::from(
                        r#"{"id":null,"output":null,"error":"JSON serialization error","stream_end":true}"#,
                    )
                }
            }
        }
    };

    write_frame(writer, text.as_bytes()).await
}
