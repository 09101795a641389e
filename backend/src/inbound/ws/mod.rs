//! WebSocket inbound adapter.
//!
//! Responsibilities:
//! - validate upgrade requests (origin allow-list)
//! - run the per-connection session loop, re-sending the user list on a
//!   fixed interval and answering pings
//! - keep WebSocket-specific concerns at the edge of the system

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::header::{HeaderValue, ORIGIN};
use actix_web::web::{self, Payload};
use actix_web::{get, HttpRequest, HttpResponse};
use actix_ws::{Message, MessageStream, Session};
use tracing::{debug, error, warn};
use url::Url;

pub mod messages;
pub mod state;

use messages::UserListMessage;
use state::WsState;

/// Interval between user-list broadcasts.
const USER_LIST_INTERVAL: Duration = Duration::from_secs(5);

const PRIMARY_HOST: &str = "levelup.example";
const ALLOWED_SUBDOMAIN_SUFFIX: &str = ".levelup.example";
const LOCALHOST: &str = "localhost";

/// Handle WebSocket upgrade for the `/ws` endpoint.
#[get("/ws")]
pub async fn ws_entry(
    state: web::Data<WsState>,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    let mut origin_iter = req.headers().get_all(ORIGIN);
    let origin_header = origin_iter.next().ok_or_else(|| {
        error!("missing Origin header on WebSocket upgrade");
        actix_web::error::ErrorForbidden("Origin not allowed")
    })?;
    if origin_iter.next().is_some() {
        error!("multiple Origin headers on WebSocket upgrade");
        return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
    }

    validate_origin(origin_header)?;

    let (response, session, msg_stream) = actix_ws::handle(&req, stream)?;
    actix_web::rt::spawn(run_session(state.into_inner(), session, msg_stream));
    Ok(response)
}

/// Per-connection loop: broadcast the user list every interval, answer
/// pings, and stop on close or protocol errors.
async fn run_session(state: Arc<WsState>, mut session: Session, mut stream: MessageStream) {
    let mut interval = actix_web::rt::time::interval(USER_LIST_INTERVAL);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match user_list_payload(state.as_ref()).await {
                    Ok(payload) => {
                        if session.text(payload).await.is_err() {
                            break;
                        }
                    }
                    Err(error) => warn!(%error, "user list broadcast skipped"),
                }
            }
            message = stream.recv() => {
                match message {
                    Some(Ok(Message::Ping(bytes))) => {
                        if session.pong(&bytes).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(reason))) => {
                        debug!(?reason, "WebSocket closed by client");
                        let _ = session.close(reason).await;
                        return;
                    }
                    // Client text/binary frames are ignored by design.
                    Some(Ok(_)) => {}
                    Some(Err(error)) => {
                        warn!(%error, "WebSocket protocol error");
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    let _ = session.close(None).await;
}

async fn user_list_payload(state: &WsState) -> Result<String, crate::domain::Error> {
    let users = state.users.list().await?;
    serde_json::to_string(&UserListMessage::new(&users))
        .map_err(|err| crate::domain::Error::internal(format!("user list serialisation: {err}")))
}

fn validate_origin(origin_header: &HeaderValue) -> actix_web::Result<()> {
    let origin_value = match origin_header.to_str() {
        Ok(value) => value,
        Err(error) => {
            error!(%error, "failed to parse Origin header as string");
            return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
        }
    };

    let origin = Url::parse(origin_value).map_err(|error| {
        error!(%error, "failed to parse Origin header as URL");
        actix_web::error::ErrorBadRequest("Invalid Origin header")
    })?;

    if is_allowed_origin(&origin) {
        Ok(())
    } else {
        warn!(origin = origin_value, "rejected WS upgrade due to disallowed Origin");
        Err(actix_web::error::ErrorForbidden("Origin not allowed"))
    }
}

/// Returns true when a parsed Origin belongs to the static allow-list:
/// HTTPS from the production domain and its subdomains, HTTP from localhost
/// with an explicit non-zero port.
fn is_allowed_origin(origin: &Url) -> bool {
    let host = match origin.host_str() {
        Some(value) => value,
        None => return false,
    };

    match origin.scheme() {
        "http" if host == LOCALHOST => matches!(origin.port(), Some(port) if port != 0),
        "https" if host == PRIMARY_HOST => true,
        "https" if host.strip_suffix(ALLOWED_SUBDOMAIN_SUFFIX).is_some() => true,
        _ => false,
    }
}
