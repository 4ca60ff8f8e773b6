/// WebSocket session actor. One per connected client; forwards events from
/// the connection registry to the socket and keeps the connection alive with
/// ping/pong heartbeats.
use actix::{Actor, ActorContext, AsyncContext, StreamHandler};
use actix_web::{web, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;

use crate::middleware::auth::UserId;
use crate::realtime::ConnectionRegistry;
use crate::AppState;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct WsSession {
    user_id: Uuid,
    registry: ConnectionRegistry,
    /// Sender side of this session's channel, kept to deregister precisely.
    sender: Option<UnboundedSender<String>>,
    last_heartbeat: Instant,
}

impl WsSession {
    pub fn new(user_id: Uuid, registry: ConnectionRegistry) -> Self {
        WsSession {
            user_id,
            registry,
            sender: None,
            last_heartbeat: Instant::now(),
        }
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.last_heartbeat) > CLIENT_TIMEOUT {
                tracing::debug!(user_id = %act.user_id, "websocket heartbeat timed out");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.start_heartbeat(ctx);

        let (tx, rx) = self.registry.register(self.user_id);
        self.sender = Some(tx);
        ctx.add_stream(UnboundedReceiverStream::new(rx));
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let Some(sender) = &self.sender {
            self.registry.deregister(self.user_id, sender);
        }
    }
}

/// Events pushed through the registry, forwarded to the client verbatim.
impl StreamHandler<String> for WsSession {
    fn handle(&mut self, payload: String, ctx: &mut Self::Context) {
        ctx.text(payload);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(bytes)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&bytes);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(_)) | Ok(ws::Message::Binary(_)) => {
                // Clients send over REST; the socket is push-only.
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(user_id = %self.user_id, error = %e, "websocket protocol error");
                ctx.stop();
            }
        }
    }
}

/// GET /ws — upgrade an authenticated connection and register it.
pub async fn ws_connect(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
    user: UserId,
) -> Result<HttpResponse, actix_web::Error> {
    ws::start(
        WsSession::new(user.0, state.registry.clone()),
        &req,
        stream,
    )
}
