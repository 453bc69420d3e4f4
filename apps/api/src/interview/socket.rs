//! WebSocket transport for live interviews.
//!
//! One task per connection. Frames are handled strictly in arrival order; while a
//! follow-up question is being generated, further frames are queued and a close
//! cancels the generation.

use std::collections::VecDeque;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::interview::machine::{Effect, FollowUpRequest, InterviewEngine, InterviewEvent};
use crate::interview::session::SessionKey;
use crate::state::AppState;

pub const WELCOME_MESSAGE: &str =
    "Welcome! Please select your role and start the live AI interview.";
pub const INVALID_MESSAGE: &str = "Error processing your response. Please try again.";

type WsSender = SplitSink<WebSocket, Message>;
type WsReceiver = SplitStream<WebSocket>;

/// Client-to-server messages
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Begin an interview for a role
    #[serde(alias = "start")]
    StartInterview {
        #[serde(default)]
        role: Option<String>,
    },
    /// Recognized speech (or typed text) answering the current question
    #[serde(alias = "answer")]
    SpeechText {
        #[serde(default)]
        text: Option<String>,
    },
}

impl From<ClientMessage> for InterviewEvent {
    fn from(msg: ClientMessage) -> Self {
        match msg {
            ClientMessage::StartInterview { role } => InterviewEvent::Start {
                role: role.unwrap_or_default(),
            },
            ClientMessage::SpeechText { text } => InterviewEvent::Answer {
                text: text.unwrap_or_default(),
            },
        }
    }
}

/// Server-to-client messages
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    AiResponse { message: String },
}

enum Inbound {
    Text(String),
    Closed,
}

/// GET /ws/interview
pub async fn interview_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_interview(socket, state.interviews))
}

async fn handle_interview(socket: WebSocket, engine: InterviewEngine) {
    let connection_id: SessionKey = Uuid::new_v4();
    let (mut sender, mut receiver) = socket.split();

    info!(%connection_id, "Interview client connected");

    if let Err(e) = send_message(&mut sender, WELCOME_MESSAGE).await {
        warn!(%connection_id, "Failed to greet interview client: {}", e);
    } else {
        run_connection(connection_id, &engine, &mut sender, &mut receiver).await;
    }

    engine.apply(connection_id, InterviewEvent::Disconnect);
    info!(%connection_id, "Interview client disconnected");
}

async fn run_connection(
    connection_id: SessionKey,
    engine: &InterviewEngine,
    sender: &mut WsSender,
    receiver: &mut WsReceiver,
) {
    let mut queued: VecDeque<String> = VecDeque::new();

    loop {
        let text = match queued.pop_front() {
            Some(text) => text,
            None => match next_inbound(receiver, sender).await {
                Inbound::Text(text) => text,
                Inbound::Closed => return,
            },
        };

        let event: InterviewEvent = match serde_json::from_str::<ClientMessage>(&text) {
            Ok(msg) => msg.into(),
            Err(e) => {
                warn!(%connection_id, "Invalid interview message: {}", e);
                if send_message(sender, INVALID_MESSAGE).await.is_err() {
                    return;
                }
                continue;
            }
        };

        let mut effects: VecDeque<Effect> = engine.apply(connection_id, event).into();

        while let Some(effect) = effects.pop_front() {
            let delivered = match effect {
                Effect::Say(message) => send_message(sender, &message).await,
                Effect::Conclude(result) => {
                    info!(
                        %connection_id,
                        score = result.score,
                        tier = result.tier.label(),
                        "Interview completed"
                    );
                    send_message(sender, &result.message).await
                }
                Effect::RequestFollowUp(request) => {
                    match await_follow_up(connection_id, engine, request, sender, receiver, &mut queued)
                        .await
                    {
                        Some(more) => {
                            effects.extend(more);
                            Ok(())
                        }
                        None => return,
                    }
                }
            };

            if let Err(e) = delivered {
                warn!(%connection_id, "Interview send failed: {}", e);
                return;
            }
        }
    }
}

/// Waits for the follow-up while still draining the socket. Returns `None` if the
/// client went away, in which case the generation future is dropped.
async fn await_follow_up(
    connection_id: SessionKey,
    engine: &InterviewEngine,
    request: FollowUpRequest,
    sender: &mut WsSender,
    receiver: &mut WsReceiver,
    queued: &mut VecDeque<String>,
) -> Option<Vec<Effect>> {
    let resolution = engine.resolve_follow_up(connection_id, request);
    tokio::pin!(resolution);

    loop {
        tokio::select! {
            effects = &mut resolution => return Some(effects),
            inbound = next_inbound(receiver, sender) => match inbound {
                Inbound::Text(text) => queued.push_back(text),
                Inbound::Closed => {
                    debug!(%connection_id, "Client left during follow-up generation, cancelling");
                    return None;
                }
            },
        }
    }
}

async fn next_inbound(receiver: &mut WsReceiver, sender: &mut WsSender) -> Inbound {
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => return Inbound::Text(text),
            Ok(Message::Close(_)) => {
                debug!("Interview client sent close frame");
                return Inbound::Closed;
            }
            Ok(Message::Ping(data)) => {
                if sender.send(Message::Pong(data)).await.is_err() {
                    return Inbound::Closed;
                }
            }
            Ok(_) => {} // Ignore binary and pong messages
            Err(e) => {
                debug!("Interview WebSocket error: {}", e);
                return Inbound::Closed;
            }
        }
    }
    Inbound::Closed
}

/// Helper to serialize and send an `ai_response` message
async fn send_message(sender: &mut WsSender, message: &str) -> Result<(), String> {
    let msg = ServerMessage::AiResponse {
        message: message.to_string(),
    };
    let json = serde_json::to_string(&msg).map_err(|e| format!("Serialize error: {}", e))?;
    sender
        .send(Message::Text(json))
        .await
        .map_err(|e| format!("Send error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::net::{TcpListener, TcpStream};
    use tokio_tungstenite::tungstenite::Message as WsMessage;
    use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

    use crate::interview::follow_up::tests::HangingGenerator;
    use crate::interview::follow_up::{GenerationError, QuestionGenerator};
    use crate::interview::machine::UNKNOWN_ROLE_MESSAGE;
    use crate::interview::question_bank::Role;
    use crate::interview::scorer::FeedbackTier;
    use crate::routes::build_router;

    type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

    /// Answers after a short delay, long enough for a second frame to arrive meanwhile.
    struct SlowGenerator;

    #[async_trait]
    impl QuestionGenerator for SlowGenerator {
        async fn generate(&self, _role: Role, _prior: &str) -> Result<String, GenerationError> {
            tokio::time::sleep(Duration::from_millis(150)).await;
            Ok("Slow follow-up?".to_string())
        }
    }

    async fn spawn_server(state: AppState) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = build_router(state);
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        addr
    }

    async fn connect(addr: SocketAddr) -> WsStream {
        let url = format!("ws://{}/ws/interview", addr);
        let (ws, _) = tokio_tungstenite::connect_async(&url)
            .await
            .expect("Failed to connect to interview WebSocket");
        ws
    }

    async fn send_json(ws: &mut WsStream, msg: serde_json::Value) {
        let json = serde_json::to_string(&msg).unwrap();
        ws.send(WsMessage::Text(json)).await.unwrap();
    }

    async fn recv_message_timeout(ws: &mut WsStream, timeout: Duration) -> Option<String> {
        let result = tokio::time::timeout(timeout, async {
            loop {
                match ws.next().await {
                    Some(Ok(WsMessage::Text(text))) => {
                        let value: serde_json::Value = serde_json::from_str(&text).ok()?;
                        assert_eq!(value["type"], "ai_response");
                        return value["message"].as_str().map(str::to_string);
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(_)) | None => return None,
                }
            }
        })
        .await;
        result.ok().flatten()
    }

    async fn recv_message(ws: &mut WsStream) -> String {
        recv_message_timeout(ws, Duration::from_secs(2))
            .await
            .expect("expected an ai_response message")
    }

    /// Connects and consumes the welcome message.
    async fn connect_ready(addr: SocketAddr) -> WsStream {
        let mut ws = connect(addr).await;
        assert_eq!(recv_message(&mut ws).await, WELCOME_MESSAGE);
        ws
    }

    async fn wait_for_empty_store(state: &AppState) -> bool {
        for _ in 0..50 {
            if state.interviews.store().len() == 0 {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }

    #[test]
    fn test_client_message_accepts_both_event_names() {
        let a: ClientMessage =
            serde_json::from_str(r#"{"type":"start_interview","role":"Data Analyst"}"#).unwrap();
        let b: ClientMessage =
            serde_json::from_str(r#"{"type":"start","role":"Data Analyst"}"#).unwrap();
        assert_eq!(a, b);

        let c: ClientMessage = serde_json::from_str(r#"{"type":"speech_text","text":"hi"}"#).unwrap();
        let d: ClientMessage = serde_json::from_str(r#"{"type":"answer","text":"hi"}"#).unwrap();
        assert_eq!(c, d);
    }

    #[test]
    fn test_client_message_missing_fields_default_to_empty() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"start_interview"}"#).unwrap();
        assert_eq!(InterviewEvent::from(msg), InterviewEvent::Start { role: String::new() });
    }

    #[test]
    fn test_client_message_null_fields_default_to_empty() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"start_interview","role":null}"#).unwrap();
        assert_eq!(InterviewEvent::from(msg), InterviewEvent::Start { role: String::new() });

        let msg: ClientMessage = serde_json::from_str(r#"{"type":"speech_text","text":null}"#).unwrap();
        assert_eq!(InterviewEvent::from(msg), InterviewEvent::Answer { text: String::new() });
    }

    #[tokio::test]
    async fn test_null_role_gets_clarification() {
        let state = AppState::for_testing(None);
        let addr = spawn_server(state.clone()).await;
        let mut ws = connect_ready(addr).await;

        send_json(&mut ws, serde_json::json!({"type": "start_interview", "role": null})).await;
        assert_eq!(recv_message(&mut ws).await, UNKNOWN_ROLE_MESSAGE);
        assert_eq!(state.interviews.store().len(), 0);
    }

    #[test]
    fn test_server_message_wire_format() {
        let json = serde_json::to_value(ServerMessage::AiResponse {
            message: "Hello".to_string(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"type": "ai_response", "message": "Hello"}));
    }

    #[tokio::test]
    async fn test_perfect_interview_over_websocket() {
        let state = AppState::for_testing(None);
        let addr = spawn_server(state.clone()).await;
        let mut ws = connect_ready(addr).await;
        let questions = Role::SoftwareEngineer.questions();

        send_json(&mut ws, serde_json::json!({"type": "start_interview", "role": "Software Engineer"})).await;
        assert_eq!(recv_message(&mut ws).await, questions[0]);

        for (i, question) in questions.iter().enumerate() {
            send_json(&mut ws, serde_json::json!({"type": "speech_text", "text": question})).await;
            let reply = recv_message(&mut ws).await;
            if i + 1 < questions.len() {
                assert_eq!(reply, questions[i + 1]);
            } else {
                assert!(reply.contains("Score: 100/100"), "unexpected result: {reply}");
                assert!(reply.contains(FeedbackTier::Excellent.message()));
            }
        }

        assert_eq!(state.interviews.store().len(), 0);

        // Session is gone; further answers are ignored.
        send_json(&mut ws, serde_json::json!({"type": "speech_text", "text": "hello?"})).await;
        assert!(recv_message_timeout(&mut ws, Duration::from_millis(200)).await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_role_gets_clarification() {
        let state = AppState::for_testing(None);
        let addr = spawn_server(state.clone()).await;
        let mut ws = connect_ready(addr).await;

        send_json(&mut ws, serde_json::json!({"type": "start_interview", "role": "astronaut"})).await;
        assert_eq!(recv_message(&mut ws).await, UNKNOWN_ROLE_MESSAGE);
        assert_eq!(state.interviews.store().len(), 0);
    }

    #[tokio::test]
    async fn test_answer_before_start_is_ignored() {
        let state = AppState::for_testing(None);
        let addr = spawn_server(state.clone()).await;
        let mut ws = connect_ready(addr).await;

        send_json(&mut ws, serde_json::json!({"type": "speech_text", "text": "too early"})).await;
        assert!(recv_message_timeout(&mut ws, Duration::from_millis(200)).await.is_none());

        send_json(&mut ws, serde_json::json!({"type": "start_interview", "role": "hr recruiter"})).await;
        assert_eq!(recv_message(&mut ws).await, Role::HrRecruiter.questions()[0]);
    }

    #[tokio::test]
    async fn test_malformed_frame_gets_error_message() {
        let state = AppState::for_testing(None);
        let addr = spawn_server(state).await;
        let mut ws = connect_ready(addr).await;

        ws.send(WsMessage::Text("not json".to_string())).await.unwrap();
        assert_eq!(recv_message(&mut ws).await, INVALID_MESSAGE);
    }

    #[tokio::test]
    async fn test_disconnect_removes_session() {
        let state = AppState::for_testing(None);
        let addr = spawn_server(state.clone()).await;
        let mut ws = connect_ready(addr).await;

        send_json(&mut ws, serde_json::json!({"type": "start_interview", "role": "data analyst"})).await;
        recv_message(&mut ws).await;
        assert_eq!(state.interviews.store().len(), 1);

        ws.close(None).await.unwrap();
        assert!(wait_for_empty_store(&state).await);
    }

    #[tokio::test]
    async fn test_disconnect_during_follow_up_cancels_it() {
        let state = AppState::for_testing(Some(Arc::new(HangingGenerator)));
        let addr = spawn_server(state.clone()).await;
        let mut ws = connect_ready(addr).await;

        send_json(&mut ws, serde_json::json!({"type": "start_interview", "role": "data analyst"})).await;
        recv_message(&mut ws).await;
        send_json(&mut ws, serde_json::json!({"type": "speech_text", "text": "I use Tableau"})).await;

        // Follow-up never arrives; the client gives up.
        assert!(recv_message_timeout(&mut ws, Duration::from_millis(100)).await.is_none());
        ws.close(None).await.unwrap();

        assert!(wait_for_empty_store(&state).await);
    }

    #[tokio::test]
    async fn test_frames_during_follow_up_are_processed_in_order() {
        let state = AppState::for_testing(Some(Arc::new(SlowGenerator)));
        let addr = spawn_server(state.clone()).await;
        let mut ws = connect_ready(addr).await;

        send_json(&mut ws, serde_json::json!({"type": "start_interview", "role": "hr recruiter"})).await;
        recv_message(&mut ws).await;

        send_json(&mut ws, serde_json::json!({"type": "speech_text", "text": "first answer"})).await;
        send_json(&mut ws, serde_json::json!({"type": "speech_text", "text": "second answer"})).await;

        assert_eq!(recv_message(&mut ws).await, "Slow follow-up?");
        assert_eq!(recv_message(&mut ws).await, "Slow follow-up?");

        let session = state
            .interviews
            .store()
            .snapshot()
            .pop()
            .expect("session should be active");
        assert_eq!(session.current_index, 2);
        assert_eq!(
            session.answer_history,
            vec!["first answer".to_string(), "second answer".to_string()]
        );
    }
}
