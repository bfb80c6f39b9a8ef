//! End-to-end tests against an in-process fake agent service.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use salesgpt_chat::{
    AgentClient, ChatReply, ChatTransport, DeploymentConfig, DispatchOutcome, DispatchRequest,
    NoopAnalytics, SessionController, SessionId,
};

/// How the fake service answers `/chat`.
#[derive(Clone, Copy)]
enum Behavior {
    Reply,
    ServerError,
    Unauthorized,
    Malformed,
}

#[derive(Default)]
struct Seen {
    chat_bodies: Vec<Value>,
    authorization: Vec<Option<String>>,
}

#[derive(Clone)]
struct Fake {
    behavior: Behavior,
    seen: Arc<Mutex<Seen>>,
}

async fn chat(
    State(fake): State<Fake>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    {
        let mut seen = fake.seen.lock().unwrap();
        seen.authorization.push(
            headers
                .get("authorization")
                .map(|v| v.to_str().unwrap().to_string()),
        );
        seen.chat_bodies.push(body.clone());
    }
    match fake.behavior {
        Behavior::Reply => (
            StatusCode::OK,
            json!({
                "bot_name": "Ted Lasso",
                "conversational_stage": "Introduction",
                "response": format!("You said: {}", body["human_say"].as_str().unwrap_or("")),
                "tool": "",
                "tool_input": "",
                "action_output": "",
                "action_input": "",
                "model_name": "gpt-4o-mini",
            })
            .to_string(),
        ),
        Behavior::ServerError => (StatusCode::INTERNAL_SERVER_ERROR, "agent crashed".to_string()),
        Behavior::Unauthorized => (StatusCode::UNAUTHORIZED, "bad token".to_string()),
        Behavior::Malformed => (StatusCode::OK, "{\"bot_name\": ".to_string()),
    }
}

async fn botname(State(fake): State<Fake>, headers: HeaderMap) -> impl IntoResponse {
    fake.seen.lock().unwrap().authorization.push(
        headers
            .get("authorization")
            .map(|v| v.to_str().unwrap().to_string()),
    );
    Json(json!({"name": "Ted Lasso", "model": "gpt-4o-mini"}))
}

async fn serve(behavior: Behavior) -> (SocketAddr, Arc<Mutex<Seen>>) {
    let seen = Arc::new(Mutex::new(Seen::default()));
    let app = Router::new()
        .route("/chat", post(chat))
        .route("/botname", get(botname))
        .with_state(Fake {
            behavior,
            seen: Arc::clone(&seen),
        });
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, seen)
}

fn development(addr: SocketAddr) -> DeploymentConfig {
    DeploymentConfig::development(&format!("http://{addr}")).unwrap()
}

#[tokio::test]
async fn chat_round_trip_in_development() {
    let (addr, seen) = serve(Behavior::Reply).await;
    let client = AgentClient::new(development(addr)).unwrap();
    let session_id = SessionId::create();

    let reply = client
        .chat(&DispatchRequest::new(session_id, "hi there", false))
        .await
        .unwrap();
    let ChatReply::Complete(response) = reply else {
        panic!("expected a complete reply");
    };
    assert_eq!(response.bot_name, "Ted Lasso");
    assert_eq!(response.response, "You said: hi there");
    assert_eq!(response.model_name.as_deref(), Some("gpt-4o-mini"));

    let seen = seen.lock().unwrap();
    assert_eq!(
        seen.chat_bodies[0],
        json!({
            "session_id": session_id.to_string(),
            "human_say": "hi there",
            "stream": false,
        })
    );
    assert_eq!(seen.authorization, vec![None]);
}

#[tokio::test]
async fn production_sends_bearer_token() {
    let (addr, seen) = serve(Behavior::Reply).await;
    let config = DeploymentConfig::production(&format!("http://{addr}"), "secret-token").unwrap();
    let client = AgentClient::new(config).unwrap();

    client.bot_name().await.unwrap();
    client
        .chat(&DispatchRequest::new(SessionId::create(), "hello", false))
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(
        seen.authorization,
        vec![
            Some("Bearer secret-token".to_string()),
            Some("Bearer secret-token".to_string()),
        ]
    );
}

#[tokio::test]
async fn streaming_request_is_never_sent() {
    let (addr, seen) = serve(Behavior::Reply).await;
    let client = AgentClient::new(development(addr)).unwrap();
    let reply = client
        .chat(&DispatchRequest::new(SessionId::create(), "hi", true))
        .await
        .unwrap();
    assert!(matches!(reply, ChatReply::Streaming));
    assert!(seen.lock().unwrap().chat_bodies.is_empty());
}

#[tokio::test]
async fn bot_name_endpoint() {
    let (addr, _) = serve(Behavior::Reply).await;
    let client = AgentClient::new(development(addr)).unwrap();
    let name = client.bot_name().await.unwrap();
    assert_eq!(name.name, "Ted Lasso");
    assert_eq!(name.model.as_deref(), Some("gpt-4o-mini"));
}

#[tokio::test]
async fn server_error_is_service_unavailable() {
    let (addr, _) = serve(Behavior::ServerError).await;
    let client = AgentClient::new(development(addr)).unwrap();
    let err = client
        .chat(&DispatchRequest::new(SessionId::create(), "hi", false))
        .await
        .unwrap_err();
    assert!(err.is_server_error());
    assert_eq!(err.status_code(), Some(500));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn unauthorized_is_authentication_error() {
    let (addr, _) = serve(Behavior::Unauthorized).await;
    let client = AgentClient::new(development(addr)).unwrap();
    let err = client
        .chat(&DispatchRequest::new(SessionId::create(), "hi", false))
        .await
        .unwrap_err();
    assert!(err.is_authentication());
}

#[tokio::test]
async fn malformed_body_is_serialization_error() {
    let (addr, _) = serve(Behavior::Malformed).await;
    let client = AgentClient::new(development(addr)).unwrap();
    let err = client
        .chat(&DispatchRequest::new(SessionId::create(), "hi", false))
        .await
        .unwrap_err();
    assert!(err.is_serialization());
}

#[tokio::test]
async fn unreachable_service_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = AgentClient::new(development(addr)).unwrap();
    let err = client.bot_name().await.unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn controller_end_to_end() {
    let (addr, seen) = serve(Behavior::Reply).await;
    let config = development(addr);
    let client = AgentClient::new(config.clone()).unwrap();
    let controller = SessionController::new(client, NoopAnalytics, &config);

    assert_eq!(controller.mount().await.as_deref(), Some("Ted Lasso"));

    let outcome = controller.submit("  hi there  ").await.unwrap();
    let DispatchOutcome::Replied(reply) = outcome else {
        panic!("expected a reply");
    };
    assert_eq!(reply.index, 1);
    assert_eq!(reply.turn.text, "You said: hi there");
    assert_eq!(reply.trace.conversational_stage, "Introduction");
    assert_eq!(reply.trace.tool, None);
    assert!(!controller.is_typing());

    let turns = controller.conversation().all();
    assert_eq!(turns.len(), 2);
    assert!(turns[0].is_user());
    assert_eq!(turns[0].text, "hi there");
    assert!(turns[1].is_agent());
    assert_eq!(controller.trace().len(), 1);

    let seen = seen.lock().unwrap();
    assert_eq!(
        seen.chat_bodies[0]["session_id"],
        json!(controller.session_id().to_string())
    );
}

#[tokio::test]
async fn controller_failure_leaves_only_user_turn() {
    let (addr, _) = serve(Behavior::ServerError).await;
    let config = development(addr);
    let client = AgentClient::new(config.clone()).unwrap();
    let controller = SessionController::new(client, NoopAnalytics, &config);

    let err = controller.submit("hello").await.unwrap_err();
    assert!(err.is_server_error());
    assert_eq!(controller.conversation().len(), 1);
    assert!(controller.trace().is_empty());
    assert!(!controller.is_typing());
}

#[tokio::test]
async fn concurrent_submissions_pair_up() {
    let (addr, _) = serve(Behavior::Reply).await;
    let config = development(addr);
    let client = AgentClient::new(config.clone()).unwrap();
    let controller = SessionController::new(client, NoopAnalytics, &config);

    let first = controller.submit("one");
    let second = controller.submit("two");
    assert_eq!(controller.typing().in_flight(), 2);
    let (first, second) = futures::future::join(first, second).await;
    first.unwrap();
    second.unwrap();

    assert!(!controller.is_typing());
    let turns = controller.conversation().all();
    assert_eq!(turns.len(), 4);
    assert_eq!(turns[0].text, "one");
    assert_eq!(turns[1].text, "two");
    let mut replies: Vec<_> = turns[2..].iter().map(|t| t.text.clone()).collect();
    replies.sort();
    assert_eq!(replies, vec!["You said: one", "You said: two"]);
    assert_eq!(controller.trace().len(), 2);
}
