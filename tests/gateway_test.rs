use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::Value;

use pushkit::push::envelope::DispatchOptions;
use pushkit::push::gateway::GatewayClient;
use pushkit::push::message::Message;

/// 把路由挂到随机端口上，返回通知接口的完整地址
async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/notify", addr)
}

#[derive(Clone, Default)]
struct Captured {
    requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

async fn capture_ok(
    State(captured): State<Captured>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    let auth = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(String::from);
    captured.requests.lock().push((auth, body));
    StatusCode::OK
}

#[tokio::test]
async fn dispatch_posts_wire_envelope_and_succeeds_on_200() {
    let captured = Captured::default();
    let app = Router::new()
        .route("/notify", post(capture_ok))
        .with_state(captured.clone());
    let url = serve(app).await;

    let client = GatewayClient::new(
        url,
        "app.example_app".to_string(),
        Some("secret-auth".to_string()),
    );
    let message = Message::compose_text("Alice", "Hey there", 123456, 1).unwrap();
    let options = DispatchOptions {
        clear_pending: true,
        replace_tag: Some("msg_123456".to_string()),
    };

    let result = client.dispatch("DEVICE-TOKEN", &message, &options).await;

    assert!(result.succeeded);
    assert!(result.diagnostic.is_none());

    let requests = captured.requests.lock();
    assert_eq!(requests.len(), 1);

    let (auth, body) = &requests[0];
    assert_eq!(auth.as_deref(), Some("Bearer secret-auth"));
    assert_eq!(body["appid"], "app.example_app");
    assert_eq!(body["token"], "DEVICE-TOKEN");
    assert_eq!(body["clear_pending"], true);
    assert_eq!(body["replace_tag"], "msg_123456");
    assert_eq!(body["data"]["message"]["loc_key"], "MESSAGE_TEXT");
    assert_eq!(body["data"]["message"]["loc_args"][0], "Alice");
    assert_eq!(body["data"]["message"]["loc_args"][1], "Hey there");
    assert_eq!(body["data"]["message"]["badge"], 1);
    assert_eq!(body["data"]["message"]["custom"]["from_id"], "123456");
    chrono::DateTime::parse_from_rfc3339(body["expire_on"].as_str().unwrap()).unwrap();
}

#[tokio::test]
async fn dispatch_reports_failure_with_status_on_500() {
    let app = Router::new().route(
        "/notify",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "internal gateway error") }),
    );
    let url = serve(app).await;

    let client = GatewayClient::new(url, "app".to_string(), None);
    let message = Message::compose_photo("Bob", 789012, 2).unwrap();

    let result = client
        .dispatch("DEVICE-TOKEN", &message, &DispatchOptions::default())
        .await;

    // 非 200 折叠为失败结果而不是异常
    assert!(!result.succeeded);
    let diagnostic = result.diagnostic.unwrap();
    assert!(diagnostic.contains("500"), "diagnostic: {}", diagnostic);
    assert!(
        diagnostic.contains("internal gateway error"),
        "diagnostic: {}",
        diagnostic
    );
}

#[tokio::test]
async fn dispatch_reports_failure_when_gateway_unreachable() {
    // 绑定后立刻释放端口，拿一个没有服务在听的地址
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = GatewayClient::new(
        format!("http://{}/notify", addr),
        "app".to_string(),
        None,
    );
    let message = Message::compose_photo("Bob", 1, 1).unwrap();

    let result = client
        .dispatch("DEVICE-TOKEN", &message, &DispatchOptions::default())
        .await;

    assert!(!result.succeeded);
    assert!(result.diagnostic.is_some());
}

#[tokio::test]
async fn sequence_attempts_every_message_in_order() {
    // 第二个请求返回 500，其余 200
    let counter = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/notify",
            post(|State(counter): State<Arc<AtomicUsize>>| async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 1 {
                    StatusCode::INTERNAL_SERVER_ERROR
                } else {
                    StatusCode::OK
                }
            }),
        )
        .with_state(counter.clone());
    let url = serve(app).await;

    let client =
        GatewayClient::new(url, "app".to_string(), None).with_pacing(Duration::ZERO);

    let messages = vec![
        Message::compose_text("Alice", "one", 1, 1).unwrap(),
        Message::compose_text("Alice", "two", 2, 1).unwrap(),
        Message::compose_text("Alice", "three", 3, 1).unwrap(),
    ];

    let results = client
        .dispatch_sequence("DEVICE-TOKEN", &messages, &DispatchOptions::default())
        .await;

    // 每条消息恰好尝试一次，结果保持输入顺序，失败不短路
    assert_eq!(results.len(), 3);
    assert!(results[0].succeeded);
    assert!(!results[1].succeeded);
    assert!(results[2].succeeded);
    assert_eq!(counter.load(Ordering::SeqCst), 3);
}
