//! Transport behaviour: redirects, cancellation and timeouts.

mod common;

use std::time::{Duration, Instant};

use axum::http::Method;
use common::{MockTelegram, Reply, PHONE};
use telegram_auth::{AuthError, SessionStore, TelegramAuth, Transport, WorkflowStatus};
use tokio_util::sync::CancellationToken;

fn transport(mock: &MockTelegram) -> Transport {
    let config = mock.config();
    Transport::new(&config, SessionStore::new(config.session_ttl)).unwrap()
}

#[tokio::test]
async fn test_redirect_reissues_same_method_and_body() {
    let mock = MockTelegram::start().await;
    mock.reply(
        "/auth/request",
        Reply::redirect("/auth/request/retry").with_cookie("hop=1"),
    )
    .reply("/auth/request/retry", Reply::ok("true"));
    let auth = TelegramAuth::new(mock.config()).unwrap();

    let result = auth.send_push(PHONE).await;

    assert_eq!(result.status, WorkflowStatus::Success);
    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].path, "/auth/request/retry");
    assert_eq!(requests[1].method, Method::POST);
    assert_eq!(requests[1].body, requests[0].body);

    // cookies on the redirect hop itself are not kept
    let cookies = auth.sessions().get(PHONE).unwrap_or_default();
    assert!(!cookies.contains_key("hop"));
}

#[tokio::test]
async fn test_redirect_body_comes_from_final_response() {
    let mock = MockTelegram::start().await;
    mock.reply("/start", Reply::redirect("/middle"))
        .reply("/middle", Reply::redirect("/end"))
        .reply("/end", Reply::ok("final body"));
    let transport = transport(&mock);

    let body = transport
        .send(
            &format!("{}start", mock.base_url),
            Method::GET,
            None,
            PHONE,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(&body[..], b"final body");
    assert_eq!(mock.paths(), vec!["/start", "/middle", "/end"]);
}

#[tokio::test]
async fn test_redirect_loop_is_bounded() {
    let mock = MockTelegram::start().await;
    mock.reply("/auth/request", Reply::redirect("/auth/request"));
    let auth = TelegramAuth::new(mock.config().with_max_redirects(3)).unwrap();

    let result = auth.send_push(PHONE).await;

    assert_eq!(result.status, WorkflowStatus::Cancelled);
    assert!(result.error.unwrap().starts_with("Network error"));
    assert_eq!(mock.requests().len(), 4);
}

#[tokio::test]
async fn test_redirect_loop_error_variant() {
    let mock = MockTelegram::start().await;
    mock.reply("/loop", Reply::redirect("/loop"));
    let config = mock.config().with_max_redirects(1);
    let transport = Transport::new(&config, SessionStore::new(config.session_ttl)).unwrap();

    let err = transport
        .send(
            &format!("{}loop", mock.base_url),
            Method::GET,
            None,
            PHONE,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::TooManyRedirects { limit: 1, .. }));
}

#[tokio::test]
async fn test_cancel_stops_in_flight_request() {
    let mock = MockTelegram::start().await;
    mock.reply(
        "/auth/request",
        Reply::ok("true").with_delay(Duration::from_secs(10)),
    );
    let auth = TelegramAuth::new(mock.config()).unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let result = auth.send_push_with_cancel(PHONE, &cancel).await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(result.status, WorkflowStatus::Cancelled);
    assert_eq!(result.error.as_deref(), Some("request cancelled"));
}

#[tokio::test]
async fn test_cancelled_token_sends_nothing() {
    let mock = MockTelegram::start().await;
    mock.reply("/auth/login", Reply::ok("true"));
    let auth = TelegramAuth::new(mock.config()).unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = auth.check_acceptance_with_cancel(PHONE, &cancel).await;

    assert_eq!(result.status, WorkflowStatus::Cancelled);
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_request_timeout_is_transport_error() {
    let mock = MockTelegram::start().await;
    mock.reply(
        "/slow",
        Reply::ok("late").with_delay(Duration::from_secs(5)),
    );
    let config = mock
        .config()
        .with_request_timeout(Duration::from_millis(200));
    let transport = Transport::new(&config, SessionStore::new(config.session_ttl)).unwrap();

    let err = transport
        .send(
            &format!("{}slow", mock.base_url),
            Method::GET,
            None,
            PHONE,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Transport(_)));
    assert!(err.to_string().contains("timed out"));
}
