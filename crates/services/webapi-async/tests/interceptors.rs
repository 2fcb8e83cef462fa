use std::sync::Arc;
use std::time::Duration;

use webapi_async::test_support::StaticTokenProvider;
use webapi_async::{Client, ErrorData, ResponseError, WebApiConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer, tokens: &Arc<StaticTokenProvider>) -> Client<WebApiConfig> {
    let config = WebApiConfig::default().with_api_base(server.uri());
    Client::with_config(
        config,
        Arc::clone(tokens) as Arc<dyn webapi_async::TokenProvider>,
        vec!["email".into()],
    )
    .unwrap()
    .with_backoff(
        backon::ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(10))
            .with_max_delay(Duration::from_millis(50))
            .with_max_times(2),
    )
}

#[tokio::test]
async fn unauthorized_primes_token_once_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": "invalid_token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = Arc::new(StaticTokenProvider::new("expired"));
    let client = test_client(&server, &tokens);
    let err = client
        .get::<serde_json::Value>("users/me", &[], Some("Session expired"))
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "Session expired");
    // One token for the request, one to prime the cache.
    assert_eq!(tokens.calls(), 2);
    assert_eq!(
        err.data().and_then(ErrorData::as_json),
        Some(&serde_json::json!({"error": "invalid_token"}))
    );
}

#[tokio::test]
async fn binary_json_error_is_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/report.pdf"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("content-type", "application/json; charset=utf-8")
                .set_body_string(r#"{"message":"no access to report"}"#),
        )
        .mount(&server)
        .await;

    let tokens = Arc::new(StaticTokenProvider::new("t"));
    let client = test_client(&server, &tokens);
    let err = client
        .download_file("files/report.pdf", &[], Some("Download failed"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Download failed");
    assert_eq!(
        err.data(),
        Some(&ErrorData::Json(serde_json::json!({"message": "no access to report"})))
    );
}

#[tokio::test]
async fn binary_error_with_other_content_type_keeps_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me/photo"))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header("content-type", "image/png")
                .set_body_bytes(vec![1_u8, 2, 3]),
        )
        .mount(&server)
        .await;

    let tokens = Arc::new(StaticTokenProvider::new("t"));
    let client = test_client(&server, &tokens);
    let err = client.download_photo("users/me/photo", None).await.unwrap_err();
    assert!(matches!(err.data(), Some(ErrorData::Binary(b)) if b.as_ref() == [1, 2, 3]));
}

#[tokio::test]
async fn download_photo_returns_status_and_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me/photo"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(vec![0xFF_u8, 0xD8, 0xFF]),
        )
        .mount(&server)
        .await;

    let tokens = Arc::new(StaticTokenProvider::new("t"));
    let client = test_client(&server, &tokens);
    let photo = client.download_photo("users/me/photo", None).await.unwrap();
    assert_eq!(photo.status.as_u16(), 200);
    assert_eq!(photo.content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(photo.bytes.as_ref(), [0xFF, 0xD8, 0xFF]);
}

#[tokio::test]
async fn download_honours_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/slow.bin"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0_u8; 4])
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let tokens = Arc::new(StaticTokenProvider::new("t"));
    let client = test_client(&server, &tokens)
        .with_download_timeout(Duration::from_millis(100))
        .with_backoff(backon::ExponentialBuilder::default().with_max_times(0));
    let err = client
        .download_file("files/slow.bin", &[], Some("Download timed out"))
        .await
        .unwrap_err();

    assert!(matches!(
        err.cause(),
        ResponseError::Timeout(limit) if *limit == Duration::from_millis(100)
    ));
    assert_eq!(err.to_string(), "Download timed out");
}

#[tokio::test]
async fn download_timeout_bounds_retries_with_default_backoff() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me/photo"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0_u8; 4])
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let tokens = Arc::new(StaticTokenProvider::new("t"));
    let client = Client::with_config(
        WebApiConfig::default().with_api_base(server.uri()),
        Arc::clone(&tokens) as Arc<dyn webapi_async::TokenProvider>,
        vec!["email".into()],
    )
    .unwrap()
    .with_download_timeout(Duration::from_millis(200));

    let started = std::time::Instant::now();
    let err = client.download_photo("users/me/photo", None).await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(elapsed < Duration::from_secs(1), "took {elapsed:?}");
    assert!(matches!(err.cause(), ResponseError::Timeout(_)));
    assert_eq!(tokens.calls(), 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}
