//! E2E tests for health check and basic server functionality

mod common;

use common::TestServer;

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(&server.url("/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    followgraph::metrics::init_metrics();
    let server = TestServer::new().await;

    // Touch the client store so store metrics have a value.
    server.client.get(&server.url("/")).send().await.unwrap();

    let response = server
        .client
        .get(&server.url("/metrics"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("followgraph_client_stores_open"));
}

#[tokio::test]
async fn test_404_for_unknown_routes() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(&server.url("/unknown/route"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let server = TestServer::new().await;

    let row = "g,alice,bob,carol\n";
    let csv = row.repeat(64 * 1024 / row.len() + 1);
    let (status, _) = server.upload_csv(&csv).await;

    assert_eq!(status, 413);
}
