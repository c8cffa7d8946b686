//! E2E tests for record management pages

mod common;

use common::{TestServer, span_text};

#[tokio::test]
async fn test_first_visit_seeds_store() {
    let server = TestServer::new().await;

    let response = server.client.get(&server.url("/")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();

    assert!(body.contains(r#"<option value="graph" selected>graph</option>"#));
    assert!(body.contains(r#"<option value="test" selected>test</option>"#));
}

#[tokio::test]
async fn test_home_accepts_get_and_post() {
    let server = TestServer::new().await;

    let (status, body) = server.post_form("/home", &[]).await;
    assert_eq!(status, 200);
    assert!(body.contains("action=\"/accounts\""));
}

#[tokio::test]
async fn test_add_and_lookup_account() {
    let server = TestServer::new().await;
    server
        .add_record("friends", "alice", "bob, carol", "dave")
        .await;

    let (status, body) = server
        .post_form("/account", &[("graph", "friends"), ("account", "alice")])
        .await;

    assert_eq!(status, 200);
    assert_eq!(span_text(&body, "followers").as_deref(), Some("bob, carol"));
    assert_eq!(span_text(&body, "following").as_deref(), Some("dave"));
    assert!(body.contains(r#"<option value="friends" selected>friends</option>"#));
}

#[tokio::test]
async fn test_missing_account_shows_empty_markers() {
    let server = TestServer::new().await;

    let (status, body) = server
        .post_form("/account", &[("graph", "nowhere"), ("account", "nobody")])
        .await;

    assert_eq!(status, 200);
    assert_eq!(span_text(&body, "followers").as_deref(), Some("Empty"));
    assert_eq!(span_text(&body, "following").as_deref(), Some("Empty"));
}

#[tokio::test]
async fn test_added_names_are_stored_verbatim() {
    let server = TestServer::new().await;
    server.add_record(" g1 ", " alice ", "bob", "carol").await;

    let (status, body) = server
        .post_form("/account", &[("graph", " g1 "), ("account", " alice ")])
        .await;
    assert_eq!(status, 200);
    assert_eq!(span_text(&body, "followers").as_deref(), Some("bob"));
    assert_eq!(span_text(&body, "following").as_deref(), Some("carol"));
    assert!(body.contains(r#"value=" g1 ""#));

    // The trimmed spelling is a different record.
    let (_, body) = server
        .post_form("/account", &[("graph", "g1"), ("account", "alice")])
        .await;
    assert_eq!(span_text(&body, "followers").as_deref(), Some("Empty"));
}

#[tokio::test]
async fn test_add_requires_graph_and_account() {
    let server = TestServer::new().await;

    let (status, body) = server
        .post_form("/accounts", &[("graph", " "), ("account", "alice")])
        .await;

    assert_eq!(status, 400);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "graph and account are required");
}

#[tokio::test]
async fn test_delete_graph_removes_only_that_graph() {
    let server = TestServer::new().await;
    server.add_record("g1", "a", "", "").await;
    server.add_record("g1", "b", "", "").await;
    server.add_record("g2", "c", "", "").await;

    let (status, body) = server.post_form("/graphs/delete", &[("graph", "g1")]).await;
    assert_eq!(status, 200);
    assert!(!body.contains(r#"value="g1""#));
    assert!(body.contains(r#"value="g2""#));

    let db = server
        .state
        .stores
        .open(&followgraph::data::ClientId::from_ip(
            std::net::Ipv4Addr::LOCALHOST.into(),
        ))
        .await
        .unwrap();
    let graphs: Vec<String> = db
        .list_records()
        .await
        .unwrap()
        .into_iter()
        .map(|record| record.graph)
        .collect();
    assert_eq!(graphs, vec!["graph", "g2"]);
}

#[tokio::test]
async fn test_delete_account_spans_graphs() {
    let server = TestServer::new().await;
    server.add_record("g1", "alice", "", "").await;
    server.add_record("g2", "alice", "", "").await;
    server.add_record("g2", "bob", "", "").await;

    let (status, body) = server
        .post_form("/accounts/delete", &[("account", "alice")])
        .await;

    assert_eq!(status, 200);
    assert!(!body.contains(r#"value="alice""#));
    assert!(body.contains(r#"value="bob""#));
}

#[tokio::test]
async fn test_upload_imports_rows() {
    let server = TestServer::new().await;

    let (status, body) = server
        .upload_csv("g1,alice,\"bob, carol\",dave\ng1,bob,alice,\n")
        .await;
    assert_eq!(status, 200);
    assert!(body.contains(r#"value="g1""#));

    let (_, body) = server
        .post_form("/account", &[("graph", "g1"), ("account", "alice")])
        .await;
    assert_eq!(span_text(&body, "followers").as_deref(), Some("bob, carol"));
}

#[tokio::test]
async fn test_malformed_upload_keeps_earlier_rows() {
    let server = TestServer::new().await;

    let (status, body) = server
        .upload_csv("g1,alice,bob,carol\ng1,broken\ng1,dave,eve,frank\n")
        .await;
    assert_eq!(status, 400);
    assert!(body.contains("row 2"));

    let (_, body) = server
        .post_form("/account", &[("graph", "g1"), ("account", "alice")])
        .await;
    assert_eq!(span_text(&body, "followers").as_deref(), Some("bob"));

    let (_, body) = server
        .post_form("/account", &[("graph", "g1"), ("account", "dave")])
        .await;
    assert_eq!(span_text(&body, "followers").as_deref(), Some("Empty"));
}

#[tokio::test]
async fn test_upload_without_file_is_rejected() {
    let server = TestServer::new().await;

    let form = reqwest::multipart::Form::new().text("note", "no file here");
    let response = server
        .client
        .post(server.url("/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}
