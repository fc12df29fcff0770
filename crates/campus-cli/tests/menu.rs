//! Menu loop tests against a mocked Dgraph endpoint.

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use campus_cli::menu::run_menu;
use campus_graph::{GraphClient, GraphConfig};

fn client_for(server: &MockServer) -> GraphClient {
    GraphClient::new(&GraphConfig { uri: server.uri() }).unwrap()
}

async fn drive(server: &MockServer, input: &str) -> (anyhow::Result<()>, String) {
    let mut out = Vec::new();
    let result = run_menu(client_for(server), input.as_bytes(), &mut out).await;
    (result, String::from_utf8(out).unwrap())
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map_or(0, |r| r.len())
}

#[tokio::test]
async fn non_numeric_input_reprompts_without_database_calls() {
    let server = MockServer::start().await;

    let (result, out) = drive(&server, "abc\n\n4.5\nexit\n8\n").await;

    result.unwrap();
    assert_eq!(out.matches("Invalid input. Please enter a number.").count(), 4);
    assert!(out.ends_with("Exiting...\n"));
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn unknown_numbers_reprompt_without_database_calls() {
    let server = MockServer::start().await;

    let (result, out) = drive(&server, "0\n9\n-2\n42\n8\n").await;

    result.unwrap();
    assert_eq!(out.matches("Invalid choice. Please try again.").count(), 4);
    assert_eq!(out.matches("Enter your choice: ").count(), 5);
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn numbers_too_large_for_i64_are_invalid_choices() {
    let server = MockServer::start().await;

    let (result, out) = drive(&server, "99999999999999999999\n8\n").await;

    result.unwrap();
    assert!(out.contains("Invalid choice. Please try again."));
    assert!(!out.contains("Invalid input."));
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn end_of_input_exits() {
    let server = MockServer::start().await;

    let (result, out) = drive(&server, "").await;

    result.unwrap();
    assert!(out.contains("1 -- Load data"));
    assert!(out.ends_with("Exiting...\n"));
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn course_search_prints_pretty_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_string_contains("anyofterms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "courses": [{ "uid": "0x2", "title": "Graph Databases 101", "category": "Databases" }]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (result, out) = drive(&server, "2\n8\n").await;

    result.unwrap();
    assert!(out.contains("\"title\": \"Graph Databases 101\""));
    assert!(out.contains("  \"courses\": ["));
}

#[tokio::test]
async fn drop_all_reports_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/alter"))
        .and(body_string_contains("drop_all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "code": "Success", "message": "Done" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (result, out) = drive(&server, "7\n8\n").await;

    result.unwrap();
    assert!(out.contains("All schema and data dropped"));
}

#[tokio::test]
async fn search_after_drop_all_prints_an_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/alter"))
        .and(body_string_contains("drop_all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "code": "Success", "message": "Done" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{ "message": "Attribute title is not indexed with type term" }],
            "data": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (result, out) = drive(&server, "7\n2\n8\n").await;

    result.unwrap();
    assert!(out.contains("\"courses\": []"));
    assert!(out.ends_with("Exiting...\n"));
}

#[tokio::test]
async fn database_error_stops_the_loop() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{ "message": "line 3 column 9: Unexpected token" }],
            "data": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    // The trailing choices are never reached.
    let (result, out) = drive(&server, "2\n4\n8\n").await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("Unexpected token"));
    assert!(!out.contains("Exiting..."));
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn delete_reports_how_many_instructors_went() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "to_delete": [{ "uid": "0x9" }] },
            "extensions": { "txn": { "start_ts": 5 } }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mutate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "code": "Success" },
            "extensions": { "txn": { "start_ts": 5, "keys": ["k"], "preds": ["1-rating"] } }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/commit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "code": "Success", "message": "Done" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (result, out) = drive(&server, "6\n8\n").await;

    result.unwrap();
    assert!(out.contains("Deleted 1 instructor(s) with rating < 4.0"));
}
