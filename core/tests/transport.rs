//! `UreqTransport` against a scripted HTTP server.
//!
//! Checks what actually goes over the wire: headers, query strings and JSON
//! bodies, plus how non-2xx answers come back through the client.

use cachet_client::models::{Component, ComponentStatus};
use cachet_client::{ApiError, CachetClient, ClientConfig, Payload};
use mockito::{Matcher, Server};
use serde_json::json;

fn client(server: &Server) -> CachetClient {
    let config = ClientConfig::new(format!("{}/api/v1/", server.url()), "secret");
    CachetClient::new(config).unwrap()
}

#[test]
fn requests_carry_the_token_header() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/api/v1/components/1")
        .match_header("X-Cachet-Token", "secret")
        .with_status(200)
        .with_body(r#"{"data":{"id":1,"name":"Foo","status":1}}"#)
        .create();

    let component = client(&server).get_component(1).unwrap();
    assert_eq!(component.name, "Foo");
    mock.assert();
}

#[test]
fn basic_auth_is_added_when_configured() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/api/v1/ping")
        .match_header("Authorization", "Basic b3BzOmh1bnRlcjI=")
        .match_header("X-Cachet-Token", "secret")
        .with_status(200)
        .with_body(r#"{"data":"Pong!"}"#)
        .create();

    let config = ClientConfig::new(format!("{}/api/v1", server.url()), "secret")
        .with_basic_auth("ops", "hunter2");
    assert!(CachetClient::new(config).unwrap().ping());
    mock.assert();
}

#[test]
fn filters_are_sent_as_query_pairs() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/api/v1/incidents")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("status".into(), "2".into()),
            Matcher::UrlEncoded("name".into(), "db down & out".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"meta":{"pagination":{"total":0}},"data":[]}"#)
        .create();

    let incidents = client(&server)
        .list_incidents(&[("status", "2"), ("name", "db down & out")])
        .unwrap();
    assert!(incidents.is_empty());
    mock.assert();
}

#[test]
fn writes_send_shaped_json() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/api/v1/components")
        .match_header("Content-Type", "application/json")
        .match_body(Matcher::Json(json!({"name": "API", "status": 2})))
        .with_status(200)
        .with_body(r#"{"data":{"id":5,"name":"API","status":2}}"#)
        .create();

    let mut component = Component::new("API").with_status(ComponentStatus::PerformanceIssues);
    component.tags = Some(json!(["core"]));
    let created = client(&server).add_component(&component).unwrap();
    assert_eq!(created.id, Some(5));
    mock.assert();
}

#[test]
fn updates_use_put() {
    let mut server = Server::new();
    let mock = server
        .mock("PUT", "/api/v1/incidents/3")
        .match_body(Matcher::Json(json!({"name": "Z"})))
        .with_status(200)
        .with_body(r#"{"data":{"id":3,"name":"Z","status":1}}"#)
        .create();

    let body = Payload::new().insert("name", "Z").insert("created_at", "2020-01-01");
    client(&server).update_incident(3_u64, Some(body)).unwrap();
    mock.assert();
}

#[test]
fn deletes_accept_no_content() {
    let mut server = Server::new();
    let mock = server
        .mock("DELETE", "/api/v1/subscribers/4")
        .with_status(204)
        .create();

    client(&server).delete_subscriber(4_u64).unwrap();
    mock.assert();
}

#[test]
fn error_bodies_become_application_errors() {
    let mut server = Server::new();
    let _mock = server
        .mock("POST", "/api/v1/metrics")
        .with_status(400)
        .with_body(
            r#"{"errors":[{"status":400,"title":"Bad","detail":"x required"},{"title":"Also","detail":"y"}]}"#,
        )
        .create();

    let client = client(&server);
    let err = client.add_metric(Payload::new().insert("name", "Latency")).unwrap_err();
    assert_eq!(
        err,
        ApiError::Application {
            status: 400,
            message: "Bad: x required; Also: y".to_string()
        }
    );
    assert_eq!(client.last_error().as_deref(), Some("Bad: x required; Also: y"));
}

#[test]
fn bare_error_statuses_use_the_reason_phrase() {
    let mut server = Server::new();
    let _mock = server.mock("GET", "/api/v1/components").with_status(500).create();

    let err = client(&server).list_components(&[]).unwrap_err();
    assert_eq!(err.to_string(), "Internal Server Error");
    assert_eq!(err.status(), Some(500));
}

#[test]
fn unauthorized_ignores_the_body() {
    let mut server = Server::new();
    let _mock = server
        .mock("DELETE", "/api/v1/components/1")
        .with_status(401)
        .with_body(r#"{"errors":[{"title":"Unauthorized","detail":"bad token"}]}"#)
        .create();

    let err = client(&server).delete_component(1_u64).unwrap_err();
    assert_eq!(err, ApiError::Authentication);
}

#[test]
fn connection_failures_are_transport_errors() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig::new(format!("http://{addr}/api/v1"), "secret");
    let client = CachetClient::new(config).unwrap();
    let err = client.list_subscribers(&[]).unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(err.status(), None);
    assert!(client.last_error().is_some());
}
