//! Cloud Storage client tests against a mock JSON API.

use std::time::Duration;

use vlab_gcp_auth::Credentials;
use vlab_storage::{GcsClient, GcsConfig, ObjectStore, RetryConfig, StorageError};
use wiremock::matchers::{body_bytes, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GcsClient {
    let config = GcsConfig {
        base_url: server.uri(),
        timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(1),
        retry: RetryConfig {
            max_retries: 2,
            base_delay_ms: 1,
            max_delay_ms: 5,
        },
    };
    GcsClient::new(config, Credentials::StaticToken("ya29.storage".to_string())).unwrap()
}

#[tokio::test]
async fn test_put_bytes_uses_media_upload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload/storage/v1/b/results/o"))
        .and(query_param("uploadType", "media"))
        .and(query_param("name", "street.jpg.objects.json"))
        .and(header("authorization", "Bearer ya29.storage"))
        .and(header("content-type", "application/json"))
        .and(body_bytes(b"{\"0\":{}}".to_vec()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "bucket": "results",
            "name": "street.jpg.objects.json"
        })))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .put_bytes("results", "street.jpg.objects.json", b"{\"0\":{}}".to_vec(), "application/json")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_get_bytes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/storage/v1/b/results/o/team%2Fphoto.jpg.faces.json"))
        .and(query_param("alt", "media"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let bytes = client_for(&server)
        .get_bytes("results", "team/photo.jpg.faces.json")
        .await
        .unwrap();
    assert_eq!(bytes, b"{}");
}

#[tokio::test]
async fn test_get_missing_object() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/storage/v1/b/results/o/missing.json"))
        .respond_with(ResponseTemplate::new(404).set_body_string("No such object"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_bytes("results", "missing.json")
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound(ref o) if o == "results/missing.json"));
}

#[tokio::test]
async fn test_put_retries_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload/storage/v1/b/results/o"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/upload/storage/v1/b/results/o"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .put_bytes("results", "a.json", b"{}".to_vec(), "application/json")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_put_forbidden_is_upload_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload/storage/v1/b/locked/o"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .put_bytes("locked", "a.json", b"{}".to_vec(), "application/json")
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::UploadFailed(_)));
}

#[tokio::test]
async fn test_check_connectivity() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/storage/v1/b/results"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"name\":\"results\"}"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.check_connectivity("results").await.unwrap();
    assert!(client.check_connectivity("other").await.unwrap_err().is_not_found());
}
