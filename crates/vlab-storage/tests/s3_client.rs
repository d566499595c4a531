//! S3-compatible client tests against a mock endpoint.

use metrics_exporter_prometheus::PrometheusBuilder;
use vlab_storage::{ObjectStore, S3Client, S3Config, StorageError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(endpoint: String) -> S3Client {
    S3Client::new(S3Config {
        endpoint_url: endpoint,
        access_key_id: "GOOG1EXAMPLE".to_string(),
        secret_access_key: "secret".to_string(),
        region: "auto".to_string(),
    })
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

#[test]
fn test_check_connectivity_is_observed() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/vision-results"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        server
    });

    let client = client_for(server.uri());
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();

    let result = metrics::with_local_recorder(&recorder, || {
        rt.block_on(client.check_connectivity("vision-results"))
    });
    assert!(result.is_ok(), "{:?}", result);

    let rendered = handle.render();
    let line = rendered
        .lines()
        .find(|l| l.starts_with("storage_requests_total{"))
        .unwrap_or_else(|| panic!("no request counter in:\n{}", rendered));
    assert!(line.contains("backend=\"s3\""));
    assert!(line.contains("operation=\"head_bucket\""));
    assert!(line.contains("status=\"200\""));
}

#[test]
fn test_check_connectivity_missing_bucket() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        server
    });

    let client = client_for(server.uri());
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();

    let result = metrics::with_local_recorder(&recorder, || rt.block_on(client.check_connectivity("missing")));
    assert!(matches!(result, Err(StorageError::AwsSdk(_))));
    assert!(handle
        .render()
        .lines()
        .any(|l| l.starts_with("storage_requests_total{") && l.contains("operation=\"head_bucket\"")));
}
