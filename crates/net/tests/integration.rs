//! Integration tests for net crate

#[cfg(test)]
mod tests {
    use futures::StreamExt;
    use httpmock::prelude::*;
    use httpmock::Method::HEAD;
    use shdeps_errors::{Error, NetworkError};
    use shdeps_net::*;
    use std::time::Duration;

    #[derive(Debug, serde::Deserialize)]
    struct Doc {
        name: String,
    }

    #[tokio::test]
    async fn test_fetch_json() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/react");
                then.status(200).json_body(serde_json::json!({ "name": "react" }));
            })
            .await;

        let client = NetClient::with_defaults().unwrap();
        let doc: Doc = fetch_json(&client, &server.url("/react")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(doc.name, "react");
    }

    #[tokio::test]
    async fn test_fetch_json_http_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing");
                then.status(404);
            })
            .await;

        let client = NetClient::with_defaults().unwrap();
        let err = fetch_json::<Doc>(&client, &server.url("/missing"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Network(NetworkError::HttpError { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_probe_exists() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(HEAD).path("/react@17.0.1/package.json");
                then.status(200);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(HEAD).path("/react@17.0.0/package.json");
                then.status(404);
            })
            .await;

        let client = NetClient::with_defaults().unwrap();
        assert!(probe_exists(&client, &server.url("/react@17.0.1/package.json"))
            .await
            .unwrap());
        assert!(!probe_exists(&client, &server.url("/react@17.0.0/package.json"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_probe_transport_error_propagates() {
        let client = NetClient::new(NetConfig {
            connect_timeout: Duration::from_secs(2),
            ..NetConfig::default()
        })
        .unwrap();
        // Nothing listens on port 9 locally
        let result = probe_exists(&client, "http://127.0.0.1:9/react@1.0.0/package.json").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_open_stream_reads_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/react-17.0.1.tgz");
                then.status(200).body("tarball bytes");
            })
            .await;

        let client = NetClient::with_defaults().unwrap();
        let mut stream = open_stream(&client, &server.url("/react-17.0.1.tgz"), "react@17.0.1")
            .await
            .unwrap();

        let mut body = Vec::new();
        while let Some(chunk) = stream.next().await {
            body.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(body, b"tarball bytes");
    }

    #[tokio::test]
    async fn test_open_stream_timeout() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/slow.tgz");
                then.status(200)
                    .delay(Duration::from_secs(3))
                    .body("late");
            })
            .await;

        let client = NetClient::new(NetConfig {
            timeout: Duration::from_millis(300),
            ..NetConfig::default()
        })
        .unwrap();
        let err = open_stream(&client, &server.url("/slow.tgz"), "react@17.0.1")
            .await
            .err()
            .unwrap();
        assert_eq!(
            err.to_string(),
            "network error: Request timed out to download tarball for react@17.0.1"
        );
    }

    #[tokio::test]
    async fn test_credentials_scoped_to_registry() {
        let server = MockServer::start_async().await;
        let authed = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/private")
                    .header("authorization", "Bearer secret");
                then.status(200).json_body(serde_json::json!({ "name": "private" }));
            })
            .await;

        let client = NetClient::new(NetConfig {
            auth: Some(Auth::new(&server.base_url(), Credentials::Bearer("secret".into())).unwrap()),
            ..NetConfig::default()
        })
        .unwrap();
        let doc: Doc = fetch_json(&client, &server.url("/private")).await.unwrap();

        authed.assert_async().await;
        assert_eq!(doc.name, "private");
    }
}
