//! Integration tests for net crate

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use nodectl_errors::{Error, NetworkError, RpcError};
    use nodectl_net::*;
    use nodectl_types::Secret;
    use serde_json::json;
    use std::time::Duration;

    fn fast_client() -> NetClient {
        NetClient::new(NetConfig {
            retry_count: 0,
            retry_delay: Duration::from_millis(1),
            ..NetConfig::default()
        })
        .unwrap()
    }

    fn endpoint(server: &MockServer) -> RpcEndpoint {
        RpcEndpoint::new(server.base_url(), "litecoinrpc", Secret::new("pw"))
    }

    #[tokio::test]
    async fn test_fetch_latest_tag() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/releases/latest");
            then.status(200)
                .json_body(json!({"tag_name": "v0.21.4", "name": "Litecoin Core 0.21.4"}));
        });

        let tag = fetch_latest_tag(&fast_client(), &server.url("/releases/latest"))
            .await
            .unwrap();
        mock.assert();
        assert_eq!(tag, "v0.21.4");
    }

    #[tokio::test]
    async fn test_fetch_latest_tag_rejects_garbage() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/releases/latest");
            then.status(200).json_body(json!({"tag_name": "nightly-build"}));
        });
        let err = fetch_latest_tag(&fast_client(), &server.url("/releases/latest"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Network(NetworkError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_latest_tag_http_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/releases/latest");
            then.status(404);
        });
        let err = fetch_latest_tag(&fast_client(), &server.url("/releases/latest"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Network(NetworkError::HttpError { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_rpc_blockchain_info() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/")
                .header_exists("authorization")
                .body_contains("getblockchaininfo");
            then.status(200).json_body(json!({
                "result": {
                    "chain": "main",
                    "blocks": 100,
                    "headers": 2_500_000,
                    "verificationprogress": 0.01,
                    "initialblockdownload": true,
                    "pruned": false
                },
                "error": null,
                "id": 1
            }));
        });

        let client = RpcClient::new(endpoint(&server));
        let info = client.get_blockchain_info().await.unwrap();
        mock.assert();
        assert_eq!(info.blocks, 100);
        assert!(info.initial_block_download);
    }

    #[tokio::test]
    async fn test_rpc_remote_error_and_unauthorized() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/wallet/pool").body_contains("getbalance");
            then.status(500).json_body(json!({
                "result": null,
                "error": {"code": -18, "message": "Requested wallet does not exist"},
                "id": 1
            }));
        });
        server.mock(|when, then| {
            when.method(POST).path("/").body_contains("stop");
            then.status(401);
        });

        let client = RpcClient::new(endpoint(&server));
        let err = client.get_balance("pool").await.unwrap_err();
        assert!(matches!(err, RpcError::Remote { code: -18, .. }));
        assert!(matches!(client.stop().await, Err(RpcError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_create_wallet_loads_existing() {
        let server = MockServer::start();
        let create = server.mock(|when, then| {
            when.method(POST)
                .path("/")
                .body_contains("createwallet")
                .body_contains("\"load_on_startup\":true");
            then.status(500).json_body(json!({
                "result": null,
                "error": {"code": -4, "message": "Wallet file verification failed"},
                "id": 1
            }));
        });
        let load = server.mock(|when, then| {
            when.method(POST)
                .path("/")
                .body_contains("loadwallet")
                .body_contains("\"load_on_startup\":true");
            then.status(200)
                .json_body(json!({"result": {"name": "pool"}, "error": null, "id": 2}));
        });

        let client = RpcClient::new(endpoint(&server));
        client.create_wallet("pool").await.unwrap();
        create.assert();
        load.assert();
    }

    #[tokio::test]
    async fn test_load_wallet_tolerates_loaded() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/").body_contains("loadwallet");
            then.status(500).json_body(json!({
                "result": null,
                "error": {"code": -35, "message": "Wallet \"pool\" is already loaded."},
                "id": 1
            }));
        });

        let client = RpcClient::new(endpoint(&server));
        client.load_wallet("pool").await.unwrap();
    }

    #[tokio::test]
    async fn test_rpc_unreachable() {
        let client = RpcClient::new(RpcEndpoint::new(
            "http://127.0.0.1:1",
            "u",
            Secret::new("p"),
        ));
        assert!(matches!(
            client.get_blockchain_info().await,
            Err(RpcError::Unreachable { .. })
        ));
    }
}
