//! Registration client tests against a mock OGC endpoint

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {

    use app_pack_generator::error::AppPackError;
    use app_pack_generator::operations::{
        AUTH_HEADER, DEFAULT_TIMEOUT, DeployAction, DeployClient, DeployOutcome,
    };
    use app_pack_generator::package::{
        AppPackageDocument, DEFAULT_APP_PACKAGE_TEMPLATE, PackageMetadata,
    };
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CWL_URL: &str =
        "https://raw.githubusercontent.com/org/sample-print/main/cwl_workflows/process_sample-print_main.cwl";

    fn package() -> AppPackageDocument {
        let metadata = PackageMetadata {
            id: Some("sample_print".to_owned()),
            title: Some("sample_print".to_owned()),
            description: None,
            version: Some("1.0".to_owned()),
        };
        AppPackageDocument::from_template_str(DEFAULT_APP_PACKAGE_TEMPLATE)
            .unwrap()
            .fill(CWL_URL, &metadata)
            .unwrap()
    }

    /// The blocking client owns its own runtime, so it must live and die
    /// outside the async test runtime
    async fn deploy_with(
        endpoint: String,
        token: Option<&'static str>,
        replace_existing: bool,
    ) -> Result<DeployOutcome, AppPackError> {
        tokio::task::spawn_blocking(move || {
            let mut client = DeployClient::new(&endpoint, DEFAULT_TIMEOUT)?
                .with_replace_existing(replace_existing)
                .with_allow_anonymous(token.is_none());
            if let Some(token) = token {
                client = client.with_token(token);
            }
            client.deploy(&package())
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn created_response_registers_package() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/processes"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(json!({
                "executionUnit": { "href": CWL_URL, "type": "application/cwl" },
                "processDescription": { "id": "sample_print" }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"id":"sample_print"}"#))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = deploy_with(format!("{}/processes", server.uri()), None, false)
            .await
            .unwrap();

        assert_eq!(outcome.status, 201);
        assert_eq!(outcome.action, DeployAction::Registered);
        assert!(outcome.body.contains("sample_print"));
    }

    #[tokio::test]
    async fn token_is_sent_in_auth_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header(AUTH_HEADER, "PGT-123"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = deploy_with(server.uri(), Some("PGT-123"), false)
            .await
            .unwrap();
        assert_eq!(outcome.status, 200);
    }

    #[tokio::test]
    async fn missing_token_fails_before_sending() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let endpoint = format!("{}/processes", server.uri());
        let err = tokio::task::spawn_blocking(move || {
            DeployClient::new(&endpoint, DEFAULT_TIMEOUT)?.deploy(&package())
        })
        .await
        .unwrap()
        .unwrap_err();

        assert!(matches!(err, AppPackError::Deploy { status: None, .. }));
        assert!(err.to_string().contains(AUTH_HEADER));
    }

    #[tokio::test]
    async fn client_error_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such endpoint"))
            .mount(&server)
            .await;

        let err = deploy_with(format!("{}/processes", server.uri()), None, false)
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert_eq!(err.exit_code(), 5);
        let message = err.to_string();
        assert!(message.contains("404"));
        assert!(message.contains("no such endpoint"));
    }

    #[tokio::test]
    async fn conflict_without_replace_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "additionalProperties": { "processID": "sample_print" }
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = deploy_with(format!("{}/processes", server.uri()), None, false)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(409));
    }

    #[tokio::test]
    async fn conflict_with_replace_puts_to_process_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/processes"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "detail": "process exists",
                "additionalProperties": { "processID": "sample_print" }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/processes/sample_print"))
            .and(header(AUTH_HEADER, "PGT-123"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = deploy_with(format!("{}/processes", server.uri()), Some("PGT-123"), true)
            .await
            .unwrap();

        assert_eq!(outcome.status, 204);
        assert_eq!(outcome.action, DeployAction::Replaced);
    }

    #[tokio::test]
    async fn conflict_without_process_id_cannot_be_replaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(409).set_body_string("duplicate"))
            .mount(&server)
            .await;

        let err = deploy_with(server.uri(), None, true).await.unwrap_err();
        assert_eq!(err.status(), Some(409));
        assert!(err.to_string().contains("duplicate"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_network_error() {
        let server = MockServer::start().await;
        let endpoint = format!("{}/processes", server.uri());
        drop(server);

        let err = deploy_with(endpoint, None, false).await.unwrap_err();
        assert!(matches!(err, AppPackError::Deploy { status: None, .. }));
        assert_eq!(err.exit_code(), 5);
    }
}
