use std::sync::Arc;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::book_workflow::BookWorkflow;
use crate::book_workflow::catalog::CatalogClient;
use crate::book_workflow::llm::OpenAiCompletion;
use crate::config::Config;
use crate::routes::create_routes;

/// Initialize tracing and logging for the application
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "book_suggest_svc=info,tower_http=debug,axum::rejection=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Create and configure the Axum application with all routes and middleware
pub fn create_app(config: &Config) -> Result<Router, anyhow::Error> {
    info!("Initializing application router");

    info!("Using completion model {}", config.openai_model);
    let llm = OpenAiCompletion::from_config(config)?;
    let catalog = CatalogClient::from_config(config)?;
    info!("Catalog client initialized for {}", config.rakuten_api_url);

    Ok(build_router(
        BookWorkflow::new(Arc::new(llm), catalog),
        &config.static_dir,
    ))
}

/// Wires routes and middleware around an already built workflow
pub fn build_router(workflow: BookWorkflow, static_dir: &str) -> Router {
    create_routes(static_dir)
        .with_state(workflow)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book_workflow::llm::CompletionModel;
    use crate::book_workflow::suggestion::FALLBACK_RESPONSE;
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tower::ServiceExt;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct StubModel(Option<&'static str>);

    #[async_trait]
    impl CompletionModel for StubModel {
        async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| anyhow::anyhow!("connection refused"))
        }
    }

    fn router(model: StubModel, server: &MockServer) -> Router {
        let catalog = CatalogClient::new(&server.uri(), "test-app", Duration::from_secs(5)).unwrap();
        build_router(BookWorkflow::new(Arc::new(model), catalog), "static")
    }

    fn chat_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_chat_returns_suggestion_and_book() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("keyword", "Dune"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Items": [{"Item": {
                    "title": "Dune",
                    "author": "Frank Herbert",
                    "largeImageUrl": "http://x/img.jpg",
                    "itemPrice": 1500,
                    "itemUrl": "http://x/item"
                }}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let app = router(StubModel(Some("Try \"Dune\" by Frank Herbert")), &server);
        let response = app
            .oneshot(chat_request(r#"{"message": "desert planet"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(
            body,
            serde_json::json!({
                "response": "Here's a suggestion: Try \"Dune\" by Frank Herbert",
                "books": [{
                    "title": "Dune",
                    "author": "Frank Herbert",
                    "imageUrl": "http://x/img.jpg",
                    "price": 1500,
                    "url": "http://x/item"
                }]
            })
        );
    }

    #[tokio::test]
    async fn test_model_failure_returns_apology_without_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let app = router(StubModel(None), &server);
        let response = app
            .oneshot(chat_request(r#"{"message": "anything"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(
            body,
            serde_json::json!({"response": FALLBACK_RESPONSE, "books": []})
        );
    }

    #[tokio::test]
    async fn test_catalog_failure_still_returns_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let app = router(StubModel(Some("Emma")), &server);
        let response = app.oneshot(chat_request(r#"{"message": "x"}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["response"], "Here's a suggestion: Emma");
        assert_eq!(body["books"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_absent_message_passes_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"Items": []})))
            .mount(&server)
            .await;

        let app = router(StubModel(Some("Emma")), &server);
        let response = app.oneshot(chat_request("{}")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let keys: Vec<&String> = body.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 2);
        assert_eq!(body["books"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_any_well_formed_body_gets_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"Items": []})))
            .mount(&server)
            .await;

        for body in [r#"{"message": 5}"#, r#"{"message": {"genre": "sf"}}"#, "null", "[]"] {
            let app = router(StubModel(Some("Emma")), &server);
            let response = app.oneshot(chat_request(body)).await.unwrap();

            assert_eq!(response.status(), StatusCode::OK, "body {}", body);
            let body = json_body(response).await;
            assert_eq!(body["response"], "Here's a suggestion: Emma");
            assert_eq!(body["books"], serde_json::json!([]));
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let server = MockServer::start().await;
        let app = router(StubModel(Some("Emma")), &server);
        let response = app.oneshot(chat_request("{not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_missing_content_type_is_rejected() {
        let server = MockServer::start().await;
        let app = router(StubModel(Some("Emma")), &server);
        let request = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .body(Body::from(r#"{"message": "hi"}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_health_route() {
        let server = MockServer::start().await;
        let app = router(StubModel(None), &server);
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
    }
}
