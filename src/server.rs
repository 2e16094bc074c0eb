//! HTTP face of the gateway. The provider token stays in this process;
//! callers only ever see the stable `{error}` bodies below.

use std::fmt;

use actix_web::{
    http::StatusCode, middleware::Logger, web, App, HttpResponse, HttpServer, ResponseError,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    config::Config,
    error::ArtGenError,
    logger,
    models::{ApiErrorBody, GenerationRequest},
    pollinations::PollinationsClient,
};

pub const GENERIC_FAILURE: &str = "Failed to generate image. Please try again.";

pub struct AppState {
    pub client: PollinationsClient,
}

impl AppState {
    pub fn new(client: PollinationsClient) -> Self {
        Self { client }
    }
}

/// Wraps a crate error for the HTTP boundary.
#[derive(Debug)]
pub struct ApiError(pub ArtGenError);

impl ApiError {
    fn public_message(&self) -> &'static str {
        match self.0 {
            ArtGenError::MissingPrompt => "Prompt is required",
            ArtGenError::MisconfiguredCredential => "API token not configured",
            _ => GENERIC_FAILURE,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.public_message())
    }
}

impl From<ArtGenError> for ApiError {
    fn from(e: ArtGenError) -> Self {
        ApiError(e)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            ArtGenError::MissingPrompt => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiErrorBody::new(self.public_message()))
    }
}

async fn generate_image(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let request_id = Uuid::new_v4();
    // Parsed by hand so a malformed body gets the same generic 500 as
    // any other failure rather than actix's default 400.
    let outcome = match serde_json::from_slice::<GenerationRequest>(&body) {
        Ok(request) => state.client.image().generate(request).await,
        Err(e) => Err(ArtGenError::from(e)),
    };

    match outcome {
        Ok(result) => {
            log::info!("✅ [req:{}] Image ready: {}", request_id, result.image_url);
            Ok(HttpResponse::Ok().json(result))
        }
        Err(e) => {
            if e.is_caller_error() {
                log::warn!("⚠️  [req:{}] Rejected: {}", request_id, e);
            } else {
                log::error!("❌ [req:{}] Error generating image: {}", request_id, e);
            }
            Err(ApiError(e))
        }
    }
}

async fn list_models(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.client.models().list_models().await)
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/generate-image", web::post().to(generate_image))
        .route("/models", web::get().to(list_models))
        .route("/health", web::get().to(health));
}

pub async fn run(config: Config) -> std::io::Result<()> {
    let state = web::Data::new(AppState::new(PollinationsClient::new(
        config.pollinations.clone(),
    )));
    logger::log_startup_info(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        &config.server.host,
        config.server.port,
    );
    logger::log_config_info(&config);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Dms"))
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PollinationsConfig;
    use crate::models::GenerationResult;
    use crate::pollinations::transport::testing::FakeTransport;
    use crate::pollinations::RemoteGateway;
    use actix_web::{dev::ServerHandle, test};
    use std::net::TcpListener;
    use std::sync::Arc;

    fn state(transport: &FakeTransport, token: Option<&str>) -> web::Data<AppState> {
        let mut config = PollinationsConfig::new().with_token_env("ARTGEN_TEST_TOKEN_NEVER_SET");
        if let Some(token) = token {
            config = config.with_token(token);
        }
        web::Data::new(AppState::new(PollinationsClient::with_transport(
            Arc::new(transport.clone()),
            config,
        )))
    }

    async fn post(
        state: web::Data<AppState>,
        body: serde_json::Value,
    ) -> (StatusCode, web::Bytes) {
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/generate-image")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        (status, test::read_body(resp).await)
    }

    /// Serves the gateway routes on an ephemeral local port.
    fn spawn_gateway(state: web::Data<AppState>) -> (String, ServerHandle) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
            .workers(1)
            .disable_signals()
            .listen(listener)
            .unwrap()
            .run();
        let handle = server.handle();
        actix_web::rt::spawn(server);
        (format!("http://{}", addr), handle)
    }

    #[actix_web::test]
    async fn generates_image_url() {
        let transport = FakeTransport::responding(200, "https://img.example/x.png");
        let (status, body) = post(
            state(&transport, Some("t")),
            json!({"prompt": "a cat", "model": "flux"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let result: GenerationResult = serde_json::from_slice(&body).unwrap();
        assert_eq!(result.image_url, "https://img.example/x.png");
        assert_eq!(result.prompt, "a cat");
    }

    #[actix_web::test]
    async fn missing_prompt_is_400() {
        let transport = FakeTransport::responding(200, "https://img.example/x.png");
        let (status, body) = post(state(&transport, Some("t")), json!({"model": "flux"})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ApiErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, "Prompt is required");
        assert!(transport.calls().is_empty());
    }

    #[actix_web::test]
    async fn null_prompt_is_400() {
        let transport = FakeTransport::responding(200, "https://img.example/x.png");
        let (status, body) = post(
            state(&transport, Some("t")),
            json!({"prompt": null, "model": "flux"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ApiErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, "Prompt is required");
        assert!(transport.calls().is_empty());
    }

    #[actix_web::test]
    async fn missing_token_is_500_without_upstream_call() {
        let transport = FakeTransport::responding(200, "https://img.example/x.png");
        let (status, body) = post(state(&transport, None), json!({"prompt": "a cat"})).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let error: ApiErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, "API token not configured");
        assert!(transport.calls().is_empty());
    }

    #[actix_web::test]
    async fn upstream_status_is_not_leaked() {
        let transport = FakeTransport::responding(503, "https://image.pollinations.ai/prompt/x");
        let (status, body) = post(state(&transport, Some("t")), json!({"prompt": "a cat"})).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let text = String::from_utf8_lossy(&body);
        assert!(!text.contains("503"));
        let error: ApiErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, GENERIC_FAILURE);
    }

    #[actix_web::test]
    async fn unreachable_upstream_is_generic_failure() {
        let transport = FakeTransport::unreachable();
        let (status, body) = post(state(&transport, Some("t")), json!({"prompt": "a cat"})).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let error: ApiErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, GENERIC_FAILURE);
    }

    #[actix_web::test]
    async fn malformed_body_is_generic_failure() {
        let transport = FakeTransport::responding(200, "https://img.example/x.png");
        let app = test::init_service(
            App::new()
                .app_data(state(&transport, Some("t")))
                .configure(configure),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/generate-image")
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn models_route_falls_back() {
        let transport = FakeTransport::unreachable();
        let app = test::init_service(
            App::new()
                .app_data(state(&transport, None))
                .configure(configure),
        )
        .await;
        let req = test::TestRequest::get().uri("/models").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["models"], json!(["flux", "gptimage", "kontext"]));
        assert_eq!(body["fallback"], json!(true));
    }

    #[actix_web::test]
    async fn health_is_ok() {
        let transport = FakeTransport::unreachable();
        let app = test::init_service(
            App::new()
                .app_data(state(&transport, None))
                .configure(configure),
        )
        .await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[actix_web::test]
    async fn remote_gateway_talks_to_running_server() {
        let transport = FakeTransport::responding(200, "https://img.example/x.png");
        let (base_url, handle) = spawn_gateway(state(&transport, Some("t")));
        let gateway = RemoteGateway::new(base_url);

        let result = gateway
            .generate(GenerationRequest::new("a cat").with_model("flux").with_size(512, 768))
            .await
            .unwrap();
        assert_eq!(result.image_url, "https://img.example/x.png");
        assert_eq!(result.prompt, "a cat");

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].url.query(), Some("model=flux&width=512&height=768"));

        let err = gateway.generate(GenerationRequest::new("  ")).await.unwrap_err();
        assert!(matches!(err, ArtGenError::MissingPrompt));
        assert_eq!(transport.calls().len(), 1);

        handle.stop(true).await;
    }

    #[actix_web::test]
    async fn remote_gateway_reports_server_failure() {
        let transport = FakeTransport::responding(200, "https://img.example/x.png");
        let (base_url, handle) = spawn_gateway(state(&transport, None));

        let err = RemoteGateway::new(base_url)
            .generate(GenerationRequest::new("a cat"))
            .await
            .unwrap_err();
        match err {
            ArtGenError::ServerError(message) => assert_eq!(message, "API token not configured"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(transport.calls().is_empty());

        handle.stop(true).await;
    }
}
