use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::debug;

use transparency_common::api::{
    GenerateQuestionsRequest, GenerateQuestionsResponse, ServiceStatus, TransparencyScoreRequest,
    TransparencyScoreResponse,
};

use crate::assistant::{self, AiAssistant};
use crate::catalog;
use crate::error::{self, AppError};
use crate::scoring;

const SERVICE_NAME: &str = "Product Transparency AI powered by Gemini";

/// Shared, read-only handler state.
#[derive(Clone, Default)]
pub struct AppState {
    /// Present only when a model credential was configured.
    assistant: Option<Arc<AiAssistant>>,
}

impl AppState {
    pub fn new(assistant: Option<AiAssistant>) -> Self {
        Self {
            assistant: assistant.map(Arc::new),
        }
    }
}

/// Build the HTTP surface.
///
/// CORS is intentionally wide open (any origin, method and header): the service holds
/// no user data and is called directly from browser frontends on other origins.
pub fn router(state: AppState) -> Router {
    with_middleware(routes()).with_state(state)
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(status))
        .route("/generate-questions", post(generate_questions))
        .route("/transparency-score", post(transparency_score))
}

/// Panic catching innermost, then tracing, then CORS outermost so preflights never
/// reach a handler.
fn with_middleware(routes: Router<AppState>) -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    routes
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn status(State(state): State<AppState>) -> Json<ServiceStatus> {
    Json(ServiceStatus {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        gemini_configured: state.assistant.is_some(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn generate_questions(
    State(state): State<AppState>,
    payload: Result<Json<GenerateQuestionsRequest>, JsonRejection>,
) -> Result<Json<GenerateQuestionsResponse>, AppError> {
    let Json(request) = payload?;
    debug!(
        product = %request.product_name,
        category = %request.category,
        previous_answers = request.previous_answers.len(),
        "generate questions"
    );

    let mut questions = catalog::questionnaire(&request.category);
    let mut ai_generated = false;

    if let Some(ai) = &state.assistant {
        match ai
            .suggest_questions(
                &request.product_name,
                &request.category,
                &request.previous_answers,
            )
            .await
        {
            Ok(suggested) => {
                questions.extend(suggested);
                ai_generated = true;
            }
            Err(e) => assistant::log_failure("question suggestions", &e),
        }
    }

    Ok(Json(GenerateQuestionsResponse {
        questions,
        ai_generated,
    }))
}

async fn transparency_score(
    State(state): State<AppState>,
    payload: Result<Json<TransparencyScoreRequest>, JsonRejection>,
) -> Result<Json<TransparencyScoreResponse>, AppError> {
    let Json(request) = payload?;
    debug!(
        product = %request.product_name,
        category = %request.category,
        responses = request.responses.len(),
        "score transparency"
    );

    let mut breakdown = scoring::score_responses(&request.responses);

    if let Some(ai) = &state.assistant {
        if !request.responses.is_empty() {
            let analysis = ai
                .analyze_or_fallback(
                    &request.product_name,
                    &request.category,
                    &request.responses,
                    breakdown.transparency,
                )
                .await;
            breakdown.analysis = analysis.analysis;
            breakdown.recommendations = analysis.recommendations;
        }
    }

    Ok(Json(TransparencyScoreResponse {
        transparency_score: breakdown.transparency,
        health_score: breakdown.health,
        ethics_score: breakdown.ethics,
        recommendations: breakdown.recommendations,
        ai_analysis: breakdown.analysis,
    }))
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use transparency_common::llm::{LlmClient, LlmClientConfig};

    use super::*;

    async fn call(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    /// Serves a fixed chat-completions reply whose message content is `content`.
    async fn stub_model(content: &'static str) -> SocketAddr {
        let stub = Router::new().route(
            "/chat/completions",
            post(move || async move {
                Json(json!({
                    "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub");
        let addr = listener.local_addr().expect("stub addr");
        tokio::spawn(async move {
            axum::serve(listener, stub).await.expect("stub server");
        });
        addr
    }

    fn app_with_model(base_url: String, timeout: Duration) -> Router {
        let config = LlmClientConfig::new(
            "test-key".to_string(),
            base_url,
            "test-model".to_string(),
            timeout,
            1024,
        );
        let client = LlmClient::new(config).expect("client");
        router(AppState::new(Some(AiAssistant::new(client))))
    }

    async fn app_replying(content: &'static str) -> Router {
        let addr = stub_model(content).await;
        app_with_model(format!("http://{addr}"), Duration::from_secs(5))
    }

    fn static_app() -> Router {
        router(AppState::default())
    }

    fn score_body(responses: Value) -> Value {
        json!({"product_name": "Oat Bar", "category": "Food", "responses": responses})
    }

    fn sample_responses() -> Value {
        json!([
            {"question": "Allergens?", "answer": "Contains oats and honey; produced in a facility that also handles tree nuts and soy", "category": "health"},
            {"question": "Certifications?", "answer": "", "category": "ethics"},
            {"question": "Origin?", "answer": "Produced in a family-run facility in Vermont, USA", "category": "origin"}
        ])
    }

    #[tokio::test]
    async fn status_reports_configuration() {
        let (status, body) = call(static_app(), "GET", "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["gemini_configured"], false);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

        let app = app_with_model("http://127.0.0.1:1".to_string(), Duration::from_secs(1));
        let (_, body) = call(app, "GET", "/", None).await;
        assert_eq!(body["gemini_configured"], true);
    }

    #[tokio::test]
    async fn food_questions_without_ai() {
        let (status, body) = call(
            static_app(),
            "POST",
            "/generate-questions",
            Some(json!({"product_name": "Oat Bar", "category": "Food", "previous_answers": []})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ai_generated"], false);
        let questions = body["questions"].as_array().expect("questions");
        assert_eq!(questions.len(), 7);
        assert_eq!(questions[0]["id"], "ingredients");
        assert_eq!(questions[0]["type"], "text");
        assert_eq!(questions[6]["id"], "expiry");
    }

    #[tokio::test]
    async fn ai_questions_are_appended() {
        let app = app_replying(
            "```json\n[{\"id\": \"sourcing\", \"question\": \"Where do the oats come from?\", \"type\": \"text\", \"category\": \"ethics\"}]\n```",
        )
        .await;
        let (status, body) = call(
            app,
            "POST",
            "/generate-questions",
            Some(json!({"product_name": "Oat Bar", "category": "Food"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ai_generated"], true);
        let questions = body["questions"].as_array().expect("questions");
        assert_eq!(questions.len(), 8);
        assert_eq!(questions[7]["id"], "sourcing");
    }

    #[tokio::test]
    async fn malformed_ai_questions_fall_back_to_catalog() {
        for reply in ["Sure! Here are three questions.", "{\"id\": \"not-a-list\"}"] {
            let app = app_replying(reply).await;
            let (status, body) = call(
                app,
                "POST",
                "/generate-questions",
                Some(json!({"product_name": "Serum", "category": "Cosmetics"})),
            )
            .await;
            assert_eq!(status, StatusCode::OK, "reply {reply}");
            assert_eq!(body["ai_generated"], false);
            assert_eq!(body["questions"].as_array().expect("questions").len(), 6);
        }
    }

    #[tokio::test]
    async fn unreachable_model_falls_back_to_catalog() {
        let app = app_with_model("http://127.0.0.1:1".to_string(), Duration::from_secs(2));
        let (status, body) = call(
            app,
            "POST",
            "/generate-questions",
            Some(json!({"product_name": "Cola", "category": "Beverage"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ai_generated"], false);
        assert_eq!(body["questions"].as_array().expect("questions").len(), 6);
    }

    #[tokio::test]
    async fn empty_responses_score_zero() {
        let (status, body) = call(
            static_app(),
            "POST",
            "/transparency-score",
            Some(score_body(json!([]))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["transparency_score"], 0);
        assert_eq!(body["health_score"], 0);
        assert_eq!(body["ethics_score"], 0);
        assert_eq!(
            body["recommendations"],
            json!(["Add product information to get a transparency score"])
        );
        assert_eq!(body["ai_analysis"], "No data available for analysis");
    }

    #[tokio::test]
    async fn static_score_uses_bracket_recommendations() {
        // completeness 66.67, quality 3/9, health 100, ethics 0 -> 53
        let (status, body) = call(
            static_app(),
            "POST",
            "/transparency-score",
            Some(score_body(sample_responses())),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["health_score"], 100);
        assert_eq!(body["ethics_score"], 0);
        assert_eq!(body["transparency_score"], 53);
        assert_eq!(body["recommendations"].as_array().expect("recs").len(), 5);
        assert_eq!(body["ai_analysis"], "Standard analysis completed");
    }

    #[tokio::test]
    async fn ai_analysis_replaces_static_copy() {
        let app = app_replying(
            "{\"analysis\": \"Allergen disclosure is solid; certifications are missing.\", \"recommendations\": [\"Obtain organic certification\", \"Publish supplier list\", \"Add lab test results\"]}",
        )
        .await;
        let (status, body) = call(
            app,
            "POST",
            "/transparency-score",
            Some(score_body(sample_responses())),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["ai_analysis"],
            "Allergen disclosure is solid; certifications are missing."
        );
        assert_eq!(body["recommendations"].as_array().expect("recs").len(), 3);
        assert_eq!(body["health_score"], 100);
    }

    #[tokio::test]
    async fn malformed_ai_analysis_uses_fallback() {
        let app = app_replying("The product looks fine to me.").await;
        let (status, body) = call(
            app,
            "POST",
            "/transparency-score",
            Some(score_body(sample_responses())),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["ai_analysis"],
            "Product shows 53% transparency. Further analysis pending."
        );
        assert_eq!(body["recommendations"].as_array().expect("recs").len(), 5);
    }

    #[tokio::test]
    async fn slow_model_times_out_into_fallback() {
        let stub = Router::new().route(
            "/chat/completions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"choices": []}))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub");
        let addr = listener.local_addr().expect("stub addr");
        tokio::spawn(async move {
            axum::serve(listener, stub).await.expect("stub server");
        });

        let app = app_with_model(format!("http://{addr}"), Duration::from_millis(200));
        let (status, body) = call(
            app,
            "POST",
            "/transparency-score",
            Some(score_body(sample_responses())),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(
            body["ai_analysis"]
                .as_str()
                .expect("analysis")
                .ends_with("Further analysis pending.")
        );
    }

    #[tokio::test]
    async fn empty_responses_skip_the_model() {
        let app = app_with_model("http://127.0.0.1:1".to_string(), Duration::from_secs(1));
        let (status, body) =
            call(app, "POST", "/transparency-score", Some(score_body(json!([])))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ai_analysis"], "No data available for analysis");
    }

    #[tokio::test]
    async fn null_question_and_category_are_accepted() {
        let (status, body) = call(
            static_app(),
            "POST",
            "/transparency-score",
            Some(score_body(json!([
                {"question": "Allergens?", "answer": "none at all here", "category": null},
                {"question": null, "answer": "x", "category": "health"}
            ]))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["health_score"], 100);
        assert_eq!(body["ethics_score"], 50);

        let (status, body) = call(
            static_app(),
            "POST",
            "/generate-questions",
            Some(json!({
                "product_name": "Oat Bar",
                "category": "Food",
                "previous_answers": [{"question": null, "answer": "oats", "category": null}]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["questions"].as_array().expect("questions").len(), 7);
    }

    #[tokio::test]
    async fn invalid_body_is_unprocessable() {
        let (status, body) = call(
            static_app(),
            "POST",
            "/transparency-score",
            Some(json!({"category": "Food", "responses": []})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().expect("detail").contains("product_name"));
    }

    #[tokio::test]
    async fn missing_content_type_is_rejected() {
        let response = static_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/generate-questions")
                    .body(Body::from("{}"))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let response = static_app()
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/transparency-score")
                    .header("origin", "https://shop.example")
                    .header("access-control-request-method", "POST")
                    .header("access-control-request-headers", "content-type")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
    }

    async fn boom() -> &'static str {
        panic!("scoring exploded")
    }

    #[tokio::test]
    async fn handler_panics_become_500_with_detail() {
        let app = with_middleware(routes().route("/boom", get(boom)))
            .with_state(AppState::default());
        let (status, body) = call(app, "GET", "/boom", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "scoring exploded");
    }
}
