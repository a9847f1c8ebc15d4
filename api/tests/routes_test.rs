use std::sync::Arc;

use answer_engine::testing::{ScriptedGenerator, VocabEmbedder, ml_knowledge_base, store_from_entries};
use answer_engine::{AnswerEngine, EngineConfig};
use api::{ApiConfig, AppState, router};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use rag_store::VectorStore;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn app_with(embedder: VocabEmbedder, generator: ScriptedGenerator, with_store: bool) -> Router {
    let store: Option<Arc<dyn VectorStore>> = if with_store {
        Some(store_from_entries(&embedder, &ml_knowledge_base()).await)
    } else {
        None
    };
    let engine = AnswerEngine::new(
        EngineConfig::default(),
        Arc::new(embedder),
        store,
        Arc::new(generator),
    );
    router(Arc::new(AppState::new(engine, None)), &ApiConfig::default())
}

async fn app() -> Router {
    app_with(
        VocabEmbedder::ml(),
        ScriptedGenerator::replying("A: Overfitting means the model memorized noise."),
        true,
    )
    .await
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post_ask(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/ask")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn exact_question_is_answered_verbatim() {
    let (status, body) = send(app().await, post_ask(r#"{"text":"what is bias?"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "question": "what is bias?",
            "answer": "Bias is systematic error from overly simple assumptions.",
            "source": "verbatim",
        })
    );
}

#[tokio::test]
async fn weak_match_is_generated_from_context() {
    let (status, body) = send(
        app().await,
        post_ask(r#"{"text":"overfitting training data noise"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "lm");
    assert_eq!(body["answer"], "Overfitting means the model memorized noise.");
    assert_eq!(body["context_used"], true);
    assert!(body["context_chars"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn blank_question_is_bad_request() {
    let (status, body) = send(app().await, post_ask(r#"{"text":"   "}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
    assert_eq!(body["detail"], "question cannot be empty");
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let (status, body) = send(app().await, post_ask(r#"{"question":"bias"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");

    let (status, _) = send(app().await, post_ask("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn generation_failure_is_bad_gateway() {
    let app = app_with(VocabEmbedder::ml(), ScriptedGenerator::failing("offline"), true).await;
    let (status, body) = send(app, post_ask(r#"{"text":"gradient descent learning step size"}"#)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "GENERATION_FAILED");
}

#[tokio::test]
async fn missing_store_degrades_gracefully() {
    let app = app_with(VocabEmbedder::ml(), ScriptedGenerator::replying("x"), false).await;

    let (status, body) = send(app.clone(), post_ask(r#"{"text":"bias"}"#)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "KB_UNAVAILABLE");

    let (status, body) = send(app.clone(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "ok": true,
            "models_loaded": false,
            "collection_available": false,
            "collection_count": 0,
        })
    );

    let (_, body) = send(app, get("/test-retrieval/bias")).await;
    assert_eq!(body["raw_metadatas_shape"], "0 x 0");
}

#[tokio::test]
async fn health_reports_collection_count() {
    let (status, body) = send(app().await, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["collection_available"], true);
    assert_eq!(body["collection_count"], 4);

    let (status, body) = send(app().await, get("/health/providers")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_retrieval_reports_shapes() {
    let (status, body) = send(app().await, get("/test-retrieval/overfitting")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "overfitting");
    assert_eq!(body["raw_metadatas_shape"], "1 x 3");
    assert_eq!(body["metas_count"], 3);
    assert_eq!(body["docs_count"], 3);
    assert_eq!(body["raw_metadatas_preview"][0][0]["question"], "What is overfitting?");
    assert_eq!(body["variants"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_retrieval_errors_are_reported_in_body() {
    let app = app_with(
        VocabEmbedder::ml().fail_on("boom"),
        ScriptedGenerator::replying("x"),
        true,
    )
    .await;
    let (status, body) = send(app, get("/test-retrieval/boom")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "boom");
    assert!(body["error"].as_str().unwrap().contains("boom"));
}

#[tokio::test]
async fn root_lists_endpoints() {
    let (status, body) = send(app().await, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["endpoints"].get("POST /ask").is_some());
}

#[tokio::test]
async fn cors_allows_the_dev_ui_origin() {
    let req = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let resp = app().await.oneshot(req).await.unwrap();
    assert_eq!(
        resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );
}
