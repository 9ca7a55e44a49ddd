//! HTTP router.
//!
//! Returns a composable `Router` with every route nested under `/api/`.

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::pipeline::AnalysisPipeline;

/// Build the API router around a shared pipeline.
pub fn api_router(pipeline: Arc<AnalysisPipeline>) -> Router {
    build_router(ApiContext::new(pipeline))
}

fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/exams/:patient/:exam", put(endpoints::exams::put_source))
        .route("/exams/:patient/:exam/analyze", post(endpoints::exams::analyze))
        .route("/exams/:patient/:exam/report", post(endpoints::exams::report))
        .with_state(ctx);

    Router::new()
        .nest("/api", routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::models::DocumentPath;
    use crate::pipeline::extraction::MockInferenceClient;
    use crate::pipeline::storage::{DocumentStore, MemoryDocumentStore};
    use crate::pipeline::PipelineSettings;

    const TRANSCRIPT: &str = "Powód wizyty:\nKontrola.\nOpis badania:\nNerka lewa z poszerzonym UKM, wodonercze.\nWnioski:\nWodonercze lewostronne.\nZalecenia:\nKonsultacja urologiczna.";

    fn test_app(client: MockInferenceClient) -> (Router, Arc<MemoryDocumentStore>) {
        let store = Arc::new(MemoryDocumentStore::new());
        let pipeline = Arc::new(AnalysisPipeline::new(
            store.clone(),
            Arc::new(client),
            PipelineSettings::default(),
        ));
        (api_router(pipeline), store)
    }

    fn seeded_app(client: MockInferenceClient) -> (Router, Arc<MemoryDocumentStore>) {
        let (app, store) = test_app(client);
        store
            .put_source(
                &DocumentPath::primary("p1", "e1"),
                Some(TRANSCRIPT),
                Some("USG układu moczowego"),
            )
            .unwrap();
        (app, store)
    }

    fn post(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_returns_version() {
        let (app, _) = test_app(MockInferenceClient::failing("unused"));
        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::config::APP_VERSION);
    }

    #[tokio::test]
    async fn not_found_for_unknown_route() {
        let (app, _) = test_app(MockInferenceClient::failing("unused"));
        let req = Request::builder()
            .uri("/api/nonexistent")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn put_source_seeds_scoped_document() {
        let (app, store) = test_app(MockInferenceClient::failing("unused"));
        let req = Request::builder()
            .method("PUT")
            .uri("/api/exams/p1/e1?scope=c1")
            .header("Content-Type", "application/json")
            .body(Body::from(
                r#"{"transcript":"Opis badania:\nWątroba prawidłowa.","examType":"USG"}"#,
            ))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["path"], "clinics/c1/patients/p1/exams/e1");
        assert_eq!(json["pathKind"], "secondary");

        let doc = store
            .get(&DocumentPath::scoped("c1", "p1", "e1"))
            .unwrap()
            .unwrap();
        assert_eq!(doc.exam_type.as_deref(), Some("USG"));
    }

    #[tokio::test]
    async fn analyze_heuristic_returns_analysis_and_report() {
        let (app, store) = seeded_app(MockInferenceClient::failing("unused"));
        let response = app
            .oneshot(post("/api/exams/p1/e1/analyze?strategy=heuristic"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["pathKind"], "primary");
        assert_eq!(json["analysis"]["caseStatus"], "abnormal");
        assert_eq!(json["analysis"]["organFindings"]["kidneys"], "abnormal");
        assert_eq!(json["analysisMeta"]["engine"], "heuristic");
        assert_eq!(json["reportMeta"]["variant"], "abnormal_case");
        assert!(json["report"]
            .as_str()
            .unwrap()
            .starts_with("USG UKŁADU MOCZOWEGO\n"));

        let doc = store
            .get(&DocumentPath::primary("p1", "e1"))
            .unwrap()
            .unwrap();
        assert!(doc.analysis.is_some());
    }

    #[tokio::test]
    async fn analyze_inference_uses_client() {
        let (app, _) = seeded_app(MockInferenceClient::with_content(
            r#"{"sections":{"findings":"Wątroba prawidłowej wielkości."},"keyFindings":[]}"#,
        ));
        let response = app
            .oneshot(post("/api/exams/p1/e1/analyze?strategy=inference"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["analysisMeta"]["engine"], "inference");
        assert_eq!(json["analysis"]["caseStatus"], "normal");
        assert_eq!(json["reportMeta"]["variant"], "normal_case");
    }

    #[tokio::test]
    async fn analyze_rejects_unknown_strategy() {
        let (app, _) = seeded_app(MockInferenceClient::failing("unused"));
        let response = app
            .oneshot(post("/api/exams/p1/e1/analyze?strategy=magic"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn analyze_upstream_failure_returns_502() {
        let (app, store) = seeded_app(MockInferenceClient::with_content("to nie jest JSON"));
        let response = app
            .oneshot(post("/api/exams/p1/e1/analyze?strategy=inference"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(response).await["error"]["code"], "UPSTREAM_NOT_JSON");

        let doc = store
            .get(&DocumentPath::primary("p1", "e1"))
            .unwrap()
            .unwrap();
        assert!(doc.analysis.is_none());
        assert!(doc.report.is_none());
    }

    #[tokio::test]
    async fn analyze_missing_document_returns_404() {
        let (app, _) = test_app(MockInferenceClient::failing("unused"));
        let response = app
            .oneshot(post("/api/exams/p9/e9/analyze?scope=c9"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "DOCUMENT_NOT_FOUND");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("clinics/c9/patients/p9/exams/e9"));
    }

    #[tokio::test]
    async fn report_without_analysis_is_template_only() {
        let (app, _) = seeded_app(MockInferenceClient::failing("unused"));
        let response = app
            .oneshot(post("/api/exams/p1/e1/report"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["reportMeta"]["variant"], "template_only");
        assert_eq!(json["reportMeta"]["fieldsPresent"]["findings"], true);
        assert!(json["report"]
            .as_str()
            .unwrap()
            .contains("Transkrypt źródłowy:"));
    }

    #[tokio::test]
    async fn report_for_empty_document_returns_400() {
        let (app, store) = test_app(MockInferenceClient::failing("unused"));
        store
            .put_source(&DocumentPath::primary("p1", "e1"), None, None)
            .unwrap();
        let response = app
            .oneshot(post("/api/exams/p1/e1/report"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"]["code"],
            "MISSING_ANALYSIS_OR_TRANSCRIPT"
        );
    }
}
