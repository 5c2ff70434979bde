pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::ranking::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Rankings API
        .route("/api/v1/rankings", post(handlers::handle_create_ranking))
        .route("/api/v1/rankings/:id", get(handlers::handle_get_ranking))
        .route(
            "/api/v1/rankings/:id/csv",
            get(handlers::handle_get_ranking_csv),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{Config, DEFAULT_MODEL, DEFAULT_OLLAMA_URL};
    use crate::llm_client::testing::StubCompletion;
    use crate::ranking::{Ranker, RankingSettings};

    const BOUNDARY: &str = "cvrank-test-boundary";

    fn app(out_dir: &Path) -> Router {
        let llm = StubCompletion::new("Rust engineer shipping Kafka pipelines")
            .reply_when(
                "PARSE_JOB_DESCRIPTION",
                r#"{"title": "Rust Engineer", "keywords": ["rust", "kafka"]}"#,
            )
            .reply_when("EXTRACT_RESUME", "{}");
        let settings = RankingSettings {
            timeout: Duration::from_secs(5),
            retries: 0,
            ..Default::default()
        };
        let config = Config {
            model: DEFAULT_MODEL.to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            engine: "heuristic".to_string(),
            concurrency: 2,
            timeout_secs: 5,
            retries: 0,
            rubric_weight: 0.7,
            top_k: 5,
            out_dir: out_dir.to_path_buf(),
            port: 0,
            rust_log: "info".to_string(),
        };
        build_router(AppState {
            ranker: Ranker::new(Arc::new(llm), settings),
            config,
        })
    }

    fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> String {
        let mut body = String::new();
        for (name, file_name, content) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match file_name {
                Some(file_name) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                     Content-Type: text/plain\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    fn upload(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/rankings")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "cvrank");
    }

    #[tokio::test]
    async fn test_upload_ranks_persists_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        let body = multipart_body(&[
            ("resumes", Some("jane.txt"), "Skills: rust, kafka"),
            ("resumes", Some("old.doc"), "binary"),
            ("jd_text", None, "Rust Engineer\n- Rust\n- Kafka"),
            ("top_n", None, "1"),
        ]);

        let response = app(dir.path()).oneshot(upload(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["total"], 2);
        assert_eq!(body["failed"], 1);
        let candidates = body["candidates"].as_array().unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0]["resume_path"], "jane.txt");
        assert_eq!(candidates[0]["keyword_coverage"], 1.0);

        let id = body["ranking_id"].as_str().unwrap();
        assert!(dir.path().join(format!("{id}.json")).exists());

        let stored = app(dir.path())
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/rankings/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(stored.status(), StatusCode::OK);
        let stored = json_body(stored).await;
        assert_eq!(stored["candidates"].as_array().unwrap().len(), 2);
        assert_eq!(stored["candidates"][1]["error"]["kind"], "UnsupportedFormat");

        let csv = app(dir.path())
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/rankings/{id}/csv"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(csv.status(), StatusCode::OK);
        let bytes = to_bytes(csv.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("rank,name,resume_path,alignment_score,keyword_coverage,error"));
        assert_eq!(text.lines().count(), 3);
    }

    #[tokio::test]
    async fn test_empty_resume_is_reported_and_unselected_input_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let body = multipart_body(&[
            ("resumes", Some("jane.txt"), "Skills: rust, kafka"),
            ("resumes", Some("blank.txt"), ""),
            ("resumes", Some(""), ""),
            ("jd_text", None, "Rust Engineer\n- Rust\n- Kafka"),
        ]);

        let response = app(dir.path()).oneshot(upload(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["total"], 2);
        assert_eq!(body["failed"], 1);
        let last = &body["candidates"][1];
        assert_eq!(last["resume_path"], "blank.txt");
        assert_eq!(last["rank"], 2);
        assert_eq!(last["error"]["kind"], "ExtractionError");
    }

    #[tokio::test]
    async fn test_required_skills_filter_only_shapes_response() {
        let dir = tempfile::tempdir().unwrap();
        let body = multipart_body(&[
            ("resumes", Some("jane.txt"), "Skills: rust, kafka"),
            ("jd_text", None, "Rust Engineer\n- Rust\n- Kafka"),
            ("required_skills", None, "cobol"),
        ]);

        let response = app(dir.path()).oneshot(upload(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["total"], 1);
        assert!(body["candidates"].as_array().unwrap().is_empty());

        let id = body["ranking_id"].as_str().unwrap();
        let stored: Value =
            serde_json::from_slice(&std::fs::read(dir.path().join(format!("{id}.json"))).unwrap())
                .unwrap();
        assert_eq!(stored["candidates"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_engine_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let body = multipart_body(&[
            ("resumes", Some("jane.txt"), "Skills: rust"),
            ("jd_text", None, "Rust Engineer"),
            ("engine", None, "bert"),
        ]);
        let response = app(dir.path()).oneshot(upload(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "UNKNOWN_ENGINE");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_missing_job_description_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let body = multipart_body(&[("resumes", Some("jane.txt"), "Skills: rust")]);
        let response = app(dir.path()).oneshot(upload(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_ranking_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/rankings/{}", uuid::Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
