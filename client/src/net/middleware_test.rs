use super::*;
use crate::test_helpers::{ScriptedTransport, ok, status};
use std::sync::Mutex;

/// Appends its tag to a shared log on the way in and on the way out.
struct Tagging {
    tag: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait::async_trait]
impl Middleware for Tagging {
    async fn handle(&self, mut request: ApiRequest, next: Next<'_>) -> Result<ApiResponse, ApiError> {
        self.log.lock().unwrap().push(format!("in:{}", self.tag));
        request = request.query("via", self.tag);
        let result = next.run(request).await;
        self.log.lock().unwrap().push(format!("out:{}", self.tag));
        result
    }
}

#[tokio::test]
async fn empty_pipeline_calls_transport() {
    let transport = ScriptedTransport::new(vec![ok(serde_json::json!({ "id": "s1" }))]);
    let pipeline = Pipeline::new(transport.clone());

    let response = pipeline.send(ApiRequest::get("/samples/s1")).await.unwrap();
    assert_eq!(response.body["id"], "s1");
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn layers_run_outermost_first() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let transport = ScriptedTransport::new(vec![]);
    let pipeline = Pipeline::new(transport.clone())
        .layer(Tagging { tag: "outer", log: log.clone() })
        .layer(Tagging { tag: "inner", log: log.clone() });

    pipeline.send(ApiRequest::get("/storage/hierarchy")).await.unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["in:outer", "in:inner", "out:inner", "out:outer"]);
    let sent = &transport.requests()[0];
    assert_eq!(
        sent.query,
        vec![("via".to_owned(), "outer".to_owned()), ("via".to_owned(), "inner".to_owned())]
    );
}

#[tokio::test]
async fn non_success_status_becomes_error() {
    let transport = ScriptedTransport::new(vec![status(404, "Sample not found")]);
    let pipeline = Pipeline::new(transport).layer(TraceLayer);

    let err = pipeline.send(ApiRequest::get("/samples/missing")).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.user_message("fallback"), "Sample not found");
}

#[tokio::test]
async fn transport_errors_pass_through_layers() {
    let transport = ScriptedTransport::new(vec![Err(ApiError::Request("connection refused".into()))]);
    let pipeline = Pipeline::new(transport).layer(TraceLayer);

    let err = pipeline.send(ApiRequest::get("/laboratories")).await.unwrap_err();
    assert_eq!(err.error_code(), "E_API_REQUEST");
}
