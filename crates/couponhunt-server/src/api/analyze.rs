use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use couponhunt_core::{AnalyzeRequest, AnalyzeResponse, FormAnalyzeRequest, FormAnalyzeResponse};

use super::AppState;
use crate::middleware::RequestId;

/// `POST /analyze`. Always 200 with a `{"coupons": [...]}` body; failures
/// are logged and answered with an empty list.
pub(super) async fn analyze(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Json<AnalyzeResponse> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!(request_id = %req_id.0, error = %rejection.body_text(), "invalid analyze request");
            return Json(AnalyzeResponse::default());
        }
    };

    let (response, error) = couponhunt_agent::analyze(state.agent.as_ref(), &request).await;
    if let Some(error) = error {
        tracing::warn!(request_id = %req_id.0, url = %request.url, error = %error, "analyze degraded to empty result");
    }
    Json(response)
}

/// `POST /analyze_form`. Always 200 with a `{"form_fields": ...}` body;
/// failures are logged and answered with `form_fields: null`.
pub(super) async fn analyze_form(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<FormAnalyzeRequest>, JsonRejection>,
) -> Json<FormAnalyzeResponse> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!(request_id = %req_id.0, error = %rejection.body_text(), "invalid analyze_form request");
            return Json(FormAnalyzeResponse::empty());
        }
    };

    let (response, error) = couponhunt_agent::analyze_form(state.agent.as_ref(), &request).await;
    if let Some(error) = error {
        tracing::warn!(request_id = %req_id.0, error = %error, "analyze_form degraded to null result");
    }
    Json(response)
}
