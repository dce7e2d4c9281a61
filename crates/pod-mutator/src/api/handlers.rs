use axum::{Json, extract, extract::FromRequest, http::StatusCode};
use std::sync::Arc;
use tracing::{Span, debug, error, field::Empty, warn};

use crate::{
    admission_request::AdmissionRequest,
    admission_response::AdmissionResponse,
    api::{
        admission_review::{AdmissionReviewRequest, AdmissionReviewResponse},
        api_error::ApiError,
        state::ApiServerState,
    },
    errors::ResponseError,
};

// `axum::Json` with every rejection turned into a 400 Bad Request
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub(crate) struct JsonExtractor<T>(T);

#[tracing::instrument(
    name = "mutation",
    fields(
        host = crate::config::HOSTNAME.as_str(),
        request_uid = Empty,
        operation = Empty,
        kind = Empty,
        resource = Empty,
        name = Empty,
        namespace = Empty,
        allowed = Empty,
        mutated = Empty,
        response_code = Empty,
        response_message = Empty,
    ),
    skip_all
)]
/// Compute the patch for the object carried by an AdmissionReview.
pub(crate) async fn mutate_handler(
    extract::State(state): extract::State<Arc<ApiServerState>>,
    JsonExtractor(admission_review): JsonExtractor<AdmissionReviewRequest>,
) -> Result<Json<AdmissionReviewResponse>, (StatusCode, ApiError)> {
    debug!(admission_review = ?admission_review);

    let request = admission_review.request;
    record_request(&request);

    let evaluation = state.evaluator.evaluate(&request);
    if let Err(e) = &evaluation {
        warn!(error = %e, "rejecting request");
    }
    let response =
        AdmissionResponse::from_evaluation(request.uid, evaluation).map_err(handle_response_error)?;

    record_outcome(&response);

    let review = AdmissionReviewResponse::new(response);
    Ok(Json(review))
}

pub(crate) async fn readiness_handler() -> StatusCode {
    StatusCode::OK
}

fn record_request(request: &AdmissionRequest) {
    let span = Span::current();
    span.record("request_uid", request.uid.as_str());
    span.record("operation", request.operation.as_str());
    span.record("kind", request.kind.kind.as_str());
    span.record("resource", request.resource.to_string().as_str());
    if let Some(name) = &request.name {
        span.record("name", name.as_str());
    }
    if let Some(namespace) = &request.namespace {
        span.record("namespace", namespace.as_str());
    }
}

fn record_outcome(response: &AdmissionResponse) {
    let span = Span::current();
    span.record("allowed", response.allowed);
    span.record("mutated", response.patch.is_some());

    let Some(status) = &response.status else {
        return;
    };
    if let Some(code) = status.code {
        span.record("response_code", code);
    }
    if let Some(message) = status.message.as_deref() {
        span.record("response_message", message);
    }
}

fn handle_response_error(error: ResponseError) -> (StatusCode, ApiError) {
    error!(error = %error, "cannot build admission response");

    let status = StatusCode::INTERNAL_SERVER_ERROR;
    (
        status,
        ApiError {
            status,
            message: error.to_string(),
        },
    )
}
