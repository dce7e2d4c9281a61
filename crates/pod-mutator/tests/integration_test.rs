mod common;

use axum::{
    body::Body,
    http::{self, Request, header},
};
use base64::{Engine as _, engine::general_purpose};
use http_body_util::BodyExt;
use pod_mutator::{
    admission_response::PatchType, api::admission_review::AdmissionReviewResponse,
};
use rstest::*;
use serde_json::{Value, json};
use tower::ServiceExt;

use common::{LABEL_NAME, SIDECAR_IMAGE, app, default_test_config};

fn mutate_request(payload: String) -> Request<Body> {
    Request::builder()
        .method(http::Method::POST)
        .header(header::CONTENT_TYPE, "application/json")
        .uri("/api")
        .body(Body::from(payload))
        .unwrap()
}

async fn send(payload: String) -> AdmissionReviewResponse {
    let app = app(default_test_config()).await;

    let response = app.oneshot(mutate_request(payload)).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );

    serde_json::from_slice(&response.into_body().collect().await.unwrap().to_bytes()).unwrap()
}

fn decode_patch(admission_review_response: &AdmissionReviewResponse) -> Value {
    let patch = admission_review_response
        .response
        .patch
        .as_ref()
        .expect("patch should be set");

    serde_json::from_slice(&general_purpose::STANDARD.decode(patch).unwrap()).unwrap()
}

fn with_request_field(payload: &str, field: &str, value: Value) -> String {
    let mut admission_review: Value = serde_json::from_str(payload).unwrap();
    admission_review["request"][field] = value;

    admission_review.to_string()
}

#[tokio::test]
async fn test_label_mutation() {
    let admission_review_response =
        send(include_str!("data/pod_label_enabled.json").to_owned()).await;

    assert_eq!(
        admission_review_response.api_version.as_deref(),
        Some("admission.k8s.io/v1")
    );
    assert_eq!(
        admission_review_response.kind.as_deref(),
        Some("AdmissionReview")
    );
    assert_eq!(
        admission_review_response.response.uid,
        "4b1c3a6e-7c8d-4f0a-9b52-0f6d2e1a7c11"
    );
    assert!(admission_review_response.response.allowed);
    assert_eq!(
        admission_review_response.response.patch_type,
        Some(PatchType::JSONPatch)
    );
    assert_eq!(
        decode_patch(&admission_review_response),
        json!([{
            "op": "add",
            "path": "/metadata/labels",
            "value": {LABEL_NAME: LABEL_NAME}
        }])
    );
}

#[tokio::test]
async fn test_sidecar_mutation() {
    let admission_review_response =
        send(include_str!("data/pod_sidecar_enabled.json").to_owned()).await;

    assert!(admission_review_response.response.allowed);
    assert_eq!(
        admission_review_response.response.uid,
        "9e0f2d3c-1b4a-4c6e-8d7f-2a5b6c7d8e90"
    );

    let patch = decode_patch(&admission_review_response);
    let operations = patch.as_array().unwrap();

    // label + init containers + 2 operations for each of the 2 containers + volumes
    assert_eq!(operations.len(), 1 + 1 + 2 * 2 + 1);
    assert!(operations.iter().all(|op| op["op"] == "add"));

    assert_eq!(operations[0]["path"], "/metadata/labels");
    assert_eq!(
        operations[0]["value"],
        json!({"app": "shop", LABEL_NAME: LABEL_NAME})
    );

    assert_eq!(operations[1]["path"], "/spec/initContainers");
    let init_containers = operations[1]["value"].as_array().unwrap();
    assert_eq!(init_containers.len(), 2);
    assert_eq!(init_containers[0]["name"], "migrate");
    assert_eq!(init_containers[1]["name"], "sidecar-init");
    assert_eq!(init_containers[1]["image"], SIDECAR_IMAGE);

    assert_eq!(operations[2]["path"], "/spec/containers/0/volumeMounts");
    assert_eq!(
        operations[2]["value"],
        json!([
            {"name": "config", "mountPath": "/etc/shop"},
            {"name": "sidecar-volume", "mountPath": "/soft"}
        ])
    );
    assert_eq!(operations[3]["path"], "/spec/containers/0/env");
    assert_eq!(operations[3]["value"], json!([{"name": "PORT", "value": "8080"}]));
    assert_eq!(operations[4]["path"], "/spec/containers/1/volumeMounts");
    assert_eq!(
        operations[4]["value"],
        json!([{"name": "sidecar-volume", "mountPath": "/soft"}])
    );
    assert_eq!(operations[5]["path"], "/spec/containers/1/env");
    assert_eq!(operations[5]["value"], json!([]));

    assert_eq!(operations[6]["path"], "/spec/volumes");
    assert_eq!(
        operations[6]["value"],
        json!([
            {"name": "config", "configMap": {"name": "shop"}},
            {"name": "sidecar-volume", "emptyDir": {}}
        ])
    );
}

#[tokio::test]
async fn test_pod_without_annotations_is_not_mutated() {
    let payload = include_str!("data/pod_label_enabled.json");
    let mut admission_review: Value = serde_json::from_str(payload).unwrap();
    admission_review["request"]["object"]["metadata"]
        .as_object_mut()
        .unwrap()
        .remove("annotations");

    let admission_review_response = send(admission_review.to_string()).await;

    assert!(admission_review_response.response.allowed);
    assert!(admission_review_response.response.patch.is_none());
    assert!(admission_review_response.response.patch_type.is_none());
    assert!(admission_review_response.response.status.is_none());
}

#[tokio::test]
async fn test_other_resources_are_admitted_unchanged() {
    let admission_review_response = send(include_str!("data/deployment.json").to_owned()).await;

    assert_eq!(
        admission_review_response.response.uid,
        "0c5d8a1f-3e2b-4d7c-9a6f-1b2c3d4e5f60"
    );
    assert!(admission_review_response.response.allowed);
    assert!(admission_review_response.response.patch.is_none());
    assert!(admission_review_response.response.patch_type.is_none());
}

#[rstest]
#[case::kube_system("kube-system")]
#[case::kube_public("kube-public")]
#[tokio::test]
async fn test_ignored_namespaces(#[case] namespace: &str) {
    let payload = with_request_field(
        include_str!("data/pod_sidecar_enabled.json"),
        "namespace",
        json!(namespace),
    );

    let admission_review_response = send(payload).await;

    assert!(admission_review_response.response.allowed);
    assert!(admission_review_response.response.patch.is_none());
}

#[tokio::test]
async fn test_malformed_object_is_rejected() {
    let admission_review_response = send(include_str!("data/pod_malformed.json").to_owned()).await;

    assert_eq!(
        admission_review_response.response.uid,
        "6a7b8c9d-0e1f-4a2b-8c3d-4e5f6a7b8c9d"
    );
    assert!(!admission_review_response.response.allowed);
    assert!(admission_review_response.response.patch.is_none());
    assert!(admission_review_response.response.patch_type.is_none());

    let status = admission_review_response
        .response
        .status
        .expect("status should be filled");
    assert_eq!(status.code, Some(400));
    assert!(
        status
            .message
            .expect("message should be filled")
            .starts_with("could not deserialize pod object")
    );
}

#[tokio::test]
async fn test_missing_object_is_rejected() {
    let payload = with_request_field(
        include_str!("data/pod_label_enabled.json"),
        "object",
        Value::Null,
    );

    let admission_review_response = send(payload).await;

    assert!(!admission_review_response.response.allowed);
    assert!(admission_review_response.response.patch.is_none());
}

#[tokio::test]
async fn test_mutation_is_deterministic() {
    let payload = include_str!("data/pod_sidecar_enabled.json").to_owned();

    let first = send(payload.clone()).await;
    let second = send(payload).await;

    assert_eq!(first.response.patch, second.response.patch);
    assert!(first.response.patch.is_some());
}

#[rstest]
#[case::empty_object("{}")]
#[case::not_json("this is not an AdmissionReview")]
#[case::request_without_uid(r#"{"request": {"operation": "CREATE"}}"#)]
#[tokio::test]
async fn test_invalid_payload(#[case] payload: &str) {
    let app = app(default_test_config()).await;

    let response = app
        .oneshot(mutate_request(payload.to_owned()))
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value =
        serde_json::from_slice(&response.into_body().collect().await.unwrap().to_bytes()).unwrap();
    assert_eq!(body["status"], 400);
    assert!(!body["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_content_type() {
    let app = app(default_test_config()).await;

    let request = Request::builder()
        .method(http::Method::POST)
        .uri("/api")
        .body(Body::from(include_str!("data/pod_label_enabled.json")))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_get_is_not_allowed() {
    let app = app(default_test_config()).await;

    let request = Request::builder()
        .method(http::Method::GET)
        .uri("/api")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), 405);
}

#[tokio::test]
async fn test_readiness() {
    let app = app(default_test_config()).await;

    let request = Request::builder()
        .method(http::Method::GET)
        .uri("/readiness")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), 200);
}
