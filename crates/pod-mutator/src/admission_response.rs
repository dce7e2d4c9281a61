use base64::{Engine as _, engine::general_purpose};
use json_patch::PatchOperation;
use serde::{Deserialize, Serialize};

use crate::errors::{EvaluationError, ResponseError};

/// The `response` half of an `admission.k8s.io/v1` AdmissionReview.
///
/// Optional fields are left out of the JSON document when unset, the API
/// server treats a missing `patch` as "no changes".
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionResponse {
    /// Echo of the request uid
    pub uid: String,

    pub allowed: bool,

    /// Set only when `patch` is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch_type: Option<PatchType>,

    /// Base64 encoded RFC 6902 document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,

    /// Why the request was rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AdmissionResponseStatus>,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq, Clone)]
pub enum PatchType {
    #[default]
    #[serde(rename = "JSONPatch")]
    JSONPatch,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq, Clone)]
pub struct AdmissionResponseStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

impl AdmissionResponse {
    pub fn reject(uid: String, message: String, code: u16) -> Self {
        let status = AdmissionResponseStatus {
            message: Some(message),
            code: Some(code),
        };

        Self {
            uid,
            allowed: false,
            patch_type: None,
            patch: None,
            status: Some(status),
        }
    }

    /// Allow the request, attaching the patch when there's something to change
    pub fn from_patch(
        uid: String,
        patches: Vec<PatchOperation>,
    ) -> Result<AdmissionResponse, ResponseError> {
        if patches.is_empty() {
            return Ok(AdmissionResponse {
                uid,
                allowed: true,
                ..Default::default()
            });
        }

        let patch = serde_json::to_string(&json_patch::Patch(patches))
            .map(|s| general_purpose::STANDARD.encode(s))
            .map_err(ResponseError::SerializePatch)?;

        Ok(AdmissionResponse {
            uid,
            allowed: true,
            patch_type: Some(PatchType::JSONPatch),
            patch: Some(patch),
            status: None,
        })
    }

    pub fn from_evaluation(
        uid: String,
        evaluation: Result<Vec<PatchOperation>, EvaluationError>,
    ) -> Result<AdmissionResponse, ResponseError> {
        match evaluation {
            Ok(patches) => AdmissionResponse::from_patch(uid, patches),
            Err(e) => Ok(AdmissionResponse::reject(uid, e.to_string(), 400)),
        }
    }
}
