use k8s_openapi::Resource;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::runtime::RawExtension;
use serde_json::Value;

use crate::errors::DecodeError;

/// Decode the object embedded inside of an admission request into a Pod.
///
/// Objects declaring a type other than `v1/Pod` are rejected. The type
/// meta fields are optional: when they are missing the structure alone
/// decides. Missing `labels` and `annotations` are kept as `None`.
pub fn decode_pod(object: Option<&RawExtension>) -> Result<Pod, DecodeError> {
    let RawExtension(value) = object.ok_or(DecodeError::MissingObject)?;

    let api_version = value.get("apiVersion").and_then(Value::as_str);
    let kind = value.get("kind").and_then(Value::as_str);
    let unexpected_api_version = api_version.is_some_and(|v| v != Pod::API_VERSION);
    let unexpected_kind = kind.is_some_and(|k| k != Pod::KIND);
    if unexpected_api_version || unexpected_kind {
        return Err(DecodeError::UnexpectedType {
            api_version: api_version.unwrap_or_default().to_owned(),
            kind: kind.unwrap_or_default().to_owned(),
        });
    }

    serde_json::from_value(value.clone()).map_err(DecodeError::Deserialize)
}
