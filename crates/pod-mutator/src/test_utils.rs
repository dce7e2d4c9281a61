use k8s_openapi::apimachinery::pkg::runtime::RawExtension;

use crate::admission_request::{AdmissionRequest, GroupVersionKind, GroupVersionResource};

pub(crate) fn build_admission_request(
    namespace: &str,
    object: serde_json::Value,
) -> AdmissionRequest {
    AdmissionRequest {
        uid: "705ab4f5-6393-11e8-b7cc-42010a800002".to_owned(),
        kind: GroupVersionKind {
            group: String::new(),
            version: "v1".to_owned(),
            kind: "Pod".to_owned(),
        },
        resource: GroupVersionResource::pods(),
        sub_resource: None,
        request_kind: None,
        request_resource: None,
        request_sub_resource: None,
        name: Some("web".to_owned()),
        namespace: Some(namespace.to_owned()),
        operation: "CREATE".to_owned(),
        user_info: Default::default(),
        object: Some(RawExtension(object)),
        old_object: None,
        dry_run: Some(false),
        options: None,
    }
}
