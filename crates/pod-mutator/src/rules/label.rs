use json_patch::PatchOperation;
use json_patch::jsonptr::PointerBuf;
use k8s_openapi::api::core::v1::Pod;

use super::{MutationRule, add_operation};
use crate::errors::EvaluationError;

const TRIGGER_ANNOTATION: &str = "append.label/enabled";

/// Adds the configured label, using its name as value too.
///
/// The whole label map is written back: an `add` on `/metadata/labels`
/// creates or replaces the map, so a partial map would drop the labels
/// already set on the Pod.
pub struct LabelRule {
    label_name: String,
}

impl LabelRule {
    pub fn new(label_name: String) -> Self {
        LabelRule { label_name }
    }
}

impl MutationRule for LabelRule {
    fn name(&self) -> &'static str {
        "label"
    }

    fn trigger_annotation(&self) -> &'static str {
        TRIGGER_ANNOTATION
    }

    fn mutate(&self, pod: &mut Pod) -> Result<Vec<PatchOperation>, EvaluationError> {
        let labels = pod.metadata.labels.get_or_insert_with(Default::default);
        labels.insert(self.label_name.clone(), self.label_name.clone());

        Ok(vec![add_operation(
            self.name(),
            PointerBuf::from_tokens(["metadata", "labels"]),
            labels,
        )?])
    }
}
