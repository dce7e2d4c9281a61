use json_patch::jsonptr::PointerBuf;
use json_patch::{AddOperation, PatchOperation};
use k8s_openapi::api::core::v1::Pod;
use serde::Serialize;

use crate::config::MutationSettings;
use crate::errors::EvaluationError;

mod label;
mod sidecar;

pub use label::LabelRule;
pub use sidecar::SidecarRule;

/// Value the trigger annotation must have for a rule to fire
pub const TRIGGER_VALUE: &str = "true";

/// A mutation applied to Pods that opt in through an annotation.
///
/// `mutate` receives the working copy of the Pod shared by all the rules
/// of one evaluation. Each returned operation carries the complete final
/// value of its path, computed against the Pod as it was submitted: the
/// operations of one response never depend on each other.
pub trait MutationRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn trigger_annotation(&self) -> &'static str;

    fn mutate(&self, pod: &mut Pod) -> Result<Vec<PatchOperation>, EvaluationError>;

    fn is_triggered(&self, pod: &Pod) -> bool {
        pod.metadata
            .annotations
            .as_ref()
            .and_then(|annotations| annotations.get(self.trigger_annotation()))
            .is_some_and(|value| value == TRIGGER_VALUE)
    }
}

/// Build the rules in the order they are evaluated
pub fn default_rules(settings: &MutationSettings) -> Vec<Box<dyn MutationRule>> {
    vec![
        Box::new(LabelRule::new(settings.label_name.clone())),
        Box::new(SidecarRule::new(settings.sidecar_image.clone())),
    ]
}

fn add_operation<T: Serialize>(
    rule: &'static str,
    path: PointerBuf,
    value: &T,
) -> Result<PatchOperation, EvaluationError> {
    let value = serde_json::to_value(value)
        .map_err(|source| EvaluationError::PatchValue { rule, source })?;

    Ok(PatchOperation::Add(AddOperation { path, value }))
}
