use json_patch::PatchOperation;
use tracing::{debug, info};

use crate::admission_request::{AdmissionRequest, GroupVersionResource};
use crate::decoder::decode_pod;
use crate::errors::EvaluationError;
use crate::rules::MutationRule;

/// Computes the JSON patch to apply to the Pods submitted for admission.
///
/// The evaluator is built once at startup and shared by all the requests:
/// it holds no mutable state.
pub struct AdmissionEvaluator {
    target_resource: GroupVersionResource,
    ignored_namespaces: Vec<String>,
    rules: Vec<Box<dyn MutationRule>>,
}

impl AdmissionEvaluator {
    pub fn new(rules: Vec<Box<dyn MutationRule>>, ignored_namespaces: Vec<String>) -> Self {
        AdmissionEvaluator {
            target_resource: GroupVersionResource::pods(),
            ignored_namespaces,
            rules,
        }
    }

    /// Returns the operations produced by the triggered rules, in rule order.
    ///
    /// Requests about other resources, or targeting an ignored namespace,
    /// are admitted without changes. An object that cannot be decoded is an
    /// error.
    pub fn evaluate(
        &self,
        request: &AdmissionRequest,
    ) -> Result<Vec<PatchOperation>, EvaluationError> {
        if request.resource != self.target_resource {
            debug!(
                resource = %request.resource,
                expected = %self.target_resource,
                "unexpected resource, skipping mutation"
            );
            return Ok(Vec::new());
        }

        if let Some(namespace) = request
            .namespace
            .as_ref()
            .filter(|ns| self.ignored_namespaces.contains(ns))
        {
            debug!(
                namespace = namespace.as_str(),
                "ignored namespace, skipping mutation"
            );
            return Ok(Vec::new());
        }

        let mut pod = decode_pod(request.object.as_ref())?;
        pod.metadata.namespace = request.namespace.clone();
        let mut working_copy = pod.clone();

        let mut patches = Vec::new();
        for rule in &self.rules {
            // triggers are read from the submitted Pod, never from the working copy
            if !rule.is_triggered(&pod) {
                continue;
            }
            let operations = rule.mutate(&mut working_copy)?;
            info!(
                rule = rule.name(),
                operations = operations.len(),
                "mutation rule applied"
            );
            patches.extend(operations);
        }

        Ok(patches)
    }
}
