use std::collections::BTreeMap;

use json_patch::PatchOperation;
use json_patch::jsonptr::PointerBuf;
use k8s_openapi::api::core::v1::{
    Container, EmptyDirVolumeSource, Pod, ResourceRequirements, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

use super::{MutationRule, add_operation};
use crate::errors::EvaluationError;

const TRIGGER_ANNOTATION: &str = "append.sidecar/enabled";

pub const INIT_CONTAINER_NAME: &str = "sidecar-init";
pub const VOLUME_NAME: &str = "sidecar-volume";
pub const MOUNT_PATH: &str = "/soft";
const PAYLOAD_PATH: &str = "/opt/sidecar/payload";

/// Ships a payload binary to every container of the Pod.
///
/// An init container copies the payload from its image into a shared
/// `emptyDir` volume, which is then mounted by all the regular containers.
pub struct SidecarRule {
    image: String,
}

impl SidecarRule {
    pub fn new(image: String) -> Self {
        SidecarRule { image }
    }

    fn init_container(&self) -> Container {
        Container {
            name: INIT_CONTAINER_NAME.to_owned(),
            image: Some(self.image.clone()),
            image_pull_policy: Some("Never".to_owned()),
            resources: Some(ResourceRequirements {
                requests: Some(resource_list("10m", "20Mi")),
                limits: Some(resource_list("30m", "50Mi")),
                ..Default::default()
            }),
            volume_mounts: Some(vec![volume_mount()]),
            command: Some(
                ["cp", "-rf", PAYLOAD_PATH, "/soft/"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            ),
            ..Default::default()
        }
    }
}

fn resource_list(cpu: &str, memory: &str) -> BTreeMap<String, Quantity> {
    BTreeMap::from([
        ("cpu".to_owned(), Quantity(cpu.to_owned())),
        ("memory".to_owned(), Quantity(memory.to_owned())),
    ])
}

fn volume_mount() -> VolumeMount {
    VolumeMount {
        name: VOLUME_NAME.to_owned(),
        mount_path: MOUNT_PATH.to_owned(),
        ..Default::default()
    }
}

impl MutationRule for SidecarRule {
    fn name(&self) -> &'static str {
        "sidecar"
    }

    fn trigger_annotation(&self) -> &'static str {
        TRIGGER_ANNOTATION
    }

    fn mutate(&self, pod: &mut Pod) -> Result<Vec<PatchOperation>, EvaluationError> {
        let spec = pod.spec.get_or_insert_with(Default::default);
        let mut patches = Vec::with_capacity(2 * spec.containers.len() + 2);

        let init_containers = spec.init_containers.get_or_insert_with(Vec::new);
        init_containers.push(self.init_container());
        patches.push(add_operation(
            self.name(),
            PointerBuf::from_tokens(["spec", "initContainers"]),
            init_containers,
        )?);

        for (index, container) in spec.containers.iter_mut().enumerate() {
            let index = index.to_string();

            let volume_mounts = container.volume_mounts.get_or_insert_with(Vec::new);
            volume_mounts.push(volume_mount());
            patches.push(add_operation(
                self.name(),
                PointerBuf::from_tokens(["spec", "containers", index.as_str(), "volumeMounts"]),
                volume_mounts,
            )?);

            // always emitted, an empty list when the container has no environment
            let env = container.env.clone().unwrap_or_default();
            patches.push(add_operation(
                self.name(),
                PointerBuf::from_tokens(["spec", "containers", index.as_str(), "env"]),
                &env,
            )?);
        }

        let volumes = spec.volumes.get_or_insert_with(Vec::new);
        volumes.push(Volume {
            name: VOLUME_NAME.to_owned(),
            empty_dir: Some(EmptyDirVolumeSource::default()),
            ..Default::default()
        });
        patches.push(add_operation(
            self.name(),
            PointerBuf::from_tokens(["spec", "volumes"]),
            volumes,
        )?);

        Ok(patches)
    }
}
