use axum::Router;
use pod_mutator::{
    PodMutatorServer,
    config::{Config, MutationSettings},
};
use std::net::SocketAddr;

pub(crate) const LABEL_NAME: &str = "team";
pub(crate) const SIDECAR_IMAGE: &str = "registry.local/sidecar:v1";

pub(crate) fn default_test_config() -> Config {
    Config {
        addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
        tls_config: None,
        mutation: MutationSettings {
            label_name: LABEL_NAME.to_owned(),
            sidecar_image: SIDECAR_IMAGE.to_owned(),
        },
        ignored_namespaces: vec!["kube-system".to_owned(), "kube-public".to_owned()],
        log_level: "info".to_owned(),
        log_fmt: "json".to_owned(),
        log_no_color: false,
    }
}

pub(crate) async fn app(config: Config) -> Router {
    let server = PodMutatorServer::new_from_config(config).await.unwrap();

    server.router()
}
