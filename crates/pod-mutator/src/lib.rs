pub mod admission_request;
pub mod admission_response;
pub mod api;
mod certs;
pub mod cli;
pub mod config;
pub mod decoder;
pub mod errors;
pub mod evaluator;
pub mod rules;
#[cfg(test)]
mod test_utils;
pub mod tracing;

use anyhow::Result;
use axum::{
    Router,
    routing::{get, post},
};
use axum_server::tls_rustls::RustlsConfig;
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;

use crate::api::{
    handlers::{mutate_handler, readiness_handler},
    state::ApiServerState,
};
use crate::config::Config;
use crate::evaluator::AdmissionEvaluator;
use crate::rules::default_rules;

/// Path the Kubernetes API server posts AdmissionReview objects to
pub const MUTATE_PATH: &str = "/api";

pub struct PodMutatorServer {
    router: Router,
    tls_config: Option<RustlsConfig>,
    addr: SocketAddr,
}

impl PodMutatorServer {
    pub async fn new_from_config(config: Config) -> Result<Self> {
        let evaluator = AdmissionEvaluator::new(
            default_rules(&config.mutation),
            config.ignored_namespaces,
        );
        let state = Arc::new(ApiServerState { evaluator });

        let tls_config = match &config.tls_config {
            Some(tls_config) => Some(certs::create_tls_config(tls_config).await?),
            None => None,
        };

        let router = Router::new()
            .route(MUTATE_PATH, post(mutate_handler))
            .route("/readiness", get(readiness_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http());

        Ok(Self {
            router,
            tls_config,
            addr: config.addr,
        })
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve requests until the listener fails. Binding errors are returned.
    pub async fn run(self) -> Result<()> {
        match self.tls_config {
            None => {
                ::tracing::info!(address = %self.addr, "started HTTP server");
                axum_server::bind(self.addr)
                    .serve(self.router.into_make_service())
                    .await?;
            }
            Some(tls_config) => {
                ::tracing::info!(address = %self.addr, "started HTTPS server");
                axum_server::bind_rustls(self.addr, tls_config)
                    .serve(self.router.into_make_service())
                    .await?;
            }
        }

        Ok(())
    }
}
