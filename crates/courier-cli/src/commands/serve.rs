use std::sync::Arc;

use axum::{routing::get, Json, Router};
use clap::Args;
use courier_contact::{
    configure_routes, run_worker, AppState, ContactApiDoc, ContactConfig, DispatchMode,
    EngineDeliverer, SubmissionQueue, SubmissionService,
};
use courier_delivery::{CredentialSet, DeliveryConfig, DeliveryEngine};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa::OpenApi;

/// Queue depth for background dispatch
const QUEUE_BUFFER_SIZE: usize = 64;

#[derive(Args)]
pub struct ServeCommand {
    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1:8080", env = "COURIER_ADDRESS")]
    pub address: String,
}

impl ServeCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(self.run())
    }

    async fn run(self) -> anyhow::Result<()> {
        let contact_config = ContactConfig::from_env()?;
        let delivery_config = DeliveryConfig::from_env()?;
        let credentials = CredentialSet::from_env()?;

        if credentials.usable_len() == 0 {
            // Startup still succeeds; every submission will fail with
            // an unconfigured response until keys are provided
            warn!("No mail provider configured, set COURIER_BREVO_API_KEY, COURIER_MAILJET_API_KEY or COURIER_RESEND_API_KEY");
        } else {
            info!("{} mail provider(s) configured", credentials.usable_len());
        }

        let engine = DeliveryEngine::new(delivery_config)?;
        let deliverer = Arc::new(EngineDeliverer::new(engine, credentials));
        let service = SubmissionService::new(deliverer, contact_config.clone());

        let queue = match contact_config.dispatch {
            DispatchMode::Background => {
                info!("Background dispatch enabled");
                let (queue, receiver) = SubmissionQueue::create_channel(QUEUE_BUFFER_SIZE);
                tokio::spawn(run_worker(service.clone(), receiver));
                Some(queue)
            }
            DispatchMode::Inline => None,
        };

        let state = Arc::new(AppState { service, queue });

        let app = configure_routes()
            .with_state(state)
            .merge(openapi_routes())
            .layer(TraceLayer::new_for_http());

        let listener = TcpListener::bind(&self.address).await?;
        info!(
            "Courier server listening on {} ({} dispatch)",
            self.address, contact_config.dispatch
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Courier server exited");
        Ok(())
    }
}

fn openapi_routes() -> Router {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ContactApiDoc::openapi()) }),
    )
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for ctrl-c signal");
    info!("Shutdown signal received");
}
