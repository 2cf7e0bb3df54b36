use crate::config::Config;
use crate::gateway_client::GatewayClient;
use crate::pipeline_client::PipelineClient;

/// Axum state for the ingest HTTP/WS surface — owns the two outbound
/// clients (Gateway, Pipeline) plus the sessions root. No shared mutable
/// state with the other services, per spec.md §5; cross-service
/// communication is over HTTP only.
pub struct IngestState {
    pub config: Config,
    pub gateway: GatewayClient,
    pub pipeline: PipelineClient,
}

impl IngestState {
    pub fn new(config: Config) -> Self {
        let gateway = GatewayClient::new(&config.gateway_url, config.http_timeout);
        let pipeline = PipelineClient::new(&config.pipeline_url, config.http_timeout);
        Self { config, gateway, pipeline }
    }
}
