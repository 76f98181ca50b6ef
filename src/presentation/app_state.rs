// Services wired over one QuickSightClient
use crate::application::dashboard_instantiator::DashboardInstantiator;
use crate::application::placeholder_resolver::PlaceholderResolver;
use crate::application::poller::PollPolicy;
use crate::application::quicksight_client::QuickSightClient;
use crate::application::replicator::CrossAccountReplicator;
use crate::application::template_exporter::TemplateExporter;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub exporter: TemplateExporter,
    pub resolver: PlaceholderResolver,
    pub instantiator: DashboardInstantiator,
    pub replicator: CrossAccountReplicator,
}

impl AppState {
    pub fn new(client: Arc<dyn QuickSightClient>, poll: PollPolicy) -> Self {
        let resolver = PlaceholderResolver::new(client.clone());
        let instantiator = DashboardInstantiator::new(client.clone(), poll);
        Self {
            exporter: TemplateExporter::new(client.clone(), poll),
            replicator: CrossAccountReplicator::new(client, resolver.clone(), instantiator.clone()),
            resolver,
            instantiator,
        }
    }
}
