// Application layer - Lifecycle use cases over the QuickSight capability set
pub mod dashboard_instantiator;
pub mod placeholder_resolver;
pub mod poller;
pub mod quicksight_client;
pub mod replicator;
pub mod template_archive;
pub mod template_exporter;

#[cfg(test)]
pub mod fake_client;
