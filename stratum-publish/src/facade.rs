//! Publish fan-out facade.

use crate::config::PublisherConfig;
use crate::error::PublishError;
use crate::message::PublishInfo;
use crate::traits::{MessageSink, SinkFactory};
use std::sync::Arc;
use stratum_cache::{CacheError, PartitionClients};
use stratum_core::PartitionDirectory;
use stratum_core::validation::{require_allowed_characters, require_non_empty};
use tracing::{debug, error, warn};

const MESSAGE_BUS: &str = "message-bus";
const EVENT_GRID: &str = "event-grid";

/// Fans one logical event out to the enabled broker backends.
///
/// Backend clients are resolved per partition through cached single-flight
/// construction, so concurrent publishes for a cold partition open one
/// authenticated session per backend, not one per request.
pub struct PublisherFacade {
    config: PublisherConfig,
    bus_factory: Arc<dyn SinkFactory>,
    grid_factory: Arc<dyn SinkFactory>,
    bus_clients: PartitionClients<Box<dyn MessageSink>>,
    grid_clients: PartitionClients<Box<dyn MessageSink>>,
}

impl PublisherFacade {
    /// Create a facade over the two backend factories
    pub fn new(
        config: PublisherConfig,
        directory: Arc<dyn PartitionDirectory>,
        bus_factory: Arc<dyn SinkFactory>,
        grid_factory: Arc<dyn SinkFactory>,
    ) -> Self {
        Self {
            config,
            bus_factory,
            grid_factory,
            bus_clients: PartitionClients::new(Arc::clone(&directory), MESSAGE_BUS),
            grid_clients: PartitionClients::new(directory, EVENT_GRID),
        }
    }

    /// The active configuration
    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    /// Publish one event for `partition_id` to every enabled backend.
    ///
    /// Both enabled sends are always attempted; a failure on one does not
    /// suppress the other. Every failure is logged, and the first one is
    /// returned once all attempts have completed.
    pub async fn publish(
        &self,
        partition_id: &str,
        info: &PublishInfo,
    ) -> Result<(), PublishError> {
        let partition_id = require_non_empty(Some(partition_id), "partition id")?;
        require_allowed_characters(partition_id, "partition id")?;

        if !self.config.bus_enabled && !self.config.grid_enabled {
            warn!(
                partition = partition_id,
                event = %info.id,
                "no publish backend enabled, dropping event"
            );
            return Ok(());
        }

        let mut first_failure = None;

        if self.config.bus_enabled {
            if let Err(err) = self
                .send_via(
                    &self.bus_clients,
                    &self.bus_factory,
                    partition_id,
                    &info.bus_topic,
                    "bus topic",
                    info,
                )
                .await
            {
                error!(
                    partition = partition_id,
                    sink = MESSAGE_BUS,
                    event = %info.id,
                    %err,
                    "publish failed"
                );
                first_failure.get_or_insert(err);
            }
        }

        if self.config.grid_enabled {
            if let Err(err) = self
                .send_via(
                    &self.grid_clients,
                    &self.grid_factory,
                    partition_id,
                    &info.grid_topic,
                    "grid topic",
                    info,
                )
                .await
            {
                error!(
                    partition = partition_id,
                    sink = EVENT_GRID,
                    event = %info.id,
                    %err,
                    "publish failed"
                );
                first_failure.get_or_insert(err);
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn send_via(
        &self,
        clients: &PartitionClients<Box<dyn MessageSink>>,
        factory: &Arc<dyn SinkFactory>,
        partition_id: &str,
        destination: &str,
        destination_field: &str,
        info: &PublishInfo,
    ) -> Result<(), PublishError> {
        let destination = require_non_empty(Some(destination), destination_field)?;

        let sink = clients
            .get_or_create(partition_id, |partition| async move {
                factory
                    .create(&partition)
                    .await
                    .map_err(|err| CacheError::Construction(err.to_string()))
            })
            .await?;

        debug!(
            partition = partition_id,
            sink = sink.name(),
            destination,
            batch = info.batch_size(),
            "sending event batch"
        );
        sink.send(destination, info).await
    }
}
