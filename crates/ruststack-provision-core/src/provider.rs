//! Cloud provider capability consumed by the [`crate::Provisioner`].

use async_trait::async_trait;

use crate::config::{Queue, Topic};
use crate::error::ProviderError;

/// Capability for creating messaging resources in a cloud account.
///
/// Implementations are not required to be safe for concurrent use: every
/// method takes `&mut self`, and the provisioner awaits each call before
/// issuing the next. Names passed in are already fully resolved.
#[async_trait]
pub trait CloudProvider: Send {
    /// Create a topic, or return the ARN of one already created in this run.
    async fn create_topic(&mut self, topic: &Topic) -> Result<String, ProviderError>;

    /// Create a queue and everything hanging off it, returning the queue URL.
    ///
    /// One logical operation: build attributes, create and link the DLQ when
    /// enabled, create the queue, then [`subscribe`](Self::subscribe) it to its
    /// topics.
    async fn create_queue(&mut self, queue: &Queue) -> Result<String, ProviderError>;

    /// Subscribe an existing queue to `topics` and grant them send access.
    async fn subscribe(&mut self, queue: &Queue, topics: &[Topic]) -> Result<(), ProviderError>;
}
