//! Provisioning orchestrator.
//!
//! [`Provisioner`] drives a single run: it re-validates the configuration,
//! creates top-level topics in order, then creates each queue (with its DLQ
//! and subscriptions) in order. Calls are strictly sequential and the first
//! failure aborts the run. Nothing is rolled back.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{ProviderError, ProvisionError, ResourceKind};
use crate::naming;
use crate::provider::CloudProvider;

/// Drives one provisioning run against a [`CloudProvider`].
#[derive(Debug)]
pub struct Provisioner<P> {
    provider: P,
    config: Config,
    cancel: CancellationToken,
}

impl<P: CloudProvider> Provisioner<P> {
    /// Create a provisioner for `config`.
    #[must_use]
    pub fn new(provider: P, config: Config) -> Self {
        Self {
            provider,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Abort pending and future provider calls once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// The configuration, including names and URLs derived so far.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The underlying provider.
    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Tear down into the provider and the resolved configuration.
    #[must_use]
    pub fn into_parts(self) -> (P, Config) {
        (self.provider, self.config)
    }

    /// Provision every configured topic and queue.
    pub async fn run(&mut self) -> Result<(), ProvisionError> {
        self.config.validate()?;

        let Config {
            prefix,
            environment,
            queues,
            sns_topics,
            ..
        } = &mut self.config;

        if sns_topics.is_empty() && queues.is_empty() {
            info!("no topics or queues configured, nothing to provision");
            return Ok(());
        }

        for topic in sns_topics.iter_mut() {
            naming::resolve_topic(topic, prefix, environment);
            let arn = cancellable(&self.cancel, self.provider.create_topic(topic))
                .await
                .map_err(|source| {
                    ProvisionError::provisioning(ResourceKind::Topic, &topic.full_name, source)
                })?;
            info!(topic = %topic.full_name, %arn, "topic provisioned");
        }

        for queue in queues.iter_mut() {
            naming::resolve_queue(queue, prefix, environment);
            debug!(
                queue = %queue.full_name,
                message_retention_seconds = queue.message_retention_seconds,
                visibility_timeout_seconds = queue.visibility_timeout_seconds,
                dead_letter_queue = queue.dead_letter_queue.enabled,
                topics = queue.sns_topics.len(),
                "resolved queue",
            );
            let url = cancellable(&self.cancel, self.provider.create_queue(queue))
                .await
                .map_err(|source| {
                    ProvisionError::provisioning(ResourceKind::Queue, &queue.full_name, source)
                })?;
            info!(queue = %queue.full_name, %url, "queue provisioned");
            queue.url = Some(url);
        }

        info!(
            topics = sns_topics.len(),
            queues = queues.len(),
            "provisioning complete",
        );
        Ok(())
    }
}

/// Race a provider call against the run's cancellation token.
async fn cancellable<T, F>(token: &CancellationToken, call: F) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    tokio::select! {
        biased;
        () = token.cancelled() => Err(ProviderError::Cancelled),
        result = call => result,
    }
}
