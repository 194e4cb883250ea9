//! [`AwsProvider`]: the production [`CloudProvider`].
//!
//! Not safe for concurrent use. The topic cache is a plain map owned by the
//! provider, and every mutating call takes `&mut self`.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use ruststack_provision_core::naming::dead_letter_queue_name;
use ruststack_provision_core::{CloudProvider, Config, ProviderError, Queue, Topic, ValidationError};
use tracing::{debug, info};

use crate::api::{Attributes, MessagingApi, SdkMessagingApi};
use crate::attributes::{
    POLICY, REDRIVE_POLICY, dead_letter_attributes, queue_attributes, subscription_attributes,
    topic_attributes,
};
use crate::policy::{PolicyDocument, RedrivePolicy};

/// ARN of an SQS queue.
#[must_use]
pub fn sqs_arn(region: &str, account_id: &str, queue_name: &str) -> String {
    format!("arn:aws:sqs:{region}:{account_id}:{queue_name}")
}

/// Creates SNS topics and SQS queues through a [`MessagingApi`].
#[derive(Debug)]
pub struct AwsProvider<A = SdkMessagingApi> {
    api: A,
    region: String,
    account_id: String,
    /// Full topic name → ARN, for topics created during this run.
    topic_cache: HashMap<String, String>,
    cache_hits: usize,
}

impl AwsProvider<SdkMessagingApi> {
    /// Load AWS credentials from the default chain and build SDK clients for
    /// the configured region, optionally against a custom endpoint.
    pub async fn connect(
        config: &Config,
        endpoint_url: Option<&str>,
    ) -> Result<Self, ValidationError> {
        check_identity(&config.region, &config.account_id)?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let Some(url) = endpoint_url {
            loader = loader.endpoint_url(url);
        }
        let sdk_config = loader.load().await;
        info!(
            region = %config.region,
            endpoint_url = endpoint_url.unwrap_or("default"),
            "initialized AWS provider",
        );

        Self::with_api(
            SdkMessagingApi::new(&sdk_config),
            &config.region,
            &config.account_id,
        )
    }
}

impl<A: MessagingApi> AwsProvider<A> {
    /// Build a provider over an arbitrary [`MessagingApi`].
    pub fn with_api(api: A, region: &str, account_id: &str) -> Result<Self, ValidationError> {
        check_identity(region, account_id)?;
        Ok(Self {
            api,
            region: region.to_owned(),
            account_id: account_id.to_owned(),
            topic_cache: HashMap::new(),
            cache_hits: 0,
        })
    }

    /// The underlying API.
    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// ARN of a topic already created in this run.
    #[must_use]
    pub fn cached_topic_arn(&self, full_name: &str) -> Option<&str> {
        self.topic_cache.get(full_name).map(String::as_str)
    }

    /// How many `create_topic` calls were answered from the cache.
    #[must_use]
    pub fn cache_hits(&self) -> usize {
        self.cache_hits
    }

    fn queue_arn(&self, queue_name: &str) -> String {
        sqs_arn(&self.region, &self.account_id, queue_name)
    }

    /// Create the DLQ and add the matching redrive policy to `attributes`.
    async fn create_dead_letter_queue(
        &self,
        queue: &Queue,
        dlq_name: &str,
        attributes: &mut Attributes,
    ) -> Result<(), ProviderError> {
        let dlq_url = self
            .api
            .create_queue(dlq_name, dead_letter_attributes(queue.fifo))
            .await?;
        info!(
            queue = %queue.full_name,
            dlq = %dlq_name,
            url = %dlq_url,
            "dead-letter queue created",
        );

        let redrive = RedrivePolicy::new(
            self.queue_arn(dlq_name),
            queue.dead_letter_queue.max_receive_count,
        );
        attributes.insert(REDRIVE_POLICY.to_owned(), serde_json::to_string(&redrive)?);
        Ok(())
    }

    async fn subscribe_queue(
        &mut self,
        queue: &Queue,
        queue_url: &str,
        topics: &[Topic],
    ) -> Result<(), ProviderError> {
        if topics.is_empty() {
            return Ok(());
        }
        let queue_arn = self.queue_arn(&queue.full_name);
        let mut topic_arns = Vec::with_capacity(topics.len());

        for topic in topics {
            let topic_arn = self
                .create_topic(topic)
                .await
                .map_err(|e| {
                    e.context(format!("failed to create topic {:?}", topic.full_name))
                })?;

            let subscription = self
                .api
                .subscribe(&topic_arn, &queue_arn, subscription_attributes())
                .await
                .map_err(|e| {
                    e.context(format!(
                        "failed to subscribe queue {:?} to topic {:?}",
                        queue.full_name, topic.full_name
                    ))
                })?;
            info!(
                queue = %queue.full_name,
                topic = %topic.full_name,
                subscription = subscription.as_deref().unwrap_or("pending"),
                "queue subscribed",
            );

            topic_arns.push(topic_arn);
        }

        self.attach_access_policy(queue_url, &queue_arn, &topic_arns)
            .await
            .map_err(|e| {
                e.context(format!(
                    "failed to attach access policy to queue {:?}",
                    queue.full_name
                ))
            })
    }

    async fn attach_access_policy(
        &self,
        queue_url: &str,
        queue_arn: &str,
        topic_arns: &[String],
    ) -> Result<(), ProviderError> {
        let document = PolicyDocument::allow_sns_send(queue_arn, topic_arns);
        let policy = serde_json::to_string(&document)?;
        debug!(queue_arn, policy = %policy, "attaching access policy");
        self.api
            .set_queue_attributes(queue_url, Attributes::from([(POLICY.to_owned(), policy)]))
            .await
    }
}

#[async_trait]
impl<A: MessagingApi> CloudProvider for AwsProvider<A> {
    async fn create_topic(&mut self, topic: &Topic) -> Result<String, ProviderError> {
        if let Some(arn) = self.topic_cache.get(&topic.full_name) {
            self.cache_hits += 1;
            debug!(topic = %topic.full_name, %arn, "reusing topic created earlier in this run");
            return Ok(arn.clone());
        }

        let arn = self
            .api
            .create_topic(&topic.full_name, topic_attributes(topic))
            .await?;
        info!(topic = %topic.full_name, %arn, "topic created");
        self.topic_cache.insert(topic.full_name.clone(), arn.clone());
        Ok(arn)
    }

    async fn create_queue(&mut self, queue: &Queue) -> Result<String, ProviderError> {
        let mut attributes = queue_attributes(queue);

        if let Some(dlq_name) = dead_letter_queue_name(queue) {
            self.create_dead_letter_queue(queue, &dlq_name, &mut attributes)
                .await
                .map_err(|e| {
                    e.context(format!(
                        "failed to create DLQ for queue {:?}",
                        queue.full_name
                    ))
                })?;
        }

        debug!(queue = %queue.full_name, ?attributes, "creating queue");
        let url = self.api.create_queue(&queue.full_name, attributes).await?;

        self.subscribe_queue(queue, &url, &queue.sns_topics)
            .await
            .map_err(|e| {
                e.context(format!(
                    "failed to process subscriptions for queue {:?}",
                    queue.full_name
                ))
            })?;

        Ok(url)
    }

    async fn subscribe(&mut self, queue: &Queue, topics: &[Topic]) -> Result<(), ProviderError> {
        let url = queue
            .url
            .as_deref()
            .ok_or_else(|| ProviderError::MissingQueueUrl(queue.full_name.clone()))?;
        self.subscribe_queue(queue, url, topics).await
    }
}

fn check_identity(region: &str, account_id: &str) -> Result<(), ValidationError> {
    if region.is_empty() {
        return Err(ValidationError::new("region is missing"));
    }
    if account_id.is_empty() {
        return Err(ValidationError::new("account ID is missing"));
    }
    Ok(())
}
