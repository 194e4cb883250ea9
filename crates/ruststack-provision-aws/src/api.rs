//! Thin seam over the SNS and SQS SDK clients.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use aws_sdk_sqs::types::QueueAttributeName;
use ruststack_provision_core::ProviderError;

/// Attribute map passed to create/set calls, ordered for stable logging.
pub type Attributes = BTreeMap<String, String>;

/// The four SNS/SQS operations provisioning needs.
#[async_trait]
pub trait MessagingApi: Send + Sync {
    /// `sns:CreateTopic`; returns the topic ARN.
    async fn create_topic(&self, name: &str, attributes: Attributes)
    -> Result<String, ProviderError>;

    /// `sqs:CreateQueue`; returns the queue URL.
    async fn create_queue(&self, name: &str, attributes: Attributes)
    -> Result<String, ProviderError>;

    /// `sns:Subscribe`; returns the subscription ARN when one is reported.
    async fn subscribe(
        &self,
        topic_arn: &str,
        endpoint: &str,
        attributes: Attributes,
    ) -> Result<Option<String>, ProviderError>;

    /// `sqs:SetQueueAttributes`.
    async fn set_queue_attributes(
        &self,
        queue_url: &str,
        attributes: Attributes,
    ) -> Result<(), ProviderError>;
}

/// [`MessagingApi`] backed by the AWS SDK clients.
#[derive(Debug, Clone)]
pub struct SdkMessagingApi {
    sns: aws_sdk_sns::Client,
    sqs: aws_sdk_sqs::Client,
}

impl SdkMessagingApi {
    /// Build SNS and SQS clients from a loaded SDK config.
    #[must_use]
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            sns: aws_sdk_sns::Client::new(sdk_config),
            sqs: aws_sdk_sqs::Client::new(sdk_config),
        }
    }

    /// Wrap existing clients.
    #[must_use]
    pub fn from_clients(sns: aws_sdk_sns::Client, sqs: aws_sdk_sqs::Client) -> Self {
        Self { sns, sqs }
    }
}

fn sns_error<E>(operation: &'static str, err: E) -> ProviderError
where
    E: std::error::Error,
{
    ProviderError::Api {
        operation,
        message: aws_sdk_sns::error::DisplayErrorContext(err).to_string(),
    }
}

fn sqs_error<E>(operation: &'static str, err: E) -> ProviderError
where
    E: std::error::Error,
{
    ProviderError::Api {
        operation,
        message: aws_sdk_sqs::error::DisplayErrorContext(err).to_string(),
    }
}

fn queue_attributes(attributes: Attributes) -> HashMap<QueueAttributeName, String> {
    attributes
        .into_iter()
        .map(|(k, v)| (QueueAttributeName::from(k.as_str()), v))
        .collect()
}

#[async_trait]
impl MessagingApi for SdkMessagingApi {
    async fn create_topic(
        &self,
        name: &str,
        attributes: Attributes,
    ) -> Result<String, ProviderError> {
        let output = self
            .sns
            .create_topic()
            .name(name)
            .set_attributes((!attributes.is_empty()).then(|| attributes.into_iter().collect()))
            .send()
            .await
            .map_err(|e| sns_error("CreateTopic", e))?;

        output
            .topic_arn()
            .map(ToOwned::to_owned)
            .ok_or(ProviderError::MissingField {
                operation: "CreateTopic",
                field: "TopicArn",
            })
    }

    async fn create_queue(
        &self,
        name: &str,
        attributes: Attributes,
    ) -> Result<String, ProviderError> {
        let output = self
            .sqs
            .create_queue()
            .queue_name(name)
            .set_attributes(Some(queue_attributes(attributes)))
            .send()
            .await
            .map_err(|e| sqs_error("CreateQueue", e))?;

        output
            .queue_url()
            .map(ToOwned::to_owned)
            .ok_or(ProviderError::MissingField {
                operation: "CreateQueue",
                field: "QueueUrl",
            })
    }

    async fn subscribe(
        &self,
        topic_arn: &str,
        endpoint: &str,
        attributes: Attributes,
    ) -> Result<Option<String>, ProviderError> {
        let output = self
            .sns
            .subscribe()
            .topic_arn(topic_arn)
            .protocol("sqs")
            .endpoint(endpoint)
            .set_attributes(Some(attributes.into_iter().collect()))
            .return_subscription_arn(true)
            .send()
            .await
            .map_err(|e| sns_error("Subscribe", e))?;

        Ok(output.subscription_arn().map(ToOwned::to_owned))
    }

    async fn set_queue_attributes(
        &self,
        queue_url: &str,
        attributes: Attributes,
    ) -> Result<(), ProviderError> {
        self.sqs
            .set_queue_attributes()
            .queue_url(queue_url)
            .set_attributes(Some(queue_attributes(attributes)))
            .send()
            .await
            .map_err(|e| sqs_error("SetQueueAttributes", e))?;
        Ok(())
    }
}
