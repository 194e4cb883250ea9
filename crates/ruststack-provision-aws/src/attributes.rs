//! SNS topic and SQS queue attribute maps.

use ruststack_provision_core::defaults::{MESSAGE_RETENTION_MAX, VISIBILITY_TIMEOUT_DEFAULT};
use ruststack_provision_core::{Queue, Topic};

use crate::api::Attributes;

/// SNS `FifoTopic` attribute.
pub const FIFO_TOPIC: &str = "FifoTopic";
/// SNS `DisplayName` attribute.
pub const DISPLAY_NAME: &str = "DisplayName";
/// SNS subscription `RawMessageDelivery` attribute.
pub const RAW_MESSAGE_DELIVERY: &str = "RawMessageDelivery";

/// SQS `MessageRetentionPeriod` attribute.
pub const MESSAGE_RETENTION_PERIOD: &str = "MessageRetentionPeriod";
/// SQS `VisibilityTimeout` attribute.
pub const VISIBILITY_TIMEOUT: &str = "VisibilityTimeout";
/// SQS `ReceiveMessageWaitTimeSeconds` attribute.
pub const RECEIVE_MESSAGE_WAIT_TIME_SECONDS: &str = "ReceiveMessageWaitTimeSeconds";
/// SQS `FifoQueue` attribute.
pub const FIFO_QUEUE: &str = "FifoQueue";
/// SQS `RedrivePolicy` attribute.
pub const REDRIVE_POLICY: &str = "RedrivePolicy";
/// SQS `Policy` attribute.
pub const POLICY: &str = "Policy";

/// `ContentBasedDeduplication`, shared by FIFO topics and queues.
pub const CONTENT_BASED_DEDUPLICATION: &str = "ContentBasedDeduplication";

/// Long-poll wait applied to every main queue.
const RECEIVE_WAIT_SECONDS: &str = "3";

/// Attributes for `CreateTopic`.
#[must_use]
pub fn topic_attributes(topic: &Topic) -> Attributes {
    let mut attrs = Attributes::new();
    if topic.fifo {
        attrs.insert(FIFO_TOPIC.to_owned(), "true".to_owned());
        attrs.insert(CONTENT_BASED_DEDUPLICATION.to_owned(), "true".to_owned());
    }
    if let Some(display_name) = topic.display_name() {
        attrs.insert(DISPLAY_NAME.to_owned(), display_name.to_owned());
    }
    attrs
}

/// Attributes for the main queue's `CreateQueue`, before any redrive policy.
///
/// Expects retention and visibility to have been defaulted already.
#[must_use]
pub fn queue_attributes(queue: &Queue) -> Attributes {
    let mut attrs = Attributes::from([
        (
            MESSAGE_RETENTION_PERIOD.to_owned(),
            queue.message_retention_seconds.to_string(),
        ),
        (
            VISIBILITY_TIMEOUT.to_owned(),
            queue.visibility_timeout_seconds.to_string(),
        ),
        (
            RECEIVE_MESSAGE_WAIT_TIME_SECONDS.to_owned(),
            RECEIVE_WAIT_SECONDS.to_owned(),
        ),
    ]);
    if queue.fifo {
        insert_fifo_queue(&mut attrs);
    }
    attrs
}

/// Attributes for a dead-letter queue. FIFO when its main queue is.
#[must_use]
pub fn dead_letter_attributes(fifo: bool) -> Attributes {
    let mut attrs = Attributes::from([
        (
            MESSAGE_RETENTION_PERIOD.to_owned(),
            MESSAGE_RETENTION_MAX.to_string(),
        ),
        (
            VISIBILITY_TIMEOUT.to_owned(),
            VISIBILITY_TIMEOUT_DEFAULT.to_string(),
        ),
    ]);
    if fifo {
        insert_fifo_queue(&mut attrs);
    }
    attrs
}

/// Attributes for an SNS → SQS subscription.
#[must_use]
pub fn subscription_attributes() -> Attributes {
    Attributes::from([(RAW_MESSAGE_DELIVERY.to_owned(), "true".to_owned())])
}

fn insert_fifo_queue(attrs: &mut Attributes) {
    attrs.insert(FIFO_QUEUE.to_owned(), "true".to_owned());
    attrs.insert(CONTENT_BASED_DEDUPLICATION.to_owned(), "true".to_owned());
}
