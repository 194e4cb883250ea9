//! JSON policy documents attached to queues.

use std::collections::BTreeMap;

use serde::Serialize;

/// IAM policy language version.
const POLICY_VERSION: &str = "2012-10-17";

/// Access policy document for an SQS queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    /// Policy language version.
    pub version: &'static str,
    /// Policy statements.
    pub statement: Vec<PolicyStatement>,
}

/// A single policy statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    /// `Allow` or `Deny`.
    pub effect: &'static str,
    /// Principal map, e.g. `{"Service": "sns.amazonaws.com"}`.
    pub principal: BTreeMap<&'static str, &'static str>,
    /// Granted action.
    pub action: &'static str,
    /// ARN the statement applies to.
    pub resource: String,
    /// Condition operator → key → values.
    pub condition: BTreeMap<&'static str, BTreeMap<&'static str, Vec<String>>>,
}

impl PolicyDocument {
    /// Allow SNS to deliver into `queue_arn`, but only from `topic_arns`.
    #[must_use]
    pub fn allow_sns_send(queue_arn: &str, topic_arns: &[String]) -> Self {
        Self {
            version: POLICY_VERSION,
            statement: vec![PolicyStatement {
                effect: "Allow",
                principal: BTreeMap::from([("Service", "sns.amazonaws.com")]),
                action: "sqs:SendMessage",
                resource: queue_arn.to_owned(),
                condition: BTreeMap::from([(
                    "ArnLike",
                    BTreeMap::from([("aws:SourceArn", topic_arns.to_vec())]),
                )]),
            }],
        }
    }
}

/// Redrive policy linking a queue to its dead-letter queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedrivePolicy {
    /// ARN of the dead-letter queue.
    pub dead_letter_target_arn: String,
    /// Receive count after which messages move to the DLQ.
    pub max_receive_count: String,
}

impl RedrivePolicy {
    /// Build a redrive policy for `dlq_arn`.
    #[must_use]
    pub fn new(dlq_arn: impl Into<String>, max_receive_count: i64) -> Self {
        Self {
            dead_letter_target_arn: dlq_arn.into(),
            max_receive_count: max_receive_count.to_string(),
        }
    }
}
