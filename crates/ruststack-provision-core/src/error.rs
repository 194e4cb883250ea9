//! Error types for provisioning runs.
//!
//! A run can fail in exactly two ways. [`ProvisionError::InvalidConfiguration`]
//! means the cloud was never touched; [`ProvisionError::ProvisioningFailure`]
//! means some resources may already exist.

use std::fmt;

/// A structural problem in the provisioning configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid configuration: {reason}")]
pub struct ValidationError {
    reason: String,
}

impl ValidationError {
    /// Create a validation error with a human-readable cause.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The cause without the `invalid configuration:` prefix.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Kind of cloud resource being provisioned when a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// An SNS topic.
    Topic,
    /// An SQS queue, including its DLQ and subscriptions.
    Queue,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Topic => f.write_str("topic"),
            Self::Queue => f.write_str("queue"),
        }
    }
}

/// Error returned by a [`crate::CloudProvider`] call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The run was cancelled (deadline or interrupt) while the call was pending.
    #[error("operation cancelled")]
    Cancelled,

    /// The cloud API rejected the request.
    #[error("{operation} failed: {message}")]
    Api {
        /// API operation name, e.g. `CreateQueue`.
        operation: &'static str,
        /// Error details reported by the SDK.
        message: String,
    },

    /// The cloud API succeeded but omitted a field we depend on.
    #[error("{operation} response is missing {field}")]
    MissingField {
        /// API operation name.
        operation: &'static str,
        /// The absent response field.
        field: &'static str,
    },

    /// A subscription was requested for a queue that has not been created.
    #[error("queue {0:?} has no URL")]
    MissingQueueUrl(String),

    /// A JSON document (policy, redrive policy) could not be encoded.
    #[error("failed to encode JSON document")]
    Encode(#[from] serde_json::Error),

    /// A nested step of a larger operation failed.
    #[error("{context}")]
    Context {
        /// What was being attempted.
        context: String,
        /// The underlying failure.
        #[source]
        source: Box<ProviderError>,
    },
}

impl ProviderError {
    /// Wrap this error with a description of the step that failed.
    #[must_use]
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether this error, or any error it wraps, is a cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::Context { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}

/// Error returned by [`crate::Provisioner::run`].
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// The configuration failed validation; no cloud calls were made.
    #[error(transparent)]
    InvalidConfiguration(#[from] ValidationError),

    /// A cloud call failed; resources created earlier in the run remain.
    #[error("failed to create {resource} {name:?}")]
    ProvisioningFailure {
        /// Kind of resource being created.
        resource: ResourceKind,
        /// Full name of the resource being created.
        name: String,
        /// The provider error.
        #[source]
        source: ProviderError,
    },
}

impl ProvisionError {
    pub(crate) fn provisioning(resource: ResourceKind, name: &str, source: ProviderError) -> Self {
        Self::ProvisioningFailure {
            resource,
            name: name.to_owned(),
            source,
        }
    }

    /// Name of the resource that failed, if this is a provisioning failure.
    #[must_use]
    pub fn resource_name(&self) -> Option<&str> {
        match self {
            Self::InvalidConfiguration(_) => None,
            Self::ProvisioningFailure { name, .. } => Some(name),
        }
    }
}
