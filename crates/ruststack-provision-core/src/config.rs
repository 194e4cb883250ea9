//! Provisioning configuration model and YAML loader.
//!
//! The configuration is read from a YAML document after environment
//! variables have been interpolated into its raw text. Unknown variables
//! expand to an empty string, so a missing `${PREFIX}` surfaces later as a
//! validation failure rather than a parse error.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::validation::validate;

/// Matches `${NAME}` and `$NAME` references.
static ENV_VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:\{([^}]*)\}|([A-Za-z_][A-Za-z0-9_]*))").expect("env var pattern is valid")
});

/// Desired set of topics and queues for one account, region and environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// AWS region the resources are created in.
    pub region: String,
    /// AWS account that owns the resources; used to build ARNs.
    pub account_id: String,
    /// Global naming prefix.
    pub prefix: String,
    /// Environment tag, e.g. `staging`.
    pub environment: String,
    /// Queues, created in order after all top-level topics.
    pub queues: Vec<Queue>,
    /// Top-level topics, created in order.
    pub sns_topics: Vec<Topic>,
}

/// An SNS topic declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Topic {
    /// Logical name, without prefix or environment.
    pub name: String,
    /// Prefix override. Empty counts as unset.
    pub prefix: Option<String>,
    /// Optional SNS display name.
    pub display_name: Option<String>,
    /// Whether this is a FIFO topic.
    pub fifo: bool,
    /// Derived full name, filled in during provisioning.
    #[serde(skip)]
    pub full_name: String,
}

/// An SQS queue declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Queue {
    /// Logical name, without prefix or environment.
    pub name: String,
    /// Prefix override. Empty counts as unset.
    pub prefix: Option<String>,
    /// Topics this queue subscribes to.
    pub sns_topics: Vec<Topic>,
    /// Dead-letter queue settings.
    pub dead_letter_queue: DeadLetterQueueConfig,
    /// Message retention in seconds; defaulted and clamped before creation.
    pub message_retention_seconds: i64,
    /// Visibility timeout in seconds; defaulted and clamped before creation.
    pub visibility_timeout_seconds: i64,
    /// Whether this is a FIFO queue.
    pub fifo: bool,
    /// Derived full name, filled in during provisioning.
    #[serde(skip)]
    pub full_name: String,
    /// Queue URL, filled in once the queue exists.
    #[serde(skip)]
    pub url: Option<String>,
}

/// Dead-letter queue settings for a [`Queue`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeadLetterQueueConfig {
    /// Whether a DLQ is created and linked.
    pub enabled: bool,
    /// Receives before a message moves to the DLQ.
    pub max_receive_count: i64,
    /// Suffix appended to the main queue name to form the DLQ name.
    pub suffix: String,
}

impl Topic {
    /// The override prefix, if one is set and non-empty.
    #[must_use]
    pub fn override_prefix(&self) -> Option<&str> {
        non_empty(self.prefix.as_deref())
    }

    /// The display name, if one is set and non-empty.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        non_empty(self.display_name.as_deref())
    }
}

impl Queue {
    /// The override prefix, if one is set and non-empty.
    #[must_use]
    pub fn override_prefix(&self) -> Option<&str> {
        non_empty(self.prefix.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Error loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read config {}", path.display())]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid YAML for [`Config`].
    #[error("failed to parse config")]
    Parse(#[from] serde_yaml::Error),

    /// The document parsed but failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl Config {
    /// Read, interpolate, parse and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_owned(),
            source,
        })?;
        let config = Self::from_yaml_str(&expand_env_vars(&contents))?;
        tracing::debug!(
            path = %path.display(),
            topics = config.sns_topics.len(),
            queues = config.queues.len(),
            "loaded provisioning config",
        );
        Ok(config)
    }

    /// Parse and validate an already-interpolated YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, LoadError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the structural rules every run depends on.
    ///
    /// Called when a document is parsed and again before provisioning starts.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate(self)
    }
}

/// Expand `$NAME` and `${NAME}` references from the process environment.
///
/// Unset variables expand to an empty string. Only names that start with a
/// letter or underscore are references: positional or special forms such as
/// `$1` or `$@` are kept as literal text, and so is a lone `$`.
#[must_use]
pub fn expand_env_vars(input: &str) -> Cow<'_, str> {
    expand_with(input, |key| std::env::var(key).ok())
}

fn expand_with<F>(input: &str, lookup: F) -> Cow<'_, str>
where
    F: Fn(&str) -> Option<String>,
{
    ENV_VAR_RE.replace_all(input, |caps: &Captures<'_>| {
        let key = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map_or("", |m| m.as_str());
        lookup(key).unwrap_or_default()
    })
}
