//! Structural validation of a [`Config`].

use crate::config::Config;
use crate::error::ValidationError;

/// Validate a configuration before any resource is touched.
///
/// Checks, in order: the required top-level fields, top-level topic names,
/// then queue names and the names of topics nested under each queue. The
/// first violation is returned.
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    let required = [
        (&config.region, "region is missing"),
        (&config.prefix, "prefix is missing"),
        (&config.environment, "environment is missing"),
        (&config.account_id, "account ID is missing"),
    ];
    if let Some((_, reason)) = required.iter().find(|(value, _)| value.is_empty()) {
        return Err(ValidationError::new(*reason));
    }

    if config.sns_topics.iter().any(|t| t.name.is_empty()) {
        return Err(ValidationError::new("some topic entries have missing names"));
    }

    for queue in &config.queues {
        if queue.name.is_empty() {
            return Err(ValidationError::new("some queue entries have missing names"));
        }
        if queue.sns_topics.iter().any(|t| t.name.is_empty()) {
            return Err(ValidationError::new(format!(
                "\"sns_topics\" has items with missing names: queue={}",
                queue.name
            )));
        }
    }

    Ok(())
}
