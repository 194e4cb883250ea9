//! Bounded defaults for queue attributes.

use crate::config::{DeadLetterQueueConfig, Queue};

/// Maximum message retention SQS allows (14 days).
pub const MESSAGE_RETENTION_MAX: i64 = 1_209_600;
/// Minimum message retention SQS allows.
pub const MESSAGE_RETENTION_MIN: i64 = 60;
/// Retention used when none is configured.
pub const MESSAGE_RETENTION_DEFAULT: i64 = MESSAGE_RETENTION_MAX;

/// Visibility timeout used when none is configured.
pub const VISIBILITY_TIMEOUT_DEFAULT: i64 = 60;
/// Maximum visibility timeout SQS allows (12 hours).
pub const VISIBILITY_TIMEOUT_MAX: i64 = 43_200;

/// DLQ receive count used when none is configured.
pub const DLQ_MAX_RECEIVE_COUNT_DEFAULT: i64 = 7;
/// DLQ name suffix used when none is configured.
pub const DLQ_SUFFIX_DEFAULT: &str = "_failures";

/// Resolve a configured retention period.
///
/// Unset (`<= 0`) means the maximum. Values below the minimum are raised to
/// the minimum, not to the default; 60 itself is kept.
#[must_use]
pub fn message_retention(seconds: i64) -> i64 {
    match seconds {
        s if s <= 0 => MESSAGE_RETENTION_DEFAULT,
        s if s < MESSAGE_RETENTION_MIN => MESSAGE_RETENTION_MIN,
        s => s.min(MESSAGE_RETENTION_MAX),
    }
}

/// Resolve a configured visibility timeout.
#[must_use]
pub fn visibility_timeout(seconds: i64) -> i64 {
    if seconds <= 0 {
        VISIBILITY_TIMEOUT_DEFAULT
    } else {
        seconds.min(VISIBILITY_TIMEOUT_MAX)
    }
}

/// Fill in DLQ defaults. A disabled DLQ is left untouched.
pub fn apply_dead_letter_defaults(dlq: &mut DeadLetterQueueConfig) {
    if !dlq.enabled {
        return;
    }
    if dlq.max_receive_count <= 0 {
        dlq.max_receive_count = DLQ_MAX_RECEIVE_COUNT_DEFAULT;
    }
    if dlq.suffix.is_empty() {
        DLQ_SUFFIX_DEFAULT.clone_into(&mut dlq.suffix);
    }
}

/// Apply retention, visibility and DLQ defaults to a queue in place.
pub fn apply_queue_defaults(queue: &mut Queue) {
    queue.message_retention_seconds = message_retention(queue.message_retention_seconds);
    queue.visibility_timeout_seconds = visibility_timeout(queue.visibility_timeout_seconds);
    apply_dead_letter_defaults(&mut queue.dead_letter_queue);
}
