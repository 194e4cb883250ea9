//! Resource naming rules.
//!
//! Every resource name has the shape `{prefix}_{environment}_{name}`, with
//! `.fifo` appended for FIFO resources. The prefix is the resource's own
//! override when present and the inherited prefix otherwise. All functions
//! here are pure.

use crate::config::{Queue, Topic};
use crate::defaults::apply_queue_defaults;

/// Suffix SNS and SQS require on FIFO resource names.
pub const FIFO_SUFFIX: &str = ".fifo";

/// Build `{prefix}_{environment}_{name}`, honoring the FIFO suffix rule.
#[must_use]
pub fn full_name(prefix: &str, environment: &str, name: &str, fifo: bool) -> String {
    with_fifo_suffix(format!("{prefix}_{environment}_{name}"), fifo)
}

/// Append `.fifo` when `fifo` is set and the name does not already end in it.
#[must_use]
pub fn with_fifo_suffix(mut name: String, fifo: bool) -> String {
    if fifo && !name.ends_with(FIFO_SUFFIX) {
        name.push_str(FIFO_SUFFIX);
    }
    name
}

/// Resolve a topic's prefix and full name in place.
///
/// `inherited_prefix` applies only when the topic has no override of its own.
pub fn resolve_topic(topic: &mut Topic, inherited_prefix: &str, environment: &str) {
    let prefix = topic.override_prefix().unwrap_or(inherited_prefix).to_owned();
    topic.full_name = full_name(&prefix, environment, &topic.name, topic.fifo);
    topic.prefix = Some(prefix);
}

/// Resolve a queue's full name, attribute defaults and nested topics in place.
///
/// Nested topics without an override inherit the queue's effective prefix.
pub fn resolve_queue(queue: &mut Queue, global_prefix: &str, environment: &str) {
    let prefix = queue.override_prefix().unwrap_or(global_prefix).to_owned();
    queue.full_name = full_name(&prefix, environment, &queue.name, queue.fifo);
    apply_queue_defaults(queue);

    for topic in &mut queue.sns_topics {
        resolve_topic(topic, &prefix, environment);
    }
}

/// Name of the queue's dead-letter queue, or `None` when the DLQ is disabled.
///
/// Strips `.fifo` from the main queue's full name, appends the DLQ suffix,
/// then re-adds `.fifo` if the main queue is FIFO. Expects the queue to have
/// been through [`resolve_queue`].
#[must_use]
pub fn dead_letter_queue_name(queue: &Queue) -> Option<String> {
    let dlq = &queue.dead_letter_queue;
    if !dlq.enabled {
        return None;
    }
    let base = queue
        .full_name
        .strip_suffix(FIFO_SUFFIX)
        .unwrap_or(&queue.full_name);
    Some(with_fifo_suffix(format!("{base}{}", dlq.suffix), queue.fifo))
}
