//! Integration tests for ruststack-provision.
//!
//! These tests require a running AWS-compatible server (RustStack or
//! LocalStack) at `localhost:4566`. They are marked `#[ignore]` so they don't
//! run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p ruststack-provision-integration -- --ignored
//! ```

use std::sync::Once;

use aws_sdk_sqs::config::{BehaviorVersion, Credentials, Region};
use ruststack_provision_aws::{AwsProvider, SdkMessagingApi};
use ruststack_provision_core::Config;

static INIT: Once = Once::new();

/// Region used by every test.
pub const REGION: &str = "us-east-1";

/// Account id the local server reports.
pub const ACCOUNT_ID: &str = "000000000000";

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Endpoint URL for the server.
fn endpoint_url() -> String {
    std::env::var("AWS_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:4566".to_owned())
}

fn credentials() -> Credentials {
    Credentials::new("test", "test", None, None, "integration-test")
}

/// Create a configured SQS client pointing at the local server.
#[must_use]
pub fn sqs_client() -> aws_sdk_sqs::Client {
    init_tracing();

    let config = aws_sdk_sqs::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(REGION))
        .credentials_provider(credentials())
        .endpoint_url(endpoint_url())
        .build();

    aws_sdk_sqs::Client::from_conf(config)
}

/// Create a configured SNS client pointing at the local server.
#[must_use]
pub fn sns_client() -> aws_sdk_sns::Client {
    init_tracing();

    let config = aws_sdk_sns::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(aws_sdk_sns::config::Region::new(REGION))
        .credentials_provider(credentials())
        .endpoint_url(endpoint_url())
        .build();

    aws_sdk_sns::Client::from_conf(config)
}

/// Create a provider backed by the local server.
#[must_use]
pub fn provider() -> AwsProvider {
    let api = SdkMessagingApi::from_clients(sns_client(), sqs_client());
    AwsProvider::with_api(api, REGION, ACCOUNT_ID).expect("region and account are set")
}

/// Generate a unique environment tag so test runs never collide.
#[must_use]
pub fn test_environment(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string()[..8].to_owned();
    format!("{prefix}{id}")
}

/// Parse a YAML config, filling in region, account and environment.
#[must_use]
pub fn config_from_yaml(environment: &str, body: &str) -> Config {
    let yaml = format!(
        "region: {REGION}\naccount_id: '{ACCOUNT_ID}'\nprefix: itest\nenvironment: {environment}\n{body}"
    );
    Config::from_yaml_str(&yaml).unwrap_or_else(|e| panic!("invalid test config: {e}"))
}

/// Delete every queue and topic recorded in a resolved config.
pub async fn cleanup(config: &Config) {
    let sqs = sqs_client();
    let sns = sns_client();

    for queue in &config.queues {
        let mut names = vec![queue.full_name.clone()];
        names.extend(ruststack_provision_core::naming::dead_letter_queue_name(queue));
        for name in names {
            if let Ok(out) = sqs.get_queue_url().queue_name(&name).send().await {
                if let Some(url) = out.queue_url() {
                    let _ = sqs.delete_queue().queue_url(url).send().await;
                }
            }
        }
    }

    let topic_names = config
        .sns_topics
        .iter()
        .chain(config.queues.iter().flat_map(|q| q.sns_topics.iter()))
        .map(|t| t.full_name.clone());
    for name in topic_names {
        let arn = format!("arn:aws:sns:{REGION}:{ACCOUNT_ID}:{name}");
        let _ = sns.delete_topic().topic_arn(arn).send().await;
    }
}

mod test_provision;
