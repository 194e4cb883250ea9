//! AWS implementation of the provisioning [`CloudProvider`].
//!
//! [`AwsProvider`] creates SNS topics and SQS queues through the official
//! AWS SDK. The SDK calls sit behind the narrow [`MessagingApi`] trait so the
//! provider's own logic (DLQ linking, subscriptions, the access policy and
//! the in-run topic cache) can be exercised without a network.
//!
//! Pointing the provider at a RustStack or LocalStack endpoint:
//!
//! ```no_run
//! # async fn example(config: &ruststack_provision_core::Config) {
//! use ruststack_provision_aws::AwsProvider;
//!
//! let provider = AwsProvider::connect(config, Some("http://localhost:4566"))
//!     .await
//!     .unwrap();
//! # }
//! ```
//!
//! [`CloudProvider`]: ruststack_provision_core::CloudProvider

pub mod api;
pub mod attributes;
pub mod policy;
mod provider;

pub use api::{Attributes, MessagingApi, SdkMessagingApi};
pub use provider::{AwsProvider, sqs_arn};
