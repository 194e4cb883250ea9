//! Core provisioning logic for RustStack messaging resources.
//!
//! This crate turns a declarative configuration of SNS topics and SQS queues
//! into an ordered sequence of calls against a [`CloudProvider`]. It owns the
//! config model and its validation, the naming and defaulting rules, and the
//! [`Provisioner`] that drives a single run.
//!
//! The cloud itself is an external collaborator: the production AWS
//! implementation lives in `ruststack-provision-aws`.

mod config;
pub mod defaults;
mod error;
pub mod naming;
mod provider;
mod provisioner;
mod validation;

pub use config::{Config, DeadLetterQueueConfig, LoadError, Queue, Topic, expand_env_vars};
pub use error::{ProviderError, ProvisionError, ResourceKind, ValidationError};
pub use provider::CloudProvider;
pub use provisioner::Provisioner;
pub use validation::validate;
