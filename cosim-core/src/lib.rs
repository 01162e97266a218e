//! Node adapter contract for time-stepped co-simulation.
//!
//! An external orchestrator advances global simulated time and exchanges
//! named scalar attributes with participating nodes. This crate defines the
//! seam that lets any domain model take part:
//!
//! - [`ModelBinding`]: the capability a domain model provides (resolve, write,
//!   read at a time, recompute).
//! - [`NodeAdapter`]: composes a binding with a [`TimeSource`] and an
//!   [`AttributeStore`] and implements the uniform
//!   `initialize → {set_attribute, step, get_attribute}* → terminate` contract.
//! - [`Orchestrator`]: the scheduler side of [`NodeAdapter::run`].

mod adapter;
mod attribute;
mod binding;
mod error;
mod init;
mod publish;
mod store;
mod time;

pub mod orchestrator;

pub use adapter::{NodeAdapter, NodeState};
pub use attribute::{AttributeError, AttributeName, SEPARATOR};
pub use binding::{BindingFactory, ModelBinding, Outputs};
pub use error::{ConfigError, NodeError, NodeResult};
pub use init::{InitValue, InitValues};
pub use orchestrator::{Command, Orchestrator, Reply, RunSummary};
pub use publish::Publisher;
pub use store::AttributeStore;
pub use time::{START_DATE_KEY, TimeSource};
