//! Request Dispatcher Module
//!
//! Turns a request id into a delivered response. The dispatcher asks the pool which node
//! owns the request, delivers to it through the provisioner and, when delivery fails,
//! drives exactly one recovery of that node.
//!
//! ## Core Mechanisms
//! - **Bounded Delivery**: A health check followed by an invocation, each under the pool's
//!   call timeout. A timeout is a failure like any other.
//! - **Single-Flight Recovery**: Concurrent failures on the same node share one recovery
//!   attempt and all observe its outcome.
//! - **No Re-delivery**: A recovered node is reported as such; the failed request is not
//!   replayed.

pub mod dispatcher;
pub mod types;

pub use dispatcher::{Dispatcher, random_request_id};
pub use types::RoutingOutcome;
