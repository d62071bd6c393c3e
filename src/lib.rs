//! Consistent-Hash Load Balancer Library
//!
//! Routes requests onto a pool of backend nodes placed on a slot-based hash ring, and
//! recreates a node under the same name when delivery to it fails. The binary (`main.rs`)
//! wires these pieces to an HTTP control surface.
//!
//! ## Architecture Modules
//! - **`ring`**: The hash ring itself. Pure data structure: virtual-node placement with
//!   linear probing and clockwise lookup.
//! - **`provisioner`**: The `NodeProvisioner` capability used to create, destroy, probe and
//!   invoke backend nodes, plus an in-process implementation.
//! - **`backend`**: The HTTP application each backend node serves.
//! - **`pool`**: Owner of the ring and the node lifecycle table; the only mutator of both.
//! - **`dispatcher`**: Per-request delivery with single-flight recovery of failed nodes.
//! - **`api`**: Axum handlers for routing and pool administration.
//! - **`config`**: Command-line and environment configuration.
//! - **`error`**: Error types shared by the pool, dispatcher and API.

pub mod api;
pub mod backend;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod pool;
pub mod provisioner;
pub mod ring;
