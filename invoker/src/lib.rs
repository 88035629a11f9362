// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>
//! # Design: Thread-Affinity Invoker
//!
//! ## Overview
//! Marshals closures onto the single thread that owns a resource.
//!
//! - An `Invoker` is pinned to the thread that constructed it.
//! - Producers on any other thread queue calls toward it; the owner runs
//!   them by calling `drain_pending` whenever it is convenient. The owner
//!   never needs to poll continuously.
//! - Calls issued on the owner thread itself skip the queue and run in
//!   place.
//! - Every call yields an `InvokeHandle` that can be blocked on (`wait`)
//!   or awaited; `invoke` is the blocking shorthand.
//! - A panic inside a call is caught where the call ran and re-raised,
//!   payload unchanged, at whoever observes the result.
//!
//! ```text
//!         +----------+   +----------+   +----------+
//!         | thread A |   | thread B |   | thread C |
//!         +----+-----+   +----+-----+   +----+-----+
//!              |              |              |
//!              | invoke       | invoke_async |
//!              v              v              v
//!         +----+--------------+--------------+----+
//!         |          pending call queue           |
//!         +-------------------+-------------------+
//!                             |
//!                             v  drain_pending()
//!                    +--------+--------+
//!                    |  owner thread   |
//!                    +-----------------+
//! ```

pub mod error;
pub mod handle;
pub mod invoker;

pub use crate::error::InvokeError;
pub use crate::handle::InvokeHandle;
pub use crate::invoker::{CallOutcome, Invoker};
