// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::thread::ThreadId;

use thiserror::Error;

/// Contract violations surfaced by the invoker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvokeError {
    /// The pending queue may only be drained by the thread that created
    /// the invoker. The queue is left untouched.
    #[error("queued calls must be drained on the owner thread {owner:?}, not {caller:?}")]
    NotOwnerThread { owner: ThreadId, caller: ThreadId },
}
