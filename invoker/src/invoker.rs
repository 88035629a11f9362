// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, ThreadId};

use async_channel::{Receiver, Sender};
use futures::channel::oneshot;
use log::{debug, warn};

use crate::error::InvokeError;
use crate::handle::InvokeHandle;

/// Result of one executed call: the value, or the panic payload it raised.
pub type CallOutcome<R> = std::thread::Result<R>;

/// Process-wide call numbering, to correlate "queueing" and "running" log lines.
static CALL_SEQ: AtomicU64 = AtomicU64::new(1);

/// A call waiting in the queue. Running it executes the user's closure and
/// resolves the outcome slot of the handle that was given out for it.
struct QueuedCall {
    seq: u64,
    queued_from: ThreadId,
    run: Box<dyn FnOnce() + Send + 'static>,
}

impl std::fmt::Debug for QueuedCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuedCall")
            .field("seq", &self.seq)
            .field("queued_from", &self.queued_from)
            .finish()
    }
}

/// Dispatches closures onto the thread that created it.
///
/// Cloning yields another handle to the same queue with the same owner;
/// clones moved to other threads still queue toward the original owner.
#[derive(Debug, Clone)]
pub struct Invoker {
    owner: ThreadId,
    tx: Sender<QueuedCall>,
    rx: Receiver<QueuedCall>,
}

impl Invoker {
    /// Creates an invoker owned by the calling thread.
    pub fn new() -> Self {
        let (tx, rx) = async_channel::unbounded();
        Self {
            owner: thread::current().id(),
            tx,
            rx,
        }
    }

    /// Whether the calling thread is the owner.
    pub fn is_owner(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Number of calls currently waiting in the queue.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Schedules `work` on the owner thread and returns a handle to its
    /// result.
    ///
    /// On the owner thread the closure runs in place and the handle comes
    /// back already resolved. On any other thread the closure is queued
    /// until the owner drains; the handle can be awaited or blocked on,
    /// and dropping it does not cancel the call.
    pub fn invoke_async<F, R>(&self, work: F) -> InvokeHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.is_owner() {
            return InvokeHandle::ready(run_captured(work));
        }

        let seq = CALL_SEQ.fetch_add(1, Ordering::Relaxed);
        let queued_from = thread::current().id();
        let (outcome_tx, outcome_rx) = oneshot::channel();

        let run = Box::new(move || {
            let outcome = run_captured(work);
            if let Err(unsent) = outcome_tx.send(outcome) {
                // Nobody is waiting anymore. Losing a value is fine,
                // losing a panic is not.
                if let Err(payload) = unsent {
                    warn!(
                        "call #{seq} panicked after its handle was dropped: {}",
                        panic_message(&payload)
                    );
                }
            }
        });

        debug!("queueing call #{seq} from {queued_from:?}");
        self.tx
            .try_send(QueuedCall {
                seq,
                queued_from,
                run,
            })
            .expect("pending queue lives as long as the invoker");

        InvokeHandle::queued(outcome_rx)
    }

    /// Schedules `work` on the owner thread and blocks until it ran.
    ///
    /// Returns the closure's value. A panic raised by the closure is
    /// re-raised here with its original payload.
    pub fn invoke<F, R>(&self, work: F) -> R
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.invoke_async(work).wait()
    }

    /// Runs every call currently queued, in the order it was queued, and
    /// returns how many ran.
    ///
    /// Only the owner thread may drain; any other thread gets
    /// `InvokeError::NotOwnerThread` and the queue stays untouched. Calls
    /// queued while the drain is still running are picked up as well. A
    /// panicking call does not stop the drain; its panic travels to
    /// whoever holds the handle.
    pub fn drain_pending(&self) -> Result<usize, InvokeError> {
        let caller = thread::current().id();
        if caller != self.owner {
            warn!(
                "refusing to drain on {caller:?}, the queue belongs to {:?}",
                self.owner
            );
            return Err(InvokeError::NotOwnerThread {
                owner: self.owner,
                caller,
            });
        }

        let mut ran = 0;
        while let Ok(call) = self.rx.try_recv() {
            debug!(
                "running call #{} queued from {:?}",
                call.seq, call.queued_from
            );
            (call.run)();
            ran += 1;
        }
        if ran > 0 {
            debug!("drained {ran} calls");
        }
        Ok(ran)
    }
}

impl Default for Invoker {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the closure, turning a panic into an `Err` carrying the payload.
fn run_captured<F, R>(work: F) -> CallOutcome<R>
where
    F: FnOnce() -> R,
{
    catch_unwind(AssertUnwindSafe(work))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
