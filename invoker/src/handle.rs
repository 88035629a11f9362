// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::future::Future;
use std::panic::resume_unwind;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::executor::block_on;

use crate::invoker::CallOutcome;

/// Pending result of a scheduled call.
///
/// Resolves once the call ran: immediately for calls issued on the owner
/// thread, after the next drain for queued calls. Consume it by blocking
/// (`wait`) or by awaiting it. Dropping the handle is allowed; the call
/// still runs and its outcome is discarded.
pub struct InvokeHandle<R> {
    state: HandleState<R>,
}

enum HandleState<R> {
    /// The call already ran on the issuing thread.
    Ready(Option<CallOutcome<R>>),
    /// The call sits in the queue; the outcome arrives over the channel.
    Queued(oneshot::Receiver<CallOutcome<R>>),
}

impl<R> InvokeHandle<R> {
    pub(crate) fn ready(outcome: CallOutcome<R>) -> Self {
        Self {
            state: HandleState::Ready(Some(outcome)),
        }
    }

    pub(crate) fn queued(outcome_rx: oneshot::Receiver<CallOutcome<R>>) -> Self {
        Self {
            state: HandleState::Queued(outcome_rx),
        }
    }

    /// Blocks until the call ran and returns its value.
    ///
    /// A panic raised by the call is re-raised here with its original
    /// payload. Do not move a queued handle to the owner thread and wait
    /// there; the owner would block on a drain only it can perform.
    pub fn wait(self) -> R {
        match self.state {
            HandleState::Ready(outcome) => {
                unwrap_outcome(outcome.expect("a ready handle always holds its outcome"))
            }
            HandleState::Queued(outcome_rx) => match block_on(outcome_rx) {
                Ok(outcome) => unwrap_outcome(outcome),
                Err(oneshot::Canceled) => {
                    panic!("invoker was dropped before the queued call could run")
                }
            },
        }
    }
}

// No field of the handle is ever pinned; results are moved out whole.
impl<R> Unpin for InvokeHandle<R> {}

impl<R> Future for InvokeHandle<R> {
    type Output = R;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            HandleState::Ready(outcome) => {
                let outcome = outcome
                    .take()
                    .expect("an invoke handle must not be polled after completion");
                Poll::Ready(unwrap_outcome(outcome))
            }
            HandleState::Queued(outcome_rx) => match Pin::new(outcome_rx).poll(cx) {
                Poll::Ready(Ok(outcome)) => Poll::Ready(unwrap_outcome(outcome)),
                Poll::Ready(Err(oneshot::Canceled)) => {
                    panic!("invoker was dropped before the queued call could run")
                }
                Poll::Pending => Poll::Pending,
            },
        }
    }
}

/// Returns the value, or re-raises the captured panic unchanged.
fn unwrap_outcome<R>(outcome: CallOutcome<R>) -> R {
    match outcome {
        Ok(value) => value,
        Err(payload) => resume_unwind(payload),
    }
}
