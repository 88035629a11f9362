// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use invoker::Invoker;

/// Runs an invoker's owner thread for the duration of a test.
///
/// The thread constructs the invoker, hands a clone out, and drains in a
/// loop until the guard is dropped. Dropping stops the loop after one
/// final drain and joins the thread.
pub struct OwnerLoop {
    invoker: Invoker,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl OwnerLoop {
    pub fn start() -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_in_thread = stop.clone();
        let (invoker_tx, invoker_rx) = mpsc::channel();

        let thread = thread::spawn(move || {
            let invoker = Invoker::new();
            invoker_tx
                .send(invoker.clone())
                .expect("the starting thread waits for the invoker");

            while !stop_in_thread.load(Ordering::Acquire) {
                let ran = invoker
                    .drain_pending()
                    .expect("the owner loop drains on its own thread");
                if ran == 0 {
                    thread::sleep(Duration::from_millis(1));
                }
            }
            // Pick up calls queued between the last drain and the stop.
            invoker
                .drain_pending()
                .expect("the owner loop drains on its own thread");
        });

        let invoker = invoker_rx
            .recv()
            .expect("the owner thread sends its invoker right after starting");

        Self {
            invoker,
            stop,
            thread: Some(thread),
        }
    }

    /// Handle to the loop's invoker; queue toward it from any thread.
    pub fn invoker(&self) -> Invoker {
        self.invoker.clone()
    }
}

impl Drop for OwnerLoop {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
