// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

// Walks through the invoker on a resource that must stay on one thread.
// A thread-local string stands in for anything non-Send: a window handle,
// a GL context, a connection cache.

use std::cell::RefCell;
use std::thread;

use invoker::Invoker;
use log::info;

thread_local! {
    static FRAME_TITLE: RefCell<String> = RefCell::new(String::from("untitled"));
}

fn set_title(title: &str) {
    FRAME_TITLE.with(|t| *t.borrow_mut() = title.to_string());
}

fn title() -> String {
    FRAME_TITLE.with(|t| t.borrow().clone())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let invoker = Invoker::new();

    // On the owner thread a call runs in place, nothing is queued.
    invoker.invoke(|| set_title("ready"));
    info!("title after the inline call: {}", title());

    // Another thread queues work toward us. It also shows that only the
    // owner may drain.
    let producer = {
        let invoker = invoker.clone();
        thread::spawn(move || {
            if let Err(e) = invoker.drain_pending() {
                info!("producer cannot drain: {e}");
            }
            invoker.invoke(|| set_title("set by the producer"));
        })
    };

    // Drain once the producer's call showed up.
    while invoker.pending() == 0 {
        thread::yield_now();
    }
    invoker.drain_pending()?;
    producer
        .join()
        .expect("the producer thread must not panic");
    info!("title after the drain: {}", title());

    // Values come back to the calling thread, blocking or awaited.
    let answer = invoker.invoke(|| 6 * 7);
    info!("computed on the owner thread: {answer}");

    let handle = {
        let invoker = invoker.clone();
        thread::spawn(move || invoker.invoke_async(|| title().len()))
            .join()
            .expect("the handle thread must not panic")
    };
    invoker.drain_pending()?;
    info!("title length, fetched asynchronously: {}", handle.wait());

    Ok(())
}
