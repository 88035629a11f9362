// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

// Hammers one invoker from several producer threads while the main thread
// drains, then checks that every call ran. Exits nonzero on a mismatch so
// the integration tests can assert on the status.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use clap::Parser;
use invoker::Invoker;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Number of producer threads
    #[arg(long, default_value_t = 4)]
    producers: usize,

    /// Calls each producer queues
    #[arg(long, default_value_t = 250)]
    calls: usize,
}

fn main() {
    let args = Args::parse();
    let expected = args.producers * args.calls;

    let invoker = Invoker::new();
    let counter = Arc::new(Mutex::new(0usize));
    let finished = Arc::new(AtomicUsize::new(0));

    let mut producers = Vec::new();
    for producer in 0..args.producers {
        let invoker = invoker.clone();
        let counter = counter.clone();
        let finished = finished.clone();
        let calls = args.calls;
        producers.push(thread::spawn(move || {
            for _ in 0..calls {
                let counter = counter.clone();
                invoker.invoke_async(move || *counter.lock().unwrap() += 1);
            }
            // Blocks until everything this producer queued has run.
            invoker.invoke(|| ());
            finished.fetch_add(1, Ordering::Release);
            println!("producer {producer} done");
        }));
    }

    let mut drained = 0;
    while finished.load(Ordering::Acquire) < args.producers || invoker.pending() > 0 {
        drained += invoker
            .drain_pending()
            .expect("the main thread owns the invoker");
    }

    for producer in producers {
        producer.join().expect("producer thread must not panic");
    }

    let counted = *counter.lock().unwrap();
    println!("drained {drained} calls, counted {counted}, expected {expected}");
    if counted != expected {
        eprintln!("counter mismatch: {counted} != {expected}");
        std::process::exit(1);
    }
}
