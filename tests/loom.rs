#![allow(missing_docs)]
#![cfg(feature = "loom")]

use loom::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use weft::{pool::WorkerPool, task::Task};

#[test]
fn loom_edge_publication_is_visible_to_the_consumer() {
    loom::model(|| {
        let producer = Task::<i32, ()>::new();
        let edge = Arc::clone(producer.output_edge());

        let setter = {
            let edge = Arc::clone(&edge);
            loom::thread::spawn(move || {
                edge.set(7);
            })
        };

        edge.wait_retrievable();
        assert_eq!(edge.get(), 7);

        setter.join().unwrap();
    });
}

#[test]
fn loom_task_wait_observes_completion() {
    loom::model(|| {
        let task = Task::<i32, ()>::new();
        task.set_callable(|| 42);

        let runner = {
            let task = Arc::clone(&task);
            loom::thread::spawn(move || task.run())
        };

        task.wait();
        assert_eq!(task.result(), Some(42));

        runner.join().unwrap();
    });
}

#[test]
fn loom_pool_idle_fires_exactly_once() {
    loom::model(|| {
        let hits = Arc::new(AtomicUsize::new(0));
        let callback_hits = Arc::clone(&hits);
        let mut pool = WorkerPool::new(
            1,
            Some(Box::new(move || {
                callback_hits.fetch_add(1, Ordering::Relaxed);
            })),
        );

        let ran = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let ran = Arc::clone(&ran);
            let accepted = pool.submit(Some(move || {
                ran.fetch_add(1, Ordering::Relaxed);
            }));
            assert!(accepted);
        }

        pool.start();
        pool.wait_idle();

        assert_eq!(ran.load(Ordering::Relaxed), 2);
        assert_eq!(hits.load(Ordering::Relaxed), 1);

        drop(pool);
    });
}
