#![cfg(not(feature = "loom"))]

use std::{sync::Arc, thread, time::Duration};
use weft::task::Task;

#[test]
fn set_and_get() {
    let task = Task::<i32, ()>::new();
    let edge = task.output_edge();

    assert!(!edge.is_retrievable());
    edge.set(42);
    assert!(edge.is_retrievable());
    assert_eq!(edge.get(), 42);
}

#[test]
#[should_panic(expected = "twice")]
fn second_set_panics() {
    let task = Task::<i32, ()>::new();
    let edge = task.output_edge();
    edge.set(100);
    edge.set(200);
}

#[test]
#[should_panic(expected = "retrievable")]
fn get_before_set_panics() {
    let task = Task::<i32, ()>::new();
    let _ = task.output_edge().get();
}

#[test]
fn owner_points_back_to_the_producing_node() {
    let task = Task::<i32, ()>::new();
    let owner = task.output_edge().owner().expect("producer is alive");

    assert_eq!(owner.input_edge_count(), 0);
    assert_eq!(
        Arc::as_ptr(&owner) as *const () as usize,
        Arc::as_ptr(&task) as *const () as usize,
    );
}

#[test]
fn owner_is_gone_once_the_producer_drops() {
    let task = Task::<i32, ()>::new();
    let edge = Arc::clone(task.output_edge());
    drop(task);
    assert!(edge.owner().is_none());
}

#[test]
fn wait_retrievable_blocks_until_set() {
    let task = Task::<i32, ()>::new();
    let edge = Arc::clone(task.output_edge());

    let setter = {
        let edge = Arc::clone(&edge);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            edge.set(99);
        })
    };

    edge.wait_retrievable();
    assert!(edge.is_retrievable());
    assert_eq!(edge.get(), 99);

    setter.join().unwrap();
}

#[test]
fn unit_edge_latches_without_data() {
    let task = Task::<(), ()>::new();
    let edge = Arc::clone(task.output_edge());

    assert!(!edge.is_retrievable());

    let setter = {
        let edge = Arc::clone(&edge);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            edge.set(());
        })
    };

    edge.wait_retrievable();
    assert!(edge.is_retrievable());

    setter.join().unwrap();
}

#[test]
fn many_consumers_observe_the_same_value() {
    let task = Task::<String, ()>::new();
    let edge = Arc::clone(task.output_edge());

    let consumers: Vec<_> = (0..4)
        .map(|_| {
            let edge = Arc::clone(&edge);
            thread::spawn(move || {
                edge.wait_retrievable();
                edge.get()
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(5));
    edge.set("payload".to_owned());

    for consumer in consumers {
        assert_eq!(consumer.join().unwrap(), "payload");
    }
}
