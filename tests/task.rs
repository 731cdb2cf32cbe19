#![cfg(not(feature = "loom"))]

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
    time::Duration,
};
use weft::{
    graph::compute_reachability,
    task::{AnyTask, Task, TaskState},
    types::Unit,
};

#[test]
fn runs_to_completion_without_dependencies() {
    let task = Task::<i32, ()>::new();
    task.set_callable(|| 42);

    assert_eq!(task.state(), TaskState::Incomplete);
    assert_eq!(task.result(), None);
    assert_eq!(task.duration(), None);

    task.run();

    assert_eq!(task.state(), TaskState::Complete);
    assert_eq!(task.result(), Some(42));
}

#[test]
fn consumes_the_producer_output() {
    let producer = Task::<i32, ()>::new();
    producer.set_callable(|| 100);

    let consumer = Task::<i32, (i32,)>::new();
    consumer.set_callable(|value: i32| value * 2);
    consumer.bind_input(producer.output_edge()).unwrap();

    producer.run();
    consumer.run();

    assert_eq!(consumer.state(), TaskState::Complete);
    assert_eq!(consumer.result(), Some(200));
}

#[test]
fn wait_blocks_until_complete() {
    let task = Task::<i32, ()>::new();
    task.set_callable(|| {
        thread::sleep(Duration::from_millis(10));
        42
    });

    let runner = {
        let task = Arc::clone(&task);
        thread::spawn(move || task.run())
    };

    assert_eq!(task.wait(), TaskState::Complete);
    assert_eq!(task.result(), Some(42));

    runner.join().unwrap();
}

#[test]
fn unbound_input_feeds_the_default_value() {
    let task = Task::<i32, (i32,)>::new();
    task.set_callable(|prev: i32| prev + 7);
    task.run();
    assert_eq!(task.result(), Some(7));
}

#[test]
fn mixes_input_types() {
    let ints = Task::<i32, ()>::new();
    ints.set_callable(|| 10);
    let floats = Task::<f64, ()>::new();
    floats.set_callable(|| 3.25);

    let consumer = Task::<i32, (i32, f64)>::new();
    consumer.set_callable(|a: i32, b: f64| a + b as i32);
    consumer.bind_input(ints.output_edge()).unwrap();
    consumer.bind_input(floats.output_edge()).unwrap();

    ints.run();
    floats.run();
    consumer.run();

    assert_eq!(ints.result(), Some(10));
    assert_eq!(floats.result(), Some(3.25));
    assert_eq!(consumer.result(), Some(13));
}

#[test]
fn unit_tasks_order_without_data() {
    let counter = Arc::new(AtomicUsize::new(0));

    let first = Task::<Unit, ()>::new();
    {
        let counter = Arc::clone(&counter);
        first.set_callable(move || {
            counter.store(1, Ordering::SeqCst);
        });
    }

    // A unit input gates the task but never reaches the callable, so the
    // dependent callable takes no arguments.
    let second = Task::<Unit, (Unit,)>::new();
    {
        let counter = Arc::clone(&counter);
        second.set_callable(move || {
            counter.store(2, Ordering::SeqCst);
        });
    }
    second.bind_input(first.output_edge()).unwrap();

    first.run();
    second.run();

    assert_eq!(counter.load(Ordering::SeqCst), 2);
    assert_eq!(second.state(), TaskState::Complete);
}

#[test]
fn unit_inputs_are_dropped_from_the_callable_arguments() {
    let trigger = Task::<Unit, ()>::new();
    trigger.set_callable(|| {});

    let number = Task::<i32, ()>::new();
    number.set_callable(|| 5);

    // Declared inputs are (Unit, i32); the callable sees only the i32.
    let consumer = Task::<i32, (Unit, i32)>::new();
    consumer.set_callable(|value: i32| value * 3);
    consumer.bind_input_at::<0>(trigger.output_edge());
    consumer.bind_input(number.output_edge()).unwrap();

    trigger.run();
    number.run();
    consumer.run();

    assert_eq!(consumer.result(), Some(15));
    assert_eq!(consumer.input_edge_count(), 2);
}

#[test]
fn duration_covers_the_callable() {
    let task = Task::<i32, ()>::new();
    task.set_callable(|| {
        thread::sleep(Duration::from_millis(50));
        42
    });

    assert_eq!(task.duration(), None);
    task.run();
    assert!(task.duration().expect("task is complete") >= Duration::from_millis(50));
}

#[test]
fn carries_name_and_description() {
    let task = Task::<i32, ()>::new();
    assert_eq!(task.name(), "");
    assert_eq!(task.description(), "");

    task.set_name("seed");
    task.set_description("produces the root value");
    assert_eq!(task.name(), "seed");
    assert_eq!(task.description(), "produces the root value");
}

#[test]
fn orders_by_reachability() {
    let producer = Task::<i32, ()>::new();
    producer.set_callable(|| 1);

    let consumer = Task::<i32, (i32,)>::new();
    consumer.set_callable(|value: i32| value + 1);
    consumer.bind_input(producer.output_edge()).unwrap();

    compute_reachability([producer.as_node(), consumer.as_node()]);

    assert!(producer.runs_before(&*consumer));
    assert!(!consumer.runs_before(&*producer));
}

#[test]
#[should_panic(expected = "set_callable")]
fn running_without_a_callable_panics() {
    let task = Task::<i32, ()>::new();
    task.run();
}
