#![cfg(not(feature = "loom"))]

use weft::{node::BindError, task::Task};

#[test]
fn zero_input_node() {
    let task = Task::<i32, ()>::new();

    assert_eq!(task.input_edge_count(), 0);
    assert!(task.input_edges().is_empty());
    assert_eq!(task.reachability(), 0);
    assert!(!task.output_edge().is_retrievable());
}

#[test]
fn bind_by_type_fills_the_matching_slots() {
    let int_producer = Task::<i32, ()>::new();
    let float_producer = Task::<f64, ()>::new();

    let consumer = Task::<i32, (i32, f64)>::new();
    assert_eq!(consumer.input_edge_count(), 2);

    consumer.bind_input(int_producer.output_edge()).unwrap();
    consumer.bind_input(float_producer.output_edge()).unwrap();

    let edges = consumer.input_edges();
    assert_eq!(edges.len(), 2);
    assert!(edges.iter().all(Option::is_some));
}

#[test]
fn bind_rejects_an_undeclared_payload_type() {
    let producer = Task::<bool, ()>::new();
    let consumer = Task::<i32, (i32, f64)>::new();

    assert_eq!(
        consumer.bind_input(producer.output_edge()),
        Err(BindError::UnknownInputType)
    );
    assert!(consumer.input_edges().iter().all(Option::is_none));
}

#[test]
fn bind_rejects_a_repeated_payload_type() {
    let producer = Task::<i32, ()>::new();
    let consumer = Task::<i32, (i32, i32)>::new();

    assert_eq!(
        consumer.bind_input(producer.output_edge()),
        Err(BindError::AmbiguousInputType)
    );

    // Indexed binding stays admissible when types repeat.
    consumer.bind_input_at::<0>(producer.output_edge());
    consumer.bind_input_at::<1>(producer.output_edge());
    assert!(consumer.input_edges().iter().all(Option::is_some));
}

#[test]
fn input_values_by_type_and_index() {
    let int_producer = Task::<i32, ()>::new();
    let float_producer = Task::<f64, ()>::new();
    int_producer.output_edge().set(100);
    float_producer.output_edge().set(2.5);

    let consumer = Task::<i32, (i32, f64)>::new();
    consumer.bind_input(int_producer.output_edge()).unwrap();
    consumer.bind_input_at::<1>(float_producer.output_edge());

    assert_eq!(consumer.input_value::<i32>(), Ok(100));
    assert_eq!(consumer.input_value::<f64>(), Ok(2.5));
    assert_eq!(consumer.input_value_at::<0>(), 100);
    assert_eq!(consumer.input_value_at::<1>(), 2.5);
}

#[test]
fn unbound_inputs_yield_defaults() {
    let consumer = Task::<i32, (i32, String)>::new();

    assert_eq!(consumer.input_value::<i32>(), Ok(0));
    assert_eq!(consumer.input_value::<String>(), Ok(String::new()));
    assert_eq!(consumer.input_value_at::<0>(), 0);
    assert_eq!(
        consumer.input_value::<bool>(),
        Err(BindError::UnknownInputType)
    );
}

#[test]
fn rebinding_replaces_the_previous_edge() {
    let first = Task::<i32, ()>::new();
    let second = Task::<i32, ()>::new();
    first.output_edge().set(1);
    second.output_edge().set(2);

    let consumer = Task::<i32, (i32,)>::new();
    consumer.bind_input(first.output_edge()).unwrap();
    consumer.bind_input(second.output_edge()).unwrap();

    assert_eq!(consumer.input_value::<i32>(), Ok(2));
}

#[test]
fn run_publishes_the_output_edge() {
    let task = Task::<i32, ()>::new();
    task.set_callable(|| 42);
    task.run();

    assert!(task.output_edge().is_retrievable());
    assert_eq!(task.output_edge().get(), 42);
}

#[test]
fn unit_run_publishes_the_output_edge() {
    let task = Task::<(), ()>::new();
    task.set_callable(|| {});
    task.run();

    assert!(task.output_edge().is_retrievable());
}
