mod helpers;

use std::sync::Arc;
use std::thread;

use coda_core::{GetQueueError, Message, QueueRegistry};

#[test]
fn e2e_create_is_idempotent() {
    let registry = QueueRegistry::new();
    let first = registry.create_queue("orders", helpers::fast_config()).unwrap();
    let second = registry.create_queue("orders", helpers::fast_config()).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn e2e_concurrent_creates_converge_on_one_instance() {
    let registry = Arc::new(QueueRegistry::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.create_queue("orders", helpers::fast_config()).unwrap())
        })
        .collect();
    let queues: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for queue in &queues[1..] {
        assert!(Arc::ptr_eq(&queues[0], queue));
    }

    // The shared instance really is one queue: a publish through one handle
    // is visible through another.
    queues[0].publish(Message::new("shared"));
    assert_eq!(queues[7].consume().unwrap().payload(), b"shared");
}

#[test]
fn e2e_get_unknown_queue_fails() {
    let registry = QueueRegistry::new();
    assert!(matches!(
        registry.get_queue("missing"),
        Err(GetQueueError::QueueNotFound(_))
    ));
}

#[test]
fn e2e_delete_then_recreate_yields_a_fresh_queue() {
    let registry = QueueRegistry::new();
    let first = registry.create_queue("orders", helpers::fast_config()).unwrap();
    first.publish(Message::new("old world"));
    registry.delete_queue("orders");

    let second = registry.create_queue("orders", helpers::fast_config()).unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    helpers::assert_empty(&second);
}

#[test]
fn e2e_list_tracks_creates_and_deletes() {
    let registry = QueueRegistry::new();
    registry.create_queue("a", helpers::fast_config()).unwrap();
    registry.create_queue("b", helpers::fast_config()).unwrap();
    let config = coda_core::QueueConfig {
        dead_letter_queue: Some("b-dlq".to_string()),
        ..helpers::fast_config()
    };
    registry.create_queue("c", config).unwrap();

    let mut names = registry.list_queues();
    names.sort();
    assert_eq!(names, ["a", "b", "b-dlq", "c"]);

    registry.delete_queue("c");
    let mut names = registry.list_queues();
    names.sort();
    assert_eq!(names, ["a", "b", "b-dlq"], "the DLQ outlives its parent");
}
