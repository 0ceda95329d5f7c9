mod helpers;

use coda_core::{Message, QueueRegistry};

/// Full happy path through the registry: create, publish, consume,
/// acknowledge, delete.
#[test]
fn e2e_publish_consume_acknowledge_round_trip() {
    let registry = QueueRegistry::new();
    let queue = registry.create_queue("orders", helpers::fast_config()).unwrap();

    queue.publish(Message::new("Order #1"));
    queue.publish(Message::new("Order #2"));

    let first = queue.consume().unwrap();
    assert_eq!(first.payload(), b"Order #1");
    queue.acknowledge(first.handle()).unwrap();

    let second = queue.consume().unwrap();
    assert_eq!(second.payload(), b"Order #2");
    queue.acknowledge(second.handle()).unwrap();

    helpers::assert_empty(&queue);
    registry.delete_queue("orders");
}

#[test]
fn e2e_nack_roundtrips_back_to_the_consumer() {
    let registry = QueueRegistry::new();
    let queue = registry.create_queue("orders", helpers::fast_config()).unwrap();

    queue.publish(Message::new("retry me"));

    let first = queue.consume().unwrap();
    queue.nack(first.handle()).unwrap();

    let second = helpers::consume_within(&queue, 500);
    assert_eq!(second.payload(), b"retry me");
    assert_eq!(second.retry_count(), 1);
    assert_ne!(second.handle(), first.handle());
    queue.acknowledge(second.handle()).unwrap();
}

#[test]
fn e2e_multiple_queues_are_independent() {
    let registry = QueueRegistry::new();
    let orders = registry.create_queue("orders", helpers::fast_config()).unwrap();
    let billing = registry.create_queue("billing", helpers::fast_config()).unwrap();

    orders.publish(Message::new("order"));
    billing.publish(Message::new("invoice"));

    assert_eq!(orders.consume().unwrap().payload(), b"order");
    assert_eq!(billing.consume().unwrap().payload(), b"invoice");
    helpers::assert_empty(&orders);
    helpers::assert_empty(&billing);
}
