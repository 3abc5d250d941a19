//! Basic lifecycle walkthrough for PooledObject

use pooled_object::{PooledObject, PooledObjectState};
use std::thread;
use std::time::Duration;

fn main() {
    println!("=== pooled-object - Basic Examples ===\n");

    // Example 1: borrow and return
    borrow_and_return();

    // Example 2: the eviction-test sub-states
    eviction_testing();

    // Example 3: invalidation is terminal
    invalidation();

    // Example 4: timing metrics
    timing_metrics();
}

fn borrow_and_return() {
    println!("1. Borrow and Return:");
    let slot = PooledObject::new("db-conn-1");

    assert!(slot.allocate());
    println!("   Borrowed: {}", slot.resource());
    println!("   Second borrower rejected: {}", !slot.allocate());

    assert!(slot.deallocate());
    println!("   Returned, state: {}\n", slot.state());
}

fn eviction_testing() {
    println!("2. Eviction Testing:");
    let slot = PooledObject::new("db-conn-2");

    assert!(slot.start_eviction_test());
    println!("   Sweep claimed the object: {}", slot.state());

    // a borrower arrives mid-test and is turned away immediately
    assert!(!slot.allocate());
    println!("   Borrower rejected, state: {}", slot.state());

    let outcome = slot.end_eviction_test();
    println!(
        "   Test over, requeue obligation: {}, state: {}\n",
        outcome.needs_requeue(),
        slot.state()
    );
}

fn invalidation() {
    println!("3. Invalidation:");
    let slot = PooledObject::new("db-conn-3");

    assert!(slot.allocate());
    slot.invalidate();
    println!("   Forced terminal state: {}", slot.state());
    println!("   Borrow after invalidation rejected: {}\n", !slot.allocate());
}

fn timing_metrics() {
    println!("4. Timing Metrics:");
    let slot = PooledObject::new("db-conn-4");

    thread::sleep(Duration::from_millis(25));
    println!("   Idle for {:?}", slot.idle_duration());

    assert!(slot.allocate());
    thread::sleep(Duration::from_millis(25));
    assert!(slot.deallocate());
    println!("   Last active stretch: {:?}", slot.active_duration());
    assert_eq!(slot.state(), PooledObjectState::Idle);
}
