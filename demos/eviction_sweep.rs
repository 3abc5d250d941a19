//! A miniature pool showing the eviction sweep racing a borrower.
//!
//! The interesting moment is a borrower trying to allocate the exact
//! wrapper the sweep is validating: the borrower is rejected on the spot,
//! picks another candidate, and once the sweep finishes the contested
//! wrapper goes back to the head of the idle queue.

use dashmap::DashMap;
use parking_lot::Mutex;
use pooled_object::PooledObject;
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

struct MiniPool {
    idle: Mutex<VecDeque<Arc<PooledObject<String>>>>,
    active: DashMap<usize, Arc<PooledObject<String>>>,
}

impl MiniPool {
    fn new(resources: Vec<String>) -> Self {
        let idle = resources
            .into_iter()
            .map(|r| Arc::new(PooledObject::new(r)))
            .collect();
        Self {
            idle: Mutex::new(idle),
            active: DashMap::new(),
        }
    }

    /// Pop idle candidates until one allocates; candidates that refuse
    /// (e.g. claimed by the sweep) go to the back of the queue.
    fn borrow(&self) -> Option<Arc<PooledObject<String>>> {
        let mut attempts = self.idle.lock().len();
        while attempts > 0 {
            attempts -= 1;
            let candidate = self.idle.lock().pop_front()?;
            if candidate.allocate() {
                self.active
                    .insert(Arc::as_ptr(&candidate) as usize, Arc::clone(&candidate));
                return Some(candidate);
            }
            // under eviction test; the sweep will requeue it at the head
        }
        None
    }

    fn give_back(&self, slot: Arc<PooledObject<String>>) {
        if slot.deallocate() {
            self.active.remove(&(Arc::as_ptr(&slot) as usize));
            self.idle.lock().push_back(slot);
        }
    }

    /// Validate the stalest idle wrapper, holding it just long enough for
    /// a borrower to collide with the test.
    fn sweep_once(&self) {
        let candidate = {
            let queue = self.idle.lock();
            queue.iter().min_by(|a, b| a.cmp(b)).map(Arc::clone)
        };
        let Some(slot) = candidate else { return };

        if !slot.start_eviction_test() {
            return;
        }
        println!("   [sweep] testing {}", slot.resource());
        thread::sleep(Duration::from_millis(50));

        let clean = PooledObject::end_eviction_test_requeue(&slot, &self.idle);
        println!(
            "   [sweep] done with {}, contested: {}",
            slot.resource(),
            !clean
        );
    }
}

fn main() {
    println!("=== pooled-object - Eviction Sweep Example ===\n");

    let pool = Arc::new(MiniPool::new(vec![
        "conn-a".into(),
        "conn-b".into(),
        "conn-c".into(),
    ]));

    // conn-a is the stalest wrapper, so the sweep picks it first
    let sweeper = {
        let pool = Arc::clone(&pool);
        thread::spawn(move || pool.sweep_once())
    };

    thread::sleep(Duration::from_millis(10));

    // borrowers arrive while the sweep holds conn-a; they skip past it
    let first = pool.borrow().expect("an untested wrapper is available");
    println!("   [borrower] got {}", first.resource());

    sweeper.join().expect("sweep thread finished");

    pool.give_back(first);

    // conn-a was requeued at the head, so it is the next offered
    let next = pool.borrow().expect("idle queue is non-empty");
    println!("   [borrower] next offered: {}", next.resource());
    pool.give_back(next);

    println!("\n   Idle queue size at rest: {}", pool.idle.lock().len());
}
