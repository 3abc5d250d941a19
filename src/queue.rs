//! Idle-queue collaborator boundary

use crate::object::PooledObject;

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// The one operation the wrapper demands of the pool's idle queue.
///
/// When an eviction test ends with
/// [`ReturnToHead`](crate::EvictionTestEnd::ReturnToHead), the wrapper
/// must be reinserted at the head of the idle queue so it is the next
/// object offered, restoring the recency ordering the aborted test
/// disturbed. The wrapper does not own the queue; it only requires this
/// seam.
pub trait IdleQueue<T> {
    /// Insert the wrapper at the head of the queue.
    fn push_head(&self, object: Arc<PooledObject<T>>);
}

/// The obvious idle-queue shape: a deque of shared wrappers under a lock.
///
/// # Examples
///
/// ```
/// use parking_lot::Mutex;
/// use pooled_object::{IdleQueue, PooledObject};
/// use std::collections::VecDeque;
/// use std::sync::Arc;
///
/// let idle: Mutex<VecDeque<Arc<PooledObject<u32>>>> = Mutex::new(VecDeque::new());
/// idle.push_head(Arc::new(PooledObject::new(1)));
/// idle.push_head(Arc::new(PooledObject::new(2)));
///
/// // the most recently pushed wrapper is the next offered
/// let next = idle.lock().pop_front().unwrap();
/// assert_eq!(*next.resource(), 2);
/// ```
impl<T> IdleQueue<T> for Mutex<VecDeque<Arc<PooledObject<T>>>> {
    fn push_head(&self, object: Arc<PooledObject<T>>) {
        self.lock().push_front(object);
    }
}
