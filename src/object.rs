//! The pooled-object wrapper and its lifecycle state machine

use crate::clock;
use crate::queue::IdleQueue;
use crate::state::PooledObjectState;

use parking_lot::Mutex;
use std::cmp::Ordering as CmpOrdering;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::time::Duration;

/// Creation sequence numbers, process-wide. The sequence is the identity
/// tie-break for the ordering relation.
static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Outcome of [`PooledObject::end_eviction_test`].
///
/// Only [`Ended`](EvictionTestEnd::Ended) counts as success.
/// [`ReturnToHead`](EvictionTestEnd::ReturnToHead) is a failure that
/// carries an obligation: the caller must reinsert the wrapper at the
/// head of the idle queue, or the object is lost from the pool.
#[must_use = "a ReturnToHead outcome obligates the caller to reinsert the wrapper at the idle-queue head"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionTestEnd {
    /// The eviction test concluded; the wrapper is idle again
    Ended,

    /// A borrower tried to allocate the wrapper mid-test; it is idle again
    /// but must go back to the idle-queue head so it is the next offered
    ReturnToHead,

    /// The wrapper was not under an eviction test; nothing changed
    NotUnderTest,
}

impl EvictionTestEnd {
    /// Whether the test ended cleanly.
    pub fn succeeded(self) -> bool {
        self == EvictionTestEnd::Ended
    }

    /// Whether the caller owes a head reinsertion.
    pub fn needs_requeue(self) -> bool {
        self == EvictionTestEnd::ReturnToHead
    }
}

/// Tracks lifecycle state and timing for one pooled resource.
///
/// The wrapper exclusively owns its resource and serializes all state
/// transitions through its own lock, so borrower threads, returner
/// threads, and the eviction sweep can race on the same instance without
/// corrupting it: every transition either succeeds or fails immediately,
/// and at most one borrower holds the `Allocated` state at a time.
///
/// State and timestamp reads never take the lock. They are snapshots and
/// may be stale by the time the caller looks at them; transition
/// decisions are made internally from the locked state only.
///
/// # Examples
///
/// ```
/// use pooled_object::{PooledObject, PooledObjectState};
///
/// let slot = PooledObject::new("db-conn-1");
///
/// assert!(slot.allocate());
/// assert_eq!(slot.state(), PooledObjectState::Allocated);
/// assert_eq!(*slot.resource(), "db-conn-1");
///
/// assert!(slot.deallocate());
/// assert_eq!(slot.state(), PooledObjectState::Idle);
/// ```
pub struct PooledObject<T> {
    resource: T,

    /// Serializes transitions; never held while reading metrics
    transition_lock: Mutex<()>,

    /// Current state code, readable without the lock; written only while
    /// the lock is held
    state: AtomicU8,

    sequence: u64,
    create_time: u64,
    last_borrow_time: AtomicU64,
    last_return_time: AtomicU64,
}

impl<T> PooledObject<T> {
    /// Wrap a freshly manufactured resource. The wrapper starts `Idle`,
    /// with borrow and return times equal to the creation time.
    pub fn new(resource: T) -> Self {
        let now = clock::now_millis();
        Self {
            resource,
            transition_lock: Mutex::new(()),
            state: AtomicU8::new(PooledObjectState::Idle.code()),
            sequence: SEQUENCE.fetch_add(1, Ordering::Relaxed),
            create_time: now,
            last_borrow_time: AtomicU64::new(now),
            last_return_time: AtomicU64::new(now),
        }
    }

    /// The wrapped resource.
    ///
    /// The wrapper does not police access: only the thread that
    /// successfully transitioned the wrapper to `Allocated` may use the
    /// resource, until it deallocates.
    pub fn resource(&self) -> &T {
        &self.resource
    }

    /// Consume the wrapper and hand the resource back, for the
    /// destruction path after the pool has observed `Invalid`.
    pub fn into_inner(self) -> T {
        self.resource
    }

    /// Current lifecycle state, read without the transition lock.
    pub fn state(&self) -> PooledObjectState {
        self.load_state()
    }

    /// Creation time on the shared clock basis (see [`crate::clock`]).
    pub fn create_time_millis(&self) -> u64 {
        self.create_time
    }

    /// Time of the last successful allocation; the creation time if the
    /// wrapper has never been allocated.
    pub fn last_borrow_time_millis(&self) -> u64 {
        self.last_borrow_time.load(Ordering::Relaxed)
    }

    /// Time of the last successful deallocation; the creation time if the
    /// wrapper has never been returned.
    pub fn last_return_time_millis(&self) -> u64 {
        self.last_return_time.load(Ordering::Relaxed)
    }

    /// How long the wrapper last spent allocated. While it is still
    /// allocated the value keeps growing on each call.
    ///
    /// The two timestamps are snapshotted independently of any in-flight
    /// transition; a return landing between the reads can make one call
    /// reflect the older cycle. Tolerated, not corrected.
    pub fn active_duration(&self) -> Duration {
        // Take copies to tolerate racing transitions
        let returned = self.last_return_time.load(Ordering::Relaxed);
        let borrowed = self.last_borrow_time.load(Ordering::Relaxed);

        if returned > borrowed {
            Duration::from_millis(returned - borrowed)
        } else {
            Duration::from_millis(clock::now_millis().saturating_sub(borrowed))
        }
    }

    /// How long since the wrapper was last returned, regardless of its
    /// current state. Allocation does not reset this; right after a
    /// borrow it still reflects the idle stretch that preceded it.
    pub fn idle_duration(&self) -> Duration {
        let returned = self.last_return_time.load(Ordering::Relaxed);
        Duration::from_millis(clock::now_millis().saturating_sub(returned))
    }

    /// Hand the wrapper to a borrower.
    ///
    /// Succeeds only from `Idle`, stamping the borrow time. If an
    /// eviction sweep currently owns the wrapper, the borrower is
    /// rejected and the wrapper moves to `EvictionTestingReturnToHead`
    /// so the sweep knows to send it back to the idle-queue head.
    ///
    /// # Examples
    ///
    /// ```
    /// use pooled_object::PooledObject;
    ///
    /// let slot = PooledObject::new(42);
    /// assert!(slot.allocate());
    /// assert!(!slot.allocate()); // already held by a borrower
    /// ```
    pub fn allocate(&self) -> bool {
        let _guard = self.transition_lock.lock();
        match self.load_state() {
            PooledObjectState::Idle => {
                self.store_state(PooledObjectState::Allocated);
                self.last_borrow_time
                    .store(clock::now_millis(), Ordering::Relaxed);
                true
            }
            PooledObjectState::EvictionTesting => {
                self.store_state(PooledObjectState::EvictionTestingReturnToHead);
                false
            }
            _ => false,
        }
    }

    /// Return the wrapper from a borrower.
    ///
    /// Succeeds only from `Allocated`, stamping the return time.
    pub fn deallocate(&self) -> bool {
        let _guard = self.transition_lock.lock();
        match self.load_state() {
            PooledObjectState::Allocated => {
                self.store_state(PooledObjectState::Idle);
                self.last_return_time
                    .store(clock::now_millis(), Ordering::Relaxed);
                true
            }
            _ => false,
        }
    }

    /// Claim the wrapper for an eviction test. Succeeds only from `Idle`.
    pub fn start_eviction_test(&self) -> bool {
        let _guard = self.transition_lock.lock();
        match self.load_state() {
            PooledObjectState::Idle => {
                self.store_state(PooledObjectState::EvictionTesting);
                true
            }
            _ => false,
        }
    }

    /// Release the wrapper from an eviction test.
    ///
    /// From `EvictionTesting` the wrapper goes back to `Idle` and the
    /// outcome is [`EvictionTestEnd::Ended`]. From
    /// `EvictionTestingReturnToHead` it also goes back to `Idle`, but the
    /// outcome is [`EvictionTestEnd::ReturnToHead`]: the caller must push
    /// the wrapper to the head of the idle queue (or use
    /// [`PooledObject::end_eviction_test_requeue`], which does it).
    pub fn end_eviction_test(&self) -> EvictionTestEnd {
        let _guard = self.transition_lock.lock();
        match self.load_state() {
            PooledObjectState::EvictionTesting => {
                self.store_state(PooledObjectState::Idle);
                EvictionTestEnd::Ended
            }
            PooledObjectState::EvictionTestingReturnToHead => {
                self.store_state(PooledObjectState::Idle);
                EvictionTestEnd::ReturnToHead
            }
            _ => EvictionTestEnd::NotUnderTest,
        }
    }

    /// [`PooledObject::end_eviction_test`] plus the head reinsertion the
    /// `ReturnToHead` outcome demands, collapsed to plain success/failure.
    ///
    /// Associated function, so the wrapper can hand a clone of its own
    /// `Arc` to the queue:
    ///
    /// ```
    /// use parking_lot::Mutex;
    /// use pooled_object::PooledObject;
    /// use std::collections::VecDeque;
    /// use std::sync::Arc;
    ///
    /// let slot = Arc::new(PooledObject::new("db-conn-1"));
    /// let idle: Mutex<VecDeque<Arc<PooledObject<&str>>>> = Mutex::new(VecDeque::new());
    ///
    /// assert!(slot.start_eviction_test());
    /// assert!(!slot.allocate()); // borrower loses the race mid-test
    ///
    /// assert!(!PooledObject::end_eviction_test_requeue(&slot, &idle));
    /// assert_eq!(idle.lock().len(), 1); // back at the head, next offered
    /// ```
    pub fn end_eviction_test_requeue<Q>(this: &Arc<Self>, idle_queue: &Q) -> bool
    where
        Q: IdleQueue<T> + ?Sized,
    {
        match this.end_eviction_test() {
            EvictionTestEnd::Ended => true,
            EvictionTestEnd::ReturnToHead => {
                idle_queue.push_head(Arc::clone(this));
                false
            }
            EvictionTestEnd::NotUnderTest => false,
        }
    }

    /// Force the terminal `Invalid` state, from any state. Never fails:
    /// a resource found broken must not be handed out again, whatever
    /// the wrapper was doing when that was discovered.
    pub fn invalidate(&self) {
        let _guard = self.transition_lock.lock();
        self.store_state(PooledObjectState::Invalid);
    }

    fn load_state(&self) -> PooledObjectState {
        PooledObjectState::from_code(self.state.load(Ordering::Relaxed))
    }

    fn store_state(&self, state: PooledObjectState) {
        self.state.store(state.code(), Ordering::Relaxed);
    }
}

impl<T> PartialEq for PooledObject<T> {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence
    }
}

impl<T> Eq for PooledObject<T> {}

impl<T> PartialOrd for PooledObject<T> {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

/// Eviction-sweep order: oldest-returned-first, with the creation
/// sequence keeping the order total when return times collide. The
/// return time moves on deallocation, so ordered containers must
/// re-insert a wrapper after it cycles.
impl<T> Ord for PooledObject<T> {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        let mine = self.last_return_time.load(Ordering::Relaxed);
        let theirs = other.last_return_time.load(Ordering::Relaxed);
        mine.cmp(&theirs)
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

impl<T: fmt::Display> fmt::Display for PooledObject<T> {
    /// Debug rendering; the format is not fixed and may change at any
    /// time. Do not parse it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object: {}, State: {}", self.resource, self.load_state())
    }
}

impl<T: fmt::Debug> fmt::Debug for PooledObject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledObject")
            .field("resource", &self.resource)
            .field("state", &self.load_state())
            .field("sequence", &self.sequence)
            .field("create_time_millis", &self.create_time)
            .field("last_borrow_time_millis", &self.last_borrow_time_millis())
            .field("last_return_time_millis", &self.last_return_time_millis())
            .finish()
    }
}
