//! Resource factory collaborator boundary

use crate::errors::PoolResult;
use crate::object::PooledObject;

/// Manufactures, validates, and destroys the resources a pool manages.
///
/// The pool drives this trait per its own policy: `make_object` when it
/// needs capacity, `validate_object` during eviction tests or on
/// borrow/return, and `destroy_object` after it has observed a wrapper
/// in the `Invalid` state. The wrapper itself never calls the factory.
pub trait PooledObjectFactory<T>: Send + Sync {
    /// Manufacture a resource and wrap it. The wrapper starts `Idle`.
    fn make_object(&self) -> PoolResult<PooledObject<T>>;

    /// Whether the resource is still fit to hand out. Called by eviction
    /// sweeps on wrappers they have claimed with `start_eviction_test`.
    fn validate_object(&self, object: &PooledObject<T>) -> bool {
        let _ = object;
        true
    }

    /// Tear down a resource the pool has retired. The default drops it.
    fn destroy_object(&self, object: PooledObject<T>) -> PoolResult<()> {
        drop(object);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PoolError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ConnFactory {
        next: AtomicUsize,
        destroyed: AtomicUsize,
        fail_creation: bool,
    }

    impl ConnFactory {
        fn new(fail_creation: bool) -> Self {
            Self {
                next: AtomicUsize::new(0),
                destroyed: AtomicUsize::new(0),
                fail_creation,
            }
        }
    }

    impl PooledObjectFactory<String> for ConnFactory {
        fn make_object(&self) -> PoolResult<PooledObject<String>> {
            if self.fail_creation {
                return Err(PoolError::Creation("backend unreachable".into()));
            }
            let n = self.next.fetch_add(1, Ordering::Relaxed);
            Ok(PooledObject::new(format!("conn-{n}")))
        }

        fn validate_object(&self, object: &PooledObject<String>) -> bool {
            !object.resource().is_empty()
        }

        fn destroy_object(&self, object: PooledObject<String>) -> PoolResult<()> {
            self.destroyed.fetch_add(1, Ordering::Relaxed);
            drop(object.into_inner());
            Ok(())
        }
    }

    #[test]
    fn test_make_and_destroy() {
        let factory = ConnFactory::new(false);

        let slot = factory.make_object().unwrap();
        assert_eq!(*slot.resource(), "conn-0");
        assert!(factory.validate_object(&slot));

        slot.invalidate();
        factory.destroy_object(slot).unwrap();
        assert_eq!(factory.destroyed.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_creation_failure_surfaces() {
        let factory = ConnFactory::new(true);
        let err = factory.make_object().unwrap_err();
        assert!(matches!(err, PoolError::Creation(_)));
    }

    #[test]
    fn test_default_validate_accepts() {
        struct Bare;
        impl PooledObjectFactory<u32> for Bare {
            fn make_object(&self) -> PoolResult<PooledObject<u32>> {
                Ok(PooledObject::new(0))
            }
        }

        let factory = Bare;
        let slot = factory.make_object().unwrap();
        assert!(factory.validate_object(&slot));
        factory.destroy_object(slot).unwrap();
    }
}
