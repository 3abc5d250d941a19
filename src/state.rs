//! Lifecycle states for pooled object wrappers

use std::fmt;

/// Lifecycle state of a [`PooledObject`](crate::PooledObject).
///
/// The set is closed: a wrapper is always in exactly one of these five
/// states, and only the transitions performed by the wrapper's own
/// operations are legal. `Invalid` is terminal.
///
/// # Examples
///
/// ```
/// use pooled_object::{PooledObject, PooledObjectState};
///
/// let slot = PooledObject::new("db-conn-1");
/// assert_eq!(slot.state(), PooledObjectState::Idle);
///
/// slot.allocate();
/// assert_eq!(slot.state(), PooledObjectState::Allocated);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum PooledObjectState {
    /// In the idle queue, available for allocation or eviction testing
    Idle = 0,

    /// Checked out by exactly one borrower
    Allocated = 1,

    /// Being examined by the eviction sweep
    EvictionTesting = 2,

    /// Under eviction test, but a borrower tried to allocate it meanwhile;
    /// when the test ends the wrapper must go back to the idle-queue head
    EvictionTestingReturnToHead = 3,

    /// Permanently unusable; the pool should destroy the resource
    Invalid = 4,
}

impl PooledObjectState {
    /// Whether the wrapper is sitting idle, available to borrowers.
    pub fn is_idle(self) -> bool {
        self == PooledObjectState::Idle
    }

    /// Whether the wrapper is checked out by a borrower.
    pub fn is_allocated(self) -> bool {
        self == PooledObjectState::Allocated
    }

    /// Whether an eviction sweep currently owns the wrapper.
    pub fn is_under_eviction_test(self) -> bool {
        matches!(
            self,
            PooledObjectState::EvictionTesting | PooledObjectState::EvictionTestingReturnToHead
        )
    }

    /// Whether the wrapper has reached its terminal state.
    pub fn is_invalid(self) -> bool {
        self == PooledObjectState::Invalid
    }

    pub(crate) fn code(self) -> u8 {
        self as u8
    }

    pub(crate) fn from_code(code: u8) -> Self {
        match code {
            0 => PooledObjectState::Idle,
            1 => PooledObjectState::Allocated,
            2 => PooledObjectState::EvictionTesting,
            3 => PooledObjectState::EvictionTestingReturnToHead,
            4 => PooledObjectState::Invalid,
            _ => unreachable!("state codes are written only from PooledObjectState values"),
        }
    }
}

impl fmt::Display for PooledObjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PooledObjectState::Idle => "Idle",
            PooledObjectState::Allocated => "Allocated",
            PooledObjectState::EvictionTesting => "EvictionTesting",
            PooledObjectState::EvictionTestingReturnToHead => "EvictionTestingReturnToHead",
            PooledObjectState::Invalid => "Invalid",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trip() {
        let all = [
            PooledObjectState::Idle,
            PooledObjectState::Allocated,
            PooledObjectState::EvictionTesting,
            PooledObjectState::EvictionTestingReturnToHead,
            PooledObjectState::Invalid,
        ];

        for state in all {
            assert_eq!(PooledObjectState::from_code(state.code()), state);
        }
    }

    #[test]
    fn test_predicates() {
        assert!(PooledObjectState::Idle.is_idle());
        assert!(PooledObjectState::Allocated.is_allocated());
        assert!(PooledObjectState::EvictionTesting.is_under_eviction_test());
        assert!(PooledObjectState::EvictionTestingReturnToHead.is_under_eviction_test());
        assert!(PooledObjectState::Invalid.is_invalid());

        assert!(!PooledObjectState::Idle.is_allocated());
        assert!(!PooledObjectState::Allocated.is_under_eviction_test());
        assert!(!PooledObjectState::EvictionTesting.is_invalid());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(PooledObjectState::Idle.to_string(), "Idle");
        assert_eq!(
            PooledObjectState::EvictionTestingReturnToHead.to_string(),
            "EvictionTestingReturnToHead"
        );
    }
}
