//! Shared millisecond clock for wrapper timestamps

use std::sync::OnceLock;
use std::time::Instant;

fn anchor() -> Instant {
    static ANCHOR: OnceLock<Instant> = OnceLock::new();
    *ANCHOR.get_or_init(Instant::now)
}

/// Milliseconds elapsed since a process-wide monotonic anchor.
///
/// Every timestamp a [`PooledObject`](crate::PooledObject) records comes
/// from this single source, so differences between them are valid
/// durations. Successive reads never decrease.
pub fn now_millis() -> u64 {
    anchor().elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_decreasing() {
        let a = now_millis();
        let b = now_millis();
        let c = now_millis();
        assert!(a <= b);
        assert!(b <= c);
    }

    #[test]
    fn test_advances() {
        let before = now_millis();
        std::thread::sleep(std::time::Duration::from_millis(15));
        let after = now_millis();
        assert!(after >= before + 10);
    }
}
