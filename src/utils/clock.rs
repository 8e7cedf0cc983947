use std::sync::OnceLock;
use std::time::Instant;

static START: OnceLock<Instant> = OnceLock::new();

/// Seconds elapsed since the process started, used as the monotonic `now`
/// the pool's TTL and eviction logic is evaluated against.
pub fn now_seconds() -> u64 {
    let start = START.get_or_init(Instant::now);
    start.elapsed().as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_monotonic_non_decreasing() {
        let a = now_seconds();
        let b = now_seconds();
        assert!(b >= a);
    }
}
