//! Minimum-interval request throttle.
//!
//! Private trackers publish limits such as "one request per two seconds".
//! The throttle hands out request slots spaced at least `min_interval` apart;
//! callers sleep until their slot outside the lock, so concurrent callers are
//! queued in arrival order without blocking each other on the mutex.

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Duration, Instant};

#[derive(Debug)]
struct ThrottleState {
    min_interval: Duration,
    /// Start time of the most recently reserved slot.
    last_slot: Option<Instant>,
}

impl ThrottleState {
    fn next_slot(&self, now: Instant) -> Instant {
        match self.last_slot {
            Some(last) => (last + self.min_interval).max(now),
            None => now,
        }
    }
}

/// Spaces request starts at least `min_interval` apart.
#[derive(Debug)]
pub struct RequestThrottle {
    state: Mutex<ThrottleState>,
}

impl RequestThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            state: Mutex::new(ThrottleState {
                min_interval,
                last_slot: None,
            }),
        }
    }

    /// Build a throttle from a delay in (fractional) seconds.
    ///
    /// Negative or non-finite values disable throttling.
    pub fn from_secs_f64(secs: f64) -> Self {
        let interval = if secs.is_finite() && secs > 0.0 {
            Duration::from_secs_f64(secs)
        } else {
            Duration::ZERO
        };
        Self::new(interval)
    }

    /// Wait until the caller may start its request.
    pub async fn acquire(&self) {
        let slot = {
            let mut state = self.state.lock().await;
            let slot = state.next_slot(Instant::now());
            state.last_slot = Some(slot);
            slot
        };

        sleep_until(slot).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_first_acquire_is_immediate() {
        let throttle = RequestThrottle::new(Duration::from_secs(10));

        let start = Instant::now();
        throttle.acquire().await;

        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_consecutive_acquires_are_spaced() {
        let throttle = RequestThrottle::new(Duration::from_millis(60));

        let start = Instant::now();
        throttle.acquire().await;
        throttle.acquire().await;
        throttle.acquire().await;

        // Two waits of at least 60ms each
        assert!(start.elapsed() >= Duration::from_millis(120));
    }

    #[tokio::test]
    async fn test_concurrent_acquires_are_queued() {
        let throttle = Arc::new(RequestThrottle::new(Duration::from_millis(50)));

        let start = Instant::now();
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let throttle = Arc::clone(&throttle);
                tokio::spawn(async move {
                    throttle.acquire().await;
                    Instant::now()
                })
            })
            .collect();

        let mut finished = Vec::new();
        for handle in handles {
            finished.push(handle.await.unwrap());
        }
        finished.sort();

        assert!(finished[2].duration_since(start) >= Duration::from_millis(100));
        assert!(finished[2].duration_since(finished[0]) >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_zero_interval_never_waits() {
        let throttle = RequestThrottle::from_secs_f64(0.0);

        let start = Instant::now();
        for _ in 0..20 {
            throttle.acquire().await;
        }

        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn test_from_secs_rejects_invalid_values() {
        let negative = RequestThrottle::from_secs_f64(-1.0);
        let nan = RequestThrottle::from_secs_f64(f64::NAN);

        assert_eq!(
            negative.state.try_lock().unwrap().min_interval,
            Duration::ZERO
        );
        assert_eq!(nan.state.try_lock().unwrap().min_interval, Duration::ZERO);
    }
}
