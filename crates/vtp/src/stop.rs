//! Cancellation: a level-triggered stop flag whose backoff sleeps are
//! interruptible rather than a blind fixed-duration sleep.

use std::{
    sync::{Arc, Condvar, Mutex},
    time::Duration,
};

/// Cloneable handle to a shared stop flag.
///
/// Checked between frames and before/during reconnect backoff sleeps. Setting
/// it wakes any thread currently blocked in [`StopSignal::wait_timeout`].
#[derive(Clone, Default)]
pub struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag and wakes every waiter.
    pub fn set(&self) {
        let (lock, cvar) = &*self.inner;
        let mut set = lock.lock().unwrap();
        *set = true;
        cvar.notify_all();
    }

    pub fn is_set(&self) -> bool {
        *self.inner.0.lock().unwrap()
    }

    /// Sleeps up to `timeout`, waking early if the flag is set.
    ///
    /// Returns `true` if woken by [`StopSignal::set`], `false` if the timeout
    /// elapsed first. Spurious condvar wakeups are not mistaken for a set
    /// flag: the predicate is rechecked and the wait resumed on whatever
    /// timeout remains.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let mut guard = lock.lock().unwrap();
        let deadline = std::time::Instant::now() + timeout;

        loop {
            if *guard {
                return true;
            }
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            if remaining.is_zero() {
                return false;
            }
            let (next_guard, result) = cvar.wait_timeout(guard, remaining).unwrap();
            guard = next_guard;
            if *guard {
                return true;
            }
            if result.timed_out() {
                return false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn wakes_promptly_on_set() {
        let stop = StopSignal::new();
        let other = stop.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            other.set();
        });
        let woken = stop.wait_timeout(Duration::from_secs(10));
        handle.join().unwrap();
        assert!(woken);
    }

    #[test]
    fn times_out_when_never_set() {
        let stop = StopSignal::new();
        let woken = stop.wait_timeout(Duration::from_millis(20));
        assert!(!woken);
    }
}
