use std::time::{Duration, Instant};

/// Holds back a value until no newer one has arrived for `delay`.
///
/// Scheduling replaces whatever is pending, so only the last value of a burst
/// of input is ever released.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Releases the pending value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.pending.take() {
            Some((value, deadline)) if now >= deadline => Some(value),
            other => {
                self.pending = other;
                None
            }
        }
    }

    /// Releases the pending value regardless of its deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DELAY: Duration = Duration::from_millis(200);

    #[test]
    fn releases_after_quiet_period() {
        let start = Instant::now();
        let mut d = Debouncer::new(DELAY);
        d.schedule("b", start);
        assert_eq!(d.poll(start + Duration::from_millis(199)), None);
        assert_eq!(d.poll(start + DELAY), Some("b"));
        assert_eq!(d.poll(start + DELAY * 2), None);
    }

    #[test]
    fn newer_value_supersedes_pending_one() {
        let start = Instant::now();
        let mut d = Debouncer::new(DELAY);
        d.schedule("b", start);
        d.schedule("ba", start + Duration::from_millis(150));
        d.schedule("bak", start + Duration::from_millis(300));
        assert_eq!(d.poll(start + Duration::from_millis(400)), None);
        assert_eq!(d.poll(start + Duration::from_millis(500)), Some("bak"));
    }

    #[test]
    fn flush_and_cancel() {
        let start = Instant::now();
        let mut d = Debouncer::new(DELAY);
        d.schedule(1, start);
        assert_eq!(d.flush(), Some(1));
        assert_eq!(d.flush(), None);

        d.schedule(2, start);
        d.cancel();
        assert_eq!(d.poll(start + DELAY), None);
    }
}
