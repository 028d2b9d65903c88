use std::sync::atomic::{AtomicI64, Ordering};

/// Allocates time-based question ids (milliseconds since the Unix epoch).
///
/// Ids are strictly increasing within the process: two requests landing in
/// the same millisecond get `t` and `t + 1`. Nothing coordinates across
/// processes.
#[derive(Debug, Default)]
pub struct QuestionIdGenerator {
    last: AtomicI64,
}

impl QuestionIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> i64 {
        self.next_after(chrono::Utc::now().timestamp_millis())
    }

    fn next_after(&self, now_ms: i64) -> i64 {
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now_ms.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_same_millisecond_gets_distinct_ids() {
        let ids = QuestionIdGenerator::new();
        assert_eq!(ids.next_after(1_700_000_000_000), 1_700_000_000_000);
        assert_eq!(ids.next_after(1_700_000_000_000), 1_700_000_000_001);
        assert_eq!(ids.next_after(1_700_000_000_000), 1_700_000_000_002);
    }

    #[test]
    fn test_clock_going_backwards_stays_monotonic() {
        let ids = QuestionIdGenerator::new();
        let a = ids.next_after(2_000);
        let b = ids.next_after(1_000);
        assert!(b > a);
    }

    #[test]
    fn test_next_id_tracks_wall_clock() {
        let ids = QuestionIdGenerator::new();
        let before = chrono::Utc::now().timestamp_millis();
        let id = ids.next_id();
        assert!(id >= before);
    }

    #[test]
    fn test_concurrent_ids_are_unique() {
        let ids = Arc::new(QuestionIdGenerator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ids = ids.clone();
                std::thread::spawn(move || (0..250).map(|_| ids.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for h in handles {
            for id in h.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 1000);
    }
}
