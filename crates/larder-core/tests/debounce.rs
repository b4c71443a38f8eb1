//! Integration tests combining timers and signals into a debounce.

use std::sync::Arc;
use std::time::{Duration, Instant};

use larder_core::{Signal, SingleShot, TimerManager};
use parking_lot::Mutex;

/// A minimal debouncer: restarts on every input, emits the last input once.
struct Debouncer {
    timer: SingleShot,
    pending: Option<String>,
    fired: Signal<String>,
}

impl Debouncer {
    fn new(quiet: Duration) -> Self {
        Self {
            timer: SingleShot::new(quiet),
            pending: None,
            fired: Signal::new(),
        }
    }

    fn input(&mut self, text: &str, now: Instant) {
        self.pending = Some(text.to_owned());
        self.timer.restart(now);
    }

    fn tick(&mut self, now: Instant) {
        if self.timer.poll(now) {
            if let Some(text) = self.pending.take() {
                self.fired.emit(text);
            }
        }
    }
}

#[test]
fn test_debounce_emits_trailing_input_once() {
    let t0 = Instant::now();
    let mut debouncer = Debouncer::new(Duration::from_millis(300));
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    debouncer.fired.connect(move |text: &String| sink.lock().push(text.clone()));

    for (i, text) in ["n", "na", "nas", "nasi"].iter().enumerate() {
        let at = t0 + Duration::from_millis(100 * i as u64);
        debouncer.input(text, at);
        debouncer.tick(at);
    }
    for ms in (300..=1000).step_by(10) {
        debouncer.tick(t0 + Duration::from_millis(ms));
    }

    assert_eq!(*received.lock(), vec!["nasi".to_string()]);
}

#[test]
fn test_manager_handles_interleaved_timers() {
    let t0 = Instant::now();
    let mut manager = TimerManager::new();
    let debounce = manager.start_one_shot(t0, Duration::from_millis(300));
    let grace = manager.start_one_shot(t0, Duration::from_millis(200));

    assert_eq!(manager.next_deadline(), Some(t0 + Duration::from_millis(200)));
    assert_eq!(manager.process_expired(t0 + Duration::from_millis(250)), vec![grace]);

    manager.stop(debounce).unwrap();
    assert!(manager.stop(debounce).is_err());
    assert_eq!(manager.next_deadline(), None);
    assert_eq!(manager.active_count(), 0);
}
