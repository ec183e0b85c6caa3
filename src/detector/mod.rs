//! Stuck-signal detection for the monitored power field
//!
//! Tracks one signal across successive readings and raises a rate-limited
//! alert when the value stops changing. Detection is decoupled from storage
//! validation: a sensor stuck at an out-of-range constant still alerts.

use crate::config::DetectorConfig;
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use tracing::{debug, info};

/// Alert raised when the monitored signal has repeated past the threshold
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    /// Name of the monitored signal
    pub signal: String,
    /// Value the signal is stuck at
    pub value: f64,
    /// Consecutive identical readings observed so far
    pub repeat_count: u32,
}

/// Mutable detector state, guarded by the detector's lock
#[derive(Debug, Default)]
struct DetectorState {
    last_value: Option<f64>,
    repeat_count: u32,
    last_alert: Option<DateTime<Utc>>,
}

/// Stateful detector watching one signal for stuck values.
///
/// One instance exists per process; `observe` performs its read-compare-update
/// inside a single critical section so concurrent readings cannot corrupt the
/// repeat count or double-fire an alert within the cooldown window.
#[derive(Debug)]
pub struct StuckSignalDetector {
    config: DetectorConfig,
    state: Mutex<DetectorState>,
}

impl StuckSignalDetector {
    /// Create a detector with fresh state
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            state: Mutex::new(DetectorState::default()),
        }
    }

    /// Name of the monitored signal
    pub fn signal(&self) -> &str {
        &self.config.signal
    }

    /// Configured repeat threshold
    pub fn threshold(&self) -> u32 {
        self.config.threshold
    }

    /// Feed one observation to the detector.
    ///
    /// `now` is an explicit input so threshold/cooldown behavior is
    /// deterministically testable. Absent or non-finite values are ignored
    /// without touching state; the validator deals with them independently.
    pub fn observe(&self, value: Option<f64>, now: DateTime<Utc>) -> Option<AlertEvent> {
        let value = match value {
            Some(v) if v.is_finite() => v,
            _ => return None,
        };

        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let Some(last) = state.last_value else {
            state.last_value = Some(value);
            state.repeat_count = 0;
            return None;
        };

        // Exact equality against the immediately previous value only
        if value == last {
            state.repeat_count += 1;
            debug!(
                signal = %self.config.signal,
                value,
                repeat_count = state.repeat_count,
                "monitored signal repeated"
            );

            if state.repeat_count >= self.config.threshold && self.cooldown_elapsed(&state, now) {
                state.last_alert = Some(now);
                info!(
                    signal = %self.config.signal,
                    value,
                    repeat_count = state.repeat_count,
                    "stuck signal detected"
                );
                return Some(AlertEvent {
                    signal: self.config.signal.clone(),
                    value,
                    repeat_count: state.repeat_count,
                });
            }
        } else {
            debug!(signal = %self.config.signal, value, "monitored signal changed");
            state.last_value = Some(value);
            state.repeat_count = 0;
        }

        None
    }

    fn cooldown_elapsed(&self, state: &DetectorState, now: DateTime<Utc>) -> bool {
        match state.last_alert {
            Some(last_alert) => {
                let elapsed = now.signed_duration_since(last_alert);
                elapsed >= chrono::Duration::from_std(self.config.cooldown).unwrap_or_default()
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;

    fn detector() -> StuckSignalDetector {
        StuckSignalDetector::new(DetectorConfig::default())
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        t0() + chrono::Duration::seconds(seconds)
    }

    #[test]
    fn test_first_observation_never_alerts() {
        let detector = detector();
        assert_eq!(detector.observe(Some(500.0), t0()), None);
    }

    #[test]
    fn test_alert_after_threshold_repeats() {
        let detector = detector();
        detector.observe(Some(500.0), at(0));

        // Four repeats stay below the threshold of five
        for i in 1..=4 {
            assert_eq!(detector.observe(Some(500.0), at(i)), None, "repeat {i}");
        }

        let alert = detector.observe(Some(500.0), at(5)).expect("alert");
        assert_eq!(alert.signal, "power_in_total");
        assert_eq!(alert.value, 500.0);
        assert_eq!(alert.repeat_count, 5);
    }

    #[test]
    fn test_cooldown_suppresses_and_then_allows_realert() {
        let detector = detector();
        detector.observe(Some(500.0), at(0));
        for i in 1..=4 {
            detector.observe(Some(500.0), at(i));
        }
        assert!(detector.observe(Some(500.0), at(5)).is_some());

        // Still identical, but within the 300s cooldown
        assert_eq!(detector.observe(Some(500.0), at(10)), None);

        // After the cooldown elapses the still-identical value alerts again,
        // and the count kept accumulating in between
        let alert = detector.observe(Some(500.0), at(5 + 300)).expect("re-alert");
        assert_eq!(alert.repeat_count, 7);
    }

    #[test]
    fn test_value_change_resets_counter() {
        let detector = detector();
        detector.observe(Some(500.0), at(0));
        for i in 1..=4 {
            detector.observe(Some(500.0), at(i));
        }

        // Change below the threshold: counter restarts from zero
        assert_eq!(detector.observe(Some(501.0), at(5)), None);

        // A fresh run counts from 1, not 5
        assert_eq!(detector.observe(Some(501.0), at(6)), None);
        for i in 7..=9 {
            assert_eq!(detector.observe(Some(501.0), at(i)), None);
        }
        assert!(detector.observe(Some(501.0), at(10)).is_some());
    }

    #[test]
    fn test_oscillation_never_accumulates() {
        let detector = detector();
        for i in 0..20 {
            let value = if i % 2 == 0 { 500.0 } else { 600.0 };
            assert_eq!(detector.observe(Some(value), at(i)), None);
        }
    }

    #[test]
    fn test_absent_and_non_finite_values_ignored() {
        let detector = detector();
        detector.observe(Some(500.0), at(0));
        for i in 1..=4 {
            detector.observe(Some(500.0), at(i));
        }

        // None / NaN / inf leave state untouched mid-run
        assert_eq!(detector.observe(None, at(5)), None);
        assert_eq!(detector.observe(Some(f64::NAN), at(6)), None);
        assert_eq!(detector.observe(Some(f64::INFINITY), at(7)), None);

        // The run continues where it left off
        assert!(detector.observe(Some(500.0), at(8)).is_some());
    }

    #[test]
    fn test_custom_threshold_and_cooldown() {
        let detector = StuckSignalDetector::new(DetectorConfig {
            signal: "grid_voltage".to_string(),
            threshold: 2,
            cooldown: Duration::from_secs(60),
        });

        detector.observe(Some(230.0), at(0));
        assert_eq!(detector.observe(Some(230.0), at(1)), None);
        let alert = detector.observe(Some(230.0), at(2)).expect("alert");
        assert_eq!(alert.signal, "grid_voltage");
        assert_eq!(alert.repeat_count, 2);

        assert_eq!(detector.observe(Some(230.0), at(30)), None);
        assert!(detector.observe(Some(230.0), at(2 + 60)).is_some());
    }

    #[test]
    fn test_out_of_range_values_still_tracked() {
        // Detection is independent of storage validation
        let detector = detector();
        detector.observe(Some(15000.0), at(0));
        for i in 1..=4 {
            assert_eq!(detector.observe(Some(15000.0), at(i)), None);
        }
        assert!(detector.observe(Some(15000.0), at(5)).is_some());
    }
}
