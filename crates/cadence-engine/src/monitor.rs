//! Periodic monitors of component state.

use cadence_core::FieldSet;
use tracing::info;

use crate::component::Component;

/// Observer refreshed at the monitor cadence.
///
/// A monitor gets read access to the whole component and the set of
/// fields it was configured to watch.
pub trait Monitor: Send {
    /// Observe the component after a step.
    fn refresh(&mut self, component: &Component, fields: &FieldSet);
}

/// Logs min, mean and max of each watched field.
#[derive(Clone, Debug, Default)]
pub struct LogMonitor {
    _private: (),
}

impl LogMonitor {
    /// A monitor logging at `info` level.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Min, mean and max of a slice; `None` when empty.
pub fn summarize(values: &[f64]) -> Option<(f64, f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let (min, max, sum) = values.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0),
        |(lo, hi, s), &v| (lo.min(v), hi.max(v), s + v),
    );
    Some((min, sum / values.len() as f64, max))
}

impl Monitor for LogMonitor {
    fn refresh(&mut self, component: &Component, fields: &FieldSet) {
        let state = component.state();
        let days = state.elapsed_time() / cadence_history::SECONDS_PER_DAY;
        for id in fields.iter() {
            let (Some(name), Some(value)) = (state.catalog().name(id), state.now(id)) else {
                continue;
            };
            if let Some((min, mean, max)) = summarize(&value.to_vec()) {
                info!(
                    component = component.name(),
                    field = name,
                    days,
                    min,
                    mean,
                    max,
                    "monitor"
                );
            }
        }
    }
}
