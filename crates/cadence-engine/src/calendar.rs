//! Calendar-day bookkeeping.

/// Advance a calendar day by one timestep.
///
/// `calday` grows by `dt / lod` and wraps by subtracting `daysperyear`
/// once it exceeds `daysperyear`.
pub fn advance_calday(calday: f64, dt: f64, lod: f64, daysperyear: f64) -> f64 {
    let next = calday + dt / lod;
    if next > daysperyear {
        next - daysperyear
    } else {
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn one_day_of_hourly_steps() {
        let mut c = 0.0;
        for _ in 0..24 {
            c = advance_calday(c, 3600.0, 86400.0, 365.0);
        }
        assert!((c - 1.0).abs() < 1e-12);
    }

    #[test]
    fn wraps_past_year_end() {
        let c = advance_calday(364.9, 86400.0, 86400.0, 365.0);
        assert!((c - 0.9).abs() < 1e-9);
    }

    #[test]
    fn exactly_year_end_does_not_wrap() {
        assert_eq!(advance_calday(364.0, 86400.0, 86400.0, 365.0), 365.0);
    }

    proptest! {
        #[test]
        fn full_year_returns_to_start(start in 0.0f64..365.0, steps_per_day in 1u32..25) {
            let dt = 86400.0 / f64::from(steps_per_day);
            let mut c = start;
            for _ in 0..(365 * steps_per_day) {
                c = advance_calday(c, dt, 86400.0, 365.0);
            }
            let diff = (c - start).rem_euclid(365.0);
            prop_assert!(diff < 1e-6 || (365.0 - diff) < 1e-6, "start {} end {}", start, c);
        }
    }
}
