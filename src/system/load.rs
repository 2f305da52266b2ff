//! Load sampling and the threshold math the gate decides on.

use crate::system::os;

/// One reading of the classic 1/5/15-minute load averages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadSample {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

impl LoadSample {
    /// Take a fresh reading. `None` means the platform cannot say, which
    /// the poller treats as nothing left to wait for.
    pub fn take() -> Option<Self> {
        let [one, five, fifteen] = os::load_averages()?;
        Some(Self { one, five, fifteen })
    }
}

/// Maximum acceptable load factor for a machine with `usable` processors.
///
/// Approaches 50 from below as the processor count grows. A single-core
/// machine gets a near-zero allowance (0.005) and must be essentially
/// idle before the gate opens.
pub fn target_factor(usable: usize) -> f64 {
    (usable as f64 - 0.9999) / usable as f64 * 50.0
}

/// Normalized load factor on a roughly 0-100 scale.
///
/// A weighted blend leaning on the 1-minute figure (it enters one and a
/// half times), averaged, divided per usable processor. The 0.0001
/// addend keeps an idle machine's factor strictly positive; it is not a
/// tolerance.
pub fn load_factor(sample: &LoadSample, usable: usize) -> f64 {
    ((0.0001 + sample.one + sample.five + (sample.fifteen + sample.one / 2.0)) / 3.0
        / usable as f64)
        * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(one: f64, five: f64, fifteen: f64) -> LoadSample {
        LoadSample { one, five, fifteen }
    }

    #[test]
    fn target_for_a_single_core_is_near_zero() {
        assert!((target_factor(1) - 0.005).abs() < 1e-12);
    }

    #[test]
    fn target_for_four_cores_matches_the_formula() {
        // ((4 - 0.9999) / 4) * 50
        assert!((target_factor(4) - 37.500_125).abs() < 1e-9);
    }

    #[test]
    fn target_grows_with_core_count_but_never_reaches_fifty() {
        let mut prev = 0.0;
        for usable in 1..=512 {
            let t = target_factor(usable);
            assert!(t > prev, "target not increasing at {usable} cores");
            assert!(t < 50.0, "target {t} out of bounds at {usable} cores");
            prev = t;
        }
    }

    #[test]
    fn idle_machine_factor_is_tiny_but_positive() {
        let f = load_factor(&sample(0.0, 0.0, 0.0), 4);
        // (0.0001 / 3 / 4) * 100
        assert!((f - 0.000_833_333).abs() < 1e-6);
        assert!(f > 0.0);
        assert!(f < target_factor(4));
    }

    #[test]
    fn one_minute_figure_weighs_heaviest() {
        // The same spike scores higher on the 1-minute figure than on
        // either of the slower ones.
        let spike_one = load_factor(&sample(3.0, 0.0, 0.0), 2);
        let spike_five = load_factor(&sample(0.0, 3.0, 0.0), 2);
        let spike_fifteen = load_factor(&sample(0.0, 0.0, 3.0), 2);
        assert!(spike_one > spike_five);
        assert!(spike_one > spike_fifteen);
        assert_eq!(spike_five, spike_fifteen);
    }

    #[test]
    fn factor_normalizes_per_usable_processor() {
        let busy = sample(4.0, 4.0, 4.0);
        assert!(load_factor(&busy, 8) < load_factor(&busy, 4));
    }
}
