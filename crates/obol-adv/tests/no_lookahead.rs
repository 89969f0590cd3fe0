//! Causality checks for the rolling ADV.

use std::num::NonZeroUsize;

use chrono::{Days, NaiveDate};
use obol_adv::RollingAdv;
use obol_types::DailyVolume;
use proptest::prelude::*;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()
}

fn series(values: &[f64]) -> Vec<DailyVolume> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| DailyVolume::new(start() + Days::new(i as u64), *v))
        .collect()
}

proptest! {
    #[test]
    fn adv_ignores_same_day_and_future_volume(
        values in proptest::collection::vec(0.0_f64..1e9, 10..60),
        replacement in proptest::collection::vec(0.0_f64..1e9, 60),
        window in 1_usize..10,
        cut in 0_usize..60,
    ) {
        let window = NonZeroUsize::new(window).unwrap();
        let cut = cut % values.len();

        let mut mutated = values.clone();
        for (i, value) in mutated.iter_mut().enumerate().skip(cut) {
            *value = replacement[i];
        }

        let original = RollingAdv::compute(&series(&values), window);
        let changed = RollingAdv::compute(&series(&mutated), window);

        let cutoff = start() + Days::new(cut as u64);
        for (date, adv) in original.iter().filter(|(date, _)| *date <= cutoff) {
            prop_assert_eq!(changed.get(date).map(f64::to_bits), Some(adv.to_bits()));
        }
    }

    #[test]
    fn adv_defined_exactly_after_first_window(
        values in proptest::collection::vec(0.0_f64..1e6, 1..80),
        window in 1_usize..30,
    ) {
        let adv = RollingAdv::compute(&series(&values), NonZeroUsize::new(window).unwrap());
        prop_assert_eq!(adv.len(), values.len().saturating_sub(window));
        if let Some(first) = adv.first_date() {
            prop_assert_eq!(first, start() + Days::new(window as u64));
        }
    }
}

#[test]
fn adv_matches_hand_computed_means() {
    let adv = RollingAdv::compute(
        &series(&[100.0, 200.0, 300.0, 400.0]),
        NonZeroUsize::new(2).unwrap(),
    );
    let expected = [(2, 150.0), (3, 250.0)];
    for (offset, value) in expected {
        assert_eq!(adv.get(start() + Days::new(offset)), Some(value));
    }
}
