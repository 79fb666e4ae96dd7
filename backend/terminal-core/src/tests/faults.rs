use crate::controller::{BusinessMultiplier, FaultFlag, FaultFlags};

use std::time::Duration;

#[test]
fn given_flag_when_toggled_twice_then_returns_new_state_each_time() {
    let flags = FaultFlags::default();

    assert!(flags.toggle(FaultFlag::NetworkFailure));
    assert!(flags.is_set(FaultFlag::NetworkFailure));
    assert!(!flags.toggle(FaultFlag::NetworkFailure));
    assert!(!flags.is_set(FaultFlag::NetworkFailure));
}

/// **VALUE**: Verifies flags are independent.
///
/// **BUG THIS CATCHES**: Would catch two flags wired to the same atomic, so breaking the
/// network also made evaluations reject.
#[test]
fn given_one_flag_toggled_when_reading_others_then_they_stay_clear() {
    let flags = FaultFlags::default();

    flags.toggle(FaultFlag::HardwareFailure);

    for flag in FaultFlag::ALL {
        assert_eq!(flags.is_set(flag), flag == FaultFlag::HardwareFailure, "{flag}");
    }
}

#[test]
fn given_every_flag_set_when_cleared_then_snapshot_is_all_false() {
    let flags = FaultFlags::default();
    for flag in FaultFlag::ALL {
        flags.set(flag, true);
    }

    flags.clear_all();

    assert!(flags.snapshot().iter().all(|(_, enabled)| !enabled));
    assert_eq!(flags.snapshot().len(), 7);
}

/// **VALUE**: Pins the multiplier clamping contract.
#[test]
fn given_out_of_range_multipliers_when_set_then_clamped_to_bounds() {
    let multiplier = BusinessMultiplier::default();
    assert_eq!(multiplier.get(), 1.0);

    assert_eq!(multiplier.set(-1.0), 0.0);
    assert_eq!(multiplier.get(), 0.0);

    assert_eq!(multiplier.set(15.0), 10.0);
    assert_eq!(multiplier.get(), 10.0);

    assert_eq!(multiplier.set(f64::NAN), 0.0);
}

#[test]
fn given_multiplier_when_computing_delay_then_scales_time_units() {
    let multiplier = BusinessMultiplier::default();

    assert_eq!(multiplier.delay_for(6), Duration::from_secs(6));

    multiplier.set(0.5);
    assert_eq!(multiplier.delay_for(3), Duration::from_millis(1500));

    multiplier.set(0.0);
    assert_eq!(multiplier.delay_for(10), Duration::ZERO);
}
