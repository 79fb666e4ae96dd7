use crate::backend::mock::MockBackend;
use crate::control::ControlCommand;
use crate::controller::{Controller, FaultFlag};
use crate::error::control::ControlError;
use crate::rpc::RpcAdapter;

use std::sync::Arc;

use log::Level;

fn adapter() -> RpcAdapter {
    RpcAdapter::new(Arc::new(Controller::new(Arc::new(MockBackend::new()))))
}

#[test]
fn given_break_commands_when_parsed_then_map_to_fault_flags() {
    let cases = [
        ("break hardware", FaultFlag::HardwareFailure),
        ("break network", FaultFlag::NetworkFailure),
        ("break module", FaultFlag::ModuleBroken),
        ("break storage access", FaultFlag::StorageAccessForbidden),
        ("break storage room", FaultFlag::StorageNoRoom),
        ("break eval acceptance", FaultFlag::EvalRejection),
        ("  BREAK   eval  scale ", FaultFlag::UnstableScale),
    ];

    for (line, flag) in cases {
        assert_eq!(line.parse::<ControlCommand>().unwrap(), ControlCommand::Break(flag), "{line}");
    }
}

#[test]
fn given_delay_without_argument_when_parsed_then_defaults_to_one() {
    assert_eq!("delay".parse::<ControlCommand>().unwrap(), ControlCommand::Delay(1.0));
    assert_eq!("delay 0.25".parse::<ControlCommand>().unwrap(), ControlCommand::Delay(0.25));
}

#[test]
fn given_unknown_or_malformed_commands_when_parsed_then_errors() {
    assert!(matches!(
        "explode".parse::<ControlCommand>(),
        Err(ControlError::UnknownCommand { .. })
    ));
    assert!(matches!(
        "delay fast".parse::<ControlCommand>(),
        Err(ControlError::InvalidArgument { .. })
    ));
    assert!(matches!(
        "seed fineness pure".parse::<ControlCommand>(),
        Err(ControlError::InvalidArgument { .. })
    ));
    assert!(matches!(
        "".parse::<ControlCommand>(),
        Err(ControlError::UnknownCommand { .. })
    ));
}

/// **VALUE**: Verifies `break` toggles and reports the new state.
#[test]
fn given_break_applied_twice_when_reporting_then_on_then_off() {
    let adapter = adapter();
    let command = ControlCommand::Break(FaultFlag::NetworkFailure);

    let first = command.apply(&adapter);
    assert_eq!(first.level, Level::Warn);
    assert!(first.message.ends_with("ON"));
    assert!(adapter.controller().faults().is_set(FaultFlag::NetworkFailure));

    let second = command.apply(&adapter);
    assert_eq!(second.level, Level::Info);
    assert!(second.message.ends_with("OFF"));
    assert!(!adapter.controller().faults().is_set(FaultFlag::NetworkFailure));
}

#[test]
fn given_flags_set_when_heal_applied_then_all_cleared_but_seed_kept() {
    let adapter = adapter();
    ControlCommand::Break(FaultFlag::HardwareFailure).apply(&adapter);
    ControlCommand::SeedSilver.apply(&adapter);

    ControlCommand::Heal.apply(&adapter);

    assert!(adapter.controller().faults().snapshot().iter().all(|(_, on)| !on));
    assert_eq!(adapter.controller().seed().alloy(), "ag");
}

#[test]
fn given_idle_adapter_when_reset_applied_then_generation_advances() {
    let adapter = adapter();

    let report = ControlCommand::Reset.apply(&adapter);

    assert_eq!(report.level, Level::Info);
    assert_eq!(adapter.generation(), 1);
}

#[test]
fn given_delay_out_of_range_when_applied_then_reports_clamped_value() {
    let adapter = adapter();

    let report = ControlCommand::Delay(15.0).apply(&adapter);

    assert_eq!(report.message, "hardware delay multiplier: 10");
    assert_eq!(adapter.controller().hardware_business_mult(), 10.0);
}

#[test]
fn given_unknown_fineness_when_applied_then_warns() {
    let adapter = adapter();

    let report = ControlCommand::SeedFineness(123).apply(&adapter);

    assert_eq!(report.level, Level::Warn);
    assert_eq!(adapter.controller().seed().target_millesimal(), 0);
}

#[test]
fn given_status_when_applied_then_lists_enabled_flags() {
    let adapter = adapter();
    ControlCommand::Break(FaultFlag::UnstableScale).apply(&adapter);

    let report = ControlCommand::Status.apply(&adapter);

    assert!(report.message.contains("unstable scale"), "{}", report.message);
    assert!(!report.message.contains("network failure"));
}
