use crate::console::{execute, run};

use terminal_core::backend::mock::MockBackend;
use terminal_core::controller::{Controller, FaultFlag};
use terminal_core::rpc::RpcAdapter;

use std::sync::Arc;

use log::Level;
use tokio::sync::mpsc;

fn adapter() -> Arc<RpcAdapter> {
    Arc::new(RpcAdapter::new(Arc::new(Controller::new(Arc::new(
        MockBackend::new(),
    )))))
}

#[test]
fn given_blank_line_when_executed_then_no_report() {
    assert!(execute("   ", &adapter()).is_none());
}

#[test]
fn given_unknown_command_when_executed_then_warning_report() {
    let report = execute("launch rockets", &adapter()).unwrap();

    assert_eq!(report.level, Level::Warn);
    assert!(report.message.contains("launch rockets"));
}

#[test]
fn given_break_command_when_executed_then_flag_toggled() {
    let adapter = adapter();

    execute("break storage room", &adapter).unwrap();

    assert!(adapter.controller().faults().is_set(FaultFlag::StorageNoRoom));
}

/// **VALUE**: Verifies queued lines are applied in order until input closes.
#[tokio::test]
async fn given_queued_lines_when_console_runs_then_all_applied_in_order() {
    // GIVEN: Three lines, the last one undoing the first
    let adapter = adapter();
    let (tx, rx) = mpsc::unbounded_channel();
    for line in ["break network", "delay 0.5", "break network"] {
        tx.send(line.to_string()).unwrap();
    }
    drop(tx);

    // WHEN: The console drains its input
    run(rx, adapter.clone()).await;

    // THEN: Network toggled twice, delay applied
    assert!(!adapter.controller().faults().is_set(FaultFlag::NetworkFailure));
    assert_eq!(adapter.controller().hardware_business_mult(), 0.5);
}
