use crate::controller_tests::backends::SlowBackend;

use terminal_core::controller::{CallBudgets, Controller, Fault};

use std::sync::Arc;
use std::time::Duration;

use serde_json::Map;
use tokio::time::Instant;

fn budgets() -> CallBudgets {
    CallBudgets {
        evaluation: Duration::from_millis(50),
        integration: Duration::from_millis(120),
    }
}

fn controller(backend: SlowBackend) -> Controller {
    let controller = Controller::new(Arc::new(backend)).with_budgets(budgets());
    controller.set_hardware_business_mult(0.0);
    controller
}

/// **VALUE**: Verifies a backend that never answers becomes a network failure at the
/// deadline.
#[tokio::test(start_paused = true)]
async fn given_stalled_backend_when_new_eval_then_network_unavailable_at_deadline() {
    let controller = controller(SlowBackend::stalled());
    let started = Instant::now();

    let outcome = controller.new_eval().await;

    assert_eq!(outcome, Err(Fault::NetworkUnavailable));
    assert_eq!(started.elapsed(), Duration::from_millis(50));
}

/// **VALUE**: Verifies the deadline covers every backend call of one operation.
///
/// **BUG THIS CATCHES**: Would catch a fresh deadline per backend call, which lets an
/// operation with two calls run for twice its budget.
#[tokio::test(start_paused = true)]
async fn given_two_slow_calls_when_new_eval_then_shared_deadline_expires() {
    // GIVEN: Each call takes 40ms against a 50ms budget
    let controller = controller(SlowBackend::with_latency(Duration::from_millis(40)));
    let started = Instant::now();

    // WHEN: new_eval makes its occupancy and begin calls
    let outcome = controller.new_eval().await;

    // THEN: The second call is cut off at the operation's deadline
    assert_eq!(outcome, Err(Fault::NetworkUnavailable));
    assert_eq!(started.elapsed(), Duration::from_millis(50));
}

#[tokio::test(start_paused = true)]
async fn given_stalled_backend_when_ui_method_called_then_integration_budget_applies() {
    let controller = controller(SlowBackend::stalled());
    let started = Instant::now();

    let outcome = controller.integration_ui_method("show", Map::new()).await;

    assert!(matches!(outcome, Err(Fault::NetworkUnavailable)));
    assert_eq!(started.elapsed(), Duration::from_millis(120));
}

#[tokio::test(start_paused = true)]
async fn given_backend_within_budget_when_new_eval_then_succeeds() {
    let controller = controller(SlowBackend::with_latency(Duration::from_millis(20)));

    let evaluation = controller.new_eval().await.unwrap();

    assert_eq!(evaluation.cell.as_str(), "A1");
}
