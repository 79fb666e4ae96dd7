use crate::backend::mock::MockBackend;
use crate::controller::{Controller, Fault};

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

fn controller() -> Controller {
    Controller::new(Arc::new(MockBackend::new()))
}

/// **VALUE**: Verifies the hardware delay is `units × 1s × multiplier`.
#[tokio::test(start_paused = true)]
async fn given_default_multiplier_when_closing_outlet_then_takes_four_seconds() {
    let controller = controller();
    let started = Instant::now();

    controller.close_outlet().await.unwrap();

    assert_eq!(started.elapsed(), Duration::from_secs(4));
}

#[tokio::test(start_paused = true)]
async fn given_zero_multiplier_when_running_hardware_step_then_returns_immediately() {
    let controller = controller();
    controller.set_hardware_business_mult(0.0);
    let started = Instant::now();

    controller.store_after_eval().await.unwrap_err();
    controller.open_inlet().await.unwrap();

    assert_eq!(started.elapsed(), Duration::ZERO);
}

/// **VALUE**: Verifies the simulated cost is paid even when the hardware then fails.
///
/// **BUG THIS CATCHES**: Would catch the flag check moving ahead of the delay, which makes
/// failure paths unrealistically fast in UI testing.
#[tokio::test(start_paused = true)]
async fn given_hardware_failure_when_opening_inlet_then_fails_after_full_delay() {
    let controller = controller();
    controller.set_hardware_business_mult(2.0);
    controller.toggle_fail_on_hardware_access();
    let started = Instant::now();

    let result = controller.open_inlet().await;

    assert_eq!(result, Err(Fault::HardwareFailure));
    assert_eq!(started.elapsed(), Duration::from_secs(4));
}

#[tokio::test(start_paused = true)]
async fn given_finalize_when_called_then_has_no_hardware_delay() {
    let controller = controller();
    controller.set_hardware_business_mult(0.0);
    controller.new_eval().await.unwrap();
    controller.spectral_eval().await.unwrap();
    controller.set_hardware_business_mult(10.0);
    let started = Instant::now();

    controller.finalize_eval().await.unwrap();

    assert_eq!(started.elapsed(), Duration::ZERO);
}
