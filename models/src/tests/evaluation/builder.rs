use crate::{EvaluationSessionBuilder, EvaluationStage, ModelError, Spectrum, StorageCell};

fn gold_spectrum() -> Spectrum {
    Spectrum::from([("au".to_string(), 92.5)])
}

fn complete_builder() -> EvaluationSessionBuilder {
    EvaluationSessionBuilder::default()
        .with_eval_id(7)
        .with_cell(StorageCell::parse("A1").unwrap())
        .with_spectrum(gold_spectrum())
        .with_weights(10.0, 9.4)
}

fn validation_message(builder: EvaluationSessionBuilder) -> String {
    match builder.build().unwrap_err() {
        ModelError::Validation { message, .. } => message,
    }
}

/// **VALUE**: Verifies that a fully populated builder yields a fresh session.
///
/// **WHY THIS MATTERS**: `NewEval` builds every session through this path. A session that
/// starts in any stage other than `Created`, or with a stale fineness, would leak results
/// from an earlier item into the next customer's evaluation.
#[test]
fn given_complete_builder_when_building_then_session_starts_created_without_fineness() {
    // GIVEN: Builder with every field set
    let builder = complete_builder();

    // WHEN: Building
    let session = builder.build().unwrap();

    // THEN: Fields are carried over and the session is fresh
    assert_eq!(session.eval_id, 7);
    assert_eq!(session.cell.as_str(), "A1");
    assert_eq!(session.stage, EvaluationStage::Created);
    assert!(session.fineness.is_none());
    assert_eq!(session.spectrum.get("au"), Some(&92.5));
}

/// **VALUE**: Verifies that a zero evaluation id is rejected.
///
/// **BUG THIS CATCHES**: Would catch if the backend's "no id" sentinel slipped into a
/// session and was then sent back on every follow-up evaluation call.
#[test]
fn given_zero_eval_id_when_building_then_returns_validation_error() {
    let builder = complete_builder().with_eval_id(0);

    assert_eq!(validation_message(builder), "Evaluation ID must be non-zero");
}

#[test]
fn given_missing_cell_when_building_then_returns_validation_error() {
    let builder = EvaluationSessionBuilder::default()
        .with_eval_id(1)
        .with_spectrum(gold_spectrum())
        .with_weights(10.0, 9.0);

    assert_eq!(validation_message(builder), "Storage cell is required");
}

#[test]
fn given_empty_spectrum_when_building_then_returns_validation_error() {
    let builder = complete_builder().with_spectrum(Spectrum::new());

    assert_eq!(validation_message(builder), "Spectrum cannot be empty");
}

/// **VALUE**: Verifies that spectrum percentages outside `[0, 100]` are refused.
///
/// **BUG THIS CATCHES**: Would catch a generator that produced purity on the wrong scale
/// (fractions instead of percentages would pass, but ×100 errors would not).
#[test]
fn given_spectrum_value_above_hundred_when_building_then_error_names_symbol() {
    let builder =
        complete_builder().with_spectrum(Spectrum::from([("ag".to_string(), 9250.0)]));

    let message = validation_message(builder);

    assert!(message.contains("'ag'"));
    assert!(message.contains("9250"));
}

/// **VALUE**: Verifies hydrostatic weight sanity: the wet weight must be below the dry weight.
///
/// **WHY THIS MATTERS**: `density = dry / (dry - wet)` divides by zero or goes negative
/// otherwise.
#[test]
fn given_wet_weight_not_below_dry_weight_when_building_then_returns_validation_error() {
    let builder = complete_builder().with_weights(5.0, 5.0);

    let message = validation_message(builder);

    assert!(message.starts_with("Wet weight 5 must be in [0, 5)"));
}

#[test]
fn given_non_positive_dry_weight_when_building_then_returns_validation_error() {
    let builder = complete_builder().with_weights(0.0, 0.0);

    assert_eq!(validation_message(builder), "Dry weight must be positive, got 0");
}
