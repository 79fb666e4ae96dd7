use crate::error::model_error::ModelError;
use crate::evaluation::session::{EvaluationSession, EvaluationStage, Spectrum};
use crate::storage::StorageCell;

/// Builder for creating validated [`EvaluationSession`] instances.
///
/// A built session always starts in [`EvaluationStage::Created`] with no
/// fineness decision.
#[derive(Debug, Default)]
pub struct EvaluationSessionBuilder {
    eval_id: Option<u64>,
    cell: Option<StorageCell>,
    spectrum: Option<Spectrum>,
    dry_weight: Option<f64>,
    wet_weight: Option<f64>,
}

impl EvaluationSessionBuilder {
    pub fn with_eval_id(mut self, eval_id: u64) -> Self {
        self.eval_id = Some(eval_id);
        self
    }

    pub fn with_cell(mut self, cell: StorageCell) -> Self {
        self.cell = Some(cell);
        self
    }

    pub fn with_spectrum(mut self, spectrum: Spectrum) -> Self {
        self.spectrum = Some(spectrum);
        self
    }

    pub fn with_weights(mut self, dry_weight: f64, wet_weight: f64) -> Self {
        self.dry_weight = Some(dry_weight);
        self.wet_weight = Some(wet_weight);
        self
    }

    /// Build the session with validation.
    #[track_caller]
    pub fn build(self) -> Result<EvaluationSession, ModelError> {
        let eval_id = self
            .eval_id
            .ok_or_else(|| ModelError::validation("Evaluation ID is required"))?;

        if eval_id == 0 {
            return Err(ModelError::validation("Evaluation ID must be non-zero"));
        }

        let cell = self
            .cell
            .ok_or_else(|| ModelError::validation("Storage cell is required"))?;

        let spectrum = self
            .spectrum
            .ok_or_else(|| ModelError::validation("Spectrum is required"))?;

        if spectrum.is_empty() {
            return Err(ModelError::validation("Spectrum cannot be empty"));
        }

        if let Some((symbol, value)) = spectrum
            .iter()
            .find(|(_, value)| !(0.0..=100.0).contains(*value))
        {
            return Err(ModelError::validation(format!(
                "Spectrum value for '{symbol}' out of range: {value}"
            )));
        }

        let dry_weight = self
            .dry_weight
            .ok_or_else(|| ModelError::validation("Dry weight is required"))?;
        let wet_weight = self
            .wet_weight
            .ok_or_else(|| ModelError::validation("Wet weight is required"))?;

        if !(dry_weight > 0.0) {
            return Err(ModelError::validation(format!(
                "Dry weight must be positive, got {dry_weight}"
            )));
        }

        if !(0.0..dry_weight).contains(&wet_weight) {
            return Err(ModelError::validation(format!(
                "Wet weight {wet_weight} must be in [0, {dry_weight})"
            )));
        }

        Ok(EvaluationSession {
            eval_id,
            cell,
            spectrum,
            dry_weight,
            wet_weight,
            stage: EvaluationStage::Created,
            fineness: None,
        })
    }
}
