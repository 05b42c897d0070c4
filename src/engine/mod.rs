pub mod availability;
pub mod eligibility;
pub mod metrics;
mod run;
mod selection;
pub mod state;
mod types;
mod util;
pub mod violations;

pub use availability::{Availability, AvailabilityIndex};
pub use eligibility::{CompatibilityTable, Eligibility, EligibilityTier};
pub use metrics::{coverage_percent, DaySchedule, FairnessSpread, GenerationResult, RunTotals, ShiftSlot};
pub use state::{NurseRunningState, RunState};
pub use types::{EngineError, EngineOptions, TieBreak, Violation, ViolationKind};
pub use violations::{verify_schedule, ViolationRecorder};

use crate::model::{Dataset, WardId};
use chrono::NaiveDate;

/// Engine : encapsule les données d'entrée et les options d'une famille de générations
#[derive(Debug, Default)]
pub struct Engine {
    dataset: Dataset,
    options: EngineOptions,
}

impl Engine {
    pub fn new(dataset: Dataset, options: EngineOptions) -> Self {
        Self { dataset, options }
    }

    /// Génère le planning de `ward_id` sur `[start, end]` inclus, recalculé de zéro.
    pub fn generate(
        &self,
        ward_id: &WardId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<GenerationResult, EngineError> {
        run::generate(self, ward_id, start, end)
    }

    /// Pool éligible du service, avec le palier de repli qui l'a produit.
    pub fn eligible(&self, ward_id: &WardId) -> Result<Eligibility<'_>, EngineError> {
        let ward = self
            .dataset
            .find_ward(ward_id)
            .ok_or_else(|| EngineError::UnknownWard(ward_id.as_str().to_string()))?;
        Ok(eligibility::filter_eligible(
            &self.dataset.nurses,
            ward,
            &self.dataset.wards,
            &self.options.compatibility,
            self.options.fallback_cap,
        ))
    }
}
