use super::EngineOptions;
use crate::model::{ShiftRequirement, ShiftType, Ward};
use chrono::NaiveDate;

/// Jours de `start` à `end` inclus.
pub(super) fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// Besoin effectif : une entrée absente ou nulle prend le besoin par défaut.
pub(super) fn requirement_for(ward: &Ward, shift: ShiftType, opts: &EngineOptions) -> ShiftRequirement {
    match ward.requirements.get(shift) {
        Some(req) if !req.is_zero() => req,
        _ => opts.default_requirement,
    }
}
