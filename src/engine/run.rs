use super::availability::AvailabilityIndex;
use super::eligibility::filter_eligible;
use super::metrics::{DaySchedule, FairnessSpread, GenerationResult, RunTotals, ShiftSlot};
use super::selection::{self, SlotRequest};
use super::state::RunState;
use super::violations::ViolationRecorder;
use super::{util, EngineError, Engine};
use crate::model::{ShiftType, WardId};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

/// Boucle séquentielle jour par jour, DAY puis EVENING puis NIGHT.
///
/// Le repos dépend de la nuit de la veille et « déjà travaillé » des gardes
/// précédentes du jour : aucune parallélisation possible sans anticipation.
pub(super) fn generate(
    engine: &Engine,
    ward_id: &WardId,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<GenerationResult, EngineError> {
    if end < start {
        return Err(EngineError::InvalidDateRange { start, end });
    }
    engine.options.validate()?;

    let dataset = &engine.dataset;
    let opts = &engine.options;
    let ward = dataset
        .find_ward(ward_id)
        .ok_or_else(|| EngineError::UnknownWard(ward_id.as_str().to_string()))?;

    info!(ward = ward_id.as_str(), %start, %end, "generating schedule");

    let index = AvailabilityIndex::build(&dataset.unavailability, start, end);
    let eligibility = filter_eligible(
        &dataset.nurses,
        ward,
        &dataset.wards,
        &opts.compatibility,
        opts.fallback_cap,
    );
    let mut state = RunState::new(&dataset.nurses);
    let mut recorder = ViolationRecorder::new(&index);
    let mut totals = RunTotals::default();
    let mut days = Vec::new();

    for date in util::days_inclusive(start, end) {
        let mut day = DaySchedule::new(date);
        for shift in ShiftType::ORDER {
            let requirement = util::requirement_for(ward, shift, opts);
            let slot = SlotRequest {
                date,
                shift,
                requirement,
                hours: opts.shift_hours,
            };
            let records =
                selection::select_for_slot(&eligibility.nurses, &state, &index, slot, opts.tie_break);

            for record in &records {
                state.record(record);
                recorder.check(record);
            }

            let slot = ShiftSlot::new(shift, requirement, records);
            if slot.actual_total() < slot.required_total() {
                warn!(
                    %date,
                    %shift,
                    assigned = slot.actual_total(),
                    required = slot.required_total(),
                    "slot understaffed"
                );
            } else {
                debug!(%date, %shift, assigned = slot.actual_total(), "slot filled");
            }
            totals.accumulate(&slot);
            day.shifts.push(slot);
        }
        days.push(day);
    }

    let nurse_states = state.snapshot();
    let fairness = FairnessSpread::from_states(
        nurse_states
            .iter()
            .filter(|s| eligibility.nurses.iter().any(|n| n.id == s.nurse_id)),
    );
    let violations = recorder.into_violations();

    info!(
        ward = ward_id.as_str(),
        days = days.len(),
        assigned = totals.assigned,
        required = totals.required,
        violations = violations.len(),
        "schedule generated"
    );

    Ok(GenerationResult {
        ward_id: ward_id.clone(),
        start,
        end,
        eligibility: eligibility.tier,
        days,
        totals,
        fairness,
        nurse_states,
        violations,
    })
}
