use super::availability::{Availability, AvailabilityIndex};
use super::state::RunState;
use super::types::TieBreak;
use crate::model::{AssignmentRecord, Nurse, NurseId, Role, Selection, ShiftRequirement, ShiftType};
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::debug;

/// Un créneau (date, type de garde) à pourvoir.
#[derive(Debug, Clone, Copy)]
pub(super) struct SlotRequest {
    pub date: NaiveDate,
    pub shift: ShiftType,
    pub requirement: ShiftRequirement,
    pub hours: u32,
}

pub(super) fn select_for_slot(
    eligible: &[&Nurse],
    state: &RunState,
    index: &AvailabilityIndex,
    slot: SlotRequest,
    tie_break: TieBreak,
) -> Vec<AssignmentRecord> {
    let candidates: Vec<&Nurse> = eligible
        .iter()
        .copied()
        .filter(|n| {
            let availability = match state.get(&n.id) {
                Some(s) => index.check(&n.id, slot.date, slot.shift, s),
                None if index.is_blocked(&n.id, slot.date, slot.shift) => Availability::Blocked,
                None => Availability::Available,
            };
            if !availability.is_available() {
                debug!(nurse = n.id.as_str(), date = %slot.date, shift = %slot.shift, ?availability, "skipped");
            }
            availability.is_available()
        })
        .collect();

    // un niveau 2 figure dans les deux pools
    let mut charge_pool: Vec<&Nurse> = candidates
        .iter()
        .copied()
        .filter(|n| n.is_charge_eligible())
        .collect();
    let mut staff_pool: Vec<&Nurse> = candidates
        .iter()
        .copied()
        .filter(|n| n.hierarchy_level <= 2)
        .collect();

    if charge_pool.is_empty() && staff_pool.is_empty() {
        return Vec::new();
    }

    sort_by_fairness(&mut charge_pool, state, tie_break);
    sort_by_fairness(&mut staff_pool, state, tie_break);

    let wanted_charge = slot.requirement.charge as usize;
    let wanted_staff = slot.requirement.staff as usize;
    let wanted_total = wanted_charge.saturating_add(wanted_staff);

    let mut taken: HashSet<&NurseId> = HashSet::new();
    let mut out: Vec<AssignmentRecord> = Vec::with_capacity(wanted_total.min(candidates.len()));

    for nurse in pick(&charge_pool, &mut taken, wanted_charge) {
        out.push(record(nurse, slot, Role::Charge, Selection::Regular));
    }

    let shortfall = wanted_charge.saturating_sub(out.len());
    if shortfall > 0 {
        for nurse in pick(&staff_pool, &mut taken, shortfall) {
            out.push(record(nurse, slot, Role::Charge, Selection::Promoted));
        }
    }

    for nurse in pick(&staff_pool, &mut taken, wanted_staff) {
        out.push(record(nurse, slot, Role::Staff, Selection::Regular));
    }

    let remaining = wanted_total.saturating_sub(out.len());
    if remaining > 0 {
        for nurse in pick(&charge_pool, &mut taken, remaining) {
            out.push(record(nurse, slot, Role::Charge, Selection::BestEffort));
        }
        let remaining = wanted_total.saturating_sub(out.len());
        for nurse in pick(&staff_pool, &mut taken, remaining) {
            out.push(record(nurse, slot, Role::Staff, Selection::BestEffort));
        }
    }

    out
}

/// Moins de gardes d'abord ; `sort_by` est stable, l'ordre d'entrée départage.
fn sort_by_fairness(pool: &mut [&Nurse], state: &RunState, tie_break: TieBreak) {
    match tie_break {
        TieBreak::InputOrder => pool.sort_by_key(|n| state.total_shifts(&n.id)),
        TieBreak::NurseId => pool.sort_by(|a, b| {
            state
                .total_shifts(&a.id)
                .cmp(&state.total_shifts(&b.id))
                .then_with(|| a.id.cmp(&b.id))
        }),
    }
}

/// Prend jusqu'à `count` infirmières non encore retenues, en tête de pool.
fn pick<'a>(pool: &[&'a Nurse], taken: &mut HashSet<&'a NurseId>, count: usize) -> Vec<&'a Nurse> {
    let mut picked = Vec::with_capacity(count.min(pool.len()));
    for &nurse in pool {
        if picked.len() == count {
            break;
        }
        if taken.insert(&nurse.id) {
            picked.push(nurse);
        }
    }
    picked
}

fn record(nurse: &Nurse, slot: SlotRequest, role: Role, selection: Selection) -> AssignmentRecord {
    AssignmentRecord {
        nurse_id: nurse.id.clone(),
        nurse_name: nurse.name.clone(),
        shift: slot.shift,
        date: slot.date,
        role,
        selection,
        hours: slot.hours,
    }
}
