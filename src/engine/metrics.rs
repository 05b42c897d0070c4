use super::eligibility::EligibilityTier;
use super::state::NurseRunningState;
use super::types::Violation;
use crate::model::{AssignmentRecord, NurseId, Role, ShiftRequirement, ShiftType, WardId};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// `100 * actual / required`, ou 0 quand rien n'est requis.
pub fn coverage_percent(actual: u32, required: u32) -> f64 {
    if required == 0 {
        return 0.0;
    }
    100.0 * f64::from(actual) / f64::from(required)
}

/// Résultat d'un créneau (date, type de garde).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftSlot {
    pub shift: ShiftType,
    pub assigned: Vec<AssignmentRecord>,
    pub required_staff: u32,
    pub required_charge: u32,
    pub actual_staff: u32,
    pub actual_charge: u32,
    pub coverage: f64,
}

impl ShiftSlot {
    pub fn new(shift: ShiftType, requirement: ShiftRequirement, assigned: Vec<AssignmentRecord>) -> Self {
        let actual_charge = assigned.iter().filter(|r| r.role == Role::Charge).count() as u32;
        let actual_staff = assigned.len() as u32 - actual_charge;
        Self {
            shift,
            required_staff: requirement.staff,
            required_charge: requirement.charge,
            actual_staff,
            actual_charge,
            coverage: coverage_percent(actual_staff + actual_charge, requirement.total()),
            assigned,
        }
    }

    pub fn required_total(&self) -> u32 {
        self.required_staff.saturating_add(self.required_charge)
    }

    pub fn actual_total(&self) -> u32 {
        self.actual_staff + self.actual_charge
    }

    pub fn contains(&self, nurse: &NurseId) -> bool {
        self.assigned.iter().any(|r| &r.nurse_id == nurse)
    }
}

/// Planning d'une journée, gardes dans l'ordre DAY, EVENING, NIGHT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub shifts: Vec<ShiftSlot>,
}

impl DaySchedule {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            weekday: date.weekday(),
            shifts: Vec::with_capacity(ShiftType::ORDER.len()),
        }
    }

    pub fn slot(&self, shift: ShiftType) -> Option<&ShiftSlot> {
        self.shifts.iter().find(|s| s.shift == shift)
    }

    pub fn coverage(&self) -> f64 {
        let required = self
            .shifts
            .iter()
            .map(ShiftSlot::required_total)
            .fold(0u32, u32::saturating_add);
        let actual = self.shifts.iter().map(ShiftSlot::actual_total).sum();
        coverage_percent(actual, required)
    }
}

/// Totaux de la génération.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunTotals {
    pub required: u32,
    pub assigned: u32,
    pub required_staff: u32,
    pub assigned_staff: u32,
    pub required_charge: u32,
    pub assigned_charge: u32,
    pub understaffed_slots: u32,
}

impl RunTotals {
    pub fn accumulate(&mut self, slot: &ShiftSlot) {
        // les besoins ne sont pas bornés côté moteur
        self.required = self.required.saturating_add(slot.required_total());
        self.assigned += slot.actual_total();
        self.required_staff = self.required_staff.saturating_add(slot.required_staff);
        self.assigned_staff += slot.actual_staff;
        self.required_charge = self.required_charge.saturating_add(slot.required_charge);
        self.assigned_charge += slot.actual_charge;
        if slot.actual_total() < slot.required_total() {
            self.understaffed_slots += 1;
        }
    }

    pub fn coverage(&self) -> f64 {
        coverage_percent(self.assigned, self.required)
    }
}

/// Écart de charge entre infirmières éligibles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FairnessSpread {
    pub min_shifts: u32,
    pub max_shifts: u32,
}

impl FairnessSpread {
    pub fn from_states<'a, I>(states: I) -> Self
    where
        I: IntoIterator<Item = &'a NurseRunningState>,
    {
        let mut iter = states.into_iter().map(|s| s.total_shifts);
        let Some(first) = iter.next() else {
            return Self::default();
        };
        let (min_shifts, max_shifts) = iter.fold((first, first), |(lo, hi), n| (lo.min(n), hi.max(n)));
        Self {
            min_shifts,
            max_shifts,
        }
    }

    pub fn gap(&self) -> u32 {
        self.max_shifts - self.min_shifts
    }
}

/// Sortie complète d'une génération.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub ward_id: WardId,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub eligibility: EligibilityTier,
    pub days: Vec<DaySchedule>,
    pub totals: RunTotals,
    pub fairness: FairnessSpread,
    pub nurse_states: Vec<NurseRunningState>,
    pub violations: Vec<Violation>,
}

impl GenerationResult {
    pub fn day(&self, date: NaiveDate) -> Option<&DaySchedule> {
        self.days.iter().find(|d| d.date == date)
    }

    pub fn nurse_state(&self, id: &NurseId) -> Option<&NurseRunningState> {
        self.nurse_states.iter().find(|s| &s.nurse_id == id)
    }

    pub fn assignments(&self) -> impl Iterator<Item = &AssignmentRecord> {
        self.days
            .iter()
            .flat_map(|d| d.shifts.iter())
            .flat_map(|s| s.assigned.iter())
    }
}
