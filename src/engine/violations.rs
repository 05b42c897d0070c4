use super::availability::AvailabilityIndex;
use super::metrics::DaySchedule;
use super::types::{Violation, ViolationKind};
use crate::model::{AssignmentRecord, NurseId, ShiftType, UnavailabilityEntry};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::error;

/// Contrôle a posteriori de chaque affectation.
///
/// Le sélecteur filtre déjà la disponibilité : une violation relevée ici
/// signale un bug, jamais une erreur fatale.
#[derive(Debug)]
pub struct ViolationRecorder<'a> {
    index: &'a AvailabilityIndex,
    worked: HashMap<(NurseId, NaiveDate), ShiftType>,
    nights: HashMap<NurseId, Vec<NaiveDate>>,
    violations: Vec<Violation>,
}

impl<'a> ViolationRecorder<'a> {
    pub fn new(index: &'a AvailabilityIndex) -> Self {
        Self {
            index,
            worked: HashMap::new(),
            nights: HashMap::new(),
            violations: Vec::new(),
        }
    }

    pub fn check(&mut self, record: &AssignmentRecord) {
        if self
            .index
            .is_blocked(&record.nurse_id, record.date, record.shift)
        {
            self.push(
                record,
                ViolationKind::Unavailable,
                format!("approved unavailability on {} {}", record.date, record.shift),
            );
        }

        let key = (record.nurse_id.clone(), record.date);
        if let Some(previous) = self.worked.get(&key).copied() {
            self.push(
                record,
                ViolationKind::DoubleBooked,
                format!("already assigned {previous} on {}", record.date),
            );
        } else {
            self.worked.insert(key, record.shift);
        }

        if record.shift == ShiftType::Day {
            let worked_night_before = record.date.pred_opt().is_some_and(|prev| {
                self.nights
                    .get(&record.nurse_id)
                    .is_some_and(|nights| nights.contains(&prev))
            });
            if worked_night_before {
                self.push(
                    record,
                    ViolationKind::RestAfterNight,
                    "NIGHT on previous day".to_string(),
                );
            }
        }
        if record.shift == ShiftType::Night {
            self.nights
                .entry(record.nurse_id.clone())
                .or_default()
                .push(record.date);
        }
    }

    fn push(&mut self, record: &AssignmentRecord, kind: ViolationKind, reason: String) {
        error!(
            nurse = record.nurse_id.as_str(),
            date = %record.date,
            shift = %record.shift,
            kind = kind.as_str(),
            "constraint violation: {reason}"
        );
        self.violations.push(Violation {
            nurse_id: record.nurse_id.clone(),
            nurse_name: record.nurse_name.clone(),
            date: record.date,
            shift: record.shift,
            kind,
            reason,
        });
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

/// Rejoue le contrôle sur un planning déjà produit (ex. relu depuis un fichier).
///
/// Les affectations sont parcourues dans l'ordre chronologique DAY, EVENING, NIGHT.
pub fn verify_schedule(days: &[DaySchedule], unavailability: &[UnavailabilityEntry]) -> Vec<Violation> {
    let (Some(first), Some(last)) = (days.iter().map(|d| d.date).min(), days.iter().map(|d| d.date).max())
    else {
        return Vec::new();
    };
    let index = AvailabilityIndex::build(unavailability, first, last);

    let mut ordered: Vec<&AssignmentRecord> = days
        .iter()
        .flat_map(|d| d.shifts.iter())
        .flat_map(|s| s.assigned.iter())
        .collect();
    ordered.sort_by_key(|r| (r.date, r.shift));

    let mut recorder = ViolationRecorder::new(&index);
    for record in ordered {
        recorder.check(record);
    }
    recorder.into_violations()
}
