use super::state::NurseRunningState;
use crate::model::{NurseId, ShiftType, UnavailabilityEntry};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

/// Résultat d'un test de disponibilité.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    /// Indisponibilité approuvée : ne jamais affecter.
    Blocked,
    /// Déjà affectée à une autre garde ce jour-là.
    AlreadyWorkedToday,
    /// Nuit la veille, garde de jour demandée.
    RestAfterNight,
}

impl Availability {
    pub fn is_available(self) -> bool {
        self == Availability::Available
    }
}

/// Index des blocages durs, construit une fois par génération.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityIndex {
    blocked: HashMap<NurseId, HashSet<(NaiveDate, ShiftType)>>,
}

impl AvailabilityIndex {
    /// Ne garde que les entrées comprises dans `[start, end]`.
    pub fn build(entries: &[UnavailabilityEntry], start: NaiveDate, end: NaiveDate) -> Self {
        let mut blocked: HashMap<NurseId, HashSet<(NaiveDate, ShiftType)>> = HashMap::new();
        for entry in entries.iter().filter(|e| e.date >= start && e.date <= end) {
            blocked
                .entry(entry.nurse_id.clone())
                .or_default()
                .insert((entry.date, entry.shift));
        }
        Self { blocked }
    }

    pub fn is_blocked(&self, nurse: &NurseId, date: NaiveDate, shift: ShiftType) -> bool {
        self.blocked
            .get(nurse)
            .is_some_and(|slots| slots.contains(&(date, shift)))
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked.values().map(HashSet::len).sum()
    }

    pub fn check(
        &self,
        nurse: &NurseId,
        date: NaiveDate,
        shift: ShiftType,
        state: &NurseRunningState,
    ) -> Availability {
        if self.is_blocked(nurse, date, shift) {
            return Availability::Blocked;
        }
        rest_rule(date, shift, state)
    }
}

/// Règles de repos, indépendantes des indisponibilités.
pub fn rest_rule(date: NaiveDate, shift: ShiftType, state: &NurseRunningState) -> Availability {
    let Some(last_date) = state.last_date else {
        return Availability::Available;
    };
    if last_date == date {
        return Availability::AlreadyWorkedToday;
    }
    if shift == ShiftType::Day
        && state.last_shift == Some(ShiftType::Night)
        && date.pred_opt() == Some(last_date)
    {
        return Availability::RestAfterNight;
    }
    Availability::Available
}
