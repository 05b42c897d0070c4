use crate::model::{AssignmentRecord, Nurse, NurseId, ShiftType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// État courant d'une infirmière pendant une génération.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NurseRunningState {
    pub nurse_id: NurseId,
    pub last_shift: Option<ShiftType>,
    pub last_date: Option<NaiveDate>,
    pub total_shifts: u32,
}

impl NurseRunningState {
    pub fn empty(nurse_id: NurseId) -> Self {
        Self {
            nurse_id,
            last_shift: None,
            last_date: None,
            total_shifts: 0,
        }
    }
}

/// États de toutes les infirmières, détenus par la boucle de jours.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    order: Vec<NurseId>,
    states: HashMap<NurseId, NurseRunningState>,
}

impl RunState {
    pub fn new(nurses: &[Nurse]) -> Self {
        let mut order = Vec::with_capacity(nurses.len());
        let mut states = HashMap::with_capacity(nurses.len());
        for nurse in nurses {
            if states.contains_key(&nurse.id) {
                continue;
            }
            order.push(nurse.id.clone());
            states.insert(nurse.id.clone(), NurseRunningState::empty(nurse.id.clone()));
        }
        Self { order, states }
    }

    pub fn get(&self, id: &NurseId) -> Option<&NurseRunningState> {
        self.states.get(id)
    }

    pub fn total_shifts(&self, id: &NurseId) -> u32 {
        self.states.get(id).map_or(0, |s| s.total_shifts)
    }

    /// Une seule mise à jour par affectation.
    pub fn record(&mut self, assignment: &AssignmentRecord) {
        let state = self
            .states
            .entry(assignment.nurse_id.clone())
            .or_insert_with(|| NurseRunningState::empty(assignment.nurse_id.clone()));
        state.last_shift = Some(assignment.shift);
        state.last_date = Some(assignment.date);
        state.total_shifts += 1;
    }

    /// Instantané dans l'ordre du roster.
    pub fn snapshot(&self) -> Vec<NurseRunningState> {
        self.order
            .iter()
            .filter_map(|id| self.states.get(id).cloned())
            .collect()
    }
}
