use super::eligibility::CompatibilityTable;
use crate::model::{NurseId, ShiftRequirement, ShiftType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Départage entre infirmières ayant le même nombre de gardes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Ordre d'arrivée du roster (tri stable).
    #[default]
    InputOrder,
    /// Ordre lexicographique des identifiants.
    NurseId,
}

/// Options du moteur
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Besoin appliqué quand un service omet (ou met à zéro) un type de garde.
    pub default_requirement: ShiftRequirement,
    pub shift_hours: u32,
    /// Plafond du dernier palier de repli d'éligibilité.
    pub fallback_cap: usize,
    pub tie_break: TieBreak,
    pub compatibility: CompatibilityTable,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            default_requirement: ShiftRequirement::default(),
            shift_hours: 8,
            fallback_cap: 10,
            tie_break: TieBreak::default(),
            compatibility: CompatibilityTable::default(),
        }
    }
}

impl EngineOptions {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.shift_hours == 0 {
            return Err(EngineError::InvalidOptions("shift_hours must be > 0"));
        }
        if self.fallback_cap == 0 {
            return Err(EngineError::InvalidOptions("fallback_cap must be > 0"));
        }
        if !self.default_requirement.is_within_limit() {
            return Err(EngineError::InvalidOptions(
                "default_requirement exceeds the per-role limit",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Affectation sur un créneau couvert par une indisponibilité approuvée.
    Unavailable,
    /// Deux gardes le même jour.
    DoubleBooked,
    /// Garde de jour le lendemain d'une nuit.
    RestAfterNight,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::Unavailable => "unavailable",
            ViolationKind::DoubleBooked => "double_booked",
            ViolationKind::RestAfterNight => "rest_after_night",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub nurse_id: NurseId,
    pub nurse_name: String,
    pub date: NaiveDate,
    pub shift: ShiftType,
    pub kind: ViolationKind,
    pub reason: String,
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid date range: end {end} is before start {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("unknown ward: {0}")]
    UnknownWard(String),
    #[error("invalid options: {0}")]
    InvalidOptions(&'static str),
}
