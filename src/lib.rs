#![forbid(unsafe_code)]
//! Roulement — moteur d'affectation des gardes infirmières par service.
//!
//! - Filtre d'éligibilité avec repli en cascade.
//! - Indisponibilités approuvées (blocages durs), repos nuit → jour.
//! - Sélection charge/staff par équité (moins de gardes d'abord).
//! - Contrôle a posteriori des violations.
//! - Entrées/sorties fichiers (JSON/CSV), sans base de données.

pub mod config;
pub mod engine;
pub mod io;
pub mod model;
pub mod storage;

pub use config::load_options_from_file;
pub use engine::{
    coverage_percent, verify_schedule, Availability, AvailabilityIndex, CompatibilityTable,
    DaySchedule, Engine, EngineError, EngineOptions, EligibilityTier, FairnessSpread,
    GenerationResult, NurseRunningState, RunTotals, ShiftSlot, TieBreak, Violation, ViolationKind,
};
pub use model::{
    AssignmentRecord, Dataset, Nurse, NurseId, Role, Selection, ShiftRequirement,
    ShiftRequirements, ShiftType, UnavailabilityEntry, Ward, WardId,
};
pub use storage::{JsonStorage, Storage};
