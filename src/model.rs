use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifiant fort pour Nurse
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NurseId(String);

impl NurseId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifiant fort pour Ward
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WardId(String);

impl WardId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Type de garde. L'ordre des variantes est l'ordre de traitement d'une journée.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShiftType {
    Day,
    Evening,
    Night,
}

impl ShiftType {
    /// Ordre fixe DAY, EVENING, NIGHT.
    pub const ORDER: [ShiftType; 3] = [ShiftType::Day, ShiftType::Evening, ShiftType::Night];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftType::Day => "DAY",
            ShiftType::Evening => "EVENING",
            ShiftType::Night => "NIGHT",
        }
    }
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShiftType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAY" | "D" => Ok(ShiftType::Day),
            "EVENING" | "E" => Ok(ShiftType::Evening),
            "NIGHT" | "N" => Ok(ShiftType::Night),
            other => Err(format!("unknown shift type: {other}")),
        }
    }
}

/// Rôle attribué au moment de la sélection (pas un attribut de l'infirmière).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Staff,
    Charge,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Staff => "staff",
            Role::Charge => "charge",
        }
    }
}

/// Étape de sélection ayant produit une affectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    Regular,
    /// Infirmière du pool staff qui couvre un manque de charge (garde le rôle `charge`).
    Promoted,
    /// Complément après épuisement des deux rôles.
    BestEffort,
}

impl Selection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Selection::Regular => "regular",
            Selection::Promoted => "promoted",
            Selection::BestEffort => "best_effort",
        }
    }
}

/// Infirmière
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nurse {
    pub id: NurseId,
    pub name: String,
    /// Étiquettes d'accès aux services ; vide = aucune restriction.
    #[serde(default)]
    pub ward_access: Vec<String>,
    #[serde(default)]
    pub qualifications: Vec<String>,
    /// 1 = staff, >= 2 = peut être charge.
    pub hierarchy_level: u8,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Nurse {
    pub fn new<N: Into<String>>(name: N, hierarchy_level: u8) -> Self {
        Self {
            id: NurseId::random(),
            name: name.into(),
            ward_access: Vec::new(),
            qualifications: Vec::new(),
            hierarchy_level,
            active: true,
        }
    }

    pub fn with_id(mut self, id: NurseId) -> Self {
        self.id = id;
        self
    }

    pub fn with_access<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ward_access = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_qualifications<I, S>(mut self, quals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.qualifications = quals.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_charge_eligible(&self) -> bool {
        self.hierarchy_level >= 2
    }
}

fn default_true() -> bool {
    true
}

/// Besoin d'une garde : nombre de staff et de charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftRequirement {
    pub staff: u32,
    pub charge: u32,
}

impl ShiftRequirement {
    /// Plafond par rôle accepté à l'import des services et dans les options.
    pub const MAX_PER_ROLE: u32 = 1_000;

    pub fn new(staff: u32, charge: u32) -> Self {
        Self { staff, charge }
    }
    pub fn total(&self) -> u32 {
        self.staff.saturating_add(self.charge)
    }
    pub fn is_within_limit(&self) -> bool {
        self.staff <= Self::MAX_PER_ROLE && self.charge <= Self::MAX_PER_ROLE
    }
    pub fn is_zero(&self) -> bool {
        self.total() == 0
    }
}

impl Default for ShiftRequirement {
    fn default() -> Self {
        Self {
            staff: 2,
            charge: 2,
        }
    }
}

/// Besoins par type de garde ; une entrée absente prend la valeur par défaut du moteur.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftRequirements {
    #[serde(default, rename = "DAY", skip_serializing_if = "Option::is_none")]
    pub day: Option<ShiftRequirement>,
    #[serde(default, rename = "EVENING", skip_serializing_if = "Option::is_none")]
    pub evening: Option<ShiftRequirement>,
    #[serde(default, rename = "NIGHT", skip_serializing_if = "Option::is_none")]
    pub night: Option<ShiftRequirement>,
}

impl ShiftRequirements {
    pub fn get(&self, shift: ShiftType) -> Option<ShiftRequirement> {
        match shift {
            ShiftType::Day => self.day,
            ShiftType::Evening => self.evening,
            ShiftType::Night => self.night,
        }
    }

    pub fn set(&mut self, shift: ShiftType, req: ShiftRequirement) {
        let slot = match shift {
            ShiftType::Day => &mut self.day,
            ShiftType::Evening => &mut self.evening,
            ShiftType::Night => &mut self.night,
        };
        *slot = Some(req);
    }
}

/// Service hospitalier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ward {
    pub id: WardId,
    pub name: String,
    #[serde(default)]
    pub required_qualifications: Vec<String>,
    #[serde(default)]
    pub patient_types: Vec<String>,
    #[serde(default)]
    pub min_hierarchy_level: Option<u8>,
    #[serde(default)]
    pub requirements: ShiftRequirements,
}

impl Ward {
    pub fn new<I: AsRef<str>, N: Into<String>>(id: I, name: N) -> Self {
        Self {
            id: WardId::new(id),
            name: name.into(),
            required_qualifications: Vec::new(),
            patient_types: Vec::new(),
            min_hierarchy_level: None,
            requirements: ShiftRequirements::default(),
        }
    }

    pub fn with_requirement(mut self, shift: ShiftType, staff: u32, charge: u32) -> Self {
        self.requirements.set(shift, ShiftRequirement::new(staff, charge));
        self
    }

    pub fn min_level(&self) -> u8 {
        self.min_hierarchy_level.unwrap_or(1)
    }
}

/// Indisponibilité approuvée : blocage dur pour (infirmière, date, garde).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailabilityEntry {
    pub nurse_id: NurseId,
    pub date: NaiveDate,
    pub shift: ShiftType,
}

impl UnavailabilityEntry {
    pub fn new(nurse_id: NurseId, date: NaiveDate, shift: ShiftType) -> Self {
        Self {
            nurse_id,
            date,
            shift,
        }
    }
}

/// Affectation produite par le sélecteur ; immuable une fois créée.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub nurse_id: NurseId,
    pub nurse_name: String,
    pub shift: ShiftType,
    pub date: NaiveDate,
    pub role: Role,
    pub selection: Selection,
    pub hours: u32,
}

/// Données d'entrée d'une génération (équivalent du roster de fichiers).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub wards: Vec<Ward>,
    #[serde(default)]
    pub nurses: Vec<Nurse>,
    #[serde(default)]
    pub unavailability: Vec<UnavailabilityEntry>,
}

impl Dataset {
    pub fn find_ward<'a>(&'a self, id: &WardId) -> Option<&'a Ward> {
        self.wards.iter().find(|w| &w.id == id)
    }
    /// Ajoute ou remplace (même id) des infirmières, en conservant l'ordre d'arrivée.
    pub fn upsert_nurses(&mut self, nurses: Vec<Nurse>) {
        for nurse in nurses {
            match self.nurses.iter_mut().find(|n| n.id == nurse.id) {
                Some(existing) => *existing = nurse,
                None => self.nurses.push(nurse),
            }
        }
    }
    pub fn upsert_wards(&mut self, wards: Vec<Ward>) {
        for ward in wards {
            match self.wards.iter_mut().find(|w| w.id == ward.id) {
                Some(existing) => *existing = ward,
                None => self.wards.push(ward),
            }
        }
    }
}
