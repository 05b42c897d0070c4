use crate::model::{Nurse, Ward};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, warn};

/// Couple (type de patients du service, étiquette d'accès de l'infirmière).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityPair {
    pub patient_type: String,
    pub access_tag: String,
}

/// Table figée de compatibilité service/infirmière.
///
/// Comparaison exacte, sensible à la casse. La table par défaut garde la
/// casse historique de `Trauma` : un service `trauma` n'accepte pas une
/// infirmière étiquetée `trauma`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompatibilityTable {
    pairs: Vec<CompatibilityPair>,
}

impl CompatibilityTable {
    pub fn new<I, P, A>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (P, A)>,
        P: Into<String>,
        A: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(p, a)| CompatibilityPair {
                    patient_type: p.into(),
                    access_tag: a.into(),
                })
                .collect(),
        }
    }

    pub fn pairs(&self) -> &[CompatibilityPair] {
        &self.pairs
    }

    pub fn accepts(&self, patient_type: &str, access_tag: &str) -> bool {
        self.pairs
            .iter()
            .any(|p| p.patient_type == patient_type && p.access_tag == access_tag)
    }
}

impl Default for CompatibilityTable {
    fn default() -> Self {
        Self::new([
            ("pediatric", "pediatric"),
            ("pediatric", "general"),
            ("adult", "adult"),
            ("adult", "general"),
            ("trauma", "Trauma"),
        ])
    }
}

/// Palier du filtre ayant produit le pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityTier {
    Strict,
    /// Accès + hiérarchie, sans qualification.
    WithoutQualifications,
    /// Qualifications requises par n'importe quel service, plafonné.
    CrossWardQualifications,
    /// Aucun candidat plausible.
    Exhausted,
}

impl EligibilityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            EligibilityTier::Strict => "strict",
            EligibilityTier::WithoutQualifications => "without_qualifications",
            EligibilityTier::CrossWardQualifications => "cross_ward_qualifications",
            EligibilityTier::Exhausted => "exhausted",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Eligibility<'a> {
    pub nurses: Vec<&'a Nurse>,
    pub tier: EligibilityTier,
}

pub fn has_ward_access(nurse: &Nurse, ward: &Ward, table: &CompatibilityTable) -> bool {
    if nurse.ward_access.is_empty() {
        return true;
    }
    if nurse.ward_access.iter().any(|tag| tag == &ward.name) {
        return true;
    }
    ward.patient_types.iter().any(|patient_type| {
        nurse
            .ward_access
            .iter()
            .any(|tag| table.accepts(patient_type, tag))
    })
}

fn meets_hierarchy(nurse: &Nurse, ward: &Ward) -> bool {
    nurse.hierarchy_level >= ward.min_level()
}

fn meets_qualifications(nurse: &Nurse, ward: &Ward) -> bool {
    ward.required_qualifications.is_empty()
        || nurse
            .qualifications
            .iter()
            .any(|q| ward.required_qualifications.contains(q))
}

/// Filtre les infirmières autorisées à travailler dans `ward`, avec repli en cascade.
///
/// `all_wards` sert au dernier palier : union des qualifications requises par
/// tous les services considérés. Les infirmières inactives ne passent aucun palier.
pub fn filter_eligible<'a>(
    nurses: &'a [Nurse],
    ward: &Ward,
    all_wards: &[Ward],
    table: &CompatibilityTable,
    fallback_cap: usize,
) -> Eligibility<'a> {
    let active: Vec<&Nurse> = nurses.iter().filter(|n| n.active).collect();

    let strict: Vec<&Nurse> = active
        .iter()
        .copied()
        .filter(|n| {
            has_ward_access(n, ward, table) && meets_hierarchy(n, ward) && meets_qualifications(n, ward)
        })
        .collect();
    if !strict.is_empty() {
        info!(ward = ward.id.as_str(), count = strict.len(), "eligibility: strict");
        return Eligibility {
            nurses: strict,
            tier: EligibilityTier::Strict,
        };
    }

    let relaxed: Vec<&Nurse> = active
        .iter()
        .copied()
        .filter(|n| has_ward_access(n, ward, table) && meets_hierarchy(n, ward))
        .collect();
    if !relaxed.is_empty() {
        warn!(
            ward = ward.id.as_str(),
            count = relaxed.len(),
            "eligibility fallback: qualifications dropped"
        );
        return Eligibility {
            nurses: relaxed,
            tier: EligibilityTier::WithoutQualifications,
        };
    }

    let wanted: HashSet<&str> = all_wards
        .iter()
        .flat_map(|w| w.required_qualifications.iter().map(String::as_str))
        .collect();
    let cross: Vec<&Nurse> = active
        .iter()
        .copied()
        .filter(|n| n.qualifications.iter().any(|q| wanted.contains(q.as_str())))
        .take(fallback_cap)
        .collect();
    if !cross.is_empty() {
        warn!(
            ward = ward.id.as_str(),
            count = cross.len(),
            cap = fallback_cap,
            "eligibility fallback: cross-ward qualifications"
        );
        return Eligibility {
            nurses: cross,
            tier: EligibilityTier::CrossWardQualifications,
        };
    }

    warn!(ward = ward.id.as_str(), "eligibility: no candidate in any tier");
    Eligibility {
        nurses: Vec::new(),
        tier: EligibilityTier::Exhausted,
    }
}
