#![forbid(unsafe_code)]
use roulement::{
    coverage_percent, Dataset, Engine, EngineError, EngineOptions, Nurse, NurseId, Role,
    Selection, ShiftRequirement, ShiftType, TieBreak, UnavailabilityEntry, Ward, WardId,
};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn nurse(id: &str, name: &str, level: u8) -> Nurse {
    Nurse::new(name, level).with_id(NurseId::new(id))
}

fn one_staff_ward(id: &str) -> Ward {
    Ward::new(id, id)
        .with_requirement(ShiftType::Day, 1, 0)
        .with_requirement(ShiftType::Evening, 1, 0)
        .with_requirement(ShiftType::Night, 1, 0)
}

fn icu_dataset() -> Dataset {
    let ward = Ward::new("icu", "ICU")
        .with_requirement(ShiftType::Day, 2, 1)
        .with_requirement(ShiftType::Evening, 2, 1)
        .with_requirement(ShiftType::Night, 1, 1);
    Dataset {
        wards: vec![ward],
        nurses: vec![
            nurse("s1", "Staff 1", 1),
            nurse("s2", "Staff 2", 1),
            nurse("s3", "Staff 3", 1),
            nurse("c1", "Charge 1", 2),
            nurse("c2", "Charge 2", 2),
        ],
        unavailability: Vec::new(),
    }
}

fn ids(slot: &roulement::ShiftSlot) -> Vec<&str> {
    slot.assigned.iter().map(|r| r.nurse_id.as_str()).collect()
}

#[test]
fn resource_exhaustion_single_day() {
    let engine = Engine::new(icu_dataset(), EngineOptions::default());
    let day1 = date(2024, 1, 1);
    let result = engine.generate(&WardId::new("icu"), day1, day1).unwrap();

    assert_eq!(result.days.len(), 1);
    let day = &result.days[0];

    let morning = day.slot(ShiftType::Day).unwrap();
    assert_eq!(ids(morning), vec!["c1", "s1", "s2"]);
    assert_eq!(morning.actual_charge, 1);
    assert_eq!(morning.actual_staff, 2);
    assert_eq!(morning.coverage, 100.0);

    let evening = day.slot(ShiftType::Evening).unwrap();
    assert_eq!(ids(evening), vec!["c2", "s3"]);
    assert!(evening.coverage < 100.0);
    assert!((evening.coverage - 200.0 / 3.0).abs() < 1e-9);

    let night = day.slot(ShiftType::Night).unwrap();
    assert!(night.assigned.is_empty());
    assert_eq!(night.coverage, 0.0);
    assert_eq!(night.required_total(), 2);

    assert_eq!(result.totals.required, 8);
    assert_eq!(result.totals.assigned, 5);
    assert_eq!(result.totals.understaffed_slots, 2);
    assert!(result.violations.is_empty());
}

#[test]
fn hard_block_wins_over_fairness() {
    let day2 = date(2024, 1, 2);
    let mut dataset = Dataset {
        wards: vec![one_staff_ward("med")],
        nurses: vec![
            nurse("a", "A", 1),
            nurse("b", "B", 1),
            nurse("x", "X", 1),
            nurse("c", "C", 1),
        ],
        unavailability: Vec::new(),
    };

    // sans blocage, X serait choisie pour la nuit
    let free = Engine::new(dataset.clone(), EngineOptions::default())
        .generate(&WardId::new("med"), day2, day2)
        .unwrap();
    assert_eq!(ids(free.days[0].slot(ShiftType::Night).unwrap()), vec!["x"]);

    dataset
        .unavailability
        .push(UnavailabilityEntry::new(NurseId::new("x"), day2, ShiftType::Night));
    let blocked = Engine::new(dataset, EngineOptions::default())
        .generate(&WardId::new("med"), day2, day2)
        .unwrap();
    let night = blocked.days[0].slot(ShiftType::Night).unwrap();
    assert_eq!(ids(night), vec!["c"]);
    assert!(!night.contains(&NurseId::new("x")));
    assert!(blocked.violations.is_empty());
}

#[test]
fn no_day_shift_after_night() {
    let dataset = Dataset {
        wards: vec![one_staff_ward("med")],
        nurses: vec![nurse("a", "A", 1), nurse("b", "B", 1), nurse("c", "C", 1)],
        unavailability: Vec::new(),
    };
    let engine = Engine::new(dataset, EngineOptions::default());
    let result = engine
        .generate(&WardId::new("med"), date(2024, 3, 1), date(2024, 3, 7))
        .unwrap();

    assert_eq!(ids(result.days[0].slot(ShiftType::Night).unwrap()), vec!["c"]);
    assert_ne!(ids(result.days[1].slot(ShiftType::Day).unwrap()), vec!["c"]);

    for pair in result.days.windows(2) {
        let night = pair[0].slot(ShiftType::Night).unwrap();
        let next_day = pair[1].slot(ShiftType::Day).unwrap();
        for rec in &night.assigned {
            assert!(
                !next_day.contains(&rec.nurse_id),
                "{} works DAY on {} after NIGHT",
                rec.nurse_id.as_str(),
                pair[1].date
            );
        }
    }
}

#[test]
fn nobody_is_double_booked() {
    let mut nurses = Vec::new();
    for i in 0..6 {
        nurses.push(nurse(&format!("s{i}"), &format!("Staff {i}"), 1));
    }
    nurses.push(nurse("c0", "Charge 0", 2));
    nurses.push(nurse("c1", "Charge 1", 3));
    let dataset = Dataset {
        wards: vec![Ward::new("er", "ER")
            .with_requirement(ShiftType::Day, 2, 1)
            .with_requirement(ShiftType::Evening, 2, 1)
            .with_requirement(ShiftType::Night, 1, 1)],
        nurses,
        unavailability: Vec::new(),
    };
    let engine = Engine::new(dataset, EngineOptions::default());
    let result = engine
        .generate(&WardId::new("er"), date(2024, 2, 1), date(2024, 2, 14))
        .unwrap();

    for day in &result.days {
        let mut seen = HashSet::new();
        for slot in &day.shifts {
            for rec in &slot.assigned {
                assert!(
                    seen.insert(rec.nurse_id.clone()),
                    "{} double-booked on {}",
                    rec.nurse_id.as_str(),
                    day.date
                );
            }
        }
    }
    assert!(result.violations.is_empty());
}

#[test]
fn fairness_under_abundance() {
    let nurses: Vec<Nurse> = (0..10)
        .map(|i| nurse(&format!("n{i}"), &format!("Nurse {i}"), 1))
        .collect();
    let dataset = Dataset {
        wards: vec![one_staff_ward("med")],
        nurses,
        unavailability: Vec::new(),
    };
    let engine = Engine::new(dataset, EngineOptions::default());
    let result = engine
        .generate(&WardId::new("med"), date(2024, 1, 1), date(2024, 1, 10))
        .unwrap();

    assert_eq!(result.totals.assigned, 30);
    let totals: Vec<u32> = result.nurse_states.iter().map(|s| s.total_shifts).collect();
    let min = *totals.iter().min().unwrap();
    let max = *totals.iter().max().unwrap();
    assert!(max - min <= 1, "spread {min}..{max}");
    assert!(result.fairness.gap() <= 1);
}

#[test]
fn running_state_tracks_last_assignment() {
    let engine = Engine::new(icu_dataset(), EngineOptions::default());
    let day1 = date(2024, 1, 1);
    let result = engine.generate(&WardId::new("icu"), day1, day1).unwrap();

    let c2 = result.nurse_state(&NurseId::new("c2")).unwrap();
    assert_eq!(c2.last_shift, Some(ShiftType::Evening));
    assert_eq!(c2.last_date, Some(day1));
    assert_eq!(c2.total_shifts, 1);

    let order: Vec<&str> = result.nurse_states.iter().map(|s| s.nurse_id.as_str()).collect();
    assert_eq!(order, vec!["s1", "s2", "s3", "c1", "c2"]);
}

#[test]
fn coverage_formula() {
    assert_eq!(coverage_percent(0, 0), 0.0);
    assert_eq!(coverage_percent(3, 0), 0.0);
    assert_eq!(coverage_percent(4, 4), 100.0);
    assert!((coverage_percent(2, 3) - 66.666_666).abs() < 1e-4);

    let engine = Engine::new(icu_dataset(), EngineOptions::default());
    let result = engine
        .generate(&WardId::new("icu"), date(2024, 1, 1), date(2024, 1, 3))
        .unwrap();
    for slot in result.days.iter().flat_map(|d| d.shifts.iter()) {
        let expected = coverage_percent(slot.actual_total(), slot.required_total());
        assert_eq!(slot.coverage, expected);
    }
}

#[test]
fn missing_or_zero_requirement_uses_default() {
    let ward = Ward::new("w", "W").with_requirement(ShiftType::Evening, 0, 0);
    let mut nurses = Vec::new();
    for i in 0..12 {
        nurses.push(nurse(&format!("n{i}"), &format!("N{i}"), if i < 6 { 1 } else { 2 }));
    }
    let dataset = Dataset {
        wards: vec![ward],
        nurses,
        unavailability: Vec::new(),
    };
    let day1 = date(2024, 5, 1);

    let result = Engine::new(dataset.clone(), EngineOptions::default())
        .generate(&WardId::new("w"), day1, day1)
        .unwrap();
    for slot in &result.days[0].shifts {
        assert_eq!(slot.required_staff, 2);
        assert_eq!(slot.required_charge, 2);
    }

    let opts = EngineOptions {
        default_requirement: ShiftRequirement::new(1, 1),
        ..EngineOptions::default()
    };
    let result = Engine::new(dataset, opts)
        .generate(&WardId::new("w"), day1, day1)
        .unwrap();
    for slot in &result.days[0].shifts {
        assert_eq!(slot.required_total(), 2);
        assert_eq!(slot.actual_total(), 2);
    }
}

#[test]
fn staff_promoted_when_charge_short() {
    let dataset = Dataset {
        wards: vec![Ward::new("w", "W")
            .with_requirement(ShiftType::Day, 1, 2)
            .with_requirement(ShiftType::Evening, 1, 0)
            .with_requirement(ShiftType::Night, 1, 0)],
        nurses: vec![
            nurse("s1", "S1", 1),
            nurse("s2", "S2", 1),
            nurse("c1", "C1", 2),
        ],
        unavailability: Vec::new(),
    };
    let day1 = date(2024, 1, 1);
    let result = Engine::new(dataset, EngineOptions::default())
        .generate(&WardId::new("w"), day1, day1)
        .unwrap();
    let slot = result.days[0].slot(ShiftType::Day).unwrap();

    let roles: Vec<(&str, Role, Selection)> = slot
        .assigned
        .iter()
        .map(|r| (r.nurse_id.as_str(), r.role, r.selection))
        .collect();
    assert_eq!(
        roles,
        vec![
            ("c1", Role::Charge, Selection::Regular),
            ("s1", Role::Charge, Selection::Promoted),
            ("s2", Role::Staff, Selection::Regular),
        ]
    );
    assert_eq!(slot.actual_charge, 2);
    assert_eq!(slot.coverage, 100.0);
}

#[test]
fn best_effort_fills_from_charge_pool() {
    let dataset = Dataset {
        wards: vec![Ward::new("w", "W")
            .with_requirement(ShiftType::Day, 2, 1)
            .with_requirement(ShiftType::Evening, 1, 0)
            .with_requirement(ShiftType::Night, 1, 0)],
        nurses: vec![nurse("h1", "H1", 3), nurse("h2", "H2", 3), nurse("h3", "H3", 4)],
        unavailability: Vec::new(),
    };
    let day1 = date(2024, 1, 1);
    let result = Engine::new(dataset, EngineOptions::default())
        .generate(&WardId::new("w"), day1, day1)
        .unwrap();
    let slot = result.days[0].slot(ShiftType::Day).unwrap();

    assert_eq!(slot.assigned.len(), 3);
    assert!(slot.assigned.iter().all(|r| r.role == Role::Charge));
    let best_effort = slot
        .assigned
        .iter()
        .filter(|r| r.selection == Selection::BestEffort)
        .count();
    assert_eq!(best_effort, 2);
    assert_eq!(slot.coverage, 100.0);
}

#[test]
fn nurse_id_tie_break_is_deterministic() {
    let dataset = Dataset {
        wards: vec![one_staff_ward("w")],
        nurses: vec![nurse("zoe", "Zoé", 1), nurse("ana", "Ana", 1)],
        unavailability: Vec::new(),
    };
    let day1 = date(2024, 1, 1);

    let by_input = Engine::new(dataset.clone(), EngineOptions::default())
        .generate(&WardId::new("w"), day1, day1)
        .unwrap();
    assert_eq!(ids(by_input.days[0].slot(ShiftType::Day).unwrap()), vec!["zoe"]);

    let opts = EngineOptions {
        tie_break: TieBreak::NurseId,
        ..EngineOptions::default()
    };
    let by_id = Engine::new(dataset, opts)
        .generate(&WardId::new("w"), day1, day1)
        .unwrap();
    assert_eq!(ids(by_id.days[0].slot(ShiftType::Day).unwrap()), vec!["ana"]);
}

#[test]
fn hours_follow_options() {
    let opts = EngineOptions {
        shift_hours: 12,
        ..EngineOptions::default()
    };
    let day1 = date(2024, 1, 1);
    let result = Engine::new(icu_dataset(), opts)
        .generate(&WardId::new("icu"), day1, day1)
        .unwrap();
    assert!(result.assignments().all(|r| r.hours == 12));
}

#[test]
fn rejects_unknown_ward_and_reversed_range() {
    let engine = Engine::new(icu_dataset(), EngineOptions::default());
    let err = engine
        .generate(&WardId::new("nope"), date(2024, 1, 1), date(2024, 1, 2))
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownWard(_)));

    let err = engine
        .generate(&WardId::new("icu"), date(2024, 1, 2), date(2024, 1, 1))
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidDateRange { .. }));
}

#[test]
fn day_order_and_weekday() {
    let engine = Engine::new(icu_dataset(), EngineOptions::default());
    let result = engine
        .generate(&WardId::new("icu"), date(2024, 1, 1), date(2024, 1, 4))
        .unwrap();
    let dates: Vec<NaiveDate> = result.days.iter().map(|d| d.date).collect();
    assert_eq!(
        dates,
        vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3), date(2024, 1, 4)]
    );
    assert_eq!(result.days[0].weekday, chrono::Weekday::Mon);
    for day in &result.days {
        let order: Vec<ShiftType> = day.shifts.iter().map(|s| s.shift).collect();
        assert_eq!(order, ShiftType::ORDER.to_vec());
    }

    let mut per_nurse: HashMap<&str, u32> = HashMap::new();
    for rec in result.assignments() {
        *per_nurse.entry(rec.nurse_id.as_str()).or_default() += 1;
    }
    for state in &result.nurse_states {
        assert_eq!(
            per_nurse.get(state.nurse_id.as_str()).copied().unwrap_or(0),
            state.total_shifts
        );
    }
}

#[test]
fn oversized_requirement_is_partial_coverage() {
    let dataset = Dataset {
        wards: vec![
            Ward::new("max", "Max")
                .with_requirement(ShiftType::Day, u32::MAX, 1)
                .with_requirement(ShiftType::Evening, 1, 0)
                .with_requirement(ShiftType::Night, 1, 0),
            Ward::new("huge", "Huge")
                .with_requirement(ShiftType::Day, 2_000_000_000, 2_000_000_000)
                .with_requirement(ShiftType::Evening, 1, 0)
                .with_requirement(ShiftType::Night, 1, 0),
        ],
        nurses: vec![nurse("s1", "S1", 1), nurse("c1", "C1", 2)],
        unavailability: Vec::new(),
    };
    let engine = Engine::new(dataset, EngineOptions::default());
    let day1 = date(2024, 1, 1);

    let result = engine.generate(&WardId::new("max"), day1, day1).unwrap();
    let slot = result.days[0].slot(ShiftType::Day).unwrap();
    assert_eq!(slot.required_total(), u32::MAX);
    assert_eq!(ids(slot), vec!["c1", "s1"]);
    assert!(slot.coverage < 1.0);
    assert_eq!(result.totals.required, u32::MAX);
    assert_eq!(result.totals.understaffed_slots, 3);

    let result = engine.generate(&WardId::new("huge"), day1, day1).unwrap();
    let slot = result.days[0].slot(ShiftType::Day).unwrap();
    assert_eq!(slot.required_total(), 4_000_000_000);
    assert_eq!(slot.actual_total(), 2);
    assert!(result.violations.is_empty());
}

#[test]
fn oversized_default_requirement_is_rejected() {
    let opts = EngineOptions {
        default_requirement: ShiftRequirement::new(ShiftRequirement::MAX_PER_ROLE + 1, 0),
        ..EngineOptions::default()
    };
    assert!(matches!(opts.validate(), Err(EngineError::InvalidOptions(_))));

    let engine = Engine::new(icu_dataset(), opts);
    let err = engine
        .generate(&WardId::new("icu"), date(2024, 1, 1), date(2024, 1, 1))
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidOptions(_)));
}
