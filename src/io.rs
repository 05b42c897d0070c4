use crate::engine::GenerationResult;
use crate::model::{Nurse, NurseId, ShiftRequirement, ShiftType, UnavailabilityEntry, Ward};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::Path;

/// Import d'infirmières depuis CSV: header `id,name,access,qualifications,level[,active]`
///
/// Les colonnes `access` et `qualifications` sont des listes séparées par `;`.
/// L'`id` est obligatoire : un nouvel import du même fichier met à jour les mêmes infirmières.
pub fn import_nurses_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Nurse>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let id = rec.get(0).context("missing id")?.trim();
        let name = rec.get(1).context("missing name")?.trim();
        if name.is_empty() {
            bail!("invalid nurse row (empty name)");
        }
        if id.is_empty() {
            bail!("invalid nurse row (empty id) for nurse {name}");
        }
        let access = rec.get(2).context("missing access")?;
        let quals = rec.get(3).context("missing qualifications")?;
        let level_raw = rec.get(4).context("missing level")?.trim();
        let level: u8 = level_raw
            .parse()
            .with_context(|| format!("invalid level {level_raw:?} for nurse {name}"))?;
        if level == 0 {
            bail!("level must be >= 1 for nurse {name}");
        }

        let mut nurse = Nurse::new(name, level)
            .with_id(NurseId::new(id))
            .with_access(split_list(access))
            .with_qualifications(split_list(quals));
        if let Some(flag) = rec.get(5) {
            let flag = flag.trim();
            if !flag.is_empty() {
                nurse.active = parse_bool(flag)
                    .with_context(|| format!("invalid active value for nurse {name}"))?;
            }
        }
        out.push(nurse);
    }
    Ok(out)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(s: &str) -> anyhow::Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "oui" => Ok(true),
        "false" | "0" | "no" | "n" | "non" => Ok(false),
        _ => bail!("expected boolean"),
    }
}

/// Import d'indisponibilités approuvées: header `nurse_id,date,shift`
///
/// `date` accepte `YYYY-MM-DD` ou une plage inclusive `A..B` / `A/B`.
/// Un `shift` vide ou `ALL` couvre les trois gardes.
pub fn import_unavailability_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<UnavailabilityEntry>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let nurse = rec.get(0).context("missing nurse_id")?.trim();
        if nurse.is_empty() {
            bail!("invalid unavailability row (empty nurse_id)");
        }
        let dates = parse_dates(rec.get(1).context("missing date")?.trim())
            .with_context(|| format!("invalid date for nurse {nurse}"))?;
        let shifts = parse_shifts(rec.get(2).unwrap_or("").trim())
            .with_context(|| format!("invalid shift for nurse {nurse}"))?;
        for date in dates {
            for shift in &shifts {
                out.push(UnavailabilityEntry::new(NurseId::new(nurse), date, *shift));
            }
        }
    }
    Ok(out)
}

fn parse_dates(raw: &str) -> anyhow::Result<Vec<NaiveDate>> {
    if let Some((start_raw, end_raw)) = raw.split_once("..").or_else(|| raw.split_once('/')) {
        let start = parse_date(start_raw.trim())?;
        let end = parse_date(end_raw.trim())?;
        if end < start {
            bail!("range end {end} before start {start}");
        }
        Ok(start.iter_days().take_while(|d| *d <= end).collect())
    } else {
        Ok(vec![parse_date(raw)?])
    }
}

fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("invalid date: {raw}"))
}

fn parse_shifts(raw: &str) -> anyhow::Result<Vec<ShiftType>> {
    if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
        return Ok(ShiftType::ORDER.to_vec());
    }
    let shift: ShiftType = raw.parse().map_err(anyhow::Error::msg)?;
    Ok(vec![shift])
}

/// Import de services depuis un tableau JSON.
///
/// Chaque besoin est borné à [`ShiftRequirement::MAX_PER_ROLE`] par rôle.
pub fn import_wards_json<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Ward>> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let wards: Vec<Ward> =
        serde_json::from_slice(&data).with_context(|| format!("parsing {}", path.display()))?;
    for ward in &wards {
        if ward.id.as_str().trim().is_empty() {
            bail!("ward id cannot be empty");
        }
        for shift in ShiftType::ORDER {
            if let Some(req) = ward.requirements.get(shift) {
                if !req.is_within_limit() {
                    bail!(
                        "ward {}: {shift} requirement {}/{} exceeds {} per role",
                        ward.id.as_str(),
                        req.staff,
                        req.charge,
                        ShiftRequirement::MAX_PER_ROLE
                    );
                }
            }
        }
    }
    Ok(wards)
}

/// Export JSON du résultat (jolie mise en forme)
pub fn export_result_json<P: AsRef<Path>>(path: P, result: &GenerationResult) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(result)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV du planning: header `date,weekday,shift,nurse_id,nurse_name,role,selection,hours`
///
/// Un créneau vide produit une ligne sans infirmière.
pub fn export_schedule_csv<P: AsRef<Path>>(path: P, result: &GenerationResult) -> anyhow::Result<()> {
    let w = WriterBuilder::new().has_headers(true).from_path(path)?;
    write_schedule_csv(w, result)
}

/// Même contenu que [`export_schedule_csv`], en mémoire.
pub fn schedule_csv_string(result: &GenerationResult) -> anyhow::Result<String> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(Vec::new());
    write_rows(&mut w, result)?;
    let bytes = w
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing csv buffer: {}", e.error()))?;
    String::from_utf8(bytes).context("csv output is not utf-8")
}

fn write_schedule_csv(mut w: csv::Writer<fs::File>, result: &GenerationResult) -> anyhow::Result<()> {
    write_rows(&mut w, result)?;
    w.flush()?;
    Ok(())
}

fn write_rows<W: std::io::Write>(w: &mut csv::Writer<W>, result: &GenerationResult) -> anyhow::Result<()> {
    w.write_record([
        "date",
        "weekday",
        "shift",
        "nurse_id",
        "nurse_name",
        "role",
        "selection",
        "hours",
    ])?;
    let mut hours_buf = itoa::Buffer::new();
    for day in &result.days {
        let date = day.date.to_string();
        let weekday = day.weekday.to_string();
        for slot in &day.shifts {
            if slot.assigned.is_empty() {
                w.write_record([
                    date.as_str(),
                    weekday.as_str(),
                    slot.shift.as_str(),
                    "",
                    "",
                    "",
                    "",
                    "",
                ])?;
                continue;
            }
            for rec in &slot.assigned {
                w.write_record([
                    date.as_str(),
                    weekday.as_str(),
                    rec.shift.as_str(),
                    rec.nurse_id.as_str(),
                    rec.nurse_name.as_str(),
                    rec.role.as_str(),
                    rec.selection.as_str(),
                    hours_buf.format(rec.hours),
                ])?;
            }
        }
    }
    Ok(())
}
