#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use roulement::{
    config, io,
    engine::{verify_schedule, Engine, EngineOptions, GenerationResult, TieBreak, Violation},
    model::{Dataset, ShiftRequirement, WardId},
    storage::{JsonStorage, Storage},
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de génération des gardes infirmières (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du jeu de données (services, infirmières, indisponibilités)
    #[arg(long, global = true, default_value = "dataset.json")]
    data: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum TieBreakArg {
    InputOrder,
    NurseId,
}

impl From<TieBreakArg> for TieBreak {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::InputOrder => TieBreak::InputOrder,
            TieBreakArg::NurseId => TieBreak::NurseId,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Importer des infirmières depuis un CSV
    ImportNurses {
        #[arg(long)]
        csv: String,
    },

    /// Importer des services depuis un tableau JSON
    ImportWards {
        #[arg(long)]
        json: String,
    },

    /// Importer des indisponibilités approuvées depuis un CSV
    ImportUnavailability {
        #[arg(long)]
        csv: String,
    },

    /// Lister les infirmières éligibles pour un service
    Eligible {
        #[arg(long)]
        ward: String,
        /// Options moteur (JSON), comme pour `generate`
        #[arg(long)]
        config: Option<String>,
    },

    /// Générer le planning d'un service sur une période (bornes incluses)
    Generate {
        #[arg(long)]
        ward: String,
        /// YYYY-MM-DD
        #[arg(long)]
        start: String,
        /// YYYY-MM-DD
        #[arg(long)]
        end: String,
        /// Options moteur (JSON)
        #[arg(long)]
        config: Option<String>,
        #[arg(long)]
        default_staff: Option<u32>,
        #[arg(long)]
        default_charge: Option<u32>,
        #[arg(long)]
        shift_hours: Option<u32>,
        #[arg(long, value_enum)]
        tie_break: Option<TieBreakArg>,
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Recontrôler un résultat exporté contre les indisponibilités
    Check {
        #[arg(long)]
        result: String,
        /// Export CSV des violations (optionnel)
        #[arg(long)]
        report: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = Subscriber::builder().with_env_filter(filter).try_init();
    }

    let storage: JsonStorage<Dataset> = JsonStorage::open(&cli.data)?;
    let mut dataset = if storage.exists() {
        storage.load()?
    } else {
        Dataset::default()
    };

    let code = match cli.cmd {
        Commands::ImportNurses { csv } => {
            let nurses = io::import_nurses_csv(csv)?;
            println!("imported {} nurse(s)", nurses.len());
            dataset.upsert_nurses(nurses);
            storage.save(&dataset)?;
            0
        }
        Commands::ImportWards { json } => {
            let wards = io::import_wards_json(json)?;
            println!("imported {} ward(s)", wards.len());
            dataset.upsert_wards(wards);
            storage.save(&dataset)?;
            0
        }
        Commands::ImportUnavailability { csv } => {
            let entries = io::import_unavailability_csv(csv)?;
            println!("imported {} unavailability entr(y/ies)", entries.len());
            dataset.unavailability.extend(entries);
            storage.save(&dataset)?;
            0
        }
        Commands::Eligible {
            ward,
            config: config_path,
        } => {
            let opts = load_options(config_path)?;
            let engine = Engine::new(dataset, opts);
            let eligibility = engine.eligible(&WardId::new(&ward))?;
            println!("tier: {}", eligibility.tier.as_str());
            for nurse in &eligibility.nurses {
                println!(
                    "{} | {} | level {}",
                    nurse.id.as_str(),
                    nurse.name,
                    nurse.hierarchy_level
                );
            }
            0
        }
        Commands::Generate {
            ward,
            start,
            end,
            config: config_path,
            default_staff,
            default_charge,
            shift_hours,
            tie_break,
            out_json,
            out_csv,
        } => {
            let start = parse_date(&start)?;
            let end = parse_date(&end)?;
            if end < start {
                bail!("end date must not be before start date");
            }

            let mut opts = load_options(config_path)?;
            if default_staff.is_some() || default_charge.is_some() {
                opts.default_requirement = ShiftRequirement::new(
                    default_staff.unwrap_or(opts.default_requirement.staff),
                    default_charge.unwrap_or(opts.default_requirement.charge),
                );
            }
            if let Some(hours) = shift_hours {
                opts.shift_hours = hours;
            }
            if let Some(tb) = tie_break {
                opts.tie_break = tb.into();
            }

            let engine = Engine::new(dataset, opts);
            let result = engine.generate(&WardId::new(&ward), start, end)?;

            if let Some(path) = out_json {
                io::export_result_json(path, &result)?;
            }
            if let Some(path) = out_csv {
                io::export_schedule_csv(path, &result)?;
            }
            print_summary(&result);

            if result.violations.is_empty() {
                0
            } else {
                print_violations(&result.violations);
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::Check { result, report } => {
            let result = JsonStorage::<GenerationResult>::open(&result)?.load()?;
            let violations = verify_schedule(&result.days, &dataset.unavailability);
            if violations.is_empty() {
                println!("OK: no violations");
                0
            } else {
                print_violations(&violations);
                if let Some(path) = report {
                    let mut w = csv::Writer::from_path(path)?;
                    w.write_record(["nurse_id", "date", "shift", "kind", "reason"])?;
                    for v in &violations {
                        let date = v.date.to_string();
                        w.write_record([
                            v.nurse_id.as_str(),
                            date.as_str(),
                            v.shift.as_str(),
                            v.kind.as_str(),
                            v.reason.as_str(),
                        ])?;
                    }
                    w.flush()?;
                }
                2
            }
        }
    };

    std::process::exit(code);
}

fn load_options(path: Option<String>) -> Result<EngineOptions> {
    match path {
        Some(path) => config::load_options_from_file(path),
        None => Ok(EngineOptions::default()),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").with_context(|| format!("invalid date: {raw}"))
}

fn print_summary(result: &GenerationResult) {
    println!(
        "ward {} | {} → {} | eligibility {}",
        result.ward_id.as_str(),
        result.start,
        result.end,
        result.eligibility.as_str()
    );
    for day in &result.days {
        let slots: Vec<String> = day
            .shifts
            .iter()
            .map(|s| {
                format!(
                    "{} {}/{} ({:.1}%)",
                    s.shift,
                    s.actual_total(),
                    s.required_total(),
                    s.coverage
                )
            })
            .collect();
        println!("{} {} | {}", day.date, day.weekday, slots.join(" | "));
    }
    println!(
        "total {}/{} ({:.1}%) | staff {}/{} | charge {}/{} | fairness {}..{}",
        result.totals.assigned,
        result.totals.required,
        result.totals.coverage(),
        result.totals.assigned_staff,
        result.totals.required_staff,
        result.totals.assigned_charge,
        result.totals.required_charge,
        result.fairness.min_shifts,
        result.fairness.max_shifts
    );
}

fn print_violations(violations: &[Violation]) {
    eprintln!("Found {} violation(s)", violations.len());
    for v in violations {
        eprintln!(
            "{} {} {} | {} | {}",
            v.date,
            v.shift,
            v.nurse_name,
            v.kind.as_str(),
            v.reason
        );
    }
}
