use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vitals_core::*;

#[derive(Parser)]
#[command(name = "vitalog")]
#[command(about = "Patient vitals tracking and reporting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate and store a new health report
    Record {
        /// Patient name
        #[arg(long)]
        name: String,

        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=120))]
        age: u32,

        /// Systolic blood pressure, mmHg
        #[arg(long, value_parser = clap::value_parser!(u32).range(80..=200))]
        bp: u32,

        #[arg(long, value_parser = clap::value_parser!(u32).range(50..=300))]
        glucose: u32,

        /// Weight in kilograms
        #[arg(long, value_parser = parse_weight)]
        weight: f64,

        /// Height in centimeters
        #[arg(long, value_parser = parse_height)]
        height: f64,
    },

    /// Show all stored reports for a patient
    History {
        #[arg(long)]
        name: String,
    },

    /// Render the health trend chart for a patient
    Trends {
        #[arg(long)]
        name: String,

        /// Output PNG path (defaults to <Name>_health_trends.png in the data dir)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Replace a stored report, keeping its original date
    Update {
        #[arg(long)]
        name: String,

        /// 1-based report number as shown by `history`
        #[arg(long)]
        index: usize,

        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=120))]
        age: u32,

        #[arg(long, value_parser = clap::value_parser!(u32).range(80..=200))]
        bp: u32,

        #[arg(long, value_parser = clap::value_parser!(u32).range(50..=300))]
        glucose: u32,

        #[arg(long, value_parser = parse_weight)]
        weight: f64,

        #[arg(long, value_parser = parse_height)]
        height: f64,
    },

    /// Track medications for a patient
    Medication {
        #[command(subcommand)]
        command: MedicationCommands,
    },

    /// Print a health tip
    Tip,
}

#[derive(Subcommand)]
enum MedicationCommands {
    /// Add a medication entry
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        medication: String,

        #[arg(long)]
        dosage: String,

        /// e.g. "twice daily"
        #[arg(long)]
        frequency: String,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: String,
    },

    /// List medication entries
    List {
        #[arg(long)]
        name: String,
    },
}

fn parse_weight(s: &str) -> std::result::Result<f64, String> {
    parse_bounded(s, "weight", 20.0, 300.0)
}

fn parse_height(s: &str) -> std::result::Result<f64, String> {
    parse_bounded(s, "height", 50.0, 250.0)
}

fn parse_bounded(s: &str, what: &str, min: f64, max: f64) -> std::result::Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("{what} must be a number"))?;
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{what} must be between {min} and {max}"))
    }
}

fn main() {
    vitals_core::logging::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    std::fs::create_dir_all(&data_dir)?;

    match cli.command {
        Commands::Record {
            name,
            age,
            bp,
            glucose,
            weight,
            height,
        } => cmd_record(&data_dir, &name, age, bp, glucose, weight, height),
        Commands::History { name } => cmd_history(&data_dir, &name),
        Commands::Trends { name, output } => cmd_trends(&data_dir, &name, output),
        Commands::Update {
            name,
            index,
            age,
            bp,
            glucose,
            weight,
            height,
        } => cmd_update(&data_dir, &name, index, age, bp, glucose, weight, height),
        Commands::Medication { command } => cmd_medication(&data_dir, command),
        Commands::Tip => {
            println!("Here's your health tip for today:");
            println!("{}", random_tip());
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_record(
    data_dir: &std::path::Path,
    name: &str,
    age: u32,
    bp: u32,
    glucose: u32,
    weight: f64,
    height: f64,
) -> Result<()> {
    let now = chrono::Local::now().naive_local();
    let report = build_report(name, age, bp, glucose, weight, height, now)?;

    let store = ReportStore::new(data_dir);
    store.append(&report)?;

    println!("Generated Report for {name}:");
    print_report(&report);
    println!(
        "Report stored as {}.",
        store.report_path(name).display()
    );

    let score = health_score(bp, glucose, report.bmi);
    println!("Health Score: {score:.2}/100");
    if score < 60.0 {
        println!("Warning: Your health score is low. Please consult a doctor.");
    } else if score < 80.0 {
        println!("Your health score is average. There's room for improvement.");
    } else {
        println!("Great job! Your health score is excellent.");
    }

    Ok(())
}

fn cmd_history(data_dir: &std::path::Path, name: &str) -> Result<()> {
    let store = ReportStore::new(data_dir);
    let reports = match store.read_all(name) {
        Ok(reports) => reports,
        Err(Error::NotFound { .. }) => {
            println!("No reports found for {name}.");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    println!("Found {} reports for {}.", reports.len(), name);
    for (i, report) in reports.iter().enumerate() {
        println!("\n{}. Date: {}", i + 1, report.date.format(types::DATE_FORMAT));
        print_report(report);
    }

    Ok(())
}

fn cmd_trends(
    data_dir: &std::path::Path,
    name: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let store = ReportStore::new(data_dir);
    let points = match parse_for_trends(&store, name) {
        Ok(points) => points,
        Err(Error::NotFound { .. }) => {
            println!("No reports found for {name}.");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let output = output.unwrap_or_else(|| chart::default_chart_path(data_dir, name));
    render_trends(name, &points, &output)?;
    println!("Health trends graph saved as {}", output.display());

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_update(
    data_dir: &std::path::Path,
    name: &str,
    index: usize,
    age: u32,
    bp: u32,
    glucose: u32,
    weight: f64,
    height: f64,
) -> Result<()> {
    let store = ReportStore::new(data_dir);
    if !store.report_path(name).exists() {
        println!("No reports found for {name}.");
        return Ok(());
    }

    // The date is ignored by replace; the stored row keeps its own
    let now = chrono::Local::now().naive_local();
    let new_report = build_report(name, age, bp, glucose, weight, height, now)?;
    let stored = store.replace(name, index, &new_report)?;

    println!("Report updated successfully!");
    print_report(&stored);

    Ok(())
}

fn cmd_medication(data_dir: &std::path::Path, command: MedicationCommands) -> Result<()> {
    let log = MedicationLog::new(data_dir);

    match command {
        MedicationCommands::Add {
            name,
            medication,
            dosage,
            frequency,
            start_date,
        } => {
            log.append(
                &name,
                &Medication {
                    medication,
                    dosage,
                    frequency,
                    start_date,
                },
            )?;
            println!("Medication added successfully!");
            Ok(())
        }

        MedicationCommands::List { name } => {
            let medications = match log.read_all(&name) {
                Ok(medications) => medications,
                Err(Error::NotFound { .. }) => {
                    println!("No medication records found.");
                    return Ok(());
                }
                Err(e) => return Err(e),
            };

            for m in &medications {
                println!(
                    "{}, {}, {}, {}",
                    m.medication, m.dosage, m.frequency, m.start_date
                );
            }
            Ok(())
        }
    }
}

fn print_report(report: &Report) {
    println!("  Name: {}", report.name);
    println!("  Age: {}", report.age);
    println!("  Blood Pressure: {}", report.blood_pressure);
    println!("  Glucose: {}", report.glucose);
    println!("  Weight (kg): {}", report.weight_kg);
    println!("  Height (cm): {}", report.height_cm);
    println!("  BMI: {:.2}", report.bmi);
    println!("  BMI Category: {}", report.bmi_category);
    println!("  Condition: {}", report.condition);
    println!("  Recommendation: {}", report.recommendation);
}
