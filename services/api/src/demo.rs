use crate::infra::{build_service, demo_snapshot, load_snapshot};
use brigade::attendance::{self, AttendanceStats, SquadFilter};
use brigade::config::AppConfig;
use brigade::eligibility::EligibilityReport;
use brigade::error::AppError;
use brigade::members::{rank_counts, upcoming_birthdays};
use brigade::store::MemoryStore;
use brigade::telemetry::{self, LogSink};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::fs::File;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct EligibilityArgs {
    /// Roster snapshot (JSON) to read members from
    #[arg(long)]
    pub(crate) data: PathBuf,
    /// Member id to evaluate
    #[arg(long)]
    pub(crate) member: String,
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct AttendanceStatsArgs {
    /// Attendance export with date, memberId, memberName, squadName and status columns
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Parade date (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: NaiveDate,
    /// Squad number, or `all`
    #[arg(long, default_value = "all")]
    pub(crate) squad: SquadFilter,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the reporting date (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Write the demo roster snapshot to this file (usable with `eligibility --data`)
    #[arg(long)]
    pub(crate) export: Option<PathBuf>,
}

fn init_cli() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init_with_sink(&config.telemetry, LogSink::Stderr)?;
    Ok(config)
}

pub(crate) fn run_eligibility(args: EligibilityArgs) -> Result<(), AppError> {
    let config = init_cli()?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let service = build_service(&config, load_snapshot(&args.data)?);
    let member = service.get_member(&args.member)?;
    let report = service.evaluate_member(&member.id, today)?;

    println!("{} ({}) as of {}", member.name, member.rank_label(), today);
    print_report(&report);
    Ok(())
}

pub(crate) fn run_attendance_stats(args: AttendanceStatsArgs) -> Result<(), AppError> {
    init_cli()?;

    let records = attendance::parse_records(File::open(&args.csv)?)?;
    info!(records = records.len(), path = %args.csv.display(), "attendance export read");

    let stats = attendance::aggregate(&records, args.date, args.squad);
    println!("Attendance for {} ({})", args.date, squad_label(args.squad));
    print_stats(&stats);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = init_cli()?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let store = MemoryStore::from_value(demo_snapshot());
    if let Some(path) = &args.export {
        store.save_to(path)?;
        info!(path = %path.display(), "demo snapshot exported");
    }
    let service = build_service(&config, store);
    let catalog = service.catalog()?;

    println!("== Brigade Console Demo ==");
    println!("Reporting date: {today}");
    println!("Badge catalog: {} badges", catalog.len());
    for category in catalog.list_categories() {
        println!(
            "  - {category}: {}",
            catalog.list_subcategories(&category).join(", ")
        );
    }

    let members = service.list_members()?;
    for member in &members {
        println!();
        println!("{} ({}, {})", member.name, member.rank_label(), member.squad_name().unwrap_or_default());
        let report = service.evaluate_member(&member.id, today)?;
        print_report(&report);
    }

    println!();
    println!("Rank breakdown:");
    for (rank, count) in rank_counts(&members) {
        println!("  {rank}: {count}");
    }

    println!();
    println!("Upcoming birthdays:");
    for birthday in upcoming_birthdays(&members, today) {
        println!(
            "  {} on {} (in {} days, {:?})",
            birthday.name, birthday.next_birthday, birthday.days_until, birthday.window
        );
    }

    let records = service.attendance_records()?;
    if let Some(first) = records.iter().map(|record| record.date).min() {
        println!();
        println!("Attendance for {first} (all squads)");
        print_stats(&service.attendance_stats(first, SquadFilter::All)?);
    }

    println!();
    println!("Parade attendance ({} parades scheduled):", service.parade_schedule()?.total());
    for rate in service.parade_rates()? {
        println!(
            "  {:<16} {:>5.1}% ({} present, {} absent, {} excused)",
            rate.member.name, rate.attendance_rate, rate.present, rate.absent, rate.excused
        );
    }

    Ok(())
}

fn print_report(report: &EligibilityReport) {
    let status = if report.eligible { "eligible" } else { "not yet eligible" };
    println!(
        "  {}: {} ({:.0}% of criteria met)",
        report.target, status, report.progress_percentage
    );
    match report.membership_years {
        Some(years) => println!("  Membership: {years} years"),
        None => println!("  Membership: unknown joining year"),
    }
    println!(
        "  Proficiency: {} distinct, {} advanced",
        report.total_distinct_proficiency, report.total_advanced
    );
    for message in report.missing_messages() {
        println!("  - {message}");
    }
}

fn print_stats(stats: &AttendanceStats) {
    println!(
        "  present {} | absent {} | excused {} | total {}",
        stats.present, stats.absent, stats.excused, stats.total
    );
}

fn squad_label(filter: SquadFilter) -> String {
    match filter {
        SquadFilter::All => "all squads".to_string(),
        SquadFilter::Squad(number) => format!("Squad {number}"),
    }
}
