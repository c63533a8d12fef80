//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `ward_core` linkage and print registry statistics.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Without a database path an empty in-memory registry is opened.

use clap::Parser;
use log::warn;
use std::path::PathBuf;
use std::process::ExitCode;
use ward_core::logging::LogConfig;
use ward_core::{
    open_db, open_db_in_memory, SqliteFamilyRepository, SqliteRequestRepository,
    StatisticsService,
};

#[derive(Debug, Parser)]
#[command(name = "ward_cli")]
#[command(about = "Ward registry smoke check: prints household and request counts", long_about = None)]
struct Args {
    /// SQLite database file; created and migrated when missing
    db_path: Option<PathBuf>,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, env = "WARD_LOG_DIR")]
    log_dir: Option<String>,

    /// trace | debug | info | warn | error
    #[arg(long, env = "WARD_LOG_LEVEL")]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(config) = LogConfig::resolve(args.log_dir.as_deref(), args.log_level.as_deref())
    {
        if let Err(err) = config.init() {
            eprintln!("ward_cli logging disabled: {err}");
        }
    }

    println!("ward_core ping={}", ward_core::ping());
    println!("ward_core version={}", ward_core::core_version());

    match run(args.db_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            warn!("event=cli_run module=cli status=error error={message}");
            eprintln!("ward_cli error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(db_path: Option<PathBuf>) -> Result<(), String> {
    let conn = match db_path {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    }
    .map_err(|err| err.to_string())?;

    let families = SqliteFamilyRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let requests = SqliteRequestRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let service = StatisticsService::new(families, requests);

    let stats = service.statistics().map_err(|err| err.to_string())?;
    println!("families={}", stats.total_families);
    println!("members={}", stats.total_members);
    println!("disabled={}", stats.disabled_members);
    println!("senior_citizens={}", stats.senior_citizens);
    println!("students={}", stats.students);

    let summary = service.request_summary().map_err(|err| err.to_string())?;
    println!(
        "requests pending={} in_progress={} completed={} rejected={}",
        summary.pending, summary.in_progress, summary.completed, summary.rejected
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{run, Args};
    use clap::error::ErrorKind;
    use clap::{CommandFactory, Parser};
    use std::path::PathBuf;

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn help_flag_prints_usage_instead_of_opening_a_database() {
        let err = Args::try_parse_from(["ward_cli", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn positional_argument_is_the_database_path() {
        let args = Args::try_parse_from(["ward_cli", "ward.db"]).unwrap();
        assert_eq!(args.db_path, Some(PathBuf::from("ward.db")));

        let args = Args::try_parse_from(["ward_cli"]).unwrap();
        assert_eq!(args.db_path, None);
    }

    #[test]
    fn unknown_flags_are_rejected() {
        let err = Args::try_parse_from(["ward_cli", "--drop-all"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn run_reports_counts_for_a_fresh_file_database() {
        let dir = tempfile::tempdir().unwrap();
        run(Some(dir.path().join("ward.db"))).unwrap();
        assert!(dir.path().join("ward.db").exists());
    }
}
