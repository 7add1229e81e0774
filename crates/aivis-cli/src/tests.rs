use clap::Parser;

use super::*;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["aivis", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Db {
            command: DbCommands::Ping
        }
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli = Cli::try_parse_from(["aivis", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Db {
            command: DbCommands::Migrate
        }
    ));
}

#[test]
fn parses_schedule_generate_defaults() {
    let cli = Cli::try_parse_from(["aivis", "schedule", "generate"]).unwrap();

    match cli.command {
        Commands::Schedule {
            command: schedule::ScheduleCommands::Generate { date, dry_run },
        } => {
            assert!(date.is_none());
            assert!(!dry_run);
        }
        other => panic!("expected schedule generate, got: {other:?}"),
    }
}

#[test]
fn parses_schedule_generate_with_date_and_dry_run() {
    let cli = Cli::try_parse_from([
        "aivis",
        "schedule",
        "generate",
        "--date",
        "2026-03-14",
        "--dry-run",
    ])
    .unwrap();

    match cli.command {
        Commands::Schedule {
            command: schedule::ScheduleCommands::Generate { date, dry_run },
        } => {
            assert_eq!(date.as_deref(), Some("2026-03-14"));
            assert!(dry_run);
        }
        other => panic!("expected schedule generate, got: {other:?}"),
    }
}

#[test]
fn parses_schedule_show_command() {
    let cli = Cli::try_parse_from(["aivis", "schedule", "show", "--date", "2026-03-14"]).unwrap();

    assert!(matches!(
        cli.command,
        Commands::Schedule {
            command: schedule::ScheduleCommands::Show { .. }
        }
    ));
}

#[test]
fn parses_schedule_daemon_command() {
    let cli = Cli::try_parse_from(["aivis", "schedule", "daemon"]).unwrap();

    assert!(matches!(
        cli.command,
        Commands::Schedule {
            command: schedule::ScheduleCommands::Daemon
        }
    ));
}

#[test]
fn missing_subcommand_is_an_error() {
    assert!(Cli::try_parse_from(["aivis"]).is_err());
}
