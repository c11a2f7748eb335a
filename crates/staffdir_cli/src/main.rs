//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `staffdir_core` linkage, configuration, logging and store access.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `staffdir [config.toml]`

use staffdir_core::{init_logging_from, open_db, Config, SqliteStaffRepository, StaffRepository};
use std::error::Error;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("staffdir_core ping={}", staffdir_core::ping());
    println!("staffdir_core version={}", staffdir_core::core_version());

    let config_path = std::env::args().nth(1);
    match probe_store(config_path.as_deref().map(Path::new)) {
        Ok((db_path, records)) => {
            println!("staffdir db={db_path} records={records}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("staffdir probe failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn probe_store(config_path: Option<&Path>) -> Result<(String, usize), Box<dyn Error>> {
    let config = Config::load(config_path)?;
    if let Err(err) = init_logging_from(&config) {
        eprintln!("staffdir logging disabled: {err}");
    }
    let db_path = config.database_path();
    let conn = open_db(&db_path)?;
    let repo = SqliteStaffRepository::try_new(&conn)?;
    let records = repo.list_staff()?.len();
    Ok((db_path.display().to_string(), records))
}
