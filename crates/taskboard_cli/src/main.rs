//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `taskboard_core` linkage and configuration loading.
//! - Open the configured store and report the schema version.
//!
//! Usage: `taskboard_cli [config.toml]`

use log::error;
use std::process::ExitCode;
use taskboard_core::db::migrations::latest_version;
use taskboard_core::db::{open_db, open_db_in_memory};
use taskboard_core::{init_logging_from_config, AppConfig};

fn main() -> ExitCode {
    println!("taskboard_core ping={}", taskboard_core::ping());
    println!("taskboard_core version={}", taskboard_core::core_version());

    let config = match std::env::args().nth(1) {
        Some(path) => match AppConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("taskboard: {err}");
                return ExitCode::from(2);
            }
        },
        None => {
            let mut config = AppConfig::default();
            config.apply_env_overrides();
            if let Err(err) = config.validate() {
                eprintln!("taskboard: {err}");
                return ExitCode::from(2);
            }
            config
        }
    };

    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("taskboard: logging disabled: {err}");
    }

    let opened = match config.db_path.as_deref() {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    };
    if let Err(err) = opened {
        error!("event=cli_probe module=cli status=error error={err}");
        eprintln!("taskboard: {err}");
        return ExitCode::from(4);
    }

    println!("taskboard schema_version={}", latest_version());
    println!("taskboard share_base={}", config.share_url("<id>"));
    ExitCode::SUCCESS
}
