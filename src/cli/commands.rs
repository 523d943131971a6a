//! CLI command implementations
//!
//! Both commands share one boot sequence: load config, then connect storage.
//! Nothing binds or writes until storage is connected.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde_json::{json, Value};

use crate::catalog::Lesson;
use crate::http_server::{AppState, HttpServer};
use crate::observability::{log_event, log_event_with_fields, Event};
use crate::storage::{connect, StorageHandle};

use super::args::{Cli, Command};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::write_json;

/// Main CLI entry point
///
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(&config, port),
        Command::Seed { config, file } => seed(&config, &file),
    }
}

/// Boot and serve the HTTP API until shutdown.
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let mut config = load_config(config_path)?;
    if let Some(port) = port {
        config.http.port = port;
        config.validate()?;
    }

    let rt = runtime()?;
    rt.block_on(async {
        let storage = boot_storage(&config).await?;
        let state =
            AppState::new(storage).with_reject_unmatched_updates(config.reject_unmatched_updates);

        HttpServer::new(config.http.clone(), state)
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Insert every lesson in `file` and print `{"seeded": n}`.
pub fn seed(config_path: &Path, file: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let lessons = read_lessons(file)?;

    let rt = runtime()?;
    let seeded = rt.block_on(async {
        let storage = boot_storage(&config).await?;
        seed_lessons(&storage, lessons).await
    })?;

    log_event_with_fields(
        Event::SeedComplete,
        &[
            ("file", &file.display().to_string()),
            ("seeded", &seeded.to_string()),
        ],
    );
    write_json(&json!({ "seeded": seeded }))
}

/// Store validated lessons; returns how many were inserted.
///
/// Supplied `_id`s are checked against each other and against stored lessons
/// first, so a conflicting batch stores nothing.
pub async fn seed_lessons(storage: &StorageHandle, lessons: Vec<Lesson>) -> CliResult<usize> {
    let mut seen = HashSet::new();
    for id in lessons.iter().filter_map(|lesson| lesson.id) {
        if !seen.insert(id) {
            return Err(CliError::seed_failed(format!("duplicate lesson _id {}", id)));
        }
        let existing = storage
            .lessons()
            .find_by_id(id)
            .await
            .map_err(|e| CliError::seed_failed(e.to_string()))?;
        if existing.is_some() {
            return Err(CliError::seed_failed(format!("lesson {} already exists", id)));
        }
    }

    let documents = lessons
        .into_iter()
        .map(Lesson::into_document)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| CliError::seed_failed(e.to_string()))?;

    let ids = storage
        .lessons()
        .insert_many(documents)
        .await
        .map_err(|e| CliError::seed_failed(e.to_string()))?;
    Ok(ids.len())
}

/// Parse and validate every lesson in a seed file.
pub fn read_lessons(file: &Path) -> CliResult<Vec<Lesson>> {
    let content = fs::read_to_string(file).map_err(|e| {
        CliError::io_error(format!("Failed to read {}: {}", file.display(), e))
    })?;

    let value: Value = serde_json::from_str(&content)
        .map_err(|e| CliError::seed_failed(format!("Invalid seed JSON: {}", e)))?;

    let Value::Array(items) = value else {
        return Err(CliError::seed_failed("Seed file must hold a JSON array of lessons"));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            Lesson::from_value(item)
                .map_err(|e| CliError::seed_failed(format!("lesson {}: {}", i, e)))
        })
        .collect()
}

fn load_config(config_path: &Path) -> CliResult<Config> {
    log_event(Event::BootStart);
    let config = Config::load(config_path)?;
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("config", &config_path.display().to_string()),
            ("database", &config.database),
            ("storage_uri", &config.storage_uri),
        ],
    );
    Ok(config)
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))
}

async fn boot_storage(config: &Config) -> CliResult<StorageHandle> {
    match connect(&config.storage_uri, &config.database).await {
        Ok(storage) => {
            log_event_with_fields(
                Event::StorageConnected,
                &[
                    ("backend", storage.backend_kind()),
                    ("database", storage.database()),
                ],
            );
            Ok(storage)
        }
        Err(e) => {
            log_event_with_fields(
                Event::StorageConnectFailed,
                &[("code", e.code().code()), ("error", &e.to_string())],
            );
            Err(CliError::boot_failed(format!("Storage connect failed: {}", e)))
        }
    }
}
