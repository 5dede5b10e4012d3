use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use cellar::{
    CellOptions, Cellar, Change, Directory, FsFileStore, InMemorySecureRegister, JsonCodec,
    JsonFileRegister, PreferenceRegister, RegisterValue, Storage,
};
use colored::Colorize;
use serde_json::{json, Value};

use crate::cli::*;
use crate::config::CliConfig;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::load(&cli.root)?;
    let cellar = open_cellar(&cli.root, &config)?;
    let format = cli.format;
    match cli.command {
        Command::Pref(args) => cmd_pref(&cellar, args.action, format),
        Command::File(args) => cmd_file(&cellar, &config, args.action, format),
        Command::Toggle(args) => cmd_toggle(&cellar, &args.key, format),
        Command::Keys => cmd_keys(&cellar, format),
    }
}

fn open_cellar(root: &Path, config: &CliConfig) -> anyhow::Result<Cellar> {
    let register_path = config.register_path(root);
    let register = JsonFileRegister::open(register_path.clone())
        .with_context(|| format!("cannot open register {}", register_path.display()))?;
    let options = CellOptions {
        cache_value: config.cache_value,
        ..CellOptions::default()
    };
    Ok(Cellar::new(
        Arc::new(register),
        Arc::new(InMemorySecureRegister::new(config.service.clone())),
        Arc::new(FsFileStore::new(config.data_root(root))),
    )
    .with_options(options))
}

fn cmd_pref(cellar: &Cellar, action: PrefAction, format: OutputFormat) -> anyhow::Result<()> {
    match action {
        PrefAction::Get { key, raw: true, .. } => cmd_raw(cellar, &key, format),
        PrefAction::Get { key, default, raw: false } => {
            let cell = cellar.preference(key.as_str(), parse_default(default.as_deref())?);
            print_value(format, &key, &cell.read());
            Ok(())
        }
        PrefAction::Set { key, value } => {
            let cell = cellar.preference(key.as_str(), Value::Null);
            let stored = commit(&cell, Change::Store(parse_json(&value)?))?;
            print_stored(format, &key, &stored);
            Ok(())
        }
        PrefAction::Rm { key } => {
            let cell = cellar.preference(key.as_str(), Value::Null);
            commit(&cell, Change::Delete)?;
            print_removed(format, &key);
            Ok(())
        }
    }
}

fn cmd_file(
    cellar: &Cellar,
    config: &CliConfig,
    action: FileAction,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let cell = |filename: &str, dir: DirArg, default: Value| {
        let cell = cellar.file(filename, default).directory(Directory::from(dir));
        if config.pretty {
            cell.codec(JsonCodec::pretty())
        } else {
            cell
        }
    };
    match action {
        FileAction::Get { filename, dir, default } => {
            let cell = cell(&filename, dir, parse_default(default.as_deref())?);
            print_value(format, &filename, &cell.read());
        }
        FileAction::Set { filename, value, dir } => {
            let cell = cell(&filename, dir, Value::Null);
            let stored = commit(&cell, Change::Store(parse_json(&value)?))?;
            print_stored(format, &filename, &stored);
        }
        FileAction::Rm { filename, dir } => {
            commit(&cell(&filename, dir, Value::Null), Change::Delete)?;
            print_removed(format, &filename);
        }
    }
    Ok(())
}

fn cmd_toggle(cellar: &Cellar, key: &str, format: OutputFormat) -> anyhow::Result<()> {
    let cell = cellar.native_preference(key, false);
    let mut rx = cell.subscribe();
    cell.update(|on| *on = !*on);
    let on = rx
        .try_recv()
        .map_err(|_| anyhow!("toggle of {key} was not committed (rerun with -v for details)"))?;
    match format {
        OutputFormat::Text => {
            let state = if on { "on".green().bold() } else { "off".yellow().bold() };
            println!("{} is now {}", key.bold(), state);
        }
        OutputFormat::Json => println!("{}", json!({ "key": key, "value": on })),
    }
    Ok(())
}

fn cmd_keys(cellar: &Cellar, format: OutputFormat) -> anyhow::Result<()> {
    let keys = cellar.register().keys()?;
    match format {
        OutputFormat::Text if keys.is_empty() => println!("{}", "No preferences set.".dimmed()),
        OutputFormat::Text => {
            for key in &keys {
                println!("{key}");
            }
        }
        OutputFormat::Json => println!("{}", json!(keys)),
    }
    Ok(())
}

fn cmd_raw(cellar: &Cellar, key: &str, format: OutputFormat) -> anyhow::Result<()> {
    let entry = cellar.register().get(key)?;
    let (kind, rendered) = match &entry {
        Some(RegisterValue::Data(bytes)) => ("data", Value::String(hex::encode(bytes))),
        Some(other) => (other.kind(), serde_json::to_value(other)?),
        None => ("absent", Value::Null),
    };
    match format {
        OutputFormat::Text if entry.is_none() => {
            println!("{} = {}", key.bold(), "(not set)".dimmed())
        }
        OutputFormat::Text => {
            let tag = format!("[{kind}]");
            println!("{} = {} {}", key.bold(), rendered, tag.dimmed())
        }
        OutputFormat::Json => {
            println!("{}", json!({ "key": key, "kind": kind, "value": rendered }))
        }
    }
    Ok(())
}

/// Write through `cell` and wait for the commit notification.
///
/// A cell only notifies after a successful commit, so a missing
/// notification means the write was aborted and logged.
fn commit<S: Storage<Value>>(cell: &S, change: Change<Value>) -> anyhow::Result<Value> {
    let mut rx = cell.subscribe();
    cell.write(change);
    rx.try_recv().map_err(|_| {
        anyhow!("write to {} was not committed (rerun with -v for details)", cell.key())
    })
}

fn parse_json(text: &str) -> anyhow::Result<Value> {
    serde_json::from_str(text).with_context(|| format!("not a JSON value: {text}"))
}

fn parse_default(text: Option<&str>) -> anyhow::Result<Value> {
    text.map_or(Ok(Value::Null), parse_json)
}

fn print_value(format: OutputFormat, key: &str, value: &Value) {
    match format {
        OutputFormat::Text => println!("{} = {}", key.bold(), value),
        OutputFormat::Json => println!("{}", json!({ "key": key, "value": value })),
    }
}

fn print_stored(format: OutputFormat, key: &str, value: &Value) {
    match format {
        OutputFormat::Text => {
            println!("{} Stored {} = {}", "✓".green().bold(), key.bold(), value)
        }
        OutputFormat::Json => println!("{}", json!({ "key": key, "value": value, "stored": true })),
    }
}

fn print_removed(format: OutputFormat, key: &str) {
    match format {
        OutputFormat::Text => println!("{} Removed {}", "✓".green().bold(), key.bold()),
        OutputFormat::Json => println!("{}", json!({ "key": key, "removed": true })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn run(root: &Path, args: &[&str]) -> anyhow::Result<()> {
        let mut argv = vec!["cellar", "--root", root.to_str().unwrap()];
        argv.extend_from_slice(args);
        run_command(Cli::try_parse_from(argv).unwrap())
    }

    fn reopen(root: &Path) -> Cellar {
        open_cellar(root, &CliConfig::load(root).unwrap()).unwrap()
    }

    #[test]
    fn pref_set_get_rm() {
        let dir = tempfile::tempdir().unwrap();
        run(dir.path(), &["pref", "set", "theme", "\"dark\""]).unwrap();

        let cellar = reopen(dir.path());
        assert_eq!(cellar.preference("theme", Value::Null).read(), json!("dark"));
        assert!(dir.path().join("preferences.json").exists());

        run(dir.path(), &["pref", "get", "theme", "--raw"]).unwrap();
        run(dir.path(), &["pref", "rm", "theme"]).unwrap();
        assert!(reopen(dir.path()).register().keys().unwrap().is_empty());
    }

    #[test]
    fn pref_set_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(dir.path(), &["pref", "set", "theme", "dark"]).unwrap_err();
        assert!(err.to_string().contains("not a JSON value"));
    }

    #[test]
    fn toggle_flips_native_bool() {
        let dir = tempfile::tempdir().unwrap();
        run(dir.path(), &["toggle", "enabled"]).unwrap();
        let cellar = reopen(dir.path());
        assert_eq!(cellar.register().get("enabled").unwrap(), Some(RegisterValue::Bool(true)));

        run(dir.path(), &["--format", "json", "toggle", "enabled"]).unwrap();
        let cellar = reopen(dir.path());
        assert_eq!(cellar.register().get("enabled").unwrap(), Some(RegisterValue::Bool(false)));
    }

    #[test]
    fn file_commands_respect_directory_and_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cellar.toml"), "root = \"data\"\npretty = true\n").unwrap();

        run(dir.path(), &["file", "set", "state.json", "{\"n\":1}", "--dir", "caches"]).unwrap();
        let path = dir.path().join("data").join("caches").join("state.json");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\n  \"n\": 1\n}");

        run(dir.path(), &["file", "get", "state.json", "--dir", "caches"]).unwrap();
        run(dir.path(), &["file", "rm", "state.json", "--dir", "caches"]).unwrap();
        assert!(!path.exists());
        // Deleting a missing file still succeeds.
        run(dir.path(), &["file", "rm", "state.json", "--dir", "caches"]).unwrap();
    }

    #[test]
    fn keys_lists_register() {
        let dir = tempfile::tempdir().unwrap();
        run(dir.path(), &["keys"]).unwrap();
        run(dir.path(), &["pref", "set", "b", "1"]).unwrap();
        run(dir.path(), &["pref", "set", "a", "2"]).unwrap();
        assert_eq!(reopen(dir.path()).register().keys().unwrap(), vec!["a", "b"]);
        run(dir.path(), &["--format", "json", "keys"]).unwrap();
    }
}
