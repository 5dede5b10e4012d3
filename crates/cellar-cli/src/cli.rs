use std::path::PathBuf;

use cellar::Directory;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cellar",
    about = "Inspect and edit cellar preferences and files",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding cellar.toml, the register document and files
    #[arg(long, global = true, default_value = ".cellar")]
    pub root: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Read, write or delete a preference
    Pref(PrefArgs),
    /// Read, write or delete a value kept in its own file
    File(FileArgs),
    /// Flip a boolean preference and print the new value
    Toggle(ToggleArgs),
    /// List preference keys
    Keys,
}

#[derive(Args)]
pub struct PrefArgs {
    #[command(subcommand)]
    pub action: PrefAction,
}

#[derive(Subcommand)]
pub enum PrefAction {
    /// Print the value stored under a key
    Get {
        key: String,
        /// JSON value printed when nothing usable is stored
        #[arg(long)]
        default: Option<String>,
        /// Print the stored register entry instead of the decoded value
        #[arg(long)]
        raw: bool,
    },
    /// Store a JSON value under a key
    Set { key: String, value: String },
    /// Delete a key
    Rm { key: String },
}

#[derive(Args)]
pub struct FileArgs {
    #[command(subcommand)]
    pub action: FileAction,
}

#[derive(Subcommand)]
pub enum FileAction {
    /// Print the value stored in a file
    Get {
        filename: String,
        #[arg(long, default_value = "documents")]
        dir: DirArg,
        #[arg(long)]
        default: Option<String>,
    },
    /// Store a JSON value in a file
    Set {
        filename: String,
        value: String,
        #[arg(long, default_value = "documents")]
        dir: DirArg,
    },
    /// Delete a file
    Rm {
        filename: String,
        #[arg(long, default_value = "documents")]
        dir: DirArg,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum DirArg {
    Documents,
    Support,
    Caches,
    Temp,
}

impl From<DirArg> for Directory {
    fn from(dir: DirArg) -> Self {
        match dir {
            DirArg::Documents => Directory::Documents,
            DirArg::Support => Directory::ApplicationSupport,
            DirArg::Caches => Directory::Caches,
            DirArg::Temp => Directory::Temporary,
        }
    }
}

#[derive(Args)]
pub struct ToggleArgs {
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_pref_get() {
        let cli = Cli::try_parse_from([
            "cellar",
            "pref",
            "get",
            "theme",
            "--default",
            "\"light\"",
        ])
        .unwrap();
        assert_eq!(cli.root, PathBuf::from(".cellar"));
        let Command::Pref(PrefArgs {
            action: PrefAction::Get { key, default, raw },
        }) = cli.command
        else {
            panic!("wrong command");
        };
        assert_eq!(key, "theme");
        assert_eq!(default.as_deref(), Some("\"light\""));
        assert!(!raw);
    }

    #[test]
    fn parse_file_set_with_dir() {
        let cli = Cli::try_parse_from([
            "cellar",
            "file",
            "set",
            "state.json",
            "[1,2]",
            "--dir",
            "caches",
        ])
        .unwrap();
        let Command::File(FileArgs {
            action: FileAction::Set { filename, value, dir },
        }) = cli.command
        else {
            panic!("wrong command");
        };
        assert_eq!(filename, "state.json");
        assert_eq!(value, "[1,2]");
        assert_eq!(Directory::from(dir), Directory::Caches);
    }

    #[test]
    fn parse_globals_after_subcommand() {
        let cli = Cli::try_parse_from([
            "cellar", "keys", "--root", "/tmp/x", "-v", "--format", "json",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Keys));
        assert_eq!(cli.root, PathBuf::from("/tmp/x"));
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn unknown_dir_is_rejected() {
        let parsed = Cli::try_parse_from(["cellar", "file", "rm", "a.json", "--dir", "desktop"]);
        assert!(parsed.is_err());
    }
}
