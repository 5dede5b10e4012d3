use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Name of the optional configuration file inside the `--root` directory.
pub const CONFIG_FILE: &str = "cellar.toml";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Where the register document and files live, relative to `--root`.
    pub root: PathBuf,
    pub register_file: String,
    pub cache_value: bool,
    /// Pretty-print JSON written by `file set`.
    pub pretty: bool,
    pub service: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            register_file: cellar::REGISTER_FILE.into(),
            cache_value: false,
            pretty: false,
            service: "cellar".into(),
        }
    }
}

impl CliConfig {
    /// Read `{dir}/cellar.toml`, falling back to defaults when it is absent.
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        let path = dir.join(CONFIG_FILE);
        match fs::read_to_string(&path) {
            Ok(text) => toml::from_str(&text)
                .with_context(|| format!("invalid config {}", path.display())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("cannot read {}", path.display())),
        }
    }

    pub fn data_root(&self, dir: &Path) -> PathBuf {
        dir.join(&self.root)
    }

    pub fn register_path(&self, dir: &Path) -> PathBuf {
        self.data_root(dir).join(&self.register_file)
    }
}
