use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::board::Board;
use crate::engine::operator::Operator;
use crate::store::report_store::default_report_dir;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_board")]
    pub board: String,
    #[serde(default = "default_operators")]
    pub practice_operators: Vec<Operator>,
    #[serde(default = "default_operators")]
    pub test_operators: Vec<Operator>,
    #[serde(default = "default_test_hints_allowed")]
    pub test_hints_allowed: bool,
    #[serde(default = "default_report_dir_string")]
    pub report_dir: String,
}

fn default_theme() -> String {
    "classroom".to_string()
}
fn default_board() -> String {
    Board::Line20.as_str().to_string()
}
fn default_operators() -> Vec<Operator> {
    vec![Operator::Add]
}
fn default_test_hints_allowed() -> bool {
    true
}
fn default_report_dir_string() -> String {
    default_report_dir().to_string_lossy().to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            board: default_board(),
            practice_operators: default_operators(),
            test_operators: default_operators(),
            test_hints_allowed: default_test_hints_allowed(),
            report_dir: default_report_dir_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.normalize();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("numberline")
            .join("config.toml")
    }

    pub fn board(&self) -> Board {
        Board::from_name(&self.board).unwrap_or(Board::Line20)
    }

    /// Repair values a hand-edited file may carry: unknown board names and
    /// empty or duplicated operator lists.
    pub fn normalize(&mut self) {
        if Board::from_name(&self.board).is_none() {
            self.board = default_board();
        }
        for ops in [&mut self.practice_operators, &mut self.test_operators] {
            ops.sort();
            ops.dedup();
            if ops.is_empty() {
                *ops = default_operators();
            }
        }
    }
}
