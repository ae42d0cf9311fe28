//! Where finished battles go

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use seer_battle::BattleEngine;

/// Receives every battle once it is over
pub trait BattleSink: Send {
    fn store(&mut self, engine: &BattleEngine) -> Result<()>;
}

/// Discards everything
#[derive(Debug, Default)]
pub struct NullSink;

impl BattleSink for NullSink {
    fn store(&mut self, _engine: &BattleEngine) -> Result<()> {
        Ok(())
    }
}

/// Writes `{root}/{format}/{battle_id}.log` and `.json`
#[derive(Debug, Clone)]
pub struct FileSink {
    root: PathBuf,
    format: String,
    save_logs: bool,
    save_json: bool,
}

impl FileSink {
    pub fn new(root: impl Into<PathBuf>, format: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            format: format.into(),
            save_logs: true,
            save_json: true,
        }
    }

    pub fn with_logs(mut self, enabled: bool) -> Self {
        self.save_logs = enabled;
        self
    }

    pub fn with_json(mut self, enabled: bool) -> Self {
        self.save_json = enabled;
        self
    }

    fn directory(&self) -> PathBuf {
        self.root.join(&self.format)
    }
}

impl BattleSink for FileSink {
    fn store(&mut self, engine: &BattleEngine) -> Result<()> {
        if !self.save_logs && !self.save_json {
            return Ok(());
        }

        let directory = self.directory();
        fs::create_dir_all(&directory)
            .with_context(|| format!("Failed to create {}", directory.display()))?;

        if self.save_logs {
            let path = directory.join(format!("{}.log", engine.battle_id()));
            let mut text = engine.log().join("\n");
            text.push('\n');
            fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        }

        if self.save_json {
            if let Some(record) = engine.record() {
                let path = directory.join(format!("{}.json", engine.battle_id()));
                let json = serde_json::to_string(record).context("Failed to serialize battle")?;
                fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
        }

        Ok(())
    }
}
