use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::session::report::TestReport;

/// Where a saved report ended up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedReport {
    pub json: PathBuf,
    pub text: PathBuf,
}

pub struct ReportStore {
    base_dir: PathBuf,
}

impl ReportStore {
    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("creating report directory {}", base_dir.display()))?;
        Ok(Self { base_dir })
    }

    fn write_atomic(path: &Path, content: &str) -> Result<()> {
        let tmp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Write the report as `report_<stamp>.json` plus a printable `.txt`.
    pub fn save(&self, report: &TestReport) -> Result<SavedReport> {
        let stem = format!("report_{}", report.timestamp.format("%Y-%m-%d_%H%M%S"));
        let json = self.base_dir.join(format!("{stem}.json"));
        let text = self.base_dir.join(format!("{stem}.txt"));

        Self::write_atomic(&json, &serde_json::to_string_pretty(report)?)?;
        Self::write_atomic(&text, &report.render_text())?;

        tracing::info!(path = %json.display(), "report saved");
        Ok(SavedReport { json, text })
    }

    /// Saved reports, oldest first. Unreadable files are skipped.
    pub fn load_all(&self) -> Result<Vec<TestReport>> {
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.base_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension().is_some_and(|ext| ext == "json")
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with("report_"))
            })
            .collect();
        paths.sort();

        let mut reports = Vec::new();
        for path in paths {
            let parsed = fs::read_to_string(&path)
                .ok()
                .and_then(|content| serde_json::from_str::<TestReport>(&content).ok());
            match parsed {
                Some(report) => reports.push(report),
                None => tracing::warn!(path = %path.display(), "skipping unreadable report"),
            }
        }
        Ok(reports)
    }
}

pub fn default_report_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("numberline")
        .join("reports")
}
