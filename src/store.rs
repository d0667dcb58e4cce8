use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use tracing::warn;

use crate::Result;
use crate::models::{HISTORY_HEADER, HistoryRecord, MonitorState, MonitorTarget};

/// Per-target files under one output directory: `state_<key>.json` holds the
/// last observed price, `history_<key>.csv` is the append-only audit log.
#[derive(Debug, Clone)]
pub struct TargetStore {
    out_dir: PathBuf,
}

impl TargetStore {
    pub fn new(out_dir: impl Into<PathBuf>) -> Result<Self> {
        let out_dir = out_dir.into();
        fs::create_dir_all(&out_dir)?;
        Ok(TargetStore { out_dir })
    }

    pub fn state_path(&self, target: &MonitorTarget) -> PathBuf {
        self.out_dir.join(format!("state_{}.json", target.key()))
    }

    pub fn history_path(&self, target: &MonitorTarget) -> PathBuf {
        self.out_dir.join(format!("history_{}.csv", target.key()))
    }

    /// Load the prior state for a target. A missing file is a first run; an
    /// unreadable file is treated the same way rather than aborting a check.
    pub fn load_state(&self, target: &MonitorTarget) -> Option<MonitorState> {
        let path = self.state_path(target);
        if !path.exists() {
            return None;
        }
        match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(state) => Some(state),
                Err(error) => {
                    warn!(path = %path.display(), %error, "discarding unreadable state file");
                    None
                }
            },
            Err(error) => {
                warn!(path = %path.display(), %error, "failed to read state file");
                None
            }
        }
    }

    pub fn save_state(&self, target: &MonitorTarget, state: &MonitorState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;
        fs::write(self.state_path(target), json)?;
        Ok(())
    }

    /// Append one history row, writing the header when the file is new.
    pub fn append_history(&self, target: &MonitorTarget, record: &HistoryRecord) -> Result<()> {
        let path = self.history_path(target);
        let new_file = !path.exists();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = csv::Writer::from_writer(file);
        if new_file {
            writer.write_record(HISTORY_HEADER)?;
        }
        writer.write_record(record.csv_row())?;
        writer.flush()?;
        Ok(())
    }
}
