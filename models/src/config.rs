// models/src/config.rs
use serde::{Deserialize, Serialize};
use serde_yaml2 as serde_yaml;
use std::path::Path;

use crate::errors::{HospitalError, HospitalResult};

fn default_horizon_days() -> i64 {
    180
}

fn default_low_stock_threshold() -> u32 {
    50
}

fn default_audit_page_size() -> usize {
    200
}

fn default_max_prescription_days() -> u32 {
    365
}

/// Business-policy knobs. All have defaults; a deployment may override them
/// from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Appointments may not be scheduled further ahead than this.
    #[serde(default = "default_horizon_days")]
    pub scheduling_horizon_days: i64,
    /// Stock below this counts as a dashboard alert.
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: u32,
    /// Newest-first page returned by the audit log read.
    #[serde(default = "default_audit_page_size")]
    pub audit_page_size: usize,
    /// Upper bound on prescription duration.
    #[serde(default = "default_max_prescription_days")]
    pub max_prescription_days: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        CoreConfig {
            scheduling_horizon_days: default_horizon_days(),
            low_stock_threshold: default_low_stock_threshold(),
            audit_page_size: default_audit_page_size(),
            max_prescription_days: default_max_prescription_days(),
        }
    }
}

impl CoreConfig {
    /// Loads from YAML, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> HospitalResult<Self> {
        if !path.exists() {
            return Ok(CoreConfig::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|_| HospitalError::validation("unreadable config file"))?;
        serde_yaml::from_str(&content)
            .map_err(|e| HospitalError::validation(format!("invalid config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::CoreConfig;
    use std::path::Path;

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = CoreConfig::load(Path::new("/nonexistent/core.yaml")).unwrap();
        assert_eq!(cfg.scheduling_horizon_days, 180);
        assert_eq!(cfg.low_stock_threshold, 50);
        assert_eq!(cfg.audit_page_size, 200);
        assert_eq!(cfg.max_prescription_days, 365);
    }
}
