use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;

const SETTINGS_FILE: &str = "relocate.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TransferSettings {
    /// Upper bound for a single associate or disassociate call. `None` waits
    /// for the relationship service indefinitely.
    #[serde(default)]
    pub step_timeout_ms: Option<u64>,
}

impl TransferSettings {
    pub fn step_timeout(&self) -> Option<Duration> {
        self.step_timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

pub fn load_settings() -> TransferSettings {
    let mut settings = TransferSettings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        if let Ok(file_cfg) = toml::from_str::<TransferSettings>(&raw) {
            settings = file_cfg;
        }
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

pub fn load_settings_from(path: &Path) -> anyhow::Result<TransferSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))
}

pub fn apply_env_overrides<F>(settings: &mut TransferSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    for key in ["RELOCATE_STEP_TIMEOUT_MS", "APP__STEP_TIMEOUT_MS"] {
        if let Some(v) = lookup(key) {
            if let Ok(parsed) = v.trim().parse::<u64>() {
                settings.step_timeout_ms = Some(parsed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    #[test]
    fn defaults_to_no_step_timeout() {
        assert_eq!(TransferSettings::default().step_timeout(), None);
    }

    #[test]
    fn zero_timeout_disables_the_bound() {
        let settings = TransferSettings {
            step_timeout_ms: Some(0),
        };
        assert_eq!(settings.step_timeout(), None);
    }

    #[test]
    fn app_prefixed_env_wins_over_plain_env() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("RELOCATE_STEP_TIMEOUT_MS", "500"),
            ("APP__STEP_TIMEOUT_MS", "750"),
        ]);
        let mut settings = TransferSettings::default();
        apply_env_overrides(&mut settings, |key| env.get(key).map(|v| v.to_string()));
        assert_eq!(settings.step_timeout(), Some(Duration::from_millis(750)));
    }

    #[test]
    fn ignores_unparseable_env_values() {
        let mut settings = TransferSettings {
            step_timeout_ms: Some(100),
        };
        apply_env_overrides(&mut settings, |key| {
            (key == "RELOCATE_STEP_TIMEOUT_MS").then(|| "soon".to_string())
        });
        assert_eq!(settings.step_timeout_ms, Some(100));
    }

    #[test]
    fn reads_timeout_from_settings_file() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let temp_root = env::temp_dir().join(format!("relocate_settings_test_{suffix}"));
        fs::create_dir_all(&temp_root).expect("temp root");
        let path = temp_root.join(SETTINGS_FILE);
        fs::write(&path, "step_timeout_ms = 2500\n").expect("write settings");

        let settings = load_settings_from(&path).expect("load settings");
        assert_eq!(settings.step_timeout(), Some(Duration::from_millis(2500)));

        fs::remove_dir_all(temp_root).expect("cleanup");
    }

    #[test]
    fn missing_settings_file_is_reported() {
        let err = load_settings_from(Path::new("/nonexistent/relocate.toml"))
            .expect_err("missing file");
        assert!(err.to_string().contains("failed to read settings file"));
    }
}
