use crate::error::{Error, Result};
use crate::path::expand_tilde;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum A11yBackend {
    #[default]
    Uia,
    Win32,
}

impl A11yBackend {
    /// The `backend` query value `GuestClient::accessibility_tree` expects.
    pub fn wire_tag(self) -> &'static str {
        match self {
            A11yBackend::Uia => "uia",
            A11yBackend::Win32 => "win32",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SomOrigin {
    #[default]
    Oss,
    A11y,
    MixedOss,
    Omni,
    MixedOmni,
}

impl SomOrigin {
    /// Whether OBSERVE needs the accessibility tree for this set-of-marks
    /// origin (§4.4): `a11y` and the two `mixed-*` origins parse it directly,
    /// `oss`/`omni` never touch it.
    pub fn requires_a11y_tree(self) -> bool {
        matches!(self, SomOrigin::A11y | SomOrigin::MixedOss | SomOrigin::MixedOmni)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiffLevel {
    #[default]
    Normal,
    Hard,
}

/// Per-run configuration, loaded from TOML and overridable field-by-field by
/// CLI flags (§10.3): `max_steps`, timing budgets, the a11y backend, the
/// set-of-marks origin, screen geometry, and the guest/emulator endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub max_steps: u32,
    pub sleep_after_execution_secs: f64,
    pub wait_pause_secs: f64,
    pub time_limit_secs: u64,
    pub a11y_backend: A11yBackend,
    pub som_origin: SomOrigin,
    pub screen_width: u32,
    pub screen_height: u32,
    pub emulator_ip: String,
    pub guest_port: u16,
    pub diff_lvl: DiffLevel,
    pub probe_poll_interval_secs: u64,
    pub probe_poll_attempts: u32,
    pub observation_retry_attempts: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            max_steps: 15,
            sleep_after_execution_secs: 3.0,
            wait_pause_secs: 0.5,
            time_limit_secs: 18_000,
            a11y_backend: A11yBackend::default(),
            som_origin: SomOrigin::default(),
            screen_width: 1920,
            screen_height: 1080,
            emulator_ip: "20.20.20.21".to_string(),
            guest_port: 5000,
            diff_lvl: DiffLevel::default(),
            probe_poll_interval_secs: 5,
            probe_poll_attempts: 20,
            observation_retry_attempts: 3,
        }
    }
}

impl Settings {
    /// Resolve and load settings the way `agtrace-runtime::Config` does:
    /// explicit path, then `DESKARENA_CONFIG`, then XDG config dir, falling
    /// back to defaults when nothing is found -- never an error just for a
    /// missing file.
    pub fn load(explicit_path: Option<&str>) -> Result<Self> {
        let path = Self::resolve_path(explicit_path)?;
        match path {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn resolve_path(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit_path {
            return Ok(Some(expand_tilde(path)));
        }
        if let Ok(env_path) = std::env::var("DESKARENA_CONFIG") {
            return Ok(Some(expand_tilde(&env_path)));
        }
        if let Some(config_dir) = dirs::config_dir() {
            let candidate = config_dir.join("deskarena").join("config.toml");
            if candidate.exists() {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn som_origin_a11y_requirement_matches_spec() {
        assert!(SomOrigin::A11y.requires_a11y_tree());
        assert!(SomOrigin::MixedOss.requires_a11y_tree());
        assert!(SomOrigin::MixedOmni.requires_a11y_tree());
        assert!(!SomOrigin::Oss.requires_a11y_tree());
        assert!(!SomOrigin::Omni.requires_a11y_tree());
    }

    #[test]
    fn defaults_match_spec_values() {
        let settings = Settings::default();
        assert_eq!(settings.max_steps, 15);
        assert_eq!(settings.sleep_after_execution_secs, 3.0);
        assert_eq!(settings.wait_pause_secs, 0.5);
        assert_eq!(settings.probe_poll_attempts, 20);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let settings = Settings::load_from(&missing).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn roundtrip_through_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut settings = Settings::default();
        settings.max_steps = 50;
        settings.a11y_backend = A11yBackend::Win32;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.max_steps, 50);
        assert_eq!(loaded.a11y_backend, A11yBackend::Win32);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults_for_missing_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_steps = 7\n").unwrap();
        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.max_steps, 7);
        assert_eq!(loaded.screen_width, Settings::default().screen_width);
    }
}
