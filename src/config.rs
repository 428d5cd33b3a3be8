use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use ssvep_stimulus::{Session, SessionConfig};
use ssvep_vsync::SyncConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub title: String,
    /// Keep world units square: x spans the aspect ratio, y spans [-1, 1]
    pub constrain_aspect: bool,
    pub hide_cursor: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: "SSVEP".to_string(),
            constrain_aspect: true,
            hide_cursor: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub trigger_log: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            trigger_log: PathBuf::from("triggers.json"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub sync: SyncConfig,
    pub session: SessionConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Reads `path`, or writes the defaults there when it does not exist yet.
    /// A file that fails to parse falls back to defaults with a warning.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(cfg) => return cfg,
                    Err(err) => {
                        warn!(path = %path.display(), %err, "failed to parse config, using defaults");
                    }
                },
                Err(err) => {
                    warn!(path = %path.display(), %err, "failed to read config, using defaults");
                }
            }
            return Self::default();
        }

        let cfg = Self::default();
        match cfg.write(path) {
            Ok(()) => info!(path = %path.display(), "wrote default config"),
            Err(err) => warn!(path = %path.display(), err = %format!("{err:#}"), "failed to write default config"),
        }
        cfg
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let text = toml::to_string_pretty(self).context("serializing config")?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(path, text).with_context(|| format!("writing {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        self.sync.validate().context("invalid [sync] section")?;
        self.session.validate().context("invalid [session] section")?;
        Session::new(self.session.clone(), self.sync.clone())
            .context("[session] codes do not fit the [sync] protocol")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssvep_core::Color;
    use ssvep_stimulus::StimulusKind;
    use ssvep_vsync::SyncProtocol;

    fn unique_path(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!(
            "ssvep_config_test_{}_{}",
            name,
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        p
    }

    #[test]
    fn load_or_default_writes_defaults() {
        let path = unique_path("defaults.toml");
        let _ = fs::remove_file(&path);

        let cfg = Config::load_or_default(&path);
        assert!(path.exists(), "config file should be created");
        assert_eq!(cfg, Config::default());

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[session]"));
        assert!(contents.contains("protocol = \"binary\""));
        let reread: Config = toml::from_str(&contents).unwrap();
        assert_eq!(reread, cfg);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn load_or_default_reads_existing() {
        let path = unique_path("custom.toml");
        fs::write(
            &path,
            r#"
[display]
constrain_aspect = false

[sync]
protocol = "pulse-interval"
on_color = [1.0, 1.0, 0.0]

[sync.timing]
pulse_duration = 0.025

[session]
flash_rates = [12.0, 15.0]
codes = [4, 6]
stimulus = "contrast"
background = "black"

[output]
trigger_log = "out/log.json"
"#,
        )
        .unwrap();

        let cfg = Config::load_or_default(&path);
        assert!(!cfg.display.constrain_aspect);
        assert!(cfg.display.hide_cursor);
        assert_eq!(cfg.sync.protocol, SyncProtocol::PulseInterval);
        assert_eq!(cfg.sync.on_color, Color::YELLOW);
        assert_eq!(cfg.sync.timing.pulse_duration, 0.025);
        assert_eq!(cfg.session.flash_rates, vec![12.0, 15.0]);
        assert_eq!(cfg.session.stimulus, StimulusKind::Contrast);
        assert_eq!(cfg.session.background, Color::BLACK);
        assert_eq!(cfg.session.repetitions, 3);
        assert_eq!(cfg.output.trigger_log, PathBuf::from("out/log.json"));
        assert!(cfg.validate().is_ok());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn unparsable_file_falls_back_to_defaults() {
        let path = unique_path("broken.toml");
        fs::write(&path, "[session\nflash_rates = ").unwrap();
        assert_eq!(Config::load_or_default(&path), Config::default());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn validate_checks_codes_against_protocol() {
        let mut cfg = Config::default();
        cfg.sync.protocol = SyncProtocol::PulseInterval;
        assert!(cfg.validate().is_ok());
        cfg.session.flash_duration = 0.2;
        let err = cfg.validate().unwrap_err();
        assert!(format!("{err:#}").contains("flash_duration"));
    }

    #[test]
    fn validate_reports_section() {
        let mut cfg = Config::default();
        cfg.session.codes.pop();
        let err = cfg.validate().unwrap_err();
        assert!(format!("{err:#}").contains("[session]"));
    }
}
