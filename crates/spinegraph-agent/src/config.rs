use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use spinegraph_core::ambient::AmbientParams;
use spinegraph_core::spatial::DEFAULT_TOLERANCE;
use spinegraph_core::{LayoutParams, StrategyKind};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_TICK_HZ: u32 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub data: Option<PathBuf>,
    pub guide: Option<PathBuf>,
    pub socket: Option<String>,
    pub config: Option<PathBuf>,
    pub strategy: Option<StrategyKind>,
    pub tick_hz: u32,
    /// Write the effective layout config and exit.
    pub init_config: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            data: None,
            guide: None,
            socket: None,
            config: None,
            strategy: None,
            tick_hz: DEFAULT_TICK_HZ,
            init_config: false,
        }
    }
}

pub fn parse_args() -> Result<AgentConfig> {
    parse_args_from(std::env::args_os().skip(1))
}

fn parse_args_from<I>(args: I) -> Result<AgentConfig>
where
    I: IntoIterator<Item = OsString>,
{
    let mut config = AgentConfig::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if arg == "--data" {
            let Some(path) = args.next() else {
                anyhow::bail!("--data expects a path");
            };
            config.data = Some(PathBuf::from(path));
        } else if arg == "--guide" {
            let Some(path) = args.next() else {
                anyhow::bail!("--guide expects a path");
            };
            config.guide = Some(PathBuf::from(path));
        } else if arg == "--socket" {
            let Some(path) = args.next() else {
                anyhow::bail!("--socket expects a path");
            };
            config.socket = Some(path.to_string_lossy().into_owned());
        } else if arg == "--config" {
            let Some(path) = args.next() else {
                anyhow::bail!("--config expects a path");
            };
            config.config = Some(PathBuf::from(path));
        } else if arg == "--strategy" {
            let Some(value) = args.next() else {
                anyhow::bail!("--strategy expects helix|golden");
            };
            let value = value.to_string_lossy();
            let Some(kind) = StrategyKind::parse(&value) else {
                anyhow::bail!("invalid strategy: {value} (expected helix|golden)");
            };
            config.strategy = Some(kind);
        } else if arg == "--tick-hz" {
            let Some(value) = args.next() else {
                anyhow::bail!("--tick-hz expects a number");
            };
            let value = value.to_string_lossy();
            let hz: u32 = value
                .parse()
                .with_context(|| format!("invalid --tick-hz: {value}"))?;
            if hz == 0 {
                anyhow::bail!("--tick-hz must be at least 1");
            }
            config.tick_hz = hz;
        } else if arg == "--init-config" {
            config.init_config = true;
        } else {
            anyhow::bail!("unknown argument: {:?}", arg);
        }
    }

    Ok(config)
}

/// Tuning read from `layout.toml`. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub pick_tolerance: f32,
    pub layout: LayoutParams,
    pub ambient: AmbientParams,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            pick_tolerance: DEFAULT_TOLERANCE,
            layout: LayoutParams::default(),
            ambient: AmbientParams::default(),
        }
    }
}

fn config_file_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "spinegraph")?;
    Some(proj.config_dir().join("layout.toml"))
}

/// Explicit path first, then the per-user config dir, then defaults.
pub fn load_or_default(explicit: Option<&Path>) -> LayoutConfig {
    if let Some(path) = explicit {
        return load_or_default_from_path(path);
    }
    let Some(path) = config_file_path() else {
        return LayoutConfig::default();
    };
    load_or_default_from_path(&path)
}

fn load_or_default_from_path(path: &Path) -> LayoutConfig {
    let Ok(contents) = fs::read_to_string(path) else {
        return LayoutConfig::default();
    };
    toml::from_str(&contents).unwrap_or_else(|err| {
        tracing::warn!(path = %path.display(), error = %err, "invalid layout config, using defaults");
        LayoutConfig::default()
    })
}

/// Writes to `explicit` or the per-user config dir; returns the path used.
pub fn save(cfg: &LayoutConfig, explicit: Option<&Path>) -> Result<PathBuf> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => config_file_path().ok_or_else(|| anyhow::anyhow!("no config directory available"))?,
    };
    save_to_path(cfg, &path)?;
    Ok(path)
}

fn save_to_path(cfg: &LayoutConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    let data = toml::to_string_pretty(cfg).context("failed to serialize layout config")?;
    fs::write(path, data)
        .with_context(|| format!("failed to write layout config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use tempfile::tempdir;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    #[test]
    fn parses_all_flags() {
        let config = parse_args_from(args(&[
            "--data",
            "scenes.csv",
            "--guide",
            "spine.toml",
            "--socket",
            "/tmp/x.sock",
            "--strategy",
            "golden",
            "--tick-hz",
            "60",
            "--init-config",
        ]))
        .expect("config parsed");
        assert_eq!(config.data, Some(PathBuf::from("scenes.csv")));
        assert_eq!(config.guide, Some(PathBuf::from("spine.toml")));
        assert_eq!(config.socket.as_deref(), Some("/tmp/x.sock"));
        assert_eq!(config.strategy, Some(StrategyKind::GoldenAngle));
        assert_eq!(config.tick_hz, 60);
        assert!(config.init_config);
    }

    #[test]
    fn defaults_without_flags() {
        let config = parse_args_from(Vec::new()).expect("config parsed");
        assert_eq!(config, AgentConfig::default());
        assert_eq!(config.tick_hz, 30);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_args_from(args(&["--strategy", "spiral"])).is_err());
        assert!(parse_args_from(args(&["--tick-hz", "0"])).is_err());
        assert!(parse_args_from(args(&["--data"])).is_err());
        assert!(parse_args_from(args(&["--verbose"])).is_err());
    }

    #[test]
    fn layout_config_roundtrip_save_load() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("layout.toml");
        let mut cfg = LayoutConfig::default();
        cfg.layout.strategy = StrategyKind::GoldenAngle;
        cfg.ambient.count = 600;

        save_to_path(&cfg, &path).expect("save config");
        let loaded = load_or_default_from_path(&path);

        assert_eq!(cfg, loaded);
    }

    #[test]
    fn partial_and_invalid_files() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("layout.toml");

        fs::write(&path, "pick_tolerance = 0.3\n[layout.helix]\nradial_base = 2.0\n").unwrap();
        let cfg = load_or_default(Some(&path));
        assert_eq!(cfg.pick_tolerance, 0.3);
        assert_eq!(cfg.layout.helix.radial_base, 2.0);
        assert_eq!(cfg.layout.helix.jitter_freq, 0.75);

        fs::write(&path, "pick_tolerance = \"wide\"").unwrap();
        assert_eq!(load_or_default(Some(&path)), LayoutConfig::default());
    }
}
