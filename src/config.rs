//! 런처 설정 파일 관리
//!
//! `config/launcher.toml`에서 업데이트 원본과 IPC 포트를 로드합니다.
//! 필드 단위로 관대하게 파싱하며, 없는 필드는 기본값을 사용합니다.
//!
//! ```toml
//! manifest_url = "https://raw.githubusercontent.com/Loggableim/ltth.app/main/version.json"
//! package_url_template = "https://ltth.app/app/ltth_{version}.zip"
//! require_checksum = false
//! backup_retention = 10
//! ipc_port = 57480
//! ```

use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

use ltth_updater_lib::UpdateSources;

/// 기본 IPC 포트
pub const DEFAULT_IPC_PORT: u16 = 57480;

const KNOWN_KEYS: &str =
    "manifest_url, package_url_template, require_checksum, backup_retention, ipc_port";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LauncherConfig {
    pub sources: UpdateSources,
    pub ipc_port: u16,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            sources: UpdateSources::default(),
            ipc_port: DEFAULT_IPC_PORT,
        }
    }
}

/// 설정 파일 경로 결정
pub fn config_file_path() -> PathBuf {
    // 1. 실행 파일 옆 config/launcher.toml
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let cfg = dir.join("config").join("launcher.toml");
            if cfg.exists() {
                return cfg;
            }
        }
    }

    // 2. 기본: CWD의 config/launcher.toml (생성용)
    PathBuf::from("config").join("launcher.toml")
}

/// 설정 로드 (없으면 기본값)
pub fn load_launcher_config() -> Result<LauncherConfig> {
    load_launcher_config_from(&config_file_path())
}

pub fn load_launcher_config_from(path: &Path) -> Result<LauncherConfig> {
    if !path.exists() {
        tracing::debug!("[Config] {} not found, using defaults", path.display());
        return Ok(LauncherConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let parsed: toml::Value = content.parse()?;
    tracing::info!("[Config] Loaded {}", path.display());
    Ok(parse_config(&parsed))
}

pub fn parse_config(val: &toml::Value) -> LauncherConfig {
    let mut cfg = LauncherConfig::default();
    if let Some(v) = val.get("manifest_url").and_then(|v| v.as_str()) {
        cfg.sources.manifest_url = v.to_string();
    }
    if let Some(v) = val.get("package_url_template").and_then(|v| v.as_str()) {
        if v.contains("{version}") {
            cfg.sources.package_url_template = v.to_string();
        } else {
            tracing::warn!("[Config] package_url_template lacks {{version}}, ignoring '{}'", v);
        }
    }
    if let Some(v) = val.get("require_checksum").and_then(|v| v.as_bool()) {
        cfg.sources.require_checksum = v;
    }
    if let Some(v) = val.get("backup_retention").and_then(|v| v.as_integer()) {
        if v >= 0 {
            cfg.sources.backup_retention = v as usize;
        }
    }
    if let Some(v) = val.get("ipc_port").and_then(|v| v.as_integer()) {
        match u16::try_from(v) {
            Ok(port) if port != 0 => cfg.ipc_port = port,
            _ => tracing::warn!("[Config] ipc_port {} out of range, using {}", v, DEFAULT_IPC_PORT),
        }
    }
    cfg
}

/// config set <key> <value>
pub fn set_config_value(key: &str, value: &str) -> Result<PathBuf> {
    let path = config_file_path();
    set_config_value_at(&path, key, value)?;
    Ok(path)
}

pub fn set_config_value_at(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut table: toml::value::Table = if path.exists() {
        let content = std::fs::read_to_string(path)?;
        content
            .parse::<toml::Value>()?
            .as_table()
            .cloned()
            .unwrap_or_default()
    } else {
        toml::value::Table::new()
    };

    let toml_val: toml::Value = match key {
        "require_checksum" => toml::Value::Boolean(value.parse::<bool>().map_err(|_| {
            anyhow::anyhow!("Invalid boolean value: '{}' (use true/false)", value)
        })?),
        "backup_retention" => {
            let n = value
                .parse::<u32>()
                .map_err(|_| anyhow::anyhow!("Invalid non-negative integer: '{}'", value))?;
            toml::Value::Integer(i64::from(n))
        }
        "ipc_port" => {
            let port = value
                .parse::<u16>()
                .ok()
                .filter(|p| *p != 0)
                .ok_or_else(|| anyhow::anyhow!("Invalid port: '{}' (1-65535)", value))?;
            toml::Value::Integer(i64::from(port))
        }
        "package_url_template" => {
            if !value.contains("{version}") {
                anyhow::bail!("package_url_template must contain a {{version}} placeholder");
            }
            toml::Value::String(value.to_string())
        }
        "manifest_url" => toml::Value::String(value.to_string()),
        _ => {
            anyhow::bail!("Unknown config key: '{}'\nAvailable: {}", key, KNOWN_KEYS);
        }
    };

    table.insert(key.to_string(), toml_val);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let content = toml::to_string_pretty(&toml::Value::Table(table))?;
    std::fs::write(path, content)?;

    tracing::info!("[Config] {} = {} ({})", key, value, path.display());
    Ok(())
}
