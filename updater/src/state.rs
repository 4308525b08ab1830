//! 설치 상태 영속화
//!
//! 상태 파일(`config.json`)은 런처의 유일한 "활성 버전" 정보원입니다.
//! 파일이 없으면 기본값을 기록하고, 손상되었으면 기본값으로 시작합니다 (시작 실패 없음).
//! 쓰기는 임시 파일에 기록한 뒤 rename 하므로 파일은 항상 이전 또는 새 내용 중 하나입니다.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Result, UpdaterError};

/// `previousVersions` 최대 길이
pub const HISTORY_LIMIT: usize = 5;

/// 영속화되는 런처 상태
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstallationState {
    pub install_path: String,
    pub config_path: String,
    pub auto_update: bool,
    pub language: String,
    pub is_first_run: bool,
    /// 활성 버전 (빈 문자열 = 설치 없음)
    pub last_version: String,
    /// 이전 활성 버전들, 가장 최근이 마지막
    pub previous_versions: Vec<String>,
}

impl Default for InstallationState {
    fn default() -> Self {
        Self {
            install_path: String::new(),
            config_path: String::new(),
            auto_update: true,
            language: "de".to_string(),
            is_first_run: true,
            last_version: String::new(),
            previous_versions: Vec::new(),
        }
    }
}

impl InstallationState {
    /// 이력 끝에 버전을 추가하고 가장 오래된 항목부터 잘라낸다
    pub fn push_history(&mut self, version: String) {
        self.previous_versions.push(version);
        if self.previous_versions.len() > HISTORY_LIMIT {
            let excess = self.previous_versions.len() - HISTORY_LIMIT;
            self.previous_versions.drain(..excess);
        }
    }

    pub fn has_install_paths(&self) -> bool {
        !self.install_path.trim().is_empty() && !self.config_path.trim().is_empty()
    }
}

/// 부분 업데이트. 인식하는 필드만 이름과 타입이 정해져 있으며 나머지 키는 무시된다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_update: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_first_run: Option<bool>,
}

impl ConfigPatch {
    pub fn is_empty(&self) -> bool {
        self == &ConfigPatch::default()
    }

    /// 변경된 필드 이름 목록을 반환한다
    pub fn apply(&self, state: &mut InstallationState) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if let Some(v) = &self.install_path {
            state.install_path = v.clone();
            changed.push("installPath");
        }
        if let Some(v) = &self.config_path {
            state.config_path = v.clone();
            changed.push("configPath");
        }
        if let Some(v) = self.auto_update {
            state.auto_update = v;
            changed.push("autoUpdate");
        }
        if let Some(v) = &self.language {
            state.language = v.clone();
            changed.push("language");
        }
        if let Some(v) = self.is_first_run {
            state.is_first_run = v;
            changed.push("isFirstRun");
        }
        changed
    }
}

/// 상태 파일 저장소
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 상태 로드. 없으면 기본값을 기록해서 반환, 손상되었으면 기본값 반환.
    pub fn load(&self) -> InstallationState {
        match fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str::<InstallationState>(&content) {
                Ok(state) => {
                    tracing::debug!("[State] Loaded {}", self.path.display());
                    state
                }
                Err(e) => {
                    tracing::warn!(
                        "[State] {} is corrupt ({}), starting with defaults",
                        self.path.display(),
                        e
                    );
                    InstallationState::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let state = InstallationState::default();
                if let Err(e) = self.save(&state) {
                    tracing::warn!("[State] Could not write default state: {}", e);
                }
                state
            }
            Err(e) => {
                tracing::warn!("[State] Cannot read {}: {}, using defaults", self.path.display(), e);
                InstallationState::default()
            }
        }
    }

    /// 상태를 동기적으로 기록한다. 반환 전에 디스크까지 반영된다.
    pub fn save(&self, state: &InstallationState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| UpdaterError::io("create state directory", parent, e))?;
            }
        }

        let json = serde_json::to_string_pretty(state)
            .map_err(|e| UpdaterError::io("serialize state", &self.path, e.into()))?;

        let tmp = self.path.with_extension("json.tmp");
        let write_tmp = || -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()
        };
        if let Err(e) = write_tmp() {
            let _ = fs::remove_file(&tmp);
            return Err(UpdaterError::io("write state", &tmp, e));
        }
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(UpdaterError::io("replace state", &self.path, e));
        }

        tracing::debug!("[State] Saved {}", self.path.display());
        Ok(())
    }
}
