//! 셸 경계 연산
//!
//! 런처 UI/CLI/IPC가 호출하는 모든 연산을 제공합니다. 각 연산은 항상
//! `{"success": bool, ...}` 형태의 JSON을 반환하며 호출자에게 에러를 던지지 않습니다.
//! 블로킹 연산이므로 비동기 컨텍스트에서는 `spawn_blocking`으로 호출해야 합니다.

use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

use ltth_updater_lib::{
    installed_versions, ConfigPatch, InstallManager, InstallPhase, InstallationState,
    OsIntegration, StateStore, UpdaterError,
};

use crate::config::LauncherConfig;
use crate::paths;

pub struct LauncherService {
    state: InstallationState,
    manager: InstallManager,
    os: Arc<dyn OsIntegration>,
    log_dir: PathBuf,
}

fn failure(e: &UpdaterError) -> Value {
    e.to_json()
}

impl LauncherService {
    /// 상태 파일을 로드해서 서비스를 만든다
    pub fn new(
        config: &LauncherConfig,
        store: StateStore,
        os: Arc<dyn OsIntegration>,
        log_dir: PathBuf,
    ) -> Self {
        let state = store.load();
        tracing::info!(
            "[State] Active version: '{}' (history {:?})",
            state.last_version,
            state.previous_versions
        );
        let manager = InstallManager::new(config.sources.clone(), store, &state);
        Self {
            state,
            manager,
            os,
            log_dir,
        }
    }

    pub fn state(&self) -> &InstallationState {
        &self.state
    }

    pub fn phase(&self) -> InstallPhase {
        self.manager.phase()
    }

    // ─── 설정 ────────────────────────────────────────────────

    pub fn get_config(&self) -> Value {
        json!({
            "success": true,
            "config": self.state,
            "phase": self.manager.phase(),
        })
    }

    /// 인식하는 필드만 반영한다. 빈 패치는 저장하지 않는다.
    pub fn save_config(&mut self, patch: &ConfigPatch) -> Value {
        if patch.is_empty() {
            return json!({ "success": true, "changed": [] });
        }
        match self.manager.apply_patch(&mut self.state, patch) {
            Ok(changed) => json!({ "success": true, "changed": changed }),
            Err(e) => failure(&e),
        }
    }

    pub fn default_paths(&self) -> Value {
        let (install, config) = paths::default_install_paths();
        json!({
            "success": true,
            "installPath": install.display().to_string(),
            "configPath": config.display().to_string(),
        })
    }

    // ─── 업데이트 ────────────────────────────────────────────

    pub fn check_for_update(&mut self) -> Value {
        let report = self.manager.check_for_update(&self.state);
        serde_json::to_value(&report).unwrap_or_else(|e| {
            json!({ "success": false, "error": format!("Failed to encode report: {}", e) })
        })
    }

    pub fn install_version(&mut self, version: &str) -> Value {
        match self.manager.install_version(&mut self.state, version) {
            Ok(()) => json!({
                "success": true,
                "version": self.state.last_version,
                "previousVersions": self.state.previous_versions,
            }),
            Err(e) => failure(&e),
        }
    }

    pub fn rollback(&mut self) -> Value {
        match self.manager.rollback(&mut self.state) {
            Ok(version) => json!({
                "success": true,
                "version": version,
                "previousVersions": self.state.previous_versions,
            }),
            Err(e) => failure(&e),
        }
    }

    // ─── 실행 / 조회 ─────────────────────────────────────────

    pub fn launch_installed(&self) -> Value {
        match self.manager.launch_installed(&self.state, self.os.as_ref()) {
            Ok(target) => json!({ "success": true, "target": target }),
            Err(e) => failure(&e),
        }
    }

    pub fn installed_versions(&self) -> Value {
        json!({
            "success": true,
            "versions": installed_versions(&self.state),
            "active": self.state.last_version,
        })
    }

    pub fn open_logs(&self) -> Value {
        if let Err(e) = std::fs::create_dir_all(&self.log_dir) {
            return failure(&UpdaterError::io("create log directory", &self.log_dir, e));
        }
        match self.os.open_directory(&self.log_dir) {
            Ok(()) => json!({ "success": true, "path": self.log_dir.display().to_string() }),
            Err(e) => failure(&UpdaterError::io("open log directory", &self.log_dir, e)),
        }
    }
}
