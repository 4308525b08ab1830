//! # LTTH 업데이터 라이브러리
//!
//! 로컬에 설치된 LTTH 애플리케이션의 버전 확인, 다운로드, 설치, 롤백을 담당합니다.
//! UI나 IPC에 대해서는 알지 못하며 모든 연산은 동기(블로킹)입니다.
//! 호출자(런처 셸)는 한 번에 하나의 설치/롤백만 실행되도록 직렬화해야 합니다.
//!
//! ## 구성
//! - **manifest.rs**: 원격 매니페스트 조회/검증
//! - **version.rs**: 버전 비교
//! - **download.rs**: 패키지 스트리밍 다운로드 + SHA-256
//! - **extract.rs**: zip-slip 방어가 적용된 압축 해제
//! - **backup.rs**: 설치 전 사용자 설정 백업
//! - **state.rs**: 설치 상태 파일
//! - **launch.rs**: 실행 대상 결정 + OS 연동 인터페이스
//!
//! ## 디렉터리 구조
//! ```text
//! <installPath>/
//!   1.2.0/            ← 버전별 디렉터리 (index.html 또는 launch.js)
//!   1.2.1/
//!   .temp-XXXXXX/     ← 설치 중 스크래치 디렉터리 (완료/실패 시 삭제)
//! <configPath>/
//!   settings.json
//!   .backup/20260120-153000/
//! ```
//!
//! ## 설치 순서
//! 백업(실패 무시) → 다운로드(+해시 검증) → 압축 해제 → 상태 갱신 및 저장.
//! 상태는 새 버전 파일이 모두 디스크에 기록된 뒤에만 바뀌므로, 도중에 중단되어도
//! `lastVersion`이 존재하지 않는 디렉터리를 가리키지 않습니다.

// ══════════════════════════════════════════════════════
// 모듈
// ══════════════════════════════════════════════════════

pub mod backup;
pub mod download;
pub mod error;
pub mod extract;
pub mod launch;
pub mod manifest;
pub mod pathsafe;
pub mod state;
pub mod version;


pub use backup::{BackupOutcome, ConfigBackup};
pub use download::{DownloadResult, Downloader};
pub use error::{Result, UpdaterError};
pub use extract::{ExtractSummary, SecureExtractor};
pub use launch::{LaunchResolver, LaunchTarget, OsIntegration};
pub use manifest::{ChangelogEntry, Manifest, ManifestClient};
pub use state::{ConfigPatch, InstallationState, StateStore, HISTORY_LIMIT};
pub use version::{compare, is_update_available};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// ══════════════════════════════════════════════════════
// 설정 / 결과 타입
// ══════════════════════════════════════════════════════

/// 기본 매니페스트 주소
pub const DEFAULT_MANIFEST_URL: &str =
    "https://raw.githubusercontent.com/Loggableim/ltth.app/main/version.json";
/// 기본 패키지 주소 템플릿 (`{version}` 치환)
pub const DEFAULT_PACKAGE_URL_TEMPLATE: &str = "https://ltth.app/app/ltth_{version}.zip";

/// 업데이트 원본 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSources {
    pub manifest_url: String,
    /// `{version}` 자리표시자를 포함한 패키지 URL
    pub package_url_template: String,
    /// 매니페스트에 해시가 없으면 설치를 거부할지 여부
    pub require_checksum: bool,
    /// 남겨둘 설정 백업 수
    pub backup_retention: usize,
}

impl Default for UpdateSources {
    fn default() -> Self {
        Self {
            manifest_url: DEFAULT_MANIFEST_URL.to_string(),
            package_url_template: DEFAULT_PACKAGE_URL_TEMPLATE.to_string(),
            require_checksum: false,
            backup_retention: backup::DEFAULT_RETENTION,
        }
    }
}

impl UpdateSources {
    pub fn package_url(&self, version: &str) -> String {
        self.package_url_template.replace("{version}", version)
    }
}

/// 설치 상태 머신 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InstallPhase {
    NoVersion,
    Checking,
    UpdateAvailable,
    Installing,
    Installed,
    RolledBack,
}

impl InstallPhase {
    /// 영속 상태로부터 유추한 정지 상태
    pub fn settled(state: &InstallationState) -> Self {
        if state.last_version.trim().is_empty() {
            InstallPhase::NoVersion
        } else {
            InstallPhase::Installed
        }
    }
}

/// 업데이트 확인 결과. 실패도 예외가 아닌 `success=false` 보고서로 표현된다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    pub current_version: String,
    pub latest_version: String,
    pub update_available: bool,
    pub changelog: Vec<String>,
    pub release_date: String,
    pub status: String,
}

// ══════════════════════════════════════════════════════
// InstallManager
// ══════════════════════════════════════════════════════

/// 확인 → 다운로드 → 압축 해제 → 버전 전환을 조율하고 롤백을 담당한다.
/// `InstallationState`의 유일한 기록자.
pub struct InstallManager {
    sources: UpdateSources,
    store: StateStore,
    manifest_client: ManifestClient,
    downloader: Downloader,
    extractor: SecureExtractor,
    backup: ConfigBackup,
    /// 마지막으로 조회한 매니페스트 (해시 검증용)
    cached_manifest: Option<Manifest>,
    phase: InstallPhase,
}

impl InstallManager {
    pub fn new(sources: UpdateSources, store: StateStore, state: &InstallationState) -> Self {
        let backup = ConfigBackup::new(sources.backup_retention);
        Self {
            sources,
            store,
            manifest_client: ManifestClient::new(),
            downloader: Downloader::new(),
            extractor: SecureExtractor::new(),
            backup,
            cached_manifest: None,
            phase: InstallPhase::settled(state),
        }
    }

    pub fn phase(&self) -> InstallPhase {
        self.phase
    }

    pub fn sources(&self) -> &UpdateSources {
        &self.sources
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn cached_manifest(&self) -> Option<&Manifest> {
        self.cached_manifest.as_ref()
    }

    // ─── 업데이트 확인 ────────────────────────────────────────

    /// 매니페스트를 조회해서 활성 버전과 비교한다
    pub fn check_for_update(&mut self, state: &InstallationState) -> UpdateReport {
        let previous_phase = self.phase;
        self.phase = InstallPhase::Checking;
        let current = state.last_version.clone();

        match self.manifest_client.fetch_manifest(&self.sources.manifest_url) {
            Ok(manifest) => {
                let available = is_update_available(&current, &manifest);
                tracing::info!(
                    "[Installer] Update check: current='{}' latest='{}' available={}",
                    current,
                    manifest.latest_version,
                    available
                );
                self.phase = if available {
                    InstallPhase::UpdateAvailable
                } else {
                    InstallPhase::settled(state)
                };
                let report = UpdateReport {
                    success: true,
                    error: None,
                    error_code: None,
                    current_version: current,
                    latest_version: manifest.latest_version.clone(),
                    update_available: available,
                    changelog: manifest.latest_changes(),
                    release_date: manifest.release_date.clone(),
                    status: manifest.status.clone(),
                };
                self.cached_manifest = Some(manifest);
                report
            }
            Err(e) => {
                tracing::warn!("[Installer] Update check failed: {}", e);
                self.phase = previous_phase;
                UpdateReport {
                    success: false,
                    error: Some(e.to_string()),
                    error_code: Some(e.error_code().to_string()),
                    current_version: current,
                    ..UpdateReport::default()
                }
            }
        }
    }

    // ─── 설치 ────────────────────────────────────────────────

    /// `version`을 설치하고 활성 버전으로 전환한다.
    /// 실패하면 단계와 `state`는 호출 전 그대로다.
    pub fn install_version(&mut self, state: &mut InstallationState, version: &str) -> Result<()> {
        let previous_phase = self.phase;
        self.phase = InstallPhase::Installing;

        match self.run_install(state, version) {
            Ok(()) => {
                self.phase = InstallPhase::Installed;
                Ok(())
            }
            Err(e) => {
                tracing::error!("[Installer] Install of '{}' failed: {}", version, e);
                self.phase = previous_phase;
                Err(e)
            }
        }
    }

    fn run_install(&mut self, state: &mut InstallationState, version: &str) -> Result<()> {
        if !state.has_install_paths() {
            return Err(UpdaterError::Configuration(
                "installPath and configPath must be set before installing".into(),
            ));
        }
        let version = version.trim();
        if !pathsafe::is_single_component(version) {
            return Err(UpdaterError::PathSafety(format!(
                "'{}' is not a valid version directory name",
                version
            )));
        }

        let install_root = Path::new(&state.install_path);
        let config_root = Path::new(&state.config_path);
        fs::create_dir_all(install_root)
            .map_err(|e| UpdaterError::io("create install directory", install_root, e))?;
        fs::create_dir_all(config_root)
            .map_err(|e| UpdaterError::io("create config directory", config_root, e))?;

        tracing::info!("[Installer] Installing version {} into {}", version, install_root.display());

        if let Err(e) = self.backup.backup(config_root) {
            tracing::warn!("[Installer] Config backup failed, continuing: {}", e);
        }

        // TempDir은 drop 시 삭제되므로 모든 반환 경로에서 정리된다
        let scratch = tempfile::Builder::new()
            .prefix(".temp-")
            .tempdir_in(install_root)
            .map_err(|e| UpdaterError::Download {
                version: version.to_string(),
                source: Box::new(UpdaterError::io("create scratch directory", install_root, e)),
            })?;

        let package = scratch.path().join(format!("ltth_{}.zip", version));
        self.expected_checksum(version)
            .and_then(|expected| self.fetch_package(version, &package, expected))
            .map_err(|e| UpdaterError::Download {
                version: version.to_string(),
                source: Box::new(e),
            })?;

        let version_dir = install_root.join(version);
        self.extractor
            .extract(&package, &version_dir)
            .map_err(|e| UpdaterError::Extraction {
                version: version.to_string(),
                source: Box::new(e),
            })?;

        let mut next = state.clone();
        if !next.last_version.is_empty() && next.last_version != version {
            let previous = std::mem::take(&mut next.last_version);
            next.push_history(previous);
        }
        next.last_version = version.to_string();
        self.store.save(&next)?;
        *state = next;

        if let Err(e) = scratch.close() {
            tracing::warn!("[Installer] Failed to remove scratch directory: {}", e);
        }

        tracing::info!(
            "[Installer] Version {} installed (history: {:?})",
            version,
            state.previous_versions
        );
        Ok(())
    }

    /// 매니페스트에 공개된 `version`의 해시 (소문자).
    /// 캐시된 매니페스트에 없으면 다시 조회한다. 조회 실패는 `require_checksum`일 때만 치명적.
    fn expected_checksum(&mut self, version: &str) -> Result<Option<String>> {
        if let Some(sum) = self.cached_manifest.as_ref().and_then(|m| m.checksum_for(version)) {
            return Ok(Some(sum.to_ascii_lowercase()));
        }

        match self.manifest_client.fetch_manifest(&self.sources.manifest_url) {
            Ok(manifest) => {
                let sum = manifest.checksum_for(version).map(|s| s.to_ascii_lowercase());
                self.cached_manifest = Some(manifest);
                Ok(sum)
            }
            Err(e) if self.sources.require_checksum => {
                tracing::error!("[Installer] Cannot verify {}: manifest unavailable: {}", version, e);
                Err(e)
            }
            Err(e) => {
                tracing::warn!("[Installer] Manifest unavailable, skipping checksum lookup: {}", e);
                Ok(None)
            }
        }
    }

    /// 패키지를 다운로드하고 알려진 해시와 대조한다
    fn fetch_package(&self, version: &str, dest: &Path, expected: Option<String>) -> Result<()> {
        let url = self.sources.package_url(version);
        let downloaded = self.downloader.download(&url, dest)?;

        match expected {
            Some(expected) if expected != downloaded.sha256 => Err(UpdaterError::Integrity {
                version: version.to_string(),
                expected,
                actual: downloaded.sha256,
            }),
            Some(_) => {
                tracing::info!("[Installer] Checksum verified for {}", version);
                Ok(())
            }
            None if self.sources.require_checksum => Err(UpdaterError::Integrity {
                version: version.to_string(),
                expected: "<none published>".to_string(),
                actual: downloaded.sha256,
            }),
            None => {
                tracing::warn!(
                    "[Installer] No checksum published for {}, package is unverified",
                    version
                );
                Ok(())
            }
        }
    }

    // ─── 롤백 ────────────────────────────────────────────────

    /// 직전 버전으로 되돌린다. 파일은 삭제하지 않으며 디렉터리 존재 여부도 확인하지 않는다.
    pub fn rollback(&mut self, state: &mut InstallationState) -> Result<String> {
        let mut next = state.clone();
        let previous = next.previous_versions.pop().ok_or(UpdaterError::NoHistory)?;
        next.last_version = previous.clone();
        self.store.save(&next)?;
        *state = next;

        self.phase = InstallPhase::RolledBack;
        tracing::info!("[Installer] Rolled back to version {}", previous);
        Ok(previous)
    }

    // ─── 설정 ────────────────────────────────────────────────

    /// 부분 설정 변경을 적용하고 저장한다
    pub fn apply_patch(&self, state: &mut InstallationState, patch: &ConfigPatch) -> Result<Vec<&'static str>> {
        let mut next = state.clone();
        let changed = patch.apply(&mut next);
        self.store.save(&next)?;
        *state = next;
        tracing::info!("[State] Updated fields: {:?}", changed);
        Ok(changed)
    }

    // ─── 실행 ────────────────────────────────────────────────

    /// 활성 버전을 해석해서 OS 연동으로 실행한다
    pub fn launch_installed(&self, state: &InstallationState, os: &dyn OsIntegration) -> Result<LaunchTarget> {
        let target = LaunchResolver::resolve(&state.install_path, &state.last_version)?;
        target.launch(os)?;
        Ok(target)
    }
}

/// `installPath` 아래 설치된 버전 디렉터리 이름 (숨김 제외, 이름 내림차순)
pub fn installed_versions(state: &InstallationState) -> Vec<String> {
    if state.install_path.trim().is_empty() {
        return Vec::new();
    }
    let entries = match fs::read_dir(&state.install_path) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("[Installer] Cannot list {}: {}", state.install_path, e);
            return Vec::new();
        }
    };

    let mut versions: Vec<String> = entries
        .flatten()
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| !name.starts_with('.'))
        .collect();
    versions.sort_by(|a, b| b.cmp(a));
    versions
}
