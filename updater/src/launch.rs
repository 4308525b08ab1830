//! 실행 대상 결정
//!
//! `installPath/lastVersion` 디렉터리 안에서 실행할 엔트리 포인트를 찾습니다.
//! 탐색 순서: `index.html` (기본 프로그램으로 열기) → `launch.js` (`node` 런타임으로 실행).
//! 실제 실행은 [`OsIntegration`] 구현체가 담당하며, 이 모듈은 프로세스를 직접 띄우지 않습니다.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::{Result, UpdaterError};
use crate::pathsafe;

/// 마크업 엔트리 문서
pub const ENTRY_DOCUMENT: &str = "index.html";
/// 스크립트 엔트리 포인트
pub const ENTRY_SCRIPT: &str = "launch.js";
/// 스크립트 런타임
pub const SCRIPT_RUNTIME: &str = "node";

/// 셸이 주입하는 OS 연동 기능 (기본 프로그램 열기, 런타임 실행, 폴더 열기)
pub trait OsIntegration: Send + Sync {
    fn open_document(&self, path: &Path) -> std::io::Result<()>;
    fn run_script(&self, runtime: &str, script: &Path, working_dir: &Path) -> std::io::Result<()>;
    fn open_directory(&self, path: &Path) -> std::io::Result<()>;
}

/// 해석된 실행 대상
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LaunchTarget {
    Document {
        path: PathBuf,
    },
    #[serde(rename_all = "camelCase")]
    Script {
        runtime: String,
        script: PathBuf,
        working_dir: PathBuf,
    },
}

impl LaunchTarget {
    /// OS 연동을 통해 실행
    pub fn launch(&self, os: &dyn OsIntegration) -> Result<()> {
        match self {
            LaunchTarget::Document { path } => {
                tracing::info!("[Launch] Opening {}", path.display());
                os.open_document(path)
                    .map_err(|e| UpdaterError::io("open document", path, e))
            }
            LaunchTarget::Script {
                runtime,
                script,
                working_dir,
            } => {
                tracing::info!("[Launch] Running {} {}", runtime, script.display());
                os.run_script(runtime, script, working_dir)
                    .map_err(|e| UpdaterError::io("run script", script, e))
            }
        }
    }
}

pub struct LaunchResolver;

impl LaunchResolver {
    /// 활성 버전 디렉터리에서 실행 대상을 찾는다
    pub fn resolve(install_path: &str, last_version: &str) -> Result<LaunchTarget> {
        if last_version.trim().is_empty() || install_path.trim().is_empty() {
            return Err(UpdaterError::NoVersion);
        }

        let root = Path::new(install_path);
        let app_dir = root.join(last_version);

        // 1차: 어휘적 검사 (디스크 접근 전)
        if !pathsafe::is_within_lexically(root, &app_dir, true) {
            tracing::error!("[Launch] Version '{}' escapes the install root", last_version);
            return Err(UpdaterError::PathSafety(format!(
                "version directory '{}' is outside the install root",
                last_version
            )));
        }

        // 2차: 정규화 후 재검사 (심볼릭 링크)
        let real_root = root.canonicalize().map_err(|_| UpdaterError::NotFound(root.to_path_buf()))?;
        let real_app = app_dir
            .canonicalize()
            .map_err(|_| UpdaterError::NotFound(app_dir.clone()))?;
        if !pathsafe::is_within_canonical(&real_root, &real_app, true) {
            tracing::error!(
                "[Launch] {} resolves outside {}",
                real_app.display(),
                real_root.display()
            );
            return Err(UpdaterError::PathSafety(format!(
                "'{}' resolves outside the install root",
                real_app.display()
            )));
        }

        let document = real_app.join(ENTRY_DOCUMENT);
        if document.is_file() {
            return Ok(LaunchTarget::Document { path: document });
        }

        let script = real_app.join(ENTRY_SCRIPT);
        if script.is_file() {
            return Ok(LaunchTarget::Script {
                runtime: SCRIPT_RUNTIME.to_string(),
                script,
                working_dir: real_app,
            });
        }

        tracing::warn!("[Launch] No entry point in {}", real_app.display());
        Err(UpdaterError::NotFound(real_app))
    }
}
