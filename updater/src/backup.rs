//! 사용자 설정 백업
//!
//! 설치 직전에 `configPath`의 최상위 파일을 `configPath/.backup/<YYYYMMDD-HHMMSS>`로 복사합니다.
//! 최선 노력(best-effort) 안전망이므로 개별 파일 복사 실패는 경고만 남기고 건너뜁니다.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, UpdaterError};

/// 백업 디렉터리 이름 (설정 디렉터리 내부, 숨김)
pub const BACKUP_DIR_NAME: &str = ".backup";

/// 정렬 가능한 타임스탬프 형식
const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// 기본 보존 개수
pub const DEFAULT_RETENTION: usize = 10;

/// 한 번의 백업 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupOutcome {
    pub dir: PathBuf,
    pub copied: Vec<String>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ConfigBackup {
    retention: usize,
}

impl ConfigBackup {
    /// `retention`은 남겨둘 백업 디렉터리 수 (0이면 정리하지 않음)
    pub fn new(retention: usize) -> Self {
        Self { retention }
    }

    /// 설정 디렉터리를 백업한다.
    /// 디렉터리가 없거나 복사할 파일이 없으면 `Ok(None)`.
    pub fn backup(&self, config_path: &Path) -> Result<Option<BackupOutcome>> {
        if !config_path.is_dir() {
            tracing::debug!("[Backup] {} does not exist, nothing to back up", config_path.display());
            return Ok(None);
        }

        let candidates = top_level_files(config_path)?;
        if candidates.is_empty() {
            tracing::debug!("[Backup] {} has no files to back up", config_path.display());
            return Ok(None);
        }

        let root = config_path.join(BACKUP_DIR_NAME);
        let dir = unique_backup_dir(&root, &chrono::Local::now().format(TIMESTAMP_FORMAT).to_string());
        fs::create_dir_all(&dir).map_err(|e| UpdaterError::io("create backup directory", &dir, e))?;

        let (copied, skipped) = copy_files(&dir, candidates);

        tracing::info!(
            "[Backup] Backed up {} file(s) to {} ({} skipped)",
            copied.len(),
            dir.display(),
            skipped.len()
        );

        self.prune(&root);
        Ok(Some(BackupOutcome { dir, copied, skipped }))
    }

    /// 보존 개수를 넘는 오래된 백업 삭제 (실패는 무시)
    fn prune(&self, root: &Path) {
        if self.retention == 0 {
            return;
        }
        let mut dirs = list_backups(root);
        if dirs.len() <= self.retention {
            return;
        }
        let excess = dirs.len() - self.retention;
        for old in dirs.drain(..excess) {
            match fs::remove_dir_all(&old) {
                Ok(()) => tracing::debug!("[Backup] Pruned {}", old.display()),
                Err(e) => tracing::warn!("[Backup] Failed to prune {}: {}", old.display(), e),
            }
        }
    }
}

impl Default for ConfigBackup {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION)
    }
}

/// 최상위의 숨김이 아닌 일반 파일 (이름순)
fn top_level_files(config_path: &Path) -> Result<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(config_path)
        .map_err(|e| UpdaterError::io("read config directory", config_path, e))?;

    let mut files = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if is_file {
            files.push((name, entry.path()));
        }
    }
    files.sort();
    Ok(files)
}

/// 후보 파일을 `dir`로 복사한다. 실패한 파일은 건너뛰고 이름을 따로 돌려준다.
fn copy_files(dir: &Path, candidates: Vec<(String, PathBuf)>) -> (Vec<String>, Vec<String>) {
    let mut copied = Vec::new();
    let mut skipped = Vec::new();
    for (name, src) in candidates {
        match fs::copy(&src, dir.join(&name)) {
            Ok(_) => copied.push(name),
            Err(e) => {
                tracing::warn!("[Backup] Skipping {}: {}", src.display(), e);
                skipped.push(name);
            }
        }
    }
    (copied, skipped)
}

/// 같은 초에 두 번 백업하면 `-1`, `-2`... 접미사를 붙인다
fn unique_backup_dir(root: &Path, stamp: &str) -> PathBuf {
    let first = root.join(stamp);
    if !first.exists() {
        return first;
    }
    let mut n = 1;
    loop {
        let candidate = root.join(format!("{}-{}", stamp, n));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// 백업 디렉터리 목록 (오래된 것부터)
pub fn list_backups(root: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = match fs::read_dir(root) {
        Ok(entries) => entries
            .flatten()
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|e| e.path())
            .collect(),
        Err(_) => return Vec::new(),
    };
    dirs.sort();
    dirs
}
