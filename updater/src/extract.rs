//! 보안 아카이브 압축 해제
//!
//! ## 검사 단계 (zip-slip 방어)
//! 1. 엔트리 이름을 정규화(`.`/`..` 접기)한 뒤 `..`으로 시작하거나 절대 경로면 거부
//! 2. `dest + 정규화된 이름`을 `dest` 기준 상대 경로로 바꿨을 때 위로 탈출하면 거부
//! 3. 디렉터리를 만들기 전후로 정규화해서 여전히 `dest` 안인지 확인하고, 이미 있는
//!    심볼릭 링크 위에는 파일을 쓰지 않음
//!
//! 심볼릭 링크 엔트리(유닉스 모드 `S_IFLNK`)는 1단계에서 거부합니다.
//!
//! 1·2단계는 첫 바이트를 쓰기 전에 모든 엔트리에 대해 수행하므로, 악성 엔트리가
//! 하나라도 있으면 아무것도 기록하지 않고 중단합니다.
//! 압축 해제는 트랜잭션이 아닙니다. 3단계나 IO 오류로 도중에 실패하면 `dest`는
//! 일부만 채워진 상태로 남으며, 호출자는 깨끗한 디렉터리에서 다시 시도해야 합니다.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Result, UpdaterError};
use crate::pathsafe;

/// 압축 해제 결과 요약
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub files: usize,
    pub directories: usize,
}

/// 검증을 통과한 엔트리
struct PlannedEntry {
    index: usize,
    target: PathBuf,
    is_dir: bool,
}

/// zip 호환 패키지를 경로 탈출 방어와 함께 푼다
#[derive(Debug, Clone, Default)]
pub struct SecureExtractor;

impl SecureExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, archive_path: &Path, dest_dir: &Path) -> Result<ExtractSummary> {
        let file = File::open(archive_path).map_err(|e| UpdaterError::ArchiveOpen {
            path: archive_path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut archive = zip::ZipArchive::new(file).map_err(|e| UpdaterError::ArchiveOpen {
            path: archive_path.to_path_buf(),
            message: e.to_string(),
        })?;

        fs::create_dir_all(dest_dir)
            .map_err(|e| UpdaterError::io("create extraction directory", dest_dir, e))?;
        let dest = dest_dir
            .canonicalize()
            .map_err(|e| UpdaterError::io("canonicalize extraction directory", dest_dir, e))?;

        tracing::info!(
            "[Extractor] Extracting {} ({} entries) -> {}",
            archive_path.display(),
            archive.len(),
            dest.display()
        );

        let plan = plan_entries(&mut archive, archive_path, &dest)?;

        let mut summary = ExtractSummary::default();
        for entry in plan {
            if entry.is_dir {
                create_dir_inside(&dest, &entry.target)?;
                summary.directories += 1;
                continue;
            }

            let parent = entry.target.parent().unwrap_or(dest.as_path());
            create_dir_inside(&dest, parent)?;

            // 기존 심볼릭 링크를 따라가며 쓰지 않는다
            if let Ok(meta) = fs::symlink_metadata(&entry.target) {
                if meta.file_type().is_symlink() {
                    tracing::error!("[Extractor] {} is a symlink, refusing to write", entry.target.display());
                    return Err(UpdaterError::PathTraversal {
                        entry: entry.target.display().to_string(),
                    });
                }
            }

            let mut zip_entry = archive.by_index(entry.index).map_err(|e| UpdaterError::ArchiveOpen {
                path: archive_path.to_path_buf(),
                message: e.to_string(),
            })?;
            let mut out = File::create(&entry.target)
                .map_err(|e| UpdaterError::io("create file", &entry.target, e))?;
            io::copy(&mut zip_entry, &mut out)
                .map_err(|e| UpdaterError::io("write file", &entry.target, e))?;
            summary.files += 1;
        }

        tracing::info!(
            "[Extractor] Extracted {} files, {} directories",
            summary.files,
            summary.directories
        );
        Ok(summary)
    }
}

/// `dir`을 만들되, 만들기 전과 후 모두 정규화된 경로가 `dest` 안인지 확인한다.
/// 이미 존재하는 가장 가까운 조상이 심볼릭 링크로 밖을 가리키면 아무것도 만들지 않는다.
fn create_dir_inside(dest: &Path, dir: &Path) -> Result<()> {
    let mut existing = dir;
    while fs::symlink_metadata(existing).is_err() {
        match existing.parent() {
            Some(parent) => existing = parent,
            None => break,
        }
    }
    ensure_canonical_inside(dest, existing)?;

    fs::create_dir_all(dir).map_err(|e| UpdaterError::io("create directory", dir, e))?;
    ensure_canonical_inside(dest, dir)
}

fn ensure_canonical_inside(dest: &Path, path: &Path) -> Result<()> {
    let real = path
        .canonicalize()
        .map_err(|e| UpdaterError::io("canonicalize directory", path, e))?;
    if !pathsafe::is_within_canonical(dest, &real, false) {
        tracing::error!("[Extractor] {} resolves outside {}", path.display(), dest.display());
        return Err(UpdaterError::PathTraversal {
            entry: path.display().to_string(),
        });
    }
    Ok(())
}

/// zip 외부 속성의 유닉스 파일 종류가 심볼릭 링크인지
fn is_symlink_mode(mode: Option<u32>) -> bool {
    const S_IFMT: u32 = 0o170000;
    const S_IFLNK: u32 = 0o120000;
    mode.map_or(false, |m| m & S_IFMT == S_IFLNK)
}

/// 모든 엔트리 이름을 검증하고 출력 경로를 계산한다. 하나라도 위반하면 즉시 실패.
fn plan_entries(
    archive: &mut zip::ZipArchive<File>,
    archive_path: &Path,
    dest: &Path,
) -> Result<Vec<PlannedEntry>> {
    let mut plan = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index).map_err(|e| UpdaterError::ArchiveOpen {
            path: archive_path.to_path_buf(),
            message: e.to_string(),
        })?;
        let raw_name = entry.name().to_string();
        let is_dir = entry.is_dir();

        // 1단계: 이름 자체 검사
        let parts = match pathsafe::normalize_name(&raw_name) {
            Some(parts) if !pathsafe::escapes(&parts) => parts,
            _ => {
                tracing::error!("[Extractor] Rejecting archive entry '{}'", raw_name);
                return Err(UpdaterError::PathTraversal { entry: raw_name });
            }
        };
        if is_symlink_mode(entry.unix_mode()) {
            tracing::error!("[Extractor] Rejecting symlink entry '{}'", raw_name);
            return Err(UpdaterError::PathTraversal { entry: raw_name });
        }
        if parts.is_empty() {
            // "./" 같은 루트 자신
            continue;
        }

        // 2단계: 결합된 경로를 독립적으로 재검사
        let target = parts.iter().fold(dest.to_path_buf(), |acc, p| acc.join(p));
        if !pathsafe::is_within_lexically(dest, &target, true) {
            tracing::error!("[Extractor] Entry '{}' resolves outside destination", raw_name);
            return Err(UpdaterError::PathTraversal { entry: raw_name });
        }

        plan.push(PlannedEntry { index, target, is_dir });
    }

    Ok(plan)
}
