//! 경로 안전성 검사
//!
//! 신뢰할 수 없는 이름(아카이브 엔트리, 설정 파일의 버전 문자열)으로 경로를 만들 때
//! 사용하는 공통 도우미입니다. 파일 시스템에 접근하지 않는 어휘적 정규화와,
//! 존재하는 경로를 정규화(canonicalize)해서 포함 관계를 확인하는 검사를 모두 제공합니다.

use std::path::{Component, Path, PathBuf};

/// `/`와 `\`를 모두 구분자로 보고 `.`/`..`을 접은 상대 경로 구성요소 목록.
///
/// 결과의 앞쪽에 남은 `..`은 시작 지점보다 위로 올라간다는 뜻이다.
/// 루트(`/x`), 드라이브 접두사(`C:`)로 시작하는 이름은 `None`.
pub fn normalize_name(name: &str) -> Option<Vec<String>> {
    if name.starts_with('/') || name.starts_with('\\') {
        return None;
    }

    let mut parts: Vec<String> = Vec::new();
    for segment in name.split(|c| c == '/' || c == '\\') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().map_or(false, |p| p != "..") {
                    parts.pop();
                } else {
                    parts.push("..".to_string());
                }
            }
            s if s.contains(':') => return None,
            s => parts.push(s.to_string()),
        }
    }
    Some(parts)
}

/// 정규화된 이름이 시작 지점 위로 탈출하는지
pub fn escapes(parts: &[String]) -> bool {
    parts.first().map_or(false, |p| p == "..")
}

/// 파일 시스템 접근 없이 `.`/`..`을 접는다
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// `candidate`를 `root` 기준 상대 경로로 바꿨을 때 위로 탈출하지 않는지 (어휘적 검사).
/// `strict`이면 `root` 자신도 허용하지 않는다.
pub fn is_within_lexically(root: &Path, candidate: &Path, strict: bool) -> bool {
    let root = normalize_lexically(root);
    let candidate = normalize_lexically(candidate);
    match candidate.strip_prefix(&root) {
        Ok(rel) => {
            let mut components = rel.components().peekable();
            if strict && components.peek().is_none() {
                return false;
            }
            components.all(|c| matches!(c, Component::Normal(_)))
        }
        Err(_) => false,
    }
}

/// 이미 정규화(canonicalize)된 두 경로의 포함 관계
pub fn is_within_canonical(root: &Path, candidate: &Path, strict: bool) -> bool {
    match candidate.strip_prefix(root) {
        Ok(rel) => !(strict && rel.as_os_str().is_empty()),
        Err(_) => false,
    }
}

/// 단일 일반 경로 구성요소인지 (구분자 없음, 비어 있지 않음).
/// `.`으로 시작하는 이름은 숨김/내부용(`.backup`, `.temp-*`)이므로 거부한다.
pub fn is_single_component(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains(':')
        && !name.contains('\0')
}
