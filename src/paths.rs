//! 플랫폼별 기본 경로
//!
//! | 용도        | Windows                               | 그 외                          |
//! |-------------|---------------------------------------|--------------------------------|
//! | 상태 파일   | `%APPDATA%\ltth-launcher\config.json` | `~/.ltth-launcher/config.json` |
//! | 로그        | `%LOCALAPPDATA%\LTTH`                 | `~/.ltth`                      |
//! | 설치 (기본) | `%LOCALAPPDATA%\LTTH\versions`        | `~/LTTH/versions`              |
//! | 설정 (기본) | `%LOCALAPPDATA%\LTTH\config`          | `~/LTTH/config`                |

use std::path::PathBuf;

fn home_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
    }
}

fn non_empty_env(key: &str) -> Option<PathBuf> {
    std::env::var(key).ok().filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// 상태 파일 (`LTTH_STATE_FILE`로 재정의 가능)
pub fn state_file_path() -> PathBuf {
    if let Some(p) = non_empty_env("LTTH_STATE_FILE") {
        return p;
    }
    #[cfg(target_os = "windows")]
    {
        non_empty_env("APPDATA")
            .map(|appdata| appdata.join("ltth-launcher").join("config.json"))
            .unwrap_or_else(|| home_dir().join(".ltth-launcher").join("config.json"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        home_dir().join(".ltth-launcher").join("config.json")
    }
}

/// 로그 디렉터리
pub fn log_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        non_empty_env("LOCALAPPDATA")
            .map(|local| local.join("LTTH"))
            .unwrap_or_else(|| home_dir().join(".ltth"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        home_dir().join(".ltth")
    }
}

/// IPC 토큰 파일 (`LTTH_TOKEN_PATH`로 재정의 가능, 기본은 상태 파일 옆)
pub fn token_file_path() -> PathBuf {
    if let Some(p) = non_empty_env("LTTH_TOKEN_PATH") {
        return p;
    }
    state_file_path()
        .parent()
        .map(|dir| dir.join(".ipc_token"))
        .unwrap_or_else(|| PathBuf::from(".ipc_token"))
}

/// 첫 실행 시 제안할 설치/설정 경로
pub fn default_install_paths() -> (PathBuf, PathBuf) {
    let base = non_empty_env("LOCALAPPDATA")
        .unwrap_or_else(home_dir)
        .join("LTTH");
    (base.join("versions"), base.join("config"))
}
