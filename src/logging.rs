//! 로깅 초기화
//!
//! stderr와 `<logDir>/launcher.log` 두 곳에 기록합니다.
//! stdout은 `--json` 출력용으로 비워 둡니다.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_FILE_NAME: &str = "launcher.log";

/// 전역 subscriber 설치. 로그 파일을 열 수 없으면 콘솔만 사용한다.
pub fn init(log_dir: &Path) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let log_path = log_dir.join(LOG_FILE_NAME);
    let file_result = std::fs::create_dir_all(log_dir).and_then(|_| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
    });
    let (file_layer, file_error) = match file_result {
        Ok(file) => (
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false),
            ),
            None,
        ),
        Err(e) => (None, Some(e)),
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init();
    if installed.is_err() {
        // 테스트 등에서 이미 설치된 경우
        return;
    }

    match file_error {
        Some(e) => tracing::warn!("Cannot open log file {}: {}", log_path.display(), e),
        None => tracing::debug!("Logging to {}", log_path.display()),
    }
}
