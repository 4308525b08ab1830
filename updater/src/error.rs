//! 에러 처리
//!
//! ## 에러 분류
//! - **설정 오류**: 설치/설정 경로 누락 (사용자가 수정 가능)
//! - **네트워크 / HTTP 상태 오류**: 매니페스트 또는 패키지에 접근 불가 (재시도 가능)
//! - **매니페스트 파싱 오류**: 원격 데이터 손상 (원격 수정 전까지 재시도 무의미)
//! - **아카이브 / 경로 탈출 오류**: 손상되었거나 악의적인 패키지 (해당 설치 시도 중단)
//! - **IO 오류**: 로컬 디스크 문제 (그대로 전달)
//! - **전제 조건 위반**: 롤백 이력 없음, 설치된 버전 없음, 실행 파일 없음, 경로 안전성 위반

use std::path::{Path, PathBuf};

/// 업데이터 결과 타입
pub type Result<T> = std::result::Result<T, UpdaterError>;

/// 업데이터 에러 타입
#[derive(thiserror::Error, Debug)]
pub enum UpdaterError {
    /// 필수 경로(installPath/configPath)가 설정되지 않음
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 전송 계층 실패 (DNS, 연결 거부, TLS 등)
    #[error("Network error while requesting {url}: {message}")]
    Network { url: String, message: String },

    /// 2xx 이외의 HTTP 응답
    #[error("HTTP {status} while requesting {url}")]
    HttpStatus { url: String, status: u16 },

    /// 매니페스트 응답이 비정상 (상태 코드, 본문, 버전 필드)
    #[error("Invalid manifest: {0}")]
    ManifestParse(String),

    /// 아카이브를 열 수 없음
    #[error("Cannot open archive '{}': {message}", .path.display())]
    ArchiveOpen { path: PathBuf, message: String },

    /// zip-slip: 엔트리가 대상 디렉터리 밖을 가리킴
    #[error("Archive entry '{entry}' escapes the destination directory")]
    PathTraversal { entry: String },

    /// 로컬 파일 시스템 오류
    #[error("File system error during {operation} on '{}': {source}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 다운로드한 패키지의 해시 불일치 또는 필수 해시 누락
    #[error("Integrity check failed for {version}: expected {expected}, got {actual}")]
    Integrity {
        version: String,
        expected: String,
        actual: String,
    },

    /// 패키지 다운로드 단계 실패
    #[error("Download of {version} failed: {source}")]
    Download {
        version: String,
        #[source]
        source: Box<UpdaterError>,
    },

    /// 패키지 압축 해제 단계 실패
    #[error("Extraction of {version} failed: {source}")]
    Extraction {
        version: String,
        #[source]
        source: Box<UpdaterError>,
    },

    /// 롤백할 이전 버전이 없음
    #[error("No previous version available")]
    NoHistory,

    /// 활성 버전이 없음
    #[error("No version installed")]
    NoVersion,

    /// 실행 가능한 엔트리 포인트를 찾지 못함
    #[error("No launchable file found in '{}'", .0.display())]
    NotFound(PathBuf),

    /// 계산된 경로가 설치 루트를 벗어남
    #[error("Unsafe path: {0}")]
    PathSafety(String),
}

impl UpdaterError {
    /// IO 에러를 작업/경로 정보와 함께 감싼다
    pub fn io(operation: &'static str, path: impl AsRef<Path>, source: std::io::Error) -> Self {
        UpdaterError::Io {
            operation,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// 같은 요청을 다시 호출하면 성공할 가능성이 있는지
    pub fn is_retryable(&self) -> bool {
        match self {
            UpdaterError::Network { .. } => true,
            // 5xx와 429는 서버 측 일시 장애
            UpdaterError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            // 해시 불일치는 전송 중 손상일 수 있으므로 재다운로드로 복구 가능
            UpdaterError::Integrity { .. } => true,
            UpdaterError::Download { source, .. } => source.is_retryable(),
            UpdaterError::Extraction { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// 머신 리더블 에러 코드
    pub fn error_code(&self) -> &'static str {
        match self {
            UpdaterError::Configuration(_) => "CONFIGURATION_ERROR",
            UpdaterError::Network { .. } => "NETWORK_ERROR",
            UpdaterError::HttpStatus { .. } => "HTTP_STATUS_ERROR",
            UpdaterError::ManifestParse(_) => "MANIFEST_PARSE_ERROR",
            UpdaterError::ArchiveOpen { .. } => "ARCHIVE_OPEN_ERROR",
            UpdaterError::PathTraversal { .. } => "PATH_TRAVERSAL",
            UpdaterError::Io { .. } => "IO_ERROR",
            UpdaterError::Integrity { .. } => "INTEGRITY_ERROR",
            UpdaterError::Download { .. } => "DOWNLOAD_ERROR",
            UpdaterError::Extraction { .. } => "EXTRACTION_ERROR",
            UpdaterError::NoHistory => "NO_HISTORY",
            UpdaterError::NoVersion => "NO_VERSION",
            UpdaterError::NotFound(_) => "NOT_FOUND",
            UpdaterError::PathSafety(_) => "PATH_SAFETY",
        }
    }

    /// Download/Extraction 래퍼를 벗겨낸 근본 원인
    pub fn root_cause(&self) -> &UpdaterError {
        match self {
            UpdaterError::Download { source, .. } | UpdaterError::Extraction { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }

    /// 셸 경계로 내보내는 JSON 실패 응답
    pub fn to_json(&self) -> serde_json::Value {
        let mut body = serde_json::json!({
            "success": false,
            "error": self.to_string(),
            "errorCode": self.error_code(),
            "retryable": self.is_retryable(),
        });
        let cause = self.root_cause();
        if !std::ptr::eq(cause, self) {
            body["causeCode"] = serde_json::Value::from(cause.error_code());
        }
        body
    }
}
