//! 원격 버전 매니페스트 클라이언트
//!
//! 매니페스트(`version.json`) 형식:
//! ```json
//! {
//!   "version": "1.2.1",
//!   "releaseDate": "2026-01-20",
//!   "status": "stable",
//!   "changelog": {
//!     "1.2.1": { "date": "2026-01-20", "changes": ["TTS engine fixes", "New overlay"] }
//!   },
//!   "checksums": { "1.2.1": "<sha256 hex>" }
//! }
//! ```
//! `checksums`는 선택 항목입니다. 있으면 설치 전에 패키지 해시를 검증합니다.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::{Result, UpdaterError};
use crate::version::Version;

/// 특정 버전의 변경 내역
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub changes: Vec<String>,
}

/// 원격 매니페스트
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// 최신 버전
    #[serde(rename = "version")]
    pub latest_version: String,
    #[serde(default)]
    pub release_date: String,
    /// 자유 형식 ("stable", "beta" 등)
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub changelog: BTreeMap<String, ChangelogEntry>,
    /// 버전별 패키지 SHA-256 (소문자 hex)
    #[serde(default)]
    pub checksums: BTreeMap<String, String>,
}

impl Manifest {
    /// JSON 본문을 파싱하고 검증한다. 최신 버전이 엄격한 형식이 아니면 전체를 거부한다.
    pub fn from_json(body: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(body)
            .map_err(|e| UpdaterError::ManifestParse(format!("malformed body: {}", e)))?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<()> {
        if Version::parse_strict(&self.latest_version).is_none() {
            return Err(UpdaterError::ManifestParse(format!(
                "unparsable latest version '{}'",
                self.latest_version
            )));
        }
        Ok(())
    }

    /// 최신 버전의 변경 내역 (없으면 빈 목록)
    pub fn latest_changes(&self) -> Vec<String> {
        self.changelog
            .get(&self.latest_version)
            .map(|entry| entry.changes.clone())
            .unwrap_or_default()
    }

    /// 버전의 패키지 해시
    pub fn checksum_for(&self, version: &str) -> Option<&str> {
        self.checksums
            .get(version)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

/// 매니페스트 조회 클라이언트. 한 번의 GET만 수행하며 재시도하지 않는다.
#[derive(Debug, Clone)]
pub struct ManifestClient {
    agent: ureq::Agent,
}

impl ManifestClient {
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .user_agent(concat!("ltth-launcher/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent }
    }

    /// 매니페스트 다운로드 및 파싱.
    /// 전송 실패는 `Network`, 2xx 이외의 응답과 잘못되거나 너무 큰 본문은 `ManifestParse`.
    pub fn fetch_manifest(&self, url: &str) -> Result<Manifest> {
        tracing::debug!("[Oracle] Fetching manifest from {}", url);

        let response = match self.agent.get(url).call() {
            Ok(resp) => resp,
            Err(ureq::Error::Status(status, _)) => {
                return Err(UpdaterError::ManifestParse(format!(
                    "server answered HTTP {} for {}",
                    status, url
                )));
            }
            Err(ureq::Error::Transport(t)) => {
                return Err(UpdaterError::Network {
                    url: url.to_string(),
                    message: t.to_string(),
                });
            }
        };

        // 본문을 읽지 못하면(크기 한도 초과 포함) 원격 데이터 문제로 본다
        let body = response
            .into_string()
            .map_err(|e| UpdaterError::ManifestParse(format!("unreadable body from {}: {}", url, e)))?;

        let manifest = Manifest::from_json(&body)?;
        tracing::info!(
            "[Oracle] Manifest: latest={} status={} released={}",
            manifest.latest_version,
            manifest.status,
            manifest.release_date
        );
        Ok(manifest)
    }
}

impl Default for ManifestClient {
    fn default() -> Self {
        Self::new()
    }
}
