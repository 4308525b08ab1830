//! 패키지 다운로더
//!
//! 응답 본문을 메모리에 모두 올리지 않고 `<dest>.part` 파일로 스트리밍한 뒤,
//! 전체 본문이 기록되고 디스크에 동기화된 경우에만 `dest`로 이름을 바꿉니다.
//! 따라서 `dest`에 파일이 존재하면 항상 완전한 본문입니다.
//! 다운로드하면서 SHA-256을 함께 계산합니다.

use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, UpdaterError};

/// 스트리밍 버퍼 크기 (64KB)
const CHUNK_SIZE: usize = 64 * 1024;

/// 다운로드 결과
#[derive(Debug, Clone)]
pub struct DownloadResult {
    /// 완료된 파일 경로
    pub path: PathBuf,
    /// 기록된 바이트 수
    pub size: u64,
    /// 본문의 SHA-256 (소문자 hex)
    pub sha256: String,
}

/// 블로킹 HTTP 다운로더. 전체 타임아웃은 두지 않는다 (호출자 책임).
#[derive(Debug, Clone)]
pub struct Downloader {
    agent: ureq::Agent,
}

impl Downloader {
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(15))
            .user_agent(concat!("ltth-launcher/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent }
    }

    /// `url`의 본문을 `dest`에 저장한다.
    pub fn download(&self, url: &str, dest: &Path) -> Result<DownloadResult> {
        tracing::info!("[Downloader] GET {} -> {}", url, dest.display());

        let response = match self.agent.get(url).call() {
            Ok(resp) => resp,
            Err(ureq::Error::Status(status, _)) => {
                tracing::warn!("[Downloader] {} answered HTTP {}", url, status);
                return Err(UpdaterError::HttpStatus {
                    url: url.to_string(),
                    status,
                });
            }
            Err(ureq::Error::Transport(t)) => {
                return Err(UpdaterError::Network {
                    url: url.to_string(),
                    message: t.to_string(),
                });
            }
        };

        // 압축 전송이면 Content-Length가 풀린 본문 길이와 다르다
        let expected_len = if response.header("Content-Encoding").is_some() {
            None
        } else {
            response
                .header("Content-Length")
                .and_then(|v| v.trim().parse::<u64>().ok())
        };

        let part_path = part_path_for(dest);
        let result = stream_to_file(url, response.into_reader(), &part_path, expected_len);

        let (size, sha256) = match result {
            Ok(done) => done,
            Err(e) => {
                // 미완성 파일은 남기지 않는다
                let _ = fs::remove_file(&part_path);
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&part_path, dest) {
            let _ = fs::remove_file(&part_path);
            return Err(UpdaterError::io("rename download", dest, e));
        }

        tracing::info!("[Downloader] Downloaded {} bytes (sha256 {})", size, sha256);
        Ok(DownloadResult {
            path: dest.to_path_buf(),
            size,
            sha256,
        })
    }
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}

fn part_path_for(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "download".into());
    name.push(".part");
    dest.with_file_name(name)
}

fn stream_to_file(
    url: &str,
    mut reader: impl Read,
    part_path: &Path,
    expected_len: Option<u64>,
) -> Result<(u64, String)> {
    let mut file =
        File::create(part_path).map_err(|e| UpdaterError::io("create download file", part_path, e))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut written: u64 = 0;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(UpdaterError::Network {
                    url: url.to_string(),
                    message: format!("body interrupted after {} bytes: {}", written, e),
                });
            }
        };
        file.write_all(&buf[..n])
            .map_err(|e| UpdaterError::io("write download file", part_path, e))?;
        hasher.update(&buf[..n]);
        written += n as u64;
    }

    if let Some(expected) = expected_len {
        if written != expected {
            return Err(UpdaterError::Network {
                url: url.to_string(),
                message: format!("body truncated: {} of {} bytes", written, expected),
            });
        }
    }

    file.sync_all()
        .map_err(|e| UpdaterError::io("sync download file", part_path, e))?;

    Ok((written, hex::encode(hasher.finalize())))
}

/// 파일의 SHA-256 (소문자 hex)
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| UpdaterError::io("open for hashing", path, e))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).map_err(|e| UpdaterError::io("hash file", path, e))?;
    Ok(hex::encode(hasher.finalize()))
}
