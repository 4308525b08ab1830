//! ═══════════════════════════════════════════════════════════════════
//! 런처 통합 테스트
//! ═══════════════════════════════════════════════════════════════════
//!
//! 로컬 axum 서버를 매니페스트/패키지 원본으로 사용해 전체 흐름을 검증합니다:
//!
//! 1. **업데이트 확인**: 정상 매니페스트, 서버 오류, 손상된 본문
//! 2. **설치 / 업그레이드**: 버전 디렉터리, 이력 추가, 상태 영속화, 스크래치 정리
//! 3. **이력 상한**: 설치를 반복해도 이전 버전은 5개까지만 유지
//! 4. **롤백**: A, B, C 설치 후 B, A 순서로 복귀
//! 5. **실패 경로**: 404 패키지, zip-slip 패키지, 해시 불일치, 백업 실패
//! 6. **IPC API**: 토큰 인증과 `/api/launcher/*` 라우트
//!
//! 코어는 블로킹이므로 `spawn_blocking` 안에서 호출합니다.
//! 모든 테스트는 `tempdir`을 사용해 파일시스템을 격리합니다.

use axum::extract::Path as AxumPath;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use sha2::{Digest, Sha256};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use ltth_launcher::config::LauncherConfig;
use ltth_launcher::ipc::{launcher_router, TOKEN_HEADER};
use ltth_launcher::service::LauncherService;
use ltth_launcher::updater::{
    InstallManager, InstallPhase, InstallationState, OsIntegration, StateStore, UpdateSources,
    HISTORY_LIMIT,
};

// ═══════════════════════════════════════════════════════
// 테스트 유틸리티
// ═══════════════════════════════════════════════════════

/// 파일 이름 → 내용 목록을 zip으로 패킹
fn create_package(files: &[(&str, &[u8])]) -> Vec<u8> {
    let buf = std::io::Cursor::new(Vec::new());
    let mut zip_writer = zip::ZipWriter::new(buf);
    let options = zip::write::FileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);

    for (name, content) in files {
        zip_writer.start_file(*name, options).unwrap();
        zip_writer.write_all(content).unwrap();
    }

    zip_writer.finish().unwrap().into_inner()
}

fn app_package(version: &str) -> Vec<u8> {
    let html = format!("<html><body>LTTH {}</body></html>", version);
    create_package(&[
        ("index.html", html.as_bytes()),
        ("assets/app.js", b"console.log('ltth')"),
    ])
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn manifest_json(latest: &str, checksums: &[(&str, String)]) -> String {
    let sums: serde_json::Map<String, Value> = checksums
        .iter()
        .map(|(v, s)| (v.to_string(), json!(s)))
        .collect();
    json!({
        "version": latest,
        "releaseDate": "2026-01-20",
        "status": "stable",
        "changelog": {
            latest: { "date": "2026-01-20", "changes": ["New overlay", "TTS fixes"] },
            "0.0.1": { "date": "2025-01-01", "changes": ["Initial"] }
        },
        "checksums": sums,
    })
    .to_string()
}

/// 로컬 모킹 서버 시작
/// - `GET /files/:name` : `files`에 있으면 200, 없으면 404
/// - `GET /status/:code`: 지정한 상태 코드로 응답
async fn start_mock_server(files: HashMap<String, Vec<u8>>) -> SocketAddr {
    let files = Arc::new(files);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new()
        .route(
            "/files/:name",
            get({
                let files = files.clone();
                move |AxumPath(name): AxumPath<String>| {
                    let files = files.clone();
                    async move {
                        match files.get(&name) {
                            Some(data) => (StatusCode::OK, data.clone()),
                            None => (StatusCode::NOT_FOUND, b"Not Found".to_vec()),
                        }
                    }
                }
            }),
        )
        .route(
            "/status/:code",
            get(|AxumPath(code): AxumPath<u16>| async move {
                (
                    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                    "mock failure",
                )
            }),
        );

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn sources_for(addr: SocketAddr) -> UpdateSources {
    UpdateSources {
        manifest_url: format!("http://{}/files/version.json", addr),
        package_url_template: format!("http://{}/files/ltth_{{version}}.zip", addr),
        require_checksum: false,
        backup_retention: 5,
    }
}

/// 테스트 환경: 설치/설정 경로와 상태 파일 모두 tempdir 아래
struct Env {
    _tmp: TempDir,
    root: PathBuf,
    state: InstallationState,
    manager: InstallManager,
}

impl Env {
    fn new(sources: UpdateSources) -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().to_path_buf();
        let config_dir = root.join("config");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join("settings.json"), r#"{"volume": 3}"#).unwrap();

        let state = InstallationState {
            install_path: root.join("versions").to_string_lossy().to_string(),
            config_path: config_dir.to_string_lossy().to_string(),
            ..InstallationState::default()
        };
        let store = StateStore::new(root.join("state").join("config.json"));
        let manager = InstallManager::new(sources, store, &state);
        Self {
            _tmp: tmp,
            root,
            state,
            manager,
        }
    }

    fn install_root(&self) -> PathBuf {
        PathBuf::from(&self.state.install_path)
    }

    fn persisted(&self) -> InstallationState {
        self.manager.store().load()
    }
}

async fn blocking<T, F>(f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.unwrap()
}

fn hidden_entries(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .flatten()
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|n| n.starts_with('.'))
        .collect()
}

fn standard_files(latest: &str, versions: &[&str]) -> HashMap<String, Vec<u8>> {
    let mut files = HashMap::new();
    files.insert("version.json".to_string(), manifest_json(latest, &[]).into_bytes());
    for v in versions {
        files.insert(format!("ltth_{}.zip", v), app_package(v));
    }
    files
}

// ═══════════════════════════════════════════════════════
// 1. 업데이트 확인
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_check_reports_update_and_changelog() {
    let addr = start_mock_server(standard_files("1.1.0", &[])).await;
    let mut env = Env::new(sources_for(addr));
    env.state.last_version = "1.0.0".to_string();

    let (env, report) = blocking(move || {
        let mut env = env;
        let report = env.manager.check_for_update(&env.state);
        (env, report)
    })
    .await;

    assert!(report.success, "report: {:?}", report);
    assert_eq!(report.current_version, "1.0.0");
    assert_eq!(report.latest_version, "1.1.0");
    assert!(report.update_available);
    assert_eq!(report.changelog, vec!["New overlay", "TTS fixes"]);
    assert_eq!(report.release_date, "2026-01-20");
    assert_eq!(report.status, "stable");
    assert_eq!(env.manager.phase(), InstallPhase::UpdateAvailable);
}

#[tokio::test]
async fn test_check_up_to_date_and_fresh_install() {
    let addr = start_mock_server(standard_files("1.1.0", &[])).await;
    let mut env = Env::new(sources_for(addr));

    let (mut env, fresh) = blocking(move || {
        let report = env.manager.check_for_update(&env.state);
        (env, report)
    })
    .await;
    // 아무것도 설치되지 않았으면 항상 업데이트 대상
    assert!(fresh.update_available);
    assert_eq!(fresh.current_version, "");

    env.state.last_version = "1.1.0".to_string();
    let (_env, same) = blocking(move || {
        let mut env = env;
        let report = env.manager.check_for_update(&env.state);
        (env, report)
    })
    .await;
    assert!(same.success);
    assert!(!same.update_available);
}

#[tokio::test]
async fn test_check_failures_become_failed_reports() {
    let mut files = HashMap::new();
    files.insert("garbage.json".to_string(), b"<html>oops</html>".to_vec());
    files.insert("latest.json".to_string(), br#"{"version":"latest"}"#.to_vec());
    // ureq의 into_string 한도(10 MiB)를 넘는 본문
    files.insert("huge.json".to_string(), vec![b' '; 10 * 1024 * 1024 + 16]);
    let addr = start_mock_server(files).await;

    for (url, code) in [
        (format!("http://{}/status/500", addr), "MANIFEST_PARSE_ERROR"),
        (format!("http://{}/files/garbage.json", addr), "MANIFEST_PARSE_ERROR"),
        (format!("http://{}/files/latest.json", addr), "MANIFEST_PARSE_ERROR"),
        (format!("http://{}/files/huge.json", addr), "MANIFEST_PARSE_ERROR"),
        ("http://127.0.0.1:1/version.json".to_string(), "NETWORK_ERROR"),
    ] {
        let sources = UpdateSources {
            manifest_url: url.clone(),
            ..sources_for(addr)
        };
        let env = Env::new(sources);
        let report = blocking(move || {
            let mut env = env;
            env.manager.check_for_update(&env.state)
        })
        .await;
        assert!(!report.success, "{} should fail", url);
        assert_eq!(report.error_code.as_deref(), Some(code), "{}", url);
        assert!(!report.update_available);
    }
}

// ═══════════════════════════════════════════════════════
// 2~4. 설치 / 이력 / 롤백
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_install_and_upgrade_records_history() {
    let addr = start_mock_server(standard_files("1.1.0", &["1.0.0", "1.1.0"])).await;
    let env = Env::new(sources_for(addr));

    let env = blocking(move || {
        let mut env = env;
        env.manager.install_version(&mut env.state, "1.0.0").unwrap();
        assert_eq!(env.state.last_version, "1.0.0");
        assert!(env.state.previous_versions.is_empty());

        env.manager.install_version(&mut env.state, "1.1.0").unwrap();
        env
    })
    .await;

    assert_eq!(env.state.last_version, "1.1.0");
    assert_eq!(env.state.previous_versions, vec!["1.0.0"]);
    assert_eq!(env.manager.phase(), InstallPhase::Installed);
    assert_eq!(env.persisted(), env.state);

    let v2 = env.install_root().join("1.1.0");
    assert!(std::fs::read_to_string(v2.join("index.html")).unwrap().contains("LTTH 1.1.0"));
    assert!(v2.join("assets").join("app.js").is_file());
    assert!(env.install_root().join("1.0.0").join("index.html").is_file());

    // 스크래치 디렉터리 정리
    assert!(hidden_entries(&env.install_root()).is_empty());

    // 설치마다 설정 백업
    let backups = env.root.join("config").join(".backup");
    let backup_dirs: Vec<_> = std::fs::read_dir(&backups).unwrap().flatten().collect();
    assert_eq!(backup_dirs.len(), 2);
    assert!(backup_dirs[0].path().join("settings.json").is_file());
}

#[tokio::test]
async fn test_history_never_exceeds_limit() {
    let versions = ["1.0.0", "1.0.1", "1.0.2", "1.0.3", "1.0.4", "1.0.5", "1.0.6"];
    let addr = start_mock_server(standard_files("1.0.6", &versions)).await;
    let env = Env::new(sources_for(addr));

    let env = blocking(move || {
        let mut env = env;
        for v in versions {
            env.manager.install_version(&mut env.state, v).unwrap();
            assert!(env.state.previous_versions.len() <= HISTORY_LIMIT);
        }
        // 같은 버전 재설치는 이력에 추가하지 않는다
        env.manager.install_version(&mut env.state, "1.0.6").unwrap();
        env
    })
    .await;

    assert_eq!(env.state.last_version, "1.0.6");
    assert_eq!(
        env.state.previous_versions,
        vec!["1.0.1", "1.0.2", "1.0.3", "1.0.4", "1.0.5"]
    );
    assert_eq!(env.persisted().previous_versions.len(), HISTORY_LIMIT);
}

#[tokio::test]
async fn test_rollback_after_three_installs() {
    let addr = start_mock_server(standard_files("3.0.0", &["1.0.0", "2.0.0", "3.0.0"])).await;
    let env = Env::new(sources_for(addr));

    let env = blocking(move || {
        let mut env = env;
        for v in ["1.0.0", "2.0.0", "3.0.0"] {
            env.manager.install_version(&mut env.state, v).unwrap();
        }

        assert_eq!(env.manager.rollback(&mut env.state).unwrap(), "2.0.0");
        assert_eq!(env.state.previous_versions, vec!["1.0.0"]);
        assert_eq!(env.manager.rollback(&mut env.state).unwrap(), "1.0.0");
        assert!(env.state.previous_versions.is_empty());

        let err = env.manager.rollback(&mut env.state).unwrap_err();
        assert_eq!(err.error_code(), "NO_HISTORY");
        env
    })
    .await;

    assert_eq!(env.state.last_version, "1.0.0");
    assert_eq!(env.manager.phase(), InstallPhase::RolledBack);
    assert_eq!(env.persisted(), env.state);
    // 롤백은 파일을 지우지 않는다
    assert!(env.install_root().join("3.0.0").is_dir());
}

// ═══════════════════════════════════════════════════════
// 5. 실패 경로
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_missing_package_is_download_error() {
    let addr = start_mock_server(standard_files("1.1.0", &["1.0.0"])).await;
    let env = Env::new(sources_for(addr));

    let env = blocking(move || {
        let mut env = env;
        env.manager.install_version(&mut env.state, "1.0.0").unwrap();

        let err = env.manager.install_version(&mut env.state, "1.1.0").unwrap_err();
        assert_eq!(err.error_code(), "DOWNLOAD_ERROR");
        assert_eq!(err.root_cause().error_code(), "HTTP_STATUS_ERROR");
        assert!(!err.is_retryable());
        env
    })
    .await;

    assert_eq!(env.state.last_version, "1.0.0");
    assert!(env.state.previous_versions.is_empty());
    assert_eq!(env.persisted().last_version, "1.0.0");
    assert!(!env.install_root().join("1.1.0").exists());
    assert!(hidden_entries(&env.install_root()).is_empty());
}

#[tokio::test]
async fn test_zip_slip_package_is_rejected() {
    let mut files = standard_files("6.6.6", &[]);
    files.insert(
        "ltth_6.6.6.zip".to_string(),
        create_package(&[
            ("index.html", b"<html></html>"),
            ("../../evil.txt", b"pwned"),
        ]),
    );
    let addr = start_mock_server(files).await;
    let env = Env::new(sources_for(addr));

    let env = blocking(move || {
        let mut env = env;
        let err = env.manager.install_version(&mut env.state, "6.6.6").unwrap_err();
        assert_eq!(err.error_code(), "EXTRACTION_ERROR");
        assert_eq!(err.root_cause().error_code(), "PATH_TRAVERSAL");
        env
    })
    .await;

    assert!(env.state.last_version.is_empty());
    assert!(!env.root.join("evil.txt").exists());
    assert!(!env.install_root().join("evil.txt").exists());
    assert!(!env.install_root().join("6.6.6").join("index.html").exists());
    assert!(hidden_entries(&env.install_root()).is_empty());
}

#[tokio::test]
async fn test_checksum_is_verified_before_extraction() {
    let good = app_package("2.0.0");
    let mut files = HashMap::new();
    files.insert(
        "version.json".to_string(),
        manifest_json(
            "2.0.0",
            &[
                ("2.0.0", sha256_hex(&good).to_uppercase()),
                ("1.9.0", "00".repeat(32)),
            ],
        )
        .into_bytes(),
    );
    files.insert("ltth_2.0.0.zip".to_string(), good);
    files.insert("ltth_1.9.0.zip".to_string(), app_package("1.9.0"));
    files.insert("ltth_1.8.0.zip".to_string(), app_package("1.8.0"));
    let addr = start_mock_server(files).await;

    let env = Env::new(UpdateSources {
        require_checksum: true,
        ..sources_for(addr)
    });

    let env = blocking(move || {
        let mut env = env;
        assert!(env.manager.check_for_update(&env.state).success);

        // 해시 불일치
        let err = env.manager.install_version(&mut env.state, "1.9.0").unwrap_err();
        assert_eq!(err.root_cause().error_code(), "INTEGRITY_ERROR");
        assert!(!env.install_root().join("1.9.0").exists());

        // 해시 미공개 + require_checksum
        let err = env.manager.install_version(&mut env.state, "1.8.0").unwrap_err();
        assert_eq!(err.error_code(), "DOWNLOAD_ERROR");
        assert_eq!(err.root_cause().error_code(), "INTEGRITY_ERROR");

        // 대소문자 무관하게 일치
        env.manager.install_version(&mut env.state, "2.0.0").unwrap();
        env
    })
    .await;

    assert_eq!(env.state.last_version, "2.0.0");
}

#[tokio::test]
async fn test_checksum_is_verified_without_prior_check() {
    let mut files = HashMap::new();
    files.insert(
        "version.json".to_string(),
        manifest_json("2.0.0", &[("2.0.0", "00".repeat(32))]).into_bytes(),
    );
    files.insert("ltth_2.0.0.zip".to_string(), app_package("2.0.0"));
    let addr = start_mock_server(files).await;
    let env = Env::new(sources_for(addr));

    // check_for_update 없이 바로 설치해도 공개된 해시로 검증한다
    let env = blocking(move || {
        let mut env = env;
        let err = env.manager.install_version(&mut env.state, "2.0.0").unwrap_err();
        assert_eq!(err.error_code(), "DOWNLOAD_ERROR");
        assert_eq!(err.root_cause().error_code(), "INTEGRITY_ERROR");
        env
    })
    .await;

    assert!(env.state.last_version.is_empty());
    assert!(!env.install_root().join("2.0.0").exists());
}

#[tokio::test]
async fn test_required_checksum_fetches_manifest_on_install() {
    let package = app_package("2.1.0");
    let mut files = HashMap::new();
    files.insert(
        "version.json".to_string(),
        manifest_json("2.1.0", &[("2.1.0", sha256_hex(&package))]).into_bytes(),
    );
    files.insert("ltth_2.1.0.zip".to_string(), package);
    let addr = start_mock_server(files).await;

    let env = Env::new(UpdateSources {
        require_checksum: true,
        ..sources_for(addr)
    });
    let env = blocking(move || {
        let mut env = env;
        env.manager.install_version(&mut env.state, "2.1.0").unwrap();
        env
    })
    .await;
    assert_eq!(env.state.last_version, "2.1.0");
    assert!(env.manager.cached_manifest().is_some());

    // 매니페스트를 가져올 수 없으면 필수 검증은 실패한다
    let env = Env::new(UpdateSources {
        manifest_url: format!("http://{}/status/503", addr),
        require_checksum: true,
        ..sources_for(addr)
    });
    let env = blocking(move || {
        let mut env = env;
        let err = env.manager.install_version(&mut env.state, "2.1.0").unwrap_err();
        assert_eq!(err.error_code(), "DOWNLOAD_ERROR");
        assert_eq!(err.root_cause().error_code(), "MANIFEST_PARSE_ERROR");
        env
    })
    .await;
    assert!(env.state.last_version.is_empty());
    assert!(!env.install_root().join("2.1.0").exists());
}

#[tokio::test]
async fn test_backup_failure_does_not_block_install() {
    let addr = start_mock_server(standard_files("1.0.0", &["1.0.0"])).await;
    let env = Env::new(sources_for(addr));
    // 백업 디렉터리 자리에 일반 파일이 있으면 백업은 실패한다
    let backup_blocker = env.root.join("config").join(".backup");
    std::fs::write(&backup_blocker, "not a directory").unwrap();

    let env = blocking(move || {
        let mut env = env;
        env.manager.install_version(&mut env.state, "1.0.0").unwrap();
        env
    })
    .await;

    assert_eq!(env.state.last_version, "1.0.0");
    assert!(env.install_root().join("1.0.0").join("index.html").is_file());
    assert!(backup_blocker.is_file());
}

// ═══════════════════════════════════════════════════════
// 6. IPC API (Axum tower::ServiceExt)
// ═══════════════════════════════════════════════════════

#[derive(Default)]
struct NoopOs;

impl OsIntegration for NoopOs {
    fn open_document(&self, _: &Path) -> std::io::Result<()> {
        Ok(())
    }
    fn run_script(&self, _: &str, _: &Path, _: &Path) -> std::io::Result<()> {
        Ok(())
    }
    fn open_directory(&self, _: &Path) -> std::io::Result<()> {
        Ok(())
    }
}

async fn send(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    use axum::body::Body;
    use tower::ServiceExt;

    let mut req = axum::http::Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(TOKEN_HEADER, token);
    }
    let req = match body {
        Some(body) => req
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 64).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_ipc_requires_token() {
    let tmp = TempDir::new().unwrap();
    let service = LauncherService::new(
        &LauncherConfig::default(),
        StateStore::new(tmp.path().join("config.json")),
        Arc::new(NoopOs),
        tmp.path().join("logs"),
    );
    let token = Arc::new("secret-token".to_string());
    let app = launcher_router(Arc::new(tokio::sync::Mutex::new(service)), Some(token));

    let (status, _) = send(&app, "GET", "/api/launcher/config", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/launcher/config", Some("wrong"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, json) = send(&app, "GET", "/api/launcher/config", Some("secret-token"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["config"]["language"], "de");
}

#[tokio::test]
async fn test_ipc_install_flow() {
    let addr = start_mock_server(standard_files("1.1.0", &["1.0.0", "1.1.0"])).await;
    let tmp = TempDir::new().unwrap();
    let config = LauncherConfig {
        sources: sources_for(addr),
        ..LauncherConfig::default()
    };
    let service = LauncherService::new(
        &config,
        StateStore::new(tmp.path().join("state").join("config.json")),
        Arc::new(NoopOs),
        tmp.path().join("logs"),
    );
    let app = launcher_router(Arc::new(tokio::sync::Mutex::new(service)), None);

    // 경로 미설정 상태에서 설치 → 설정 오류
    let (_, json) = send(&app, "POST", "/api/launcher/install", None, Some(json!({ "version": "1.0.0" }))).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["errorCode"], "CONFIGURATION_ERROR");

    let (_, json) = send(&app, "GET", "/api/launcher/paths", None, None).await;
    assert_eq!(json["success"], true);
    assert!(json["installPath"].as_str().unwrap().ends_with("versions"));

    let patch = json!({
        "installPath": tmp.path().join("versions"),
        "configPath": tmp.path().join("config"),
        "isFirstRun": false,
    });
    let (status, json) = send(&app, "PUT", "/api/launcher/config", None, Some(patch)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let (_, json) = send(&app, "POST", "/api/launcher/check", None, None).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["updateAvailable"], true);
    assert_eq!(json["latestVersion"], "1.1.0");

    for v in ["1.0.0", "1.1.0"] {
        let (_, json) = send(&app, "POST", "/api/launcher/install", None, Some(json!({ "version": v }))).await;
        assert_eq!(json["success"], true, "install {}: {}", v, json);
        assert_eq!(json["version"], v);
    }

    let (_, json) = send(&app, "GET", "/api/launcher/versions", None, None).await;
    assert_eq!(json["versions"], json!(["1.1.0", "1.0.0"]));
    assert_eq!(json["active"], "1.1.0");

    let (_, json) = send(&app, "POST", "/api/launcher/launch", None, None).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["target"]["kind"], "document");

    let (_, json) = send(&app, "POST", "/api/launcher/rollback", None, None).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["version"], "1.0.0");

    let (_, json) = send(&app, "POST", "/api/launcher/rollback", None, None).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["errorCode"], "NO_HISTORY");

    let (_, json) = send(&app, "GET", "/api/launcher/config", None, None).await;
    assert_eq!(json["config"]["lastVersion"], "1.0.0");
    assert_eq!(json["config"]["isFirstRun"], false);
    assert_eq!(json["phase"], "rolledBack");
}
