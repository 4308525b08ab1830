//! 런처 IPC API: `/api/launcher/*`
//!
//! 외부 UI 셸이 로컬 HTTP로 런처 연산을 호출합니다.
//!
//! ## 엔드포인트
//! - `GET  /api/launcher/config`   : 상태 조회
//! - `PUT  /api/launcher/config`   : 부분 설정 변경 (`ConfigPatch`)
//! - `GET  /api/launcher/paths`    : 플랫폼 기본 경로
//! - `POST /api/launcher/check`    : 업데이트 확인
//! - `POST /api/launcher/install`  : `{ "version": "1.2.0" }` 설치
//! - `POST /api/launcher/rollback` : 직전 버전으로 롤백
//! - `POST /api/launcher/launch`   : 활성 버전 실행
//! - `GET  /api/launcher/versions` : 설치된 버전 목록
//! - `POST /api/launcher/logs`     : 로그 폴더 열기
//!
//! 서비스는 하나의 `Mutex` 뒤에 있으며 핸들러는 소유 가드를 `spawn_blocking`으로
//! 넘기므로, 설치/롤백은 항상 하나씩만 실행됩니다.
//! 모든 요청은 `X-Launcher-Token` 헤더가 시작 시 발급한 토큰과 일치해야 합니다.

use anyhow::Result;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use ltth_updater_lib::ConfigPatch;

use crate::service::LauncherService;

pub const TOKEN_HEADER: &str = "X-Launcher-Token";

// ═══════════════════════════════════════════════════════
// 인증
// ═══════════════════════════════════════════════════════

/// 랜덤 토큰을 생성해서 파일에 저장 (Unix에서는 0600)
pub fn generate_and_save_token(path: &Path) -> Result<Arc<String>> {
    let token = uuid::Uuid::new_v4().to_string();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &token)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    tracing::info!("[IPC] Auth token saved to {}", path.display());
    Ok(Arc::new(token))
}

async fn auth_middleware(
    State(expected): State<Arc<String>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let provided = req
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if provided == expected.as_str() {
        Ok(next.run(req).await)
    } else {
        tracing::warn!("[IPC] Rejected unauthenticated request to {}", req.uri());
        Err(StatusCode::UNAUTHORIZED)
    }
}

// ═══════════════════════════════════════════════════════
// 라우터
// ═══════════════════════════════════════════════════════

#[derive(Clone)]
pub struct LauncherState {
    pub service: Arc<Mutex<LauncherService>>,
}

/// `/api/launcher/*` 라우터. `token`이 `None`이면 인증하지 않는다.
pub fn launcher_router(service: Arc<Mutex<LauncherService>>, token: Option<Arc<String>>) -> Router {
    let router = Router::new()
        .route("/api/launcher/config", get(get_config).put(save_config))
        .route("/api/launcher/paths", get(default_paths))
        .route("/api/launcher/check", post(check_for_update))
        .route("/api/launcher/install", post(install_version))
        .route("/api/launcher/rollback", post(rollback))
        .route("/api/launcher/launch", post(launch_installed))
        .route("/api/launcher/versions", get(installed_versions))
        .route("/api/launcher/logs", post(open_logs))
        .with_state(LauncherState { service });

    let router = match token {
        Some(token) => router.layer(middleware::from_fn_with_state(token, auth_middleware)),
        None => router,
    };

    router.layer(
        tower::ServiceBuilder::new().layer(tower_http::trace::TraceLayer::new_for_http()),
    )
}

/// 로컬 주소에서 서버 실행
pub async fn serve(router: Router, listen_addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!("[IPC] Listening on http://{}", listen_addr);
    axum::serve(listener, router).await?;
    Ok(())
}

/// 서비스 잠금을 잡은 채 블로킹 스레드에서 연산 실행
async fn run_blocking<F>(state: &LauncherState, op: F) -> Json<Value>
where
    F: FnOnce(&mut LauncherService) -> Value + Send + 'static,
{
    let mut guard = state.service.clone().lock_owned().await;
    match tokio::task::spawn_blocking(move || op(&mut guard)).await {
        Ok(value) => Json(value),
        Err(e) => {
            tracing::error!("[IPC] Launcher operation aborted: {}", e);
            Json(json!({
                "success": false,
                "error": format!("operation aborted: {}", e),
                "errorCode": "INTERNAL_ERROR",
            }))
        }
    }
}

// ═══════════════════════════════════════════════════════
// 핸들러
// ═══════════════════════════════════════════════════════

async fn get_config(State(state): State<LauncherState>) -> Json<Value> {
    let svc = state.service.lock().await;
    Json(svc.get_config())
}

async fn save_config(State(state): State<LauncherState>, Json(patch): Json<ConfigPatch>) -> Json<Value> {
    run_blocking(&state, move |svc| svc.save_config(&patch)).await
}

async fn default_paths(State(state): State<LauncherState>) -> Json<Value> {
    let svc = state.service.lock().await;
    Json(svc.default_paths())
}

async fn check_for_update(State(state): State<LauncherState>) -> Json<Value> {
    run_blocking(&state, |svc| svc.check_for_update()).await
}

#[derive(Deserialize)]
struct InstallRequest {
    version: String,
}

async fn install_version(State(state): State<LauncherState>, Json(body): Json<InstallRequest>) -> Json<Value> {
    tracing::info!("[IPC] Install requested: {}", body.version);
    run_blocking(&state, move |svc| svc.install_version(&body.version)).await
}

async fn rollback(State(state): State<LauncherState>) -> Json<Value> {
    run_blocking(&state, |svc| svc.rollback()).await
}

async fn launch_installed(State(state): State<LauncherState>) -> Json<Value> {
    run_blocking(&state, |svc| svc.launch_installed()).await
}

async fn installed_versions(State(state): State<LauncherState>) -> Json<Value> {
    run_blocking(&state, |svc| svc.installed_versions()).await
}

async fn open_logs(State(state): State<LauncherState>) -> Json<Value> {
    run_blocking(&state, |svc| svc.open_logs()).await
}
