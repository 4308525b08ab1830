//! LTTH 런처
//!
//! ## 사용법
//! ```text
//! ltth-launcher                          # IPC 서버 실행 (serve와 동일)
//! ltth-launcher serve                    # IPC 서버 실행
//! ltth-launcher check [--json]           # 업데이트 확인
//! ltth-launcher install <version>        # 버전 설치
//! ltth-launcher rollback                 # 직전 버전으로 롤백
//! ltth-launcher launch                   # 활성 버전 실행
//! ltth-launcher versions                 # 설치된 버전 목록
//! ltth-launcher paths                    # 기본 경로 표시
//! ltth-launcher config                   # 설정 표시
//! ltth-launcher config set <key> <value> # 런처 설정 변경
//! ltth-launcher help                     # 도움말
//! ```
//!
//! 실패 시 종료 코드 1.

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

use ltth_launcher::config::{config_file_path, load_launcher_config, set_config_value, LauncherConfig};
use ltth_launcher::ipc;
use ltth_launcher::logging;
use ltth_launcher::os::SystemIntegration;
use ltth_launcher::paths;
use ltth_launcher::service::LauncherService;
use ltth_launcher::updater::StateStore;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args_ref: Vec<&str> = args.iter().map(|s| s.as_str()).collect();

    match args_ref.first().copied() {
        Some("help" | "--help" | "-h") => {
            print_help();
            return;
        }
        Some("--version" | "-V") => {
            println!("ltth-launcher {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        _ => {}
    }

    let log_dir = paths::log_dir();
    logging::init(&log_dir);

    if let Err(e) = run(&args_ref) {
        eprintln!("✗ Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: &[&str]) -> anyhow::Result<()> {
    let cfg = load_launcher_config()?;

    let command = args.first().copied().unwrap_or("serve");
    if command == "config" {
        return cmd_config(&cfg, &args[1..]);
    }

    let store = StateStore::new(paths::state_file_path());
    let mut service = LauncherService::new(
        &cfg,
        store,
        Arc::new(SystemIntegration),
        paths::log_dir(),
    );

    match command {
        "serve" => cmd_serve(&cfg, service),
        "check" => {
            let result = service.check_for_update();
            if args[1..].contains(&"--json") {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return exit_status(&result);
            }
            print_check(&result);
            exit_status(&result)
        }
        "install" => {
            let version: &str = args
                .get(1)
                .copied()
                .ok_or_else(|| anyhow::anyhow!("Usage: ltth-launcher install <version>"))?;
            let result = service.install_version(version);
            if result["success"] == true {
                println!("✓ Installed {}", result["version"].as_str().unwrap_or(version));
            }
            exit_status(&result)
        }
        "rollback" => {
            let result = service.rollback();
            if result["success"] == true {
                println!("✓ Rolled back to {}", result["version"].as_str().unwrap_or("?"));
            }
            exit_status(&result)
        }
        "launch" => {
            let result = service.launch_installed();
            if result["success"] == true {
                println!("✓ Launched {}", service.state().last_version);
            }
            exit_status(&result)
        }
        "versions" => {
            let result = service.installed_versions();
            let active = service.state().last_version.clone();
            let versions = result["versions"].as_array().cloned().unwrap_or_default();
            if versions.is_empty() {
                println!("No versions installed.");
            }
            for v in versions {
                let name = v.as_str().unwrap_or_default();
                let marker = if name == active { "*" } else { " " };
                println!("{} {}", marker, name);
            }
            Ok(())
        }
        "paths" => {
            let result = service.default_paths();
            println!("State file:   {}", paths::state_file_path().display());
            println!("Log dir:      {}", paths::log_dir().display());
            println!("Install path: {} (default {})", service.state().install_path, result["installPath"].as_str().unwrap_or_default());
            println!("Config path:  {} (default {})", service.state().config_path, result["configPath"].as_str().unwrap_or_default());
            Ok(())
        }
        other => {
            eprintln!("✗ Unknown command: {}", other);
            eprintln!("  Run 'ltth-launcher help' for usage.");
            std::process::exit(1);
        }
    }
}

/// 서비스 결과의 `success`를 종료 상태로 변환
fn exit_status(result: &Value) -> anyhow::Result<()> {
    if result["success"] == true {
        return Ok(());
    }
    let code = result["errorCode"].as_str().unwrap_or("ERROR");
    let message = result["error"].as_str().unwrap_or("unknown error");
    anyhow::bail!("{} ({})", message, code)
}

// ═══════════════════════════════════════════════════════
// 명령어 핸들러
// ═══════════════════════════════════════════════════════

fn cmd_serve(cfg: &LauncherConfig, service: LauncherService) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let token = ipc::generate_and_save_token(&paths::token_file_path())?;
        let service = Arc::new(Mutex::new(service));
        let router = ipc::launcher_router(service, Some(token));
        let addr = format!("127.0.0.1:{}", cfg.ipc_port);
        tracing::info!("LTTH launcher {} starting", env!("CARGO_PKG_VERSION"));
        ipc::serve(router, &addr).await
    })
}

fn print_check(result: &Value) {
    if result["success"] != true {
        return;
    }
    let current = result["currentVersion"].as_str().unwrap_or_default();
    let latest = result["latestVersion"].as_str().unwrap_or_default();
    let current_label = if current.is_empty() { "(none)" } else { current };

    if result["updateAvailable"] == true {
        println!("⬆ Update available: {} → {}", current_label, latest);
        let release_date = result["releaseDate"].as_str().unwrap_or_default();
        if !release_date.is_empty() {
            println!("  Released: {} [{}]", release_date, result["status"].as_str().unwrap_or_default());
        }
        if let Some(changes) = result["changelog"].as_array() {
            for change in changes {
                println!("  - {}", change.as_str().unwrap_or_default());
            }
        }
    } else {
        println!("✓ Up to date ({})", current_label);
    }
}

fn cmd_config(cfg: &LauncherConfig, args: &[&str]) -> anyhow::Result<()> {
    match args {
        ["set", key, value] => {
            let path = set_config_value(key, value)?;
            println!("✓ {} = {} ({})", key, value, path.display());
            Ok(())
        }
        [] => {
            println!("Config file: {}", config_file_path().display());
            println!("  manifest_url         = {}", cfg.sources.manifest_url);
            println!("  package_url_template = {}", cfg.sources.package_url_template);
            println!("  require_checksum     = {}", cfg.sources.require_checksum);
            println!("  backup_retention     = {}", cfg.sources.backup_retention);
            println!("  ipc_port             = {}", cfg.ipc_port);
            Ok(())
        }
        _ => anyhow::bail!("Usage: ltth-launcher config [set <key> <value>]"),
    }
}

fn print_help() {
    println!("ltth-launcher {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("USAGE:");
    println!("  ltth-launcher [command]");
    println!();
    println!("COMMANDS:");
    println!("  serve                    Run the local IPC server (default)");
    println!("  check [--json]           Check the manifest for a newer version");
    println!("  install <version>        Download and activate a version");
    println!("  rollback                 Reactivate the previous version");
    println!("  launch                   Start the active version");
    println!("  versions                 List installed versions");
    println!("  paths                    Show state, log and default install paths");
    println!("  config                   Show launcher settings");
    println!("  config set <key> <value> Change a launcher setting");
    println!("  help                     Show this help");
    println!();
    println!("ENVIRONMENT:");
    println!("  RUST_LOG                 Log filter (default: info)");
    println!("  LTTH_STATE_FILE          Override the state file location");
    println!("  LTTH_TOKEN_PATH          Override the IPC token file location");
}
