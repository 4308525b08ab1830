//! OS 연동 구현
//!
//! 기본 프로그램으로 문서 열기, 스크립트 런타임 실행, 폴더 열기를
//! `std::process::Command`로 수행합니다. 자식 프로세스는 기다리지 않고 분리합니다.

use std::path::Path;
use std::process::{Command, Stdio};

use ltth_updater_lib::OsIntegration;

/// Windows: 콘솔 창 없이 실행
#[cfg(target_os = "windows")]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

#[cfg(target_os = "windows")]
pub fn apply_creation_flags(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    cmd.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(target_os = "windows"))]
pub fn apply_creation_flags(_cmd: &mut Command) {}

/// `file:///C:/...` 형식 URL
fn file_url(path: &Path) -> String {
    let raw = path.display().to_string().replace('\\', "/");
    let trimmed = raw.trim_start_matches('/');
    format!("file:///{}", trimmed)
}

fn spawn_detached(mut cmd: Command) -> std::io::Result<()> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    cmd.spawn().map(|_| ())
}

#[derive(Debug, Clone, Default)]
pub struct SystemIntegration;

impl OsIntegration for SystemIntegration {
    fn open_document(&self, path: &Path) -> std::io::Result<()> {
        let url = file_url(path);
        tracing::debug!("[Launch] Opening {}", url);

        #[cfg(target_os = "windows")]
        let cmd = {
            let mut cmd = Command::new("cmd");
            cmd.args(["/c", "start", ""]).arg(&url);
            apply_creation_flags(&mut cmd);
            cmd
        };
        #[cfg(target_os = "macos")]
        let cmd = {
            let mut cmd = Command::new("open");
            cmd.arg(&url);
            cmd
        };
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        let cmd = {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(&url);
            cmd
        };

        spawn_detached(cmd)
    }

    fn run_script(&self, runtime: &str, script: &Path, working_dir: &Path) -> std::io::Result<()> {
        let mut cmd = Command::new(runtime);
        cmd.arg(script).current_dir(working_dir);
        apply_creation_flags(&mut cmd);
        spawn_detached(cmd)
    }

    fn open_directory(&self, path: &Path) -> std::io::Result<()> {
        #[cfg(target_os = "windows")]
        let program = "explorer";
        #[cfg(target_os = "macos")]
        let program = "open";
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        let program = "xdg-open";

        let mut cmd = Command::new(program);
        cmd.arg(path);
        spawn_detached(cmd)
    }
}
