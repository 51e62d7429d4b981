use std::path::PathBuf;
use std::process::{Command, ExitStatus};

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_svfs"))
}

pub fn run_svfs(args: &[&str]) -> CmdResult {
    let output = Command::new(bin_path())
        .args(args)
        .env("RUST_BACKTRACE", "1")
        .output()
        .expect("execute svfs command");

    CmdResult {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}
