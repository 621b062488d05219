//! Companion executable discovery and streaming execution
//!
//! A job runs as a child process. Its stdout is forwarded line by line while
//! it runs; its stderr is kept and returned verbatim when it fails. The
//! optional [`CancelFlag`] is polled between lines and kills the child when set.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use mesh_denoise::CancelFlag;

/// Directory holding the companion executables, checked before anything else
pub const BIN_DIR_ENV: &str = "MESH_DENOISE_BIN";

/// How often a quiet child is checked for cancellation
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error(
        "Could not find '{name}'.\n\
        Options:\n\
        - Set MESH_DENOISE_BIN to the directory containing it\n\
        - Place it next to mesh-denoise\n\
        - Add it to PATH"
    )]
    ExecutableNotFound { name: String },

    #[error("Failed to start {}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed ({}): {}", exit_status(.code), .stderr.trim_end())]
    ProcessFailure {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Job cancelled")]
    Cancelled,
}

fn exit_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// Find `name`: the override directory (`--bin-dir` or [`BIN_DIR_ENV`]),
/// then the directory of the running executable, then `PATH`
pub fn find_executable(name: &str, bin_dir: Option<&Path>) -> Result<PathBuf, RunnerError> {
    let override_dir = bin_dir
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(BIN_DIR_ENV).map(PathBuf::from));
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    locate(name, override_dir.as_deref(), exe_dir.as_deref())
}

fn locate(
    name: &str,
    override_dir: Option<&Path>,
    exe_dir: Option<&Path>,
) -> Result<PathBuf, RunnerError> {
    let file_name = format!("{}{}", name, std::env::consts::EXE_SUFFIX);
    for dir in override_dir.into_iter().chain(exe_dir) {
        let candidate = dir.join(&file_name);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    which::which(name).map_err(|_| RunnerError::ExecutableNotFound {
        name: name.to_string(),
    })
}

/// Run `program` to completion, handing each stdout line to `on_line`
pub fn run_streaming<F>(
    program: &Path,
    args: &[String],
    cancel: Option<&CancelFlag>,
    mut on_line: F,
) -> Result<(), RunnerError>
where
    F: FnMut(&str),
{
    let name = program
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.display().to_string());
    tracing::debug!("Running {} {}", program.display(), args.join(" "));

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| RunnerError::Spawn {
            program: program.to_path_buf(),
            source,
        })?;

    let (tx, rx) = mpsc::channel::<String>();
    if let Some(stdout) = child.stdout.take() {
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines().map_while(Result::ok) {
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
    }
    let stderr_reader = child.stderr.take().map(|mut stderr| {
        thread::spawn(move || {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf);
            buf
        })
    });

    loop {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(line) => on_line(&line),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        if cancel.is_some_and(CancelFlag::is_cancelled) {
            tracing::warn!("Cancelling {}", name);
            let _ = child.kill();
            let _ = child.wait();
            return Err(RunnerError::Cancelled);
        }
    }

    let status = child.wait().map_err(|source| RunnerError::Spawn {
        program: program.to_path_buf(),
        source,
    })?;
    let stderr = stderr_reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();

    if !status.success() {
        return Err(RunnerError::ProcessFailure {
            program: name,
            code: status.code(),
            stderr,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_locate_prefers_override_dir() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        let file_name = format!("denoise-tool{}", std::env::consts::EXE_SUFFIX);
        std::fs::write(first.path().join(&file_name), b"").unwrap();
        std::fs::write(second.path().join(&file_name), b"").unwrap();

        let found = locate("denoise-tool", Some(first.path()), Some(second.path())).unwrap();
        assert_eq!(found, first.path().join(&file_name));

        let found = locate("denoise-tool", None, Some(second.path())).unwrap();
        assert_eq!(found, second.path().join(&file_name));
    }

    #[test]
    fn test_locate_missing() {
        let empty = tempdir().unwrap();
        let err = locate("no-such-denoiser-executable", Some(empty.path()), None).unwrap_err();
        assert!(matches!(err, RunnerError::ExecutableNotFound { .. }));
        assert!(err.to_string().contains(BIN_DIR_ENV));
    }

    #[cfg(unix)]
    fn sh(script: &str) -> (PathBuf, Vec<String>) {
        (PathBuf::from("/bin/sh"), vec!["-c".to_string(), script.to_string()])
    }

    #[cfg(unix)]
    #[test]
    fn test_streams_stdout_lines() {
        let (program, args) = sh("echo one; echo two; echo three");
        let mut lines = Vec::new();
        run_streaming(&program, &args, None, |line| {
            lines.push(line.to_string())
        })
        .unwrap();
        assert_eq!(lines, vec!["one", "two", "three"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_carries_stderr() {
        let (program, args) = sh("echo working; echo 'invalid window size' >&2; exit 3");
        let err = run_streaming(&program, &args, None, |_| {}).unwrap_err();
        match err {
            RunnerError::ProcessFailure { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "invalid window size\n");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_cancel_kills_child() {
        let (program, args) = sh("echo started; exec sleep 30");
        let cancel = CancelFlag::new();
        let flag = cancel.clone();
        let started = std::time::Instant::now();
        let err = run_streaming(&program, &args, Some(&cancel), |_| flag.cancel()).unwrap_err();
        assert!(matches!(err, RunnerError::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_spawn_error() {
        let err = run_streaming(
            Path::new("/definitely/not/a/denoiser"),
            &[],
            None,
            |_| {},
        )
        .unwrap_err();
        assert!(matches!(err, RunnerError::Spawn { .. }));
    }
}
