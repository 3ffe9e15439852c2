use std::io::{BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("cannot find {program} under {}", .root.display())]
    NotFound { program: String, root: PathBuf },
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error while running {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {}: {stderr}", describe_exit(.code))]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Run a one-shot tool to completion and return its stdout.
///
/// Stderr is captured, logged line by line and attached to the error when
/// the tool exits with a nonzero status.
pub fn run_checked(program: &str, command: &mut Command) -> Result<Vec<u8>, ProcessError> {
    run_with_input(program, command, None)
}

/// Like [`run_checked`], feeding `input` to the tool's stdin.
///
/// Stdin is written from a separate thread so a tool that produces output
/// before consuming all input cannot deadlock against us.
pub fn run_with_input(
    program: &str,
    command: &mut Command,
    input: Option<Vec<u8>>,
) -> Result<Vec<u8>, ProcessError> {
    log::debug!("Running {program}: {command:?}");
    let mut child = command
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ProcessError::Spawn {
            program: program.to_string(),
            source: e,
        })?;

    let feeder = match (input, child.stdin.take()) {
        (Some(bytes), Some(mut stdin)) => Some(thread::spawn(move || stdin.write_all(&bytes))),
        _ => None,
    };

    let output = child.wait_with_output().map_err(|e| ProcessError::Io {
        program: program.to_string(),
        source: e,
    })?;

    if let Some(feeder) = feeder {
        // A tool that exits early closes the pipe; its exit status says why.
        if let Ok(Err(e)) = feeder.join() {
            log::debug!("{program} did not consume all input: {e}");
        }
    }

    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
        log::info!("{program}: {line}");
    }

    if !output.status.success() {
        return Err(ProcessError::NonZeroExit {
            program: program.to_string(),
            code: output.status.code(),
            stderr,
        });
    }
    Ok(output.stdout)
}

/// Forward a long-lived child's diagnostic stream to the log, one line per
/// record, until the stream closes.
pub fn forward_lines<R>(program: &str, stream: R) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    let program = program.to_string();
    thread::spawn(move || {
        for line in BufReader::new(stream).lines() {
            match line {
                Ok(line) if line.trim().is_empty() => {}
                Ok(line) => log::info!("{program}: {line}"),
                Err(e) => {
                    log::debug!("{program}: diagnostic stream closed: {e}");
                    break;
                }
            }
        }
    })
}
