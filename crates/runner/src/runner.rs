//! Spawns the runner subprocess and streams its stdout into decoded frames
//! (§4.7, §5: "single reader task feeding an unbounded queue to the
//! parser").

use std::io::{BufRead, BufReader, Read};
use std::sync::mpsc;

use once_cell::sync::Lazy;
use regex::Regex;
use treb_events::{decode_frame, Frame};

use crate::cancel::CancelToken;
use crate::error::{Result, RunnerError};
use crate::invocation::Invocation;

static MISSING_LIBRARY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"BytecodeMissing\("([^"]+)"\)"#).unwrap());

#[derive(Debug, Default)]
pub struct RunOutcome {
    pub frames: Vec<Frame>,
    pub success: bool,
}

pub struct Runner;

impl Runner {
    pub fn new() -> Self {
        Self
    }

    /// Runs one invocation to completion (or cancellation). On cancel, any
    /// frame already decoded before the kill lands is still returned (§5).
    pub fn run(&self, invocation: Invocation, cancel: &CancelToken) -> Result<RunOutcome> {
        let mut command = invocation.into_command();
        let mut child = command.spawn()?;

        let stdout = child.stdout.take().expect("piped");
        let mut stderr = child.stderr.take().expect("piped");

        let (frame_tx, frame_rx) = mpsc::channel::<Frame>();
        let reader_handle = std::thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines().map_while(std::result::Result::ok) {
                if line.trim().is_empty() {
                    continue;
                }
                if let Ok(frame) = decode_frame(&line) {
                    if frame_tx.send(frame).is_err() {
                        break;
                    }
                }
            }
        });

        loop {
            if cancel.is_cancelled() {
                let _ = child.kill();
                break;
            }
            match child.try_wait()? {
                Some(_) => break,
                None => std::thread::sleep(std::time::Duration::from_millis(50)),
            }
        }

        let status = child.wait()?;
        let _ = reader_handle.join();
        let frames: Vec<Frame> = frame_rx.into_iter().collect();

        if !status.success() {
            let mut stderr_text = String::new();
            let _ = stderr.read_to_string(&mut stderr_text);
            let tail = tail_lines(&stderr_text, 20);

            if let Some(libs) = detect_missing_libraries(&tail) {
                return Err(RunnerError::MissingLibraries { libs });
            }
            return Err(RunnerError::Failed { status: status.code().unwrap_or(-1), stderr_tail: tail });
        }

        let success = frames.iter().any(|f| matches!(f, Frame::Summary(s) if s.success));
        Ok(RunOutcome { frames, success })
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

fn detect_missing_libraries(text: &str) -> Option<Vec<String>> {
    let libs: Vec<String> = MISSING_LIBRARY_RE.captures_iter(text).map(|c| c[1].to_string()).collect();
    if libs.is_empty() {
        None
    } else {
        Some(libs)
    }
}

fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_missing_library_signature() {
        let stderr = "Error: BytecodeMissing(\"src/Lib.sol:MathLib\")\n";
        let libs = detect_missing_libraries(stderr).unwrap();
        assert_eq!(libs, vec!["src/Lib.sol:MathLib".to_string()]);
    }

    #[test]
    fn no_missing_library_signature_returns_none() {
        assert!(detect_missing_libraries("Error: reverted").is_none());
    }

    #[test]
    fn tail_lines_keeps_only_last_n() {
        let text = (0..30).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let tail = tail_lines(&text, 5);
        assert_eq!(tail.lines().count(), 5);
        assert_eq!(tail.lines().last().unwrap(), "29");
    }
}
