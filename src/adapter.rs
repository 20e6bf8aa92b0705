//! Engine Adapter.
//!
//! Everything in this crate that touches the filesystem or spawns a child
//! process lives here, kept separate from the KB Rewriter, Trace Parser,
//! and proof-tree modules, which only ever see in-memory strings and are
//! free of I/O.

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::Result;

const XPROBLOG_TAG: &str = "xproblog:";

/// The two streams an engine run produces: plain answer lines (one per
/// proved query, whitespace-collapsed) and `xproblog:`-tagged payload
/// lines (ready for [`crate::trace::parse_trace`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOutput {
    pub answers: Vec<String>,
    pub payload: Vec<String>,
}

/// List the regular files directly under `dir` that are eligible KB
/// source: not a backup or working file (name starting with `~`), not a
/// `.py` helper script, sorted lexicographically by file name.
pub fn list_kb_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            !name.starts_with('~') && !name.ends_with(".py")
        })
        .collect();
    files.sort();
    Ok(files)
}

/// If `path` exists, copy it to `path.bak` before it gets overwritten.
/// Returns whether a backup was made.
pub fn backup_if_present(path: &Path) -> std::io::Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    let mut bak = path.as_os_str().to_owned();
    bak.push(".bak");
    fs::copy(path, PathBuf::from(bak))?;
    Ok(true)
}

/// Spawn `command kb_path` as a child process and split its stdout into
/// answer lines and `xproblog:`-tagged payload lines. Terminates the
/// child once its stdout stream ends; never retries or imposes a timeout.
pub fn run_engine(command: &str, kb_path: &Path) -> Result<EngineOutput> {
    tracing::info!(command, kb_path = %kb_path.display(), "running inference engine");

    let mut child = Command::new(command)
        .arg(kb_path)
        .stdout(Stdio::piped())
        .spawn()?;

    let stdout = child.stdout.take().expect("piped stdout");
    let mut answers = Vec::new();
    let mut payload = Vec::new();
    for line in BufReader::new(stdout).lines() {
        let line = line?;
        if let Some(rest) = line.strip_prefix(XPROBLOG_TAG) {
            payload.push(rest.trim_end().to_string());
        } else {
            answers.push(line.chars().filter(|c| !c.is_whitespace()).collect());
        }
    }

    let _ = child.kill();
    let _ = child.wait();

    tracing::info!(
        answer_count = answers.len(),
        payload_line_count = payload.len(),
        "inference engine run complete"
    );
    Ok(EngineOutput { answers, payload })
}

/// Write `output` to `path` in the persisted-trace format: `problog:`
/// lines first, then `xproblog:` lines.
pub fn persist_trace(path: &Path, output: &EngineOutput) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    for line in &output.answers {
        writeln!(file, "problog:{line}")?;
    }
    for line in &output.payload {
        writeln!(file, "xproblog:{line}")?;
    }
    Ok(())
}

/// Reload a previously persisted trace, if `path` exists. Returns `Ok(None)`
/// rather than an error when the file is simply absent.
pub fn load_trace(path: &Path) -> std::io::Result<Option<EngineOutput>> {
    if !path.exists() {
        return Ok(None);
    }

    let mut answers = Vec::new();
    let mut payload = Vec::new();
    for line in fs::read_to_string(path)?.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("problog:") {
            answers.push(rest.to_string());
        } else if let Some(rest) = line.strip_prefix("xproblog:") {
            payload.push(rest.to_string());
        }
    }
    Ok(Some(EngineOutput { answers, payload }))
}

/// Extract the query predicate from an answer line, which the engine
/// formats as `query:probability`.
pub fn query_from_answer(answer: &str) -> &str {
    answer.split(':').next().unwrap_or(answer)
}
