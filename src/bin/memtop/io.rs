//! Input and output streams of the `memtop` commands.
//!
//! A missing path or `-` selects the standard stream.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, IsTerminal, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};

pub fn stderr_is_tty() -> bool {
    io::stderr().is_terminal()
}

pub fn stdin_is_tty() -> bool {
    io::stdin().is_terminal()
}

fn file_path(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| p.as_os_str() != "-")
}

/// Whether `path` reads from stdin.
pub fn reads_stdin(path: Option<&Path>) -> bool {
    file_path(path).is_none()
}

/// Short name of a stream for progress messages.
pub fn stream_name(path: Option<&Path>, standard: &'static str) -> String {
    match file_path(path) {
        Some(p) => p
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| p.display().to_string()),
        None => standard.to_string(),
    }
}

pub fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
    let Some(p) = file_path(path) else {
        return Ok(Box::new(BufReader::new(io::stdin().lock())));
    };
    let file =
        File::open(p).with_context(|| format!("Failed to open frame file: {}", p.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

pub fn create_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    let Some(p) = file_path(path) else {
        return Ok(Box::new(BufWriter::new(io::stdout().lock())));
    };
    let file = File::create(p)
        .with_context(|| format!("Failed to create report file: {}", p.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_selects_standard_stream() {
        assert!(reads_stdin(None));
        assert!(reads_stdin(Some(Path::new("-"))));
        assert!(!reads_stdin(Some(Path::new("frame.json"))));
    }

    #[test]
    fn stream_name_uses_file_name() {
        assert_eq!(stream_name(Some(Path::new("runs/frame.json")), "stdin"), "frame.json");
        assert_eq!(stream_name(Some(Path::new("-")), "stdout"), "stdout");
        assert_eq!(stream_name(None, "stdin"), "stdin");
    }

    #[test]
    fn missing_input_file_has_context() {
        let err = open_input(Some(Path::new("/nonexistent/frame.json"))).err().unwrap();
        assert!(err.to_string().contains("/nonexistent/frame.json"));
        assert!(err.downcast_ref::<io::Error>().is_some());
    }
}
