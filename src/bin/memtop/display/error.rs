use std::io::{self, ErrorKind, Write};

use anyhow::Error;
use membrane_topology::IdentifyError;
use membrane_topology::io::Error as FrameIoError;

use crate::util::text::wrap;

const INNER: usize = 62;

/// Writes the error, its causes and any hints as a framed block on stderr.
pub fn print_error(err: &Error) {
    let mut out = Framed::new(io::stderr().lock());

    out.top();
    out.text("✗ Error", 2);
    out.rule();
    out.wrapped(&err.to_string(), 2);

    for cause in err.chain().skip(1) {
        out.rule();
        out.text("Caused by:", 2);
        out.wrapped(&cause.to_string(), 4);
    }

    let hints = hints_for(err);
    if !hints.is_empty() {
        out.rule();
        out.text("Hints:", 2);
        for hint in &hints {
            out.bullet(hint);
        }
    }

    out.bottom();
}

struct Framed<W: Write> {
    out: W,
}

impl<W: Write> Framed<W> {
    fn new(out: W) -> Self {
        Self { out }
    }

    fn top(&mut self) {
        let _ = writeln!(self.out, "\n   ┏{}┓", "━".repeat(INNER));
    }

    fn rule(&mut self) {
        let _ = writeln!(self.out, "   ┠{}┨", "─".repeat(INNER));
    }

    fn bottom(&mut self) {
        let _ = writeln!(self.out, "   ┗{}┛\n", "━".repeat(INNER));
    }

    fn text(&mut self, line: &str, indent: usize) {
        let width = INNER - indent - 1;
        let _ = writeln!(self.out, "   ┃{}{line:<width$} ┃", " ".repeat(indent));
    }

    fn wrapped(&mut self, text: &str, indent: usize) {
        for line in wrap(text, INNER - indent - 1) {
            self.text(&line, indent);
        }
    }

    fn bullet(&mut self, hint: &str) {
        for (i, line) in wrap(hint, INNER - 7).iter().enumerate() {
            let marker = if i == 0 { "• " } else { "  " };
            self.text(&format!("{marker}{line}"), 4);
        }
    }
}

/// Hints for every typed error in the chain, or text-based guesses when
/// the chain holds none.
fn hints_for(err: &Error) -> Vec<String> {
    let mut hints = Vec::new();
    let mut typed = false;

    for cause in err.chain() {
        if let Some(frame_err) = cause.downcast_ref::<FrameIoError>() {
            typed = true;
            frame_io_hints(frame_err, &mut hints);
        } else if let Some(identify_err) = cause.downcast_ref::<IdentifyError>() {
            typed = true;
            identify_hints(identify_err, &mut hints);
        } else if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            typed = true;
            std_io_hints(io_err, &mut hints);
        }
        if typed {
            break;
        }
    }

    if !typed {
        fallback_hints(err, &mut hints);
    }
    hints
}

fn frame_io_hints(err: &FrameIoError, hints: &mut Vec<String>) {
    match err {
        FrameIoError::Io { source } => std_io_hints(source, hints),
        FrameIoError::Json { source } => {
            hints.push(format!(
                "JSON parser stopped at line {}, column {}",
                source.line(),
                source.column()
            ));
            hints.push("A frame needs a \"positions\" array of [x, y, z] triples".into());
            hints.push(
                "The optional \"box\" holds \"vectors\" (3 rows) and \"periodic\" (3 flags)".into(),
            );
        }
        FrameIoError::Identify(inner) => identify_hints(inner, hints),
    }
}

fn identify_hints(err: &IdentifyError, hints: &mut Vec<String>) {
    match err {
        IdentifyError::InvalidCutoff(_) => {
            hints.push("The cutoff is a distance in the frame's length unit".into());
            hints.push("Pass a positive value with --cutoff or in the settings file".into());
        }
        IdentifyError::InvalidBox { .. } => {
            hints.push("Periodic axes need non-zero, linearly independent box vectors".into());
            hints.push("Set \"periodic\" to false for axes without a box".into());
        }
        IdentifyError::NonFinitePosition { index } => {
            hints.push(format!("Particle {index} has a NaN or infinite coordinate"));
        }
        IdentifyError::InvalidParameter { name, .. } => {
            hints.push(format!("Setting '{name}' is out of range"));
            hints.push("Run `memtop defaults` to see the default values".into());
        }
        IdentifyError::ConfigParse(_) => {
            hints.push("Settings file has invalid TOML syntax or an unknown key".into());
            hints.push("Run `memtop defaults` for a template with every key".into());
        }
        IdentifyError::EmptyFrame => {
            hints.push("Input frame contains no particles".into());
            hints.push("Set allow_empty = true to accept empty frames".into());
        }
    }
}

fn std_io_hints(err: &io::Error, hints: &mut Vec<String>) {
    let hint = match err.kind() {
        ErrorKind::NotFound => "Check the path spelling and that the file exists",
        ErrorKind::PermissionDenied => "Check the file permissions",
        ErrorKind::UnexpectedEof => "The file may be truncated",
        ErrorKind::BrokenPipe => "The process reading the report exited early",
        _ => "Check the path, the permissions and the free disk space",
    };
    hints.push(hint.into());
}

fn fallback_hints(err: &Error, hints: &mut Vec<String>) {
    let text = err
        .chain()
        .map(|cause| cause.to_string().to_lowercase())
        .collect::<Vec<_>>()
        .join("\n");

    if text.contains("stdin") || text.contains("terminal") {
        hints.push("Pass a frame with -i/--input or pipe one into stdin".into());
    }
}
