//! Terminal output of the `memtop` binary. Everything goes to stderr so
//! stdout stays free for the report.

mod banner;
mod error;
mod progress;
mod tables;

pub use banner::{banner_for_help, print_banner};
pub use error::print_error;
pub use progress::Progress;
pub use tables::{print_frame_info, print_membranes};

/// Whether decorated output (banner, spinners, tables) is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    pub interactive: bool,
}

impl Context {
    /// Decorated output on a terminal, unless `quiet` was asked for.
    pub fn for_terminal(quiet: bool) -> Self {
        Self {
            interactive: !quiet && crate::io::stderr_is_tty(),
        }
    }
}
