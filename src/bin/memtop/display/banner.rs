use std::io::{self, Write};
use std::sync::LazyLock;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const BANNER_ART: &str = r#"
   ███╗   ███╗███████╗███╗   ███╗████████╗ ██████╗ ██████╗
   ████╗ ████║██╔════╝████╗ ████║╚══██╔══╝██╔═══██╗██╔══██╗
   ██╔████╔██║█████╗  ██╔████╔██║   ██║   ██║   ██║██████╔╝
   ██║╚██╔╝██║██╔══╝  ██║╚██╔╝██║   ██║   ██║   ██║██╔═══╝
   ██║ ╚═╝ ██║███████╗██║ ╚═╝ ██║   ██║   ╚██████╔╝██║
   ╚═╝     ╚═╝╚══════╝╚═╝     ╚═╝   ╚═╝    ╚═════╝ ╚═╝

        ○ ○ ○ ○ ○ ○ ○ ○ ○ ○ ○ ○ ○ ○ ○ ○ ○ ○ ○ ○ ○
        ┃ ┃ ┃ ┃ ┃ ┃ ┃ ┃ ┃ ┃ ┃ ┃ ┃ ┃ ┃ ┃ ┃ ┃ ┃ ┃ ┃
        ┃ ┃ ┃ ┃ ┃ ┃ ┃ ┃ ┃ ┃ ┃ ┃ ┃ ┃ ┃ ┃ ┃ ┃ ┃ ┃ ┃
        ○ ○ ○ ○ ○ ○ ○ ○ ○ ○ ○ ○ ○ ○ ○ ○ ○ ○ ○ ○ ○
   "#;

const TAGLINE: &str = "Membrane & Leaflet Identification";

static HELP_BANNER: LazyLock<String> =
    LazyLock::new(|| format!("{BANNER_ART}\n   {TAGLINE}  v{VERSION}\n"));

/// Banner shown above `--help`.
pub fn banner_for_help() -> &'static str {
    HELP_BANNER.as_str()
}

pub fn print_banner() {
    let _ = writeln!(
        io::stderr().lock(),
        "\n{BANNER_ART}\n\n   {TAGLINE:<50} v{VERSION}\n"
    );
}
