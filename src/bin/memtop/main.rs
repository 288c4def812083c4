use std::process::ExitCode;

mod cli;
mod commands;
mod config;
mod display;
mod io;
mod util;

fn main() -> ExitCode {
    let cli = cli::parse();
    init_logging(cli.verbose);

    let quiet = match &cli.command {
        cli::Command::Identify(args) => args.io.quiet,
        cli::Command::Defaults => true,
    };
    let ctx = display::Context::for_terminal(quiet);

    if ctx.interactive {
        display::print_banner();
    }

    if let Err(err) = commands::dispatch(cli.command, ctx) {
        log::debug!("{err:?}");
        display::print_error(&err);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}
