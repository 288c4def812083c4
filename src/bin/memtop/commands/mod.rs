mod defaults;
mod identify;

use defaults::run_defaults;
use identify::run_identify;

use anyhow::Result;

use crate::cli::Command;
use crate::display::Context;

pub fn dispatch(command: Command, ctx: Context) -> Result<()> {
    match command {
        Command::Identify(args) => run_identify(args, ctx),
        Command::Defaults => run_defaults(),
    }
}
