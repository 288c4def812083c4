use std::io::Write;

use anyhow::{Context, Result, bail};

use membrane_topology::{IdentifyConfig, Snapshot, identify};
use membrane_topology::io::{read_frame, write_report};

use crate::cli::IdentifyArgs;
use crate::config::build_identify_config;
use crate::display::{Context as DisplayContext, Progress, print_frame_info, print_membranes};
use crate::io::{create_output, open_input, reads_stdin, stdin_is_tty, stream_name};

const TOTAL_STEPS: u8 = 3;

pub fn run_identify(args: IdentifyArgs, ctx: DisplayContext) -> Result<()> {
    if reads_stdin(args.io.input.as_deref()) && stdin_is_tty() {
        bail!(
            "No input file specified and stdin is a terminal.\n\nUsage: memtop identify -i <FRAME.json> or pipe data via stdin."
        );
    }

    let config = build_identify_config(&args.options)?;

    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);

    progress.step("Reading frame");
    let input = open_input(args.io.input.as_deref())?;
    let frame = read_frame(input).context("Failed to read frame")?;
    let source = stream_name(args.io.input.as_deref(), "stdin");
    progress.complete_step("Reading frame", &[&format!("Parse JSON from {source}")]);

    if ctx.interactive {
        print_frame_info(&frame);
    }

    progress.step("Identifying membranes");
    let snapshot = identify(&frame, &config).context("Membrane identification failed")?;

    let identify_substeps = build_identify_substeps(&config, &snapshot);
    let identify_substeps_ref: Vec<&str> = identify_substeps.iter().map(|s| s.as_str()).collect();
    progress.complete_step("Identifying membranes", &identify_substeps_ref);

    if ctx.interactive {
        print_membranes(&snapshot);
    }

    progress.step("Writing report");
    let mut output = create_output(args.io.output.as_deref())?;
    write_report(&mut output, &snapshot).context("Failed to write report")?;
    output.flush().context("Failed to flush report")?;

    let target = stream_name(args.io.output.as_deref(), "stdout");
    progress.complete_step("Writing report", &[&format!("Write JSON → {target}")]);

    progress.finish();

    Ok(())
}

fn build_identify_substeps(config: &IdentifyConfig, snapshot: &Snapshot) -> Vec<String> {
    let paired = snapshot
        .membranes()
        .iter()
        .filter(|m| m.aggregates().len() == 2)
        .count();

    let mut steps = vec![
        format!("Build neighbor graph (cutoff {})", config.cutoff),
        format!("Group {} aggregates", snapshot.aggregates().len()),
        format!(
            "Split {} aggregates into leaflets",
            snapshot.membranes().len() - paired
        ),
    ];
    if config.pair_monolayers {
        steps.push(format!(
            "Pair monolayers (distance {}): {paired} paired",
            config.effective_pairing_cutoff()
        ));
    }
    steps
}
