pub mod cli;
pub mod error;
pub mod model;
pub mod parser;
pub mod processor;
pub mod writer;

use anyhow::{Context, bail};
use log::info;

/// Compiles the source named in `args`.
pub fn run(args: cli::Cli) -> anyhow::Result<()> {
    // Only the first call in a process installs the logger.
    let _ = env_logger::Builder::new()
        .format_timestamp(None)
        .filter_level(args.verbosity.log_level_filter())
        .try_init();

    let output = args.output_path();
    if output == args.source {
        bail!(
            "output path {} would overwrite the source file",
            output.display()
        );
    }

    // 1. ── Parse ──────────────────────────────────────────────────────
    let model = parser::load(&args.source)?;

    // 2. ── Process ────────────────────────────────────────────────────
    let program = processor::run(model)?;

    // 3. ── Write outputs ──────────────────────────────────────────────
    let origin = args
        .source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.source.display().to_string());
    writer::cpp::emit(&program, &origin, &output)
        .with_context(|| format!("Writing {}", output.display()))?;
    info!("Wrote {}", output.display());

    if let Some(path) = &args.emit_model {
        writer::json::emit(&program, path)
            .with_context(|| format!("Writing {}", path.display()))?;
        info!("Wrote model to {}", path.display());
    }

    if args.run {
        let outcome = processor::vm::run_with_system_io(&program)
            .with_context(|| "Running the state machine")?;
        info!(
            "Machine stopped in state `{}` after {} iterations",
            outcome.final_state, outcome.iterations
        );
    }

    Ok(())
}
