use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use ixiy_fixgen::{hexdump::hexdump, instrumentation, program};

/// Generate a CP/M COM program that exercises IX/IY-prefixed helpers.
///
/// The emitted binary uses BDOS function calls to report success or identify
/// the failing sub-test. The individual routines cover indirect
/// loads/stores, arithmetic ops, and DD/FD CB prefixed rotates/bit twiddling
/// to catch regressions in the emulator helpers.
#[derive(Parser)]
#[command(version)]
struct Cli {
    #[clap(long)]
    #[clap(help = "Enable chrome tracing")]
    trace: bool,
    #[clap(long)]
    #[clap(help = "Print a hexdump of the generated image")]
    dump: bool,
    #[clap(help = "Path to the generated CP/M COM binary")]
    output: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _trace_guard = if cli.trace {
        Some(instrumentation::trace())
    } else {
        None
    };

    // Assemble first; a failed assembly must not leave a file behind.
    let image = program::build_image().with_context(|| "Image assembly failed")?;

    if cli.dump {
        println!("{}", hexdump(&image, program::BASE_ADDR));
    }

    std::fs::write(&cli.output, &image)
        .with_context(|| format!("Unable to write {}", cli.output.display()))?;
    eprintln!("Wrote {} ({} bytes)", cli.output.display(), image.len());

    Ok(())
}
