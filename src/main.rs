//! Headless driver for the emulator core.
//!
//! Loads a cartridge, emulates a fixed number of frames, and can dump the
//! final framebuffer as a PNG. Window and audio frontends live outside this
//! crate and drive `ControlDeck` the same way.

use anyhow::Context;
use clap::Parser;
use nessie::{
    control_deck::ControlDeck,
    logging,
    mem::RamState,
    ppu::{RENDER_HEIGHT, RENDER_WIDTH},
    NesResult,
};
use std::path::PathBuf;
use tracing::info;

/// A cycle-counted NES emulator.
#[derive(Parser, Debug)]
#[command(name = "nessie", version, about)]
struct Opts {
    /// The `.nes` ROM file to load.
    path: PathBuf,
    /// Number of frames to emulate before exiting.
    #[arg(long, default_value_t = 60)]
    frames: u32,
    /// Write the final frame to this path as a PNG.
    #[arg(long)]
    screenshot: Option<PathBuf>,
    /// Power-up RAM fill: all-zeros, all-ones, or random.
    #[arg(long, default_value = "all-zeros")]
    ram_state: RamState,
}

fn main() -> NesResult<()> {
    logging::init();
    let opts = Opts::parse();

    let mut deck = ControlDeck::new(opts.ram_state);
    deck.load_rom_path(&opts.path)
        .with_context(|| format!("failed to load {:?}", opts.path))?;

    let mut total_cycles: u64 = 0;
    for _ in 0..opts.frames {
        total_cycles += deck.clock_frame().context("emulation fault")? as u64;
    }
    info!(
        "emulated {} frames ({total_cycles} CPU cycles)",
        opts.frames
    );

    if let Some(path) = &opts.screenshot {
        let frame = image::RgbImage::from_raw(
            RENDER_WIDTH as u32,
            RENDER_HEIGHT as u32,
            deck.frame_buffer().to_vec(),
        )
        .context("framebuffer size mismatch")?;
        frame
            .save(path)
            .with_context(|| format!("failed to write {path:?}"))?;
        info!("wrote {path:?}");
    }

    Ok(())
}
