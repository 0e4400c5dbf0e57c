//! sidsynth - Terminal chip synthesizer
//!
//! Run with: cargo run -- [patch.toml]

mod app;
mod patch;
mod sequencer;
mod ui;

use std::path::Path;

use app::SidSynth;
use patch::Patch;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let patch = match std::env::args().nth(1) {
        Some(path) => Patch::load(Path::new(&path))?,
        None => Patch::default(),
    };

    SidSynth::new(patch).run()
}
