//! retrig - interactive envelope voice demo
//!
//! Run with: cargo run
//!
//! Hold a note with the spacebar, shape it with the ADSR keys, and watch
//! the rendered output on the oscilloscope and spectrum panes.

mod app;
mod ui;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    app::run()
}
