//! redblue - engine monitor with audio audition
//!
//! Runs the allocation engine against a scripted performance, sonifies the
//! two voices through the default audio output, and shows the CV/gate
//! state in a terminal UI.
//!
//! Run with: cargo run

mod app;
mod ui;

use app::Monitor;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    Monitor::new().run()
}
