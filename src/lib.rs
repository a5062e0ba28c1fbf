pub mod alloc; // Voice allocation state machine (the core)
pub mod cv; // CV/gate mapping and modulation
pub mod dsp; // Control-rate primitives (slew, pulses)
pub mod io; // External interfaces: events, queues, output sink
pub mod runtime; // Control loop driver and diagnostics

mod state;

pub use state::PerformanceState;

/// Capacity of the held-note list. Keyboards rarely report more than ten
/// simultaneous keys; overflow drops the oldest entry.
pub const MAX_HELD_NOTES: usize = 16;

/// Default control-loop rate in Hz. One tick = one event poll plus one full
/// allocator/mapper pass.
pub const DEFAULT_TICK_RATE: f32 = 1_000.0;

/// Velocity at or above which a note-on sets the accent flag (92/127 ≈ 72%).
pub const ACCENT_VELOCITY: u8 = 92;

pub(crate) const MIN_TIME: f32 = 1.0 / 10_000.0;
