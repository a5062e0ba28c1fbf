//! Control-rate primitives used by the allocator and the output stage.
//!
//! These components are allocation-free and realtime-safe: fixed-size state,
//! no heap traffic, advanced by explicit `step(dt)` calls from the control
//! loop. They stay focused on the per-tick math so the allocator and mapper
//! can layer policy on top.

/// Gate retrigger pulse generator.
pub mod pulse;
/// Bounded-rate pitch interpolator for glide.
pub mod slew;

pub use pulse::RetriggerPulse;
pub use slew::SlewLimiter;
