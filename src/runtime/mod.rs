//! Control loop driver.
//!
//! One iteration per tick: poll one event, fold it into the performance
//! state, run the allocator, map the outputs, commit them through the
//! retrigger pulse timers, then step all timers by the tick period. The
//! whole path works on pre-allocated state; nothing in it touches the heap.

mod stats;

pub use stats::{TickReport, TickStats};

use std::time::Instant;

use crate::alloc::{Allocator, AllocatorConfig, VoiceId};
use crate::cv::{CvMapper, MapperConfig, OutputFrame};
use crate::dsp::RetriggerPulse;
use crate::io::midi::MidiEvent;
use crate::io::sink::{ControlSink, ModJack};
use crate::state::PerformanceState;
use crate::DEFAULT_TICK_RATE;

// Pulse timer slots 0 and 1 belong to the voices (indexed by VoiceId),
// slot 2 to the combined gate.
const PULSE_COMBINED: usize = 2;

/// The per-tick driver around the allocator and mapper.
pub struct ControlLoop {
    state: PerformanceState,
    allocator: Allocator,
    mapper: CvMapper,
    pulses: [RetriggerPulse; 3],
    dt: f32,
    stats: TickStats,
    last_frame: OutputFrame,
}

impl ControlLoop {
    pub fn new(tick_rate: f32, alloc_config: AllocatorConfig, mapper_config: MapperConfig) -> Self {
        let pulse = RetriggerPulse::new(mapper_config.retrigger_width);
        Self {
            state: PerformanceState::new(),
            allocator: Allocator::new(alloc_config),
            mapper: CvMapper::new(mapper_config),
            pulses: [pulse; 3],
            dt: 1.0 / tick_rate,
            stats: TickStats::new(),
            last_frame: OutputFrame::default(),
        }
    }

    /// Run one control tick and commit the outputs.
    ///
    /// Events must arrive in order, at most one per tick; `None` is an idle
    /// tick (timers still advance, glides still move).
    pub fn tick(&mut self, event: Option<MidiEvent>, sink: &mut impl ControlSink) -> OutputFrame {
        let started = Instant::now();

        self.allocator.begin_tick();
        if let Some(event) = event {
            let event = self.state.apply(event);
            self.allocator.handle_event(&event, &mut self.state);
        }

        let frame = self.mapper.map(&mut self.allocator, &self.state);

        for id in VoiceId::ALL {
            let i = id.index();
            if frame.retrigger[i] {
                self.pulses[i].fire();
            }
            sink.pitch_cv(id, frame.pitch[i]);
            sink.gate(id, self.pulses[i].level(frame.gate[i]));
        }
        sink.mod_cv(ModJack::C, frame.mod_c);
        sink.mod_cv(ModJack::D, frame.mod_d);

        if self.mapper.config().combined_gate {
            if frame.combined_retrigger {
                self.pulses[PULSE_COMBINED].fire();
            }
            sink.combined_gate(self.pulses[PULSE_COMBINED].level(frame.combined_gate));
        }

        for pulse in &mut self.pulses {
            pulse.step(self.dt);
        }
        self.allocator.step_glides(self.dt);

        self.last_frame = frame;
        self.stats.record(started.elapsed());
        frame
    }

    /// Drive every output to its quiescent level: gates low, 0 V CVs.
    /// Used by the embedder around restarts.
    pub fn quiesce(&mut self, sink: &mut impl ControlSink) {
        for id in VoiceId::ALL {
            sink.pitch_cv(id, 0.0);
            sink.gate(id, false);
        }
        sink.mod_cv(ModJack::C, 0.0);
        sink.mod_cv(ModJack::D, 0.0);
        sink.combined_gate(false);
        for pulse in &mut self.pulses {
            pulse.reset();
        }
    }

    pub fn state(&self) -> &PerformanceState {
        &self.state
    }

    pub fn allocator(&self) -> &Allocator {
        &self.allocator
    }

    /// The frame committed by the most recent tick.
    pub fn last_frame(&self) -> OutputFrame {
        self.last_frame
    }

    /// Per-second diagnostics, if a report boundary has passed.
    pub fn take_report(&mut self) -> Option<TickReport> {
        self.stats.take_report()
    }
}

impl Default for ControlLoop {
    fn default() -> Self {
        Self::new(
            DEFAULT_TICK_RATE,
            AllocatorConfig::default(),
            MapperConfig::default(),
        )
    }
}
