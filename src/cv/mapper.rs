use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::alloc::{Allocator, VoiceId};
use crate::cv::config::{MapperConfig, ModRange, ModSource, ModTap, ModVoice};
use crate::state::PerformanceState;

/// One tick's worth of output decisions.
///
/// Gate levels here are the sustained levels; the control loop resolves
/// them through the retrigger pulse timers before they reach hardware.
/// Retrigger fields are edge requests, not levels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OutputFrame {
    pub pitch: [f32; 2],
    pub gate: [bool; 2],
    pub retrigger: [bool; 2],
    pub mod_c: f32,
    pub mod_d: f32,
    pub combined_gate: bool,
    pub combined_retrigger: bool,
}

/// Derives output voltages and gate decisions from allocator state plus the
/// controller snapshot.
///
/// Holds the small amount of output-side state the hardware implies: the
/// pitch CVs latch their last value while a voice is unassigned (a DAC
/// holds its word), and the coin-flip band choice is resampled only on
/// trigger edges so it cannot jitter between ticks.
pub struct CvMapper {
    config: MapperConfig,
    last_pitch: [f32; 2],
    band_flip: [bool; 2],
    rng: SmallRng,
}

impl CvMapper {
    pub fn new(config: MapperConfig) -> Self {
        Self::with_seed(config, 0x5EED_CAFE)
    }

    /// Deterministic construction for tests of the coin-flip routing.
    pub fn with_seed(config: MapperConfig, seed: u64) -> Self {
        Self {
            config,
            last_pitch: [0.0; 2],
            band_flip: [false; 2],
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Compute one output frame. Updates the per-voice modulation
    /// accumulators as a side effect, per the data model.
    pub fn map(&mut self, alloc: &mut Allocator, state: &PerformanceState) -> OutputFrame {
        let mut frame = OutputFrame::default();
        let bend = state.pitch_bend();

        self.accumulate(alloc, state);

        for id in VoiceId::ALL {
            let i = id.index();
            let voice = alloc.voice(id);

            if self.config.coin_flip && voice.trigger() {
                self.band_flip[i] = self.rng.gen_bool(0.5);
            }

            if let Some(note) = voice.current_pitch() {
                self.last_pitch[i] = self.pitch_volts(note, bend);
            }
            frame.pitch[i] = self.last_pitch[i];
            frame.gate[i] = voice.gate();
            frame.retrigger[i] = voice.trigger();
        }

        frame.mod_c = match self.config.mod_c {
            Some(tap) => self.tap_volts(tap, alloc),
            None => 0.0,
        };
        frame.mod_d = match self.config.mod_d {
            Some(tap) => self.tap_volts(tap, alloc),
            None => 0.0,
        };

        if self.config.combined_gate {
            frame.combined_gate = frame.gate[0] || frame.gate[1];
            frame.combined_retrigger = frame.retrigger[0] || frame.retrigger[1];
        }

        frame
    }

    /// Rebuild the per-voice accumulators: shared controller base plus the
    /// voice's accent bonus plus the pressure contribution, clamped to
    /// [0, 1] before any voltage mapping.
    fn accumulate(&self, alloc: &mut Allocator, state: &PerformanceState) {
        let cfg = &self.config;
        let pressure = state.pressure() * cfg.pressure_weight;
        let resonance_base = state.cc(cfg.resonance_lane);

        for id in VoiceId::ALL {
            let cutoff_base = match cfg.per_voice_cutoff_lanes {
                Some(lanes) => state.cc(lanes[id.index()]),
                None => state.cc(cfg.cutoff_lane),
            };

            let voice = &mut alloc.voices_mut()[id.index()];
            let bonus = if voice.accent() { cfg.accent_bonus } else { 0.0 };

            let cutoff = (cutoff_base + bonus + pressure).clamp(0.0, 1.0);
            let resonance = if cfg.per_voice_resonance {
                (resonance_base + bonus + pressure).clamp(0.0, 1.0)
            } else {
                resonance_base.clamp(0.0, 1.0)
            };
            voice.set_mod_levels(cutoff, resonance);
        }
    }

    /// Note-number pitch to volts: 1 V/octave above the reference note,
    /// plus pitch bend scaled to the configured range.
    fn pitch_volts(&self, note: f32, bend: f32) -> f32 {
        let base = (note - self.config.reference_note as f32) / 12.0;
        base + bend * self.config.bend_range / 12.0
    }

    fn tap_volts(&self, tap: ModTap, alloc: &Allocator) -> f32 {
        let level_of = |id: VoiceId| {
            let voice = alloc.voice(id);
            match tap.source {
                ModSource::Cutoff => voice.cutoff_level(),
                ModSource::Resonance => voice.resonance_level(),
            }
        };
        let accent_of = |id: VoiceId| {
            alloc.voice(id).accent() || (self.config.coin_flip && self.band_flip[id.index()])
        };

        let (level, high_band) = match tap.voice {
            ModVoice::Voice(id) => (level_of(id), accent_of(id)),
            ModVoice::Shared => {
                let red = level_of(VoiceId::Red);
                let blue = level_of(VoiceId::Blue);
                (
                    red.max(blue),
                    accent_of(VoiceId::Red) || accent_of(VoiceId::Blue),
                )
            }
        };

        match tap.range {
            ModRange::Bipolar => -5.0 + level * 10.0,
            ModRange::AccentSplit => {
                if high_band {
                    3.0 + level * 5.0
                } else {
                    -5.0 + level * 5.0
                }
            }
        }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }
}
