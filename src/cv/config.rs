use crate::alloc::VoiceId;
use crate::dsp::RetriggerPulse;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Voltage mapping for a modulation jack.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModRange {
    /// Linear −5 V..+5 V across the normalized accumulator.
    Bipolar,
    /// Accent-gated split: accented voices land in the +3 V..+8 V band,
    /// unaccented in −5 V..0 V.
    AccentSplit,
}

/// Which per-voice accumulator a jack taps.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModSource {
    Cutoff,
    Resonance,
}

/// Which voice's accumulator a jack taps. `Shared` follows whichever voice
/// currently carries the larger value, so an accent on either voice reaches
/// a shared filter.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModVoice {
    Shared,
    Voice(VoiceId),
}

/// Full routing for one modulation jack.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct ModTap {
    pub source: ModSource,
    pub voice: ModVoice,
    pub range: ModRange,
}

/// Output-stage configuration.
///
/// The engine's hardware evolutions differ only here: which controller
/// lanes feed the modulation bases, whether resonance exists and is
/// per-voice, how the jacks map to voltage bands, and whether a combined
/// gate is driven. One state machine, several personalities.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct MapperConfig {
    /// MIDI note that maps to 0 V (1 V/octave above it).
    pub reference_note: u8,
    /// Pitch-bend range in semitones at full deflection.
    pub bend_range: f32,
    /// Controller lane feeding the shared cutoff base.
    pub cutoff_lane: u8,
    /// Per-voice cutoff base lanes; `Some` overrides the shared lane.
    pub per_voice_cutoff_lanes: Option<[u8; 2]>,
    /// Controller lane feeding the resonance base.
    pub resonance_lane: u8,
    /// Added to a voice's accumulators while its accent flag is set.
    pub accent_bonus: f32,
    /// Scale applied to channel pressure before accumulation.
    pub pressure_weight: f32,
    /// When set, the resonance accumulator also receives the per-voice
    /// accent bonus and pressure contribution (otherwise it carries the
    /// shared controller base only).
    pub per_voice_resonance: bool,
    /// Routing for jack C; `None` leaves the jack quiescent.
    pub mod_c: Option<ModTap>,
    /// Routing for jack D.
    pub mod_d: Option<ModTap>,
    /// Drive the combined any-voice gate output.
    pub combined_gate: bool,
    /// With `AccentSplit` ranges, promote unaccented voices into the upper
    /// band on a per-trigger coin flip.
    pub coin_flip: bool,
    /// Retrigger pulse width in seconds.
    pub retrigger_width: f32,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            reference_note: 36,
            bend_range: 12.0,
            cutoff_lane: 4,
            per_voice_cutoff_lanes: None,
            resonance_lane: 1,
            accent_bonus: 0.25,
            pressure_weight: 0.25,
            per_voice_resonance: false,
            mod_c: Some(ModTap {
                source: ModSource::Resonance,
                voice: ModVoice::Shared,
                range: ModRange::Bipolar,
            }),
            mod_d: Some(ModTap {
                source: ModSource::Cutoff,
                voice: ModVoice::Shared,
                range: ModRange::Bipolar,
            }),
            combined_gate: false,
            coin_flip: false,
            retrigger_width: RetriggerPulse::DEFAULT_WIDTH,
        }
    }
}
