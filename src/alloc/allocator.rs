use crate::alloc::voice::{AssignedPitch, Voice, VoiceId};
use crate::io::midi::{self, MidiEvent};
use crate::state::PerformanceState;
use crate::ACCENT_VELOCITY;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Playing policy, selected by the channel of the triggering note-on.
///
/// Channel 0 plays Unison; every other channel plays Duophonic. A note-on
/// whose channel maps to a different mode forces a full reset before the
/// note is processed.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    Unison,
    Duophonic,
}

impl PlayMode {
    pub fn from_channel(channel: u8) -> Self {
        if channel == 0 {
            PlayMode::Unison
        } else {
            PlayMode::Duophonic
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct AllocatorConfig {
    /// Velocity at or above which a note-on carries an accent.
    pub accent_velocity: u8,
    /// Controller lanes that enable glide when at least half-scale.
    pub glide_lanes: [u8; 2],
    /// Half-scale threshold for the glide lanes.
    pub glide_threshold: f32,
    /// Glide ramp duration in seconds.
    pub glide_time: f32,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            accent_velocity: ACCENT_VELOCITY,
            glide_lanes: [midi::CC_SUSTAIN, midi::CC_PORTAMENTO],
            glide_threshold: 0.5,
            glide_time: 0.1,
        }
    }
}

/// The two-voice allocation state machine.
///
/// Owns the RED and BLUE voice slots and applies one event per tick under
/// the current playing policy. All state is fixed-capacity and reused; the
/// event path performs no allocation.
#[derive(Debug)]
pub struct Allocator {
    voices: [Voice; 2],
    mode: PlayMode,
    /// Alternation flag: flips on every duophonic note-on so consecutive
    /// notes prefer opposite voices when both are free.
    reverse: bool,
    /// O(1) record of the most recently assigned voice, consulted when both
    /// slots are occupied.
    last_assigned: Option<VoiceId>,
    /// Monotonic tick clock; assignment timestamps are read from it.
    clock: u64,
    config: AllocatorConfig,
}

impl Allocator {
    pub fn new(config: AllocatorConfig) -> Self {
        Self {
            voices: [Voice::new(config.glide_time), Voice::new(config.glide_time)],
            mode: PlayMode::Unison,
            reverse: false,
            last_assigned: None,
            clock: 0,
            config,
        }
    }

    /// Advance the tick clock and expire last tick's trigger flags.
    /// Triggers live for exactly one tick.
    pub fn begin_tick(&mut self) {
        self.clock += 1;
        for voice in &mut self.voices {
            voice.clear_trigger();
        }
    }

    /// Apply one event. The performance state has already folded the event
    /// into its bookkeeping; it is mutable here because resets must also
    /// clear the externally-held note list.
    pub fn handle_event(&mut self, event: &MidiEvent, state: &mut PerformanceState) {
        match *event {
            MidiEvent::NoteOn {
                channel,
                key,
                velocity,
            } => self.note_on(channel, key, velocity, state),
            MidiEvent::NoteOff { key, .. } => self.note_off(key, state),
            MidiEvent::ControlChange { controller, .. }
                if controller == midi::CC_ALL_SOUND_OFF
                    || controller == midi::CC_ALL_NOTES_OFF =>
            {
                self.reset(self.mode);
                state.clear_notes();
            }
            _ => {}
        }

        if self.mode == PlayMode::Unison {
            debug_assert_eq!(
                self.voices[0].assigned().map(AssignedPitch::note),
                self.voices[1].assigned().map(AssignedPitch::note),
                "unison voices must share one target note"
            );
        }
    }

    fn note_on(&mut self, channel: u8, key: u8, velocity: u8, state: &mut PerformanceState) {
        let mode = PlayMode::from_channel(channel);
        if mode != self.mode {
            // Clear everything from the old mode before the note lands,
            // including the held-note list (the incoming note was already
            // appended to it).
            self.reset(mode);
            state.hold_only(key);
        }

        let accent = velocity >= self.config.accent_velocity;

        match self.mode {
            PlayMode::Unison => {
                if state.notes().len() > 1 {
                    // A note is already sounding: continuation, not attack.
                    let from = state.notes()[state.notes().len() - 2];
                    let glide = self.glide_enabled(state);
                    let now = self.clock;
                    for voice in &mut self.voices {
                        voice.legato(from, key, glide, now, accent);
                    }
                } else {
                    let now = self.clock;
                    for voice in &mut self.voices {
                        voice.start(key, now, accent);
                    }
                }
            }
            PlayMode::Duophonic => {
                let id = self.select_voice();
                self.voices[id.index()].start(key, self.clock, accent);
                self.last_assigned = Some(id);
                self.reverse = !self.reverse;
            }
        }
    }

    fn note_off(&mut self, key: u8, state: &mut PerformanceState) {
        match self.mode {
            PlayMode::Unison => {
                if let Some(to) = state.latest_note() {
                    // An older note is still down: fall back to it legato
                    // instead of releasing.
                    let glide = self.glide_enabled(state);
                    let now = self.clock;
                    let accent = self.voices[0].accent();
                    for voice in &mut self.voices {
                        voice.legato(key, to, glide, now, accent);
                    }
                } else {
                    for voice in &mut self.voices {
                        voice.release();
                    }
                }
            }
            PlayMode::Duophonic => {
                // Release whichever voices sound this note, raw or glide
                // target. No match is a defined no-op.
                for voice in &mut self.voices {
                    if voice.matches_note(key) {
                        voice.release();
                    }
                }
            }
        }
    }

    /// Duophonic target selection. Scan order alternates with the flag;
    /// the first free slot wins. With both slots occupied, steal the voice
    /// that was not assigned most recently.
    fn select_voice(&self) -> VoiceId {
        let order = if self.reverse {
            [VoiceId::Blue, VoiceId::Red]
        } else {
            [VoiceId::Red, VoiceId::Blue]
        };

        for id in order {
            if !self.voices[id.index()].is_assigned() {
                return id;
            }
        }

        match self.last_assigned {
            Some(last) => last.other(),
            None => order[0],
        }
    }

    fn glide_enabled(&self, state: &PerformanceState) -> bool {
        self.config
            .glide_lanes
            .iter()
            .any(|&lane| state.cc(lane) >= self.config.glide_threshold)
    }

    /// Full reset to power-on state under `mode`. The tick clock keeps
    /// running; it is monotonic for the process lifetime.
    pub fn reset(&mut self, mode: PlayMode) {
        for voice in &mut self.voices {
            voice.reset();
        }
        self.mode = mode;
        self.reverse = false;
        self.last_assigned = None;
    }

    /// Advance in-flight glide ramps by one tick period.
    pub fn step_glides(&mut self, dt: f32) {
        for voice in &mut self.voices {
            voice.step_glide(dt);
        }
    }

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    pub fn voice(&self, id: VoiceId) -> &Voice {
        &self.voices[id.index()]
    }

    pub fn voices(&self) -> &[Voice; 2] {
        &self.voices
    }

    pub(crate) fn voices_mut(&mut self) -> &mut [Voice; 2] {
        &mut self.voices
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new(AllocatorConfig::default())
    }
}
