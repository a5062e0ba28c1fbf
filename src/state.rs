//! Performance state shared between the transport bookkeeping and the
//! allocator: which keys are down, controller values, bend and pressure.

use crate::io::MidiEvent;
use crate::MAX_HELD_NOTES;

/// Snapshot of the incoming performance.
///
/// Updated once per tick from the incoming event before the allocator runs,
/// then read by the allocator and the CV mapper. The held-note list is
/// ordered oldest first, most recent last. Storage is pre-allocated; the
/// tick path never grows it.
#[derive(Debug, Clone)]
pub struct PerformanceState {
    notes: Vec<u8>,
    cc: [u8; 128],
    pitch_bend: f32,
    pressure: f32,
    velocity: f32,
}

impl PerformanceState {
    pub fn new() -> Self {
        Self {
            notes: Vec::with_capacity(MAX_HELD_NOTES),
            cc: [0; 128],
            pitch_bend: 0.0,
            pressure: 0.0,
            velocity: 0.0,
        }
    }

    /// Fold an event into the snapshot and hand back the event the
    /// allocator should see.
    ///
    /// The one rewrite: some controllers signal note-off as a note-on with
    /// velocity zero, which is normalized here so the allocator only ever
    /// sees real attacks.
    pub fn apply(&mut self, event: MidiEvent) -> MidiEvent {
        match event {
            MidiEvent::NoteOn {
                channel,
                key,
                velocity: 0,
            } => {
                let folded = MidiEvent::NoteOff {
                    channel,
                    key,
                    velocity: 0,
                };
                self.remove_note(key);
                self.velocity = 0.0;
                folded
            }
            MidiEvent::NoteOn { key, velocity, .. } => {
                self.push_note(key);
                self.velocity = velocity as f32 / 127.0;
                event
            }
            MidiEvent::NoteOff { key, velocity, .. } => {
                self.remove_note(key);
                self.velocity = velocity as f32 / 127.0;
                event
            }
            MidiEvent::ControlChange {
                controller, value, ..
            } => {
                self.cc[controller as usize & 0x7f] = value;
                event
            }
            MidiEvent::PitchBend { value, .. } => {
                self.pitch_bend = value as f32 / 8192.0;
                event
            }
            MidiEvent::ChannelPressure { value, .. } => {
                self.pressure = value as f32 / 127.0;
                event
            }
            // Discards the key, but channel pressure is what the modulation
            // stage consumes.
            MidiEvent::Aftertouch { value, .. } => {
                self.pressure = value as f32 / 127.0;
                event
            }
        }
    }

    fn push_note(&mut self, note: u8) {
        if self.notes.len() == MAX_HELD_NOTES {
            self.notes.remove(0);
        }
        self.notes.push(note);
    }

    fn remove_note(&mut self, note: u8) {
        self.notes.retain(|&n| n != note);
    }

    /// Currently held notes, most recent last.
    pub fn notes(&self) -> &[u8] {
        &self.notes
    }

    /// Drop every held note. Used by the panic reset.
    pub fn clear_notes(&mut self) {
        self.notes.clear();
    }

    /// Drop every held note except `note`. Used by the mode-switch reset,
    /// which must clear prior state before the triggering note is applied.
    pub fn hold_only(&mut self, note: u8) {
        self.notes.clear();
        self.notes.push(note);
    }

    /// Controller value for a lane, normalized to 0..1.
    pub fn cc(&self, lane: u8) -> f32 {
        self.cc[lane as usize & 0x7f] as f32 / 127.0
    }

    /// Pitch bend normalized to -1..1.
    pub fn pitch_bend(&self) -> f32 {
        self.pitch_bend
    }

    /// Channel pressure / aftertouch normalized to 0..1.
    pub fn pressure(&self) -> f32 {
        self.pressure
    }

    /// Velocity of the most recent note event, normalized to 0..1.
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn latest_note(&self) -> Option<u8> {
        self.notes.last().copied()
    }

    pub fn oldest_note(&self) -> Option<u8> {
        self.notes.first().copied()
    }

    pub fn highest_note(&self) -> Option<u8> {
        self.notes.iter().max().copied()
    }

    pub fn lowest_note(&self) -> Option<u8> {
        self.notes.iter().min().copied()
    }
}

impl Default for PerformanceState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on(key: u8, velocity: u8) -> MidiEvent {
        MidiEvent::NoteOn {
            channel: 0,
            key,
            velocity,
        }
    }

    fn off(key: u8) -> MidiEvent {
        MidiEvent::NoteOff {
            channel: 0,
            key,
            velocity: 0,
        }
    }

    #[test]
    fn held_notes_keep_arrival_order() {
        let mut state = PerformanceState::new();
        state.apply(on(60, 100));
        state.apply(on(64, 100));
        state.apply(on(67, 100));

        assert_eq!(state.notes(), &[60, 64, 67]);
        assert_eq!(state.latest_note(), Some(67));
        assert_eq!(state.oldest_note(), Some(60));

        state.apply(off(64));
        assert_eq!(state.notes(), &[60, 67]);
    }

    #[test]
    fn velocity_zero_note_on_folds_to_note_off() {
        let mut state = PerformanceState::new();
        state.apply(on(60, 100));

        let folded = state.apply(on(60, 0));
        assert!(matches!(folded, MidiEvent::NoteOff { key: 60, .. }));
        assert!(state.notes().is_empty());
    }

    #[test]
    fn overflow_drops_the_oldest_note() {
        let mut state = PerformanceState::new();
        for key in 0..MAX_HELD_NOTES as u8 + 1 {
            state.apply(on(key, 100));
        }

        assert_eq!(state.notes().len(), MAX_HELD_NOTES);
        assert_eq!(state.oldest_note(), Some(1));
        assert_eq!(state.latest_note(), Some(MAX_HELD_NOTES as u8));
    }

    #[test]
    fn controller_and_bend_normalize() {
        let mut state = PerformanceState::new();
        state.apply(MidiEvent::ControlChange {
            channel: 0,
            controller: 64,
            value: 127,
        });
        state.apply(MidiEvent::PitchBend {
            channel: 0,
            value: -8192,
        });
        state.apply(MidiEvent::ChannelPressure {
            channel: 0,
            value: 127,
        });

        assert_eq!(state.cc(64), 1.0);
        assert_eq!(state.pitch_bend(), -1.0);
        assert_eq!(state.pressure(), 1.0);
    }

    #[test]
    fn extreme_note_accessors() {
        let mut state = PerformanceState::new();
        state.apply(on(64, 100));
        state.apply(on(48, 100));
        state.apply(on(72, 100));

        assert_eq!(state.highest_note(), Some(72));
        assert_eq!(state.lowest_note(), Some(48));
    }
}
