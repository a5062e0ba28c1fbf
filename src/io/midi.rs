/// A transport-decoded MIDI event.
///
/// USB decoding and deduplication happen upstream; the engine consumes at
/// most one of these per control tick, in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    PitchBend { channel: u8, value: i16 },
    /// Channel-wide pressure.
    ChannelPressure { channel: u8, value: u8 },
    /// Polyphonic aftertouch. The key is kept for completeness but the
    /// performance state folds this onto the channel pressure value.
    Aftertouch { channel: u8, key: u8, value: u8 },
}

/// All-sound-off controller number; triggers a panic reset.
pub const CC_ALL_SOUND_OFF: u8 = 120;
/// All-notes-off controller number; triggers a panic reset.
pub const CC_ALL_NOTES_OFF: u8 = 123;

/// Sustain pedal lane, one of the two glide-enable lanes.
pub const CC_SUSTAIN: u8 = 64;
/// Portamento pedal lane, the other glide-enable lane.
pub const CC_PORTAMENTO: u8 = 65;
