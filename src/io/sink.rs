use crate::alloc::VoiceId;

/// The two modulation CV jacks (C and D on the panel).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModJack {
    C,
    D,
}

/// Hardware output seam.
///
/// The DAC/GPIO layer (with its calibration) lives outside this crate and
/// implements this trait; tests implement it with a recording sink. The
/// control loop commits one complete set of outputs per tick, with gate
/// levels already resolved through the retrigger pulse timers.
pub trait ControlSink {
    /// Pitch CV for one voice, in volts.
    fn pitch_cv(&mut self, voice: VoiceId, volts: f32);

    /// Gate line level for one voice.
    fn gate(&mut self, voice: VoiceId, high: bool);

    /// Modulation CV for one jack, in volts.
    fn mod_cv(&mut self, jack: ModJack, volts: f32);

    /// Combined any-voice gate, for a shared envelope generator. Only
    /// driven when the mapper config enables it.
    fn combined_gate(&mut self, _high: bool) {}
}
