use crate::dsp::SlewLimiter;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The two voice identities, named after the panel jacks.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceId {
    Red,
    Blue,
}

impl VoiceId {
    pub const ALL: [VoiceId; 2] = [VoiceId::Red, VoiceId::Blue];

    pub fn index(self) -> usize {
        match self {
            VoiceId::Red => 0,
            VoiceId::Blue => 1,
        }
    }

    pub fn other(self) -> VoiceId {
        match self {
            VoiceId::Red => VoiceId::Blue,
            VoiceId::Blue => VoiceId::Red,
        }
    }
}

/// What a voice is currently sounding.
///
/// Pitch resolution branches on this tag everywhere: a `Raw` assignment is
/// the note itself, a `Gliding` assignment is read from the voice's slew
/// limiter while it travels toward the stored target note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignedPitch {
    Raw(u8),
    Gliding(u8),
}

impl AssignedPitch {
    /// The note this assignment stands for: the raw note, or the note the
    /// glide will land on. Note-off matching compares against this.
    pub fn note(self) -> u8 {
        match self {
            AssignedPitch::Raw(n) | AssignedPitch::Gliding(n) => n,
        }
    }
}

/// One of the two voice slots.
///
/// Created once and reused for the life of the process. The assignment
/// timestamp is the allocator's tick clock at assignment or re-target; it
/// is never touched on release.
#[derive(Debug, Clone)]
pub struct Voice {
    assigned: Option<AssignedPitch>,
    assigned_at: u64,
    gate: bool,
    trigger: bool,
    accent: bool,
    cutoff_level: f32,
    resonance_level: f32,
    slew: SlewLimiter,
}

impl Voice {
    pub fn new(glide_time: f32) -> Self {
        Self {
            assigned: None,
            assigned_at: 0,
            gate: false,
            trigger: false,
            accent: false,
            cutoff_level: 0.0,
            resonance_level: 0.0,
            slew: SlewLimiter::new(glide_time),
        }
    }

    /// Fresh attack: raw assignment, gate on, trigger pending.
    pub fn start(&mut self, note: u8, now: u64, accent: bool) {
        self.assigned = Some(AssignedPitch::Raw(note));
        self.assigned_at = now;
        self.gate = true;
        self.trigger = true;
        self.accent = accent;
    }

    /// Legato re-target: pitch moves, the gate stays up, no trigger.
    ///
    /// With glide the ramp departs from `from` (the note being left) toward
    /// `to`; without it the assignment snaps to the raw target.
    pub fn legato(&mut self, from: u8, to: u8, glide: bool, now: u64, accent: bool) {
        if glide {
            self.slew.retarget(from as f32, to as f32);
            self.assigned = Some(AssignedPitch::Gliding(to));
        } else {
            self.assigned = Some(AssignedPitch::Raw(to));
        }
        self.assigned_at = now;
        self.gate = true;
        self.accent = accent;
    }

    /// Release the voice: gate low, assignment cleared. The timestamp and
    /// accent flag are left as they were.
    pub fn release(&mut self) {
        self.assigned = None;
        self.gate = false;
        self.trigger = false;
    }

    /// Full reset back to power-on state.
    pub fn reset(&mut self) {
        self.assigned = None;
        self.assigned_at = 0;
        self.gate = false;
        self.trigger = false;
        self.accent = false;
        self.cutoff_level = 0.0;
        self.resonance_level = 0.0;
        self.slew.reset();
    }

    /// Resolve the sounding pitch in note-number units, if assigned.
    pub fn current_pitch(&self) -> Option<f32> {
        self.assigned.map(|pitch| match pitch {
            AssignedPitch::Raw(n) => n as f32,
            AssignedPitch::Gliding(_) => self.slew.output(),
        })
    }

    /// True when this voice is sounding `note`, raw or as a glide target.
    pub fn matches_note(&self, note: u8) -> bool {
        self.assigned.map(AssignedPitch::note) == Some(note)
    }

    /// Advance an in-flight glide ramp.
    pub fn step_glide(&mut self, dt: f32) {
        if matches!(self.assigned, Some(AssignedPitch::Gliding(_))) {
            self.slew.step(dt);
        }
    }

    pub(crate) fn clear_trigger(&mut self) {
        self.trigger = false;
    }

    pub(crate) fn set_mod_levels(&mut self, cutoff: f32, resonance: f32) {
        self.cutoff_level = cutoff;
        self.resonance_level = resonance;
    }

    pub fn assigned(&self) -> Option<AssignedPitch> {
        self.assigned
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned.is_some()
    }

    pub fn assigned_at(&self) -> u64 {
        self.assigned_at
    }

    pub fn gate(&self) -> bool {
        self.gate
    }

    pub fn trigger(&self) -> bool {
        self.trigger
    }

    pub fn accent(&self) -> bool {
        self.accent
    }

    /// Normalized cutoff accumulator, updated by the mapper each tick.
    pub fn cutoff_level(&self) -> f32 {
        self.cutoff_level
    }

    /// Normalized resonance accumulator, updated by the mapper each tick.
    pub fn resonance_level(&self) -> f32 {
        self.resonance_level
    }
}
