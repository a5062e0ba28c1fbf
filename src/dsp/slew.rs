use crate::MIN_TIME;

/*
Glide interpolation
===================

A slew limiter bounds how fast a control value may move. For pitch glide we
want a timed ramp: after a legato retarget the output travels from the old
note to the new one in exactly `time_constant` seconds, then sits on the
target.

    output(t) = last + (target - last) * min(t / time_constant, 1)

The ramp is linear, so the output is strictly monotonic between the two
endpoints and lands on the target exactly: no overshoot, no asymptotic
tail. The allocator restarts the ramp with `retarget`; the control loop
advances it once per tick with `step(dt)`.
*/

/// Timed linear ramp between two pitch values.
#[derive(Debug, Clone, Copy)]
pub struct SlewLimiter {
    last: f32,
    target: f32,
    time_constant: f32,
    elapsed: f32,
}

impl SlewLimiter {
    /// Create a limiter that completes a ramp in `time_constant` seconds.
    pub fn new(time_constant: f32) -> Self {
        Self {
            last: 0.0,
            target: 0.0,
            time_constant: time_constant.max(MIN_TIME),
            elapsed: 0.0,
        }
    }

    /// Restart the ramp from `from` toward `to`.
    ///
    /// `from` is the previous note, not the current ramp position: a legato
    /// transition always departs from the note being left behind.
    pub fn retarget(&mut self, from: f32, to: f32) {
        self.last = from;
        self.target = to;
        self.elapsed = 0.0;
    }

    /// Advance the ramp by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        // Saturate rather than wrap; a finished ramp stays finished.
        self.elapsed = (self.elapsed + dt).min(self.time_constant);
    }

    /// Current ramp output.
    pub fn output(&self) -> f32 {
        let t = (self.elapsed / self.time_constant).clamp(0.0, 1.0);
        self.last + (self.target - self.last) * t
    }

    /// The value the ramp is heading toward.
    pub fn target(&self) -> f32 {
        self.target
    }

    /// True once the output has reached the target.
    pub fn done(&self) -> bool {
        self.elapsed >= self.time_constant
    }

    /// Clear the ramp back to a quiescent zero state.
    pub fn reset(&mut self) {
        self.last = 0.0;
        self.target = 0.0;
        self.elapsed = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.001; // 1 kHz control rate

    #[test]
    fn ramp_is_monotonic_without_overshoot() {
        let mut slew = SlewLimiter::new(0.1);
        slew.retarget(60.0, 64.0);

        let mut previous = slew.output();
        for _ in 0..200 {
            slew.step(DT);
            let out = slew.output();
            assert!(out >= previous, "ramp must never move backwards");
            assert!(out <= 64.0, "ramp must never overshoot the target");
            previous = out;
        }
    }

    #[test]
    fn ramp_arrives_exactly_on_the_target() {
        let mut slew = SlewLimiter::new(0.1);
        slew.retarget(60.0, 64.0);

        // A hair past the time constant to absorb float accumulation.
        for _ in 0..105 {
            slew.step(DT);
        }

        assert!(slew.done());
        assert_eq!(slew.output(), 64.0);
    }

    #[test]
    fn downward_ramp_descends() {
        let mut slew = SlewLimiter::new(0.1);
        slew.retarget(72.0, 60.0);

        for _ in 0..50 {
            slew.step(DT);
        }

        let midway = slew.output();
        assert!(midway < 72.0 && midway > 60.0);
    }

    #[test]
    fn retarget_departs_from_the_named_note() {
        let mut slew = SlewLimiter::new(0.1);
        slew.retarget(60.0, 64.0);
        for _ in 0..50 {
            slew.step(DT);
        }

        // Mid-ramp legato: the new ramp starts from the old note value, not
        // from wherever the previous ramp happened to be.
        slew.retarget(64.0, 67.0);
        assert_eq!(slew.output(), 64.0);
        assert_eq!(slew.target(), 67.0);
    }

    #[test]
    fn reset_returns_to_quiescent() {
        let mut slew = SlewLimiter::new(0.1);
        slew.retarget(48.0, 52.0);
        slew.step(DT);
        slew.reset();

        assert_eq!(slew.output(), 0.0);
        assert_eq!(slew.target(), 0.0);
    }
}
