//! Scene-level state driven each frame: the control parameters exposed in the
//! panel and the bounce oscillator that moves the cat.

/// The four parameters exposed in the control panel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlParams {
    pub sound_on: bool,
    pub animation_on: bool,
    /// Seconds one animation loop takes.
    pub duration: f32,
    /// Z offset applied to the skinned model's group when changed.
    pub position: f32,
    /// Carried in the record but not exposed as a widget.
    pub rotation: f32,
}

impl ControlParams {
    pub const DURATION_RANGE: std::ops::RangeInclusive<f32> = 1.0..=30.0;
    pub const DURATION_STEP: f64 = 2.0;
    pub const POSITION_RANGE: std::ops::RangeInclusive<f32> = -18.0..=18.0;
    pub const POSITION_STEP: f64 = 1.0;
}

impl Default for ControlParams {
    fn default() -> Self {
        Self {
            sound_on: false,
            animation_on: true,
            duration: 10.0,
            position: -8.0,
            rotation: 0.0,
        }
    }
}

/// What changed between two panel snapshots. Reacting only to edges keeps
/// side effects (restart playback, re-seat the model) from firing every frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ParamChanges {
    pub sound: Option<bool>,
    pub animation: Option<bool>,
    pub duration: Option<f32>,
    pub position: Option<f32>,
}

impl ParamChanges {
    pub fn diff(prev: &ControlParams, cur: &ControlParams) -> Self {
        Self {
            sound: (prev.sound_on != cur.sound_on).then_some(cur.sound_on),
            animation: (prev.animation_on != cur.animation_on).then_some(cur.animation_on),
            duration: (prev.duration != cur.duration).then_some(cur.duration),
            position: (prev.position != cur.position).then_some(cur.position),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Triangle-wave oscillator driving the cat along X.
///
/// The value ping-pongs between `min` and `max`, landing exactly on the bound
/// at a reversal no matter where the step would have overshot.
#[derive(Clone, Copy, Debug)]
pub struct Bounce {
    pub pos: f32,
    min: f32,
    max: f32,
    speed: f32,
    dir: f32,
}

impl Bounce {
    /// Starts at `start`, ascending.
    pub fn new(start: f32, min: f32, max: f32, speed: f32) -> Self {
        Self {
            pos: start.clamp(min, max),
            min,
            max,
            speed,
            dir: 1.0,
        }
    }

    /// Advance by one logical step.
    pub fn step(&mut self, step: f32) {
        self.pos += self.dir * self.speed * step;
        if self.pos >= self.max {
            self.pos = self.max;
            self.dir = -1.0;
        } else if self.pos <= self.min {
            self.pos = self.min;
            self.dir = 1.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_is_empty_when_nothing_changed() {
        let p = ControlParams::default();
        assert!(ParamChanges::diff(&p, &p).is_empty());
    }

    #[test]
    fn diff_reports_each_edge_once() {
        let prev = ControlParams::default();
        let mut cur = prev;
        cur.sound_on = true;
        cur.duration = 12.0;
        let ch = ParamChanges::diff(&prev, &cur);
        assert_eq!(ch.sound, Some(true));
        assert_eq!(ch.duration, Some(12.0));
        assert_eq!(ch.animation, None);
        assert_eq!(ch.position, None);
        // once applied, the same snapshot diffs empty
        assert!(ParamChanges::diff(&cur, &cur).is_empty());
    }

    #[test]
    fn bounce_starts_midway_and_ascends() {
        let mut b = Bounce::new(10.0, 5.0, 20.0, 0.1);
        assert_eq!(b.pos, 10.0);
        b.step(1.0);
        assert!(b.pos > 10.0, "expected ascent, got {}", b.pos);
    }

    #[test]
    fn bounce_stays_in_bounds_and_reverses() {
        let mut b = Bounce::new(10.0, 5.0, 20.0, 0.1);
        let mut seen_max = false;
        let mut seen_min_again = false;
        for _ in 0..1000 {
            b.step(1.0);
            assert!((5.0..=20.0).contains(&b.pos), "escaped: {}", b.pos);
            if b.pos == 20.0 {
                seen_max = true;
            }
            if seen_max && b.pos == 5.0 {
                seen_min_again = true;
            }
        }
        assert!(seen_max && seen_min_again, "never completed a round trip");
    }

    #[test]
    fn bounce_lands_exactly_on_the_bound_when_overshooting() {
        let mut b = Bounce::new(10.0, 5.0, 20.0, 0.7);
        for _ in 0..100 {
            b.step(1.3);
            assert!((5.0..=20.0).contains(&b.pos));
        }
    }
}
