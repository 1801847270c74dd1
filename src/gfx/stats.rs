//! Frame timing counter shown in the overlay.

use std::time::Instant;

pub struct FrameStats {
    last: Instant,
    frames: u32,
    pub fps: f32,
    pub frame_ms: f32,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            fps: 0.0,
            frame_ms: 0.0,
        }
    }
}

impl FrameStats {
    /// Call once per presented frame; averages over one-second windows.
    pub fn on_frame(&mut self) {
        self.frames += 1;
        let elapsed = self.last.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            self.fps = self.frames as f32 / elapsed;
            self.frame_ms = if self.frames > 0 {
                elapsed * 1000.0 / self.frames as f32
            } else {
                0.0
            };
            self.frames = 0;
            self.last = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_start_at_zero() {
        let s = FrameStats::default();
        assert_eq!(s.fps, 0.0);
        assert_eq!(s.frame_ms, 0.0);
    }

    #[test]
    fn window_rolls_over_after_a_second() {
        let mut s = FrameStats::default();
        s.last = Instant::now() - std::time::Duration::from_secs(2);
        for _ in 0..120 {
            s.frames += 1;
        }
        s.on_frame();
        assert!(s.fps > 0.0);
        assert_eq!(s.frames, 0);
    }
}
