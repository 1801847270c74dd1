//! Looping soundtrack playback.
//!
//! `Playback` is the seam the frame loop talks to; `Soundtrack` is the rodio
//! implementation. Starting silent matches the panel's default, and a failed
//! audio device just means the toggle does nothing (logged once at startup).
//! Turning sound off stops the track outright, so turning it back on restarts
//! from the beginning.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rodio::source::Source;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

/// Minimal transport controls over the looping track.
pub trait Playback {
    fn play(&mut self);
    /// Halt playback and discard the position; the next `play` starts over.
    fn stop(&mut self);
}

/// Apply a sound toggle edge to whatever playback backend is present.
pub fn apply_sound_toggle(playback: &mut dyn Playback, on: bool) {
    if on {
        playback.play();
    } else {
        playback.stop();
    }
}

pub struct Soundtrack {
    sink: Sink,
    path: PathBuf,
    // Dropping the stream silences the sink, so it rides along.
    _stream: OutputStream,
    _handle: OutputStreamHandle,
}

impl Soundtrack {
    /// Open the default output device for `path`; nothing plays until the
    /// first `play`.
    pub fn new(path: &Path, volume: f32) -> Result<Self> {
        let (stream, handle) = OutputStream::try_default().context("open audio output")?;
        let sink = Sink::try_new(&handle).context("create audio sink")?;
        sink.set_volume(volume);
        // decode up front so a broken file fails at startup, not on toggle
        drop(open_looped(path)?);
        Ok(Self {
            sink,
            path: path.to_path_buf(),
            _stream: stream,
            _handle: handle,
        })
    }
}

fn open_looped(
    path: &Path,
) -> Result<rodio::source::Repeat<Decoder<BufReader<File>>>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    Ok(Decoder::new(BufReader::new(file))
        .with_context(|| format!("decode {}", path.display()))?
        .repeat_infinite())
}

impl Playback for Soundtrack {
    fn play(&mut self) {
        if self.sink.empty() {
            match open_looped(&self.path) {
                Ok(src) => self.sink.append(src),
                Err(e) => {
                    log::error!("restart soundtrack: {e:#}");
                    return;
                }
            }
        }
        self.sink.play();
    }

    fn stop(&mut self) {
        // empties the queue; position resets to the top of the track
        self.sink.stop();
    }
}

/// Stand-in used when no audio device or track is available.
#[derive(Default)]
pub struct NullPlayback;

impl Playback for NullPlayback {
    fn play(&mut self) {}
    fn stop(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counting {
        plays: u32,
        stops: u32,
    }

    impl Playback for Counting {
        fn play(&mut self) {
            self.plays += 1;
        }
        fn stop(&mut self) {
            self.stops += 1;
        }
    }

    #[test]
    fn toggle_maps_to_transport_calls() {
        let mut c = Counting::default();
        apply_sound_toggle(&mut c, true);
        apply_sound_toggle(&mut c, false);
        apply_sound_toggle(&mut c, true);
        assert_eq!(c.plays, 2);
        assert_eq!(c.stops, 1);
    }

    #[test]
    fn falling_edge_stops_rather_than_pauses() {
        // a track turned off and on again must start over, so the off edge
        // discards the position instead of holding it
        #[derive(Default)]
        struct Positional {
            secs: f32,
            playing: bool,
        }
        impl Playback for Positional {
            fn play(&mut self) {
                self.playing = true;
            }
            fn stop(&mut self) {
                self.playing = false;
                self.secs = 0.0;
            }
        }
        let mut p = Positional::default();
        apply_sound_toggle(&mut p, true);
        p.secs = 42.0;
        apply_sound_toggle(&mut p, false);
        apply_sound_toggle(&mut p, true);
        assert!(p.playing);
        assert_eq!(p.secs, 0.0);
    }

    #[test]
    fn null_playback_is_inert() {
        let mut n = NullPlayback;
        apply_sound_toggle(&mut n, true);
        apply_sound_toggle(&mut n, false);
    }
}
