/// Sound engine: procedural 8-bit style sound effects via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile with `--no-default-features` or without "sound" feature
/// to disable audio entirely (the stub SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::{gen_correct, gen_round, gen_wrong, make_wav};

    /// Pre-generated WAV buffers for each sound effect.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_correct: Arc<Vec<u8>>,
        sfx_wrong: Arc<Vec<u8>>,
        sfx_round: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::warn!(%e, "no audio output; sound disabled");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_correct: Arc::new(make_wav(&gen_correct())),
                sfx_wrong: Arc::new(make_wav(&gen_wrong())),
                sfx_round: Arc::new(make_wav(&gen_round())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        pub fn play_correct(&self) { self.play(&self.sfx_correct); }
        pub fn play_wrong(&self) { self.play(&self.sfx_wrong); }
        pub fn play_round(&self) { self.play(&self.sfx_round); }
    }
}

// ════════════════════════════════════════════════════════════
//  Waveform generators — all produce Vec<f32> mono samples
// ════════════════════════════════════════════════════════════

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
const SAMPLE_RATE: u32 = 22050;

/// Sine tone with a linear fade, plus an optional octave overtone.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn tone(freq: f32, duration: f32, volume: f32, overtone: f32) -> Vec<f32> {
    let n = (SAMPLE_RATE as f32 * duration) as usize;
    (0..n)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - (i as f32 / n as f32);
            let base = (t * freq * 2.0 * std::f32::consts::PI).sin();
            let octave = (t * freq * 2.0 * 2.0 * std::f32::consts::PI).sin();
            (base * (1.0 - overtone) + octave * overtone) * env * volume
        })
        .collect()
}

/// Correct: bright ascending arpeggio C5→E5→G5→C6
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_correct() -> Vec<f32> {
    let notes = [523.0_f32, 659.0, 784.0, 1047.0];
    let mut samples = Vec::new();
    for (i, &freq) in notes.iter().enumerate() {
        let dur = if i + 1 == notes.len() { 0.2 } else { 0.06 };
        samples.extend(tone(freq, dur, 0.3, 0.3));
    }
    samples
}

/// Wrong: two low descending square-ish notes
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_wrong() -> Vec<f32> {
    let notes = [233.0_f32, 175.0]; // Bb3 → F3
    let mut samples = Vec::new();
    for &freq in &notes {
        let n = (SAMPLE_RATE as f32 * 0.12) as usize;
        for i in 0..n {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - (i as f32 / n as f32) * 0.5;
            let phase = (t * freq).fract();
            let square = if phase < 0.5 { 1.0 } else { -1.0 };
            samples.push(square * env * 0.12);
        }
    }
    samples
}

/// New round: short soft blip
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_round() -> Vec<f32> {
    tone(880.0, 0.04, 0.2, 0.0)
}

// ════════════════════════════════════════════════════════════
//  WAV encoder — wraps f32 samples into a valid WAV buffer
// ════════════════════════════════════════════════════════════

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn make_wav(samples: &[f32]) -> Vec<u8> {
    let num_channels: u16 = 1;
    let bits_per_sample: u16 = 16;
    let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
    let block_align = num_channels * bits_per_sample / 8;
    let data_size = samples.len() as u32 * 2; // 16-bit = 2 bytes per sample
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes());  // PCM format
    buf.extend_from_slice(&num_channels.to_le_bytes());
    buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());

    for &s in samples {
        let clamped = s.clamp(-1.0, 1.0);
        let val = (clamped * 32767.0) as i16;
        buf.extend_from_slice(&val.to_le_bytes());
    }

    buf
}

// ════════════════════════════════════════════════════════════
//  Public API — compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_correct(&self) {}
    pub fn play_wrong(&self) {}
    pub fn play_round(&self) {}
}
