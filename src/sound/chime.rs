//! Synthesized completion chime.
//!
//! Three sine tones of rising pitch, each starting at gain 0.3 and decaying
//! exponentially to 0.01 over its duration. Tones overlap and are mixed.

/// Output sample rate for the rendered chime.
pub const SAMPLE_RATE: u32 = 44_100;

/// Gain at the start of each tone.
pub const PEAK_GAIN: f32 = 0.3;

/// Gain at the end of each tone.
pub const FLOOR_GAIN: f32 = 0.01;

/// One sine tone of the chime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    /// Offset from the start of the chime
    pub start_secs: f32,
    pub duration_secs: f32,
}

impl Tone {
    pub const fn new(frequency_hz: f32, start_secs: f32, duration_secs: f32) -> Self {
        Self {
            frequency_hz,
            start_secs,
            duration_secs,
        }
    }

    pub fn end_secs(&self) -> f32 {
        self.start_secs + self.duration_secs
    }

    /// Envelope gain `elapsed` seconds into the tone.
    fn gain(&self, elapsed: f32) -> f32 {
        let t = (elapsed / self.duration_secs).clamp(0.0, 1.0);
        PEAK_GAIN * (FLOOR_GAIN / PEAK_GAIN).powf(t)
    }
}

/// C5, E5, G5.
pub const CHIME_TONES: [Tone; 3] = [
    Tone::new(523.0, 0.0, 0.3),
    Tone::new(659.0, 0.15, 0.3),
    Tone::new(784.0, 0.3, 0.5),
];

/// A chime made of overlapping tones.
#[derive(Debug, Clone, PartialEq)]
pub struct Chime {
    tones: Vec<Tone>,
}

impl Default for Chime {
    fn default() -> Self {
        Self {
            tones: CHIME_TONES.to_vec(),
        }
    }
}

impl Chime {
    pub fn new(tones: Vec<Tone>) -> Self {
        Self { tones }
    }

    pub fn tones(&self) -> &[Tone] {
        &self.tones
    }

    /// Length of the chime in seconds.
    pub fn duration_secs(&self) -> f32 {
        self.tones.iter().map(Tone::end_secs).fold(0.0, f32::max)
    }

    /// Renders mono samples at `sample_rate`.
    pub fn render(&self, sample_rate: u32) -> Vec<f32> {
        let rate = sample_rate as f32;
        let len = (self.duration_secs() * rate).round() as usize;
        let mut samples = vec![0.0f32; len];

        for tone in &self.tones {
            let first = (tone.start_secs * rate).round() as usize;
            let last = ((tone.end_secs() * rate).round() as usize).min(len);
            let omega = 2.0 * std::f32::consts::PI * tone.frequency_hz;

            for (i, sample) in samples.iter_mut().enumerate().take(last).skip(first) {
                let elapsed = (i - first) as f32 / rate;
                *sample += tone.gain(elapsed) * (omega * elapsed).sin();
            }
        }

        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tones() {
        let chime = Chime::default();
        let freqs: Vec<f32> = chime.tones().iter().map(|t| t.frequency_hz).collect();
        assert_eq!(freqs, vec![523.0, 659.0, 784.0]);
    }

    #[test]
    fn test_duration() {
        assert!((Chime::default().duration_secs() - 0.8).abs() < 1e-6);
        assert_eq!(Chime::new(Vec::new()).duration_secs(), 0.0);
    }

    #[test]
    fn test_envelope_decays() {
        let tone = CHIME_TONES[0];
        assert!((tone.gain(0.0) - PEAK_GAIN).abs() < 1e-6);
        assert!((tone.gain(tone.duration_secs) - FLOOR_GAIN).abs() < 1e-6);
        assert!(tone.gain(0.1) > tone.gain(0.2));
    }

    #[test]
    fn test_render_length() {
        let samples = Chime::default().render(1000);
        assert_eq!(samples.len(), 800);
    }

    #[test]
    fn test_render_stays_in_range() {
        let samples = Chime::default().render(SAMPLE_RATE);
        assert!(samples.iter().all(|s| s.abs() <= 1.0));
        assert!(samples.iter().any(|s| s.abs() > 0.1));
    }

    #[test]
    fn test_render_empty_chime() {
        assert!(Chime::new(Vec::new()).render(SAMPLE_RATE).is_empty());
    }
}
