/// Mono 16-bit PCM audio held in memory.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioSegment {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl AudioSegment {
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// `floor(time * rate)`, clamped to the recording.
    pub fn sample_index_at_time(&self, time: f64) -> usize {
        let index = (time.max(0.0) * self.sample_rate as f64).floor() as usize;
        index.min(self.samples.len())
    }

    /// Samples between two times in seconds. An inverted range is empty.
    pub fn slice(&self, start: f64, end: f64) -> &[i16] {
        let from = self.sample_index_at_time(start);
        let to = self.sample_index_at_time(end).max(from);
        &self.samples[from..to]
    }
}
