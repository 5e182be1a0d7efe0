/// Fixed-length circular delay with feedback written back into the line.
#[derive(Clone, Debug)]
pub struct DelayLine {
    buffer: Vec<f32>,
    index: usize,
}

impl DelayLine {
    pub fn new(length: usize) -> Self {
        Self {
            buffer: vec![0.0; length.max(1)],
            index: 0,
        }
    }

    /// Returns the sample written `length` calls ago.
    #[inline]
    pub fn process(&mut self, input: f32, feedback: f32) -> f32 {
        let delayed = self.buffer[self.index];
        self.buffer[self.index] = input + delayed * feedback;
        self.index = (self.index + 1) % self.buffer.len();
        delayed
    }
}

/// Delay line read at a fractional, time-varying position.
#[derive(Clone, Debug)]
pub struct ModulatedDelayLine {
    buffer: Vec<f32>,
    write: usize,
}

impl ModulatedDelayLine {
    pub fn new(length: usize) -> Self {
        Self {
            buffer: vec![0.0; length.max(2)],
            write: 0,
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32, delay_samples: f32, feedback: f32) -> f32 {
        let len = self.buffer.len();
        let delay = delay_samples.clamp(0.0, (len - 1) as f32);
        let mut read_pos = self.write as f32 - delay;
        if read_pos < 0.0 {
            read_pos += len as f32;
        }
        let idx0 = read_pos.floor() as usize % len;
        let idx1 = (idx0 + 1) % len;
        let frac = read_pos - read_pos.floor();
        let delayed = self.buffer[idx0] * (1.0 - frac) + self.buffer[idx1] * frac;
        self.buffer[self.write] = input + delayed * feedback;
        self.write = (self.write + 1) % len;
        delayed
    }
}
