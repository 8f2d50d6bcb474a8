use rand::rngs::StdRng;
use rand::Rng;

/// Randomness consumed by the simulation. Only the distributions matter;
/// tests swap in a scripted sequence.
pub(crate) trait RandomSource {
    /// Uniform sample in `[0, 1)`.
    fn unit(&mut self) -> f64;

    /// Uniform integer in `lo..=hi`. Returns `lo` when the range is empty.
    fn range_inclusive(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        let span = f64::from(hi - lo) + 1.0;
        let offset = (self.unit() * span).floor() as i32;
        (lo + offset).min(hi)
    }

    /// Uniform duration in `[min_ms, max_ms)`.
    fn duration_ms(&mut self, min_ms: u64, max_ms: u64) -> u64 {
        if max_ms <= min_ms {
            return min_ms;
        }
        let span = (max_ms - min_ms) as f64;
        min_ms + (self.unit() * span) as u64
    }
}

impl RandomSource for StdRng {
    fn unit(&mut self) -> f64 {
        self.random::<f64>()
    }

    fn range_inclusive(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        self.random_range(lo..=hi)
    }
}

/// Replays a fixed list of unit samples, cycling when exhausted.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct ScriptedRandom {
    values: Vec<f64>,
    cursor: usize,
}

#[cfg(test)]
impl ScriptedRandom {
    pub(crate) fn new(values: &[f64]) -> Self {
        assert!(!values.is_empty(), "scripted random needs at least one value");
        Self {
            values: values.to_vec(),
            cursor: 0,
        }
    }

    pub(crate) fn draws(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
impl RandomSource for ScriptedRandom {
    fn unit(&mut self) -> f64 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value.clamp(0.0, 0.999_999)
    }
}
