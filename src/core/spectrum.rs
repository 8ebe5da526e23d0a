use crate::core::constants::FREQUENCY_BIN_COUNT;

/// Live frequency-domain view of an audio stream (an analyser node).
pub trait FrequencySource {
    fn frequency_bin_count(&self) -> usize;
    /// Write current byte magnitudes (0..=255) into `out`. Implementations
    /// fill at most `out.len()` bins.
    fn byte_frequency_data(&self, out: &mut [u8]);
}

/// Reusable per-frame magnitude buffer, owned by the visualizer.
#[derive(Clone, Debug)]
pub struct SpectrumFrame {
    bins: Vec<u8>,
    sampled_frame: Option<u64>,
}

impl Default for SpectrumFrame {
    fn default() -> Self {
        Self::with_bins(FREQUENCY_BIN_COUNT)
    }
}

impl SpectrumFrame {
    pub fn with_bins(n: usize) -> Self {
        Self {
            bins: vec![0; n],
            sampled_frame: None,
        }
    }

    pub fn bins(&self) -> &[u8] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Repopulate the buffer for `frame_index`. With no source the buffer is
    /// zeroed (an empty spectrum). Returns `false` without touching the buffer
    /// if this frame was already sampled.
    pub fn sample(&mut self, source: Option<&dyn FrequencySource>, frame_index: u64) -> bool {
        if self.sampled_frame == Some(frame_index) {
            return false;
        }
        self.sampled_frame = Some(frame_index);
        match source {
            Some(src) => sample(src, &mut self.bins),
            None => self.bins.fill(0),
        }
        true
    }
}

/// Copy the analyser's current magnitudes into `buffer`. Bins the source
/// cannot provide are zeroed so the buffer is always fully repopulated.
pub fn sample(source: &dyn FrequencySource, buffer: &mut [u8]) {
    let n = source.frequency_bin_count().min(buffer.len());
    let (live, rest) = buffer.split_at_mut(n);
    source.byte_frequency_data(live);
    rest.fill(0);
}
