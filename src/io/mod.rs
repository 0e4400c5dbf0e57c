// Purpose - external interfaces, format conversions

pub mod converter;
pub mod midi;

/// Planar output buffers, one `Vec` per channel.
#[derive(Debug, Default, Clone)]
pub struct AudioOutput {
    pub buffers: Vec<Vec<f32>>,
}

impl AudioOutput {
    pub fn new(channels: usize, block_size: usize) -> Self {
        Self {
            buffers: vec![vec![0.0; block_size]; channels],
        }
    }

    pub fn channels(&self) -> usize {
        self.buffers.len()
    }

    /// Frames every channel can hold.
    pub fn block_size(&self) -> usize {
        self.buffers.iter().map(Vec::len).min().unwrap_or(0)
    }
}
