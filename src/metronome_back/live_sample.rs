use std::{num::NonZeroUsize, sync::Arc};

/// a single click that is currently being played back
#[derive(Debug)]
pub struct LiveSample {
    audio: Arc<[f32]>,
    idx: usize,
}

impl LiveSample {
    #[must_use]
    pub fn new(audio: Arc<[f32]>) -> Self {
        Self { audio, idx: 0 }
    }

    /// mixes the next frames into an interleaved buffer, duplicating the mono click onto every channel
    pub fn fill_buf(&mut self, buf: &mut [f32], channels: NonZeroUsize) {
        let Some(audio) = self.audio.get(self.idx..) else {
            return;
        };

        for (frame, s) in buf.chunks_exact_mut(channels.get()).zip(audio) {
            frame.iter_mut().for_each(|buf| *buf += s);
            self.idx += 1;
        }
    }

    #[must_use]
    pub fn over(&self) -> bool {
        self.idx >= self.audio.len()
    }
}
