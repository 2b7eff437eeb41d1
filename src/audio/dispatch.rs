use crossbeam_channel::Sender;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// Average interleaved channels into mono while converting each sample to f32,
/// so the meter sees one channel regardless of the microphone layout.
///
/// A trailing partial frame is averaged over the samples that arrived.
pub(crate) fn append_downmixed_samples<T, F>(
    buf: &mut Vec<f32>,
    data: &[T],
    channels: usize,
    mut convert: F,
) where
    T: Copy,
    F: FnMut(T) -> f32,
{
    let channels = channels.max(1);
    buf.reserve(data.len().div_ceil(channels));
    for frame in data.chunks(channels) {
        let sum: f32 = frame.iter().map(|&sample| convert(sample)).sum();
        buf.push(sum / frame.len() as f32);
    }
}

/// Re-chunks arbitrary callback buffers into fixed-size mono frames.
///
/// Runs on the audio callback thread, so it never blocks: a full channel drops
/// the frame and bumps `dropped` instead.
pub(super) struct FrameDispatcher {
    frame_samples: usize,
    pending: Vec<f32>,
    sender: Sender<Vec<f32>>,
    dropped: Arc<AtomicUsize>,
}

impl FrameDispatcher {
    pub(super) fn new(
        frame_samples: usize,
        sender: Sender<Vec<f32>>,
        dropped: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            frame_samples: frame_samples.max(1),
            pending: Vec::with_capacity(frame_samples),
            sender,
            dropped,
        }
    }

    pub(super) fn push<T, F>(&mut self, data: &[T], channels: usize, convert: F)
    where
        T: Copy,
        F: FnMut(T) -> f32,
    {
        append_downmixed_samples(&mut self.pending, data, channels, convert);

        while self.pending.len() >= self.frame_samples {
            let rest = self.pending.split_off(self.frame_samples);
            let frame = std::mem::replace(&mut self.pending, rest);
            if let Err(err) = self.sender.try_send(frame) {
                if err.is_disconnected() {
                    // Meter worker is gone; nothing will read further frames.
                    self.pending.clear();
                    return;
                }
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Samples buffered toward the next frame.
    pub(super) fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
