use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Tracks whether the last submitted frame is still running on the GPU.
///
/// Armed right after `Queue::submit`, cleared by the queue's work-done
/// callback, and waited on before the CPU side rebuilds the next frame.
#[derive(Debug, Clone, Default)]
pub struct SubmissionFence {
    pending: Arc<AtomicBool>,
}

impl SubmissionFence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Marks the most recent submission on `queue` as in flight.
    ///
    /// Must run after the submit: the callback attaches to the last
    /// submission the queue has seen.
    pub fn arm(&self, queue: &wgpu::Queue) {
        queue.on_submitted_work_done(self.mark_pending());
    }

    /// Blocks until the armed submission completes. No-op when nothing is
    /// pending.
    pub fn wait(&self, device: &wgpu::Device) {
        if !self.is_pending() {
            return;
        }

        log::debug!("sync on renderer");
        let wait = wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        };
        if let Err(err) = device.poll(wait) {
            log::warn!("device poll failed: {err}");
        }
    }

    /// Sets the pending flag and returns the closure that clears it.
    fn mark_pending(&self) -> impl FnOnce() + Send + 'static {
        self.pending.store(true, Ordering::Release);
        let pending = Arc::clone(&self.pending);
        move || pending.store(false, Ordering::Release)
    }
}
