//! Circular storage for calibration frames

use heapless::Vec;

use crate::frame::CcpFrame;

/// The maximum number of frames a self-owned store can hold
///
/// Two frames are enough for the simple drift estimate. Higher-order
/// interpolation (bicubic needs four) requires more history.
pub const MAX_FRAMES: usize = 4;

/// A fixed-size ring of calibration frames
///
/// Frames are addressed by a monotonically increasing index, which is always
/// reduced modulo the number of frames. The storage is either owned by the
/// store itself, or borrowed from somebody else. In the latter case, the
/// store never releases it.
#[derive(Debug)]
pub enum FrameStore<'a> {
    /// Storage owned by the store
    Owned(Vec<CcpFrame, MAX_FRAMES>),

    /// Storage borrowed from an external owner
    External(&'a mut [CcpFrame]),
}

impl<'a> FrameStore<'a> {
    /// Creates an empty self-owned store
    pub fn new() -> Self {
        FrameStore::Owned(Vec::new())
    }

    /// Fills an empty self-owned store with `n_frames` default slots
    ///
    /// Returns `false`, if `n_frames` exceeds [`MAX_FRAMES`].
    ///
    /// [`MAX_FRAMES`]: constant.MAX_FRAMES.html
    pub(crate) fn allocate(frames: &mut Vec<CcpFrame, MAX_FRAMES>, n_frames: usize) -> bool {
        frames.clear();
        (0..n_frames).all(|i| frames.push(CcpFrame::for_slot(i, n_frames)).is_ok())
    }

    /// Returns whether the storage is owned by the store
    pub fn is_owned(&self) -> bool {
        matches!(self, FrameStore::Owned(_))
    }

    /// The number of slots
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Returns whether the store has no slots, i.e. was never allocated or
    /// has been released
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// All slots, in storage order
    pub fn as_slice(&self) -> &[CcpFrame] {
        match self {
            FrameStore::Owned(frames) => &frames[..],
            FrameStore::External(frames) => &frames[..],
        }
    }

    /// All slots, in storage order
    pub fn as_mut_slice(&mut self) -> &mut [CcpFrame] {
        match self {
            FrameStore::Owned(frames) => &mut frames[..],
            FrameStore::External(frames) => &mut frames[..],
        }
    }

    /// Returns the slot for index `i`
    pub fn slot(&self, i: u32) -> Option<&CcpFrame> {
        let frames = self.as_slice();
        let n = frames.len();
        if n == 0 {
            return None;
        }

        frames.get(i as usize % n)
    }

    /// Returns the slot for index `i`
    pub fn slot_mut(&mut self, i: u32) -> Option<&mut CcpFrame> {
        let frames = self.as_mut_slice();
        let n = frames.len();
        if n == 0 {
            return None;
        }

        frames.get_mut(i as usize % n)
    }

    /// Returns the slot for `idx`
    pub fn current(&self, idx: u32) -> Option<&CcpFrame> {
        self.slot(idx)
    }

    /// Returns the slot before `idx`
    ///
    /// For `idx == 0` this is the last slot.
    pub fn previous(&self, idx: u32) -> Option<&CcpFrame> {
        let n = self.len();
        if n == 0 {
            return None;
        }

        self.as_slice().get(previous_position(idx, n))
    }

    /// Returns the slot before `idx`
    pub fn previous_mut(&mut self, idx: u32) -> Option<&mut CcpFrame> {
        let n = self.len();
        if n == 0 {
            return None;
        }

        self.as_mut_slice().get_mut(previous_position(idx, n))
    }

    /// Releases self-owned slots
    ///
    /// Borrowed storage is left untouched.
    pub(crate) fn release(&mut self) {
        if let FrameStore::Owned(frames) = self {
            frames.clear();
        }
    }
}

impl<'a> Default for FrameStore<'a> {
    fn default() -> Self {
        FrameStore::new()
    }
}

fn previous_position(idx: u32, n: usize) -> usize {
    (idx as usize % n + n - 1) % n
}
