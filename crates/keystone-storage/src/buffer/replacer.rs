//! Clock page-replacement policy.
//!
//! The clock algorithm approximates LRU with a single reference bit per
//! frame and a hand that sweeps the frame ring:
//!
//! 1. A frame enters the candidate set when its pin count drops to zero,
//!    with its reference bit set.
//! 2. The hand sweeps the ring. A candidate with the reference bit set gets
//!    the bit cleared and is passed over.
//! 3. A candidate with the bit clear is the victim.
//!
//! One full revolution clears every reference bit, so a victim is found in
//! at most two revolutions whenever the candidate set is non-empty.

use parking_lot::Mutex;

use super::frame::FrameId;

/// Per-frame replacement state.
#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    /// The frame is currently a candidate for eviction (unpinned).
    evictable: bool,
    /// Clock reference bit.
    referenced: bool,
}

#[derive(Debug)]
struct ClockState {
    slots: Vec<Slot>,
    hand: usize,
    /// Count of evictable slots; kept in step so `size` is O(1).
    evictable_count: usize,
}

/// Clock replacer over a fixed ring of `num_frames` frames.
///
/// The replacer holds frame indices only, never page data. All four
/// operations are serialized by a single internal mutex (the leaf of the
/// lock hierarchy).
pub struct ClockReplacer {
    state: Mutex<ClockState>,
}

impl ClockReplacer {
    /// Creates a replacer for `num_frames` frames, none of them evictable.
    ///
    /// Frames start out on the buffer pool's free list, not in the
    /// replacer; they only become candidates once fetched and unpinned.
    pub fn new(num_frames: usize) -> Self {
        Self {
            state: Mutex::new(ClockState {
                slots: vec![Slot::default(); num_frames],
                hand: 0,
                evictable_count: 0,
            }),
        }
    }

    /// Selects a victim frame and removes it from the candidate set.
    ///
    /// Returns `None` when no frame is evictable.
    pub fn victim(&self) -> Option<FrameId> {
        let mut state = self.state.lock();
        if state.evictable_count == 0 {
            return None;
        }

        loop {
            let hand = state.hand;
            let slot = state.slots[hand];
            if slot.evictable {
                if slot.referenced {
                    state.slots[hand].referenced = false;
                } else {
                    state.slots[hand].evictable = false;
                    state.evictable_count -= 1;
                    state.advance();
                    return Some(FrameId::new(hand));
                }
            }
            state.advance();
        }
    }

    /// Removes a frame from the candidate set.
    ///
    /// No-op if the frame is already ineligible.
    pub fn pin(&self, frame_id: FrameId) {
        let mut state = self.state.lock();
        let slot = &mut state.slots[frame_id.index()];
        if slot.evictable {
            slot.evictable = false;
            state.evictable_count -= 1;
        }
    }

    /// Adds a frame to the candidate set with its reference bit set.
    ///
    /// No-op if the frame is already a candidate.
    pub fn unpin(&self, frame_id: FrameId) {
        let mut state = self.state.lock();
        let slot = &mut state.slots[frame_id.index()];
        if !slot.evictable {
            slot.evictable = true;
            slot.referenced = true;
            state.evictable_count += 1;
        }
    }

    /// Number of frames currently eligible for eviction.
    pub fn size(&self) -> usize {
        self.state.lock().evictable_count
    }
}

impl ClockState {
    #[inline]
    fn advance(&mut self) {
        self.hand = (self.hand + 1) % self.slots.len();
    }
}

impl std::fmt::Debug for ClockReplacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ClockReplacer")
            .field("num_frames", &state.slots.len())
            .field("hand", &state.hand)
            .field("evictable", &state.evictable_count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let replacer = ClockReplacer::new(4);
        assert_eq!(replacer.size(), 0);
        assert_eq!(replacer.victim(), None);
    }

    #[test]
    fn test_unpin_then_victim() {
        let replacer = ClockReplacer::new(4);
        replacer.unpin(FrameId::new(2));
        assert_eq!(replacer.size(), 1);

        // Reference bit is set on unpin; one sweep clears it, the second
        // revolution selects the frame.
        assert_eq!(replacer.victim(), Some(FrameId::new(2)));
        assert_eq!(replacer.size(), 0);
        assert_eq!(replacer.victim(), None);
    }

    #[test]
    fn test_pin_removes_candidate() {
        let replacer = ClockReplacer::new(3);
        replacer.unpin(FrameId::new(0));
        replacer.unpin(FrameId::new(1));
        replacer.pin(FrameId::new(0));
        assert_eq!(replacer.size(), 1);
        assert_eq!(replacer.victim(), Some(FrameId::new(1)));
    }

    #[test]
    fn test_pin_unpin_idempotent() {
        let replacer = ClockReplacer::new(2);
        replacer.pin(FrameId::new(0));
        assert_eq!(replacer.size(), 0);

        replacer.unpin(FrameId::new(0));
        replacer.unpin(FrameId::new(0));
        assert_eq!(replacer.size(), 1);
    }

    #[test]
    fn test_clock_ordering() {
        // Unpin 0,1,2, then pin 1; victims come out in hand order,
        // skipping the pinned frame.
        let replacer = ClockReplacer::new(3);
        replacer.unpin(FrameId::new(0));
        replacer.unpin(FrameId::new(1));
        replacer.unpin(FrameId::new(2));
        replacer.pin(FrameId::new(1));

        let first = replacer.victim().unwrap();
        let second = replacer.victim().unwrap();
        assert_eq!(replacer.victim(), None);

        let mut got = [first.index(), second.index()];
        got.sort_unstable();
        assert_eq!(got, [0, 2]);
        // Hand starts at 0, so frame 0 is reached first.
        assert_eq!(first, FrameId::new(0));
    }

    #[test]
    fn test_reference_bit_grants_second_chance() {
        let replacer = ClockReplacer::new(2);
        replacer.unpin(FrameId::new(0));
        replacer.unpin(FrameId::new(1));

        // First victim clears both reference bits while sweeping and takes
        // frame 0; the hand then rests on frame 1.
        assert_eq!(replacer.victim(), Some(FrameId::new(0)));

        // Re-adding frame 0 sets its bit again, so frame 1 goes first.
        replacer.unpin(FrameId::new(0));
        assert_eq!(replacer.victim(), Some(FrameId::new(1)));
        assert_eq!(replacer.victim(), Some(FrameId::new(0)));
    }

    #[test]
    fn test_size_tracks_candidates() {
        let replacer = ClockReplacer::new(8);
        for i in 0..5 {
            replacer.unpin(FrameId::new(i));
        }
        assert_eq!(replacer.size(), 5);
        replacer.victim();
        assert_eq!(replacer.size(), 4);
        replacer.pin(FrameId::new(4));
        assert_eq!(replacer.size(), 3);
    }
}
