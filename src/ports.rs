use std::sync::atomic::{AtomicU32, Ordering};

/// Shared queue of pending ports over an inclusive range.
///
/// Pops hand out ports in ascending order. The cursor is a single atomic, so
/// concurrent callers never see the same port twice and never skip one.
/// The cursor is 32 bits wide: popping past `65535` cannot wrap back to a
/// low port.
#[derive(Debug)]
pub struct PortQueue {
    next: AtomicU32,
    end: u32,
    start: u32,
}

impl PortQueue {
    /// Populate the queue with every port in `[start, end]`.
    /// An inverted range yields an empty queue.
    pub fn seed(start: u16, end: u16) -> Self {
        Self {
            next: AtomicU32::new(u32::from(start)),
            end: u32::from(end),
            start: u32::from(start),
        }
    }

    /// Remove and return the lowest pending port, or `None` once drained.
    pub fn pop(&self) -> Option<u16> {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        if n > self.end {
            return None;
        }
        u16::try_from(n).ok()
    }

    /// Ports not yet handed out.
    pub fn remaining(&self) -> usize {
        let next = self.next.load(Ordering::Relaxed);
        (self.end + 1).saturating_sub(next) as usize
    }

    /// Size of the range the queue was seeded with; unaffected by pops.
    pub fn seeded_len(&self) -> usize {
        (self.end + 1).saturating_sub(self.start) as usize
    }

    /// True once every seeded port has been handed out.
    pub fn is_drained(&self) -> bool {
        self.remaining() == 0
    }
}
