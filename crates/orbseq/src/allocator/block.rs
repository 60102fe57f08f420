/// A half-open range `[cursor, end)` of reserved values not yet handed out.
///
/// Values leave a block strictly in increasing order. Once exhausted a block
/// is replaced, never reopened.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Block {
    cursor: u64,
    end: u64,
}

impl Block {
    /// The block every sequence starts with: already exhausted, so the first
    /// request triggers a store round-trip.
    pub const EMPTY: Self = Self { cursor: 0, end: 0 };

    /// Creates a block covering `[start, end)`.
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end);
        Self { cursor: start, end }
    }

    /// The next value this block will hand out.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// The exclusive upper bound of the block.
    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.end
    }

    pub fn remaining(&self) -> u64 {
        self.end.saturating_sub(self.cursor)
    }

    /// Hands out the cursor and advances it. The caller checks
    /// [`Block::is_exhausted`] first.
    #[inline]
    pub(crate) fn take(&mut self) -> u64 {
        debug_assert!(!self.is_exhausted());
        let value = self.cursor;
        self.cursor += 1;
        value
    }
}
