use std::ops::Range;

/// Offset into the loaded post list for chunked rendering.
///
/// Each call to [`next_range`](Self::next_range) advances by a full chunk even
/// when fewer posts were left, so once the list is exhausted every further
/// range is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchCursor {
    loaded: usize,
    chunk_size: usize,
}

impl BatchCursor {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            loaded: 0,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Indices of the next chunk within a list of `len` posts.
    pub fn next_range(&mut self, len: usize) -> Range<usize> {
        let start = self.loaded.min(len);
        let end = self.loaded.saturating_add(self.chunk_size).min(len);
        self.loaded = self.loaded.saturating_add(self.chunk_size);
        start..end
    }

    /// Posts handed out so far, counting the overshoot of the last chunk.
    pub fn loaded(&self) -> usize {
        self.loaded
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn reset(&mut self) {
        self.loaded = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twelve_posts_in_fives() {
        let mut cursor = BatchCursor::new(5);
        let sizes: Vec<usize> = (0..4).map(|_| cursor.next_range(12).len()).collect();
        assert_eq!(sizes, vec![5, 5, 2, 0]);
        assert_eq!(cursor.loaded(), 20);
    }

    #[test]
    fn ranges_are_contiguous() {
        let mut cursor = BatchCursor::new(3);
        assert_eq!(cursor.next_range(7), 0..3);
        assert_eq!(cursor.next_range(7), 3..6);
        assert_eq!(cursor.next_range(7), 6..7);
        assert_eq!(cursor.next_range(7), 7..7);
        assert!(cursor.next_range(7).is_empty());
    }

    #[test]
    fn zero_chunk_is_bumped_to_one() {
        let mut cursor = BatchCursor::new(0);
        assert_eq!(cursor.chunk_size(), 1);
        assert_eq!(cursor.next_range(2), 0..1);
        cursor.reset();
        assert_eq!(cursor.next_range(2), 0..1);
    }
}
