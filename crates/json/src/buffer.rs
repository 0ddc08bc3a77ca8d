//! Growable byte buffer with an explicit write cursor.

use core::fmt;

/// Smallest capacity a buffer is created with.
pub const MIN_CAPACITY: usize = 16;

/// A contiguous byte region plus a write position.
///
/// Every write reserves its own space first: once a write would carry the
/// cursor past 80% of the capacity, the region is reallocated at double the
/// size and the written bytes are copied over. The buffer never shrinks.
pub struct ByteBuffer {
    bytes: Box<[u8]>,
    position: usize,
}

impl ByteBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity.max(MIN_CAPACITY)].into_boxed_slice(),
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position == 0
    }

    /// The written region.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.position]
    }

    /// Make room for `additional` more bytes, keeping the cursor under 80%.
    pub fn reserve(&mut self, additional: usize) {
        let needed = self.position + additional;
        if !Self::past_threshold(needed, self.capacity()) {
            return;
        }

        let mut capacity = self.capacity();
        while Self::past_threshold(needed, capacity) {
            capacity *= 2;
        }

        tracing::trace!(from = self.capacity(), to = capacity, "growing json buffer");

        let mut grown = vec![0; capacity].into_boxed_slice();
        grown[..self.position].copy_from_slice(&self.bytes[..self.position]);
        self.bytes = grown;
    }

    fn past_threshold(position: usize, capacity: usize) -> bool {
        position * 5 >= capacity * 4
    }

    pub fn put(&mut self, byte: u8) {
        self.reserve(1);
        self.bytes[self.position] = byte;
        self.position += 1;
    }

    pub fn put_slice(&mut self, src: &[u8]) {
        self.reserve(src.len());
        self.bytes[self.position..self.position + src.len()].copy_from_slice(src);
        self.position += src.len();
    }

    /// Advance the cursor by `len` and return the claimed region for filling.
    pub fn claim(&mut self, len: usize) -> &mut [u8] {
        self.reserve(len);
        let start = self.position;
        self.position += len;
        &mut self.bytes[start..self.position]
    }

    pub fn last(&self) -> Option<u8> {
        self.as_bytes().last().copied()
    }

    /// Overwrite the last written byte, or append when nothing is written yet.
    pub fn set_last(&mut self, byte: u8) {
        match self.position {
            0 => self.put(byte),
            n => self.bytes[n - 1] = byte,
        }
    }

    /// Drop the last written byte.
    pub fn pop(&mut self) -> Option<u8> {
        let last = self.last()?;
        self.position -= 1;
        Some(last)
    }

    /// Reset the cursor. Capacity is kept.
    pub fn clear(&mut self) {
        self.position = 0;
    }
}

impl Default for ByteBuffer {
    fn default() -> Self {
        Self::with_capacity(MIN_CAPACITY)
    }
}

impl fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("position", &self.position)
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl fmt::Write for ByteBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.put_slice(s.as_bytes());
        Ok(())
    }
}
