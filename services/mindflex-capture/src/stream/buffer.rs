//! Backlog of received, not yet consumed bytes

/// Growable byte backlog with prefix removal
#[derive(Debug, Default, Clone)]
pub struct StreamBuffer {
    data: Vec<u8>,
}

impl StreamBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Append newly received bytes
    pub fn append(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Drop the first `n` bytes
    pub fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.data.len(), "consume({}) past end of {}", n, self.data.len());
        let n = n.min(self.data.len());
        self.data.drain(..n);
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Discard everything, e.g. on disconnect
    pub fn clear(&mut self) {
        self.data.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_consume() {
        let mut buf = StreamBuffer::new();
        buf.append(&[1, 2, 3]);
        buf.append(&[4, 5]);
        assert_eq!(buf.as_slice(), &[1, 2, 3, 4, 5]);

        buf.consume(2);
        assert_eq!(buf.as_slice(), &[3, 4, 5]);

        buf.consume(0);
        assert_eq!(buf.len(), 3);

        buf.consume(3);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut buf = StreamBuffer::with_capacity(16);
        buf.append(&[0xAA, 0xAA, 0x10]);
        buf.clear();
        assert!(buf.is_empty());
    }
}
