/// Ordered, append-only store of encoded chunks for one recording.
///
/// Zero-size chunks are discarded. The contents are consumed exactly once
/// by [`RecordingBuffer::take_all`]; after that the buffer is sealed and
/// refuses further appends.
#[derive(Debug, Default)]
pub struct RecordingBuffer {
    chunks: Vec<Vec<u8>>,
    byte_size: usize,
    sealed: bool,
}

impl RecordingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk in arrival order. Returns false if it was dropped.
    pub fn append(&mut self, chunk: Vec<u8>) -> bool {
        if self.sealed || chunk.is_empty() {
            return false;
        }
        self.byte_size += chunk.len();
        self.chunks.push(chunk);
        true
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn byte_size(&self) -> usize {
        self.byte_size
    }

    pub fn is_empty(&self) -> bool {
        self.byte_size == 0
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Seal the buffer and concatenate every chunk in arrival order.
    pub fn take_all(&mut self) -> Vec<u8> {
        self.sealed = true;
        let mut out = Vec::with_capacity(self.byte_size);
        for chunk in self.chunks.drain(..) {
            out.extend_from_slice(&chunk);
        }
        self.byte_size = 0;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_chunks_are_dropped() {
        let mut buf = RecordingBuffer::new();
        assert!(buf.append(vec![1; 120]));
        assert!(buf.append(vec![2; 130]));
        assert!(!buf.append(Vec::new()));

        assert_eq!(buf.chunk_count(), 2);
        assert_eq!(buf.byte_size(), 250);
    }

    #[test]
    fn take_all_preserves_order() {
        let mut buf = RecordingBuffer::new();
        buf.append(vec![1, 2]);
        buf.append(vec![3]);
        buf.append(vec![4, 5, 6]);

        assert_eq!(buf.take_all(), vec![1, 2, 3, 4, 5, 6]);
        assert!(buf.is_empty());
    }

    #[test]
    fn sealed_after_take() {
        let mut buf = RecordingBuffer::new();
        buf.append(vec![9]);
        buf.take_all();

        assert!(buf.is_sealed());
        assert!(!buf.append(vec![1, 2, 3]));
        assert!(buf.take_all().is_empty());
    }

    #[test]
    fn empty_buffer() {
        let mut buf = RecordingBuffer::new();
        assert!(buf.is_empty());
        assert!(buf.take_all().is_empty());
    }
}
