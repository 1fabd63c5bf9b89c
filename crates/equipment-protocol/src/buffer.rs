use crate::{BufferError, MAX_FRAME};

/// Soft cap on a connection's accumulated, unparsed bytes. Two frames' worth of slack tolerates a
/// full-size frame plus a partial successor without rejecting legitimate
/// traffic.
const HARD_CAP: usize = MAX_FRAME * 2;

/// Append-only per-connection receive buffer. Owned by exactly one reader
/// path (the connection's task) and never read concurrently.
#[derive(Debug, Default)]
pub struct ConnBuffer {
    buf: Vec<u8>,
}

impl ConnBuffer {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Copies `bytes` onto the end of the buffer.
    ///
    /// Fails with [`BufferError::Overflow`] without mutating the buffer if
    /// the combined length would exceed the hard cap.
    pub fn append(&mut self, bytes: &[u8]) -> Result<(), BufferError> {
        if self.buf.len() + bytes.len() > HARD_CAP {
            return Err(BufferError::Overflow(bytes.len()));
        }
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Greedily pulls every complete frame body currently in the buffer.
    ///
    /// Returns zero or more bodies. If a declared frame length exceeds
    /// [`MAX_FRAME`], the connection is in protocol error: the buffer is
    /// cleared and `Err` is returned (any bodies already decoded earlier in
    /// the same call are discarded along with it, since the stream can no
    /// longer be trusted to resynchronize).
    pub fn extract(&mut self) -> Result<Vec<Vec<u8>>, BufferError> {
        let mut out = Vec::new();
        let mut cursor = 0usize;

        loop {
            if self.buf.len() - cursor < 4 {
                break;
            }
            let len_bytes: [u8; 4] = self.buf[cursor..cursor + 4].try_into().unwrap();
            let n = u32::from_be_bytes(len_bytes);
            if n as usize > MAX_FRAME {
                self.buf.clear();
                return Err(BufferError::FrameTooLarge(n));
            }
            let body_end = cursor + 4 + n as usize;
            if self.buf.len() < body_end {
                break;
            }
            out.push(self.buf[cursor + 4..body_end].to_vec());
            cursor = body_end;
        }

        if cursor > 0 {
            self.buf.drain(0..cursor);
        }
        Ok(out)
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode;

    #[test]
    fn zero_or_more_bodies_per_call() {
        let mut buf = ConnBuffer::new();
        assert_eq!(buf.extract().unwrap(), Vec::<Vec<u8>>::new());

        let f1 = encode(1, 4, "dev1", &[]).unwrap();
        let f2 = encode(1, 4, "dev2", &[]).unwrap();
        let mut both = f1.clone();
        both.extend_from_slice(&f2);
        buf.append(&both).unwrap();
        let bodies = buf.extract().unwrap();
        assert_eq!(bodies.len(), 2);
        assert_eq!(bodies[0], &f1[4..]);
        assert_eq!(bodies[1], &f2[4..]);
    }

    #[test]
    fn streaming_law_byte_at_a_time_matches_whole_stream() {
        let f1 = encode(1, 1, "dev1", &["room_A", "projector"]).unwrap();
        let f2 = encode(2, 5, "place1", &["7", "2024", "2025", "lab session"]).unwrap();
        let mut stream = f1.clone();
        stream.extend_from_slice(&f2);

        let mut whole = ConnBuffer::new();
        whole.append(&stream).unwrap();
        let whole_bodies = whole.extract().unwrap();

        let mut piecewise = ConnBuffer::new();
        let mut piecewise_bodies = Vec::new();
        for byte in &stream {
            piecewise.append(std::slice::from_ref(byte)).unwrap();
            piecewise_bodies.extend(piecewise.extract().unwrap());
        }

        assert_eq!(whole_bodies, piecewise_bodies);
        assert_eq!(piecewise_bodies.len(), 2);
    }

    #[test]
    fn arbitrary_chunk_partition_matches_whole_stream() {
        let f1 = encode(1, 1, "dev1", &["room_A", "projector"]).unwrap();
        let f2 = encode(2, 6, "all", &[]).unwrap();
        let mut stream = f1.clone();
        stream.extend_from_slice(&f2);

        let mut whole = ConnBuffer::new();
        whole.append(&stream).unwrap();
        let expected = whole.extract().unwrap();

        // 10, 30, 28-byte chunks mirror arbitrary OS-level delivery boundaries.
        let chunk_sizes = [10usize, 30, stream.len().saturating_sub(40).max(1)];
        let mut piecewise = ConnBuffer::new();
        let mut got = Vec::new();
        let mut offset = 0;
        for size in chunk_sizes {
            let end = (offset + size).min(stream.len());
            if offset >= stream.len() {
                break;
            }
            piecewise.append(&stream[offset..end]).unwrap();
            got.extend(piecewise.extract().unwrap());
            offset = end;
        }
        if offset < stream.len() {
            piecewise.append(&stream[offset..]).unwrap();
            got.extend(piecewise.extract().unwrap());
        }

        assert_eq!(got, expected);
    }

    #[test]
    fn oversize_declared_length_clears_buffer_and_errors() {
        let mut buf = ConnBuffer::new();
        let mut bad = ((MAX_FRAME as u32) + 1).to_be_bytes().to_vec();
        bad.extend_from_slice(b"short");
        buf.append(&bad).unwrap();
        let err = buf.extract().unwrap_err();
        assert!(matches!(err, BufferError::FrameTooLarge(_)));
        assert!(buf.is_empty());
    }

    #[test]
    fn exact_max_frame_length_is_accepted() {
        let body = vec![b'x'; MAX_FRAME];
        let mut framed = (MAX_FRAME as u32).to_be_bytes().to_vec();
        framed.extend_from_slice(&body);
        let mut buf = ConnBuffer::new();
        buf.append(&framed).unwrap();
        let bodies = buf.extract().unwrap();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0].len(), MAX_FRAME);
    }

    #[test]
    fn append_overflow_is_rejected() {
        let mut buf = ConnBuffer::new();
        let huge = vec![0u8; HARD_CAP + 1];
        assert!(matches!(buf.append(&huge), Err(BufferError::Overflow(_))));
    }
}
