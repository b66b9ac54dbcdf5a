use super::ReadAt;
use async_trait::async_trait;
use std::io;

/// In-memory byte source, used for archives fetched over the network.
///
/// Holds no external resource, so dropping it is all closing takes.
pub struct MemoryReader {
    data: Vec<u8>,
}

impl MemoryReader {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl From<Vec<u8>> for MemoryReader {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

#[async_trait]
impl ReadAt for MemoryReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let Ok(start) = usize::try_from(offset) else {
            return Ok(0);
        };
        let Some(available) = self.data.get(start..) else {
            return Ok(0);
        };

        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        Ok(n)
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn short_read_at_tail() {
        let reader = MemoryReader::new(b"hello".to_vec());
        let mut buf = [0u8; 4];

        assert_eq!(reader.read_at(3, &mut buf).await.unwrap(), 2);
        assert_eq!(&buf[..2], b"lo");
        assert_eq!(reader.read_at(5, &mut buf).await.unwrap(), 0);
        assert_eq!(reader.read_at(u64::MAX, &mut buf).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn read_exact_at_fills_or_fails() {
        let reader = MemoryReader::from(b"abcdef".to_vec());

        let mut buf = [0u8; 3];
        reader.read_exact_at(1, &mut buf).await.unwrap();
        assert_eq!(&buf, b"bcd");

        let mut too_long = [0u8; 6];
        let err = reader.read_exact_at(2, &mut too_long).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn empty_buffer_has_zero_size() {
        assert_eq!(MemoryReader::new(Vec::new()).size(), 0);
    }
}
