//! XOR payload masking (RFC 6455 Section 5.3).
//!
//! The transform is its own inverse, so the same function masks and unmasks.

/// XOR `buf` in place with `key`, starting at key position `pos`.
///
/// Byte `i` of `buf` is combined with `key[(pos + i) % 4]`. The returned
/// value is the key position for the byte that would follow `buf`, so a
/// payload split into chunks can be processed one chunk at a time by
/// threading the return value into the next call.
pub fn mask_bytes(key: &[u8; 4], pos: usize, buf: &mut [u8]) -> usize {
    let mut pos = pos & 3;
    for byte in buf.iter_mut() {
        *byte ^= key[pos];
        pos = (pos + 1) & 3;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 4] = [0x37, 0xfa, 0x21, 0x3d];

    #[test]
    fn test_mask_roundtrip() {
        let original = b"Hello".to_vec();
        let mut masked = original.clone();
        mask_bytes(&KEY, 0, &mut masked);
        assert_ne!(masked, original, "masked should differ from original");
        mask_bytes(&KEY, 0, &mut masked);
        assert_eq!(masked, original, "unmasked should equal original");
    }

    #[test]
    fn test_rfc_sample() {
        // RFC 6455 Section 5.7: masked "Hello" from a client.
        let mut payload = [0x7f, 0x9f, 0x4d, 0x51, 0x58];
        mask_bytes(&KEY, 0, &mut payload);
        assert_eq!(&payload, b"Hello");
    }

    #[test]
    fn test_returned_position() {
        let mut buf = [0u8; 7];
        assert_eq!(mask_bytes(&KEY, 0, &mut buf), 3);
        assert_eq!(mask_bytes(&KEY, 3, &mut buf[..1]), 0);
        assert_eq!(mask_bytes(&KEY, 2, &mut [0u8; 0]), 2);
        // Out-of-range starting positions wrap like the key index does.
        assert_eq!(mask_bytes(&KEY, 5, &mut buf[..2]), 3);
    }

    #[test]
    fn test_chunked_matches_single_pass() {
        let original: Vec<u8> = (0..=255u8).cycle().take(1031).collect();

        let mut whole = original.clone();
        mask_bytes(&KEY, 0, &mut whole);

        for chunk in [1, 2, 3, 5, 64, 1000] {
            let mut chunked = original.clone();
            let mut pos = 0;
            for part in chunked.chunks_mut(chunk) {
                pos = mask_bytes(&KEY, pos, part);
            }
            assert_eq!(chunked, whole, "chunk size {}", chunk);

            // Unmasking in uneven chunks restores the original bytes.
            let mut pos = 0;
            let (head, tail) = chunked.split_at_mut(chunk.min(original.len()) / 2 + 1);
            pos = mask_bytes(&KEY, pos, head);
            mask_bytes(&KEY, pos, tail);
            assert_eq!(chunked, original, "chunk size {}", chunk);
        }
    }
}
