// Copyright (c) 2024-2025 The PicoPot Developers

//! Repeating-key XOR stream used to protect the stored seed.
//!
//! The cipher is involutive: encryption and decryption are the same
//! operation. With a 32-byte key and a 32-byte seed the key never repeats
//! within a message, and a fresh seed is generated per wallet creation.

/// XOR `data` with a repeating key, returning the transformed bytes.
///
/// Panics if `key` is empty; callers always supply a 32-byte digest.
pub fn xor_stream(data: &[u8], key: &[u8]) -> Vec<u8> {
    assert!(!key.is_empty());
    data.iter()
        .enumerate()
        .map(|(i, b)| b ^ key[i % key.len()])
        .collect()
}

#[cfg(test)]
mod test {
    use super::xor_stream;

    #[test]
    fn involution() {
        let key: [u8; 32] = rand::random();
        let msg: [u8; 32] = rand::random();

        let enc = xor_stream(&msg, &key);
        assert_eq!(xor_stream(&enc, &key), msg);
    }

    #[test]
    fn short_key_repeats() {
        let data = [0xffu8; 8];
        let key = [0x0f, 0xf0];
        assert_eq!(
            xor_stream(&data, &key),
            vec![0xf0, 0x0f, 0xf0, 0x0f, 0xf0, 0x0f, 0xf0, 0x0f]
        );
    }

    #[test]
    fn zero_key_is_identity() {
        let data = b"seed material";
        assert_eq!(xor_stream(data, &[0u8; 32]), data.to_vec());
    }
}
