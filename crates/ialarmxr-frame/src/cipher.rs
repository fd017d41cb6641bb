//! Fixed XOR keystream applied to every frame payload.
//!
//! This is protocol obfuscation, not encryption. The 128-byte table is the
//! same for every client and panel of this family and there is no IV, nonce
//! or per-session key. Anyone observing the wire can read the payloads.

/// Keystream length; positions wrap modulo this value.
pub const KEY_LEN: usize = 128;

/// The shared keystream table.
pub const KEY: [u8; KEY_LEN] = [
    0x0c, 0x38, 0x4e, 0x4e, 0x62, 0x38, 0x2d, 0x62, 0x0e, 0x38, 0x4e, 0x4e, 0x44, 0x38, 0x2d, 0x30,
    0x0f, 0x38, 0x2b, 0x38, 0x2b, 0x0c, 0x5a, 0x62, 0x34, 0x38, 0x4e, 0x30, 0x4e, 0x4c, 0x37, 0x2b,
    0x10, 0x53, 0x5a, 0x0c, 0x20, 0x43, 0x2d, 0x17, 0x11, 0x42, 0x44, 0x4e, 0x58, 0x42, 0x2c, 0x42,
    0x11, 0x57, 0x32, 0x2a, 0x20, 0x40, 0x36, 0x17, 0x20, 0x56, 0x44, 0x62, 0x62, 0x38, 0x2b, 0x5f,
    0x0c, 0x38, 0x4e, 0x4e, 0x62, 0x38, 0x2d, 0x62, 0x0e, 0x38, 0x58, 0x58, 0x08, 0x2e, 0x23, 0x2c,
    0x0f, 0x38, 0x2b, 0x38, 0x2b, 0x0c, 0x5a, 0x62, 0x34, 0x38, 0x30, 0x30, 0x4e, 0x2e, 0x36, 0x2b,
    0x10, 0x54, 0x5a, 0x0c, 0x3e, 0x43, 0x2e, 0x17, 0x11, 0x38, 0x4e, 0x62, 0x58, 0x24, 0x37, 0x1c,
    0x11, 0x57, 0x32, 0x42, 0x20, 0x40, 0x2c, 0x17, 0x20, 0x4c, 0x44, 0x4e, 0x62, 0x4c, 0x2e, 0x12,
];

/// XOR `buf` with the keystream in place. Self-inverse.
pub fn apply(buf: &mut [u8]) {
    for (i, byte) in buf.iter_mut().enumerate() {
        *byte ^= KEY[i % KEY_LEN];
    }
}

/// Return a ciphered copy of `data`.
pub fn ciphered(data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    apply(&mut out);
    out
}
