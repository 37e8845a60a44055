//! Key hashing for the hash index.

use std::hash::Hasher;

use siphasher::sip::SipHasher24;

use super::codec::FixedCodec;

/// Hash function fixed at table construction.
///
/// Implementations must be deterministic for the life of the table: the
/// same key must land on the same bucket across operations and resizes.
pub trait KeyHasher<K>: Send + Sync {
    /// Hashes a key to a 64-bit value.
    fn hash_key(&self, key: &K) -> u64;
}

/// Default hasher: SipHash-2-4 over the key's slot encoding.
#[derive(Debug, Clone, Copy)]
pub struct SipKeyHasher {
    k0: u64,
    k1: u64,
}

impl SipKeyHasher {
    /// Creates a hasher with fixed keys.
    ///
    /// The keys are constants, not random: a disk-resident table must hash
    /// identically every time it is opened.
    pub fn new() -> Self {
        Self {
            k0: 0x4b65_7973_746f_6e65, // "Keystone"
            k1: 0x4861_7368_5461_626c, // "HashTabl"
        }
    }

    /// Creates a hasher with caller-chosen SipHash keys.
    pub fn with_keys(k0: u64, k1: u64) -> Self {
        Self { k0, k1 }
    }
}

impl Default for SipKeyHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: FixedCodec> KeyHasher<K> for SipKeyHasher {
    fn hash_key(&self, key: &K) -> u64 {
        let mut buf = vec![0u8; K::ENCODED_LEN];
        key.encode_into(&mut buf);

        let mut hasher = SipHasher24::new_with_keys(self.k0, self.k1);
        hasher.write(&buf);
        hasher.finish()
    }
}
