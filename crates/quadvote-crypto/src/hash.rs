//! Blake3 hashing utilities.

use quadvote_types::Hash;

/// Incremental hasher for streaming hash computation
pub struct IncrementalHasher {
    hasher: blake3::Hasher,
}

impl IncrementalHasher {
    pub fn new() -> Self {
        Self {
            hasher: blake3::Hasher::new(),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// Feed a variable-length field, prefixed with its length as u64 LE.
    ///
    /// Two sequences of fields hash identically only if every field matches,
    /// so ("ab", "c") and ("a", "bc") never collide.
    pub fn update_field(&mut self, data: &[u8]) {
        self.hasher.update(&(data.len() as u64).to_le_bytes());
        self.hasher.update(data);
    }

    pub fn finalize(self) -> Hash {
        Hash::from_bytes(*self.hasher.finalize().as_bytes())
    }
}

impl Default for IncrementalHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash with a domain separator
pub fn hash_with_domain(data: &[u8], domain: &str) -> Hash {
    let mut hasher = IncrementalHasher::new();
    hasher.update_field(domain.as_bytes());
    hasher.update_field(data);
    hasher.finalize()
}
