use sha2::{Digest, Sha256};
use stemrelay_protocol::constants::CONTENT_HASH_BLOCK_SIZE;

/// Incremental form of the provider's content hash.
///
/// The data is split into 4 MiB blocks, each block is hashed with SHA-256,
/// and the concatenated block digests are hashed again. Input may arrive in
/// slices of any size.
pub struct ContentHasher {
    overall: Sha256,
    block: Sha256,
    block_len: usize,
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentHasher {
    pub fn new() -> Self {
        Self {
            overall: Sha256::new(),
            block: Sha256::new(),
            block_len: 0,
        }
    }

    pub fn update(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            let take = (CONTENT_HASH_BLOCK_SIZE - self.block_len).min(data.len());
            self.block.update(&data[..take]);
            self.block_len += take;
            if self.block_len == CONTENT_HASH_BLOCK_SIZE {
                let digest = self.block.finalize_reset();
                self.overall.update(digest);
                self.block_len = 0;
            }
            data = &data[take..];
        }
    }

    /// Hex-encoded hash of everything passed to [`update`](Self::update).
    pub fn finish(mut self) -> String {
        if self.block_len > 0 {
            let digest = self.block.finalize();
            self.overall.update(digest);
        }
        hex::encode(self.overall.finalize())
    }
}

/// Content hash of an in-memory buffer.
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = ContentHasher::new();
    hasher.update(data);
    hasher.finish()
}
