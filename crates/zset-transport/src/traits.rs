use zset_store::KeyStore;

/// A remote store reachable at one endpoint.
pub trait Transport: KeyStore {
    /// Stable digest of [`endpoint`](Self::endpoint); equal endpoints hash
    /// equally across transports and processes.
    fn hash(&self) -> u32;

    /// The endpoint identity the hash was computed from.
    fn endpoint(&self) -> &str;
}
