//! Cryptographically secure random source.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{SeedableRng, TryRngCore};

use crate::error::{CryptoError, CryptoResult};

/// CSPRNG seeded from the operating system.
///
/// Internally synchronized, so one instance can be shared between threads
/// (typically behind an `Arc`).
#[derive(Debug)]
pub struct Rng {
    rng: Mutex<StdRng>,
}

impl Rng {
    /// Seeds a new generator from the OS entropy source.
    ///
    /// Fails with [`CryptoError::RandomnessUnavailable`] instead of falling
    /// back to anything weaker.
    pub fn from_os_rng() -> CryptoResult<Self> {
        let rng = StdRng::try_from_os_rng().map_err(|_| CryptoError::RandomnessUnavailable)?;
        Ok(Self {
            rng: Mutex::new(rng),
        })
    }

    pub fn random_array<const N: usize>(&self) -> CryptoResult<[u8; N]> {
        let mut out = [0u8; N];
        self.fill(&mut out)?;
        Ok(out)
    }

    pub fn fill(&self, dest: &mut [u8]) -> CryptoResult<()> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| CryptoError::RandomnessUnavailable)?;
        rng.try_fill_bytes(dest)
            .map_err(|_| CryptoError::RandomnessUnavailable)
    }
}

#[cfg(any(test, feature = "test_utils"))]
impl Rng {
    /// Deterministic generator for reproducible tests. Never use for real keys.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            rng: Mutex::new(StdRng::from_seed(seed)),
        }
    }
}
