//! Correlation id generation.

use std::sync::{Mutex, PoisonError};

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::request::Request;

/// Length of ids produced by [`RandomIdGenerator`].
pub const DEFAULT_ID_LEN: usize = 10;

/// Produces a correlation id for a request.
///
/// Generation cannot fail: there is no error path for callers to handle.
/// Any `Fn(&Request) -> String` closure is a generator.
pub trait IdGenerator: Send + Sync + 'static {
    fn generate(&self, req: &Request) -> String;
}

impl<F> IdGenerator for F
where
    F: Fn(&Request) -> String + Send + Sync + 'static,
{
    fn generate(&self, req: &Request) -> String {
        self(req)
    }
}

/// Alphanumeric ids drawn from a locked [`StdRng`].
///
/// Use [`RandomIdGenerator::new`] in production. [`RandomIdGenerator::seeded`]
/// yields a reproducible sequence and only belongs in tests.
pub struct RandomIdGenerator {
    rng: Mutex<StdRng>,
    len: usize,
}

impl RandomIdGenerator {
    /// Seeded from OS entropy.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self { rng: Mutex::new(rng), len: DEFAULT_ID_LEN }
    }

    /// Overrides the id length.
    pub fn with_len(mut self, len: usize) -> Self {
        self.len = len;
        self
    }
}

impl Default for RandomIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for RandomIdGenerator {
    fn generate(&self, _req: &Request) -> String {
        // Sampling cannot leave the rng half-updated, so a poisoned lock is safe to reuse.
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        (&mut *rng)
            .sample_iter(&Alphanumeric)
            .take(self.len)
            .map(char::from)
            .collect()
    }
}
