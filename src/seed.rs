//! Seed service for units that need randomness.
//!
//! Units never reach for a global generator. The host owns one
//! [`SeedRegistry`] and hands it to constructors, which ask for a seed keyed
//! by their unit type. The same registry base seed replays the same stream of
//! seeds per type, while successive instances of one type still receive
//! different seeds.

use std::collections::BTreeMap;

/// Per-type seed stream and the number of seeds it has handed out.
#[derive(Debug, Clone)]
struct KindStream {
    rng: fastrand::Rng,
    issued: u64,
}

/// Hands out reproducible, per-instance seeds keyed by unit type.
#[derive(Debug, Clone)]
pub struct SeedRegistry {
    base: u64,
    kinds: BTreeMap<&'static str, KindStream>,
}

impl Default for SeedRegistry {
    fn default() -> Self {
        Self::new(0x5EED_0F_5AA7)
    }
}

impl SeedRegistry {
    pub fn new(base: u64) -> Self {
        Self {
            base,
            kinds: BTreeMap::new(),
        }
    }

    /// Next seed for a unit of type `kind`.
    pub fn next_seed(&mut self, kind: &'static str) -> u64 {
        let base = self.base;
        let stream = self.kinds.entry(kind).or_insert_with(|| KindStream {
            rng: kind_rng(base, kind),
            issued: 0,
        });
        stream.issued += 1;
        stream.rng.u64(..)
    }

    /// Seeded generator for a unit of type `kind`.
    pub fn rng(&mut self, kind: &'static str) -> fastrand::Rng {
        fastrand::Rng::with_seed(self.next_seed(kind))
    }

    /// Number of seeds handed out so far for `kind`.
    pub fn issued(&self, kind: &'static str) -> u64 {
        self.kinds.get(kind).map_or(0, |stream| stream.issued)
    }
}

/// Generator for one unit type: the base seed with each byte of the type
/// name folded in through a fresh draw.
fn kind_rng(base: u64, kind: &str) -> fastrand::Rng {
    kind.bytes().fold(fastrand::Rng::with_seed(base), |mut rng, byte| {
        fastrand::Rng::with_seed(rng.u64(..) ^ u64::from(byte))
    })
}
