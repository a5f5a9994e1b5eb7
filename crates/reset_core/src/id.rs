use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const ID_LEN: usize = 16;
pub const ID_ALPHABET: &[u8; 62] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Issues random document identifiers that are unique within one run.
///
/// Every identifier handed out, and every existing identifier passed to
/// [`IdGenerator::reserve`], is remembered; [`IdGenerator::generate`] draws
/// again until it finds one that has not been seen.
#[derive(Debug)]
pub struct IdGenerator<R = StdRng> {
    rng: R,
    issued: HashSet<String>,
}

impl IdGenerator<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> IdGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            issued: HashSet::new(),
        }
    }

    /// Marks an identifier already present in the dataset as taken.
    pub fn reserve(&mut self, id: &str) {
        self.issued.insert(id.to_string());
    }

    pub fn is_taken(&self, id: &str) -> bool {
        self.issued.contains(id)
    }

    pub fn generate(&mut self) -> String {
        loop {
            let candidate = self.draw();
            if !self.issued.contains(&candidate) {
                self.issued.insert(candidate.clone());
                return candidate;
            }
            tracing::debug!(id = %candidate, "Generated identifier already taken, drawing again.");
        }
    }

    fn draw(&mut self) -> String {
        (0..ID_LEN)
            .map(|_| ID_ALPHABET[self.rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect()
    }
}

pub fn is_valid_id(id: &str) -> bool {
    id.len() == ID_LEN && id.bytes().all(|b| b.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_have_fixed_length_and_alphabet() {
        let mut generator = IdGenerator::seeded(7);
        for _ in 0..500 {
            let id = generator.generate();
            assert!(is_valid_id(&id), "unexpected id {id}");
        }
    }

    #[test]
    fn same_seed_produces_same_sequence() {
        let mut a = IdGenerator::seeded(42);
        let mut b = IdGenerator::seeded(42);
        for _ in 0..10 {
            assert_eq!(a.generate(), b.generate());
        }
    }

    #[test]
    fn retries_when_candidate_is_reserved() {
        let mut probe = IdGenerator::seeded(3);
        let first = probe.generate();
        let second = probe.generate();

        let mut generator = IdGenerator::seeded(3);
        generator.reserve(&first);
        assert_eq!(generator.generate(), second);
        assert!(generator.is_taken(&first));
    }
}
