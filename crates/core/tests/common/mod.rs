//! Seeded test inputs with mixed compressibility.
//!
//! Generated data mixes:
//! - Runs of a single byte (highly compressible)
//! - Text over a small alphabet (moderately compressible)
//! - Short repeating patterns
//! - Uniformly random bytes (incompressible)
#![allow(dead_code)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Generate `size_bytes` of mixed data, reproducible from `seed`.
pub fn generate_sample_data(seed: u64, size_bytes: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(size_bytes);

    while data.len() < size_bytes {
        let section = rng.gen_range(64..=4096).min(size_bytes - data.len());

        match rng.gen_range(0..10u8) {
            // 30% runs
            0..=2 => {
                let byte: u8 = rng.gen();
                data.extend(std::iter::repeat(byte).take(section));
            }

            // 30% text-like
            3..=5 => {
                let alphabet = b"etaoin shrdlu.,\n";
                data.extend((0..section).map(|_| alphabet[rng.gen_range(0..alphabet.len())]));
            }

            // 20% repeating patterns
            6..=7 => {
                let pattern = generate_pattern(&mut rng);
                data.extend(pattern.iter().cycle().take(section));
            }

            // 20% random
            _ => data.extend((0..section).map(|_| rng.gen::<u8>())),
        }
    }

    data
}

/// Uniformly random bytes.
pub fn random_bytes(seed: u64, size_bytes: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..size_bytes).map(|_| rng.gen()).collect()
}

fn generate_pattern(rng: &mut ChaCha8Rng) -> Vec<u8> {
    let len = rng.gen_range(4..=32);
    (0..len).map(|_| rng.gen()).collect()
}
