//! Random input generation for seeding a run with something to chew on.

use crate::spec::MachineSpec;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Draws `len` symbols uniformly from the input alphabet of `spec`.
///
/// Returns an empty string when the alphabet is empty.
pub fn random_input<R: Rng + ?Sized>(spec: &MachineSpec, len: usize, rng: &mut R) -> String {
    let alphabet: Vec<char> = spec.input_alphabet().iter().copied().collect();

    (0..len)
        .filter_map(|_| alphabet.choose(&mut *rng).copied())
        .collect()
}

/// Like [`random_input`], but reproducible for a given `seed`.
pub fn seeded_input(spec: &MachineSpec, len: usize, seed: u64) -> String {
    random_input(spec, len, &mut StdRng::seed_from_u64(seed))
}
