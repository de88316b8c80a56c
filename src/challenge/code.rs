//! Random verification codes

use rand::{distributions::Alphanumeric, Rng};

/// Produces the codes shown by the challenge gate
pub trait CodeGenerator: Send + Sync {
    fn generate(&mut self, length: usize) -> String;
}

/// Uniform draws from `A-Z`, `a-z` and `0-9` using the thread-local RNG.
///
/// Not suitable for secrets; the code only has to be retyped by a human.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCode;

impl CodeGenerator for RandomCode {
    fn generate(&mut self, length: usize) -> String {
        generate_random_string(length)
    }
}

/// Always yields the same code regardless of the requested length
#[derive(Debug, Clone)]
pub struct FixedCode(pub String);

impl CodeGenerator for FixedCode {
    fn generate(&mut self, _length: usize) -> String {
        self.0.clone()
    }
}

/// Generate a random alphanumeric string of exactly `length` characters
pub fn generate_random_string(length: usize) -> String {
    generate_random_string_with(&mut rand::thread_rng(), length)
}

pub fn generate_random_string_with<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
