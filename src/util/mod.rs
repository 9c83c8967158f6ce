pub mod color;
pub mod rng;
