pub mod noise;
pub mod source;

pub use noise::{NoiseSampler, DEFAULT_SIGMA};
pub use source::{new_seed, Source};
