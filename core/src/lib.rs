pub mod circuit;
pub mod equivalence;
pub mod evaluator;
pub mod repository;
#[cfg(test)]
mod tests;

pub use circuit::{Circuit, CircuitBuilder, CircuitError, Gate, Wire};
pub use equivalence::{compare, verify, Comparison, Mismatch};
pub use evaluator::{Bindings, ClearRun, EncryptedRun, EvalError, Evaluator, RunTimings};
pub use repository::{CircuitRepo, RepoError};
