use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use crate::value::SlotValue;

/// Failures of a backend adapter, surfaced to the evaluator as values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("plaintext has {got} slots but the scheme packs at most {capacity}")]
    Encoding { got: usize, capacity: usize },
    #[error("operands carry {left} and {right} slots")]
    SlotMismatch { left: usize, right: usize },
    #[error("ciphertext does not belong to this context instance")]
    InvalidCiphertext,
    #[error("noise budget exhausted")]
    NoiseBudgetExhausted,
    #[error("operation `{0}` is not supported by this backend")]
    UnsupportedOperation(&'static str),
}

static CONTEXT_IDS: AtomicU64 = AtomicU64::new(0);

/// Process-unique tag stamped onto every ciphertext a context produces, so
/// cross-context use fails fast instead of decrypting garbage.
pub(crate) fn next_context_id() -> u64 {
    CONTEXT_IDS.fetch_add(1, Ordering::Relaxed)
}

/// One backend adapter for one (scheme, slot type) pair.
///
/// Presents the fixed homomorphic operation vocabulary over opaque
/// ciphertext handles. Handles are only valid for the instance that
/// produced them and die with it; every bundled implementation detects
/// foreign handles and returns [`ContextError::InvalidCiphertext`].
///
/// Operations take `&mut self`: a context instance owns its key material
/// and is single-owner, never shared across threads mid-evaluation.
pub trait HeContext {
    type Value: SlotValue;
    type Ciphertext: Clone;

    fn name(&self) -> &str;

    /// The scheme's own plaintext modulus. May differ from
    /// `Self::Value::native_modulus()`; see [`governing_modulus`].
    fn plaintext_modulus(&self) -> u64;

    /// Maximum number of slots one ciphertext packs.
    fn slot_count(&self) -> usize;

    fn encrypt(&mut self, plaintext: &[Self::Value]) -> Result<Self::Ciphertext, ContextError>;

    /// Inverse of [`HeContext::encrypt`]; returns exactly as many slots as
    /// were encrypted, each reduced modulo the plaintext modulus.
    fn decrypt(&self, ciphertext: &Self::Ciphertext) -> Result<Vec<Self::Value>, ContextError>;

    fn add(
        &mut self,
        a: &Self::Ciphertext,
        b: &Self::Ciphertext,
    ) -> Result<Self::Ciphertext, ContextError>;

    fn subtract(
        &mut self,
        a: &Self::Ciphertext,
        b: &Self::Ciphertext,
    ) -> Result<Self::Ciphertext, ContextError>;

    fn multiply(
        &mut self,
        a: &Self::Ciphertext,
        b: &Self::Ciphertext,
    ) -> Result<Self::Ciphertext, ContextError>;

    fn negate(&mut self, a: &Self::Ciphertext) -> Result<Self::Ciphertext, ContextError>;

    fn add_constant(
        &mut self,
        a: &Self::Ciphertext,
        constant: i64,
    ) -> Result<Self::Ciphertext, ContextError>;

    fn multiply_by_constant(
        &mut self,
        a: &Self::Ciphertext,
        constant: i64,
    ) -> Result<Self::Ciphertext, ContextError>;

    /// Cyclic slot shift: slot `i` of the result is slot
    /// `(i + offset) mod n` of the input. Optional; slot-packed schemes
    /// override this.
    fn rotate(
        &mut self,
        _a: &Self::Ciphertext,
        _offset: i64,
    ) -> Result<Self::Ciphertext, ContextError> {
        Err(ContextError::UnsupportedOperation("rotate"))
    }
}

/// The modulus that governs observable results for `ctx`: the smaller of
/// the native width's modulus and the scheme's plaintext modulus.
///
/// Threaded explicitly into the clear evaluation path and the equivalence
/// checker, never inferred from the native type alone.
pub fn governing_modulus<C: HeContext>(ctx: &C) -> u64 {
    C::Value::native_modulus().min(ctx.plaintext_modulus())
}

/// Reduce a signed evaluation-time constant into `0..modulus`.
pub(crate) fn reduce_constant(constant: i64, modulus: u64) -> u64 {
    debug_assert!(modulus <= 1 << 32);
    constant.rem_euclid(modulus as i64) as u64
}

#[cfg(test)]
mod tests {
    use super::reduce_constant;

    #[test]
    fn constants_reduce_into_plaintext_domain() {
        assert_eq!(reduce_constant(2, 256), 2);
        assert_eq!(reduce_constant(-1, 256), 255);
        assert_eq!(reduce_constant(-257, 256), 255);
        assert_eq!(reduce_constant(300, 256), 44);
    }
}
