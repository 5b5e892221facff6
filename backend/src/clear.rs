use std::marker::PhantomData;

use itertools::izip;
use tracing::info;

use crate::context::{next_context_id, reduce_constant, ContextError, HeContext};
use crate::value::SlotValue;

/// Identity "encryption": slot words travel in the clear, reduced modulo
/// the configured plaintext modulus.
///
/// This is a conformance backend, not a scheme. It implements the full
/// operation vocabulary exactly, which makes it the reference every real
/// adapter is compared against, and it exercises the governing-modulus
/// logic because its plaintext modulus is configurable independently of
/// the native width.
pub struct ClearContext<T: SlotValue> {
    id: u64,
    name: String,
    slots: usize,
    modulus: u64,
    _marker: PhantomData<T>,
}

#[derive(Debug, Clone)]
pub struct ClearCiphertext {
    ctx_id: u64,
    words: Vec<u64>,
}

impl<T: SlotValue> ClearContext<T> {
    pub fn new(slots: usize) -> Self {
        Self::with_plaintext_modulus(slots, T::native_modulus())
    }

    /// A clear context whose scheme modulus differs from `2^WIDTH`.
    pub fn with_plaintext_modulus(slots: usize, modulus: u64) -> Self {
        assert!(slots > 0, "need at least one slot");
        assert!(
            (2..=T::native_modulus()).contains(&modulus),
            "plaintext modulus must lie in 2..=2^WIDTH"
        );
        let id = next_context_id();
        let name = format!("clear<u{}>", T::WIDTH);
        info!(context = %name, id, slots, modulus, "created clear context");
        Self {
            id,
            name,
            slots,
            modulus,
            _marker: PhantomData,
        }
    }

    fn check(&self, ct: &ClearCiphertext) -> Result<(), ContextError> {
        if ct.ctx_id != self.id {
            return Err(ContextError::InvalidCiphertext);
        }
        Ok(())
    }

    fn check_pair(
        &self,
        a: &ClearCiphertext,
        b: &ClearCiphertext,
    ) -> Result<(), ContextError> {
        self.check(a)?;
        self.check(b)?;
        if a.words.len() != b.words.len() {
            return Err(ContextError::SlotMismatch {
                left: a.words.len(),
                right: b.words.len(),
            });
        }
        Ok(())
    }

    fn wrap(&self, words: Vec<u64>) -> ClearCiphertext {
        ClearCiphertext {
            ctx_id: self.id,
            words,
        }
    }
}

impl<T: SlotValue> HeContext for ClearContext<T> {
    type Value = T;
    type Ciphertext = ClearCiphertext;

    fn name(&self) -> &str {
        &self.name
    }

    fn plaintext_modulus(&self) -> u64 {
        self.modulus
    }

    fn slot_count(&self) -> usize {
        self.slots
    }

    fn encrypt(&mut self, plaintext: &[T]) -> Result<ClearCiphertext, ContextError> {
        if plaintext.len() > self.slots {
            return Err(ContextError::Encoding {
                got: plaintext.len(),
                capacity: self.slots,
            });
        }
        let words = plaintext
            .iter()
            .map(|v| v.to_word() % self.modulus)
            .collect();
        Ok(self.wrap(words))
    }

    fn decrypt(&self, ciphertext: &ClearCiphertext) -> Result<Vec<T>, ContextError> {
        self.check(ciphertext)?;
        Ok(ciphertext.words.iter().map(|&w| T::from_word(w)).collect())
    }

    fn add(
        &mut self,
        a: &ClearCiphertext,
        b: &ClearCiphertext,
    ) -> Result<ClearCiphertext, ContextError> {
        self.check_pair(a, b)?;
        let words = izip!(&a.words, &b.words)
            .map(|(x, y)| (x + y) % self.modulus)
            .collect();
        Ok(self.wrap(words))
    }

    fn subtract(
        &mut self,
        a: &ClearCiphertext,
        b: &ClearCiphertext,
    ) -> Result<ClearCiphertext, ContextError> {
        self.check_pair(a, b)?;
        let words = izip!(&a.words, &b.words)
            .map(|(x, y)| (x + self.modulus - y) % self.modulus)
            .collect();
        Ok(self.wrap(words))
    }

    fn multiply(
        &mut self,
        a: &ClearCiphertext,
        b: &ClearCiphertext,
    ) -> Result<ClearCiphertext, ContextError> {
        self.check_pair(a, b)?;
        let words = izip!(&a.words, &b.words)
            .map(|(x, y)| (x * y) % self.modulus)
            .collect();
        Ok(self.wrap(words))
    }

    fn negate(&mut self, a: &ClearCiphertext) -> Result<ClearCiphertext, ContextError> {
        self.check(a)?;
        let words = a
            .words
            .iter()
            .map(|&x| (self.modulus - x) % self.modulus)
            .collect();
        Ok(self.wrap(words))
    }

    fn add_constant(
        &mut self,
        a: &ClearCiphertext,
        constant: i64,
    ) -> Result<ClearCiphertext, ContextError> {
        self.check(a)?;
        let c = reduce_constant(constant, self.modulus);
        let words = a.words.iter().map(|&x| (x + c) % self.modulus).collect();
        Ok(self.wrap(words))
    }

    fn multiply_by_constant(
        &mut self,
        a: &ClearCiphertext,
        constant: i64,
    ) -> Result<ClearCiphertext, ContextError> {
        self.check(a)?;
        let c = reduce_constant(constant, self.modulus);
        let words = a.words.iter().map(|&x| (x * c) % self.modulus).collect();
        Ok(self.wrap(words))
    }

    fn rotate(
        &mut self,
        a: &ClearCiphertext,
        offset: i64,
    ) -> Result<ClearCiphertext, ContextError> {
        self.check(a)?;
        let n = a.words.len();
        let mut words = a.words.clone();
        if n > 0 {
            words.rotate_left(offset.rem_euclid(n as i64) as usize);
        }
        Ok(self.wrap(words))
    }
}
