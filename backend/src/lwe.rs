use std::marker::PhantomData;

use itertools::izip;
use rand_core::RngCore;
use tracing::info;

use heval_sampling::noise::sample_ternary;
use heval_sampling::{new_seed, NoiseSampler, Source, DEFAULT_SIGMA};

use crate::context::{next_context_id, reduce_constant, ContextError, HeContext};
use crate::value::SlotValue;

/// Symmetric-key integer LWE over `q = 2^64`, one sample per slot.
///
/// The ciphertext modulus is the machine word, so all ring arithmetic is
/// native wrapping `u64`. Messages are scaled by `Δ = q / p` with
/// `p = 2^WIDTH`; since `p` divides `q` the scaling commutes exactly with
/// mod-`p` arithmetic and decryption is exact whenever the accumulated
/// noise stays below `Δ/2`.
///
/// The vocabulary is additive: `add`, `subtract`, `negate`, the two
/// constant ops and `rotate` are supported; ciphertext-ciphertext
/// `multiply` is not (no relinearization machinery here) and fails with
/// [`ContextError::UnsupportedOperation`].
///
/// Every ciphertext carries a conservative absolute noise bound, seeded by
/// the sampler's tail cut. An operation that would push the bound to
/// `Δ/2` or beyond fails with [`ContextError::NoiseBudgetExhausted`]
/// instead of producing a silently corrupt result.
#[derive(Debug, Clone, Copy)]
pub struct LweParameters {
    pub dimension: usize,
    pub sigma: f64,
    pub slots: usize,
}

impl Default for LweParameters {
    fn default() -> Self {
        Self {
            dimension: 1024,
            sigma: DEFAULT_SIGMA,
            slots: 8,
        }
    }
}

pub struct LweContext<T: SlotValue> {
    id: u64,
    name: String,
    params: LweParameters,
    delta: u64,
    secret: Vec<u64>,
    noise: NoiseSampler,
    source: Source,
    _marker: PhantomData<T>,
}

#[derive(Debug, Clone)]
pub struct LweCiphertext {
    ctx_id: u64,
    samples: Vec<LweSample>,
    noise_bound: f64,
}

#[derive(Debug, Clone)]
struct LweSample {
    a: Vec<u64>,
    b: u64,
}

fn inner_product(a: &[u64], s: &[u64]) -> u64 {
    izip!(a, s).fold(0u64, |acc, (x, y)| acc.wrapping_add(x.wrapping_mul(*y)))
}

impl<T: SlotValue> LweContext<T> {
    pub fn new(params: LweParameters) -> Self {
        Self::new_seeded(params, new_seed())
    }

    /// Deterministic variant for tests and reproducible benchmark runs.
    pub fn new_seeded(params: LweParameters, seed: [u8; 32]) -> Self {
        assert!(params.dimension > 0, "need a positive LWE dimension");
        assert!(params.slots > 0, "need at least one slot");
        let noise = NoiseSampler::new(params.sigma);
        let delta = 1u64 << (64 - T::WIDTH);
        assert!(
            noise.bound() < delta as f64 / 2.0,
            "fresh noise already exceeds the decryption budget"
        );

        let mut source = Source::new(seed);
        let secret: Vec<u64> = (0..params.dimension)
            .map(|_| sample_ternary(&mut source) as u64)
            .collect();

        let id = next_context_id();
        let name = format!("lwe<u{}>", T::WIDTH);
        info!(
            context = %name,
            id,
            dimension = params.dimension,
            sigma = params.sigma,
            slots = params.slots,
            "created lwe context"
        );
        Self {
            id,
            name,
            params,
            delta,
            secret,
            noise,
            source,
            _marker: PhantomData,
        }
    }

    /// Remaining noise headroom of `ct` in bits, `log2(Δ/2) - log2(bound)`.
    pub fn noise_budget_bits(&self, ct: &LweCiphertext) -> Result<f64, ContextError> {
        self.check(ct)?;
        Ok((self.delta as f64 / 2.0).log2() - ct.noise_bound.max(1.0).log2())
    }

    fn check(&self, ct: &LweCiphertext) -> Result<(), ContextError> {
        if ct.ctx_id != self.id {
            return Err(ContextError::InvalidCiphertext);
        }
        Ok(())
    }

    fn check_pair(&self, a: &LweCiphertext, b: &LweCiphertext) -> Result<(), ContextError> {
        self.check(a)?;
        self.check(b)?;
        if a.samples.len() != b.samples.len() {
            return Err(ContextError::SlotMismatch {
                left: a.samples.len(),
                right: b.samples.len(),
            });
        }
        Ok(())
    }

    /// Gate every result on the accumulated bound staying decryptable.
    fn budgeted(
        &self,
        samples: Vec<LweSample>,
        noise_bound: f64,
    ) -> Result<LweCiphertext, ContextError> {
        if noise_bound >= self.delta as f64 / 2.0 {
            return Err(ContextError::NoiseBudgetExhausted);
        }
        Ok(LweCiphertext {
            ctx_id: self.id,
            samples,
            noise_bound,
        })
    }

    fn encrypt_word(&mut self, word: u64) -> LweSample {
        let mut a = vec![0u64; self.params.dimension];
        a.iter_mut().for_each(|x| *x = self.source.next_u64());
        let e = self.noise.sample(&mut self.source);
        let b = inner_product(&a, &self.secret)
            .wrapping_add(e as u64)
            .wrapping_add(self.delta.wrapping_mul(word));
        LweSample { a, b }
    }

    fn decrypt_word(&self, sample: &LweSample) -> u64 {
        let phase = sample.b.wrapping_sub(inner_product(&sample.a, &self.secret));
        let p = T::native_modulus() as u128;
        // Nearest multiple of Δ: round(phase * p / 2^64) mod p.
        (((phase as u128 * p + (1u128 << 63)) >> 64) as u64) % T::native_modulus()
    }
}

impl<T: SlotValue> HeContext for LweContext<T> {
    type Value = T;
    type Ciphertext = LweCiphertext;

    fn name(&self) -> &str {
        &self.name
    }

    fn plaintext_modulus(&self) -> u64 {
        T::native_modulus()
    }

    fn slot_count(&self) -> usize {
        self.params.slots
    }

    fn encrypt(&mut self, plaintext: &[T]) -> Result<LweCiphertext, ContextError> {
        if plaintext.len() > self.params.slots {
            return Err(ContextError::Encoding {
                got: plaintext.len(),
                capacity: self.params.slots,
            });
        }
        let samples = plaintext
            .iter()
            .map(|v| self.encrypt_word(v.to_word()))
            .collect();
        self.budgeted(samples, self.noise.bound())
    }

    fn decrypt(&self, ciphertext: &LweCiphertext) -> Result<Vec<T>, ContextError> {
        self.check(ciphertext)?;
        Ok(ciphertext
            .samples
            .iter()
            .map(|s| T::from_word(self.decrypt_word(s)))
            .collect())
    }

    fn add(
        &mut self,
        a: &LweCiphertext,
        b: &LweCiphertext,
    ) -> Result<LweCiphertext, ContextError> {
        self.check_pair(a, b)?;
        let samples = izip!(&a.samples, &b.samples)
            .map(|(x, y)| LweSample {
                a: izip!(&x.a, &y.a).map(|(u, v)| u.wrapping_add(*v)).collect(),
                b: x.b.wrapping_add(y.b),
            })
            .collect();
        self.budgeted(samples, a.noise_bound + b.noise_bound)
    }

    fn subtract(
        &mut self,
        a: &LweCiphertext,
        b: &LweCiphertext,
    ) -> Result<LweCiphertext, ContextError> {
        self.check_pair(a, b)?;
        let samples = izip!(&a.samples, &b.samples)
            .map(|(x, y)| LweSample {
                a: izip!(&x.a, &y.a).map(|(u, v)| u.wrapping_sub(*v)).collect(),
                b: x.b.wrapping_sub(y.b),
            })
            .collect();
        self.budgeted(samples, a.noise_bound + b.noise_bound)
    }

    fn multiply(
        &mut self,
        _a: &LweCiphertext,
        _b: &LweCiphertext,
    ) -> Result<LweCiphertext, ContextError> {
        Err(ContextError::UnsupportedOperation("multiply"))
    }

    fn negate(&mut self, a: &LweCiphertext) -> Result<LweCiphertext, ContextError> {
        self.check(a)?;
        let samples = a
            .samples
            .iter()
            .map(|s| LweSample {
                a: s.a.iter().map(|u| u.wrapping_neg()).collect(),
                b: s.b.wrapping_neg(),
            })
            .collect();
        self.budgeted(samples, a.noise_bound)
    }

    fn add_constant(
        &mut self,
        a: &LweCiphertext,
        constant: i64,
    ) -> Result<LweCiphertext, ContextError> {
        self.check(a)?;
        let c = reduce_constant(constant, T::native_modulus());
        let shift = self.delta.wrapping_mul(c);
        let samples = a
            .samples
            .iter()
            .map(|s| LweSample {
                a: s.a.clone(),
                b: s.b.wrapping_add(shift),
            })
            .collect();
        self.budgeted(samples, a.noise_bound)
    }

    fn multiply_by_constant(
        &mut self,
        a: &LweCiphertext,
        constant: i64,
    ) -> Result<LweCiphertext, ContextError> {
        self.check(a)?;
        let p = T::native_modulus();
        let c = reduce_constant(constant, p);
        // Centered lift keeps the noise growth at |c| rather than p - |c|.
        let lift: i64 = if c * 2 <= p { c as i64 } else { c as i64 - p as i64 };
        let factor = lift as u64;
        let samples = a
            .samples
            .iter()
            .map(|s| LweSample {
                a: s.a.iter().map(|u| u.wrapping_mul(factor)).collect(),
                b: s.b.wrapping_mul(factor),
            })
            .collect();
        self.budgeted(samples, a.noise_bound * lift.unsigned_abs() as f64)
    }

    fn rotate(
        &mut self,
        a: &LweCiphertext,
        offset: i64,
    ) -> Result<LweCiphertext, ContextError> {
        self.check(a)?;
        let n = a.samples.len();
        let mut samples = a.samples.clone();
        if n > 0 {
            samples.rotate_left(offset.rem_euclid(n as i64) as usize);
        }
        self.budgeted(samples, a.noise_bound)
    }
}
