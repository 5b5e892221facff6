use std::time::{Duration, Instant};

use tracing::debug;

use heval_backend::{governing_modulus, HeContext, SlotValue};

use crate::circuit::Circuit;
use crate::evaluator::{Bindings, ClearRun, EncryptedRun, EvalError, Evaluator};

/// One slot-level disagreement between the decrypted encrypted path and
/// the clear reference path, both reduced modulo the governing modulus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub output: String,
    pub slot: usize,
    pub want: u64,
    pub got: u64,
}

/// Full comparison report; collected exhaustively, never short-circuited,
/// so one run yields complete diagnostic information.
#[derive(Debug)]
pub struct Comparison {
    pub mismatches: Vec<Mismatch>,
    pub decrypt: Duration,
}

impl Comparison {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Decrypts every encrypted output through the context that produced it
/// and compares slot-by-slot against the clear run under `modulus`.
pub fn compare<C: HeContext>(
    ctx: &C,
    encrypted: &EncryptedRun<C>,
    clear: &ClearRun,
    modulus: u64,
) -> Result<Comparison, EvalError> {
    let mut mismatches = Vec::new();
    let start = Instant::now();
    for (name, ct) in &encrypted.outputs {
        let decrypted = ctx.decrypt(ct).map_err(|source| EvalError::Decrypt {
            output: name.clone(),
            source,
        })?;
        let want = clear
            .outputs
            .get(name)
            .ok_or_else(|| EvalError::MissingClearOutput(name.clone()))?;

        let slots = want.len().max(decrypted.len());
        for slot in 0..slots {
            let want_word = want.get(slot).map(|w| w % modulus);
            let got_word = decrypted.get(slot).map(|v| v.to_word() % modulus);
            if want_word != got_word {
                mismatches.push(Mismatch {
                    output: name.clone(),
                    slot,
                    want: want_word.unwrap_or(u64::MAX),
                    got: got_word.unwrap_or(u64::MAX),
                });
            }
        }
    }
    let decrypt = start.elapsed();
    debug!(
        context = ctx.name(),
        mismatches = mismatches.len(),
        "equivalence check"
    );
    Ok(Comparison {
        mismatches,
        decrypt,
    })
}

/// Runs `circuit` through `ctx` and through the clear reference under the
/// context's governing modulus, then compares both results.
pub fn verify<C: HeContext>(
    circuit: &Circuit,
    ctx: &mut C,
    bindings: &Bindings<C::Value>,
) -> Result<Comparison, EvalError> {
    let modulus = governing_modulus(ctx);
    let evaluator = Evaluator::new(circuit);
    let encrypted = evaluator.run(ctx, bindings)?;
    let clear = evaluator.run_clear(modulus, &bindings.to_words())?;
    compare(ctx, &encrypted, &clear, modulus)
}
