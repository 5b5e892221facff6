use std::collections::BTreeMap;
use std::time::Duration;

use heval_backend::{ClearContext, ContextError, LweContext, LweParameters};

use crate::equivalence::{compare, verify, Mismatch};
use crate::evaluator::{Bindings, ClearRun, EvalError, Evaluator, RunTimings};
use crate::repository::CircuitRepo;

fn lwe_params() -> LweParameters {
    LweParameters {
        dimension: 256,
        ..LweParameters::default()
    }
}

#[test]
fn end_to_end_scenario_passes_on_every_bundled_context() {
    let repo = CircuitRepo::standard();
    let circuit = repo.lookup("multiply-by-constant-2").unwrap();
    let bindings = Bindings::new().bind("x", &[55u8, 130]);

    let mut clear_ctx = ClearContext::<u8>::new(8);
    let report = verify(circuit, &mut clear_ctx, &bindings).unwrap();
    assert!(report.passed());

    let mut lwe_ctx = LweContext::<u8>::new_seeded(lwe_params(), [0u8; 32]);
    let report = verify(circuit, &mut lwe_ctx, &bindings).unwrap();
    assert!(report.passed());
}

#[test]
fn whole_standard_catalog_passes_on_the_clear_context() {
    let repo = CircuitRepo::standard();
    for name in repo.names() {
        let circuit = repo.lookup(name).unwrap();
        let mut bindings = Bindings::new();
        for (input, _) in circuit.inputs() {
            bindings = bindings.bind(input, &[55u8, 130, 7]);
        }
        let mut ctx = ClearContext::<u8>::new(8);
        let report = verify(circuit, &mut ctx, &bindings).unwrap();
        assert!(report.passed(), "catalog circuit {name} disagreed");
    }
}

#[test]
fn governing_modulus_follows_the_smaller_scheme_modulus() {
    let repo = CircuitRepo::standard();
    let circuit = repo.lookup("multiply").unwrap();
    let bindings = Bindings::new().bind("x", &[90u8, 13]).bind("y", &[90u8, 7]);

    let mut ctx = ClearContext::<u8>::with_plaintext_modulus(4, 100);
    let report = verify(circuit, &mut ctx, &bindings).unwrap();
    assert!(report.passed());
}

#[test]
fn disagreements_are_collected_exhaustively() {
    let repo = CircuitRepo::standard();
    let circuit = repo.lookup("negate").unwrap();
    let bindings = Bindings::new().bind("x", &[1u8, 2, 3]);

    let mut ctx = ClearContext::<u8>::new(8);
    let encrypted = Evaluator::new(circuit).run(&mut ctx, &bindings).unwrap();

    let mut outputs = BTreeMap::new();
    outputs.insert("out".to_string(), vec![254u64, 0, 253]);
    let doctored = ClearRun {
        outputs,
        timings: RunTimings {
            encrypt: Duration::ZERO,
            evaluate: Duration::ZERO,
        },
    };

    let report = compare(&ctx, &encrypted, &doctored, 256).unwrap();
    assert_eq!(
        report.mismatches,
        vec![
            Mismatch {
                output: "out".to_string(),
                slot: 0,
                want: 254,
                got: 255,
            },
            Mismatch {
                output: "out".to_string(),
                slot: 1,
                want: 0,
                got: 254,
            },
        ]
    );
}

#[test]
fn missing_clear_output_is_an_error() {
    let repo = CircuitRepo::standard();
    let circuit = repo.lookup("negate").unwrap();
    let bindings = Bindings::new().bind("x", &[1u8]);

    let mut ctx = ClearContext::<u8>::new(8);
    let encrypted = Evaluator::new(circuit).run(&mut ctx, &bindings).unwrap();
    let empty = ClearRun {
        outputs: BTreeMap::new(),
        timings: RunTimings {
            encrypt: Duration::ZERO,
            evaluate: Duration::ZERO,
        },
    };
    assert_eq!(
        compare(&ctx, &encrypted, &empty, 256).unwrap_err(),
        EvalError::MissingClearOutput("out".to_string())
    );
}

#[test]
fn decrypting_through_a_foreign_context_is_rejected() {
    let repo = CircuitRepo::standard();
    let circuit = repo.lookup("negate").unwrap();
    let bindings = Bindings::new().bind("x", &[1u8]);

    let mut ctx = ClearContext::<u8>::new(8);
    let encrypted = Evaluator::new(circuit).run(&mut ctx, &bindings).unwrap();
    let clear = Evaluator::new(circuit)
        .run_clear(256, &bindings.to_words())
        .unwrap();

    let other = ClearContext::<u8>::new(8);
    assert_eq!(
        compare(&other, &encrypted, &clear, 256).unwrap_err(),
        EvalError::Decrypt {
            output: "out".to_string(),
            source: ContextError::InvalidCiphertext,
        }
    );
}
