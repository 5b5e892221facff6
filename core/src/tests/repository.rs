use crate::circuit::{CircuitBuilder, Gate};
use crate::repository::{CircuitRepo, RepoError};

fn any_circuit() -> crate::circuit::Circuit {
    let mut b = CircuitBuilder::new();
    let x = b.input("x").unwrap();
    let out = b.gate(Gate::Negate, &[x]).unwrap();
    b.output("out", out).unwrap();
    b.build().unwrap()
}

#[test]
fn names_are_unique() {
    let mut repo = CircuitRepo::new();
    repo.register("neg", any_circuit()).unwrap();
    assert_eq!(
        repo.register("neg", any_circuit()).unwrap_err(),
        RepoError::DuplicateName("neg".to_string())
    );
    assert_eq!(repo.len(), 1);
}

#[test]
fn missing_names_are_reported() {
    let repo = CircuitRepo::new();
    assert_eq!(
        repo.lookup("nope").unwrap_err(),
        RepoError::NotFound("nope".to_string())
    );
}

#[test]
fn standard_catalog_is_complete() {
    let repo = CircuitRepo::standard();
    for name in [
        "add",
        "subtract",
        "multiply",
        "negate",
        "add-constant-3",
        "multiply-by-constant-2",
        "rotate-1",
        "add-chain-4",
        "shared-double",
    ] {
        assert!(repo.lookup(name).is_ok(), "missing standard circuit {name}");
    }
    assert_eq!(repo.names().len(), repo.len());
    assert!(repo.names().windows(2).all(|w| w[0] < w[1]));
}
