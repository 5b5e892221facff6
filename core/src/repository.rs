use thiserror::Error;

use heval_utils::Map;

use crate::circuit::{Circuit, CircuitBuilder, Gate};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepoError {
    #[error("a circuit named `{0}` is already registered")]
    DuplicateName(String),
    #[error("no circuit named `{0}` is registered")]
    NotFound(String),
}

/// Named catalog of reference circuits shared by every backend under
/// test. Populated once at startup and read-only afterwards; passed by
/// reference to whatever needs lookup, never held in global state.
pub struct CircuitRepo {
    circuits: Map<String, Circuit>,
}

impl CircuitRepo {
    pub fn new() -> Self {
        Self {
            circuits: Map::new(),
        }
    }

    pub fn register(&mut self, name: &str, circuit: Circuit) -> Result<(), RepoError> {
        if self.circuits.contains_key(name) {
            return Err(RepoError::DuplicateName(name.to_string()));
        }
        self.circuits.insert(name.to_string(), circuit);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<&Circuit, RepoError> {
        self.circuits
            .get(name)
            .ok_or_else(|| RepoError::NotFound(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.circuits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circuits.is_empty()
    }

    /// Registered names in sorted order, for deterministic driver loops.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.circuits.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The canonical catalog: one circuit per vocabulary entry, a
    /// depth-parameterized additive chain and a small DAG with a shared
    /// sub-result.
    pub fn standard() -> Self {
        let mut repo = Self::new();
        let mut must = |name: &str, circuit: Circuit| {
            repo.register(name, circuit)
                .expect("standard circuit names are unique");
        };

        must("add", binary_gate(Gate::Add));
        must("subtract", binary_gate(Gate::Subtract));
        must("multiply", binary_gate(Gate::Multiply));
        must("negate", unary_gate(Gate::Negate));
        must("add-constant-3", unary_gate(Gate::AddConstant(3)));
        must(
            "multiply-by-constant-2",
            unary_gate(Gate::MultiplyByConstant(2)),
        );
        must("rotate-1", unary_gate(Gate::Rotate(1)));
        must("add-chain-4", add_chain(4));
        must("shared-double", shared_double());
        repo
    }
}

impl Default for CircuitRepo {
    fn default() -> Self {
        Self::new()
    }
}

fn unary_gate(gate: Gate) -> Circuit {
    let mut b = CircuitBuilder::new();
    let x = b.input("x").expect("fresh builder");
    let out = b.gate(gate, &[x]).expect("unary gate over input");
    b.output("out", out).expect("single output");
    b.build().expect("one output declared")
}

fn binary_gate(gate: Gate) -> Circuit {
    let mut b = CircuitBuilder::new();
    let x = b.input("x").expect("fresh builder");
    let y = b.input("y").expect("distinct input name");
    let out = b.gate(gate, &[x, y]).expect("binary gate over inputs");
    b.output("out", out).expect("single output");
    b.build().expect("one output declared")
}

/// `out = x + x + ... + x`, `depth` additions deep.
fn add_chain(depth: usize) -> Circuit {
    let mut b = CircuitBuilder::new();
    let x = b.input("x").expect("fresh builder");
    let mut acc = x;
    for _ in 0..depth {
        acc = b.gate(Gate::Add, &[acc, x]).expect("chain over input");
    }
    b.output("out", acc).expect("single output");
    b.build().expect("one output declared")
}

/// Two outputs sharing one sub-result:
/// `t = x + y; doubled = t + t; shifted = t + 1`.
fn shared_double() -> Circuit {
    let mut b = CircuitBuilder::new();
    let x = b.input("x").expect("fresh builder");
    let y = b.input("y").expect("distinct input name");
    let t = b.gate(Gate::Add, &[x, y]).expect("sum over inputs");
    let doubled = b.gate(Gate::Add, &[t, t]).expect("shared operand");
    let shifted = b.gate(Gate::AddConstant(1), &[t]).expect("shared operand");
    b.output("doubled", doubled).expect("single name");
    b.output("shifted", shifted).expect("distinct name");
    b.build().expect("outputs declared")
}
