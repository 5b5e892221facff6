use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use itertools::izip;
use thiserror::Error;
use tracing::debug;

use heval_backend::{ContextError, HeContext, SlotValue};
use heval_utils::Map;

use crate::circuit::{Circuit, Gate, Node, Wire};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("input `{0}` has no binding")]
    UnboundInput(String),
    #[error("input `{name}` is bound to {got} slots, other inputs carry {want}")]
    RaggedInput {
        name: String,
        got: usize,
        want: usize,
    },
    #[error("evaluation order is not a valid topological order of the circuit")]
    InvalidOrder,
    #[error("context operation `{op}` failed at node {node}")]
    Context {
        op: &'static str,
        node: usize,
        #[source]
        source: ContextError,
    },
    #[error("decryption of output `{output}` failed")]
    Decrypt {
        output: String,
        #[source]
        source: ContextError,
    },
    #[error("clear run is missing output `{0}`")]
    MissingClearOutput(String),
}

/// Named input bindings: one slot vector per declared input port.
pub struct Bindings<V> {
    values: Map<String, Vec<V>>,
}

impl<V: Clone> Bindings<V> {
    pub fn new() -> Self {
        Self { values: Map::new() }
    }

    /// Binds (or rebinds) `name`; the last binding wins.
    pub fn bind(mut self, name: &str, slots: &[V]) -> Self {
        self.values.insert(name.to_string(), slots.to_vec());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Vec<V>> {
        self.values.get(name)
    }
}

impl<V: SlotValue> Bindings<V> {
    /// The same bindings as reduced words, for the clear reference path.
    pub fn to_words(&self) -> Bindings<u64> {
        let mut words = Bindings::new();
        for (name, v) in self.values.0.iter() {
            let slots: Vec<u64> = v.iter().map(|x| x.to_word()).collect();
            words = words.bind(name, &slots);
        }
        words
    }
}

impl<V: Clone> Default for Bindings<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Wall-clock phase timings of one evaluation run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunTimings {
    pub encrypt: Duration,
    pub evaluate: Duration,
}

/// Encrypted-path result: one ciphertext per declared output port.
pub struct EncryptedRun<C: HeContext> {
    pub outputs: BTreeMap<String, C::Ciphertext>,
    pub timings: RunTimings,
}

impl<C: HeContext> fmt::Debug for EncryptedRun<C>
where
    C::Ciphertext: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedRun")
            .field("outputs", &self.outputs)
            .field("timings", &self.timings)
            .finish()
    }
}

/// Clear-path result: reduced slot words per declared output port.
#[derive(Debug, Clone)]
pub struct ClearRun {
    pub outputs: BTreeMap<String, Vec<u64>>,
    pub timings: RunTimings,
}

/// Walks a circuit in a fixed topological order, dispatching every node
/// either to a backend context or to the modular reference arithmetic.
#[derive(Debug)]
pub struct Evaluator<'c> {
    circuit: &'c Circuit,
    order: Vec<Wire>,
}

impl<'c> Evaluator<'c> {
    pub fn new(circuit: &'c Circuit) -> Self {
        Self {
            order: circuit.schedule(),
            circuit,
        }
    }

    /// Uses a caller-supplied node order. The order must visit every node
    /// exactly once with all operands first; any valid order produces the
    /// same outputs.
    pub fn with_order(circuit: &'c Circuit, order: Vec<Wire>) -> Result<Self, EvalError> {
        let n = circuit.len();
        if order.len() != n {
            return Err(EvalError::InvalidOrder);
        }
        let mut position = vec![usize::MAX; n];
        for (pos, w) in order.iter().enumerate() {
            if w.0 >= n || position[w.0] != usize::MAX {
                return Err(EvalError::InvalidOrder);
            }
            position[w.0] = pos;
        }
        for w in &order {
            if let Node::Gate { args, .. } = circuit.node(*w) {
                if args.iter().any(|a| position[a.0] >= position[w.0]) {
                    return Err(EvalError::InvalidOrder);
                }
            }
        }
        Ok(Self { circuit, order })
    }

    /// Checks every declared input for a binding and a consistent slot
    /// count, returning the common count.
    fn checked_slot_count<V: Clone>(&self, bindings: &Bindings<V>) -> Result<usize, EvalError> {
        let mut want: Option<usize> = None;
        for (name, _) in self.circuit.inputs() {
            let bound = bindings
                .get(name)
                .ok_or_else(|| EvalError::UnboundInput(name.clone()))?;
            match want {
                None => want = Some(bound.len()),
                Some(w) if w != bound.len() => {
                    return Err(EvalError::RaggedInput {
                        name: name.clone(),
                        got: bound.len(),
                        want: w,
                    });
                }
                Some(_) => {}
            }
        }
        Ok(want.unwrap_or(0))
    }

    /// Encrypted path: every bound input is encrypted once, then each gate
    /// dispatches to the corresponding context operation.
    pub fn run<C: HeContext>(
        &self,
        ctx: &mut C,
        bindings: &Bindings<C::Value>,
    ) -> Result<EncryptedRun<C>, EvalError> {
        self.checked_slot_count(bindings)?;
        debug!(
            context = ctx.name(),
            nodes = self.circuit.len(),
            "encrypted evaluation"
        );

        let mut wires: Vec<Option<C::Ciphertext>> = (0..self.circuit.len()).map(|_| None).collect();

        let start = Instant::now();
        for w in &self.order {
            if let Node::Input { name } = self.circuit.node(*w) {
                let bound = bindings
                    .get(name)
                    .ok_or_else(|| EvalError::UnboundInput(name.clone()))?;
                let ct = ctx.encrypt(bound).map_err(|source| EvalError::Context {
                    op: "encrypt",
                    node: w.0,
                    source,
                })?;
                wires[w.0] = Some(ct);
            }
        }
        let encrypt = start.elapsed();

        let start = Instant::now();
        for w in &self.order {
            let Node::Gate { gate, args } = self.circuit.node(*w) else {
                continue;
            };
            let arg = |i: usize| -> &C::Ciphertext {
                wires[args[i].0]
                    .as_ref()
                    .expect("operands precede their gate in a valid order")
            };
            let result = match gate {
                Gate::Add => ctx.add(arg(0), arg(1)),
                Gate::Subtract => ctx.subtract(arg(0), arg(1)),
                Gate::Multiply => ctx.multiply(arg(0), arg(1)),
                Gate::Negate => ctx.negate(arg(0)),
                Gate::AddConstant(c) => ctx.add_constant(arg(0), *c),
                Gate::MultiplyByConstant(c) => ctx.multiply_by_constant(arg(0), *c),
                Gate::Rotate(k) => ctx.rotate(arg(0), *k),
                Gate::Alias => Ok(arg(0).clone()),
            };
            let ct = result.map_err(|source| EvalError::Context {
                op: gate.label(),
                node: w.0,
                source,
            })?;
            wires[w.0] = Some(ct);
        }
        let evaluate = start.elapsed();

        let outputs = self
            .circuit
            .outputs()
            .iter()
            .map(|(name, w)| {
                let ct = wires[w.0]
                    .as_ref()
                    .expect("outputs resolve to evaluated nodes")
                    .clone();
                (name.clone(), ct)
            })
            .collect();

        Ok(EncryptedRun {
            outputs,
            timings: RunTimings { encrypt, evaluate },
        })
    }

    /// Clear reference path: pure modular arithmetic on slot words under
    /// the explicitly supplied governing modulus.
    pub fn run_clear(
        &self,
        modulus: u64,
        bindings: &Bindings<u64>,
    ) -> Result<ClearRun, EvalError> {
        assert!((2..=1 << 32).contains(&modulus), "modulus out of range");
        self.checked_slot_count(bindings)?;
        debug!(modulus, nodes = self.circuit.len(), "clear evaluation");

        let mut wires: Vec<Option<Vec<u64>>> = vec![None; self.circuit.len()];

        let start = Instant::now();
        for w in &self.order {
            let words = match self.circuit.node(*w) {
                Node::Input { name } => bindings
                    .get(name)
                    .ok_or_else(|| EvalError::UnboundInput(name.clone()))?
                    .iter()
                    .map(|x| x % modulus)
                    .collect(),
                Node::Gate { gate, args } => {
                    let lhs = wires[args[0].0]
                        .as_ref()
                        .expect("operands precede their gate in a valid order");
                    let rhs = args.get(1).map(|a| {
                        wires[a.0]
                            .as_ref()
                            .expect("operands precede their gate in a valid order")
                    });
                    clear_gate(*gate, lhs, rhs, modulus)
                }
            };
            wires[w.0] = Some(words);
        }
        let evaluate = start.elapsed();

        let outputs = self
            .circuit
            .outputs()
            .iter()
            .map(|(name, w)| {
                let words = wires[w.0]
                    .as_ref()
                    .expect("outputs resolve to evaluated nodes")
                    .clone();
                (name.clone(), words)
            })
            .collect();

        Ok(ClearRun {
            outputs,
            timings: RunTimings {
                encrypt: Duration::ZERO,
                evaluate,
            },
        })
    }
}

/// Scalar reference semantics of each gate under modulus `m`. Operands
/// are already reduced, so sums stay below `2^33` and products below
/// `2^64`.
fn clear_gate(gate: Gate, a: &[u64], b: Option<&Vec<u64>>, m: u64) -> Vec<u64> {
    match gate {
        Gate::Add => {
            let b = b.expect("binary gate");
            izip!(a, b).map(|(x, y)| (x + y) % m).collect()
        }
        Gate::Subtract => {
            let b = b.expect("binary gate");
            izip!(a, b).map(|(x, y)| (x + m - y) % m).collect()
        }
        Gate::Multiply => {
            let b = b.expect("binary gate");
            izip!(a, b).map(|(x, y)| (x * y) % m).collect()
        }
        Gate::Negate => a.iter().map(|&x| (m - x) % m).collect(),
        Gate::AddConstant(c) => {
            let c = c.rem_euclid(m as i64) as u64;
            a.iter().map(|&x| (x + c) % m).collect()
        }
        Gate::MultiplyByConstant(c) => {
            let c = c.rem_euclid(m as i64) as u64;
            a.iter().map(|&x| (x * c) % m).collect()
        }
        Gate::Rotate(k) => {
            let mut out = a.to_vec();
            if !out.is_empty() {
                let shift = k.rem_euclid(out.len() as i64) as usize;
                out.rotate_left(shift);
            }
            out
        }
        Gate::Alias => a.to_vec(),
    }
}
