use std::collections::VecDeque;

use thiserror::Error;

/// The operation vocabulary circuits are written in. Backend-independent;
/// evaluation-time constants are embedded in the gate itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Add,
    Subtract,
    Multiply,
    Negate,
    AddConstant(i64),
    MultiplyByConstant(i64),
    Rotate(i64),
    /// Forwards its single operand unchanged; useful for renaming wires.
    Alias,
}

impl Gate {
    pub fn arity(&self) -> usize {
        match self {
            Gate::Add | Gate::Subtract | Gate::Multiply => 2,
            Gate::Negate
            | Gate::AddConstant(_)
            | Gate::MultiplyByConstant(_)
            | Gate::Rotate(_)
            | Gate::Alias => 1,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Gate::Add => "add",
            Gate::Subtract => "subtract",
            Gate::Multiply => "multiply",
            Gate::Negate => "negate",
            Gate::AddConstant(_) => "add-constant",
            Gate::MultiplyByConstant(_) => "multiply-by-constant",
            Gate::Rotate(_) => "rotate",
            Gate::Alias => "alias",
        }
    }
}

/// Index into a circuit's node arena. Only mintable by the builder that
/// owns the arena, so edges always point at already-existing nodes and
/// cycles are structurally unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Wire(pub(crate) usize);

impl Wire {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Node {
    Input { name: String },
    Gate { gate: Gate, args: Vec<Wire> },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CircuitError {
    #[error("input `{0}` is already declared")]
    DuplicateInput(String),
    #[error("output `{0}` is already declared")]
    DuplicateOutput(String),
    #[error("wire {0} does not belong to this circuit")]
    UnknownWire(usize),
    #[error("gate `{gate}` takes {want} operand(s), got {got}")]
    BadArity {
        gate: &'static str,
        want: usize,
        got: usize,
    },
    #[error("circuit declares no outputs")]
    NoOutputs,
}

/// Builds a [`Circuit`] bottom-up: inputs first, then gates over existing
/// wires, then named outputs. All structural errors are caught here, at
/// construction time; a built circuit is immutable and always evaluable.
pub struct CircuitBuilder {
    nodes: Vec<Node>,
    inputs: Vec<(String, Wire)>,
    outputs: Vec<(String, Wire)>,
}

impl CircuitBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn input(&mut self, name: &str) -> Result<Wire, CircuitError> {
        if self.inputs.iter().any(|(n, _)| n == name) {
            return Err(CircuitError::DuplicateInput(name.to_string()));
        }
        let wire = Wire(self.nodes.len());
        self.nodes.push(Node::Input {
            name: name.to_string(),
        });
        self.inputs.push((name.to_string(), wire));
        Ok(wire)
    }

    pub fn gate(&mut self, gate: Gate, args: &[Wire]) -> Result<Wire, CircuitError> {
        if args.len() != gate.arity() {
            return Err(CircuitError::BadArity {
                gate: gate.label(),
                want: gate.arity(),
                got: args.len(),
            });
        }
        if let Some(bad) = args.iter().find(|w| w.0 >= self.nodes.len()) {
            return Err(CircuitError::UnknownWire(bad.0));
        }
        let wire = Wire(self.nodes.len());
        self.nodes.push(Node::Gate {
            gate,
            args: args.to_vec(),
        });
        Ok(wire)
    }

    pub fn output(&mut self, name: &str, wire: Wire) -> Result<(), CircuitError> {
        if self.outputs.iter().any(|(n, _)| n == name) {
            return Err(CircuitError::DuplicateOutput(name.to_string()));
        }
        if wire.0 >= self.nodes.len() {
            return Err(CircuitError::UnknownWire(wire.0));
        }
        self.outputs.push((name.to_string(), wire));
        Ok(())
    }

    pub fn build(self) -> Result<Circuit, CircuitError> {
        if self.outputs.is_empty() {
            return Err(CircuitError::NoOutputs);
        }
        Ok(Circuit {
            nodes: self.nodes,
            inputs: self.inputs,
            outputs: self.outputs,
        })
    }
}

impl Default for CircuitBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An immutable DAG of operation nodes with named input and output ports.
#[derive(Debug, Clone)]
pub struct Circuit {
    nodes: Vec<Node>,
    inputs: Vec<(String, Wire)>,
    outputs: Vec<(String, Wire)>,
}

impl Circuit {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn inputs(&self) -> &[(String, Wire)] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[(String, Wire)] {
        &self.outputs
    }

    pub(crate) fn node(&self, wire: Wire) -> &Node {
        &self.nodes[wire.0]
    }

    /// One valid topological order (Kahn). Any valid order yields the same
    /// evaluation result; [`crate::Evaluator::with_order`] accepts others.
    pub fn schedule(&self) -> Vec<Wire> {
        let n = self.nodes.len();
        let mut indegree = vec![0usize; n];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (i, node) in self.nodes.iter().enumerate() {
            if let Node::Gate { args, .. } = node {
                indegree[i] = args.len();
                for w in args {
                    dependents[w.0].push(i);
                }
            }
        }

        let mut ready: VecDeque<usize> = (0..n).filter(|&i| indegree[i] == 0).collect();
        let mut order = Vec::with_capacity(n);
        while let Some(i) = ready.pop_front() {
            order.push(Wire(i));
            for &d in &dependents[i] {
                indegree[d] -= 1;
                if indegree[d] == 0 {
                    ready.push_back(d);
                }
            }
        }
        debug_assert_eq!(order.len(), n);
        order
    }
}
