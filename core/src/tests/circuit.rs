use crate::circuit::{CircuitBuilder, CircuitError, Gate, Node};

#[test]
fn duplicate_input_names_are_rejected() {
    let mut b = CircuitBuilder::new();
    b.input("x").unwrap();
    assert_eq!(
        b.input("x").unwrap_err(),
        CircuitError::DuplicateInput("x".to_string())
    );
}

#[test]
fn duplicate_output_names_are_rejected() {
    let mut b = CircuitBuilder::new();
    let x = b.input("x").unwrap();
    b.output("out", x).unwrap();
    assert_eq!(
        b.output("out", x).unwrap_err(),
        CircuitError::DuplicateOutput("out".to_string())
    );
}

#[test]
fn arity_is_checked_per_gate() {
    let mut b = CircuitBuilder::new();
    let x = b.input("x").unwrap();
    assert_eq!(
        b.gate(Gate::Add, &[x]).unwrap_err(),
        CircuitError::BadArity {
            gate: "add",
            want: 2,
            got: 1
        }
    );
    assert_eq!(
        b.gate(Gate::Negate, &[x, x]).unwrap_err(),
        CircuitError::BadArity {
            gate: "negate",
            want: 1,
            got: 2
        }
    );
}

#[test]
fn wires_from_another_builder_are_rejected() {
    let mut donor = CircuitBuilder::new();
    donor.input("x").unwrap();
    let y = donor.input("y").unwrap();
    let foreign = donor.gate(Gate::Negate, &[y]).unwrap();

    let mut b = CircuitBuilder::new();
    assert_eq!(
        b.gate(Gate::Negate, &[foreign]).unwrap_err(),
        CircuitError::UnknownWire(foreign.index())
    );
    assert_eq!(
        b.output("out", foreign).unwrap_err(),
        CircuitError::UnknownWire(foreign.index())
    );
}

#[test]
fn build_requires_an_output() {
    let mut b = CircuitBuilder::new();
    b.input("x").unwrap();
    assert_eq!(b.build().unwrap_err(), CircuitError::NoOutputs);
}

#[test]
fn schedule_visits_operands_first() {
    let mut b = CircuitBuilder::new();
    let x = b.input("x").unwrap();
    let y = b.input("y").unwrap();
    let t = b.gate(Gate::Add, &[x, y]).unwrap();
    let u = b.gate(Gate::MultiplyByConstant(3), &[t]).unwrap();
    let v = b.gate(Gate::Subtract, &[u, t]).unwrap();
    b.output("out", v).unwrap();
    let circuit = b.build().unwrap();

    let order = circuit.schedule();
    assert_eq!(order.len(), circuit.len());
    let position = |wire| order.iter().position(|w| *w == wire).unwrap();
    for w in &order {
        if let Node::Gate { args, .. } = circuit.node(*w) {
            for a in args {
                assert!(position(*a) < position(*w));
            }
        }
    }
}
