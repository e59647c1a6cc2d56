//! Canonical naming and growth of variadic input slots

use crate::nodes::{DataType, Node, Port};

pub fn slot_name(prefix: &str, position: usize) -> String {
    format!("{}{}", prefix, position)
}

/// Renames every input to `{prefix}{i}` with `i` its 1-based position.
/// Types and links are left alone. Returns how many slots were renamed.
pub fn renumber_inputs(inputs: &mut [Port], prefix: &str) -> usize {
    let mut renamed = 0;
    for (index, input) in inputs.iter_mut().enumerate() {
        let name = slot_name(prefix, index + 1);
        if input.name != name {
            input.name = name;
            renamed += 1;
        }
    }
    renamed
}

/// Appends one open wildcard slot if the last input is connected.
/// Returns whether a slot was added.
pub fn grow_inputs(node: &mut Node, prefix: &str) -> bool {
    match node.inputs.last() {
        Some(last) if last.is_connected() => {}
        _ => return false,
    }
    let name = slot_name(prefix, node.inputs.len() + 1);
    node.add_input(name, DataType::Any);
    true
}

/// Whether the node's inputs currently satisfy the naming and growth-point rules
pub fn is_settled(node: &Node, prefix: &str) -> bool {
    let names_ok = node
        .inputs
        .iter()
        .enumerate()
        .all(|(index, input)| input.name == slot_name(prefix, index + 1));
    let open: Vec<usize> = node
        .inputs
        .iter()
        .enumerate()
        .filter(|(_, input)| !input.is_connected())
        .map(|(index, _)| index)
        .collect();
    let growth_ok = node.inputs.is_empty() || open == [node.inputs.len() - 1];
    names_ok && growth_ok
}
