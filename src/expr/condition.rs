// Copyright 2025 Content Filter Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Tri-state condition nodes of a bound filter expression
//!
//! Conditions live in an arena ([`ConditionArena`]); parent links are
//! arena indices, which keeps the child-to-parent notification path free
//! of reference cycles. State transitions are monotone within one
//! evaluation: `Undecided -> True | False`, never back; [`reset`] restores
//! every node to `Undecided`.
//!
//! [`reset`]: ConditionArena::reset

use crate::parser::ComparisonOp;

/// Evaluation state of a condition node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionState {
    /// No result yet
    Undecided,
    /// The condition evaluated to false
    False,
    /// The condition evaluated to true
    True,
}

/// Logical operator of a compound condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundOp {
    /// Unary negation
    Not,
    /// Binary conjunction
    And,
    /// Binary disjunction
    Or,
}

/// Reference to an operand value in the expression's stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandRef {
    /// Index into the constant store
    Constant(usize),
    /// Index into the parameter store
    Parameter(usize),
    /// Index into the field store
    Field(usize),
}

/// The payload of a condition node.
#[derive(Debug, Clone, Copy)]
pub enum ConditionKind {
    /// A leaf comparison between two operand values
    Predicate {
        op: ComparisonOp,
        left: OperandRef,
        right: OperandRef,
    },
    /// A logical combination of one or two child conditions
    Compound {
        op: CompoundOp,
        left: usize,
        right: Option<usize>,
    },
}

/// One condition node of the expression tree.
#[derive(Debug)]
pub struct Condition {
    /// What this node computes
    pub kind: ConditionKind,
    /// Current tri-state result
    state: ConditionState,
    /// Arena index of the containing compound, if any
    parent: Option<usize>,
    /// How many children have reached a decision this evaluation
    children_decided: u8,
}

/// Arena holding the condition nodes of one expression.
///
/// Nodes are pushed bottom-up during binding; the tree is never reshaped
/// afterwards, so parent indices stay valid for the expression's lifetime.
#[derive(Debug, Default)]
pub struct ConditionArena {
    nodes: Vec<Condition>,
}

impl ConditionArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true when the arena holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Remove all nodes, keeping the allocation.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Current state of the node at `index`.
    pub fn state(&self, index: usize) -> ConditionState {
        self.nodes[index].state
    }

    /// The kind of the node at `index`.
    pub fn kind(&self, index: usize) -> ConditionKind {
        self.nodes[index].kind
    }

    /// Append a predicate node.
    pub fn push_predicate(&mut self, op: ComparisonOp, left: OperandRef, right: OperandRef) -> usize {
        self.nodes.push(Condition {
            kind: ConditionKind::Predicate { op, left, right },
            state: ConditionState::Undecided,
            parent: None,
            children_decided: 0,
        });
        self.nodes.len() - 1
    }

    /// Append a compound node and link its children to it.
    pub fn push_compound(&mut self, op: CompoundOp, left: usize, right: Option<usize>) -> usize {
        debug_assert!(right.is_some() || op == CompoundOp::Not);
        let index = self.nodes.len();
        self.nodes.push(Condition {
            kind: ConditionKind::Compound { op, left, right },
            state: ConditionState::Undecided,
            parent: None,
            children_decided: 0,
        });
        self.nodes[left].parent = Some(index);
        if let Some(right) = right {
            self.nodes[right].parent = Some(index);
        }
        index
    }

    /// Restore every node to `Undecided` and zero the decision counters.
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            node.state = ConditionState::Undecided;
            node.children_decided = 0;
        }
    }

    /// Record a decision for the node at `index` and propagate it upward.
    ///
    /// A compound reacts to a child decision the way short-circuit
    /// evaluation dictates: AND turns false on the first false child and
    /// true once both children are true; OR is symmetric; NOT inverts.
    /// Already-decided nodes ignore further notifications, keeping state
    /// transitions monotone.
    pub fn set_result(&mut self, index: usize, result: bool) {
        let mut index = index;
        let mut state = if result {
            ConditionState::True
        } else {
            ConditionState::False
        };

        loop {
            if self.nodes[index].state != ConditionState::Undecided {
                break;
            }
            self.nodes[index].state = state;

            let parent_index = match self.nodes[index].parent {
                Some(p) => p,
                None => break,
            };

            let parent = &mut self.nodes[parent_index];
            parent.children_decided += 1;
            if parent.state != ConditionState::Undecided {
                break;
            }
            let op = match parent.kind {
                ConditionKind::Compound { op, .. } => op,
                ConditionKind::Predicate { .. } => break,
            };

            let next = match op {
                CompoundOp::Not => Some(state == ConditionState::False),
                CompoundOp::And => {
                    if state == ConditionState::False {
                        Some(false)
                    } else if parent.children_decided == 2 {
                        Some(true)
                    } else {
                        None
                    }
                }
                CompoundOp::Or => {
                    if state == ConditionState::True {
                        Some(true)
                    } else if parent.children_decided == 2 {
                        Some(false)
                    } else {
                        None
                    }
                }
            };

            match next {
                Some(result) => {
                    state = if result {
                        ConditionState::True
                    } else {
                        ConditionState::False
                    };
                    index = parent_index;
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_predicate(arena: &mut ConditionArena) -> usize {
        arena.push_predicate(ComparisonOp::Eq, OperandRef::Constant(0), OperandRef::Constant(1))
    }

    #[test]
    fn test_predicate_decision() {
        let mut arena = ConditionArena::new();
        let p = dummy_predicate(&mut arena);
        assert_eq!(arena.state(p), ConditionState::Undecided);

        arena.set_result(p, true);
        assert_eq!(arena.state(p), ConditionState::True);

        // Monotone: a later conflicting notification is ignored.
        arena.set_result(p, false);
        assert_eq!(arena.state(p), ConditionState::True);
    }

    #[test]
    fn test_not_inverts() {
        let mut arena = ConditionArena::new();
        let p = dummy_predicate(&mut arena);
        let n = arena.push_compound(CompoundOp::Not, p, None);

        arena.set_result(p, true);
        assert_eq!(arena.state(n), ConditionState::False);

        arena.reset();
        arena.set_result(p, false);
        assert_eq!(arena.state(n), ConditionState::True);
    }

    #[test]
    fn test_and_short_circuits_on_false() {
        let mut arena = ConditionArena::new();
        let a = dummy_predicate(&mut arena);
        let b = dummy_predicate(&mut arena);
        let and = arena.push_compound(CompoundOp::And, a, Some(b));

        arena.set_result(a, false);
        // One false child decides the AND immediately.
        assert_eq!(arena.state(and), ConditionState::False);
        assert_eq!(arena.state(b), ConditionState::Undecided);
    }

    #[test]
    fn test_and_waits_for_both_true() {
        let mut arena = ConditionArena::new();
        let a = dummy_predicate(&mut arena);
        let b = dummy_predicate(&mut arena);
        let and = arena.push_compound(CompoundOp::And, a, Some(b));

        arena.set_result(a, true);
        assert_eq!(arena.state(and), ConditionState::Undecided);
        arena.set_result(b, true);
        assert_eq!(arena.state(and), ConditionState::True);
    }

    #[test]
    fn test_or_short_circuits_on_true() {
        let mut arena = ConditionArena::new();
        let a = dummy_predicate(&mut arena);
        let b = dummy_predicate(&mut arena);
        let or = arena.push_compound(CompoundOp::Or, a, Some(b));

        arena.set_result(b, true);
        assert_eq!(arena.state(or), ConditionState::True);
        assert_eq!(arena.state(a), ConditionState::Undecided);
    }

    #[test]
    fn test_or_false_needs_both() {
        let mut arena = ConditionArena::new();
        let a = dummy_predicate(&mut arena);
        let b = dummy_predicate(&mut arena);
        let or = arena.push_compound(CompoundOp::Or, a, Some(b));

        arena.set_result(a, false);
        assert_eq!(arena.state(or), ConditionState::Undecided);
        arena.set_result(b, false);
        assert_eq!(arena.state(or), ConditionState::False);
    }

    #[test]
    fn test_propagation_through_levels() {
        // NOT (a AND b) with a = false: AND is false, NOT is true.
        let mut arena = ConditionArena::new();
        let a = dummy_predicate(&mut arena);
        let b = dummy_predicate(&mut arena);
        let and = arena.push_compound(CompoundOp::And, a, Some(b));
        let not = arena.push_compound(CompoundOp::Not, and, None);

        arena.set_result(a, false);
        assert_eq!(arena.state(and), ConditionState::False);
        assert_eq!(arena.state(not), ConditionState::True);
    }

    #[test]
    fn test_reset_restores_undecided() {
        let mut arena = ConditionArena::new();
        let a = dummy_predicate(&mut arena);
        let b = dummy_predicate(&mut arena);
        let or = arena.push_compound(CompoundOp::Or, a, Some(b));

        arena.set_result(a, true);
        assert_eq!(arena.state(or), ConditionState::True);

        arena.reset();
        assert_eq!(arena.state(a), ConditionState::Undecided);
        assert_eq!(arena.state(b), ConditionState::Undecided);
        assert_eq!(arena.state(or), ConditionState::Undecided);

        // The tree works again after a reset.
        arena.set_result(a, false);
        arena.set_result(b, false);
        assert_eq!(arena.state(or), ConditionState::False);
    }

    #[test]
    fn test_late_notification_after_parent_decided() {
        let mut arena = ConditionArena::new();
        let a = dummy_predicate(&mut arena);
        let b = dummy_predicate(&mut arena);
        let and = arena.push_compound(CompoundOp::And, a, Some(b));

        arena.set_result(a, false);
        assert_eq!(arena.state(and), ConditionState::False);

        // The other child deciding later must not disturb the result.
        arena.set_result(b, true);
        assert_eq!(arena.state(and), ConditionState::False);
    }
}
