//! A small stateless behavior-tree engine.
//!
//! Trees are built once and evaluated from the root every turn. Leaves
//! are closures over two pieces of context handed in at evaluation time:
//! a per-agent blackboard `B` and the shared world `W`. Keeping the
//! context out of the tree means a tree never borrows the data it
//! operates on.

use std::fmt;

/// Result of evaluating a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeStatus {
    /// The node achieved its goal.
    Success,
    /// The node could not act.
    Failure,
    /// The node acted and its goal needs more turns.
    Running,
}

/// Leaf action: may mutate both blackboard and world.
pub type ActionFn<B, W> = Box<dyn Fn(&mut B, &mut W) -> NodeStatus>;

/// Leaf predicate: read-only.
pub type ConditionFn<B, W> = Box<dyn Fn(&B, &W) -> bool>;

/// A behavior-tree node.
pub enum BehaviorNode<B, W> {
    /// Runs an operation and reports its status.
    Action(ActionFn<B, W>),
    /// Success when the predicate holds, Failure otherwise.
    Condition(ConditionFn<B, W>),
    /// Tries children in order until one does not fail.
    Selector(Vec<BehaviorNode<B, W>>),
    /// Runs children in order until one does not succeed.
    Sequence(Vec<BehaviorNode<B, W>>),
}

impl<B, W> BehaviorNode<B, W> {
    /// Wrap an action closure.
    pub fn action(f: impl Fn(&mut B, &mut W) -> NodeStatus + 'static) -> Self {
        Self::Action(Box::new(f))
    }

    /// Wrap a condition closure.
    pub fn condition(f: impl Fn(&B, &W) -> bool + 'static) -> Self {
        Self::Condition(Box::new(f))
    }

    /// Selector over `children`.
    #[must_use]
    pub fn selector(children: Vec<Self>) -> Self {
        Self::Selector(children)
    }

    /// Sequence over `children`.
    #[must_use]
    pub fn sequence(children: Vec<Self>) -> Self {
        Self::Sequence(children)
    }

    /// Evaluate this node and, as needed, its children.
    ///
    /// A sequence stops at the first child that fails or is running and
    /// returns that status; it succeeds only if every child succeeds. A
    /// selector stops at the first child that succeeds or is running; it
    /// fails only if every child fails. Empty sequences succeed and empty
    /// selectors fail.
    pub fn evaluate(&self, blackboard: &mut B, world: &mut W) -> NodeStatus {
        match self {
            Self::Action(f) => f(blackboard, world),
            Self::Condition(f) => {
                if f(blackboard, world) {
                    NodeStatus::Success
                } else {
                    NodeStatus::Failure
                }
            }
            Self::Sequence(children) => {
                for child in children {
                    match child.evaluate(blackboard, world) {
                        NodeStatus::Success => continue,
                        other => return other,
                    }
                }
                NodeStatus::Success
            }
            Self::Selector(children) => {
                for child in children {
                    match child.evaluate(blackboard, world) {
                        NodeStatus::Failure => continue,
                        other => return other,
                    }
                }
                NodeStatus::Failure
            }
        }
    }

    /// Number of nodes in this subtree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        match self {
            Self::Action(_) | Self::Condition(_) => 1,
            Self::Selector(children) | Self::Sequence(children) => {
                1 + children.iter().map(Self::node_count).sum::<usize>()
            }
        }
    }
}

impl<B, W> fmt::Debug for BehaviorNode<B, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action(_) => f.write_str("Action"),
            Self::Condition(_) => f.write_str("Condition"),
            Self::Selector(children) => f.debug_tuple("Selector").field(children).finish(),
            Self::Sequence(children) => f.debug_tuple("Sequence").field(children).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Blackboard that records which leaves ran.
    #[derive(Default)]
    struct Trace(Vec<&'static str>);

    type Node = BehaviorNode<Trace, u32>;

    fn leaf(name: &'static str, status: NodeStatus) -> Node {
        BehaviorNode::action(move |trace: &mut Trace, world: &mut u32| {
            trace.0.push(name);
            *world += 1;
            status
        })
    }

    #[test]
    fn test_sequence_short_circuits_on_failed_condition() {
        let tree: Node = BehaviorNode::sequence(vec![
            BehaviorNode::condition(|_, _| false),
            leaf("x", NodeStatus::Success),
        ]);
        let mut trace = Trace::default();
        let mut world = 0;
        assert_eq!(tree.evaluate(&mut trace, &mut world), NodeStatus::Failure);
        assert!(trace.0.is_empty());
        assert_eq!(world, 0);
    }

    #[test]
    fn test_selector_falls_through_failure() {
        let tree = BehaviorNode::selector(vec![
            leaf("a", NodeStatus::Failure),
            leaf("b", NodeStatus::Success),
            leaf("c", NodeStatus::Success),
        ]);
        let mut trace = Trace::default();
        let mut world = 0;
        assert_eq!(tree.evaluate(&mut trace, &mut world), NodeStatus::Success);
        assert_eq!(trace.0, vec!["a", "b"]);
    }

    #[test]
    fn test_running_short_circuits_both_composites() {
        let seq = BehaviorNode::sequence(vec![
            leaf("a", NodeStatus::Running),
            leaf("b", NodeStatus::Success),
        ]);
        let sel = BehaviorNode::selector(vec![
            leaf("c", NodeStatus::Running),
            leaf("d", NodeStatus::Success),
        ]);
        let mut trace = Trace::default();
        let mut world = 0;
        assert_eq!(seq.evaluate(&mut trace, &mut world), NodeStatus::Running);
        assert_eq!(sel.evaluate(&mut trace, &mut world), NodeStatus::Running);
        assert_eq!(trace.0, vec!["a", "c"]);
    }

    #[test]
    fn test_all_children_same_status() {
        let all_fail = BehaviorNode::selector(vec![
            leaf("a", NodeStatus::Failure),
            leaf("b", NodeStatus::Failure),
        ]);
        let all_succeed = BehaviorNode::sequence(vec![
            leaf("c", NodeStatus::Success),
            leaf("d", NodeStatus::Success),
        ]);
        let mut trace = Trace::default();
        let mut world = 0;
        assert_eq!(all_fail.evaluate(&mut trace, &mut world), NodeStatus::Failure);
        assert_eq!(all_succeed.evaluate(&mut trace, &mut world), NodeStatus::Success);
        assert_eq!(world, 4);
    }

    #[test]
    fn test_empty_composites() {
        let mut trace = Trace::default();
        let mut world = 0;
        let seq: Node = BehaviorNode::sequence(Vec::new());
        let sel: Node = BehaviorNode::selector(Vec::new());
        assert_eq!(seq.evaluate(&mut trace, &mut world), NodeStatus::Success);
        assert_eq!(sel.evaluate(&mut trace, &mut world), NodeStatus::Failure);
    }

    #[test]
    fn test_condition_reads_context() {
        let tree: Node = BehaviorNode::sequence(vec![
            BehaviorNode::condition(|_, world: &u32| *world > 2),
            leaf("go", NodeStatus::Success),
        ]);
        let mut trace = Trace::default();
        let mut world = 3;
        assert_eq!(tree.evaluate(&mut trace, &mut world), NodeStatus::Success);
        assert_eq!(trace.0, vec!["go"]);
        assert_eq!(tree.node_count(), 3);
    }
}
