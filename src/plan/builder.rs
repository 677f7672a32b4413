//! Plan builder: flattens a content tree into execution units.

use super::{ExecutionUnit, Plan};
use crate::content::Node;

impl Plan {
    /// Flatten a content tree into an ordered plan.
    ///
    /// Rules, applied recursively in pre-order:
    /// - `Null` and `Bool` produce nothing.
    /// - `Text` produces one text unit iff it contains a non-whitespace
    ///   character; the original string is kept verbatim.
    /// - `Number` produces one text unit with its display representation.
    /// - `List` and `Fragment` flatten their children in order.
    /// - An element recognized as a nested typewriter produces one nested
    ///   unit referencing the node itself, unexpanded.
    /// - Any other element produces one instant unit.
    pub fn build(root: &Node) -> Self {
        let mut units = Vec::new();
        collect(root, &mut units);
        Self::from_units(units)
    }
}

fn collect(node: &Node, out: &mut Vec<ExecutionUnit>) {
    match node {
        Node::Null | Node::Bool(_) => {}
        Node::Text(content) => {
            if content.chars().any(|c| !c.is_whitespace()) {
                out.push(ExecutionUnit::Text {
                    content: content.clone(),
                });
            }
        }
        Node::Number(value) => out.push(ExecutionUnit::Text {
            content: value.to_string(),
        }),
        Node::List(children) | Node::Fragment(children) => {
            for child in children {
                collect(child, out);
            }
        }
        Node::Element(element) => {
            if element.is_stream() {
                out.push(ExecutionUnit::Nested { node: node.clone() });
            } else {
                out.push(ExecutionUnit::Instant { node: node.clone() });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ComponentId, ComponentRef};
    use crate::plan::UnitKind;

    fn kinds(plan: &Plan) -> Vec<UnitKind> {
        plan.units().iter().map(ExecutionUnit::kind).collect()
    }

    #[test]
    fn test_null_and_bool_ignored() {
        let tree = Node::list(vec![Node::Null, Node::Bool(true), Node::Bool(false)]);
        assert!(Plan::build(&tree).is_empty());
    }

    #[test]
    fn test_whitespace_only_text_ignored() {
        let tree = Node::list(vec![Node::text("   \n\t"), Node::text("")]);
        assert!(Plan::build(&tree).is_empty());
    }

    #[test]
    fn test_text_kept_verbatim() {
        let plan = Plan::build(&Node::text("  Hello  world  "));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.get(0).unwrap().text_content(), Some("  Hello  world  "));
    }

    #[test]
    fn test_number_becomes_text() {
        let plan = Plan::build(&Node::Number(5.0));
        assert_eq!(plan.get(0).unwrap().text_content(), Some("5"));

        let plan = Plan::build(&Node::Number(2.5));
        assert_eq!(plan.get(0).unwrap().text_content(), Some("2.5"));
    }

    #[test]
    fn test_collections_flatten_in_order() {
        let tree = Node::list(vec![
            Node::text("a"),
            Node::fragment(vec![Node::text("b"), Node::list(vec![Node::text("c")])]),
            Node::text("d"),
        ]);
        let plan = Plan::build(&tree);
        let texts: Vec<_> = plan
            .units()
            .iter()
            .filter_map(ExecutionUnit::text_content)
            .collect();
        assert_eq!(texts, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_element_is_instant() {
        let tree = Node::element(
            ComponentRef::direct(ComponentId::new("CodeBlock")),
            vec![Node::text("inside")],
        );
        let plan = Plan::build(&tree);
        assert_eq!(kinds(&plan), vec![UnitKind::Instant]);
    }

    #[test]
    fn test_stream_element_is_nested_and_unexpanded() {
        // The child's subtree must not leak into the parent plan.
        let tree = Node::list(vec![
            Node::text("before"),
            Node::stream(vec![Node::text("inner"), Node::text("more")]),
            Node::text("after"),
        ]);
        let plan = Plan::build(&tree);
        assert_eq!(
            kinds(&plan),
            vec![UnitKind::Text, UnitKind::Nested, UnitKind::Text]
        );
    }

    #[test]
    fn test_element_subtree_opaque() {
        // Text inside a plain element does not become its own unit.
        let tree = Node::element(
            ComponentRef::direct(ComponentId::new("Card")),
            vec![Node::text("hidden")],
        );
        assert_eq!(Plan::build(&tree).len(), 1);
    }

    #[test]
    fn test_detection_through_memo_wrapper() {
        let tree = Node::element(
            ComponentRef::memo(ComponentRef::direct(ComponentId::stream())),
            vec![Node::text("inner")],
        );
        assert_eq!(kinds(&Plan::build(&tree)), vec![UnitKind::Nested]);
    }
}
