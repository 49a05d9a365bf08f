//! Depth-first search over structure trees.
//!
//! Implements pre-order traversal with an explicit stack, so that deeply
//! nested structure cannot exhaust the call stack. [`Findable`] is shared by
//! [`Tree`](super::Tree) and [`Element`](super::Element).

use super::element::Element;
use super::kids::Kids;
use super::types::Node;
use regex::Regex;
use std::fmt;

/// Selects nodes during a search.
///
/// Roles are always the standardized ones (after the role map). Only
/// elements have a role, so [`Matcher::Role`] and [`Matcher::Pattern`] never
/// select content leaves.
pub enum Matcher<'a> {
    /// Every node
    All,
    /// Nodes whose role equals the string
    Role(String),
    /// Nodes whose role starts with a match of the pattern
    Pattern(Regex),
    /// Nodes for which the function returns true
    Predicate(Box<dyn Fn(&Node) -> bool + 'a>),
}

impl<'a> Matcher<'a> {
    /// Match with an arbitrary function.
    pub fn predicate(f: impl Fn(&Node) -> bool + 'a) -> Self {
        Matcher::Predicate(Box::new(f))
    }

    /// Whether `node` is selected.
    pub fn matches(&self, node: &Node) -> bool {
        match self {
            Matcher::All => true,
            Matcher::Role(role) => node.role() == Some(role.as_str()),
            Matcher::Pattern(pattern) => node
                .role()
                .and_then(|role| pattern.find(role))
                .is_some_and(|m| m.start() == 0),
            Matcher::Predicate(f) => f(node),
        }
    }
}

impl fmt::Debug for Matcher<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::All => f.write_str("All"),
            Matcher::Role(role) => f.debug_tuple("Role").field(role).finish(),
            Matcher::Pattern(pattern) => f.debug_tuple("Pattern").field(&pattern.as_str()).finish(),
            Matcher::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<&str> for Matcher<'_> {
    fn from(role: &str) -> Self {
        Matcher::Role(role.to_string())
    }
}

impl From<String> for Matcher<'_> {
    fn from(role: String) -> Self {
        Matcher::Role(role)
    }
}

impl From<Regex> for Matcher<'_> {
    fn from(pattern: Regex) -> Self {
        Matcher::Pattern(pattern)
    }
}

impl From<&Regex> for Matcher<'_> {
    fn from(pattern: &Regex) -> Self {
        Matcher::Pattern(pattern.clone())
    }
}

impl<'a, M: Into<Matcher<'a>>> From<Option<M>> for Matcher<'a> {
    fn from(matcher: Option<M>) -> Self {
        matcher.map_or(Matcher::All, Into::into)
    }
}

/// Something whose children can be searched.
pub trait Findable {
    /// Direct children, in document order.
    fn children(&self) -> Kids;

    /// Every descendant selected by `matcher`, in pre-order.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use pdf_structure::structure::{Findable, Matcher};
    /// use regex::Regex;
    ///
    /// let tree = doc.structure().unwrap();
    /// let paragraphs = tree.find_all("P").count();
    /// let headings: Vec<_> = tree.find_all(Regex::new("H[1-6]?").unwrap()).collect();
    /// let figure = tree.find(Matcher::predicate(|n| n.role() == Some("Figure")));
    /// ```
    fn find_all<'a>(&self, matcher: impl Into<Matcher<'a>>) -> FindAll<'a> {
        FindAll::new(self.children(), matcher.into())
    }

    /// First descendant selected by `matcher`.
    fn find<'a>(&self, matcher: impl Into<Matcher<'a>>) -> Option<Node> {
        self.find_all(matcher).next()
    }

    /// Every descendant, in pre-order.
    fn descendants(&self) -> FindAll<'static> {
        self.find_all(Matcher::All)
    }
}

/// Iterator returned by [`Findable::find_all`].
///
/// A yielded element's children are resolved only when the iterator is
/// advanced past it.
#[derive(Debug)]
pub struct FindAll<'a> {
    stack: Vec<Node>,
    unexpanded: Option<Element>,
    matcher: Matcher<'a>,
}

impl<'a> FindAll<'a> {
    fn new(children: Kids, matcher: Matcher<'a>) -> Self {
        let mut stack: Vec<Node> = children.collect();
        stack.reverse();
        Self {
            stack,
            unexpanded: None,
            matcher,
        }
    }

    fn expand(&mut self, el: &Element) {
        let start = self.stack.len();
        self.stack.extend(el.children());
        self.stack[start..].reverse();
    }
}

impl Iterator for FindAll<'_> {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        loop {
            if let Some(el) = self.unexpanded.take() {
                self.expand(&el);
            }
            let node = self.stack.pop()?;
            if let Node::Element(el) = &node {
                self.unexpanded = Some(el.clone());
            }
            if self.matcher.matches(&node) {
                return Some(node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{self, PageRef};
    use crate::structure::content::ContentItem;
    use std::sync::Weak;

    fn leaf() -> Node {
        let docref = registry::register(Weak::new());
        Node::Item(ContentItem::new(Some(PageRef::new(docref, 0)), 3, None))
    }

    #[test]
    fn test_roles_never_match_leaves() {
        let node = leaf();
        assert!(Matcher::All.matches(&node));
        assert!(!Matcher::from("P").matches(&node));
        assert!(!Matcher::from(Regex::new(".*").unwrap()).matches(&node));
        assert!(Matcher::predicate(|n| !n.is_element()).matches(&node));
    }

    #[test]
    fn test_none_matches_everything() {
        let matcher: Matcher = Option::<&str>::None.into();
        assert!(matches!(matcher, Matcher::All));
        let matcher: Matcher = Some("H1").into();
        assert!(matches!(matcher, Matcher::Role(ref r) if r == "H1"));
    }

    #[test]
    fn test_matcher_debug() {
        assert_eq!(format!("{:?}", Matcher::from("P")), "Role(\"P\")");
        assert_eq!(format!("{:?}", Matcher::predicate(|_| true)), "Predicate(..)");
    }
}
