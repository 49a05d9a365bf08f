//! Number trees (ISO 32000-1:2008, Section 7.9.7).
//!
//! The structure tree's `/ParentTree` is a number tree mapping the
//! `/StructParents` key of a page (or `/StructParent` of an annotation or
//! XObject) to the element(s) that own its content.

use crate::diagnostics::DiagnosticKind;
use crate::document::Document;
use crate::object::{Object, ObjectRef};
use std::collections::{BTreeMap, HashSet};

/// Sparse, ordered integer-keyed lookup flattened from a number tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberTree {
    entries: BTreeMap<i64, Object>,
}

impl NumberTree {
    /// Create an empty number tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten the number tree rooted at `root`.
    ///
    /// Malformed nodes are reported and skipped. When the same key appears
    /// in several leaves the first one in tree order wins.
    pub fn load(doc: &Document, root: &Object) -> Self {
        let options = doc.options();
        let mut entries = BTreeMap::new();
        let mut visited: HashSet<ObjectRef> = HashSet::new();
        let mut stack: Vec<(Object, usize)> = vec![(root.clone(), 0)];

        while let Some((raw, depth)) = stack.pop() {
            if let Some(node_ref) = raw.as_reference() {
                if !visited.insert(node_ref) {
                    doc.report(
                        DiagnosticKind::MalformedNumberTree,
                        "Number tree node visited twice",
                        &node_ref,
                    );
                    continue;
                }
            }
            if depth > options.max_tree_depth {
                doc.report(
                    DiagnosticKind::MalformedNumberTree,
                    "Number tree too deep, skipping branch",
                    &raw,
                );
                continue;
            }
            let node = match doc.resolve(&raw) {
                Ok(node) => node,
                Err(e) => {
                    doc.report(
                        DiagnosticKind::Unresolved,
                        &format!("Number tree node unresolvable ({})", e),
                        &raw,
                    );
                    continue;
                },
            };
            let Some(dict) = node.as_dict() else {
                doc.report(
                    DiagnosticKind::MalformedNumberTree,
                    "Number tree node is not a dictionary",
                    node,
                );
                continue;
            };

            if let Some(nums) = dict.get("Nums") {
                match doc.resolve(nums).map(|nums| nums.as_array()) {
                    Ok(Some(nums)) => {
                        if nums.len() % 2 != 0 {
                            doc.report(
                                DiagnosticKind::MalformedNumberTree,
                                "'Nums' array has odd length",
                                &nums.len(),
                            );
                        }
                        for pair in nums.chunks_exact(2) {
                            match doc.resolve(&pair[0]).map(|key| key.as_integer()) {
                                Ok(Some(key)) => {
                                    entries.entry(key).or_insert_with(|| pair[1].clone());
                                },
                                _ => doc.report(
                                    DiagnosticKind::MalformedNumberTree,
                                    "Number tree key is not an int",
                                    &pair[0],
                                ),
                            }
                        }
                    },
                    _ => doc.report(
                        DiagnosticKind::MalformedNumberTree,
                        "'Nums' entry is not an array",
                        nums,
                    ),
                }
            }

            if let Some(kids) = dict.get("Kids") {
                match doc.resolve(kids).map(|kids| kids.as_array()) {
                    Ok(Some(kids)) => {
                        for kid in kids.iter().rev() {
                            stack.push((kid.clone(), depth + 1));
                        }
                    },
                    _ => doc.report(
                        DiagnosticKind::MalformedNumberTree,
                        "'Kids' entry is not an array",
                        kids,
                    ),
                }
            }
        }

        Self { entries }
    }

    /// Value stored under `key`.
    pub fn get(&self, key: i64) -> Option<&Object> {
        self.entries.get(&key)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: i64) -> bool {
        self.entries.contains_key(&key)
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &Object)> {
        self.entries.iter().map(|(key, value)| (*key, value))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(i64, Object)> for NumberTree {
    fn from_iter<I: IntoIterator<Item = (i64, Object)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tree_finds_nothing() {
        let tree = NumberTree::new();
        assert!(tree.is_empty());
        assert!(tree.get(0).is_none());
        assert!(!tree.contains_key(42));
    }

    #[test]
    fn test_iter_is_sorted() {
        let tree: NumberTree = vec![
            (7, Object::Integer(70)),
            (1, Object::Integer(10)),
            (3, Object::Integer(30)),
        ]
        .into_iter()
        .collect();
        let keys: Vec<i64> = tree.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec![1, 3, 7]);
        assert_eq!(tree.get(3), Some(&Object::Integer(30)));
        assert_eq!(tree.len(), 3);
    }
}
