use std::collections::BTreeMap;
use std::fmt;

use super::RegistryError;

/// Discriminator used to classify typed handler results.
///
/// Kinds are plain names; their relationships live in a [`KindHierarchy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueKind(&'static str);

impl ValueKind {
    /// Structured data carried as JSON.
    pub const OBJECT: ValueKind = ValueKind("object");
    /// Error-like values (handler failures, rejected negotiations).
    pub const ERROR: ValueKind = ValueKind("error");

    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Debug, Clone)]
struct KindInfo {
    parents: Vec<ValueKind>,
    depth: u32,
    order: usize,
}

/// Declared kinds and their parent links.
///
/// Depth is fixed when a kind is declared: roots sit at 0 and every other
/// kind one level below its deepest parent. Parents must be declared first,
/// so the graph cannot contain cycles.
#[derive(Debug, Clone, Default)]
pub struct KindHierarchy {
    kinds: BTreeMap<ValueKind, KindInfo>,
}

impl KindHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, kind: ValueKind, parents: &[ValueKind]) -> Result<(), RegistryError> {
        if self.kinds.contains_key(&kind) {
            return Err(RegistryError::DuplicateKind(kind));
        }

        let mut depth = 0;
        for parent in parents {
            let info = self
                .kinds
                .get(parent)
                .ok_or(RegistryError::UnknownParent { kind, parent: *parent })?;
            depth = depth.max(info.depth + 1);
        }

        let order = self.kinds.len();
        self.kinds.insert(
            kind,
            KindInfo {
                parents: parents.to_vec(),
                depth,
                order,
            },
        );
        Ok(())
    }

    pub fn contains(&self, kind: ValueKind) -> bool {
        self.kinds.contains_key(&kind)
    }

    /// Specificity rank of a declared kind.
    pub fn depth(&self, kind: ValueKind) -> Option<u32> {
        self.kinds.get(&kind).map(|info| info.depth)
    }

    /// `kind` and all of its ancestors, least specific first.
    ///
    /// Equal depths keep declaration order.
    pub fn lineage(&self, kind: ValueKind) -> Vec<ValueKind> {
        let mut seen = Vec::new();
        let mut stack = vec![kind];

        while let Some(current) = stack.pop() {
            if seen.contains(&current) {
                continue;
            }
            if let Some(info) = self.kinds.get(&current) {
                seen.push(current);
                stack.extend(info.parents.iter().copied());
            }
        }

        seen.sort_by_key(|k| {
            let info = &self.kinds[k];
            (info.depth, info.order)
        });
        seen
    }

    /// Whether a value of `kind` is also classified as `ancestor`.
    pub fn is_a(&self, kind: ValueKind, ancestor: ValueKind) -> bool {
        self.lineage(kind).contains(&ancestor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: ValueKind = ValueKind::new("a");
    const B: ValueKind = ValueKind::new("b");
    const C: ValueKind = ValueKind::new("c");
    const D: ValueKind = ValueKind::new("d");

    fn chain() -> KindHierarchy {
        let mut kinds = KindHierarchy::new();
        kinds.declare(A, &[]).unwrap();
        kinds.declare(B, &[A]).unwrap();
        kinds.declare(C, &[B]).unwrap();
        kinds
    }

    #[test]
    fn test_depth_follows_declaration() {
        let kinds = chain();
        assert_eq!(kinds.depth(A), Some(0));
        assert_eq!(kinds.depth(B), Some(1));
        assert_eq!(kinds.depth(C), Some(2));
        assert_eq!(kinds.depth(D), None);
    }

    #[test]
    fn test_lineage_least_specific_first() {
        let kinds = chain();
        assert_eq!(kinds.lineage(C), vec![A, B, C]);
        assert_eq!(kinds.lineage(A), vec![A]);
        assert!(kinds.lineage(D).is_empty());
        assert!(kinds.is_a(C, A));
        assert!(!kinds.is_a(A, C));
    }

    #[test]
    fn test_multiple_parents_take_deepest() {
        let mut kinds = chain();
        kinds.declare(D, &[A, C]).unwrap();
        assert_eq!(kinds.depth(D), Some(3));
        assert_eq!(kinds.lineage(D), vec![A, B, C, D]);
    }

    #[test]
    fn test_declaration_errors() {
        let mut kinds = chain();
        assert!(matches!(
            kinds.declare(A, &[]),
            Err(RegistryError::DuplicateKind(_))
        ));
        assert!(matches!(
            kinds.declare(D, &[ValueKind::new("missing")]),
            Err(RegistryError::UnknownParent { .. })
        ));
        assert!(!kinds.contains(D));
    }
}
