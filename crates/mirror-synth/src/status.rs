//! Declaration-status pass
//!
//! A specification's source text implements the marked interface nominally
//! but never re-declares its members as overrides: the interface's abstract
//! members are themselves synthesized after the specification is parsed, so
//! ordinary override checking cannot see the relationship. This pass records
//! the contract-satisfaction facts in a separate table instead of rewriting
//! the parsed declarations.

use crate::index::SymbolIndex;
use mirror_model::{ClassId, CompilationUnit, Name};
use rustc_hash::FxHashSet;

/// Which user properties satisfy a synthesized abstract contract.
#[derive(Debug, Default)]
pub struct OverrideFacts {
    facts: FxHashSet<(ClassId, Name)>,
}

impl OverrideFacts {
    /// Whether `property` on `class` is forced to override status.
    pub fn is_override(&self, class: &ClassId, property: &Name) -> bool {
        self.facts.contains(&(class.clone(), property.clone()))
    }

    /// Number of recorded facts.
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Whether no facts were recorded.
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    fn insert(&mut self, class: ClassId, property: Name) {
        self.facts.insert((class, property));
    }
}

/// The status pass for one unit.
pub struct StatusPass<'a> {
    unit: &'a CompilationUnit,
    index: &'a SymbolIndex<'a>,
}

impl<'a> StatusPass<'a> {
    /// Create the pass.
    pub fn new(unit: &'a CompilationUnit, index: &'a SymbolIndex<'a>) -> Self {
        StatusPass { unit, index }
    }

    /// Record an override fact for every property declared directly inside a
    /// specification the symbol index recognizes.
    pub fn run(&self) -> OverrideFacts {
        let mut facts = OverrideFacts::default();
        for spec in self.index.marked_specs() {
            if self.index.interface_of_nested(spec).is_none() {
                continue;
            }
            let Some(decl) = self.unit.class(spec) else {
                continue;
            };
            for property in &decl.properties {
                facts.insert(spec.clone(), property.name.clone());
            }
        }
        facts
    }
}
