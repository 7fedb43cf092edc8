//! Symbol index - marker discovery and relationship resolution
//!
//! Discovers every declaration carrying one of the two recognized markers and
//! derives the relationship maps between them: interface to specification,
//! interface to mutable-projection id, interface to companion id, and the
//! outward walk from a nested declaration to its enclosing marked interface.
//!
//! The symbol universe is frozen, so every result is computed lazily on first
//! access and memoized for the lifetime of the unit; there is no invalidation
//! logic. One index instance serves exactly one compilation unit.

use crate::declare::{COMPANION_CLASS_NAME, MUTABLE_CLASS_NAME};
use mirror_model::{ClassId, CompilationUnit, CtorDecl, MIRRORED_FQN, MIRROR_SPEC_FQN};
use once_cell::sync::OnceCell;
use rustc_hash::{FxHashMap, FxHashSet};

/// Memoized marker discovery and relationship queries over one frozen unit.
pub struct SymbolIndex<'a> {
    unit: &'a CompilationUnit,
    marked_interfaces: OnceCell<FxHashSet<ClassId>>,
    interfaces: OnceCell<FxHashSet<ClassId>>,
    marked_specs: OnceCell<FxHashSet<ClassId>>,
    spec_by_interface: OnceCell<FxHashMap<ClassId, ClassId>>,
    mutable_ids: OnceCell<FxHashSet<ClassId>>,
    companion_ids: OnceCell<FxHashSet<ClassId>>,
}

impl<'a> SymbolIndex<'a> {
    /// Create an index over `unit`. Nothing is scanned until first use.
    pub fn new(unit: &'a CompilationUnit) -> Self {
        SymbolIndex {
            unit,
            marked_interfaces: OnceCell::new(),
            interfaces: OnceCell::new(),
            marked_specs: OnceCell::new(),
            spec_by_interface: OnceCell::new(),
            mutable_ids: OnceCell::new(),
            companion_ids: OnceCell::new(),
        }
    }

    /// Declarations carrying the interface-role marker, regardless of their
    /// actual shape. The validator checks the shape.
    pub fn marked_interfaces(&self) -> &FxHashSet<ClassId> {
        self.marked_interfaces.get_or_init(|| {
            self.unit
                .classes()
                .filter(|decl| decl.has_marker(MIRRORED_FQN))
                .map(|decl| decl.id.clone())
                .collect()
        })
    }

    /// Marked declarations that really are interfaces. Synthesis only ever
    /// targets these.
    pub fn interfaces(&self) -> &FxHashSet<ClassId> {
        self.interfaces.get_or_init(|| {
            self.marked_interfaces()
                .iter()
                .filter(|id| self.unit.class(id).is_some_and(|decl| decl.is_interface()))
                .cloned()
                .collect()
        })
    }

    /// Declarations carrying the specification-role marker.
    pub fn marked_specs(&self) -> &FxHashSet<ClassId> {
        self.marked_specs.get_or_init(|| {
            self.unit
                .classes()
                .filter(|decl| decl.has_marker(MIRROR_SPEC_FQN))
                .map(|decl| decl.id.clone())
                .collect()
        })
    }

    /// Whether `id` is a recognized marked interface.
    pub fn is_interface(&self, id: &ClassId) -> bool {
        self.interfaces().contains(id)
    }

    /// The specification associated with a marked interface.
    ///
    /// `None` when the interface has no marked specification nested beneath
    /// it, or more than one.
    pub fn spec_of(&self, interface: &ClassId) -> Option<&ClassId> {
        self.spec_map().get(interface)
    }

    /// Id of the mutable projection synthesized under `interface`.
    pub fn mutable_id_of(&self, interface: &ClassId) -> ClassId {
        interface.nested(MUTABLE_CLASS_NAME)
    }

    /// Id of the companion synthesized (or reused) under `interface`.
    pub fn companion_id_of(&self, interface: &ClassId) -> ClassId {
        interface.nested(COMPANION_CLASS_NAME)
    }

    /// Whether `id` names the mutable projection of some marked interface.
    pub fn is_mutable_id(&self, id: &ClassId) -> bool {
        self.mutable_ids
            .get_or_init(|| {
                self.interfaces()
                    .iter()
                    .map(|interface| self.mutable_id_of(interface))
                    .collect()
            })
            .contains(id)
    }

    /// Whether `id` names the companion of some marked interface.
    pub fn is_companion_id(&self, id: &ClassId) -> bool {
        self.companion_ids
            .get_or_init(|| {
                self.interfaces()
                    .iter()
                    .map(|interface| self.companion_id_of(interface))
                    .collect()
            })
            .contains(id)
    }

    /// Walk outward through the enclosing-type chain of `nested` until a
    /// marked interface is found.
    pub fn interface_of_nested(&self, nested: &ClassId) -> Option<ClassId> {
        nested.outer_chain().find(|id| self.interfaces().contains(id))
    }

    /// The canonical constructor of a specification, if declared.
    pub fn spec_primary_ctor(&self, spec: &ClassId) -> Option<&'a CtorDecl> {
        self.unit.class(spec)?.primary_ctor()
    }

    /// Whether the user declared a companion under `interface` themselves.
    pub fn has_user_companion(&self, interface: &ClassId) -> bool {
        self.unit.class(&self.companion_id_of(interface)).is_some()
    }

    fn spec_map(&self) -> &FxHashMap<ClassId, ClassId> {
        self.spec_by_interface.get_or_init(|| {
            let mut by_interface: FxHashMap<ClassId, Vec<ClassId>> = FxHashMap::default();
            for spec in self.marked_specs() {
                if let Some(interface) = self.interface_of_nested(spec) {
                    by_interface.entry(interface).or_default().push(spec.clone());
                }
            }
            by_interface
                .into_iter()
                .filter_map(|(interface, mut specs)| match specs.len() {
                    1 => specs.pop().map(|spec| (interface, spec)),
                    _ => None,
                })
                .collect()
        })
    }
}
