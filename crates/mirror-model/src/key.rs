//! Synthesis keys
//!
//! Every synthesized declaration carries a key recording which synthesis rule
//! produced it plus the rule's resolved inputs, so the lowering pass can
//! recover its context without redoing relationship resolution. Keys are
//! created at the signature phase, consumed at the lowering phase, and never
//! mutated.

use crate::name::{ClassId, Name};

/// Tag attached to a synthesized declaration, one case per synthesis rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthKey {
    /// Abstract property on the marked interface.
    InterfaceProperty {
        /// The marked interface
        interface: ClassId,
        /// The specification the property mirrors
        spec: ClassId,
        /// Field name
        field: Name,
    },
    /// Concrete overriding property on the mutable projection.
    MutableProperty {
        /// The marked interface
        interface: ClassId,
        /// The specification the property mirrors
        spec: ClassId,
        /// Field name
        field: Name,
    },
    /// Canonical constructor of the mutable projection.
    MutableCtor {
        /// The marked interface
        interface: ClassId,
        /// The specification whose canonical constructor it derives from
        spec: ClassId,
    },
    /// The multi-field update operation on the mutable projection.
    UpdateFun {
        /// The marked interface
        interface: ClassId,
        /// The specification whose fields it rewrites
        spec: ClassId,
    },
    /// Conversion from the mutable projection to a fresh specification value.
    ToSpecificationFun {
        /// The marked interface
        interface: ClassId,
        /// The specification constructed by the conversion
        spec: ClassId,
    },
    /// Conversion from a specification value to a fresh mutable projection.
    ToMutableFun {
        /// The marked interface
        interface: ClassId,
        /// The specification consumed by the conversion
        spec: ClassId,
    },
    /// The synthesized nested mutable projection class itself.
    MutableClass {
        /// The marked interface
        interface: ClassId,
        /// The specification the projection mirrors
        spec: ClassId,
    },
    /// The synthesized companion object.
    CompanionClass {
        /// The marked interface
        interface: ClassId,
    },
    /// Default private constructor on the synthesized companion.
    CompanionCtor {
        /// The marked interface
        interface: ClassId,
    },
}

impl SynthKey {
    /// The marked interface every key ultimately belongs to.
    pub fn interface(&self) -> &ClassId {
        match self {
            SynthKey::InterfaceProperty { interface, .. }
            | SynthKey::MutableProperty { interface, .. }
            | SynthKey::MutableCtor { interface, .. }
            | SynthKey::UpdateFun { interface, .. }
            | SynthKey::ToSpecificationFun { interface, .. }
            | SynthKey::ToMutableFun { interface, .. }
            | SynthKey::MutableClass { interface, .. }
            | SynthKey::CompanionClass { interface }
            | SynthKey::CompanionCtor { interface } => interface,
        }
    }
}
