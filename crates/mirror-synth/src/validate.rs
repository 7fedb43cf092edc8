//! Structural validator
//!
//! A static pass over marked declarations. Rules run in a fixed priority
//! order and evaluation stops at the first failing rule, so a declaration
//! gets at most one finding. Nothing is auto-corrected: a finding suppresses
//! synthesis for that declaration and is surfaced as a diagnostic, while the
//! rest of the unit continues.

use crate::error::ValidationError;
use crate::index::SymbolIndex;
use mirror_model::{
    ClassDecl, ClassKind, CompilationUnit, Modality, Visibility, MIRRORED_FQN, MIRROR_SPEC_FQN,
};

/// The structural validator for one unit.
pub struct Validator<'a> {
    unit: &'a CompilationUnit,
    index: &'a SymbolIndex<'a>,
}

impl<'a> Validator<'a> {
    /// Create a validator reading `unit` through `index`.
    pub fn new(unit: &'a CompilationUnit, index: &'a SymbolIndex<'a>) -> Self {
        Validator { unit, index }
    }

    /// Validate every marked declaration, returning at most one finding per
    /// declaration.
    pub fn validate(&self) -> Vec<ValidationError> {
        self.unit
            .classes()
            .filter_map(|decl| self.check_class(decl))
            .collect()
    }

    fn check_class(&self, decl: &ClassDecl) -> Option<ValidationError> {
        if decl.has_marker(MIRRORED_FQN) {
            return self.check_interface(decl);
        }
        if decl.has_marker(MIRROR_SPEC_FQN) {
            return self.check_spec(decl);
        }
        None
    }

    // Rules 1-2: interface role, specification presence.
    fn check_interface(&self, decl: &ClassDecl) -> Option<ValidationError> {
        if !decl.is_interface() {
            return Some(ValidationError::RoleMismatch { class: decl.id.clone() });
        }
        if self.index.spec_of(&decl.id).is_none() {
            return Some(ValidationError::MissingSpec { class: decl.id.clone() });
        }
        None
    }

    // Rules 3-7: constructor presence and visibility, shape finality,
    // parent resolvability, field visibility.
    fn check_spec(&self, decl: &ClassDecl) -> Option<ValidationError> {
        let ctor = match decl.primary_ctor() {
            Some(ctor) => ctor,
            None => return Some(ValidationError::MissingConstructor { class: decl.id.clone() }),
        };
        if ctor.visibility == Visibility::Private {
            return Some(ValidationError::PrivateConstructor { class: decl.id.clone() });
        }
        if decl.kind != ClassKind::Class || decl.modality != Modality::Final {
            return Some(ValidationError::NonFinalShape { class: decl.id.clone() });
        }
        if self.index.interface_of_nested(&decl.id).is_none() {
            return Some(ValidationError::MissingParent { class: decl.id.clone() });
        }
        for param in &ctor.params {
            let visibility = decl
                .property(&param.name)
                .map(|property| property.visibility)
                .unwrap_or(Visibility::Public);
            if visibility != Visibility::Public {
                return Some(ValidationError::IllegalFieldVisibility {
                    class: decl.id.clone(),
                    field: param.name.clone(),
                });
            }
        }
        None
    }
}
