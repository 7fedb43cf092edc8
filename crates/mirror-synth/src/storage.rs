//! Backing-storage strategy table
//!
//! A fixed dispatch table keyed by a field's static type: specialized
//! unboxed cells for the four numeric primitive kinds, and a generic boxed
//! fallback for every other type. Selection is total - the fallback
//! guarantees no gaps - and this module is the only place that couples the
//! synthesizer to the external reactive-cell runtime.
//!
//! Resolving an entry against the unit's classpath can fail: a missing
//! runtime class is a broken environment, reported as a fatal error rather
//! than a user diagnostic.

use crate::error::{FatalError, SynthResult};
use mirror_cell::{
    BOXED_CELL_CLASS, DOUBLE_CELL_CLASS, FLOAT_CELL_CLASS, INT_CELL_CLASS, LONG_CELL_CLASS,
    RUNTIME_PACKAGE,
};
use mirror_model::{ClassId, Name, PrimitiveTy, RuntimeClasspath, Ty};

/// The storage-cell kinds the table can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// Unboxed Int cell
    Int,
    /// Unboxed Long cell
    Long,
    /// Unboxed Float cell
    Float,
    /// Unboxed Double cell
    Double,
    /// Generic boxed cell
    Boxed,
}

/// One strategy-table entry: the runtime cell class plus its
/// factory/accessor/mutator triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    /// Selected cell kind
    pub kind: StorageKind,
    /// The runtime cell class backing the field
    pub runtime_class: ClassId,
    /// Factory taking only the initial value
    pub factory: Name,
    /// Value-read accessor
    pub accessor: Name,
    /// Value-write mutator
    pub mutator: Name,
}

fn entry(kind: StorageKind, class_name: &str, factory: &str) -> StorageEntry {
    StorageEntry {
        kind,
        runtime_class: ClassId::top_level(RUNTIME_PACKAGE, class_name),
        factory: Name::new(factory),
        accessor: Name::new("get"),
        mutator: Name::new("set"),
    }
}

/// Select the storage strategy for a field's static type. Total: every type
/// resolves, with the boxed cell as the fallback.
///
/// Only bare primitives specialize; a nullable primitive boxes.
pub fn select(ty: &Ty) -> StorageEntry {
    match ty.as_primitive() {
        Some(PrimitiveTy::Int) => entry(StorageKind::Int, INT_CELL_CLASS, "intCellOf"),
        Some(PrimitiveTy::Long) => entry(StorageKind::Long, LONG_CELL_CLASS, "longCellOf"),
        Some(PrimitiveTy::Float) => entry(StorageKind::Float, FLOAT_CELL_CLASS, "floatCellOf"),
        Some(PrimitiveTy::Double) => entry(StorageKind::Double, DOUBLE_CELL_CLASS, "doubleCellOf"),
        _ => entry(StorageKind::Boxed, BOXED_CELL_CLASS, "cellOf"),
    }
}

/// Select and bind the storage strategy against the unit's classpath.
pub fn resolve(ty: &Ty, classpath: &RuntimeClasspath) -> SynthResult<StorageEntry> {
    let entry = select(ty);
    if !classpath.contains(&entry.runtime_class) {
        return Err(FatalError::StorageTypeNotFound { class: entry.runtime_class });
    }
    Ok(entry)
}

/// The classpath of a compilation that has the full cell runtime available.
pub fn runtime_classpath() -> RuntimeClasspath {
    [
        BOXED_CELL_CLASS,
        INT_CELL_CLASS,
        LONG_CELL_CLASS,
        FLOAT_CELL_CLASS,
        DOUBLE_CELL_CLASS,
    ]
    .into_iter()
    .fold(RuntimeClasspath::empty(), |classpath, name| {
        classpath.with(ClassId::top_level(RUNTIME_PACKAGE, name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_kinds_specialize() {
        assert_eq!(select(&Ty::Primitive(PrimitiveTy::Int)).kind, StorageKind::Int);
        assert_eq!(select(&Ty::Primitive(PrimitiveTy::Long)).kind, StorageKind::Long);
        assert_eq!(select(&Ty::Primitive(PrimitiveTy::Float)).kind, StorageKind::Float);
        assert_eq!(select(&Ty::Primitive(PrimitiveTy::Double)).kind, StorageKind::Double);
    }

    #[test]
    fn test_everything_else_boxes() {
        assert_eq!(select(&Ty::Primitive(PrimitiveTy::String)).kind, StorageKind::Boxed);
        assert_eq!(select(&Ty::Primitive(PrimitiveTy::Boolean)).kind, StorageKind::Boxed);
        assert_eq!(
            select(&Ty::Primitive(PrimitiveTy::Int).nullable()).kind,
            StorageKind::Boxed
        );
        assert_eq!(
            select(&Ty::Param(Name::new("T"))).kind,
            StorageKind::Boxed
        );
    }

    #[test]
    fn test_missing_runtime_is_fatal() {
        let err = resolve(&Ty::Primitive(PrimitiveTy::Int), &RuntimeClasspath::empty()).unwrap_err();
        assert_eq!(
            err,
            FatalError::StorageTypeNotFound {
                class: ClassId::top_level(RUNTIME_PACKAGE, INT_CELL_CLASS),
            }
        );
    }

    #[test]
    fn test_full_classpath_resolves_every_kind() {
        let classpath = runtime_classpath();
        for ty in [
            Ty::Primitive(PrimitiveTy::Int),
            Ty::Primitive(PrimitiveTy::Long),
            Ty::Primitive(PrimitiveTy::Float),
            Ty::Primitive(PrimitiveTy::Double),
            Ty::Primitive(PrimitiveTy::String),
        ] {
            assert!(resolve(&ty, &classpath).is_ok());
        }
    }
}
