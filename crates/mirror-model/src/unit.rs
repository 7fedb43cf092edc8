//! Compilation units
//!
//! A [`CompilationUnit`] is the frozen symbol universe for one unit of
//! analysis: every user-authored class declaration plus the runtime
//! classpath. It is built once through [`UnitBuilder`] and never mutated
//! afterwards, which is what lets the symbol index memoize its queries
//! without invalidation logic.

use crate::decl::ClassDecl;
use crate::error::ModelError;
use crate::name::ClassId;
use rustc_hash::{FxHashMap, FxHashSet};

/// The set of runtime classes available on the compilation classpath.
#[derive(Debug, Clone, Default)]
pub struct RuntimeClasspath {
    classes: FxHashSet<ClassId>,
}

impl RuntimeClasspath {
    /// An empty classpath (no runtime present).
    pub fn empty() -> Self {
        RuntimeClasspath::default()
    }

    /// Add a runtime class.
    pub fn with(mut self, class: ClassId) -> Self {
        self.classes.insert(class);
        self
    }

    /// Whether the classpath provides `class`.
    pub fn contains(&self, class: &ClassId) -> bool {
        self.classes.contains(class)
    }
}

/// The frozen declaration universe for one compilation unit.
#[derive(Debug)]
pub struct CompilationUnit {
    classes: FxHashMap<ClassId, ClassDecl>,
    order: Vec<ClassId>,
    classpath: RuntimeClasspath,
}

impl CompilationUnit {
    /// Look up a class by id.
    pub fn class(&self, id: &ClassId) -> Option<&ClassDecl> {
        self.classes.get(id)
    }

    /// All classes in declaration order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassDecl> {
        self.order.iter().filter_map(|id| self.classes.get(id))
    }

    /// The runtime classpath supplied to this unit.
    pub fn classpath(&self) -> &RuntimeClasspath {
        &self.classpath
    }
}

/// Builder for a [`CompilationUnit`].
#[derive(Debug, Default)]
pub struct UnitBuilder {
    classes: FxHashMap<ClassId, ClassDecl>,
    order: Vec<ClassId>,
    classpath: RuntimeClasspath,
}

impl UnitBuilder {
    /// Start an empty unit.
    pub fn new() -> Self {
        UnitBuilder::default()
    }

    /// Add a class declaration. Nested classes are added individually with
    /// their nesting encoded in the [`ClassId`].
    pub fn add_class(&mut self, decl: ClassDecl) -> Result<(), ModelError> {
        if self.classes.contains_key(&decl.id) {
            return Err(ModelError::DuplicateClass { id: decl.id.clone() });
        }
        self.order.push(decl.id.clone());
        self.classes.insert(decl.id.clone(), decl);
        Ok(())
    }

    /// Supply the runtime classpath.
    pub fn set_classpath(&mut self, classpath: RuntimeClasspath) {
        self.classpath = classpath;
    }

    /// Freeze the unit. No declarations can be added afterwards.
    pub fn freeze(self) -> CompilationUnit {
        CompilationUnit {
            classes: self.classes,
            order: self.order,
            classpath: self.classpath,
        }
    }
}
