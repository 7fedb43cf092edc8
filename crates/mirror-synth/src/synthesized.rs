//! Store for synthesized declarations
//!
//! The user universe is frozen, so everything the engine produces lives in
//! this separate store: nested class shells plus the members synthesized onto
//! each owner. The signature phase fills it; the lowering phase mutates the
//! stored declarations' bodies in place.

use mirror_model::{ClassDecl, ClassId, CtorDecl, FunDecl, Name, PropertyDecl};
use rustc_hash::FxHashMap;

/// Members synthesized onto one owner.
#[derive(Debug, Default)]
pub struct OwnedMembers {
    /// Synthesized properties
    pub properties: Vec<PropertyDecl>,
    /// Synthesized functions
    pub functions: Vec<FunDecl>,
    /// Synthesized constructors
    pub ctors: Vec<CtorDecl>,
}

/// Every declaration synthesized for one unit.
#[derive(Debug, Default)]
pub struct Synthesized {
    classes: FxHashMap<ClassId, ClassDecl>,
    class_order: Vec<ClassId>,
    members: FxHashMap<ClassId, OwnedMembers>,
    owner_order: Vec<ClassId>,
    signatures_complete: bool,
}

impl Synthesized {
    /// An empty store.
    pub fn new() -> Self {
        Synthesized::default()
    }

    /// Look up a synthesized class shell.
    pub fn class(&self, id: &ClassId) -> Option<&ClassDecl> {
        self.classes.get(id)
    }

    /// Synthesized classes in creation order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassDecl> {
        self.class_order.iter().filter_map(|id| self.classes.get(id))
    }

    /// Members synthesized onto `owner`.
    pub fn members(&self, owner: &ClassId) -> Option<&OwnedMembers> {
        self.members.get(owner)
    }

    /// Owners that received members, in creation order.
    pub fn owners(&self) -> impl Iterator<Item = &ClassId> {
        self.owner_order.iter()
    }

    /// Look up a synthesized property by owner and name.
    pub fn property(&self, owner: &ClassId, name: &Name) -> Option<&PropertyDecl> {
        self.members(owner)?.properties.iter().find(|p| &p.name == name)
    }

    /// Look up a synthesized function by owner and name.
    pub fn function(&self, owner: &ClassId, name: &Name) -> Option<&FunDecl> {
        self.members(owner)?.functions.iter().find(|f| &f.name == name)
    }

    /// The synthesized primary constructor of `owner`.
    pub fn primary_ctor(&self, owner: &ClassId) -> Option<&CtorDecl> {
        self.members(owner)?.ctors.iter().find(|c| c.is_primary)
    }

    /// Whether the signature phase has finished for the whole unit.
    ///
    /// Lowering keys off this flag, never off "body is still empty".
    pub fn signatures_complete(&self) -> bool {
        self.signatures_complete
    }

    pub(crate) fn add_class(&mut self, decl: ClassDecl) {
        self.class_order.push(decl.id.clone());
        self.classes.insert(decl.id.clone(), decl);
    }

    pub(crate) fn members_mut(&mut self, owner: &ClassId) -> &mut OwnedMembers {
        if !self.members.contains_key(owner) {
            self.owner_order.push(owner.clone());
        }
        self.members.entry(owner.clone()).or_default()
    }

    pub(crate) fn mark_signatures_complete(&mut self) {
        self.signatures_complete = true;
    }

    pub(crate) fn members_iter_mut(
        &mut self,
    ) -> impl Iterator<Item = (&ClassId, &mut OwnedMembers)> {
        self.members.iter_mut()
    }
}
