//! Per-input permit sets.
//!
//! A [`PermitSet`] is the parser's view of which grammar constructs are accepted. It starts from the profile of the
//! input's dialect and is then adjusted by `use` directives.

use std::fmt;

use gopp_core::lang::permits::{self, Dialect, PermitId};

/// A bit set over [`PermitId`].
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct PermitSet(u64);

impl PermitSet {
    /// A set with nothing enabled.
    pub fn empty() -> Self {
        Self(0)
    }

    /// The profile for `dialect`: its own layer plus every lower one.
    pub fn for_dialect(dialect: Dialect) -> Self {
        let mut set = Self::empty();
        set.activate(dialect);
        set
    }

    /// Enable the permits of `dialect`'s profile, keeping anything already set.
    pub fn activate(&mut self, dialect: Dialect) {
        for id in permits::enabled_by(dialect) {
            self.set_permit(id);
        }
        tracing::debug!(%dialect, enabled = self.len(), "activated permit profile");
    }

    pub fn set_permit(&mut self, id: PermitId) {
        self.0 |= 1 << id.bit();
    }

    pub fn unset_permit(&mut self, id: PermitId) {
        self.0 &= !(1 << id.bit());
    }

    pub fn is_permit(&self, id: PermitId) -> bool {
        self.0 & (1 << id.bit()) != 0
    }

    /// Enable a permit by its canonical name. Returns the id, or `None` for an unknown name.
    pub fn set_by_name(&mut self, name: &str) -> Option<PermitId> {
        let id = permits::from_str(name)?;
        self.set_permit(id);
        Some(id)
    }

    /// Disable a permit by its canonical name. Returns the id, or `None` for an unknown name.
    pub fn unset_by_name(&mut self, name: &str) -> Option<PermitId> {
        let id = permits::from_str(name)?;
        self.unset_permit(id);
        Some(id)
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Enabled permits in registry order.
    pub fn iter(&self) -> impl Iterator<Item = PermitId> + '_ {
        permits::PERMITS.iter().map(|p| p.id).filter(|id| self.is_permit(*id))
    }
}

impl fmt::Debug for PermitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(permits::as_str)).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_profile_is_package_clause_and_funcs() {
        let set = PermitSet::for_dialect(Dialect::Minimal);
        let names: Vec<_> = set.iter().map(permits::as_str).collect();
        assert_eq!(names, ["packageClause", "funcDecls"]);
    }

    #[test]
    fn profiles_fall_through_to_lower_layers() {
        let go = PermitSet::for_dialect(Dialect::Go);
        assert!(go.is_permit(PermitId::FuncDecls));
        assert!(go.is_permit(PermitId::Goto));
        assert!(!go.is_permit(PermitId::Macros));

        let experimental = PermitSet::for_dialect(Dialect::Experimental);
        assert!(experimental.is_permit(PermitId::Macros));
        assert!(experimental.is_permit(PermitId::Dynamic));
        assert_eq!(experimental.len(), permits::PERMITS.len());
    }

    #[test]
    fn set_and_unset_by_name() {
        let mut set = PermitSet::for_dialect(Dialect::Extended);
        assert_eq!(set.unset_by_name("goto"), Some(PermitId::Goto));
        assert!(!set.is_permit(PermitId::Goto));
        assert_eq!(set.set_by_name("generics"), Some(PermitId::Generics));
        assert!(set.is_permit(PermitId::Generics));
        assert_eq!(set.unset_by_name("noSuchThing"), None);
    }
}
