//! Implements [`DeclarationFinder`], the name-indexed lookup layer built on
//! top of a finished [`DeclarationTable`] snapshot.
//!
//! The finder is constructed once per snapshot: it folds every declaration
//! name into a case-insensitive index and afterwards answers scoped queries
//! without touching the table's uniqueness index. Every member query filters
//! its candidates through the accessibility rules, so a caller can never
//! observe a declaration it could not legally reference.

use std::collections::HashMap;

use crate::{
    accessibility::CallingContext, fold_identifier, Declaration,
    DeclarationId, DeclarationKind, DeclarationTable,
};

#[cfg(test)]
mod test;

/// A case-insensitive name index over one [`DeclarationTable`] snapshot.
#[derive(Debug)]
pub struct DeclarationFinder<'t> {
    table: &'t DeclarationTable,
    ids_by_folded_name: HashMap<String, Vec<DeclarationId>>,
}

impl<'t> DeclarationFinder<'t> {
    /// Builds the name index for the given table.
    #[must_use]
    pub fn new(table: &'t DeclarationTable) -> Self {
        let mut ids_by_folded_name: HashMap<String, Vec<DeclarationId>> =
            HashMap::new();
        for (id, declaration) in table.iter() {
            ids_by_folded_name
                .entry(fold_identifier(declaration.identifier_name()))
                .or_default()
                .push(id);
        }

        Self { table, ids_by_folded_name }
    }

    /// The table this finder indexes.
    #[must_use]
    pub const fn table(&self) -> &'t DeclarationTable { self.table }

    /// Checks two identifiers for equality under the language's
    /// case-insensitive comparison.
    #[must_use]
    pub fn is_match(&self, first: &str, second: &str) -> bool {
        crate::identifiers_match(first, second)
    }

    /// Iterates, in insertion order, over every declaration whose name
    /// matches `name` case-insensitively.
    pub fn matching(
        &self,
        name: &str,
    ) -> impl Iterator<Item = (DeclarationId, &'t Declaration)> + '_ {
        self.ids_by_folded_name
            .get(&fold_identifier(name))
            .into_iter()
            .flatten()
            .map(|&id| (id, &self.table[id]))
    }

    /// Finds the project with the given name.
    #[must_use]
    pub fn find_project(&self, name: &str) -> Option<DeclarationId> {
        self.matching(name)
            .find(|(_, declaration)| declaration.kind().is_project())
            .map(|(id, _)| id)
    }

    /// Finds a project with the given name among the projects referenced by
    /// `calling_project`.
    #[must_use]
    pub fn find_referenced_project(
        &self,
        calling_project: DeclarationId,
        name: &str,
    ) -> Option<DeclarationId> {
        let referenced = self
            .table
            .get(calling_project)
            .and_then(|declaration| declaration.detail().as_project())
            .map(|detail| detail.referenced_projects())?;

        self.matching(name)
            .find(|(id, declaration)| {
                declaration.kind().is_project() && referenced.contains(id)
            })
            .map(|(id, _)| id)
    }

    /// Finds the procedural module with the given name inside `project`.
    ///
    /// Built-in modules are only considered when `include_built_in` is set.
    #[must_use]
    pub fn find_std_module(
        &self,
        project: DeclarationId,
        name: &str,
        include_built_in: bool,
    ) -> Option<DeclarationId> {
        self.matching(name)
            .find(|(id, declaration)| {
                declaration.kind() == DeclarationKind::ProceduralModule
                    && (include_built_in || !declaration.is_built_in())
                    && self.table.is_in_project(*id, project)
            })
            .map(|(id, _)| id)
    }

    /// Finds an accessible member of `parent` with the given name and kind.
    #[must_use]
    pub fn find_member_with_parent(
        &self,
        context: CallingContext,
        parent: DeclarationId,
        name: &str,
        kind: DeclarationKind,
    ) -> Option<DeclarationId> {
        self.matching(name)
            .find(|(id, declaration)| {
                declaration.parent() == Some(parent)
                    && declaration.kind() == kind
                    && context.can_access(self.table, Some(*id))
            })
            .map(|(id, _)| id)
    }

    /// Finds an accessible module with the given name and kind inside the
    /// calling project, excluding the calling module itself.
    #[must_use]
    pub fn find_module_enclosing_project(
        &self,
        context: CallingContext,
        name: &str,
        kind: DeclarationKind,
    ) -> Option<DeclarationId> {
        self.matching(name)
            .find(|(id, declaration)| {
                declaration.kind() == kind
                    && declaration.kind().is_module()
                    && *id != context.module
                    && self.table.is_in_project(*id, context.project)
                    && context.can_access(self.table, Some(*id))
            })
            .map(|(id, _)| id)
    }

    /// Finds an accessible module with the given name and kind inside
    /// `referenced_project`.
    #[must_use]
    pub fn find_module_referenced_project(
        &self,
        context: CallingContext,
        referenced_project: DeclarationId,
        name: &str,
        kind: DeclarationKind,
    ) -> Option<DeclarationId> {
        self.matching(name)
            .find(|(id, declaration)| {
                declaration.kind() == kind
                    && declaration.kind().is_module()
                    && self.table.is_in_project(*id, referenced_project)
                    && context.can_access(self.table, Some(*id))
            })
            .map(|(id, _)| id)
    }

    /// Finds an accessible member of the calling module itself with the
    /// given name and kind.
    #[must_use]
    pub fn find_member_enclosing_module(
        &self,
        context: CallingContext,
        name: &str,
        kind: DeclarationKind,
    ) -> Option<DeclarationId> {
        self.find_member_with_parent(context, context.module, name, kind)
    }

    /// Finds a member with the given name and kind declared in any module of
    /// the calling project other than the calling module.
    ///
    /// Candidates enclosed by the calling module are excluded wholesale, and
    /// anything declared inside a function, subroutine, or property is not a
    /// module member and never matches. The match must be unambiguous: when
    /// more than one accessible candidate exists, none is returned.
    #[must_use]
    pub fn find_member_enclosed_project(
        &self,
        context: CallingContext,
        name: &str,
        kind: DeclarationKind,
    ) -> Option<DeclarationId> {
        self.unique(self.matching(name).filter(|(id, declaration)| {
            declaration.kind() == kind
                && self.is_module_member(declaration)
                && self.table.module_parent_of(*id) != Some(context.module)
                && self.table.is_in_project(*id, context.project)
                && context.can_access(self.table, Some(*id))
        }))
    }

    /// Finds a member with the given name and kind anywhere in
    /// `referenced_project`.
    ///
    /// Like [`Self::find_member_enclosed_project`], locals never match and
    /// ambiguous matches resolve to nothing.
    #[must_use]
    pub fn find_member_referenced_project(
        &self,
        context: CallingContext,
        referenced_project: DeclarationId,
        name: &str,
        kind: DeclarationKind,
    ) -> Option<DeclarationId> {
        self.unique(self.matching(name).filter(|(id, declaration)| {
            declaration.kind() == kind
                && self.is_module_member(declaration)
                && self.table.is_in_project(*id, referenced_project)
                && context.can_access(self.table, Some(*id))
        }))
    }

    /// Finds an accessible member of `module`, where `module` must belong to
    /// the calling project.
    #[must_use]
    pub fn find_member_enclosed_project_in_module(
        &self,
        context: CallingContext,
        module: DeclarationId,
        name: &str,
        kind: DeclarationKind,
    ) -> Option<DeclarationId> {
        if !self.table.is_in_project(module, context.project) {
            return None;
        }
        self.find_member_with_parent(context, module, name, kind)
    }

    /// Finds an accessible member of `module`, where `module` must belong to
    /// a project the calling project references.
    #[must_use]
    pub fn find_member_referenced_project_in_module(
        &self,
        context: CallingContext,
        module: DeclarationId,
        name: &str,
        kind: DeclarationKind,
    ) -> Option<DeclarationId> {
        let module_project = self.table.project_parent_of(module)?;
        let references_project = self
            .table
            .get(context.project)
            .and_then(|declaration| declaration.detail().as_project())
            .is_some_and(|detail| {
                detail.referenced_projects().contains(&module_project)
            });
        if !references_project {
            return None;
        }

        self.find_member_with_parent(context, module, name, kind)
    }

    // Project-scope lookups only see members of modules, enumerations, and
    // user-defined types; locals and parameters sit inside a procedural
    // member and are invisible at that scope.
    fn is_module_member(&self, declaration: &Declaration) -> bool {
        declaration
            .parent()
            .and_then(|parent| self.table.get(parent))
            .is_some_and(|parent| !parent.kind().is_procedural_member())
    }

    fn unique(
        &self,
        mut candidates: impl Iterator<Item = (DeclarationId, &'t Declaration)>,
    ) -> Option<DeclarationId> {
        let (first, _) = candidates.next()?;
        candidates.next().is_none().then_some(first)
    }
}
