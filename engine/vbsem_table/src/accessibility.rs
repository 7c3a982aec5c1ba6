//! Implements the accessibility rules that decide whether a declaration can
//! be referenced from a given calling location.
//!
//! A calling location is described by the project, module, and optionally
//! the member the reference appears in. The rules are evaluated in a fixed
//! order; reordering them changes observable behavior (for example, the
//! local/parameter rule must preempt every module-level rule).

use crate::{Accessibility, DeclarationId, DeclarationKind, DeclarationTable};

/// The location a reference appears at, used as the subject of every
/// accessibility query.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_new::new,
)]
pub struct CallingContext {
    /// The project the reference appears in.
    pub project: DeclarationId,

    /// The module the reference appears in.
    pub module: DeclarationId,

    /// The member the reference appears in, if it is inside one.
    pub member: Option<DeclarationId>,
}

impl CallingContext {
    /// Checks if the given declaration is accessible from this location.
    #[must_use]
    pub fn can_access(
        &self,
        table: &DeclarationTable,
        callee: Option<DeclarationId>,
    ) -> bool {
        is_accessible(
            table,
            Some(self.project),
            Some(self.module),
            self.member,
            callee,
        )
    }
}

/// Checks whether `callee` can be referenced from the calling location
/// described by the three calling ids.
///
/// Projects are accessible from everywhere. Modules and members dispatch to
/// [`is_module_accessible`] and [`is_member_accessible`] respectively. A
/// missing callee is never accessible.
#[must_use]
pub fn is_accessible(
    table: &DeclarationTable,
    calling_project: Option<DeclarationId>,
    calling_module: Option<DeclarationId>,
    calling_member: Option<DeclarationId>,
    callee: Option<DeclarationId>,
) -> bool {
    let Some(callee) = callee else { return false };
    let Some(declaration) = table.get(callee) else { return false };

    if declaration.kind().is_project() {
        return true;
    }

    if declaration.kind().is_module() {
        return is_module_accessible(
            table,
            calling_project,
            calling_module,
            Some(callee),
        );
    }

    is_member_accessible(
        table,
        calling_project,
        calling_module,
        calling_member,
        Some(callee),
    )
}

/// Checks whether the module `callee` can be referenced from the calling
/// location.
///
/// A module is accessible from inside itself and from anywhere in its own
/// project. Across projects, a procedural module is accessible unless marked
/// private, and a class module is accessible only when exposed.
#[must_use]
pub fn is_module_accessible(
    table: &DeclarationTable,
    calling_project: Option<DeclarationId>,
    calling_module: Option<DeclarationId>,
    callee: Option<DeclarationId>,
) -> bool {
    let Some(callee) = callee else { return false };
    let Some(declaration) = table.get(callee) else { return false };

    if calling_module == Some(callee) {
        return true;
    }

    if is_enclosing_project(table, calling_project, callee) {
        return true;
    }

    match declaration.detail() {
        crate::Detail::ProceduralModule(detail) => !detail.private_module(),
        crate::Detail::ClassModule(_) => table.is_exposed(callee),
        _ => false,
    }
}

/// Checks whether the member `callee` can be referenced from the calling
/// location.
///
/// The rules apply in order:
///
/// 1. A local or parameter (anything declared inside a function, subroutine,
///    or property) is accessible only from inside that exact member.
/// 2. A non-`Static` member of the calling module itself, or of any of its
///    transitive supertypes, is accessible.
/// 3. Otherwise the member's enclosing module must itself be accessible, and
///    the member must have public scope, be an enumeration or user-defined
///    type member, or be a `Friend` member referenced from its own project.
#[must_use]
pub fn is_member_accessible(
    table: &DeclarationTable,
    calling_project: Option<DeclarationId>,
    calling_module: Option<DeclarationId>,
    calling_member: Option<DeclarationId>,
    callee: Option<DeclarationId>,
) -> bool {
    let Some(callee) = callee else { return false };
    let Some(declaration) = table.get(callee) else { return false };
    let Some(parent) = declaration.parent() else { return false };
    let Some(parent_declaration) = table.get(parent) else { return false };

    if parent_declaration.kind().is_procedural_member() {
        return calling_member == Some(parent);
    }

    if parent_declaration.kind().is_module()
        && declaration.accessibility() != Accessibility::Static
        && calling_module.is_some_and(|calling_module| {
            calling_module == parent
                || table.is_supertype_of(parent, calling_module)
        })
    {
        return true;
    }

    let Some(member_module) = table.module_parent_of(parent) else {
        return false;
    };
    if !is_module_accessible(
        table,
        calling_project,
        calling_module,
        Some(member_module),
    ) {
        return false;
    }

    matches!(
        declaration.kind(),
        DeclarationKind::EnumerationMember
            | DeclarationKind::UserDefinedTypeMember
    ) || has_public_scope(declaration.accessibility(), declaration.kind())
        || (declaration.accessibility() == Accessibility::Friend
            && is_enclosing_project(table, calling_project, callee))
}

/// Checks whether an accessibility/kind pair grants visibility outside the
/// declaring module.
///
/// `Implicit` members default to public scope, with variables as the
/// exception: an implicitly declared module-level variable stays
/// module-local.
#[must_use]
pub fn has_public_scope(
    accessibility: Accessibility,
    kind: DeclarationKind,
) -> bool {
    match accessibility {
        Accessibility::Public | Accessibility::Global => true,
        Accessibility::Implicit => kind != DeclarationKind::Variable,
        Accessibility::Private
        | Accessibility::Friend
        | Accessibility::Static => false,
    }
}

fn is_enclosing_project(
    table: &DeclarationTable,
    calling_project: Option<DeclarationId>,
    callee: DeclarationId,
) -> bool {
    let project = table.project_parent_of(callee);
    project.is_some() && project == calling_project
}
