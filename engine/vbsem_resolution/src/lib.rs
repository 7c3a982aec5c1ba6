//! Implements the default binding of member-access expressions
//! (`<l-expression>.<name>`) against a declaration snapshot.
//!
//! Binding works over already-classified l-expressions: the caller resolves
//! the left side first and hands the resulting [`BoundExpression`] to
//! [`MemberAccessBinder::resolve`] together with the right-side name. The
//! binder then applies the language's disambiguation rules in a fixed order;
//! that order is part of the observable contract and must not be reshuffled.

use enum_as_inner::EnumAsInner;
use serde::{Deserialize, Serialize};
use vbsem_table::{
    accessibility::CallingContext, finder::DeclarationFinder, DeclarationId,
    DeclarationKind,
};


/// Identifies the syntax node an expression was bound from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
pub struct NodeId(
    /// The raw index of the node.
    pub usize,
);

/// The payload of a successfully bound member-access expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberAccess {
    /// The declaration the access resolved to.
    pub declaration: DeclarationId,

    /// The syntax node the access was bound from.
    pub node: NodeId,

    /// The bound left side of the access, if the expression had one.
    pub l_expression: Option<Box<BoundExpression>>,
}

/// The payload of an expression that could not be bound to a declaration.
///
/// Unbound is not an error: accesses through `Object`/`Variant`-typed values
/// are legal and only resolvable at runtime. Carrying the bound left side
/// lets the rest of a chained expression keep binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unbound {
    /// The syntax node the access was bound from.
    pub node: NodeId,

    /// The bound left side of the access, if the expression had one.
    pub l_expression: Option<Box<BoundExpression>>,
}

/// A classified expression produced by binding.
///
/// The variant is the expression's classification; everything except
/// [`Self::Unbound`] refers to a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumAsInner)]
#[allow(missing_docs)]
pub enum BoundExpression {
    Variable(MemberAccess),
    Property(MemberAccess),
    Function(MemberAccess),
    Subroutine(MemberAccess),
    /// A constant, enumeration, or enumeration member used as a value.
    Value(MemberAccess),
    Project(MemberAccess),
    ProceduralModule(MemberAccess),
    /// A type reference (an enumeration, user-defined type, or class).
    Type(MemberAccess),
    Unbound(Unbound),
}

impl BoundExpression {
    /// The declaration this expression refers to, if it is bound.
    #[must_use]
    pub fn referenced_declaration(&self) -> Option<DeclarationId> {
        match self {
            Self::Variable(access)
            | Self::Property(access)
            | Self::Function(access)
            | Self::Subroutine(access)
            | Self::Value(access)
            | Self::Project(access)
            | Self::ProceduralModule(access)
            | Self::Type(access) => Some(access.declaration),
            Self::Unbound(_) => None,
        }
    }

    /// The syntax node this expression was bound from.
    #[must_use]
    pub fn node(&self) -> NodeId {
        match self {
            Self::Variable(access)
            | Self::Property(access)
            | Self::Function(access)
            | Self::Subroutine(access)
            | Self::Value(access)
            | Self::Project(access)
            | Self::ProceduralModule(access)
            | Self::Type(access) => access.node,
            Self::Unbound(unbound) => unbound.node,
        }
    }

    /// The bound left side of this expression, if it has one.
    #[must_use]
    pub fn l_expression(&self) -> Option<&Self> {
        match self {
            Self::Variable(access)
            | Self::Property(access)
            | Self::Function(access)
            | Self::Subroutine(access)
            | Self::Value(access)
            | Self::Project(access)
            | Self::ProceduralModule(access)
            | Self::Type(access) => access.l_expression.as_deref(),
            Self::Unbound(unbound) => unbound.l_expression.as_deref(),
        }
    }
}

/// The member kinds a scoped lookup tries, in order, together with the
/// classification each one binds to.
const MEMBER_KINDS: [(DeclarationKind, fn(MemberAccess) -> BoundExpression);
    7] = [
    (DeclarationKind::Variable, BoundExpression::Variable),
    (DeclarationKind::Property, BoundExpression::Property),
    (DeclarationKind::Function, BoundExpression::Function),
    (DeclarationKind::Subroutine, BoundExpression::Subroutine),
    (DeclarationKind::Constant, BoundExpression::Value),
    (DeclarationKind::Enumeration, BoundExpression::Value),
    (DeclarationKind::EnumerationMember, BoundExpression::Value),
];

/// Binds member-access expressions against one declaration snapshot from a
/// fixed calling location.
#[derive(Debug, Clone, Copy)]
pub struct MemberAccessBinder<'a, 't> {
    finder: &'a DeclarationFinder<'t>,
    context: CallingContext,
}

impl<'a, 't> MemberAccessBinder<'a, 't> {
    /// Creates a binder for the given finder and calling location.
    #[must_use]
    pub const fn new(
        finder: &'a DeclarationFinder<'t>,
        context: CallingContext,
    ) -> Self {
        Self { finder, context }
    }

    /// Binds `<l_expression>.<name>` at the given node.
    ///
    /// The rules apply in order; the first one whose precondition matches
    /// the l-expression's classification decides the outcome:
    ///
    /// 1. A variable, property, or function left side with a declared type
    ///    that is a user-defined type or class binds the name against that
    ///    type's members. A miss commits to an unbound member rather than
    ///    falling through, so the rest of a chained expression can keep
    ///    binding.
    /// 2. An unbound left side stays unbound.
    /// 3. A project left side binds project names, then procedural modules,
    ///    then members visible at project scope.
    /// 4. A procedural-module left side binds the module's members.
    /// 5. An enumeration left side binds its enumeration members as values.
    ///
    /// Returns `None` when no rule produces a result.
    #[must_use]
    pub fn resolve(
        &self,
        node: NodeId,
        name: &str,
        l_expression: &BoundExpression,
    ) -> Option<BoundExpression> {
        let result = self
            .resolve_member_of_declared_type(node, name, l_expression)
            .or_else(|| self.resolve_unbound(node, l_expression))
            .or_else(|| self.resolve_member_of_project(node, name, l_expression))
            .or_else(|| {
                self.resolve_member_of_procedural_module(
                    node,
                    name,
                    l_expression,
                )
            })
            .or_else(|| {
                self.resolve_enumeration_member(node, name, l_expression)
            });

        if let Some(expression) = &result {
            log::trace!(
                "bound member access `{name}` to {:?}",
                expression.referenced_declaration()
            );
        }
        result
    }

    fn resolve_member_of_declared_type(
        &self,
        node: NodeId,
        name: &str,
        l_expression: &BoundExpression,
    ) -> Option<BoundExpression> {
        if !l_expression.is_variable()
            && !l_expression.is_property()
            && !l_expression.is_function()
        {
            return None;
        }

        let referenced = l_expression.referenced_declaration()?;
        let declared_type =
            self.finder.table().get(referenced)?.as_type()?;
        let type_kind = self.finder.table().get(declared_type)?.kind();
        if type_kind != DeclarationKind::UserDefinedType
            && type_kind != DeclarationKind::ClassModule
        {
            return None;
        }

        for (kind, classify) in MEMBER_KINDS
            .iter()
            .take(4)
            .copied()
        {
            if let Some(member) = self.finder.find_member_with_parent(
                self.context,
                declared_type,
                name,
                kind,
            ) {
                return Some(classify(self.access(member, node, l_expression)));
            }
        }

        // No match means an unbound member, not a failure: the declared type
        // may be extended at runtime, and the rest of the chain should still
        // bind.
        Some(BoundExpression::Unbound(Unbound {
            node,
            l_expression: Some(Box::new(l_expression.clone())),
        }))
    }

    fn resolve_unbound(
        &self,
        node: NodeId,
        l_expression: &BoundExpression,
    ) -> Option<BoundExpression> {
        l_expression.is_unbound().then(|| {
            BoundExpression::Unbound(Unbound {
                node,
                l_expression: Some(Box::new(l_expression.clone())),
            })
        })
    }

    fn resolve_member_of_project(
        &self,
        node: NodeId,
        name: &str,
        l_expression: &BoundExpression,
    ) -> Option<BoundExpression> {
        let referenced_project = l_expression.as_project()?.declaration;
        let is_enclosing = referenced_project == self.context.project;

        self.resolve_project_name(node, name, l_expression)
            .or_else(|| {
                self.resolve_procedural_module(
                    node,
                    name,
                    l_expression,
                    is_enclosing,
                    referenced_project,
                )
            })
            .or_else(|| {
                MEMBER_KINDS.iter().copied().find_map(|(kind, classify)| {
                    self.find_member_at_project_scope(
                        is_enclosing,
                        referenced_project,
                        name,
                        kind,
                    )
                    .map(|member| {
                        classify(self.access(member, node, l_expression))
                    })
                })
            })
    }

    fn resolve_project_name(
        &self,
        node: NodeId,
        name: &str,
        l_expression: &BoundExpression,
    ) -> Option<BoundExpression> {
        let enclosing_project =
            self.finder.table().get(self.context.project)?;
        if self.finder.is_match(enclosing_project.identifier_name(), name) {
            return Some(BoundExpression::Project(self.access(
                self.context.project,
                node,
                l_expression,
            )));
        }

        self.finder
            .find_referenced_project(self.context.project, name)
            .map(|project| {
                BoundExpression::Project(self.access(
                    project,
                    node,
                    l_expression,
                ))
            })
    }

    fn resolve_procedural_module(
        &self,
        node: NodeId,
        name: &str,
        l_expression: &BoundExpression,
        is_enclosing: bool,
        referenced_project: DeclarationId,
    ) -> Option<BoundExpression> {
        let module = if is_enclosing {
            let calling_module =
                self.finder.table().get(self.context.module)?;
            if calling_module.kind() == DeclarationKind::ProceduralModule
                && self.finder.is_match(calling_module.identifier_name(), name)
            {
                Some(self.context.module)
            } else {
                self.finder.find_module_enclosing_project(
                    self.context,
                    name,
                    DeclarationKind::ProceduralModule,
                )
            }
        } else {
            self.finder.find_module_referenced_project(
                self.context,
                referenced_project,
                name,
                DeclarationKind::ProceduralModule,
            )
        }?;

        Some(BoundExpression::ProceduralModule(self.access(
            module,
            node,
            l_expression,
        )))
    }

    fn find_member_at_project_scope(
        &self,
        is_enclosing: bool,
        referenced_project: DeclarationId,
        name: &str,
        kind: DeclarationKind,
    ) -> Option<DeclarationId> {
        if is_enclosing {
            self.finder
                .find_member_enclosing_module(self.context, name, kind)
                .or_else(|| {
                    self.finder.find_member_enclosed_project(
                        self.context,
                        name,
                        kind,
                    )
                })
        } else {
            self.finder.find_member_referenced_project(
                self.context,
                referenced_project,
                name,
                kind,
            )
        }
    }

    fn resolve_member_of_procedural_module(
        &self,
        node: NodeId,
        name: &str,
        l_expression: &BoundExpression,
    ) -> Option<BoundExpression> {
        let module = l_expression.as_procedural_module()?.declaration;

        MEMBER_KINDS.iter().copied().find_map(|(kind, classify)| {
            self.finder
                .find_member_enclosed_project_in_module(
                    self.context,
                    module,
                    name,
                    kind,
                )
                .or_else(|| {
                    self.finder.find_member_referenced_project_in_module(
                        self.context,
                        module,
                        name,
                        kind,
                    )
                })
                .map(|member| {
                    classify(self.access(member, node, l_expression))
                })
        })
    }

    fn resolve_enumeration_member(
        &self,
        node: NodeId,
        name: &str,
        l_expression: &BoundExpression,
    ) -> Option<BoundExpression> {
        let referenced = l_expression.referenced_declaration()?;
        // The guard is a literal disjunction: a left side that is not
        // classified as a type still qualifies when the declaration it
        // refers to is an enumeration.
        if !l_expression.is_type()
            && self.finder.table().get(referenced)?.kind()
                != DeclarationKind::Enumeration
        {
            return None;
        }

        self.finder
            .find_member_with_parent(
                self.context,
                referenced,
                name,
                DeclarationKind::EnumerationMember,
            )
            .map(|member| {
                BoundExpression::Value(self.access(
                    member,
                    node,
                    l_expression,
                ))
            })
    }

    fn access(
        &self,
        declaration: DeclarationId,
        node: NodeId,
        l_expression: &BoundExpression,
    ) -> MemberAccess {
        MemberAccess {
            declaration,
            node,
            l_expression: Some(Box::new(l_expression.clone())),
        }
    }
}
