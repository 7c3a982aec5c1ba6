//! Contains the definition of [`DeclarationTable`], the immutable snapshot of
//! every declared entity produced by an analysis pass, along with the
//! [`Declaration`] data model it stores.
//!
//! The table follows a build-then-read discipline: declarations and the
//! class-hierarchy/project-reference edges between them are inserted through
//! `&mut` access during a single construction phase, after which the snapshot
//! is published and only shared reads happen. Derived properties that depend
//! on the hierarchy graph are memoized on first access with compute-once
//! cells, so edges added after a first read are deliberately not reflected in
//! the cached value.

use std::collections::{HashMap, HashSet};

use enum_as_inner::EnumAsInner;
use getset::{CopyGetters, Getters};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use vbsem_arena::Arena;

pub mod accessibility;
pub mod finder;


/// The id of a [`Declaration`] stored in a [`DeclarationTable`].
pub type DeclarationId = vbsem_arena::ID<Declaration>;

/// Case-folds an identifier for comparison.
///
/// Identifier comparison in the analyzed language is case-insensitive; every
/// name lookup in this crate goes through this folding.
#[must_use]
pub fn fold_identifier(name: &str) -> String { name.to_lowercase() }

/// Checks whether two identifiers are the same under the language's
/// case-insensitive comparison rules.
#[must_use]
pub fn identifiers_match(first: &str, second: &str) -> bool {
    fold_identifier(first) == fold_identifier(second)
}

/// Identifies the module a declaration lexically belongs to.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_new::new,
    derive_more::Display,
)]
#[display(fmt = "{}.{}", project_name, component_name)]
pub struct QualifiedModuleName {
    /// The name of the project owning the module.
    pub project_name: String,

    /// The name of the module component itself.
    pub component_name: String,
}

/// The fully qualified name of a declared entity: its module plus the member
/// name.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_new::new,
    derive_more::Display,
)]
#[display(fmt = "{}.{}", module, member_name)]
pub struct QualifiedMemberName {
    /// The qualified name of the enclosing module.
    pub module: QualifiedModuleName,

    /// The name of the member within the module.
    pub member_name: String,
}

/// A half-open source range locating a declaration within its module body.
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
    derive_new::new,
)]
pub struct Selection {
    /// The line the declaration starts on (1-based).
    pub start_line: u32,

    /// The column the declaration starts on (1-based).
    pub start_column: u32,

    /// The line the declaration ends on (1-based).
    pub end_line: u32,

    /// The column the declaration ends on (1-based).
    pub end_column: u32,
}

impl Selection {
    /// The nominal anchor used for synthesized declarations that need a
    /// location but have no real source text.
    pub const HOME: Self = Self {
        start_line: 1,
        start_column: 1,
        end_line: 1,
        end_column: 1,
    };
}

/// The declared visibility level of an entity.
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
#[allow(missing_docs)]
pub enum Accessibility {
    Private,
    Friend,
    Public,
    Global,
    /// No explicit accessibility keyword was written at the declaration
    /// site; the effective scope depends on the declaration kind.
    Implicit,
    /// A `Static` local, visible only inside its lexically enclosing member.
    Static,
}

/// An enumeration of the different kinds of declared entities.
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
#[allow(missing_docs)]
pub enum DeclarationKind {
    Project,
    ProceduralModule,
    ClassModule,
    Function,
    Subroutine,
    Property,
    Variable,
    Parameter,
    Constant,
    Enumeration,
    EnumerationMember,
    UserDefinedType,
    UserDefinedTypeMember,
}

impl DeclarationKind {
    /// Checks if this kind is a project.
    #[must_use]
    pub const fn is_project(self) -> bool { matches!(self, Self::Project) }

    /// Checks if this kind is a module (procedural or class).
    #[must_use]
    pub const fn is_module(self) -> bool {
        matches!(self, Self::ProceduralModule | Self::ClassModule)
    }

    /// Checks if this kind is a procedural member, i.e. one that can enclose
    /// locals and parameters.
    #[must_use]
    pub const fn is_procedural_member(self) -> bool {
        matches!(self, Self::Function | Self::Subroutine | Self::Property)
    }

    /// Gets the description string of the kind.
    #[must_use]
    pub const fn kind_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::ProceduralModule => "procedural module",
            Self::ClassModule => "class module",
            Self::Function => "function",
            Self::Subroutine => "subroutine",
            Self::Property => "property",
            Self::Variable => "variable",
            Self::Parameter => "parameter",
            Self::Constant => "constant",
            Self::Enumeration => "enumeration",
            Self::EnumerationMember => "enumeration member",
            Self::UserDefinedType => "user defined type",
            Self::UserDefinedTypeMember => "user defined type member",
        }
    }
}

/// The module-level attributes recognized on a class module.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    derive_new::new,
)]
pub struct ClassAttributes {
    /// The class is marked visible to other projects referencing its
    /// project.
    pub exposed: bool,

    /// The class is marked as living in the global namespace.
    pub global_class: bool,

    /// The class is marked as having a predeclared id.
    pub predeclared_id: bool,
}

/// The kind-specific payload of a [`Declaration`] that owns project
/// reference edges.
#[derive(Debug, Default)]
pub struct ProjectDetail {
    referenced_projects: HashSet<DeclarationId>,
}

impl ProjectDetail {
    /// The projects this project references.
    ///
    /// These edges are distinct from ownership: a referenced project is not
    /// a child of the referencing one.
    #[must_use]
    pub const fn referenced_projects(&self) -> &HashSet<DeclarationId> {
        &self.referenced_projects
    }
}

/// The kind-specific payload of a procedural-module [`Declaration`].
#[derive(Debug, Default, CopyGetters)]
pub struct ProceduralModuleDetail {
    /// Whether the module is restricted to its own project.
    #[get_copy = "pub"]
    private_module: bool,
}

/// The kind-specific payload of a parameter [`Declaration`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, derive_new::new,
)]
pub struct ParameterDetail {
    /// The parameter may be omitted at the call site.
    pub is_optional: bool,

    /// The parameter is passed by reference without an explicit mode
    /// keyword.
    pub is_implicit_by_ref: bool,

    /// The parameter collects trailing arguments into an array.
    pub is_param_array: bool,
}

/// The kind-specific payload of a class-module [`Declaration`].
///
/// The three relationship sets are populated independently of one another:
/// adding a resolved supertype never touches the unresolved name set, and
/// subtype edges are recorded explicitly by whoever discovers them rather
/// than being derived from the supertype edges.
#[derive(Debug, Default)]
pub struct ClassModuleDetail {
    attributes: ClassAttributes,
    default_instance_variable: bool,
    supertypes: HashSet<DeclarationId>,
    supertype_names: HashSet<String>,
    subtypes: HashSet<DeclarationId>,
    is_global_class_module: OnceCell<bool>,
    has_default_instance_variable: OnceCell<bool>,
}

impl ClassModuleDetail {
    /// The attributes the class module was declared with.
    #[must_use]
    pub const fn attributes(&self) -> &ClassAttributes { &self.attributes }

    /// The resolved class modules this class implements.
    #[must_use]
    pub const fn supertypes(&self) -> &HashSet<DeclarationId> {
        &self.supertypes
    }

    /// The names of supertypes that have not been resolved to a declaration.
    #[must_use]
    pub const fn supertype_names(&self) -> &HashSet<String> {
        &self.supertype_names
    }

    /// The class modules known to implement this class.
    #[must_use]
    pub const fn subtypes(&self) -> &HashSet<DeclarationId> { &self.subtypes }
}

/// The kind-specific payload of a [`Declaration`].
#[derive(Debug, EnumAsInner)]
#[allow(missing_docs)]
pub enum Detail {
    Project(ProjectDetail),
    ProceduralModule(ProceduralModuleDetail),
    ClassModule(Box<ClassModuleDetail>),
    Parameter(ParameterDetail),
    /// Any declaration kind that carries no extra payload.
    Plain(DeclarationKind),
}

impl Detail {
    /// The declaration kind this payload corresponds to.
    #[must_use]
    pub const fn kind(&self) -> DeclarationKind {
        match self {
            Self::Project(_) => DeclarationKind::Project,
            Self::ProceduralModule(_) => DeclarationKind::ProceduralModule,
            Self::ClassModule(_) => DeclarationKind::ClassModule,
            Self::Parameter(_) => DeclarationKind::Parameter,
            Self::Plain(kind) => *kind,
        }
    }
}

/// A single declared entity: a project, module, member, or local.
///
/// Declarations are immutable once inserted into a [`DeclarationTable`],
/// except for the relationship edge sets on class modules and projects which
/// are appended to during the construction phase.
#[derive(Debug, Getters, CopyGetters)]
pub struct Declaration {
    /// The fully qualified name of the declaration.
    #[get = "pub"]
    qualified_name: QualifiedMemberName,

    /// The id of the declaring parent: the owning module, or the owning
    /// member for locals and parameters. `None` only for projects.
    #[get_copy = "pub"]
    parent: Option<DeclarationId>,

    /// The textual declared type annotation, if any (e.g. `Variant`, a class
    /// name, a user-defined type name).
    #[get = "pub"]
    as_type_name: Option<String>,

    /// The declaration the declared type name resolved to, if it has been
    /// resolved.
    #[get_copy = "pub"]
    as_type: Option<DeclarationId>,

    /// The declared accessibility level.
    #[get_copy = "pub"]
    accessibility: Accessibility,

    /// Whether the declaration comes from a referenced type library or was
    /// synthesized, rather than from user source.
    #[get_copy = "pub"]
    is_built_in: bool,

    /// The source range of the declaration; `None` for synthesized entries.
    #[get_copy = "pub"]
    selection: Option<Selection>,

    /// The kind-specific payload.
    #[get = "pub"]
    detail: Detail,
}

impl Declaration {
    /// Creates a project declaration.
    #[must_use]
    pub fn project(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            qualified_name: QualifiedMemberName::new(
                QualifiedModuleName::new(name.clone(), name.clone()),
                name,
            ),
            parent: None,
            as_type_name: None,
            as_type: None,
            accessibility: Accessibility::Global,
            is_built_in: false,
            selection: None,
            detail: Detail::Project(ProjectDetail::default()),
        }
    }

    /// Creates a class-module declaration owned by the given project.
    #[must_use]
    pub fn class_module(
        qualified_name: QualifiedMemberName,
        parent_project: DeclarationId,
        is_built_in: bool,
        attributes: ClassAttributes,
        default_instance_variable: bool,
    ) -> Self {
        Self {
            qualified_name,
            parent: Some(parent_project),
            as_type_name: None,
            as_type: None,
            accessibility: Accessibility::Public,
            is_built_in,
            selection: None,
            detail: Detail::ClassModule(Box::new(ClassModuleDetail {
                attributes,
                default_instance_variable,
                ..ClassModuleDetail::default()
            })),
        }
    }

    /// Creates a procedural-module declaration owned by the given project.
    #[must_use]
    pub fn procedural_module(
        qualified_name: QualifiedMemberName,
        parent_project: DeclarationId,
        is_built_in: bool,
    ) -> Self {
        Self {
            qualified_name,
            parent: Some(parent_project),
            as_type_name: None,
            as_type: None,
            accessibility: Accessibility::Public,
            is_built_in,
            selection: None,
            detail: Detail::ProceduralModule(ProceduralModuleDetail::default()),
        }
    }

    /// Creates a member declaration of any payload-free kind (functions,
    /// variables, constants, enumerations, and so on).
    ///
    /// Projects, modules, and parameters have dedicated constructors; a
    /// plain member built with one of their kinds is rejected by
    /// [`DeclarationTable::insert`].
    #[must_use]
    pub fn member(
        qualified_name: QualifiedMemberName,
        parent: DeclarationId,
        kind: DeclarationKind,
        accessibility: Accessibility,
        as_type_name: Option<String>,
    ) -> Self {
        Self {
            qualified_name,
            parent: Some(parent),
            as_type_name,
            as_type: None,
            accessibility,
            is_built_in: false,
            selection: None,
            detail: Detail::Plain(kind),
        }
    }

    /// Creates a parameter declaration owned by the given member.
    #[must_use]
    pub fn parameter(
        qualified_name: QualifiedMemberName,
        parent_member: DeclarationId,
        as_type_name: Option<String>,
        detail: ParameterDetail,
    ) -> Self {
        Self {
            qualified_name,
            parent: Some(parent_member),
            as_type_name,
            as_type: None,
            accessibility: Accessibility::Implicit,
            is_built_in: false,
            selection: None,
            detail: Detail::Parameter(detail),
        }
    }

    /// Marks the declaration as built-in.
    #[must_use]
    pub const fn as_built_in(mut self) -> Self {
        self.is_built_in = true;
        self
    }

    /// Attaches a source selection to the declaration.
    #[must_use]
    pub const fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Records the declaration the declared type name resolved to.
    #[must_use]
    pub const fn with_declared_type(mut self, id: DeclarationId) -> Self {
        self.as_type = Some(id);
        self
    }

    /// The declaration kind.
    #[must_use]
    pub const fn kind(&self) -> DeclarationKind { self.detail.kind() }

    /// The unqualified identifier this entity was declared with.
    #[must_use]
    pub fn identifier_name(&self) -> &str {
        &self.qualified_name.member_name
    }
}

/// The error returned by [`DeclarationTable::insert`].
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    thiserror::Error,
    displaydoc::Display,
)]
pub enum InsertError {
    /// a declaration named `{0}` already exists in the same parent scope
    DuplicateName(String),

    /// a parameter's parent must be a function, subroutine, or property
    InvalidParameterParent,

    /// a {0} declaration requires its dedicated constructor
    InvalidMemberKind(&'static str),
}

/// The append-only collection of every declaration in one analysis snapshot.
///
/// A new snapshot replaces the table wholesale; declarations are never
/// mutated across snapshots, only rebuilt.
#[derive(Debug, Default)]
pub struct DeclarationTable {
    declarations: Arena<Declaration>,
    ids_by_scoped_name:
        HashMap<(Option<DeclarationId>, String, DeclarationKind), DeclarationId>,
}

impl DeclarationTable {
    /// Creates a new empty table.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// The number of declarations stored in the table.
    #[must_use]
    pub fn len(&self) -> usize { self.declarations.len() }

    /// Checks if the table holds no declarations.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.declarations.is_empty() }

    /// Inserts a declaration and returns its id.
    ///
    /// A declaration is identified by its parent, its case-folded name, and
    /// its kind, so entities of different kinds may share a name within one
    /// scope; which one a reference means is decided later by the binder's
    /// kind priority.
    ///
    /// # Errors
    ///
    /// [`InsertError::DuplicateName`] if a declaration with the same
    /// case-folded name and kind already exists under the same parent;
    /// [`InsertError::InvalidParameterParent`] if a parameter is parented by
    /// anything but a function, subroutine, or property;
    /// [`InsertError::InvalidMemberKind`] if a plain member declaration
    /// carries a kind that has a dedicated constructor.
    pub fn insert(
        &mut self,
        declaration: Declaration,
    ) -> Result<DeclarationId, InsertError> {
        if let Detail::Plain(kind) = &declaration.detail {
            if kind.is_project()
                || kind.is_module()
                || *kind == DeclarationKind::Parameter
            {
                return Err(InsertError::InvalidMemberKind(kind.kind_str()));
            }
        }

        if declaration.detail.is_parameter()
            && !declaration
                .parent
                .and_then(|parent| self.declarations.get(parent))
                .is_some_and(|parent| parent.kind().is_procedural_member())
        {
            return Err(InsertError::InvalidParameterParent);
        }

        let key = (
            declaration.parent,
            fold_identifier(declaration.identifier_name()),
            declaration.kind(),
        );
        if self.ids_by_scoped_name.contains_key(&key) {
            return Err(InsertError::DuplicateName(
                declaration.qualified_name.to_string(),
            ));
        }

        let id = self.declarations.insert(declaration);
        self.ids_by_scoped_name.insert(key, id);
        Ok(id)
    }

    /// Gets the declaration with the given id.
    #[must_use]
    pub fn get(&self, id: DeclarationId) -> Option<&Declaration> {
        self.declarations.get(id)
    }

    /// Iterates over all `(id, declaration)` pairs in insertion order.
    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (DeclarationId, &Declaration)> {
        self.declarations.iter()
    }

    /// Iterates over the ids of all project declarations.
    pub fn projects(&self) -> impl Iterator<Item = DeclarationId> + '_ {
        self.declarations
            .iter()
            .filter(|(_, declaration)| declaration.kind().is_project())
            .map(|(id, _)| id)
    }

    /// The declaring parent of the given declaration.
    #[must_use]
    pub fn parent_of(&self, id: DeclarationId) -> Option<DeclarationId> {
        self.declarations.get(id).and_then(Declaration::parent)
    }

    /// Walks up the parent chain to the closest enclosing module, including
    /// the declaration itself if it is a module.
    #[must_use]
    pub fn module_parent_of(
        &self,
        mut id: DeclarationId,
    ) -> Option<DeclarationId> {
        loop {
            let declaration = self.declarations.get(id)?;
            if declaration.kind().is_module() {
                return Some(id);
            }
            id = declaration.parent?;
        }
    }

    /// Walks up the parent chain to the enclosing project, including the
    /// declaration itself if it is a project.
    #[must_use]
    pub fn project_parent_of(
        &self,
        mut id: DeclarationId,
    ) -> Option<DeclarationId> {
        loop {
            let declaration = self.declarations.get(id)?;
            if declaration.kind().is_project() {
                return Some(id);
            }
            id = declaration.parent?;
        }
    }

    /// Checks if the given declaration lives inside the given project.
    #[must_use]
    pub fn is_in_project(
        &self,
        id: DeclarationId,
        project: DeclarationId,
    ) -> bool {
        self.project_parent_of(id) == Some(project)
    }

    /// Records a resolved supertype edge on a class module.
    ///
    /// Returns `false` if either id is not a class module, or if the edge
    /// was already present. Adding a resolved supertype never populates the
    /// unresolved name set.
    pub fn add_supertype(
        &mut self,
        class: DeclarationId,
        supertype: DeclarationId,
    ) -> bool {
        if !self
            .declarations
            .get(supertype)
            .is_some_and(|declaration| declaration.detail.is_class_module())
        {
            return false;
        }

        self.class_detail_mut(class)
            .is_some_and(|detail| detail.supertypes.insert(supertype))
    }

    /// Records an unresolved supertype name on a class module.
    ///
    /// Returns `false` if the id is not a class module or the name was
    /// already present. Never populates the resolved supertype set.
    pub fn add_supertype_name(
        &mut self,
        class: DeclarationId,
        supertype_name: impl Into<String>,
    ) -> bool {
        let supertype_name = supertype_name.into();
        self.class_detail_mut(class)
            .is_some_and(|detail| detail.supertype_names.insert(supertype_name))
    }

    /// Records a subtype edge on a class module.
    ///
    /// The inverse supertype edge is *not* derived automatically; callers
    /// that know both directions record both.
    pub fn add_subtype(
        &mut self,
        class: DeclarationId,
        subtype: DeclarationId,
    ) -> bool {
        if !self
            .declarations
            .get(subtype)
            .is_some_and(|declaration| declaration.detail.is_class_module())
        {
            return false;
        }

        self.class_detail_mut(class)
            .is_some_and(|detail| detail.subtypes.insert(subtype))
    }

    /// Records a project-reference edge between two projects.
    pub fn add_project_reference(
        &mut self,
        project: DeclarationId,
        referenced: DeclarationId,
    ) -> bool {
        if !self
            .declarations
            .get(referenced)
            .is_some_and(|declaration| declaration.kind().is_project())
        {
            return false;
        }

        self.declarations
            .get_mut(project)
            .and_then(|declaration| declaration.detail.as_project_mut())
            .is_some_and(|detail| detail.referenced_projects.insert(referenced))
    }

    /// Restricts a procedural module to its own project.
    pub(crate) fn set_private_module(
        &mut self,
        module: DeclarationId,
        private_module: bool,
    ) -> bool {
        self.declarations
            .get_mut(module)
            .and_then(|declaration| declaration.detail.as_procedural_module_mut())
            .map(|detail| {
                detail.private_module = private_module;
            })
            .is_some()
    }

    /// Records the resolved declared type of a declaration.
    pub fn resolve_declared_type(
        &mut self,
        id: DeclarationId,
        declared_type: DeclarationId,
    ) -> bool {
        self.declarations
            .get_mut(id)
            .map(|declaration| {
                declaration.as_type = Some(declared_type);
            })
            .is_some()
    }

    /// The resolved supertypes of the given declaration; empty for anything
    /// that is not a class module.
    pub fn supertypes_of(
        &self,
        id: DeclarationId,
    ) -> impl Iterator<Item = DeclarationId> + '_ {
        self.class_detail(id)
            .into_iter()
            .flat_map(|detail| detail.supertypes.iter().copied())
    }

    /// The recorded subtypes of the given declaration; empty for anything
    /// that is not a class module.
    pub fn subtypes_of(
        &self,
        id: DeclarationId,
    ) -> impl Iterator<Item = DeclarationId> + '_ {
        self.class_detail(id)
            .into_iter()
            .flat_map(|detail| detail.subtypes.iter().copied())
    }

    /// The unresolved supertype names of the given declaration; empty for
    /// anything that is not a class module.
    pub fn supertype_names_of(
        &self,
        id: DeclarationId,
    ) -> impl Iterator<Item = &str> {
        self.class_detail(id)
            .into_iter()
            .flat_map(|detail| detail.supertype_names.iter().map(String::as_str))
    }

    /// Checks if `potential_supertype` is reachable from `module` by walking
    /// the resolved supertype edges transitively.
    ///
    /// The walk tolerates diamonds and cycles; it never revisits a node.
    #[must_use]
    pub fn is_supertype_of(
        &self,
        potential_supertype: DeclarationId,
        module: DeclarationId,
    ) -> bool {
        let mut visited = HashSet::new();
        let mut pending: Vec<_> = self.supertypes_of(module).collect();

        while let Some(current) = pending.pop() {
            if !visited.insert(current) {
                continue;
            }
            if current == potential_supertype {
                return true;
            }
            pending.extend(self.supertypes_of(current));
        }

        false
    }

    /// Checks if the given class module is visible to other projects.
    ///
    /// Built-in class modules are treated as exposed; user classes are
    /// exposed only when annotated so. `false` for anything that is not a
    /// class module.
    #[must_use]
    pub fn is_exposed(&self, id: DeclarationId) -> bool {
        let Some(declaration) = self.declarations.get(id) else {
            return false;
        };
        declaration.is_built_in
            || declaration
                .detail
                .as_class_module()
                .is_some_and(|detail| detail.attributes.exposed)
    }

    /// Checks if the given class module is a global-namespace class.
    ///
    /// True when the class itself carries the global-namespace annotation,
    /// or when any class reachable through the recorded subtype edges does.
    /// The result is memoized on first access: subtype edges added after the
    /// first read are not reflected in the cached value.
    #[must_use]
    pub fn is_global_class_module(&self, id: DeclarationId) -> bool {
        let Some(detail) = self.class_detail(id) else { return false };

        *detail.is_global_class_module.get_or_init(|| {
            detail.attributes.global_class || self.any_subtype_is_global(id)
        })
    }

    /// Checks if the given class module implicitly provides a default
    /// instance variable.
    ///
    /// True when the class is global, carries the predeclared-id annotation,
    /// or was constructed with the default-instance flag. Memoized on first
    /// access, with the same staleness contract as
    /// [`Self::is_global_class_module`].
    #[must_use]
    pub fn has_default_instance_variable(&self, id: DeclarationId) -> bool {
        let Some(detail) = self.class_detail(id) else { return false };

        *detail.has_default_instance_variable.get_or_init(|| {
            detail.attributes.predeclared_id
                || detail.default_instance_variable
                || self.is_global_class_module(id)
        })
    }

    /// Checks if the given class module has a predeclared id.
    ///
    /// Equivalent to [`Self::has_default_instance_variable`].
    #[must_use]
    pub fn has_predeclared_id(&self, id: DeclarationId) -> bool {
        self.has_default_instance_variable(id)
    }

    fn any_subtype_is_global(&self, id: DeclarationId) -> bool {
        let mut visited = HashSet::new();
        let mut pending: Vec<_> = self.subtypes_of(id).collect();

        while let Some(current) = pending.pop() {
            if !visited.insert(current) {
                continue;
            }
            if self
                .class_detail(current)
                .is_some_and(|detail| detail.attributes.global_class)
            {
                return true;
            }
            pending.extend(self.subtypes_of(current));
        }

        false
    }

    fn class_detail(&self, id: DeclarationId) -> Option<&ClassModuleDetail> {
        self.declarations
            .get(id)
            .and_then(|declaration| declaration.detail.as_class_module())
            .map(AsRef::as_ref)
    }

    fn class_detail_mut(
        &mut self,
        id: DeclarationId,
    ) -> Option<&mut ClassModuleDetail> {
        self.declarations
            .get_mut(id)
            .and_then(|declaration| declaration.detail.as_class_module_mut())
            .map(AsMut::as_mut)
    }
}

impl std::ops::Index<DeclarationId> for DeclarationTable {
    type Output = Declaration;

    fn index(&self, id: DeclarationId) -> &Self::Output {
        self.get(id).expect("declaration id not found in this table")
    }
}
