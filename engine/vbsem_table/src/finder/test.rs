use crate::{
    accessibility::CallingContext, finder::DeclarationFinder, Accessibility,
    ClassAttributes, Declaration, DeclarationId, DeclarationKind,
    DeclarationTable, QualifiedMemberName, QualifiedModuleName,
};

fn name(project: &str, component: &str, member: &str) -> QualifiedMemberName {
    QualifiedMemberName::new(
        QualifiedModuleName::new(project.to_owned(), component.to_owned()),
        member.to_owned(),
    )
}

fn project(table: &mut DeclarationTable, project_name: &str) -> DeclarationId {
    table.insert(Declaration::project(project_name)).unwrap()
}

fn procedural_module(
    table: &mut DeclarationTable,
    project: DeclarationId,
    module_name: &str,
    is_built_in: bool,
) -> DeclarationId {
    let project_name = table[project].identifier_name().to_owned();
    table
        .insert(Declaration::procedural_module(
            name(&project_name, module_name, module_name),
            project,
            is_built_in,
        ))
        .unwrap()
}

fn class_module(
    table: &mut DeclarationTable,
    project: DeclarationId,
    module_name: &str,
    attributes: ClassAttributes,
) -> DeclarationId {
    let project_name = table[project].identifier_name().to_owned();
    table
        .insert(Declaration::class_module(
            name(&project_name, module_name, module_name),
            project,
            false,
            attributes,
            false,
        ))
        .unwrap()
}

fn member(
    table: &mut DeclarationTable,
    parent: DeclarationId,
    member_name: &str,
    kind: DeclarationKind,
    accessibility: Accessibility,
) -> DeclarationId {
    let module = table[parent].qualified_name().module.clone();
    table
        .insert(Declaration::member(
            QualifiedMemberName::new(module, member_name.to_owned()),
            parent,
            kind,
            accessibility,
            None,
        ))
        .unwrap()
}

#[test]
fn find_project_is_case_insensitive() {
    let mut table = DeclarationTable::new();
    let first = project(&mut table, "TestProject");

    let finder = DeclarationFinder::new(&table);
    assert_eq!(finder.find_project("testproject"), Some(first));
    assert_eq!(finder.find_project("TESTPROJECT"), Some(first));
    assert_eq!(finder.find_project("Other"), None);
}

#[test]
fn find_referenced_project_requires_a_reference_edge() {
    let mut table = DeclarationTable::new();
    let first = project(&mut table, "First");
    let second = project(&mut table, "Second");
    let third = project(&mut table, "Third");
    table.add_project_reference(first, second);

    let finder = DeclarationFinder::new(&table);
    assert_eq!(finder.find_referenced_project(first, "Second"), Some(second));
    assert_eq!(finder.find_referenced_project(first, "Third"), None);
    assert_eq!(finder.find_referenced_project(third, "Second"), None);
}

#[test]
fn find_std_module_filters_built_in_modules() {
    let mut table = DeclarationTable::new();
    let first = project(&mut table, "First");
    let user = procedural_module(&mut table, first, "UserModule", false);
    let built_in = procedural_module(&mut table, first, "Information", true);

    let finder = DeclarationFinder::new(&table);
    assert_eq!(finder.find_std_module(first, "usermodule", false), Some(user));
    assert_eq!(finder.find_std_module(first, "Information", false), None);
    assert_eq!(
        finder.find_std_module(first, "Information", true),
        Some(built_in)
    );
}

#[test]
fn find_member_with_parent_filters_kind_and_accessibility() {
    let mut table = DeclarationTable::new();
    let first = project(&mut table, "First");
    let calling = procedural_module(&mut table, first, "Caller", false);
    let other = project(&mut table, "Other");
    let foreign = procedural_module(&mut table, other, "Foreign", false);
    let class = class_module(
        &mut table,
        first,
        "Class1",
        ClassAttributes::default(),
    );
    let function = member(
        &mut table,
        class,
        "Value",
        DeclarationKind::Function,
        Accessibility::Public,
    );
    member(
        &mut table,
        class,
        "Hidden",
        DeclarationKind::Function,
        Accessibility::Private,
    );

    let finder = DeclarationFinder::new(&table);
    let context = CallingContext::new(first, calling, None);
    assert_eq!(
        finder.find_member_with_parent(
            context,
            class,
            "value",
            DeclarationKind::Function
        ),
        Some(function)
    );
    assert_eq!(
        finder.find_member_with_parent(
            context,
            class,
            "Value",
            DeclarationKind::Variable
        ),
        None
    );
    assert_eq!(
        finder.find_member_with_parent(
            context,
            class,
            "Hidden",
            DeclarationKind::Function
        ),
        None
    );

    // the unexposed class gates its public members across projects
    let foreign_context = CallingContext::new(other, foreign, None);
    assert_eq!(
        finder.find_member_with_parent(
            foreign_context,
            class,
            "Value",
            DeclarationKind::Function
        ),
        None
    );
}

#[test]
fn find_module_enclosing_project_excludes_the_calling_module() {
    let mut table = DeclarationTable::new();
    let first = project(&mut table, "First");
    let calling = procedural_module(&mut table, first, "Shared", false);
    let other = procedural_module(&mut table, first, "Other", false);

    let finder = DeclarationFinder::new(&table);
    let context = CallingContext::new(first, calling, None);
    assert_eq!(
        finder.find_module_enclosing_project(
            context,
            "Shared",
            DeclarationKind::ProceduralModule
        ),
        None
    );
    assert_eq!(
        finder.find_module_enclosing_project(
            context,
            "other",
            DeclarationKind::ProceduralModule
        ),
        Some(other)
    );
}

#[test]
fn find_module_referenced_project_respects_exposure() {
    let mut table = DeclarationTable::new();
    let first = project(&mut table, "First");
    let library = project(&mut table, "Library");
    let calling = procedural_module(&mut table, first, "Caller", false);
    let exposed = class_module(
        &mut table,
        library,
        "Exposed",
        ClassAttributes { exposed: true, ..ClassAttributes::default() },
    );
    class_module(
        &mut table,
        library,
        "Internal",
        ClassAttributes::default(),
    );

    let finder = DeclarationFinder::new(&table);
    let context = CallingContext::new(first, calling, None);
    assert_eq!(
        finder.find_module_referenced_project(
            context,
            library,
            "exposed",
            DeclarationKind::ClassModule
        ),
        Some(exposed)
    );
    assert_eq!(
        finder.find_module_referenced_project(
            context,
            library,
            "Internal",
            DeclarationKind::ClassModule
        ),
        None
    );
}

#[test]
fn find_member_enclosing_module_only_matches_direct_members() {
    let mut table = DeclarationTable::new();
    let first = project(&mut table, "First");
    let calling = procedural_module(&mut table, first, "Caller", false);
    let other = procedural_module(&mut table, first, "Other", false);
    let own = member(
        &mut table,
        calling,
        "DoSomething",
        DeclarationKind::Subroutine,
        Accessibility::Private,
    );
    member(
        &mut table,
        other,
        "DoSomethingElse",
        DeclarationKind::Subroutine,
        Accessibility::Public,
    );

    let finder = DeclarationFinder::new(&table);
    let context = CallingContext::new(first, calling, None);
    assert_eq!(
        finder.find_member_enclosing_module(
            context,
            "dosomething",
            DeclarationKind::Subroutine
        ),
        Some(own)
    );
    assert_eq!(
        finder.find_member_enclosing_module(
            context,
            "DoSomethingElse",
            DeclarationKind::Subroutine
        ),
        None
    );
}

#[test]
fn find_member_enclosed_project_requires_a_unique_match() {
    let mut table = DeclarationTable::new();
    let first = project(&mut table, "First");
    let calling = procedural_module(&mut table, first, "Caller", false);
    let module_a = procedural_module(&mut table, first, "ModuleA", false);
    let module_b = procedural_module(&mut table, first, "ModuleB", false);
    let unique = member(
        &mut table,
        module_a,
        "OnlyHere",
        DeclarationKind::Function,
        Accessibility::Public,
    );
    member(
        &mut table,
        module_a,
        "Everywhere",
        DeclarationKind::Function,
        Accessibility::Public,
    );
    member(
        &mut table,
        module_b,
        "Everywhere",
        DeclarationKind::Function,
        Accessibility::Public,
    );

    let finder = DeclarationFinder::new(&table);
    let context = CallingContext::new(first, calling, None);
    assert_eq!(
        finder.find_member_enclosed_project(
            context,
            "OnlyHere",
            DeclarationKind::Function
        ),
        Some(unique)
    );
    assert_eq!(
        finder.find_member_enclosed_project(
            context,
            "Everywhere",
            DeclarationKind::Function
        ),
        None
    );
}

#[test]
fn find_member_enclosed_project_skips_the_calling_module() {
    let mut table = DeclarationTable::new();
    let first = project(&mut table, "First");
    let calling = procedural_module(&mut table, first, "Caller", false);
    member(
        &mut table,
        calling,
        "DoSomething",
        DeclarationKind::Subroutine,
        Accessibility::Public,
    );

    let finder = DeclarationFinder::new(&table);
    let context = CallingContext::new(first, calling, None);
    assert_eq!(
        finder.find_member_enclosed_project(
            context,
            "DoSomething",
            DeclarationKind::Subroutine
        ),
        None
    );
}

#[test]
fn project_scope_lookups_never_see_procedure_locals() {
    let mut table = DeclarationTable::new();
    let first = project(&mut table, "First");
    let calling = procedural_module(&mut table, first, "Caller", false);
    let enclosing = member(
        &mut table,
        calling,
        "DoSomething",
        DeclarationKind::Subroutine,
        Accessibility::Public,
    );
    let local = member(
        &mut table,
        enclosing,
        "x",
        DeclarationKind::Variable,
        Accessibility::Implicit,
    );
    let other = procedural_module(&mut table, first, "Other", false);
    let other_member = member(
        &mut table,
        other,
        "DoSomethingElse",
        DeclarationKind::Subroutine,
        Accessibility::Public,
    );
    member(
        &mut table,
        other_member,
        "y",
        DeclarationKind::Variable,
        Accessibility::Implicit,
    );

    let finder = DeclarationFinder::new(&table);
    let context = CallingContext::new(first, calling, Some(enclosing));

    // the local is reachable through the enclosing-member rule, but it is
    // not a member of any module
    assert!(crate::accessibility::is_accessible(
        &table,
        Some(first),
        Some(calling),
        Some(enclosing),
        Some(local)
    ));
    assert_eq!(
        finder.find_member_enclosed_project(
            context,
            "x",
            DeclarationKind::Variable
        ),
        None
    );
    assert_eq!(
        finder.find_member_enclosed_project(
            context,
            "y",
            DeclarationKind::Variable
        ),
        None
    );
    assert_eq!(
        finder.find_member_referenced_project(
            context,
            first,
            "x",
            DeclarationKind::Variable
        ),
        None
    );
}

#[test]
fn find_member_referenced_project_filters_accessibility() {
    let mut table = DeclarationTable::new();
    let first = project(&mut table, "First");
    let library = project(&mut table, "Library");
    let calling = procedural_module(&mut table, first, "Caller", false);
    let module = procedural_module(&mut table, library, "Globals", false);
    let public = member(
        &mut table,
        module,
        "Shared",
        DeclarationKind::Function,
        Accessibility::Public,
    );
    member(
        &mut table,
        module,
        "Secret",
        DeclarationKind::Function,
        Accessibility::Private,
    );

    let finder = DeclarationFinder::new(&table);
    let context = CallingContext::new(first, calling, None);
    assert_eq!(
        finder.find_member_referenced_project(
            context,
            library,
            "shared",
            DeclarationKind::Function
        ),
        Some(public)
    );
    assert_eq!(
        finder.find_member_referenced_project(
            context,
            library,
            "Secret",
            DeclarationKind::Function
        ),
        None
    );
}

#[test]
fn in_module_lookups_validate_the_module_owner() {
    let mut table = DeclarationTable::new();
    let first = project(&mut table, "First");
    let library = project(&mut table, "Library");
    let calling = procedural_module(&mut table, first, "Caller", false);
    let own_module = procedural_module(&mut table, first, "Own", false);
    let library_module =
        procedural_module(&mut table, library, "Globals", false);
    let own_member = member(
        &mut table,
        own_module,
        "Value",
        DeclarationKind::Function,
        Accessibility::Public,
    );
    let library_member = member(
        &mut table,
        library_module,
        "Value",
        DeclarationKind::Function,
        Accessibility::Public,
    );

    let finder = DeclarationFinder::new(&table);
    let context = CallingContext::new(first, calling, None);

    assert_eq!(
        finder.find_member_enclosed_project_in_module(
            context,
            own_module,
            "Value",
            DeclarationKind::Function
        ),
        Some(own_member)
    );
    // the library module is not part of the calling project
    assert_eq!(
        finder.find_member_enclosed_project_in_module(
            context,
            library_module,
            "Value",
            DeclarationKind::Function
        ),
        None
    );

    // no reference edge yet
    assert_eq!(
        finder.find_member_referenced_project_in_module(
            context,
            library_module,
            "Value",
            DeclarationKind::Function
        ),
        None
    );

    table.add_project_reference(first, library);
    let finder = DeclarationFinder::new(&table);
    assert_eq!(
        finder.find_member_referenced_project_in_module(
            context,
            library_module,
            "Value",
            DeclarationKind::Function
        ),
        Some(library_member)
    );
}
