//! Synthesizes the special-form declarations (`Array`, `Input`, `InputB`,
//! `LBound`, `UBound`) into the standard library's `Information` module.
//!
//! These forms are part of the language but absent from the type library the
//! standard library is loaded from, so name resolution would otherwise never
//! see them. Loading is skipped entirely when a global built-in `Err`
//! variable already exists, since that signals the host's own declarations
//! were loaded and the forms came in with them.

use vbsem_table::{
    finder::DeclarationFinder, Accessibility, Declaration, DeclarationId,
    DeclarationKind, DeclarationTable, ParameterDetail, QualifiedMemberName,
    QualifiedModuleName, Selection,
};


/// Inserts the special-form declarations into the `Information` module of
/// the `VBA` project, returning the ids of the forms that were added.
///
/// Returns an empty list when the guard declaration is present, when no
/// `VBA` project is loaded, or when that project has no `Information`
/// module. A form whose name is already taken in the module is skipped, so
/// repeated loads are harmless.
pub fn load_special_forms(table: &mut DeclarationTable) -> Vec<DeclarationId> {
    let Some(information) = find_information_module(table) else {
        return Vec::new();
    };
    let module_name = table[information].qualified_name().module.clone();

    let mut loaded = Vec::new();

    if let Some(array) = insert_form(
        table,
        information,
        &module_name,
        "Array",
        DeclarationKind::Function,
        "Variant",
    ) {
        loaded.push(array);
    }

    for input_name in ["Input", "InputB"] {
        if let Some(input) = insert_form(
            table,
            information,
            &module_name,
            input_name,
            DeclarationKind::Subroutine,
            "Variant",
        ) {
            insert_parameter(
                table,
                &module_name,
                input,
                "Number",
                "Integer",
                ParameterDetail::default(),
            );
            insert_parameter(
                table,
                &module_name,
                input,
                "Filenumber",
                "Integer",
                ParameterDetail::default(),
            );
            loaded.push(input);
        }
    }

    for bound_name in ["LBound", "UBound"] {
        if let Some(bound) = insert_form(
            table,
            information,
            &module_name,
            bound_name,
            DeclarationKind::Function,
            "Long",
        ) {
            insert_parameter(
                table,
                &module_name,
                bound,
                "Arrayname",
                "Variant",
                ParameterDetail::new(false, true, false),
            );
            insert_parameter(
                table,
                &module_name,
                bound,
                "Dimension",
                "Long",
                ParameterDetail::new(true, false, false),
            );
            loaded.push(bound);
        }
    }

    log::debug!("synthesized {} special-form declarations", loaded.len());
    loaded
}

fn find_information_module(
    table: &DeclarationTable,
) -> Option<DeclarationId> {
    let finder = DeclarationFinder::new(table);

    let err_is_declared =
        finder.matching("Err").any(|(_, declaration)| {
            declaration.is_built_in()
                && declaration.kind() == DeclarationKind::Variable
                && declaration.accessibility() == Accessibility::Global
        });
    if err_is_declared {
        return None;
    }

    let vba = finder.find_project("VBA")?;
    finder.find_std_module(vba, "Information", true)
}

fn insert_form(
    table: &mut DeclarationTable,
    module: DeclarationId,
    module_name: &QualifiedModuleName,
    name: &str,
    kind: DeclarationKind,
    as_type_name: &str,
) -> Option<DeclarationId> {
    table
        .insert(
            Declaration::member(
                QualifiedMemberName::new(module_name.clone(), name.to_owned()),
                module,
                kind,
                Accessibility::Public,
                Some(as_type_name.to_owned()),
            )
            .as_built_in()
            .with_selection(Selection::HOME),
        )
        .ok()
}

fn insert_parameter(
    table: &mut DeclarationTable,
    module_name: &QualifiedModuleName,
    parent: DeclarationId,
    name: &str,
    as_type_name: &str,
    detail: ParameterDetail,
) {
    if table
        .insert(
            Declaration::parameter(
                QualifiedMemberName::new(module_name.clone(), name.to_owned()),
                parent,
                Some(as_type_name.to_owned()),
                detail,
            )
            .as_built_in(),
        )
        .is_err()
    {
        log::warn!("parameter `{name}` already declared on special form");
    }
}
