//! Default renderings shared by every [`Language`].

use crate::error::{RenderError, RenderResult};
use crate::language::Language;
use crate::metadata::*;
use crate::output::TextOutput;

fn member_comment<L: Language + ?Sized>(
    language: &L,
    declaring: Option<&TypeRef>,
    name: &str,
    output: &mut dyn TextOutput,
) {
    let declaring = language.type_to_string(declaring, true, None);
    language.write_comment_line(output, &format!("{}.{}", declaring, name));
}

pub fn decompile_method<L: Language + ?Sized>(
    language: &L,
    method: &MethodDef,
    output: &mut dyn TextOutput,
) {
    member_comment(language, method.declaring_type.as_ref(), &method.name, output);
}

pub fn decompile_property<L: Language + ?Sized>(
    language: &L,
    property: &PropertyDef,
    output: &mut dyn TextOutput,
) {
    member_comment(language, property.declaring_type.as_ref(), &property.name, output);
}

pub fn decompile_field<L: Language + ?Sized>(
    language: &L,
    field: &FieldDef,
    output: &mut dyn TextOutput,
) {
    member_comment(language, field.declaring_type.as_ref(), &field.name, output);
}

pub fn decompile_event<L: Language + ?Sized>(
    language: &L,
    event: &EventDef,
    output: &mut dyn TextOutput,
) {
    member_comment(language, event.declaring_type.as_ref(), &event.name, output);
}

pub fn decompile_type<L: Language + ?Sized>(
    language: &L,
    ty: &TypeDef,
    output: &mut dyn TextOutput,
) {
    let name = language.type_to_string(Some(&ty.to_type_ref()), true, None);
    language.write_comment_line(output, &name);
}

pub fn decompile_namespace<L: Language + ?Sized>(
    language: &L,
    namespace: &str,
    _types: &[&TypeDef],
    output: &mut dyn TextOutput,
) {
    language.write_comment_line(output, namespace);
}

/// File name, then the assembly identity (or the module name when the
/// binary has no assembly manifest).
pub fn decompile_assembly<L: Language + ?Sized>(
    language: &L,
    assembly: &LoadedAssembly,
    output: &mut dyn TextOutput,
) {
    language.write_comment_line(output, &assembly.file_name);
    match &assembly.assembly {
        Some(definition) if definition.is_windows_runtime => {
            language.write_comment_line(output, &format!("{} [WinRT]", definition.name));
        }
        Some(definition) => language.write_comment_line(output, &definition.full_name()),
        None => language.write_comment_line(output, &assembly.module.name),
    }
}

pub fn type_to_string(ty: Option<&TypeRef>, include_namespace: bool) -> String {
    match ty {
        None => String::new(),
        Some(ty) if include_namespace => ty.full_name(),
        Some(ty) => ty.name.clone(),
    }
}

pub fn get_tooltip<L: Language + ?Sized>(language: &L, member: MemberRef<'_>) -> String {
    match member {
        MemberRef::Type(ty) => language.type_to_string(Some(ty), true, None),
        MemberRef::TypeDef(ty) => language.type_to_string(Some(&ty.to_type_ref()), true, None),
        other => other.to_string(),
    }
}

pub fn format_property_name(property: Option<&PropertyDef>) -> RenderResult<String> {
    property
        .map(|p| p.name.clone())
        .ok_or_else(|| RenderError::argument_null("property"))
}

pub fn format_type_name(ty: Option<&TypeDef>) -> RenderResult<String> {
    ty.map(|t| t.name.clone())
        .ok_or_else(|| RenderError::argument_null("type"))
}
