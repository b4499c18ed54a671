use std::fmt;

use crate::error::RenderResult;
use crate::language::fallback;
use crate::metadata::*;
use crate::options::DecompilationOptions;
use crate::output::{TextOutput, TextTokenType};

/// An output language: one way of rendering metadata entities as text.
///
/// Every entity kind has a default rendering, a single comment line naming
/// the entity, so an implementation only overrides what it can render better.
/// The defaults live in [`fallback`] as free functions, which overriding
/// implementations may call to fall back explicitly.
///
/// Render calls never retain the entity, the sink or the options past the
/// call. Only [`format_property_name`](Language::format_property_name) and
/// [`format_type_name`](Language::format_type_name) reject missing input;
/// everything else degrades to empty or comment output.
pub trait Language: Send + Sync {
    /// Display name, as shown in language pickers.
    fn name(&self) -> &str;

    /// Extension of files holding output in this language, e.g. `.il`.
    fn file_extension(&self) -> &str;

    fn project_file_extension(&self) -> Option<&str> {
        None
    }

    fn decompile_method(
        &self,
        method: &MethodDef,
        output: &mut dyn TextOutput,
        _options: &DecompilationOptions,
    ) -> RenderResult {
        fallback::decompile_method(self, method, output);
        Ok(())
    }

    fn decompile_property(
        &self,
        property: &PropertyDef,
        output: &mut dyn TextOutput,
        _options: &DecompilationOptions,
    ) -> RenderResult {
        fallback::decompile_property(self, property, output);
        Ok(())
    }

    fn decompile_field(
        &self,
        field: &FieldDef,
        output: &mut dyn TextOutput,
        _options: &DecompilationOptions,
    ) -> RenderResult {
        fallback::decompile_field(self, field, output);
        Ok(())
    }

    fn decompile_event(
        &self,
        event: &EventDef,
        output: &mut dyn TextOutput,
        _options: &DecompilationOptions,
    ) -> RenderResult {
        fallback::decompile_event(self, event, output);
        Ok(())
    }

    fn decompile_type(
        &self,
        ty: &TypeDef,
        output: &mut dyn TextOutput,
        _options: &DecompilationOptions,
    ) -> RenderResult {
        fallback::decompile_type(self, ty, output);
        Ok(())
    }

    fn decompile_namespace(
        &self,
        namespace: &str,
        types: &[&TypeDef],
        output: &mut dyn TextOutput,
        _options: &DecompilationOptions,
    ) -> RenderResult {
        fallback::decompile_namespace(self, namespace, types, output);
        Ok(())
    }

    fn decompile_assembly(
        &self,
        assembly: &LoadedAssembly,
        output: &mut dyn TextOutput,
        _options: &DecompilationOptions,
    ) -> RenderResult {
        fallback::decompile_assembly(self, assembly, output);
        Ok(())
    }

    fn write_comment_line(&self, output: &mut dyn TextOutput, comment: &str) {
        output.write_line_with(&format!("// {}", comment), TextTokenType::Comment);
    }

    /// Textual form of a type reference, used for member listings and tooltips.
    /// A missing reference yields an empty string.
    fn type_to_string(
        &self,
        ty: Option<&TypeRef>,
        include_namespace: bool,
        _attributes: Option<&[CustomAttribute]>,
    ) -> String {
        fallback::type_to_string(ty, include_namespace)
    }

    /// Short summary shown when hovering a member reference.
    fn get_tooltip(&self, member: MemberRef<'_>) -> String {
        fallback::get_tooltip(self, member)
    }

    fn format_property_name(
        &self,
        property: Option<&PropertyDef>,
        _is_indexer: Option<bool>,
    ) -> RenderResult<String> {
        fallback::format_property_name(property)
    }

    fn format_type_name(&self, ty: Option<&TypeDef>) -> RenderResult<String> {
        fallback::format_type_name(ty)
    }

    /// Whether a member belongs in tree and listing views.
    fn show_member(&self, _member: MemberRef<'_>) -> bool {
        true
    }

    /// Map compiler-generated code back to the member it was generated for.
    fn get_original_code_location<'a>(&self, member: MemberRef<'a>) -> MemberRef<'a> {
        member
    }
}

impl fmt::Display for dyn Language + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for dyn Language + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language")
            .field("name", &self.name())
            .field("file_extension", &self.file_extension())
            .finish()
    }
}
