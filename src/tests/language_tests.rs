use super::*;
use crate::language::fallback;
use crate::*;

fn comments<F>(render: F) -> String
where
    F: FnOnce(&CommentLanguage, &mut dyn TextOutput, &DecompilationOptions) -> RenderResult,
{
    let options = DecompilationOptions::new();
    render_with(|out| render(&CommentLanguage, out, &options))
}

#[test]
fn test_members_render_as_declaring_type_and_name() {
    let assembly = sample_assembly();
    let ty = widget(&assembly);

    let method = comments(|l, out, o| l.decompile_method(&ty.methods[2], out, o));
    assert_eq!(method, "// Sample.Widget.Grow\n");

    let field = comments(|l, out, o| l.decompile_field(&ty.fields[1], out, o));
    assert_eq!(field, "// Sample.Widget.MaxSize\n");

    let property = comments(|l, out, o| l.decompile_property(&ty.properties[0], out, o));
    assert_eq!(property, "// Sample.Widget.Size\n");

    let event = comments(|l, out, o| l.decompile_event(&ty.events[0], out, o));
    assert_eq!(event, "// Sample.Widget.Changed\n");
}

#[test]
fn test_member_without_declaring_type_keeps_leading_dot() {
    let orphan = MethodDef::new("Orphan");
    let text = comments(|l, out, o| l.decompile_method(&orphan, out, o));
    assert_eq!(text, "// .Orphan\n");
}

#[test]
fn test_types_and_namespaces() {
    let assembly = sample_assembly();
    let ty = widget(&assembly);

    assert_eq!(comments(|l, out, o| l.decompile_type(ty, out, o)), "// Sample.Widget\n");
    assert_eq!(
        comments(|l, out, o| l.decompile_type(&ty.nested_types[0], out, o)),
        "// Sample.Widget/Enumerator\n"
    );

    let namespaces = assembly.module.namespaces();
    let (name, types) = &namespaces[1];
    assert_eq!(
        comments(|l, out, o| l.decompile_namespace(name, types, out, o)),
        "// Sample.Util\n"
    );
}

#[test]
fn test_default_assembly_rendering() {
    let mut assembly = sample_assembly();
    let text = comments(|l, out, o| l.decompile_assembly(&assembly, out, o));
    assert_eq!(
        text,
        "// Sample.dll\n// Sample, Version=1.2.0.0, Culture=neutral, PublicKeyToken=null\n"
    );

    if let Some(definition) = assembly.assembly.as_mut() {
        definition.is_windows_runtime = true;
    }
    let text = comments(|l, out, o| l.decompile_assembly(&assembly, out, o));
    assert_eq!(text, "// Sample.dll\n// Sample [WinRT]\n");

    assembly.assembly = None;
    let text = comments(|l, out, o| l.decompile_assembly(&assembly, out, o));
    assert_eq!(text, "// Sample.dll\n// Sample.dll\n");
}

#[test]
fn test_assembly_full_name_with_culture_and_token() {
    let definition = AssemblyDef {
        name: "Contoso".to_string(),
        version: [2, 0, 1, 7],
        culture: Some("fr-FR".to_string()),
        public_key_token: Some(vec![0xb7, 0x7a, 0x5c, 0x56]),
        hash_algorithm: None,
        is_windows_runtime: false,
        custom_attributes: Vec::new(),
    };
    assert_eq!(
        definition.full_name(),
        "Contoso, Version=2.0.1.7, Culture=fr-FR, PublicKeyToken=b77a5c56"
    );
}

#[test]
fn test_fallback_output_is_tagged_as_comment() {
    let assembly = sample_assembly();
    let mut output = TokenTextOutput::new();
    CommentLanguage
        .decompile_type(widget(&assembly), &mut output, &DecompilationOptions::new())
        .unwrap();

    let lines = output.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].spans.len(), 1);
    assert_eq!(lines[0].spans[0].token, TextTokenType::Comment);
    assert_eq!(lines[0].text(), "// Sample.Widget");
}

#[test]
fn test_default_type_to_string() {
    let nested = TypeRef::new("", "Enumerator").nested_in(TypeRef::new("Sample", "Widget"));
    assert_eq!(CommentLanguage.type_to_string(None, true, None), "");
    assert_eq!(CommentLanguage.type_to_string(Some(&int32()), true, None), "System.Int32");
    assert_eq!(CommentLanguage.type_to_string(Some(&int32()), false, None), "Int32");
    assert_eq!(
        CommentLanguage.type_to_string(Some(&nested), true, None),
        "Sample.Widget/Enumerator"
    );
}

#[test]
fn test_default_tooltips() {
    let assembly = sample_assembly();
    let ty = widget(&assembly);

    assert_eq!(CommentLanguage.get_tooltip(MemberRef::TypeDef(ty)), "Sample.Widget");
    assert_eq!(
        CommentLanguage.get_tooltip(MemberRef::from(&ty.methods[2])),
        "System.Void Sample.Widget::Grow(System.Int32)"
    );
    assert_eq!(
        CommentLanguage.get_tooltip(MemberRef::from(&ty.fields[0])),
        "System.Int32 Sample.Widget::size"
    );
    assert_eq!(
        CommentLanguage.get_tooltip(MemberRef::from(&ty.events[0])),
        "System.EventHandler Sample.Widget::Changed"
    );
}

#[test]
fn test_naming_helpers() {
    let assembly = sample_assembly();
    let ty = widget(&assembly);

    assert_eq!(
        CommentLanguage.format_property_name(Some(&ty.properties[0]), None),
        Ok("Size".to_string())
    );
    assert_eq!(
        CommentLanguage.format_property_name(Some(&ty.properties[0]), Some(true)),
        Ok("Size".to_string())
    );
    assert_eq!(CommentLanguage.format_type_name(Some(&ty.nested_types[0])), Ok("Enumerator".to_string()));

    assert_eq!(
        CommentLanguage.format_property_name(None, Some(false)),
        Err(RenderError::ArgumentNull { parameter: "property" })
    );
    let err = CommentLanguage.format_type_name(None).unwrap_err();
    assert_eq!(err, RenderError::argument_null("type"));
    assert_eq!(err.to_string(), "argument `type` must not be null");
}

#[test]
fn test_visibility_and_code_location_defaults() {
    let assembly = sample_assembly();
    let ty = widget(&assembly);
    let nested = MemberRef::TypeDef(&ty.nested_types[0]);

    assert!(CommentLanguage.show_member(nested));
    assert!(IlLanguage::flat().show_member(MemberRef::from(&ty.methods[0])));
    assert_eq!(CommentLanguage.get_original_code_location(nested), nested);
    assert!(nested.is_type());
    assert_eq!(nested.name(), "Enumerator");
}

/// Overrides types only and falls back for everything else.
struct BannerLanguage;

impl Language for BannerLanguage {
    fn name(&self) -> &str {
        "Banner"
    }

    fn file_extension(&self) -> &str {
        ".banner"
    }

    fn decompile_type(
        &self,
        ty: &TypeDef,
        output: &mut dyn TextOutput,
        _options: &DecompilationOptions,
    ) -> RenderResult {
        output.write_line_with(&format!("== {} ==", ty.name), TextTokenType::Text);
        fallback::decompile_type(self, ty, output);
        Ok(())
    }

    fn write_comment_line(&self, output: &mut dyn TextOutput, comment: &str) {
        output.write_line_with(&format!("# {}", comment), TextTokenType::Comment);
    }
}

#[test]
fn test_custom_language_reuses_fallbacks() {
    let assembly = sample_assembly();
    let ty = widget(&assembly);
    let options = DecompilationOptions::new();

    let text = render_with(|out| BannerLanguage.decompile_type(ty, out, &options));
    assert_eq!(text, "== Widget ==\n# Sample.Widget\n");

    let text = render_with(|out| BannerLanguage.decompile_field(&ty.fields[0], out, &options));
    assert_eq!(text, "# Sample.Widget.size\n");
    assert_eq!(BannerLanguage.project_file_extension(), None);
}

#[test]
fn test_registry_defaults_and_lookup() {
    let languages = Languages::with_defaults();
    assert_eq!(languages.names(), vec!["IL", "IL (structured)", "Comments"]);
    assert_eq!(languages.len(), 3);
    assert!(!languages.is_empty());

    assert_eq!(languages.get("il").map(|l| l.name()), Some("IL"));
    assert_eq!(languages.get("il-structured").map(|l| l.name()), Some("IL (structured)"));
    assert_eq!(languages.get("COMMENTS").map(|l| l.file_extension()), Some(".txt"));
    assert!(languages.get("csharp").is_none());

    let extensions: Vec<&str> = languages.all().map(|l| l.file_extension()).collect();
    assert_eq!(extensions, vec![".il", ".il", ".txt"]);
}

#[test]
fn test_registry_keeps_first_of_duplicate_names() {
    let mut languages = Languages::new();
    assert!(languages.is_empty());
    languages.register(Box::new(CommentLanguage));
    languages.register(Box::new(BannerLanguage));
    languages.register(Box::new(CommentLanguage));

    assert_eq!(languages.len(), 3);
    assert_eq!(languages.get("banner").map(|l| l.file_extension()), Some(".banner"));
    assert_eq!(languages.names(), vec!["Comments", "Banner", "Comments"]);
}

#[test]
fn test_dyn_language_display_and_debug() {
    let languages = Languages::default();
    let structured = languages.get("IL (structured)").unwrap();
    assert_eq!(structured.to_string(), "IL (structured)");
    assert_eq!(
        format!("{:?}", structured),
        "Language { name: \"IL (structured)\", file_extension: \".il\" }"
    );
}
