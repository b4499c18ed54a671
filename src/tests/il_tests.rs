use super::*;
use crate::*;

fn widget_ref() -> TypeRef {
    TypeRef::new("Sample", "Widget")
}

fn accessor(name: &str) -> MethodDef {
    let mut method = MethodDef::new(name);
    method.is_special_name = true;
    method.declaring_type = Some(widget_ref());
    method
}

fn size_property(getter: bool, setter: bool) -> PropertyDef {
    let mut get = accessor("get_Size");
    get.return_type = int32();
    let mut set = accessor("set_Size");
    set.parameters.push(Parameter {
        name: "value".to_string(),
        param_type: int32(),
    });
    PropertyDef {
        name: "Size".to_string(),
        declaring_type: Some(widget_ref()),
        property_type: int32(),
        parameters: Vec::new(),
        get_method: getter.then_some(get),
        set_method: setter.then_some(set),
        other_methods: Vec::new(),
    }
}

fn small_assembly(with_manifest: bool) -> LoadedAssembly {
    let mut module = ModuleDef::new("Sample.dll");
    module.assembly_refs.push(AssemblyRef {
        name: "mscorlib".to_string(),
        version: [4, 0, 0, 0],
        culture: None,
        public_key_token: Some(vec![0xB7, 0x7A, 0x5C, 0x56, 0x19, 0x34, 0xE0, 0x89]),
    });
    let mut empty = TypeDef::new("Sample", "Empty");
    empty.visibility = TypeVisibility::Public;
    empty.base_type = Some(TypeRef::new("System", "Object").with_scope("mscorlib"));
    module.types.push(empty);

    let assembly = with_manifest.then(|| AssemblyDef {
        name: "Sample".to_string(),
        version: [1, 2, 0, 0],
        culture: None,
        public_key_token: None,
        hash_algorithm: None,
        is_windows_runtime: false,
        custom_attributes: Vec::new(),
    });
    let mut loaded = LoadedAssembly {
        file_name: "Sample.dll".to_string(),
        assembly,
        module,
    };
    loaded.link();
    loaded
}

const MODULE_HEADER: &str = ".module Sample.dll
.imagebase 0x00400000
.file alignment 0x00000200
.stackreserve 0x00100000
.subsystem 0x0003
.corflags 0x00000001
";

#[test]
fn test_property_signature_then_getter_then_setter() {
    let property = size_property(true, true);
    for language in [IlLanguage::flat(), IlLanguage::structured()] {
        let options = DecompilationOptions::new();
        let text = render_with(|out| language.decompile_property(&property, out, &options));
        let expected = "\
.property instance int32 Size()
{
\t.get instance int32 Sample.Widget::get_Size()
\t.set instance void Sample.Widget::set_Size(int32)
} // end of property Widget::Size

.method public hidebysig specialname instance int32 get_Size() cil managed
{
} // end of method Widget::get_Size

.method public hidebysig specialname instance void set_Size(int32 value) cil managed
{
} // end of method Widget::set_Size
";
        assert_text_eq(expected, &text);
    }
}

#[test]
fn test_property_missing_accessor_leaves_no_gap() {
    let language = IlLanguage::flat();
    let options = DecompilationOptions::new();

    let getter_only = render_with(|out| {
        language.decompile_property(&size_property(true, false), out, &options)
    });
    let setter_only = render_with(|out| {
        language.decompile_property(&size_property(false, true), out, &options)
    });
    let neither = render_with(|out| {
        language.decompile_property(&size_property(false, false), out, &options)
    });

    for text in [&getter_only, &setter_only] {
        assert_eq!(text.lines().filter(|l| l.is_empty()).count(), 1);
        assert_eq!(text.matches(".method ").count(), 1);
    }
    assert!(getter_only.contains("get_Size() cil managed"));
    assert!(setter_only.contains("set_Size(int32 value) cil managed"));
    assert!(!neither.contains(".method "));
    assert!(!neither.lines().any(|l| l.is_empty()));
}

#[test]
fn test_property_other_accessors_keep_their_order() {
    let mut property = size_property(true, false);
    property.other_methods = vec![accessor("reset_Size"), accessor("audit_Size")];
    let options = DecompilationOptions::new();
    let text = render_with(|out| IlLanguage::flat().decompile_property(&property, out, &options));

    let methods: Vec<&str> = text
        .lines()
        .filter(|l| l.starts_with(".method "))
        .collect();
    assert_eq!(methods.len(), 3);
    assert!(methods[0].contains("get_Size"));
    assert!(methods[1].contains("reset_Size"));
    assert!(methods[2].contains("audit_Size"));
    assert!(text.contains("\t.other instance void Sample.Widget::reset_Size()\n\t.other instance void Sample.Widget::audit_Size()\n"));
}

#[test]
fn test_event_add_then_remove() {
    let assembly = sample_assembly();
    let event = &widget(&assembly).events[0];
    let options = DecompilationOptions::new();
    let text = render_with(|out| IlLanguage::structured().decompile_event(event, out, &options));

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], ".event [mscorlib]System.EventHandler Changed");
    assert!(lines.contains(&"\t.addon instance void Sample.Widget::add_Changed(class [mscorlib]System.EventHandler)"));
    assert!(lines.contains(&"} // end of event Widget::Changed"));

    let add = text.find("void add_Changed(").expect("add accessor");
    let remove = text.find("void remove_Changed(").expect("remove accessor");
    assert!(add < remove);
    assert!(text.contains("} // end of event Widget::Changed\n\n.method "));
}

#[test]
fn test_event_missing_accessor_leaves_no_gap() {
    let assembly = sample_assembly();
    let mut event = widget(&assembly).events[0].clone();
    event.remove_method = None;
    let options = DecompilationOptions::new();

    for language in [IlLanguage::flat(), IlLanguage::structured()] {
        let text = render_with(|out| language.decompile_event(&event, out, &options));
        assert_eq!(text.lines().filter(|l| l.is_empty()).count(), 1);
        assert_eq!(text.matches(".method ").count(), 1);
        assert!(text.contains("} // end of event Widget::Changed\n\n.method "));
        assert!(text.contains("add_Changed("));
        assert!(!text.contains("remove_Changed"));
        assert!(text.ends_with("} // end of method Widget::add_Changed\n"));
    }
}

#[test]
fn test_assembly_without_full_decompilation() {
    let assembly = small_assembly(true);
    let options = DecompilationOptions::new();
    let text = render_with(|out| IlLanguage::flat().decompile_assembly(&assembly, out, &options));

    let expected = format!(
        "// Sample.dll\n\n.assembly Sample\n{{\n\t.ver 1:2:0:0\n}}\n\n{}",
        MODULE_HEADER
    );
    assert_text_eq(&expected, &text);
}

#[test]
fn test_assembly_with_full_decompilation() {
    let assembly = small_assembly(true);
    let options = DecompilationOptions::full();
    let text = render_with(|out| IlLanguage::flat().decompile_assembly(&assembly, out, &options));

    let expected = format!(
        "// Sample.dll\n\n\
.assembly extern mscorlib\n{{\n\t.publickeytoken = (B7 7A 5C 56 19 34 E0 89)\n\t.ver 4:0:0:0\n}}\n\
.assembly Sample\n{{\n\t.ver 1:2:0:0\n}}\n\n\
{}\n\n\
.namespace Sample\n{{\n\
\t.class public auto ansi Sample.Empty\n\
\t\textends [mscorlib]System.Object\n\
\t{{\n\
\t}} // end of class Sample.Empty\n\
\n\
}} // end of namespace Sample\n",
        MODULE_HEADER
    );
    assert_text_eq(&expected, &text);
}

#[test]
fn test_assembly_without_manifest_still_writes_module_header() {
    let assembly = small_assembly(false);
    let options = DecompilationOptions::new();
    let text = render_with(|out| IlLanguage::structured().decompile_assembly(&assembly, out, &options));

    assert_text_eq(&format!("// Sample.dll\n\n\n{}", MODULE_HEADER), &text);
}

#[test]
fn test_assembly_file_name_line_is_a_comment_token() {
    let assembly = small_assembly(true);
    let mut output = TokenTextOutput::new();
    IlLanguage::flat()
        .decompile_assembly(&assembly, &mut output, &DecompilationOptions::new())
        .unwrap();
    assert_eq!(output.tokens_on_line(0), vec![TextTokenType::Comment]);
    assert!(output.lines()[1].spans.is_empty());
}

#[test]
fn test_full_sample_sections_in_order() {
    let assembly = sample_assembly();
    let options = DecompilationOptions::full();
    let text = render_with(|out| IlLanguage::flat().decompile_assembly(&assembly, out, &options));

    let positions: Vec<usize> = [
        "// Sample.dll",
        ".assembly extern mscorlib",
        ".assembly Sample",
        ".module Sample.dll",
        ".namespace Sample\n",
        ".namespace Sample.Util",
    ]
    .iter()
    .map(|needle| text.find(needle).unwrap_or_else(|| panic!("missing {}", needle)))
    .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{:?}", positions);

    assert!(text.contains(
        "\t.custom instance void [mscorlib]System.Reflection.AssemblyTitleAttribute::.ctor(string) = ( 01 00 06 53 61 6D 70 6C 65 00 00 )\n"
    ));
    assert!(text.contains("\t.hash algorithm 0x00008004\n"));
    assert!(text.contains("// MVID: {6f1c1a52-0b4e-4b8e-9d1e-0c7c5d0a8f11}\n"));
    // IShape shares the first namespace block with Widget.
    let shape = text.find("Sample.IShape").unwrap();
    assert!(shape < text.find(".namespace Sample.Util").unwrap());
}

#[test]
fn test_type_to_string_uses_il_name_syntax() {
    let language = IlLanguage::flat();
    let nested = TypeRef::new("", "Entry").nested_in(TypeRef::new("Lib", "Table").with_scope("lib"));

    assert_eq!(language.type_to_string(Some(&int32()), true, None), "[mscorlib]System.Int32");
    assert_eq!(language.type_to_string(Some(&int32()), false, None), "Int32");
    assert_eq!(language.type_to_string(Some(&nested), true, None), "[lib]Lib.Table/Entry");
    assert_eq!(
        language.type_to_string(Some(&TypeRef::new("", "<Module>")), false, None),
        "'<Module>'"
    );
    assert_eq!(language.type_to_string(None, true, None), "");
    assert_eq!(IlLanguage::structured().type_to_string(None, false, None), "");
}

#[test]
fn test_il_tooltip_for_types_uses_il_names() {
    let language = IlLanguage::flat();
    let ty = int32();
    assert_eq!(language.get_tooltip(MemberRef::Type(&ty)), "[mscorlib]System.Int32");

    let assembly = sample_assembly();
    let getter = widget(&assembly).properties[0].get_method.as_ref().unwrap();
    assert_eq!(
        language.get_tooltip(MemberRef::Method(getter)),
        "System.Int32 Sample.Widget::get_Size()"
    );
}

#[test]
fn test_cancellation_stops_before_next_method() {
    let assembly = sample_assembly();
    let ty = widget(&assembly);
    let token = CancellationToken::new();
    let options = DecompilationOptions::full().with_cancellation(token.clone());
    let mut output = CancellingOutput::new(token.clone(), "end of method Widget::.ctor");

    let result = IlLanguage::flat().decompile_type(ty, &mut output, &options);

    assert_eq!(result, Err(RenderError::Cancelled));
    assert!(token.is_cancelled());
    let text = output.inner.into_string();
    assert!(text.contains("} // end of method Widget::.ctor"));
    assert!(!text.contains("Dispose"));
    assert!(!text.contains("end of class Sample.Widget"));
}

#[test]
fn test_cancelled_before_start_writes_nothing_from_engine() {
    let assembly = sample_assembly();
    let token = CancellationToken::new();
    token.cancel();
    let options = DecompilationOptions::full().with_cancellation(token);
    let mut output = PlainTextOutput::new();

    let result = IlLanguage::flat().decompile_assembly(&assembly, &mut output, &options);

    assert!(matches!(result, Err(ref e) if e.is_cancelled()));
    assert_eq!(output.as_str(), "// Sample.dll\n\n");
}

#[test]
fn test_rendering_twice_is_identical() {
    let assembly = sample_assembly();
    for language in [IlLanguage::flat(), IlLanguage::structured()] {
        let options = DecompilationOptions::full();
        let first = render_with(|out| language.decompile_assembly(&assembly, out, &options));
        let second = render_with(|out| language.decompile_assembly(&assembly, out, &options));
        assert_eq!(first, second);
    }
}

#[test]
fn test_il_language_identity() {
    assert_eq!(IlLanguage::flat().name(), "IL");
    assert_eq!(IlLanguage::structured().name(), "IL (structured)");
    assert_eq!(IlLanguage::flat().file_extension(), ".il");
    assert_eq!(IlLanguage::structured().mode(), IlMode::Structured);
    assert_eq!(IlLanguage::flat().project_file_extension(), None);
}

#[test]
fn test_il_naming_helpers_reject_null() {
    let language = IlLanguage::structured();
    assert_eq!(
        language.format_property_name(None, Some(true)),
        Err(RenderError::ArgumentNull { parameter: "property" })
    );
    assert_eq!(
        language.format_type_name(None),
        Err(RenderError::ArgumentNull { parameter: "type" })
    );
}
