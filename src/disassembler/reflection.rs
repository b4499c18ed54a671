use tracing::trace;

use crate::disassembler::names::*;
use crate::error::RenderResult;
use crate::metadata::*;
use crate::options::CancellationToken;
use crate::output::{TextOutput, TextTokenType};

/// Layout of method bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IlMode {
    /// Linear instruction stream; exception handlers summarized as `.try` lines.
    Flat,
    /// Instructions nested inside their recovered control structures.
    Structured,
}

/// Writes IL listings of metadata entities into a [`TextOutput`].
///
/// One instance serves a single render call. Cancellation is checked before
/// every entity and periodically inside method bodies.
pub struct ReflectionDisassembler<'a> {
    output: &'a mut dyn TextOutput,
    pub(crate) mode: IlMode,
    cancellation: CancellationToken,
    indent: usize,
    at_line_start: bool,
}

impl<'a> ReflectionDisassembler<'a> {
    pub fn new(
        output: &'a mut dyn TextOutput,
        mode: IlMode,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            output,
            mode,
            cancellation,
            indent: 0,
            at_line_start: true,
        }
    }

    /// The underlying sink, for callers that interleave their own lines.
    pub fn output(&mut self) -> &mut dyn TextOutput {
        &mut *self.output
    }

    pub(crate) fn check_cancelled(&self) -> RenderResult {
        self.cancellation.check()
    }

    fn begin_text(&mut self) {
        if self.at_line_start {
            if self.indent > 0 {
                self.output.write(&"\t".repeat(self.indent), TextTokenType::Text);
            }
            self.at_line_start = false;
        }
    }

    pub(crate) fn write(&mut self, text: &str, token: TextTokenType) {
        if text.is_empty() {
            return;
        }
        self.begin_text();
        self.output.write(text, token);
    }

    pub(crate) fn write_line(&mut self) {
        self.output.write_line();
        self.at_line_start = true;
    }

    pub(crate) fn line(&mut self, text: &str, token: TextTokenType) {
        self.write(text, token);
        self.write_line();
    }

    pub(crate) fn indent(&mut self) {
        self.indent += 1;
    }

    pub(crate) fn unindent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub(crate) fn write_type(&mut self, ty: &TypeRef, syntax: IlNameSyntax) {
        self.begin_text();
        super::names::write_type(&mut *self.output, ty, syntax);
    }

    fn open_block(&mut self) {
        self.line("{", TextTokenType::Text);
        self.indent();
    }

    fn close_block(&mut self, comment: &str) {
        self.unindent();
        self.write("}", TextTokenType::Text);
        if !comment.is_empty() {
            self.write(&format!(" // {}", comment), TextTokenType::Comment);
        }
        self.write_line();
    }

    fn write_access(&mut self, access: MemberAccess) {
        let keyword = match access {
            MemberAccess::PrivateScope => "privatescope",
            MemberAccess::Private => "private",
            MemberAccess::FamilyAndAssembly => "famandassem",
            MemberAccess::Assembly => "assembly",
            MemberAccess::Family => "family",
            MemberAccess::FamilyOrAssembly => "famorassem",
            MemberAccess::Public => "public",
        };
        self.write(keyword, TextTokenType::Keyword);
        self.write(" ", TextTokenType::Text);
    }

    fn write_custom_attributes(&mut self, attributes: &[CustomAttribute]) {
        for attribute in attributes {
            self.write(".custom ", TextTokenType::Directive);
            self.write("instance void ", TextTokenType::Keyword);
            self.write_type(&attribute.attribute_type, IlNameSyntax::TypeName);
            self.write("::", TextTokenType::Text);
            self.write(".ctor", TextTokenType::MemberName);
            self.write("(", TextTokenType::Text);
            for (i, param) in attribute.parameters.iter().enumerate() {
                if i > 0 {
                    self.write(", ", TextTokenType::Text);
                }
                self.write_type(param, IlNameSyntax::Signature);
            }
            self.write(")", TextTokenType::Text);
            if !attribute.blob.is_empty() {
                self.write(" = ( ", TextTokenType::Text);
                self.write(&hex_bytes(&attribute.blob), TextTokenType::Literal);
                self.write(" )", TextTokenType::Text);
            }
            self.write_line();
        }
    }

    /// `[instance ]ret Decl::name(params)`, as used by accessor and call references.
    pub(crate) fn write_method_reference(
        &mut self,
        has_this: bool,
        return_type: &TypeRef,
        declaring: Option<&TypeRef>,
        name: &str,
        parameters: &[&TypeRef],
    ) {
        if has_this {
            self.write("instance ", TextTokenType::Keyword);
        }
        self.write_type(return_type, IlNameSyntax::Signature);
        self.write(" ", TextTokenType::Text);
        if let Some(declaring) = declaring {
            self.write_type(declaring, IlNameSyntax::TypeName);
            self.write("::", TextTokenType::Text);
        }
        self.write(&escape_identifier(name), TextTokenType::MemberName);
        self.write("(", TextTokenType::Text);
        for (i, param) in parameters.iter().enumerate() {
            if i > 0 {
                self.write(", ", TextTokenType::Text);
            }
            self.write_type(param, IlNameSyntax::Signature);
        }
        self.write(")", TextTokenType::Text);
    }

    fn write_accessor(&mut self, directive: &str, method: &MethodDef) {
        self.write(directive, TextTokenType::Directive);
        self.write(" ", TextTokenType::Text);
        let params: Vec<&TypeRef> = method.parameters.iter().map(|p| &p.param_type).collect();
        self.write_method_reference(
            !method.is_static,
            &method.return_type,
            method.declaring_type.as_ref(),
            &method.name,
            &params,
        );
        self.write_line();
    }

    fn end_comment(kind: &str, declaring: Option<&TypeRef>, name: &str) -> String {
        match declaring {
            Some(declaring) => format!("end of {} {}::{}", kind, declaring.name, name),
            None => format!("end of {} {}", kind, name),
        }
    }

    pub fn disassemble_method(&mut self, method: &MethodDef) -> RenderResult {
        self.check_cancelled()?;
        trace!(method = %method.name, "disassembling method");

        self.write(".method ", TextTokenType::Directive);
        self.write_access(method.access);
        for (set, keyword) in [
            (method.is_hide_by_sig, "hidebysig "),
            (method.is_new_slot, "newslot "),
            (method.is_special_name, "specialname "),
            (method.is_rt_special_name, "rtspecialname "),
            (method.is_abstract, "abstract "),
            (method.is_virtual, "virtual "),
            (method.is_final, "final "),
            (method.is_static, "static "),
        ] {
            if set {
                self.write(keyword, TextTokenType::Keyword);
            }
        }
        if !method.is_static {
            self.write("instance ", TextTokenType::Keyword);
        }
        self.write_type(&method.return_type, IlNameSyntax::Signature);
        self.write(" ", TextTokenType::Text);
        self.write(&escape_identifier(&method.name), TextTokenType::MemberName);
        self.write("(", TextTokenType::Text);
        for (i, param) in method.parameters.iter().enumerate() {
            if i > 0 {
                self.write(", ", TextTokenType::Text);
            }
            self.write_type(&param.param_type, IlNameSyntax::Signature);
            self.write(" ", TextTokenType::Text);
            self.write(&escape_identifier(&param.name), TextTokenType::Text);
        }
        self.write(") ", TextTokenType::Text);
        self.line("cil managed", TextTokenType::Keyword);

        self.open_block();
        self.write_custom_attributes(&method.custom_attributes);
        if let Some(body) = &method.body {
            self.write_method_body(body)?;
        }
        let comment = Self::end_comment("method", method.declaring_type.as_ref(), &method.name);
        self.close_block(&comment);
        Ok(())
    }

    pub fn disassemble_field(&mut self, field: &FieldDef) -> RenderResult {
        self.check_cancelled()?;
        trace!(field = %field.name, "disassembling field");

        self.write(".field ", TextTokenType::Directive);
        self.write_access(field.access);
        for (set, keyword) in [
            (field.is_static, "static "),
            (field.is_init_only, "initonly "),
            (field.is_literal, "literal "),
        ] {
            if set {
                self.write(keyword, TextTokenType::Keyword);
            }
        }
        self.write_type(&field.field_type, IlNameSyntax::Signature);
        self.write(" ", TextTokenType::Text);
        self.write(&escape_identifier(&field.name), TextTokenType::MemberName);
        if let Some(constant) = &field.constant {
            self.write(" = ", TextTokenType::Text);
            let typed = |keyword: &str, value: String| format!("{}({})", keyword, value);
            let keyword = primitive_keyword(&field.field_type);
            let literal = match constant {
                Constant::Null => "nullref".to_string(),
                Constant::Bool(b) => typed("bool", b.to_string()),
                Constant::Int(i) => typed(keyword.unwrap_or("int32"), i.to_string()),
                Constant::Float(f) => typed(keyword.unwrap_or("float64"), f.to_string()),
                Constant::String(s) => quote_string(s),
            };
            self.write(&literal, TextTokenType::Literal);
        }
        self.write_line();
        Ok(())
    }

    /// The `.property` block only; accessor bodies are the caller's concern.
    pub fn disassemble_property(&mut self, property: &PropertyDef) -> RenderResult {
        self.check_cancelled()?;
        trace!(property = %property.name, "disassembling property");

        self.write(".property ", TextTokenType::Directive);
        if property.has_this() {
            self.write("instance ", TextTokenType::Keyword);
        }
        self.write_type(&property.property_type, IlNameSyntax::Signature);
        self.write(" ", TextTokenType::Text);
        self.write(&escape_identifier(&property.name), TextTokenType::MemberName);
        self.write("(", TextTokenType::Text);
        for (i, param) in property.parameters.iter().enumerate() {
            if i > 0 {
                self.write(", ", TextTokenType::Text);
            }
            self.write_type(&param.param_type, IlNameSyntax::Signature);
        }
        self.line(")", TextTokenType::Text);

        self.open_block();
        if let Some(getter) = &property.get_method {
            self.write_accessor(".get", getter);
        }
        if let Some(setter) = &property.set_method {
            self.write_accessor(".set", setter);
        }
        for other in &property.other_methods {
            self.write_accessor(".other", other);
        }
        let comment =
            Self::end_comment("property", property.declaring_type.as_ref(), &property.name);
        self.close_block(&comment);
        Ok(())
    }

    /// The `.event` block only; accessor bodies are the caller's concern.
    pub fn disassemble_event(&mut self, event: &EventDef) -> RenderResult {
        self.check_cancelled()?;
        trace!(event = %event.name, "disassembling event");

        self.write(".event ", TextTokenType::Directive);
        self.write_type(&event.event_type, IlNameSyntax::TypeName);
        self.write(" ", TextTokenType::Text);
        self.line(&escape_identifier(&event.name), TextTokenType::MemberName);

        self.open_block();
        if let Some(add) = &event.add_method {
            self.write_accessor(".addon", add);
        }
        if let Some(remove) = &event.remove_method {
            self.write_accessor(".removeon", remove);
        }
        for other in &event.other_methods {
            self.write_accessor(".other", other);
        }
        let comment = Self::end_comment("event", event.declaring_type.as_ref(), &event.name);
        self.close_block(&comment);
        Ok(())
    }

    pub fn disassemble_type(&mut self, ty: &TypeDef) -> RenderResult {
        self.check_cancelled()?;
        trace!(type_name = %ty.full_name(), "disassembling type");

        self.write(".class ", TextTokenType::Directive);
        if ty.is_interface {
            self.write("interface ", TextTokenType::Keyword);
        }
        let visibility = match ty.visibility {
            TypeVisibility::NotPublic => "private",
            TypeVisibility::Public => "public",
            TypeVisibility::NestedPublic => "nested public",
            TypeVisibility::NestedPrivate => "nested private",
            TypeVisibility::NestedFamily => "nested family",
            TypeVisibility::NestedAssembly => "nested assembly",
            TypeVisibility::NestedFamilyAndAssembly => "nested famandassem",
            TypeVisibility::NestedFamilyOrAssembly => "nested famorassem",
        };
        self.write(visibility, TextTokenType::Keyword);
        self.write(" auto ansi ", TextTokenType::Keyword);
        for (set, keyword) in [
            (ty.is_abstract || ty.is_interface, "abstract "),
            (ty.is_sealed, "sealed "),
            (ty.before_field_init, "beforefieldinit "),
        ] {
            if set {
                self.write(keyword, TextTokenType::Keyword);
            }
        }
        if ty.declaring_type.is_some() {
            self.write_type(&ty.to_type_ref(), IlNameSyntax::ShortTypeName);
        } else {
            self.write_type(&ty.to_type_ref(), IlNameSyntax::TypeName);
        }
        self.write_line();

        self.indent();
        if let Some(base) = &ty.base_type {
            self.write("extends ", TextTokenType::Keyword);
            self.write_type(base, IlNameSyntax::TypeName);
            self.write_line();
        }
        if !ty.interfaces.is_empty() {
            self.write("implements ", TextTokenType::Keyword);
            for (i, interface) in ty.interfaces.iter().enumerate() {
                if i > 0 {
                    self.write(", ", TextTokenType::Text);
                }
                self.write_type(interface, IlNameSyntax::TypeName);
            }
            self.write_line();
        }
        self.unindent();

        self.open_block();
        self.write_custom_attributes(&ty.custom_attributes);

        if !ty.nested_types.is_empty() {
            self.line("// Nested Types", TextTokenType::Comment);
            for nested in &ty.nested_types {
                self.disassemble_type(nested)?;
                self.write_line();
            }
        }
        if !ty.fields.is_empty() {
            self.line("// Fields", TextTokenType::Comment);
            for field in &ty.fields {
                self.disassemble_field(field)?;
            }
            self.write_line();
        }

        let accessors: Vec<&MethodDef> = ty
            .events
            .iter()
            .flat_map(|e| e.accessors())
            .chain(ty.properties.iter().flat_map(|p| p.accessors()))
            .collect();
        if !ty.methods.is_empty() || !accessors.is_empty() {
            self.line("// Methods", TextTokenType::Comment);
            for method in ty.methods.iter().chain(accessors) {
                self.disassemble_method(method)?;
                self.write_line();
            }
        }
        if !ty.events.is_empty() {
            self.line("// Events", TextTokenType::Comment);
            for event in &ty.events {
                self.disassemble_event(event)?;
                self.write_line();
            }
        }
        if !ty.properties.is_empty() {
            self.line("// Properties", TextTokenType::Comment);
            for property in &ty.properties {
                self.disassemble_property(property)?;
                self.write_line();
            }
        }

        let name = if ty.declaring_type.is_some() {
            ty.name.clone()
        } else {
            ty.full_name()
        };
        self.close_block(&format!("end of class {}", name));
        Ok(())
    }

    pub fn disassemble_namespace(&mut self, namespace: &str, types: &[&TypeDef]) -> RenderResult {
        self.check_cancelled()?;
        let named = !namespace.is_empty();
        if named {
            self.write(".namespace ", TextTokenType::Directive);
            self.line(namespace, TextTokenType::TypeName);
            self.open_block();
        }
        for ty in types {
            self.disassemble_type(ty)?;
            self.write_line();
        }
        if named {
            self.close_block(&format!("end of namespace {}", namespace));
        }
        Ok(())
    }

    fn write_version(&mut self, version: &[u16; 4]) {
        let [major, minor, build, revision] = version;
        self.write(".ver ", TextTokenType::Directive);
        self.line(
            &format!("{}:{}:{}:{}", major, minor, build, revision),
            TextTokenType::Literal,
        );
    }

    fn write_culture(&mut self, directive: &str, culture: Option<&str>) {
        if let Some(culture) = culture.filter(|c| !c.is_empty()) {
            self.write(directive, TextTokenType::Directive);
            self.write(" ", TextTokenType::Text);
            self.line(&quote_string(culture), TextTokenType::Literal);
        }
    }

    pub fn write_assembly_references(&mut self, module: &ModuleDef) -> RenderResult {
        for reference in &module.assembly_refs {
            self.check_cancelled()?;
            self.write(".assembly extern ", TextTokenType::Directive);
            self.line(&escape_identifier(&reference.name), TextTokenType::TypeName);
            self.open_block();
            if let Some(token) = reference.public_key_token.as_ref().filter(|t| !t.is_empty()) {
                self.write(".publickeytoken = ", TextTokenType::Directive);
                self.line(&format!("({})", hex_bytes(token)), TextTokenType::Literal);
            }
            self.write_culture(".culture", reference.culture.as_deref());
            self.write_version(&reference.version);
            self.close_block("");
        }
        Ok(())
    }

    pub fn write_assembly_header(&mut self, assembly: &AssemblyDef) -> RenderResult {
        self.check_cancelled()?;
        self.write(".assembly ", TextTokenType::Directive);
        if assembly.is_windows_runtime {
            self.write("windowsruntime ", TextTokenType::Keyword);
        }
        self.line(&escape_identifier(&assembly.name), TextTokenType::TypeName);
        self.open_block();
        self.write_custom_attributes(&assembly.custom_attributes);
        if let Some(algorithm) = assembly.hash_algorithm {
            self.write(".hash algorithm ", TextTokenType::Directive);
            self.line(&format!("0x{:08x}", algorithm), TextTokenType::Literal);
        }
        self.write_culture(".locale", assembly.culture.as_deref());
        self.write_version(&assembly.version);
        self.close_block("");
        Ok(())
    }

    pub fn write_module_header(&mut self, module: &ModuleDef) -> RenderResult {
        self.check_cancelled()?;
        self.write(".module ", TextTokenType::Directive);
        self.line(&escape_identifier(&module.name), TextTokenType::TypeName);
        if let Some(mvid) = &module.mvid {
            self.line(&format!("// MVID: {{{}}}", mvid), TextTokenType::Comment);
        }
        let entries = [
            (".imagebase", format!("0x{:08x}", module.image_base)),
            (".file alignment", format!("0x{:08x}", module.file_alignment)),
            (".stackreserve", format!("0x{:08x}", module.stack_reserve)),
            (".subsystem", format!("0x{:04x}", module.subsystem)),
            (".corflags", format!("0x{:08x}", module.corflags)),
        ];
        for (directive, value) in entries {
            self.write(directive, TextTokenType::Directive);
            self.write(" ", TextTokenType::Text);
            self.line(&value, TextTokenType::Literal);
        }
        Ok(())
    }

    /// All top-level types, one namespace block per namespace.
    pub fn write_module_contents(&mut self, module: &ModuleDef) -> RenderResult {
        for (namespace, types) in module.namespaces() {
            self.disassemble_namespace(namespace, &types)?;
        }
        Ok(())
    }
}
