use tracing::debug;

use crate::disassembler::{write_type, IlMode, IlNameSyntax, ReflectionDisassembler};
use crate::error::RenderResult;
use crate::language::Language;
use crate::metadata::*;
use crate::options::DecompilationOptions;
use crate::output::{PlainTextOutput, TextOutput, TextTokenType};

/// IL listing, in flat or structured form.
///
/// Holds nothing but its mode; every call builds its own
/// [`ReflectionDisassembler`], so one instance can be shared freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IlLanguage {
    mode: IlMode,
}

impl IlLanguage {
    pub fn new(mode: IlMode) -> Self {
        Self { mode }
    }

    pub fn flat() -> Self {
        Self::new(IlMode::Flat)
    }

    pub fn structured() -> Self {
        Self::new(IlMode::Structured)
    }

    pub fn mode(&self) -> IlMode {
        self.mode
    }

    fn disassembler<'o>(
        &self,
        output: &'o mut dyn TextOutput,
        options: &DecompilationOptions,
    ) -> ReflectionDisassembler<'o> {
        ReflectionDisassembler::new(output, self.mode, options.cancellation.clone())
    }
}

impl Language for IlLanguage {
    fn name(&self) -> &str {
        match self.mode {
            IlMode::Flat => "IL",
            IlMode::Structured => "IL (structured)",
        }
    }

    fn file_extension(&self) -> &str {
        ".il"
    }

    fn decompile_method(
        &self,
        method: &MethodDef,
        output: &mut dyn TextOutput,
        options: &DecompilationOptions,
    ) -> RenderResult {
        debug!(language = self.name(), method = %method.name, "decompiling method");
        self.disassembler(output, options).disassemble_method(method)
    }

    fn decompile_field(
        &self,
        field: &FieldDef,
        output: &mut dyn TextOutput,
        options: &DecompilationOptions,
    ) -> RenderResult {
        debug!(language = self.name(), field = %field.name, "decompiling field");
        self.disassembler(output, options).disassemble_field(field)
    }

    /// The `.property` block, then getter, setter and other accessors, each
    /// after a blank line.
    fn decompile_property(
        &self,
        property: &PropertyDef,
        output: &mut dyn TextOutput,
        options: &DecompilationOptions,
    ) -> RenderResult {
        debug!(language = self.name(), property = %property.name, "decompiling property");
        let mut rd = self.disassembler(output, options);
        rd.disassemble_property(property)?;
        for accessor in property.accessors() {
            rd.output().write_line();
            rd.disassemble_method(accessor)?;
        }
        Ok(())
    }

    /// The `.event` block, then add, remove and other accessors, each after a
    /// blank line.
    fn decompile_event(
        &self,
        event: &EventDef,
        output: &mut dyn TextOutput,
        options: &DecompilationOptions,
    ) -> RenderResult {
        debug!(language = self.name(), event = %event.name, "decompiling event");
        let mut rd = self.disassembler(output, options);
        rd.disassemble_event(event)?;
        for accessor in event.accessors() {
            rd.output().write_line();
            rd.disassemble_method(accessor)?;
        }
        Ok(())
    }

    fn decompile_type(
        &self,
        ty: &TypeDef,
        output: &mut dyn TextOutput,
        options: &DecompilationOptions,
    ) -> RenderResult {
        debug!(language = self.name(), type_name = %ty.full_name(), "decompiling type");
        self.disassembler(output, options).disassemble_type(ty)
    }

    fn decompile_namespace(
        &self,
        namespace: &str,
        types: &[&TypeDef],
        output: &mut dyn TextOutput,
        options: &DecompilationOptions,
    ) -> RenderResult {
        debug!(language = self.name(), namespace, types = types.len(), "decompiling namespace");
        self.disassembler(output, options).disassemble_namespace(namespace, types)
    }

    fn decompile_assembly(
        &self,
        assembly: &LoadedAssembly,
        output: &mut dyn TextOutput,
        options: &DecompilationOptions,
    ) -> RenderResult {
        debug!(
            language = self.name(),
            file = %assembly.file_name,
            full = options.full_decompilation,
            "decompiling assembly"
        );
        output.write_line_with(&format!("// {}", assembly.file_name), TextTokenType::Comment);
        output.write_line();

        let mut rd = self.disassembler(output, options);
        if options.full_decompilation {
            rd.write_assembly_references(&assembly.module)?;
        }
        if let Some(definition) = &assembly.assembly {
            rd.write_assembly_header(definition)?;
        }
        rd.output().write_line();
        rd.write_module_header(&assembly.module)?;
        if options.full_decompilation {
            rd.output().write_line();
            rd.output().write_line();
            rd.write_module_contents(&assembly.module)?;
        }
        Ok(())
    }

    /// Rendered through the same writer the listing uses, so names look
    /// identical in listings and in standalone lookups.
    fn type_to_string(
        &self,
        ty: Option<&TypeRef>,
        include_namespace: bool,
        _attributes: Option<&[CustomAttribute]>,
    ) -> String {
        let Some(ty) = ty else {
            return String::new();
        };
        let syntax = if include_namespace {
            IlNameSyntax::TypeName
        } else {
            IlNameSyntax::ShortTypeName
        };
        let mut output = PlainTextOutput::new();
        write_type(&mut output, ty, syntax);
        output.into_string()
    }
}
