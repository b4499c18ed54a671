use crate::disassembler::names::*;
use crate::disassembler::reflection::{IlMode, ReflectionDisassembler};
use crate::error::{RenderError, RenderResult};
use crate::metadata::*;
use crate::output::TextTokenType;

/// Instructions written between two cancellation checks.
const CANCELLATION_STRIDE: usize = 64;

impl ReflectionDisassembler<'_> {
    pub(crate) fn write_method_body(&mut self, body: &MethodBody) -> RenderResult {
        self.write(".maxstack ", TextTokenType::Directive);
        self.line(&body.max_stack.to_string(), TextTokenType::Literal);

        if !body.locals.is_empty() {
            self.write(".locals ", TextTokenType::Directive);
            if body.init_locals {
                self.write("init ", TextTokenType::Keyword);
            }
            self.line("(", TextTokenType::Text);
            self.indent();
            for (i, local) in body.locals.iter().enumerate() {
                self.write(&format!("[{}] ", i), TextTokenType::Text);
                self.write_type(&local.local_type, IlNameSyntax::Signature);
                self.write(" ", TextTokenType::Text);
                self.write(&escape_identifier(&local.name), TextTokenType::Text);
                if i + 1 < body.locals.len() {
                    self.write(",", TextTokenType::Text);
                }
                self.write_line();
            }
            self.unindent();
            self.line(")", TextTokenType::Text);
        }
        self.write_line();

        match self.mode {
            IlMode::Flat => self.write_flat_body(body),
            IlMode::Structured => self.write_structured_body(body),
        }
    }

    fn write_instructions<'i>(
        &mut self,
        instructions: impl Iterator<Item = &'i Instruction>,
        written: &mut usize,
    ) -> RenderResult {
        for instruction in instructions {
            if *written > 0 && *written % CANCELLATION_STRIDE == 0 {
                self.check_cancelled()?;
            }
            self.write_instruction(instruction);
            *written += 1;
        }
        Ok(())
    }

    fn write_flat_body(&mut self, body: &MethodBody) -> RenderResult {
        let mut written = 0;
        self.write_instructions(body.instructions.iter(), &mut written)?;

        for protected in body.structures.iter().filter(|s| s.kind == StructureKind::Try) {
            let mut next = protected.end;
            while let Some(handler) = body
                .structures
                .iter()
                .find(|s| s.kind.is_handler() && s.start == next && s.end > s.start)
            {
                self.write(".try ", TextTokenType::Directive);
                self.write(&offset_label(protected.start), TextTokenType::Label);
                self.write(" to ", TextTokenType::Keyword);
                self.write(&offset_label(protected.end), TextTokenType::Label);
                self.write(" ", TextTokenType::Text);
                match &handler.kind {
                    StructureKind::Catch(exception) => {
                        self.write("catch ", TextTokenType::Keyword);
                        self.write_type(exception, IlNameSyntax::TypeName);
                        self.write(" ", TextTokenType::Text);
                    }
                    StructureKind::Finally => self.write("finally ", TextTokenType::Keyword),
                    StructureKind::Fault => self.write("fault ", TextTokenType::Keyword),
                    StructureKind::Filter => self.write("filter ", TextTokenType::Keyword),
                    StructureKind::Loop | StructureKind::Try => {}
                }
                self.write("handler ", TextTokenType::Keyword);
                self.write(&offset_label(handler.start), TextTokenType::Label);
                self.write(" to ", TextTokenType::Keyword);
                self.write(&offset_label(handler.end), TextTokenType::Label);
                self.write_line();
                next = handler.end;
            }
        }
        Ok(())
    }

    fn write_structured_body(&mut self, body: &MethodBody) -> RenderResult {
        if let Some(bad) = body.structures.iter().find(|s| s.end <= s.start) {
            return Err(RenderError::Engine(format!(
                "control structure {:?} has an empty or inverted range {}..{}",
                bad.kind,
                offset_label(bad.start),
                offset_label(bad.end)
            )));
        }

        // Outer structures first: earlier start, then wider range.
        let mut structures: Vec<&ControlStructure> = body.structures.iter().collect();
        structures.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
        let mut pending = structures.into_iter().peekable();
        let mut open: Vec<&ControlStructure> = Vec::new();
        let mut written = 0;

        for instruction in &body.instructions {
            while let Some(&top) = open.last() {
                if instruction.offset < top.end {
                    break;
                }
                self.close_structure(top);
                open.pop();
            }
            while let Some(&next) = pending.peek() {
                if next.start > instruction.offset {
                    break;
                }
                if next.end <= instruction.offset {
                    return Err(RenderError::Engine(format!(
                        "control structure {}..{} covers no instruction",
                        offset_label(next.start),
                        offset_label(next.end)
                    )));
                }
                if let Some(parent) = open.last() {
                    if next.end > parent.end {
                        return Err(RenderError::Engine(format!(
                            "control structure at {} overlaps its parent ending at {}",
                            offset_label(next.start),
                            offset_label(parent.end)
                        )));
                    }
                }
                self.open_structure(next);
                open.push(next);
                pending.next();
            }
            self.write_instructions(std::iter::once(instruction), &mut written)?;
        }
        if let Some(unplaced) = pending.next() {
            return Err(RenderError::Engine(format!(
                "control structure {}..{} starts after the last instruction",
                offset_label(unplaced.start),
                offset_label(unplaced.end)
            )));
        }
        while let Some(top) = open.pop() {
            self.close_structure(top);
        }
        Ok(())
    }

    fn open_structure(&mut self, structure: &ControlStructure) {
        match &structure.kind {
            StructureKind::Loop => {
                self.line(
                    &format!("// loop start (head: {})", offset_label(structure.start)),
                    TextTokenType::Comment,
                );
                self.indent();
                return;
            }
            StructureKind::Try => self.line(".try", TextTokenType::Directive),
            StructureKind::Catch(exception) => {
                self.write("catch ", TextTokenType::Keyword);
                self.write_type(exception, IlNameSyntax::TypeName);
                self.write_line();
            }
            StructureKind::Finally => self.line("finally", TextTokenType::Keyword),
            StructureKind::Fault => self.line("fault", TextTokenType::Keyword),
            StructureKind::Filter => self.line("filter", TextTokenType::Keyword),
        }
        self.line("{", TextTokenType::Text);
        self.indent();
    }

    fn close_structure(&mut self, structure: &ControlStructure) {
        self.unindent();
        let comment = match structure.kind {
            StructureKind::Loop => {
                self.line("// end loop", TextTokenType::Comment);
                return;
            }
            StructureKind::Try => " // end .try",
            StructureKind::Filter => " // end filter",
            _ => " // end handler",
        };
        self.write("}", TextTokenType::Text);
        self.line(comment, TextTokenType::Comment);
    }

    fn write_instruction(&mut self, instruction: &Instruction) {
        self.write(&format!("{}: ", offset_label(instruction.offset)), TextTokenType::Label);
        self.write(&instruction.opcode, TextTokenType::Opcode);
        if let Some(operand) = &instruction.operand {
            self.write(" ", TextTokenType::Text);
            self.write_operand(operand);
        }
        self.write_line();
    }

    fn write_operand(&mut self, operand: &Operand) {
        match operand {
            Operand::Int(value) => self.write(&value.to_string(), TextTokenType::Literal),
            Operand::Float(value) => self.write(&value.to_string(), TextTokenType::Literal),
            Operand::String(value) => self.write(&quote_string(value), TextTokenType::Literal),
            Operand::Target(offset) => self.write(&offset_label(*offset), TextTokenType::Label),
            Operand::Switch(targets) => {
                let labels: Vec<String> = targets.iter().map(|t| offset_label(*t)).collect();
                self.write("(", TextTokenType::Text);
                self.write(&labels.join(", "), TextTokenType::Label);
                self.write(")", TextTokenType::Text);
            }
            Operand::Type(ty) => self.write_type(ty, IlNameSyntax::TypeName),
            Operand::Method(method) => {
                let params: Vec<&TypeRef> = method.parameters.iter().collect();
                let void = TypeRef::void();
                self.write_method_reference(
                    method.has_this,
                    method.member_type.as_ref().unwrap_or(&void),
                    Some(&method.declaring_type),
                    &method.name,
                    &params,
                );
            }
            Operand::Field(field) => {
                if let Some(field_type) = &field.member_type {
                    self.write_type(field_type, IlNameSyntax::Signature);
                    self.write(" ", TextTokenType::Text);
                }
                self.write_type(&field.declaring_type, IlNameSyntax::TypeName);
                self.write("::", TextTokenType::Text);
                self.write(&escape_identifier(&field.name), TextTokenType::MemberName);
            }
            Operand::Local(name) | Operand::Arg(name) => {
                self.write(&escape_identifier(name), TextTokenType::Text)
            }
        }
    }
}
