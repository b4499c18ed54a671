use std::borrow::Cow;

use crate::metadata::TypeRef;
use crate::output::{TextOutput, TextTokenType};

/// How a type reference is spelled in the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IlNameSyntax {
    /// As it appears in a signature: primitive keywords, `class`/`valuetype` prefixes.
    Signature,
    /// `[scope]Namespace.Name`.
    TypeName,
    /// The bare type name.
    ShortTypeName,
}

/// IL keyword for a built-in `System` type, if it has one.
pub fn primitive_keyword(ty: &TypeRef) -> Option<&'static str> {
    if ty.namespace != "System" || ty.declaring.is_some() {
        return None;
    }
    let keyword = match ty.name.as_str() {
        "Void" => "void",
        "Boolean" => "bool",
        "Char" => "char",
        "SByte" => "int8",
        "Byte" => "uint8",
        "Int16" => "int16",
        "UInt16" => "uint16",
        "Int32" => "int32",
        "UInt32" => "uint32",
        "Int64" => "int64",
        "UInt64" => "uint64",
        "Single" => "float32",
        "Double" => "float64",
        "String" => "string",
        "Object" => "object",
        "IntPtr" => "native int",
        "UIntPtr" => "native unsigned int",
        "TypedReference" => "typedref",
        _ => return None,
    };
    Some(keyword)
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '$' | '@' | '?' | '`' | '.')
}

/// Quote names that are not plain IL identifiers, e.g. compiler-generated `<Main>b__0`.
pub fn escape_identifier(name: &str) -> Cow<'_, str> {
    let plain = name
        .chars()
        .next()
        .map(|first| !first.is_ascii_digit())
        .unwrap_or(false)
        && name.chars().all(is_identifier_char);
    if plain {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("'{}'", name.replace('\'', "\\'")))
    }
}

fn write_qualified_name(output: &mut dyn TextOutput, ty: &TypeRef) {
    match &ty.declaring {
        Some(outer) => {
            write_qualified_name(output, outer);
            output.write("/", TextTokenType::Text);
        }
        None if !ty.namespace.is_empty() => {
            output.write(&ty.namespace, TextTokenType::TypeName);
            output.write(".", TextTokenType::Text);
        }
        None => {}
    }
    output.write(&escape_identifier(&ty.name), TextTokenType::TypeName);
}

/// Write `ty` into `output` using the given syntax.
pub fn write_type(output: &mut dyn TextOutput, ty: &TypeRef, syntax: IlNameSyntax) {
    match syntax {
        IlNameSyntax::ShortTypeName => {
            output.write(&escape_identifier(&ty.name), TextTokenType::TypeName);
        }
        IlNameSyntax::TypeName => {
            if let Some(scope) = ty.resolution_scope() {
                output.write(&format!("[{}]", escape_identifier(scope)), TextTokenType::Text);
            }
            write_qualified_name(output, ty);
        }
        IlNameSyntax::Signature => {
            if let Some(keyword) = primitive_keyword(ty) {
                output.write(keyword, TextTokenType::Keyword);
                return;
            }
            let prefix = if ty.is_value_type { "valuetype " } else { "class " };
            output.write(prefix, TextTokenType::Keyword);
            write_type(output, ty, IlNameSyntax::TypeName);
        }
    }
}

/// `IL_002a` style label for an instruction offset.
pub fn offset_label(offset: u32) -> String {
    format!("IL_{:04x}", offset)
}

/// Double-quoted string literal with IL escapes.
pub fn quote_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '\0' => quoted.push_str("\\0"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Space-separated uppercase hex, as used for key tokens and attribute blobs.
pub fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
