use std::fmt;

use crate::metadata::types::*;

/// A borrowed reference to any member-like entity, as handed to tooltip,
/// visibility and navigation helpers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MemberRef<'a> {
    Type(&'a TypeRef),
    TypeDef(&'a TypeDef),
    Method(&'a MethodDef),
    Field(&'a FieldDef),
    Property(&'a PropertyDef),
    Event(&'a EventDef),
}

impl<'a> MemberRef<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            MemberRef::Type(t) => &t.name,
            MemberRef::TypeDef(t) => &t.name,
            MemberRef::Method(m) => &m.name,
            MemberRef::Field(f) => &f.name,
            MemberRef::Property(p) => &p.name,
            MemberRef::Event(e) => &e.name,
        }
    }

    /// Whether this reference denotes a type rather than a member of one.
    pub fn is_type(&self) -> bool {
        matches!(self, MemberRef::Type(_) | MemberRef::TypeDef(_))
    }
}

impl fmt::Display for MemberRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberRef::Type(t) => fmt::Display::fmt(t, f),
            MemberRef::TypeDef(t) => fmt::Display::fmt(t, f),
            MemberRef::Method(m) => fmt::Display::fmt(m, f),
            MemberRef::Field(field) => fmt::Display::fmt(field, f),
            MemberRef::Property(p) => fmt::Display::fmt(p, f),
            MemberRef::Event(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl<'a> From<&'a TypeRef> for MemberRef<'a> {
    fn from(value: &'a TypeRef) -> Self {
        MemberRef::Type(value)
    }
}

impl<'a> From<&'a TypeDef> for MemberRef<'a> {
    fn from(value: &'a TypeDef) -> Self {
        MemberRef::TypeDef(value)
    }
}

impl<'a> From<&'a MethodDef> for MemberRef<'a> {
    fn from(value: &'a MethodDef) -> Self {
        MemberRef::Method(value)
    }
}

impl<'a> From<&'a FieldDef> for MemberRef<'a> {
    fn from(value: &'a FieldDef) -> Self {
        MemberRef::Field(value)
    }
}

impl<'a> From<&'a PropertyDef> for MemberRef<'a> {
    fn from(value: &'a PropertyDef) -> Self {
        MemberRef::Property(value)
    }
}

impl<'a> From<&'a EventDef> for MemberRef<'a> {
    fn from(value: &'a EventDef) -> Self {
        MemberRef::Event(value)
    }
}
