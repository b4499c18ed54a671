use anyhow::{anyhow, bail, Result};
use std::str::FromStr;

use crate::metadata::types::*;

/// Names one entity of a loaded assembly, e.g. `type:Sample.Widget` or
/// `property:Sample.Widget::Size`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntitySelector {
    Assembly,
    Namespace(String),
    Type(String),
    Method { type_name: String, member: String },
    Field { type_name: String, member: String },
    Property { type_name: String, member: String },
    Event { type_name: String, member: String },
}

/// The entity an [`EntitySelector`] resolved to.
#[derive(Debug, Clone)]
pub enum Entity<'a> {
    Assembly(&'a LoadedAssembly),
    Namespace(&'a str, Vec<&'a TypeDef>),
    Type(&'a TypeDef),
    Method(&'a MethodDef),
    Field(&'a FieldDef),
    Property(&'a PropertyDef),
    Event(&'a EventDef),
}

fn split_member(spec: &str) -> Result<(String, String)> {
    let (type_name, member) = spec
        .rsplit_once("::")
        .ok_or_else(|| anyhow!("Expected `<Type>::<member>`, got `{}`", spec))?;
    if type_name.is_empty() || member.is_empty() {
        bail!("Expected `<Type>::<member>`, got `{}`", spec);
    }
    Ok((type_name.to_string(), member.to_string()))
}

impl FromStr for EntitySelector {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "assembly" {
            return Ok(EntitySelector::Assembly);
        }
        let (kind, rest) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("Unknown entity selector `{}`", s))?;
        match kind {
            "namespace" => Ok(EntitySelector::Namespace(rest.to_string())),
            "type" => Ok(EntitySelector::Type(rest.to_string())),
            "method" | "field" | "property" | "event" => {
                let (type_name, member) = split_member(rest)?;
                Ok(match kind {
                    "method" => EntitySelector::Method { type_name, member },
                    "field" => EntitySelector::Field { type_name, member },
                    "property" => EntitySelector::Property { type_name, member },
                    _ => EntitySelector::Event { type_name, member },
                })
            }
            _ => bail!(
                "Unknown entity kind `{}`; expected assembly, namespace, type, method, \
                 field, property or event",
                kind
            ),
        }
    }
}

impl EntitySelector {
    pub fn resolve<'a>(&self, assembly: &'a LoadedAssembly) -> Result<Entity<'a>> {
        let module = &assembly.module;
        let find_type = |name: &str| {
            module
                .find_type(name)
                .ok_or_else(|| anyhow!("Type `{}` not found in {}", name, assembly.file_name))
        };
        let missing = |kind: &str, type_name: &str, member: &str| {
            anyhow!("No {} `{}` on type `{}`", kind, member, type_name)
        };

        match self {
            EntitySelector::Assembly => Ok(Entity::Assembly(assembly)),
            EntitySelector::Namespace(ns) => {
                let types: Vec<&TypeDef> =
                    module.types.iter().filter(|t| &t.namespace == ns).collect();
                if types.is_empty() {
                    bail!("Namespace `{}` has no types in {}", ns, assembly.file_name);
                }
                Ok(Entity::Namespace(types[0].namespace.as_str(), types))
            }
            EntitySelector::Type(name) => Ok(Entity::Type(find_type(name)?)),
            EntitySelector::Method { type_name, member } => find_type(type_name)?
                .methods
                .iter()
                .find(|m| &m.name == member)
                .map(Entity::Method)
                .ok_or_else(|| missing("method", type_name, member)),
            EntitySelector::Field { type_name, member } => find_type(type_name)?
                .fields
                .iter()
                .find(|f| &f.name == member)
                .map(Entity::Field)
                .ok_or_else(|| missing("field", type_name, member)),
            EntitySelector::Property { type_name, member } => find_type(type_name)?
                .properties
                .iter()
                .find(|p| &p.name == member)
                .map(Entity::Property)
                .ok_or_else(|| missing("property", type_name, member)),
            EntitySelector::Event { type_name, member } => find_type(type_name)?
                .events
                .iter()
                .find(|e| &e.name == member)
                .map(Entity::Event)
                .ok_or_else(|| missing("event", type_name, member)),
        }
    }
}
