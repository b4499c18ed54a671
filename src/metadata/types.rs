use serde::Deserialize;
use std::fmt;

// Read-only views of assembly metadata. The loader deserializes these from JSON
// and links every member back to its declaring type.

/// Reference to a type, possibly defined in another assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TypeRef {
    #[serde(default)]
    pub namespace: String,
    pub name: String,
    /// Assembly the type is resolved from when it is not defined locally.
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub is_value_type: bool,
    /// Enclosing type for nested types.
    #[serde(default)]
    pub declaring: Option<Box<TypeRef>>,
}

impl TypeRef {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    pub fn value_type(mut self) -> Self {
        self.is_value_type = true;
        self
    }

    pub fn nested_in(mut self, declaring: TypeRef) -> Self {
        self.declaring = Some(Box::new(declaring));
        self
    }

    pub fn void() -> Self {
        Self::new("System", "Void")
    }

    /// `Namespace.Name`, or `Outer/Inner` for nested types.
    pub fn full_name(&self) -> String {
        match &self.declaring {
            Some(outer) => format!("{}/{}", outer.full_name(), self.name),
            None if self.namespace.is_empty() => self.name.clone(),
            None => format!("{}.{}", self.namespace, self.name),
        }
    }

    /// Scope of the outermost declaring type.
    pub fn resolution_scope(&self) -> Option<&str> {
        match &self.declaring {
            Some(outer) => outer.resolution_scope(),
            None => self.scope.as_deref(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberAccess {
    PrivateScope,
    #[default]
    Private,
    FamilyAndAssembly,
    Assembly,
    Family,
    FamilyOrAssembly,
    Public,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeVisibility {
    #[default]
    NotPublic,
    Public,
    NestedPublic,
    NestedPrivate,
    NestedFamily,
    NestedAssembly,
    NestedFamilyAndAssembly,
    NestedFamilyOrAssembly,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomAttribute {
    pub attribute_type: TypeRef,
    /// Constructor parameter types.
    #[serde(default)]
    pub parameters: Vec<TypeRef>,
    /// Raw attribute blob.
    #[serde(default)]
    pub blob: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub param_type: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Local {
    pub name: String,
    pub local_type: TypeRef,
}

/// Method or field referenced by an instruction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MemberOperand {
    pub declaring_type: TypeRef,
    pub name: String,
    /// Return type for methods, field type for fields.
    #[serde(default)]
    pub member_type: Option<TypeRef>,
    #[serde(default)]
    pub parameters: Vec<TypeRef>,
    #[serde(default)]
    pub has_this: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    Int(i64),
    Float(f64),
    String(String),
    /// Branch target offset.
    Target(u32),
    Switch(Vec<u32>),
    Type(TypeRef),
    Method(MemberOperand),
    Field(MemberOperand),
    Local(String),
    Arg(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Instruction {
    pub offset: u32,
    pub opcode: String,
    #[serde(default)]
    pub operand: Option<Operand>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    Loop,
    Try,
    Catch(TypeRef),
    Finally,
    Fault,
    Filter,
}

impl StructureKind {
    pub fn is_handler(&self) -> bool {
        !matches!(self, StructureKind::Loop | StructureKind::Try)
    }
}

/// A recovered control structure covering the half-open offset range `start..end`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ControlStructure {
    pub kind: StructureKind,
    pub start: u32,
    pub end: u32,
}

fn default_max_stack() -> u32 {
    8
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MethodBody {
    #[serde(default = "default_max_stack")]
    pub max_stack: u32,
    #[serde(default)]
    pub init_locals: bool,
    #[serde(default)]
    pub locals: Vec<Local>,
    #[serde(default)]
    pub instructions: Vec<Instruction>,
    #[serde(default)]
    pub structures: Vec<ControlStructure>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MethodDef {
    pub name: String,
    #[serde(default)]
    pub declaring_type: Option<TypeRef>,
    #[serde(default)]
    pub access: MemberAccess,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_virtual: bool,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub is_new_slot: bool,
    #[serde(default)]
    pub is_hide_by_sig: bool,
    #[serde(default)]
    pub is_special_name: bool,
    #[serde(default)]
    pub is_rt_special_name: bool,
    #[serde(default = "TypeRef::void")]
    pub return_type: TypeRef,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub body: Option<MethodBody>,
    #[serde(default)]
    pub custom_attributes: Vec<CustomAttribute>,
}

impl MethodDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            declaring_type: None,
            access: MemberAccess::Public,
            is_static: false,
            is_virtual: false,
            is_abstract: false,
            is_final: false,
            is_new_slot: false,
            is_hide_by_sig: true,
            is_special_name: false,
            is_rt_special_name: false,
            return_type: TypeRef::void(),
            parameters: Vec::new(),
            body: None,
            custom_attributes: Vec::new(),
        }
    }
}

impl fmt::Display for MethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|p| p.param_type.full_name())
            .collect();
        write!(f, "{} ", self.return_type.full_name())?;
        if let Some(declaring) = &self.declaring_type {
            write!(f, "{}::", declaring.full_name())?;
        }
        write!(f, "{}({})", self.name, params.join(","))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constant {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(default)]
    pub declaring_type: Option<TypeRef>,
    #[serde(default)]
    pub access: MemberAccess,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_init_only: bool,
    #[serde(default)]
    pub is_literal: bool,
    pub field_type: TypeRef,
    #[serde(default)]
    pub constant: Option<Constant>,
}

impl fmt::Display for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.field_type.full_name())?;
        if let Some(declaring) = &self.declaring_type {
            write!(f, "{}::", declaring.full_name())?;
        }
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PropertyDef {
    pub name: String,
    #[serde(default)]
    pub declaring_type: Option<TypeRef>,
    pub property_type: TypeRef,
    /// Index parameters; non-empty for indexers.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub get_method: Option<MethodDef>,
    #[serde(default)]
    pub set_method: Option<MethodDef>,
    #[serde(default)]
    pub other_methods: Vec<MethodDef>,
}

impl PropertyDef {
    /// Accessors in declaration order: getter, setter, then the others.
    pub fn accessors(&self) -> impl Iterator<Item = &MethodDef> {
        self.get_method
            .iter()
            .chain(self.set_method.iter())
            .chain(self.other_methods.iter())
    }

    /// A property is instance-bound unless every accessor is static.
    pub fn has_this(&self) -> bool {
        let mut accessors = self.accessors().peekable();
        accessors.peek().is_none() || accessors.any(|m| !m.is_static)
    }
}

impl fmt::Display for PropertyDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.property_type.full_name())?;
        if let Some(declaring) = &self.declaring_type {
            write!(f, "{}::", declaring.full_name())?;
        }
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|p| p.param_type.full_name())
            .collect();
        write!(f, "{}({})", self.name, params.join(","))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventDef {
    pub name: String,
    #[serde(default)]
    pub declaring_type: Option<TypeRef>,
    pub event_type: TypeRef,
    #[serde(default)]
    pub add_method: Option<MethodDef>,
    #[serde(default)]
    pub remove_method: Option<MethodDef>,
    #[serde(default)]
    pub other_methods: Vec<MethodDef>,
}

impl EventDef {
    pub fn accessors(&self) -> impl Iterator<Item = &MethodDef> {
        self.add_method
            .iter()
            .chain(self.remove_method.iter())
            .chain(self.other_methods.iter())
    }
}

impl fmt::Display for EventDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.event_type.full_name())?;
        if let Some(declaring) = &self.declaring_type {
            write!(f, "{}::", declaring.full_name())?;
        }
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TypeDef {
    #[serde(default)]
    pub namespace: String,
    pub name: String,
    /// Enclosing type; set by the loader for nested types.
    #[serde(default)]
    pub declaring_type: Option<TypeRef>,
    #[serde(default)]
    pub visibility: TypeVisibility,
    #[serde(default)]
    pub is_interface: bool,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_sealed: bool,
    #[serde(default)]
    pub before_field_init: bool,
    #[serde(default)]
    pub base_type: Option<TypeRef>,
    #[serde(default)]
    pub interfaces: Vec<TypeRef>,
    #[serde(default)]
    pub custom_attributes: Vec<CustomAttribute>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub methods: Vec<MethodDef>,
    #[serde(default)]
    pub properties: Vec<PropertyDef>,
    #[serde(default)]
    pub events: Vec<EventDef>,
    #[serde(default)]
    pub nested_types: Vec<TypeDef>,
}

impl TypeDef {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn is_value_type(&self) -> bool {
        matches!(
            self.base_type.as_ref().map(|b| b.full_name()).as_deref(),
            Some("System.ValueType") | Some("System.Enum")
        )
    }

    pub fn to_type_ref(&self) -> TypeRef {
        TypeRef {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            scope: None,
            is_value_type: self.is_value_type(),
            declaring: self.declaring_type.clone().map(Box::new),
        }
    }

    pub fn full_name(&self) -> String {
        self.to_type_ref().full_name()
    }

    /// Point every member, accessor and nested type back at this type.
    pub fn link(&mut self) {
        let this = self.to_type_ref();
        for field in &mut self.fields {
            field.declaring_type = Some(this.clone());
        }
        for method in &mut self.methods {
            method.declaring_type = Some(this.clone());
        }
        for property in &mut self.properties {
            property.declaring_type = Some(this.clone());
            for accessor in property
                .get_method
                .iter_mut()
                .chain(property.set_method.iter_mut())
                .chain(property.other_methods.iter_mut())
            {
                accessor.declaring_type = Some(this.clone());
            }
        }
        for event in &mut self.events {
            event.declaring_type = Some(this.clone());
            for accessor in event
                .add_method
                .iter_mut()
                .chain(event.remove_method.iter_mut())
                .chain(event.other_methods.iter_mut())
            {
                accessor.declaring_type = Some(this.clone());
            }
        }
        for nested in &mut self.nested_types {
            nested.declaring_type = Some(this.clone());
            nested.link();
        }
    }

    /// This type followed by all nested types, depth first.
    pub fn walk(&self) -> Vec<&TypeDef> {
        let mut all = vec![self];
        for nested in &self.nested_types {
            all.extend(nested.walk());
        }
        all
    }
}

impl fmt::Display for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssemblyRef {
    pub name: String,
    #[serde(default)]
    pub version: [u16; 4],
    #[serde(default)]
    pub culture: Option<String>,
    #[serde(default)]
    pub public_key_token: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssemblyDef {
    pub name: String,
    #[serde(default)]
    pub version: [u16; 4],
    #[serde(default)]
    pub culture: Option<String>,
    #[serde(default)]
    pub public_key_token: Option<Vec<u8>>,
    #[serde(default)]
    pub hash_algorithm: Option<u32>,
    #[serde(default)]
    pub is_windows_runtime: bool,
    #[serde(default)]
    pub custom_attributes: Vec<CustomAttribute>,
}

impl AssemblyDef {
    /// Display name, e.g. `Sample, Version=1.0.0.0, Culture=neutral, PublicKeyToken=null`.
    pub fn full_name(&self) -> String {
        let [major, minor, build, revision] = self.version;
        let culture = match self.culture.as_deref() {
            None | Some("") => "neutral",
            Some(culture) => culture,
        };
        let token = match &self.public_key_token {
            Some(bytes) if !bytes.is_empty() => hex_lower(bytes),
            _ => "null".to_string(),
        };
        format!(
            "{}, Version={}.{}.{}.{}, Culture={}, PublicKeyToken={}",
            self.name, major, minor, build, revision, culture, token
        )
    }
}

fn hex_lower(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn default_image_base() -> u64 {
    0x0040_0000
}

fn default_file_alignment() -> u32 {
    0x200
}

fn default_stack_reserve() -> u64 {
    0x0010_0000
}

fn default_subsystem() -> u16 {
    3
}

fn default_corflags() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModuleDef {
    pub name: String,
    #[serde(default)]
    pub mvid: Option<String>,
    #[serde(default = "default_image_base")]
    pub image_base: u64,
    #[serde(default = "default_file_alignment")]
    pub file_alignment: u32,
    #[serde(default = "default_stack_reserve")]
    pub stack_reserve: u64,
    #[serde(default = "default_subsystem")]
    pub subsystem: u16,
    #[serde(default = "default_corflags")]
    pub corflags: u32,
    #[serde(default)]
    pub assembly_refs: Vec<AssemblyRef>,
    #[serde(default)]
    pub types: Vec<TypeDef>,
}

impl ModuleDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            mvid: None,
            image_base: default_image_base(),
            file_alignment: default_file_alignment(),
            stack_reserve: default_stack_reserve(),
            subsystem: default_subsystem(),
            corflags: default_corflags(),
            assembly_refs: Vec::new(),
            types: Vec::new(),
        }
    }

    /// Top-level types grouped by namespace, namespaces in first-seen order.
    pub fn namespaces(&self) -> Vec<(&str, Vec<&TypeDef>)> {
        let mut groups: Vec<(&str, Vec<&TypeDef>)> = Vec::new();
        for ty in &self.types {
            match groups.iter_mut().find(|(ns, _)| *ns == ty.namespace) {
                Some((_, types)) => types.push(ty),
                None => groups.push((ty.namespace.as_str(), vec![ty])),
            }
        }
        groups
    }

    /// Find a type, nested or not, by its full name.
    pub fn find_type(&self, full_name: &str) -> Option<&TypeDef> {
        self.types
            .iter()
            .flat_map(|t| t.walk())
            .find(|t| t.full_name() == full_name)
    }
}

/// A loaded binary: file name, optional assembly manifest, and its module.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoadedAssembly {
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub assembly: Option<AssemblyDef>,
    pub module: ModuleDef,
}

impl LoadedAssembly {
    pub fn link(&mut self) {
        for ty in &mut self.module.types {
            ty.link();
        }
    }
}
