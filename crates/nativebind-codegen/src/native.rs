//! Native type mapping
//!
//! Maps a schema node to the C-ABI type that represents it, together with
//! every declaration and accessor that type needs. Scalars and enums are
//! passed by value; objects, arrays and maps become opaque handles with
//! generated lifecycle and accessor functions.
//!
//! # Naming
//!
//! A type is named after `(module, label, prefix)`, where the label is the
//! requested name, falling back to the schema title. Inline schemas nested
//! in an object are mapped under the object's name as prefix; following a
//! `$ref` resets the prefix, since the target is a named definition. The
//! resulting stem is claimed in a [`SymbolTable`], which suffixes it when
//! another schema already owns the name.
//!
//! | Schema | Native type | Kind |
//! |--------|-------------|------|
//! | `string` | string handle | [`NativeKind::Scalar`] |
//! | `number` | `float` | [`NativeKind::Scalar`] |
//! | `integer` | `uint32_t` / `int32_t` | [`NativeKind::Scalar`] |
//! | `boolean` | `bool` | [`NativeKind::Scalar`] |
//! | string `enum` | `Module_Name` | [`NativeKind::Enum`] |
//! | object with properties | `Module_NameHandle` | [`NativeKind::Handle`] |
//! | array | `Module_NameArrayHandle` | [`NativeKind::ArrayHandle`] |
//! | `additionalProperties` | `Module_NameHandle` | [`NativeKind::MapHandle`] |

use crate::accessors::{AccessorEmitter, AccessorType, Emitted, PropertyOptions};
use crate::enums::emit_enum;
use crate::fragments::Fragments;
use crate::merge::merge_all_of;
use crate::naming::{capitalize, child_prefix, qualified_name};
use crate::resolver::Resolver;
use crate::symbols::{SharedSymbols, SymbolKind, SymbolTable};
use crate::wire::WireNames;
use indexmap::IndexSet;
use nativebind_core::schema::pointer_child;
use nativebind_core::{
    ArrayItems, Diagnostic, GenError, GenResult, Module, ObjectSchema, PrimitiveKind, RuntimeNames, SchemaIndex,
    SchemaKind, SchemaNode,
};
use serde_json::Value;

/// How a native type is represented across the C boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeKind {
    Scalar,
    Enum,
    Handle,
    ArrayHandle,
    MapHandle,
}

/// Value category, which decides how a value is copied in and out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueShape {
    String,
    Float,
    Integer,
    Boolean,
    Enum,
    Object,
    Array,
    Map,
}

impl ValueShape {
    /// Reference-counted handle rather than a by-value scalar
    pub fn is_handle(self) -> bool {
        matches!(self, ValueShape::Object | ValueShape::Array | ValueShape::Map)
    }
}

/// Native-side descriptor for one schema node
#[derive(Debug, Clone, PartialEq)]
pub struct NativeType {
    /// C type used in signatures
    pub name: String,
    pub kind: NativeKind,
    pub shape: ValueShape,
    /// Fully qualified wire container type of the same value
    pub wire: String,
    /// Name the type was generated under
    pub label: String,
    /// Enum typedefs
    pub enums: Fragments,
    /// Handle typedefs and accessor prototypes
    pub declarations: Fragments,
    /// Accessor bodies
    pub definitions: Fragments,
    /// Enum conversion tables
    pub conversions: Fragments,
    pub diagnostics: Vec<Diagnostic>,
    /// Titles of other modules this type refers into
    pub external_modules: IndexSet<String>,
}

impl NativeType {
    fn new(name: impl Into<String>, kind: NativeKind, shape: ValueShape, wire: String, label: &str) -> Self {
        Self {
            name: name.into(),
            kind,
            shape,
            wire,
            label: label.to_string(),
            enums: Fragments::new(),
            declarations: Fragments::new(),
            definitions: Fragments::new(),
            conversions: Fragments::new(),
            diagnostics: Vec::new(),
            external_modules: IndexSet::new(),
        }
    }

    pub fn accessor_type(&self) -> AccessorType<'_> {
        AccessorType {
            native: &self.name,
            wire: &self.wire,
            shape: self.shape,
        }
    }

    /// Pull in the fragments, diagnostics and external modules of a dependency
    pub fn absorb(&mut self, other: &NativeType, path: &str) -> GenResult<()> {
        self.enums.merge(&other.enums, path)?;
        self.declarations.merge(&other.declarations, path)?;
        self.definitions.merge(&other.definitions, path)?;
        self.conversions.merge(&other.conversions, path)?;
        for diagnostic in &other.diagnostics {
            self.push_diagnostic(diagnostic.clone());
        }
        self.external_modules.extend(other.external_modules.iter().cloned());
        Ok(())
    }

    fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        if !self.diagnostics.contains(&diagnostic) {
            self.diagnostics.push(diagnostic);
        }
    }

    /// Reference into `owner`: only the name survives, the code lives in
    /// that module's own output.
    fn into_external(self, owner: &str) -> Self {
        let mut external = NativeType::new(self.name, self.kind, self.shape, self.wire, &self.label);
        external.external_modules = self.external_modules;
        external.external_modules.insert(owner.to_string());
        external
    }

    fn set_emitted(&mut self, symbol: &str, emitted: Emitted, path: &str) -> GenResult<()> {
        self.declarations.insert(symbol, emitted.declaration, path)?;
        self.definitions.insert(symbol, emitted.definition, path)
    }
}

/// Name, prefix and location of a type being mapped
#[derive(Debug, Clone, Copy)]
pub struct TypeRequest<'r> {
    pub name: &'r str,
    pub prefix: &'r str,
    /// Schema path, for error reporting
    pub path: &'r str,
}

impl<'r> TypeRequest<'r> {
    pub fn new(name: &'r str, prefix: &'r str, path: &'r str) -> Self {
        Self { name, prefix, path }
    }

    /// Requested name, else the node's title
    pub fn label(&self, node: &SchemaNode) -> GenResult<String> {
        if !self.name.is_empty() {
            return Ok(self.name.to_string());
        }
        node.title
            .as_deref()
            .filter(|title| !title.is_empty())
            .map(str::to_string)
            .ok_or_else(|| GenError::UndeterminedPropertyType {
                path: self.path.to_string(),
            })
    }
}

/// Integers are unsigned only when the schema bounds them below at zero
pub(crate) fn integer_is_unsigned(minimum: Option<f64>) -> bool {
    minimum.is_some_and(|m| m >= 0.0)
}

/// Name an array element is mapped under: its own title, else the array's
pub(crate) fn element_label<'n>(item: &'n SchemaNode, label: &'n str) -> &'n str {
    if item.is_ref() {
        return label;
    }
    item.title.as_deref().filter(|title| !title.is_empty()).unwrap_or(label)
}

/// The single item schema of an array.
///
/// Tuple items must all share one shape; the first is then representative.
pub(crate) fn homogeneous_item<'n>(items: &'n ArrayItems, path: &str) -> GenResult<&'n SchemaNode> {
    match items {
        ArrayItems::Single(item) => Ok(item),
        ArrayItems::Tuple(items) => {
            let (first, rest) = items.split_first().ok_or_else(|| GenError::UndeterminedPropertyType {
                path: path.to_string(),
            })?;
            let key = shape_key(first);
            if rest.iter().all(|item| shape_key(item) == key) {
                Ok(first)
            } else {
                Err(GenError::HeterogeneousArrayItems {
                    path: path.to_string(),
                })
            }
        }
    }
}

fn shape_key(node: &SchemaNode) -> String {
    match &node.kind {
        SchemaKind::Primitive { kind, .. } => kind.keyword().to_string(),
        SchemaKind::Enum { .. } => "enum".to_string(),
        SchemaKind::Const { value, .. } => format!("const:{}", json_type(value)),
        SchemaKind::Object(_) => "object".to_string(),
        SchemaKind::Array(_) => "array".to_string(),
        SchemaKind::Ref(reference) => format!("ref:{reference}"),
        SchemaKind::AllOf(_) | SchemaKind::OneOf(_) | SchemaKind::AnyOf(_) | SchemaKind::Unconstrained => {
            "composite".to_string()
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Schema to native type mapper.
///
/// One mapper is used per module; it holds the reference chain used for
/// cycle detection. Mappers that contribute to the same output share one
/// symbol table.
pub struct NativeMapper<'a> {
    index: &'a SchemaIndex,
    runtime: &'a RuntimeNames,
    wire: WireNames<'a>,
    accessors: AccessorEmitter<'a>,
    resolver: Resolver,
    symbols: SharedSymbols,
}

impl<'a> NativeMapper<'a> {
    pub fn new(index: &'a SchemaIndex, runtime: &'a RuntimeNames) -> Self {
        Self::with_symbols(index, runtime, SymbolTable::shared())
    }

    pub fn with_symbols(index: &'a SchemaIndex, runtime: &'a RuntimeNames, symbols: SharedSymbols) -> Self {
        Self {
            index,
            runtime,
            wire: WireNames::new(runtime),
            accessors: AccessorEmitter::new(runtime),
            resolver: Resolver::new(),
            symbols,
        }
    }

    fn claim(&self, module: &Module, request: &TypeRequest<'_>, kind: SymbolKind, label: &str) -> String {
        self.symbols.borrow_mut().claim(
            self.index,
            module,
            request.path,
            kind,
            &child_prefix(request.prefix, label),
        )
    }

    pub fn map_type(&mut self, module: &Module, node: &SchemaNode, request: &TypeRequest<'_>) -> GenResult<NativeType> {
        if let SchemaKind::Ref(reference) = &node.kind {
            return self.map_ref(module, reference, request);
        }
        let label = request.label(node)?;

        match &node.kind {
            SchemaKind::Const { value, minimum } => self.map_const(value, *minimum, &label, request.path),

            SchemaKind::Enum { values } => {
                let name = qualified_name(&module.title, &self.claim(module, request, SymbolKind::Enum, &label));
                let codec = emit_enum(&name, &label, node.description.as_deref(), values);
                let mut mapped = NativeType::new(
                    name.as_str(),
                    NativeKind::Enum,
                    ValueShape::Enum,
                    self.wire.enumeration(&name),
                    &label,
                );
                mapped.enums.insert(name.as_str(), codec.declaration, request.path)?;
                mapped.conversions.insert(name.as_str(), codec.conversion, request.path)?;
                tracing::debug!(module = %module.title, symbol = %name, cases = values.len(), "mapped enum");
                Ok(mapped)
            }

            SchemaKind::Array(items) => self.map_array(module, items, &label, request),

            SchemaKind::AllOf(members) => {
                let mut merged = merge_all_of(&mut self.resolver, self.index, module, node, members, request.path)?;
                merged.title = node.title.clone().or_else(|| Some(label.clone()));
                self.map_type(module, &merged, request)
            }

            SchemaKind::OneOf(_) | SchemaKind::AnyOf(_) => Err(GenError::UnsupportedUnionSchema {
                path: request.path.to_string(),
            }),

            SchemaKind::Object(object) if object.has_properties() => self.map_object(module, object, &label, request),

            SchemaKind::Object(ObjectSchema {
                additional_properties: Some(additional),
                ..
            }) => self.map_map(module, additional, &label, request),

            SchemaKind::Object(object) if object.pattern_properties => Err(GenError::UnsupportedPatternProperties {
                path: request.path.to_string(),
            }),

            // Free-form object, carried as serialized JSON text
            SchemaKind::Object(_) => Ok(self.string_type(&label)),

            SchemaKind::Primitive { kind, minimum } => Ok(self.primitive(*kind, *minimum, &label)),

            SchemaKind::Ref(_) | SchemaKind::Unconstrained => Err(GenError::UndeterminedPropertyType {
                path: request.path.to_string(),
            }),
        }
    }

    fn map_ref(&mut self, module: &Module, reference: &str, request: &TypeRequest<'_>) -> GenResult<NativeType> {
        let resolved = self.resolver.resolve(reference, module, self.index, request.path)?;
        self.resolver.enter(&resolved, request.path)?;
        let result = self.map_type(
            resolved.owner,
            &resolved.node,
            &TypeRequest::new(&resolved.title, "", &resolved.path),
        );
        self.resolver.leave();

        let mapped = result?;
        if resolved.external {
            tracing::debug!(module = %module.title, reference, owner = %resolved.owner.title, "external reference");
            Ok(mapped.into_external(&resolved.owner.title))
        } else {
            Ok(mapped)
        }
    }

    fn string_type(&self, label: &str) -> NativeType {
        NativeType::new(
            self.runtime.string_handle.as_str(),
            NativeKind::Scalar,
            ValueShape::String,
            self.wire.string(),
            label,
        )
    }

    fn primitive(&self, kind: PrimitiveKind, minimum: Option<f64>, label: &str) -> NativeType {
        let wire = self.wire.primitive(kind, minimum);
        match kind {
            PrimitiveKind::String => self.string_type(label),
            PrimitiveKind::Number => NativeType::new("float", NativeKind::Scalar, ValueShape::Float, wire, label),
            PrimitiveKind::Integer => NativeType::new(
                integer_type(minimum),
                NativeKind::Scalar,
                ValueShape::Integer,
                wire,
                label,
            ),
            PrimitiveKind::Boolean => NativeType::new("bool", NativeKind::Scalar, ValueShape::Boolean, wire, label),
        }
    }

    fn map_const(&self, value: &Value, minimum: Option<f64>, label: &str, path: &str) -> GenResult<NativeType> {
        let kind = match value {
            Value::String(_) => PrimitiveKind::String,
            Value::Bool(_) => PrimitiveKind::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => PrimitiveKind::Integer,
            Value::Number(_) => PrimitiveKind::Number,
            _ => {
                return Err(GenError::UndeterminedPropertyType {
                    path: path.to_string(),
                });
            }
        };
        Ok(self.primitive(kind, minimum, label))
    }

    fn map_array(
        &mut self,
        module: &Module,
        items: &ArrayItems,
        label: &str,
        request: &TypeRequest<'_>,
    ) -> GenResult<NativeType> {
        let item = homogeneous_item(items, request.path)?;
        let items_path = pointer_child(request.path, "items");
        let element_request = TypeRequest::new(element_label(item, label), request.prefix, &items_path);
        let element = self.map_type(module, item, &element_request)?;

        let array_label = if item.is_ref() { element.label.as_str() } else { label };
        let stem = self.claim(module, request, SymbolKind::Array, array_label);
        let base = format!("{}Array", qualified_name(&module.title, &stem));
        let handle = format!("{base}Handle");
        let container = self.wire.array(&element.wire);

        let mut emitted = self.accessors.handle_lifecycle(&handle, &container);
        emitted.append(
            self.accessors
                .array_accessors(&base, &handle, &container, None, &element.accessor_type()),
        );

        let mut mapped = NativeType::new(handle.as_str(), NativeKind::ArrayHandle, ValueShape::Array, container, label);
        mapped.absorb(&element, request.path)?;
        mapped.set_emitted(&handle, emitted, request.path)?;
        tracing::debug!(module = %module.title, symbol = %handle, "mapped array");
        Ok(mapped)
    }

    fn map_object(
        &mut self,
        module: &Module,
        object: &ObjectSchema,
        label: &str,
        request: &TypeRequest<'_>,
    ) -> GenResult<NativeType> {
        let stem = self.claim(module, request, SymbolKind::Object, label);
        let base = qualified_name(&module.title, &stem);
        let handle = format!("{base}Handle");
        let container = self.wire.container(module, &stem);
        let props_path = pointer_child(request.path, "properties");

        let mut mapped = NativeType::new(handle.as_str(), NativeKind::Handle, ValueShape::Object, container.clone(), label);
        let mut emitted = self.accessors.handle_lifecycle(&handle, &container);

        for (name, prop) in object.properties.iter().flatten() {
            let prop_path = pointer_child(&props_path, name);
            let member = PropertyContext {
                base: &base,
                handle: &handle,
                container: &container,
                prefix: &stem,
                optional: object.is_optional(name),
            };
            match self.map_property(module, &member, name, prop, &prop_path) {
                Ok((value, accessors)) => {
                    mapped.absorb(&value, &prop_path)?;
                    emitted.append(accessors);
                }
                Err(err) if err.is_recoverable() => {
                    tracing::warn!(module = %module.title, path = %prop_path, "skipping property: {err}");
                    mapped.push_diagnostic(Diagnostic::from_error(&err));
                }
                Err(err) => return Err(err),
            }
        }

        mapped.set_emitted(&handle, emitted, request.path)?;
        tracing::debug!(module = %module.title, symbol = %handle, "mapped object");
        Ok(mapped)
    }

    /// Property value type and its accessors on the parent handle.
    ///
    /// Inline arrays are reached only through the parent, so they get
    /// `Parent_PropArray_*` accessors instead of a handle of their own.
    fn map_property(
        &mut self,
        module: &Module,
        parent: &PropertyContext<'_>,
        name: &str,
        prop: &SchemaNode,
        path: &str,
    ) -> GenResult<(NativeType, Emitted)> {
        if let SchemaKind::Array(items) = &prop.kind {
            let item = homogeneous_item(items, path)?;
            let items_path = pointer_child(path, "items");
            let element_request = TypeRequest::new(element_label(item, name), parent.prefix, &items_path);
            let element = self.map_type(module, item, &element_request)?;
            let member = capitalize(name);
            let accessors = self.accessors.array_accessors(
                &format!("{}_{member}Array", parent.base),
                parent.handle,
                parent.container,
                Some(&member),
                &element.accessor_type(),
            );
            return Ok((element, accessors));
        }

        let value = self.map_type(module, prop, &TypeRequest::new(name, parent.prefix, path))?;
        let options = PropertyOptions {
            read_only: matches!(prop.kind, SchemaKind::Const { .. }),
            optional: parent.optional,
        };
        let accessors = self
            .accessors
            .property_accessors(parent.base, parent.container, name, &value.accessor_type(), options);
        Ok((value, accessors))
    }

    fn map_map(
        &mut self,
        module: &Module,
        additional: &SchemaNode,
        label: &str,
        request: &TypeRequest<'_>,
    ) -> GenResult<NativeType> {
        let stem = self.claim(module, request, SymbolKind::Map, label);
        let base = qualified_name(&module.title, &stem);
        let handle = format!("{base}Handle");
        let container = self.wire.variant_container();
        let value_path = pointer_child(request.path, "additionalProperties");
        let value = self.map_type(module, additional, &TypeRequest::new("value", &stem, &value_path))?;

        let mut emitted = self.accessors.handle_lifecycle(&handle, &container);
        emitted.append(self.accessors.map_accessors(&base, &container, &value.accessor_type()));

        let mut mapped = NativeType::new(handle.as_str(), NativeKind::MapHandle, ValueShape::Map, container, label);
        mapped.absorb(&value, request.path)?;
        mapped.set_emitted(&handle, emitted, request.path)?;
        tracing::debug!(module = %module.title, symbol = %handle, "mapped map");
        Ok(mapped)
    }
}

/// Parent object of a property being mapped
struct PropertyContext<'p> {
    base: &'p str,
    handle: &'p str,
    container: &'p str,
    prefix: &'p str,
    optional: bool,
}

fn integer_type(minimum: Option<f64>) -> &'static str {
    if integer_is_unsigned(minimum) { "uint32_t" } else { "int32_t" }
}

#[cfg(test)]
#[path = "native/native_tests.rs"]
mod native_tests;
