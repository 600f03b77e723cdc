//! Wire container mapping
//!
//! Maps a schema node to the serialization-layer type used to encode and
//! decode it on the transport. Objects with properties become generated
//! `JSON::Container` classes; everything else maps onto a runtime wrapper.
//! Resolution, merging and naming are shared with the native mapper so both
//! sides agree on every generated name; a shared [`SymbolTable`] makes them
//! agree on disambiguated names too.

use crate::fragments::Fragments;
use crate::merge::merge_all_of;
use crate::naming::{capitalize, child_prefix, qualified_name};
use crate::native::{TypeRequest, element_label, homogeneous_item, integer_is_unsigned};
use crate::resolver::Resolver;
use crate::symbols::{SharedSymbols, SymbolKind, SymbolTable};
use indexmap::IndexSet;
use nativebind_core::schema::pointer_child;
use nativebind_core::{
    Diagnostic, GenError, GenResult, Module, ObjectSchema, PrimitiveKind, RuntimeNames, SchemaIndex, SchemaKind,
    SchemaNode,
};
use serde_json::Value;

/// Wire-side descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct WireType {
    /// Fully qualified container type
    pub name: String,
    /// Container class definitions this type depends on, children first
    pub definitions: Fragments,
    pub diagnostics: Vec<Diagnostic>,
    pub external_modules: IndexSet<String>,
}

impl WireType {
    fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definitions: Fragments::new(),
            diagnostics: Vec::new(),
            external_modules: IndexSet::new(),
        }
    }

    fn absorb(&mut self, other: &WireType, path: &str) -> GenResult<()> {
        self.definitions.merge(&other.definitions, path)?;
        for diagnostic in &other.diagnostics {
            if !self.diagnostics.contains(diagnostic) {
                self.diagnostics.push(diagnostic.clone());
            }
        }
        self.external_modules.extend(other.external_modules.iter().cloned());
        Ok(())
    }
}

/// Wire type names of the runtime serialization layer
#[derive(Debug, Clone, Copy)]
pub struct WireNames<'a> {
    runtime: &'a RuntimeNames,
}

impl<'a> WireNames<'a> {
    pub fn new(runtime: &'a RuntimeNames) -> Self {
        Self { runtime }
    }

    /// Unqualified container class name for an object's claimed stem
    pub fn class_name(stem: &str) -> String {
        format!("JsonData_{stem}")
    }

    /// Qualified container class name, `SDK::Module::JsonData_Stem`
    pub fn container(&self, module: &Module, stem: &str) -> String {
        format!(
            "{}::{}::{}",
            self.runtime.sdk_namespace,
            capitalize(&module.title),
            Self::class_name(stem)
        )
    }

    pub fn string(&self) -> String {
        format!("{}::JSON::String", self.runtime.sdk_namespace)
    }

    pub fn json(&self, wrapper: &str) -> String {
        format!("{}::{wrapper}", self.runtime.json_namespace)
    }

    pub fn integer(&self, minimum: Option<f64>) -> String {
        if integer_is_unsigned(minimum) {
            self.json("DecUInt32")
        } else {
            self.json("DecSInt32")
        }
    }

    pub fn primitive(&self, kind: PrimitiveKind, minimum: Option<f64>) -> String {
        match kind {
            PrimitiveKind::String => self.string(),
            PrimitiveKind::Number => self.json("Float"),
            PrimitiveKind::Integer => self.integer(minimum),
            PrimitiveKind::Boolean => self.json("Boolean"),
        }
    }

    /// Wrapper for a `const` literal, `None` for non-scalar literals
    pub fn constant(&self, value: &Value, minimum: Option<f64>) -> Option<String> {
        match value {
            Value::String(_) => Some(self.string()),
            Value::Bool(_) => Some(self.json("Boolean")),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(self.integer(minimum)),
            Value::Number(_) => Some(self.json("Float")),
            _ => None,
        }
    }

    pub fn enumeration(&self, native: &str) -> String {
        format!("{}<{native}>", self.json("EnumType"))
    }

    pub fn array(&self, element: &str) -> String {
        format!("{}<{element}>", self.json("ArrayType"))
    }

    pub fn variant_container(&self) -> String {
        self.json("VariantContainer")
    }
}

pub struct WireMapper<'a> {
    index: &'a SchemaIndex,
    names: WireNames<'a>,
    resolver: Resolver,
    symbols: SharedSymbols,
}

impl<'a> WireMapper<'a> {
    pub fn new(index: &'a SchemaIndex, runtime: &'a RuntimeNames) -> Self {
        Self::with_symbols(index, runtime, SymbolTable::shared())
    }

    pub fn with_symbols(index: &'a SchemaIndex, runtime: &'a RuntimeNames, symbols: SharedSymbols) -> Self {
        Self {
            index,
            names: WireNames::new(runtime),
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

    pub fn map_type(&mut self, module: &Module, node: &SchemaNode, request: &TypeRequest<'_>) -> GenResult<WireType> {
        if let SchemaKind::Ref(reference) = &node.kind {
            return self.map_ref(module, reference, request);
        }
        let label = request.label(node)?;

        match &node.kind {
            SchemaKind::Const { value, minimum } => self
                .names
                .constant(value, *minimum)
                .map(WireType::named)
                .ok_or_else(|| GenError::UndeterminedPropertyType {
                    path: request.path.to_string(),
                }),

            SchemaKind::Enum { .. } => {
                let stem = self.claim(module, request, SymbolKind::Enum, &label);
                Ok(WireType::named(self.names.enumeration(&qualified_name(&module.title, &stem))))
            }

            SchemaKind::Array(items) => {
                let item = homogeneous_item(items, request.path)?;
                let items_path = pointer_child(request.path, "items");
                let element_request = TypeRequest::new(element_label(item, &label), request.prefix, &items_path);
                let element = self.map_type(module, item, &element_request)?;
                let mut mapped = WireType::named(self.names.array(&element.name));
                mapped.absorb(&element, request.path)?;
                Ok(mapped)
            }

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
            }) => {
                let value_path = pointer_child(request.path, "additionalProperties");
                let stem = self.claim(module, request, SymbolKind::Map, &label);
                let value = self.map_type(module, additional, &TypeRequest::new("value", &stem, &value_path))?;
                let mut mapped = WireType::named(self.names.variant_container());
                mapped.absorb(&value, request.path)?;
                Ok(mapped)
            }

            SchemaKind::Object(object) if object.pattern_properties => Err(GenError::UnsupportedPatternProperties {
                path: request.path.to_string(),
            }),

            SchemaKind::Object(_) => Ok(WireType::named(self.names.string())),

            SchemaKind::Primitive { kind, minimum } => Ok(WireType::named(self.names.primitive(*kind, *minimum))),

            SchemaKind::Ref(_) | SchemaKind::Unconstrained => Err(GenError::UndeterminedPropertyType {
                path: request.path.to_string(),
            }),
        }
    }

    fn map_ref(&mut self, module: &Module, reference: &str, request: &TypeRequest<'_>) -> GenResult<WireType> {
        let resolved = self.resolver.resolve(reference, module, self.index, request.path)?;
        self.resolver.enter(&resolved, request.path)?;
        let result = self.map_type(
            resolved.owner,
            &resolved.node,
            &TypeRequest::new(&resolved.title, "", &resolved.path),
        );
        self.resolver.leave();

        let mapped = result?;
        if !resolved.external {
            return Ok(mapped);
        }
        let mut external = WireType::named(mapped.name);
        external.external_modules = mapped.external_modules;
        external.external_modules.insert(resolved.owner.title.clone());
        Ok(external)
    }

    fn map_object(
        &mut self,
        module: &Module,
        object: &ObjectSchema,
        label: &str,
        request: &TypeRequest<'_>,
    ) -> GenResult<WireType> {
        let stem = self.claim(module, request, SymbolKind::Object, label);
        let class = WireNames::class_name(&stem);
        let mut mapped = WireType::named(self.names.container(module, &stem));
        let props_path = pointer_child(request.path, "properties");

        let mut members = Vec::new();
        for (name, prop) in object.properties.iter().flatten() {
            let prop_path = pointer_child(&props_path, name);
            match self.map_type(module, prop, &TypeRequest::new(name, &stem, &prop_path)) {
                Ok(member) => {
                    mapped.absorb(&member, &prop_path)?;
                    members.push((name.as_str(), member.name));
                }
                Err(err) if err.is_recoverable() => {
                    tracing::warn!(module = %module.title, path = %prop_path, "skipping container member: {err}");
                    let diagnostic = Diagnostic::from_error(&err);
                    if !mapped.diagnostics.contains(&diagnostic) {
                        mapped.diagnostics.push(diagnostic);
                    }
                }
                Err(err) => return Err(err),
            }
        }

        tracing::debug!(module = %module.title, container = %class, members = members.len(), "mapped container");
        mapped
            .definitions
            .insert(class.clone(), container_class(&class, &self.names.json("Container"), &members), request.path)?;
        Ok(mapped)
    }
}

/// `class JsonData_X : public JSON::Container` with one member per property
fn container_class(class: &str, base: &str, members: &[(&str, String)]) -> String {
    let mut code = format!(
        "    class {class} : public {base} {{\n    public:\n        ~{class}() override = default;\n\n    public:\n        {class}()\n            : {base}()\n        {{\n"
    );
    for (name, _) in members {
        code.push_str(&format!("            Add(_T(\"{name}\"), &{});\n", capitalize(name)));
    }
    code.push_str(&format!("        }}\n\n        {class}(const {class}& copy)\n            : {base}()\n        {{\n"));
    for (name, _) in members {
        code.push_str(&format!("            Add(_T(\"{name}\"), &{});\n", capitalize(name)));
    }
    for (name, _) in members {
        let member = capitalize(name);
        code.push_str(&format!("            {member} = copy.{member};\n"));
    }
    code.push_str(&format!("        }}\n\n        {class}& operator=(const {class}& rhs)\n        {{\n"));
    for (name, _) in members {
        let member = capitalize(name);
        code.push_str(&format!("            {member} = rhs.{member};\n"));
    }
    code.push_str("            return (*this);\n        }\n\n    public:\n");
    for (name, ty) in members {
        code.push_str(&format!("        {ty} {};\n", capitalize(name)));
    }
    code.push_str("    };\n");
    code
}

#[cfg(test)]
#[path = "wire/wire_tests.rs"]
mod wire_tests;
