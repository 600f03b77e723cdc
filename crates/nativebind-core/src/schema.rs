//! Schema document model
//!
//! JSON-Schema and OpenRPC documents are parsed once into owned, immutable
//! [`SchemaNode`] trees. Each node is classified into exactly one
//! [`SchemaKind`] so that the emitters can match exhaustively instead of
//! probing ad hoc JSON shapes.
//!
//! Classification precedence, first match wins:
//!
//! | Keyword(s) | Kind |
//! |------------|------|
//! | `$ref` | [`SchemaKind::Ref`] |
//! | `const` | [`SchemaKind::Const`] |
//! | `enum` on a string | [`SchemaKind::Enum`] |
//! | `type: array` | [`SchemaKind::Array`] |
//! | `allOf` / `oneOf` / `anyOf` | [`SchemaKind::AllOf`] / [`SchemaKind::OneOf`] / [`SchemaKind::AnyOf`] |
//! | `type: object`, `properties`, `additionalProperties`, `patternProperties` | [`SchemaKind::Object`] |
//! | `type: string \| number \| integer \| boolean` | [`SchemaKind::Primitive`] |
//! | anything else | [`SchemaKind::Unconstrained`] |

use crate::error::{GenError, GenResult};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Scalar JSON-Schema type keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    String,
    Number,
    Integer,
    Boolean,
}

impl PrimitiveKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "string" => Some(PrimitiveKind::String),
            "number" => Some(PrimitiveKind::Number),
            "integer" => Some(PrimitiveKind::Integer),
            "boolean" => Some(PrimitiveKind::Boolean),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Boolean => "boolean",
        }
    }
}

impl std::fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One JSON-Schema fragment
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: SchemaKind,
}

/// Supported schema constructs
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    Ref(String),
    Const {
        value: Value,
        minimum: Option<f64>,
    },
    Enum {
        values: Vec<String>,
    },
    Object(ObjectSchema),
    Array(ArrayItems),
    AllOf(Vec<SchemaNode>),
    OneOf(Vec<SchemaNode>),
    AnyOf(Vec<SchemaNode>),
    Primitive {
        kind: PrimitiveKind,
        minimum: Option<f64>,
    },
    Unconstrained,
}

/// Object keywords
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    pub properties: Option<IndexMap<String, SchemaNode>>,
    pub required: Option<Vec<String>>,
    /// Only object-valued `additionalProperties`; booleans are not maps
    pub additional_properties: Option<Box<SchemaNode>>,
    pub pattern_properties: bool,
}

impl ObjectSchema {
    pub fn has_properties(&self) -> bool {
        self.properties.as_ref().is_some_and(|props| !props.is_empty())
    }

    /// A property is optional only when a `required` list exists and omits it.
    pub fn is_optional(&self, property: &str) -> bool {
        self.required
            .as_ref()
            .is_some_and(|required| !required.iter().any(|r| r == property))
    }
}

/// Array `items`
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayItems {
    Single(Box<SchemaNode>),
    Tuple(Vec<SchemaNode>),
}

impl SchemaNode {
    /// Node with no title or description
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            title: None,
            description: None,
            kind,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Parse a schema value. `path` is used for error reporting only.
    pub fn parse(value: &Value, path: &str) -> GenResult<SchemaNode> {
        let map = match value {
            Value::Object(map) => map,
            Value::Bool(_) => return Ok(SchemaNode::new(SchemaKind::Unconstrained)),
            other => {
                return Err(GenError::InvalidSchema {
                    detail: format!("expected a schema object, found {other}"),
                    path: path.to_string(),
                });
            }
        };

        Ok(SchemaNode {
            title: string_field(map, "title"),
            description: string_field(map, "description"),
            kind: parse_kind(map, path)?,
        })
    }

    pub fn is_ref(&self) -> bool {
        matches!(self.kind, SchemaKind::Ref(_))
    }

    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match &self.kind {
            SchemaKind::Object(object) => Some(object),
            _ => None,
        }
    }

    /// `$ref` strings anywhere under this node, in document order
    pub fn collect_refs<'a>(&'a self, out: &mut Vec<&'a str>) {
        match &self.kind {
            SchemaKind::Ref(reference) => out.push(reference),
            SchemaKind::Object(object) => {
                if let Some(props) = &object.properties {
                    props.values().for_each(|p| p.collect_refs(out));
                }
                if let Some(additional) = &object.additional_properties {
                    additional.collect_refs(out);
                }
            }
            SchemaKind::Array(ArrayItems::Single(item)) => item.collect_refs(out),
            SchemaKind::Array(ArrayItems::Tuple(items))
            | SchemaKind::AllOf(items)
            | SchemaKind::OneOf(items)
            | SchemaKind::AnyOf(items) => items.iter().for_each(|i| i.collect_refs(out)),
            SchemaKind::Const { .. }
            | SchemaKind::Enum { .. }
            | SchemaKind::Primitive { .. }
            | SchemaKind::Unconstrained => {}
        }
    }
}

/// Append a JSON pointer segment, escaping `~` and `/`
pub fn pointer_child(path: &str, segment: &str) -> String {
    let escaped = segment.replace('~', "~0").replace('/', "~1");
    format!("{path}/{escaped}")
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

fn parse_kind(map: &Map<String, Value>, path: &str) -> GenResult<SchemaKind> {
    if let Some(reference) = map.get("$ref") {
        let reference = reference.as_str().ok_or_else(|| GenError::InvalidSchema {
            detail: "$ref must be a string".to_string(),
            path: path.to_string(),
        })?;
        return Ok(SchemaKind::Ref(reference.to_string()));
    }

    let minimum = map.get("minimum").and_then(Value::as_f64);

    if let Some(value) = map.get("const") {
        return Ok(SchemaKind::Const {
            value: value.clone(),
            minimum,
        });
    }

    let type_keyword = type_keyword(map, path)?;

    if let Some(Value::Array(values)) = map.get("enum") {
        let string_typed = type_keyword == Some("string")
            || (type_keyword.is_none() && values.iter().all(Value::is_string));
        if string_typed {
            let values = values
                .iter()
                .map(|v| {
                    v.as_str().map(str::to_string).ok_or_else(|| GenError::InvalidSchema {
                        detail: format!("non-string value {v} in string enum"),
                        path: path.to_string(),
                    })
                })
                .collect::<GenResult<Vec<_>>>()?;
            return Ok(SchemaKind::Enum { values });
        }
    }

    if type_keyword == Some("array") {
        let items_path = pointer_child(path, "items");
        return match map.get("items") {
            Some(Value::Array(items)) => {
                let items = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| SchemaNode::parse(item, &pointer_child(&items_path, &i.to_string())))
                    .collect::<GenResult<Vec<_>>>()?;
                Ok(SchemaKind::Array(ArrayItems::Tuple(items)))
            }
            Some(item) => Ok(SchemaKind::Array(ArrayItems::Single(Box::new(
                SchemaNode::parse(item, &items_path)?,
            )))),
            None => Ok(SchemaKind::Unconstrained),
        };
    }

    for (keyword, ctor) in [
        ("allOf", SchemaKind::AllOf as fn(Vec<SchemaNode>) -> SchemaKind),
        ("oneOf", SchemaKind::OneOf),
        ("anyOf", SchemaKind::AnyOf),
    ] {
        if let Some(members) = map.get(keyword) {
            return Ok(ctor(parse_members(members, &pointer_child(path, keyword))?));
        }
    }

    let object_like = type_keyword == Some("object")
        || map.contains_key("properties")
        || map.contains_key("additionalProperties")
        || map.contains_key("patternProperties");
    if object_like {
        return Ok(SchemaKind::Object(parse_object(map, path)?));
    }

    Ok(match type_keyword.and_then(PrimitiveKind::from_keyword) {
        Some(kind) => SchemaKind::Primitive { kind, minimum },
        None => SchemaKind::Unconstrained,
    })
}

/// `type` as a single keyword. `["string", "null"]` collapses to `string`.
fn type_keyword<'a>(map: &'a Map<String, Value>, path: &str) -> GenResult<Option<&'a str>> {
    match map.get("type") {
        None => Ok(None),
        Some(Value::String(keyword)) => Ok(Some(keyword.as_str())),
        Some(Value::Array(keywords)) => {
            let non_null: Vec<&str> = keywords
                .iter()
                .filter_map(Value::as_str)
                .filter(|k| *k != "null")
                .collect();
            match non_null.as_slice() {
                [] => Ok(None),
                [single] => Ok(Some(*single)),
                _ => Err(GenError::InvalidSchema {
                    detail: format!("multiple types {non_null:?} are not supported"),
                    path: path.to_string(),
                }),
            }
        }
        Some(other) => Err(GenError::InvalidSchema {
            detail: format!("invalid type keyword {other}"),
            path: path.to_string(),
        }),
    }
}

fn parse_members(members: &Value, path: &str) -> GenResult<Vec<SchemaNode>> {
    let members = members.as_array().ok_or_else(|| GenError::InvalidSchema {
        detail: "composition keyword must be an array".to_string(),
        path: path.to_string(),
    })?;
    members
        .iter()
        .enumerate()
        .map(|(i, member)| SchemaNode::parse(member, &pointer_child(path, &i.to_string())))
        .collect()
}

fn parse_object(map: &Map<String, Value>, path: &str) -> GenResult<ObjectSchema> {
    let properties = match map.get("properties") {
        Some(Value::Object(props)) => {
            let props_path = pointer_child(path, "properties");
            let mut parsed = IndexMap::with_capacity(props.len());
            for (name, prop) in props {
                parsed.insert(name.clone(), SchemaNode::parse(prop, &pointer_child(&props_path, name))?);
            }
            Some(parsed)
        }
        _ => None,
    };

    let required = match map.get("required") {
        Some(Value::Array(names)) => Some(names.iter().filter_map(Value::as_str).map(str::to_string).collect()),
        _ => None,
    };

    let additional_properties = match map.get("additionalProperties") {
        Some(value @ Value::Object(_)) => Some(Box::new(SchemaNode::parse(
            value,
            &pointer_child(path, "additionalProperties"),
        )?)),
        _ => None,
    };

    let pattern_properties = matches!(map.get("patternProperties"), Some(Value::Object(p)) if !p.is_empty());

    Ok(ObjectSchema {
        properties,
        required,
        additional_properties,
        pattern_properties,
    })
}

// ============================================================================
// Modules
// ============================================================================

/// Whether a document is a bare schema library or an OpenRPC API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    Schema,
    OpenRpc,
}

/// A named schema or OpenRPC document
#[derive(Debug, Clone)]
pub struct Module {
    /// `$id`, falling back to the title
    pub uri: String,
    pub title: String,
    pub kind: ModuleKind,
    /// `#/definitions` or `#/components/schemas`
    pub definitions_root: String,
    pub definitions: IndexMap<String, SchemaNode>,
    pub methods: Vec<Method>,
    /// Raw document, used to resolve JSON pointers
    pub document: Value,
}

/// One OpenRPC method
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub summary: Option<String>,
    pub params: Vec<Param>,
    pub result: Option<MethodResult>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub required: bool,
    pub summary: Option<String>,
    pub schema: SchemaNode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodResult {
    pub name: String,
    pub schema: SchemaNode,
}

impl Method {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }
}

impl Module {
    /// Parse a module from JSON text
    pub fn from_json(content: &str) -> GenResult<Self> {
        let document: Value = serde_json::from_str(content)?;
        Self::from_value(document)
    }

    /// Parse a module from an already-decoded document
    pub fn from_value(document: Value) -> GenResult<Self> {
        let title = document
            .pointer("/info/title")
            .or_else(|| document.get("title"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| GenError::InvalidSchema {
                detail: "document has neither info.title nor title".to_string(),
                path: "#".to_string(),
            })?;

        let uri = document
            .get("$id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| title.clone());

        let kind = if document.get("openrpc").is_some() || document.get("methods").is_some() {
            ModuleKind::OpenRpc
        } else {
            ModuleKind::Schema
        };

        let (definitions_root, raw_definitions) = if let Some(Value::Object(defs)) = document.get("definitions") {
            ("#/definitions", Some(defs))
        } else if let Some(Value::Object(defs)) = document.pointer("/components/schemas") {
            ("#/components/schemas", Some(defs))
        } else if kind == ModuleKind::OpenRpc {
            ("#/components/schemas", None)
        } else {
            ("#/definitions", None)
        };

        let mut definitions = IndexMap::new();
        for (name, raw) in raw_definitions.into_iter().flatten() {
            let path = pointer_child(&format!("{title}{definitions_root}"), name);
            definitions.insert(name.clone(), SchemaNode::parse(raw, &path)?);
        }

        let methods = match document.get("methods") {
            Some(Value::Array(methods)) => methods
                .iter()
                .enumerate()
                .map(|(i, m)| parse_method(m, &format!("{title}#/methods/{i}")))
                .collect::<GenResult<Vec<_>>>()?,
            _ => Vec::new(),
        };

        Ok(Module {
            uri,
            title,
            kind,
            definitions_root: definitions_root.to_string(),
            definitions,
            methods,
            document,
        })
    }

    pub fn name(&self) -> &str {
        &self.title
    }

    /// Local `$ref` pointing at a named definition of this module
    pub fn definition_ref(&self, name: &str) -> String {
        pointer_child(&self.definitions_root, name)
    }

    /// Look up a `#/...` fragment in the raw document
    pub fn resolve_fragment(&self, fragment: &str) -> Option<&Value> {
        let pointer = fragment.strip_prefix('#').unwrap_or(fragment);
        if pointer.is_empty() {
            Some(&self.document)
        } else {
            self.document.pointer(pointer)
        }
    }

    /// Human-readable location of a fragment, `Title#/a/b`
    pub fn schema_path(&self, fragment: &str) -> String {
        format!("{}{}", self.title, fragment)
    }
}

fn parse_method(value: &Value, path: &str) -> GenResult<Method> {
    let invalid = |detail: &str| GenError::InvalidSchema {
        detail: detail.to_string(),
        path: path.to_string(),
    };

    let name = value
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("method has no name"))?
        .to_string();

    let mut params = Vec::new();
    if let Some(Value::Array(raw_params)) = value.get("params") {
        for (i, raw) in raw_params.iter().enumerate() {
            let param_path = format!("{path}/params/{i}");
            let param_name = raw
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| invalid("param has no name"))?;
            let schema = match raw.get("schema") {
                Some(schema) => SchemaNode::parse(schema, &pointer_child(&param_path, "schema"))?,
                None => SchemaNode::new(SchemaKind::Unconstrained),
            };
            params.push(Param {
                name: param_name.to_string(),
                required: raw.get("required").and_then(Value::as_bool).unwrap_or(false),
                summary: raw.get("summary").and_then(Value::as_str).map(str::to_string),
                schema,
            });
        }
    }

    let result = match value.get("result") {
        Some(raw) => Some(MethodResult {
            name: raw.get("name").and_then(Value::as_str).unwrap_or(name.as_str()).to_string(),
            schema: match raw.get("schema") {
                Some(schema) => SchemaNode::parse(schema, &format!("{path}/result/schema"))?,
                None => SchemaNode::new(SchemaKind::Unconstrained),
            },
        }),
        None => None,
    };

    let tags = match value.get("tags") {
        Some(Value::Array(tags)) => tags
            .iter()
            .filter_map(|t| t.get("name").and_then(Value::as_str))
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    Ok(Method {
        name,
        summary: value.get("summary").and_then(Value::as_str).map(str::to_string),
        params,
        result,
        tags,
    })
}

/// URI-keyed set of modules, immutable for one generation run
#[derive(Debug, Clone, Default)]
pub struct SchemaIndex {
    modules: IndexMap<String, Module>,
}

impl SchemaIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a module, returning any module previously stored under its URI
    pub fn insert(&mut self, module: Module) -> Option<Module> {
        self.modules.insert(module.uri.clone(), module)
    }

    pub fn get(&self, uri: &str) -> Option<&Module> {
        self.modules.get(uri)
    }

    pub fn find_by_title(&self, title: &str) -> Option<&Module> {
        self.modules.values().find(|m| m.title == title)
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl FromIterator<Module> for SchemaIndex {
    fn from_iter<I: IntoIterator<Item = Module>>(iter: I) -> Self {
        let mut index = SchemaIndex::new();
        for module in iter {
            index.insert(module);
        }
        index
    }
}
