//! Generated symbol ownership
//!
//! Every named native type is owned by exactly one schema, identified by its
//! schema path (`Title#/definitions/X/properties/y`). A stem is claimed for
//! that schema before any name is derived from it; when the symbols of the
//! preferred stem already belong to another schema, the stem gets a `_2`,
//! `_3`, ... suffix until they are free.
//!
//! The top-level definitions of a module are claimed before anything else
//! in it, in declaration order, so their names do not depend on which
//! methods or inline schemas happen to be mapped first. Objects, enums and
//! maps go before arrays, whose names are derived from their element.

use crate::naming::{child_prefix, qualified_name};
use crate::native::homogeneous_item;
use crate::resolver::Resolver;
use nativebind_core::{Module, SchemaIndex, SchemaKind, SchemaNode};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Reference hops followed when naming an array after its element
const MAX_REF_HOPS: usize = 32;

/// What a stem names, which decides the symbols derived from it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// `Module_Stem`
    Enum,
    /// `Module_Stem`, `Module_StemHandle`
    Object,
    /// `Module_Stem`, `Module_StemHandle`
    Map,
    /// `Module_StemArray`, `Module_StemArrayHandle`
    Array,
}

impl SymbolKind {
    /// Symbols a stem of this kind occupies in `module`
    pub fn symbols(self, module: &str, stem: &str) -> Vec<String> {
        let base = qualified_name(module, stem);
        match self {
            SymbolKind::Enum => vec![base],
            SymbolKind::Object | SymbolKind::Map => vec![format!("{base}Handle"), base],
            SymbolKind::Array => vec![format!("{base}ArrayHandle"), format!("{base}Array")],
        }
    }
}

/// Symbol table shared by the mappers of one generation unit
pub type SharedSymbols = Rc<RefCell<SymbolTable>>;

/// Schema path to stem assignments and the symbols they occupy
#[derive(Debug, Default)]
pub struct SymbolTable {
    /// symbol -> schema path that owns it
    owners: HashMap<String, String>,
    /// schema path -> claimed stem
    stems: HashMap<String, String>,
    /// URIs of modules whose definitions are already claimed
    reserved: HashSet<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedSymbols {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Stem for the schema at `path`, declared in `module`.
    ///
    /// The first claim for a path decides its stem; later claims for the
    /// same path return it unchanged.
    pub fn claim(&mut self, index: &SchemaIndex, module: &Module, path: &str, kind: SymbolKind, stem: &str) -> String {
        self.reserve_definitions(index, module);
        self.assign(&module.title, path, kind, stem)
    }

    fn reserve_definitions(&mut self, index: &SchemaIndex, module: &Module) {
        if !self.reserved.insert(module.uri.clone()) {
            return;
        }

        let mut arrays = Vec::new();
        for (name, definition) in &module.definitions {
            let path = module.schema_path(&module.definition_ref(name));
            let label = definition
                .title
                .as_deref()
                .filter(|title| !title.is_empty())
                .unwrap_or(name.as_str());
            let kind = match &definition.kind {
                SchemaKind::Array(items) => {
                    if let Ok(item) = homogeneous_item(items, &path) {
                        let element = if item.is_ref() {
                            final_title(index, module, item)
                        } else {
                            Some(label.to_string())
                        };
                        if let Some(element) = element {
                            arrays.push((path.clone(), child_prefix("", &element)));
                        }
                    }
                    None
                }
                _ => literal_kind(definition),
            };
            if let Some(kind) = kind {
                self.assign(&module.title, &path, kind, &child_prefix("", label));
            }
        }

        for (path, stem) in arrays {
            self.assign(&module.title, &path, SymbolKind::Array, &stem);
        }
        tracing::trace!(module = %module.title, symbols = self.owners.len(), "reserved definition names");
    }

    fn assign(&mut self, module: &str, path: &str, kind: SymbolKind, stem: &str) -> String {
        if let Some(claimed) = self.stems.get(path) {
            return claimed.clone();
        }

        let mut candidate = stem.to_string();
        let mut suffix = 1;
        while kind
            .symbols(module, &candidate)
            .iter()
            .any(|symbol| self.owners.get(symbol).is_some_and(|owner| owner != path))
        {
            suffix += 1;
            candidate = format!("{stem}_{suffix}");
        }
        if suffix > 1 {
            tracing::debug!(module, path, preferred = stem, stem = %candidate, "renamed to avoid a symbol clash");
        }

        for symbol in kind.symbols(module, &candidate) {
            self.owners.insert(symbol, path.to_string());
        }
        self.stems.insert(path.to_string(), candidate.clone());
        candidate
    }
}

/// Kind of a definition that is named after itself
fn literal_kind(definition: &SchemaNode) -> Option<SymbolKind> {
    match &definition.kind {
        SchemaKind::Enum { .. } => Some(SymbolKind::Enum),
        SchemaKind::AllOf(_) => Some(SymbolKind::Object),
        SchemaKind::Object(object) if object.has_properties() => Some(SymbolKind::Object),
        SchemaKind::Object(object) if object.additional_properties.is_some() => Some(SymbolKind::Map),
        _ => None,
    }
}

/// Title of the schema at the end of a `$ref` chain
fn final_title(index: &SchemaIndex, module: &Module, node: &SchemaNode) -> Option<String> {
    let resolver = Resolver::new();
    let mut owner = module;
    let mut current = node.clone();
    let mut title = None;
    for _ in 0..MAX_REF_HOPS {
        let SchemaKind::Ref(reference) = &current.kind else {
            return title;
        };
        let resolved = resolver.resolve(reference, owner, index, &module.title).ok()?;
        title = Some(resolved.title);
        owner = resolved.owner;
        current = resolved.node;
    }
    None
}
