//! `$ref` resolution against the schema index
//!
//! Resolution is one hop: a reference is turned into its owning module and
//! target node, and the caller maps that node (which may itself be a ref).
//! The resolver also tracks the chain of references currently being mapped
//! so that a reference loop is reported instead of recursing forever.

use nativebind_core::{ArrayItems, GenError, GenResult, Module, SchemaIndex, SchemaKind, SchemaNode};

/// Target of one `$ref` hop
#[derive(Debug, Clone)]
pub struct Resolved<'a> {
    /// Module that owns the target node
    pub owner: &'a Module,
    pub node: SchemaNode,
    /// Target `title`, else the last segment of the fragment
    pub title: String,
    /// Owner is not the module the reference was found in
    pub external: bool,
    /// `uri#fragment`, unique per target across the index
    pub key: String,
    /// `Title#/fragment` of the target, for error reporting
    pub path: String,
}

/// Reference resolver with an in-progress chain for cycle detection
#[derive(Debug, Default)]
pub struct Resolver {
    chain: Vec<String>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `reference` as seen from `current`.
    ///
    /// `#/a/b` is local to `current`. `uri#/a/b` is looked up in `index`
    /// unless `uri` is `current`'s own URI.
    pub fn resolve<'a>(
        &self,
        reference: &str,
        current: &'a Module,
        index: &'a SchemaIndex,
        path: &str,
    ) -> GenResult<Resolved<'a>> {
        let (uri, fragment) = match reference.split_once('#') {
            Some((uri, fragment)) => (uri, format!("#{fragment}")),
            None => (reference, "#".to_string()),
        };

        let owner = if uri.is_empty() || uri == current.uri {
            current
        } else {
            index.get(uri).ok_or_else(|| GenError::UnknownModuleReference {
                reference: reference.to_string(),
                path: path.to_string(),
            })?
        };

        let raw = owner
            .resolve_fragment(&fragment)
            .ok_or_else(|| GenError::UnresolvedReference {
                reference: reference.to_string(),
                path: path.to_string(),
            })?;

        let target_path = owner.schema_path(&fragment);
        let node = SchemaNode::parse(raw, &target_path)?;
        let title = node.title.clone().unwrap_or_else(|| last_segment(&fragment));

        Ok(Resolved {
            external: owner.uri != current.uri,
            key: format!("{}{}", owner.uri, fragment),
            path: target_path,
            owner,
            node,
            title,
        })
    }

    /// Push `resolved` onto the in-progress chain.
    ///
    /// Fails with [`GenError::CyclicSchemaReference`] when the target is
    /// already being mapped further up the chain.
    pub fn enter(&mut self, resolved: &Resolved<'_>, path: &str) -> GenResult<()> {
        if self.chain.contains(&resolved.key) {
            let mut chain = self.chain.clone();
            chain.push(resolved.key.clone());
            return Err(GenError::CyclicSchemaReference {
                chain,
                path: path.to_string(),
            });
        }
        self.chain.push(resolved.key.clone());
        Ok(())
    }

    pub fn leave(&mut self) {
        self.chain.pop();
    }

    pub fn depth(&self) -> usize {
        self.chain.len()
    }
}

/// Rewrite local refs under `node` so they stay valid outside their owner
pub fn qualify_refs(node: &mut SchemaNode, owner_uri: &str) {
    match &mut node.kind {
        SchemaKind::Ref(reference) => {
            if reference.starts_with('#') {
                *reference = format!("{owner_uri}{reference}");
            }
        }
        SchemaKind::Object(object) => {
            if let Some(props) = &mut object.properties {
                props.values_mut().for_each(|p| qualify_refs(p, owner_uri));
            }
            if let Some(additional) = &mut object.additional_properties {
                qualify_refs(additional, owner_uri);
            }
        }
        SchemaKind::Array(ArrayItems::Single(item)) => qualify_refs(item, owner_uri),
        SchemaKind::Array(ArrayItems::Tuple(items))
        | SchemaKind::AllOf(items)
        | SchemaKind::OneOf(items)
        | SchemaKind::AnyOf(items) => items.iter_mut().for_each(|i| qualify_refs(i, owner_uri)),
        SchemaKind::Const { .. }
        | SchemaKind::Enum { .. }
        | SchemaKind::Primitive { .. }
        | SchemaKind::Unconstrained => {}
    }
}

/// Unescaped last JSON-pointer segment of a fragment
fn last_segment(fragment: &str) -> String {
    fragment
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .replace("~1", "/")
        .replace("~0", "~")
}
