//! `allOf` flattening
//!
//! Members are resolved one hop at a time through the [`Resolver`] (so a
//! member loop is still a [`GenError::CyclicSchemaReference`]), nested
//! `allOf` members are flattened, and the resulting kinds are folded
//! left to right into one synthetic node. The source documents are never
//! touched; every merge builds new nodes.

use crate::resolver::{Resolver, qualify_refs};
use nativebind_core::schema::pointer_child;
use nativebind_core::{
    ArrayItems, GenError, GenResult, Module, ObjectSchema, PrimitiveKind, SchemaIndex, SchemaKind, SchemaNode,
};

/// Merge the members of an `allOf` node.
///
/// The merged node takes `title` and `description` from `outer`; member
/// titles, descriptions and `required` lists are ignored.
pub fn merge_all_of(
    resolver: &mut Resolver,
    index: &SchemaIndex,
    module: &Module,
    outer: &SchemaNode,
    members: &[SchemaNode],
    path: &str,
) -> GenResult<SchemaNode> {
    let mut flat = Vec::with_capacity(members.len());
    flatten(resolver, index, module, members, &pointer_child(path, "allOf"), &mut flat)?;

    let mut merged = SchemaKind::Unconstrained;
    for kind in flat {
        merged = merge_kinds(merged, kind, path)?;
    }

    if let SchemaKind::Object(object) = &mut merged {
        object.required = None;
    }

    Ok(SchemaNode {
        title: outer.title.clone(),
        description: outer.description.clone(),
        kind: merged,
    })
}

fn flatten(
    resolver: &mut Resolver,
    index: &SchemaIndex,
    module: &Module,
    members: &[SchemaNode],
    path: &str,
    out: &mut Vec<SchemaKind>,
) -> GenResult<()> {
    for (i, member) in members.iter().enumerate() {
        collect_member(resolver, index, module, member, &pointer_child(path, &i.to_string()), out)?;
    }
    Ok(())
}

fn collect_member(
    resolver: &mut Resolver,
    index: &SchemaIndex,
    module: &Module,
    member: &SchemaNode,
    path: &str,
    out: &mut Vec<SchemaKind>,
) -> GenResult<()> {
    match &member.kind {
        SchemaKind::Ref(reference) => {
            let resolved = resolver.resolve(reference, module, index, path)?;
            resolver.enter(&resolved, path)?;
            let mut target = resolved.node;
            if resolved.external {
                qualify_refs(&mut target, &resolved.owner.uri);
            }
            let result = collect_member(resolver, index, resolved.owner, &target, &resolved.path, out);
            resolver.leave();
            result
        }
        SchemaKind::AllOf(nested) => flatten(resolver, index, module, nested, &pointer_child(path, "allOf"), out),
        SchemaKind::OneOf(_) | SchemaKind::AnyOf(_) => Err(GenError::UnsupportedUnionSchema {
            path: path.to_string(),
        }),
        other => {
            out.push(other.clone());
            Ok(())
        }
    }
}

fn merge_nodes(left: SchemaNode, right: SchemaNode, path: &str) -> GenResult<SchemaNode> {
    if left == right {
        return Ok(left);
    }
    Ok(SchemaNode {
        title: left.title.or(right.title),
        description: left.description.or(right.description),
        kind: merge_kinds(left.kind, right.kind, path)?,
    })
}

fn merge_kinds(left: SchemaKind, right: SchemaKind, path: &str) -> GenResult<SchemaKind> {
    let conflict = |detail: String| GenError::ConflictingAllOfMerge {
        detail,
        path: path.to_string(),
    };

    match (left, right) {
        (SchemaKind::Unconstrained, other) | (other, SchemaKind::Unconstrained) => Ok(other),

        (SchemaKind::Object(left), SchemaKind::Object(right)) => Ok(SchemaKind::Object(merge_objects(left, right, path)?)),

        (SchemaKind::Enum { values: mut left }, SchemaKind::Enum { values: right }) => {
            for value in right {
                if !left.contains(&value) {
                    left.push(value);
                }
            }
            Ok(SchemaKind::Enum { values: left })
        }

        (
            SchemaKind::Enum { values },
            SchemaKind::Primitive {
                kind: PrimitiveKind::String,
                ..
            },
        )
        | (
            SchemaKind::Primitive {
                kind: PrimitiveKind::String,
                ..
            },
            SchemaKind::Enum { values },
        ) => Ok(SchemaKind::Enum { values }),

        (
            SchemaKind::Primitive { kind: left, minimum: left_min },
            SchemaKind::Primitive { kind: right, minimum: right_min },
        ) => {
            if left != right {
                return Err(conflict(format!("type '{left}' conflicts with type '{right}'")));
            }
            let minimum = match (left_min, right_min) {
                (Some(a), Some(b)) if a != b => {
                    return Err(conflict(format!("minimum {a} conflicts with minimum {b}")));
                }
                (a, b) => a.or(b),
            };
            Ok(SchemaKind::Primitive { kind: left, minimum })
        }

        (
            SchemaKind::Const { value: left, minimum },
            SchemaKind::Const { value: right, .. },
        ) => {
            if left != right {
                return Err(conflict(format!("const {left} conflicts with const {right}")));
            }
            Ok(SchemaKind::Const { value: left, minimum })
        }

        (SchemaKind::Array(ArrayItems::Single(left)), SchemaKind::Array(ArrayItems::Single(right))) => Ok(
            SchemaKind::Array(ArrayItems::Single(Box::new(merge_nodes(*left, *right, &pointer_child(path, "items"))?))),
        ),

        (SchemaKind::Array(left), SchemaKind::Array(right)) => {
            if left != right {
                return Err(conflict("tuple items differ".to_string()));
            }
            Ok(SchemaKind::Array(left))
        }

        (SchemaKind::Ref(left), SchemaKind::Ref(right)) => {
            if left != right {
                return Err(conflict(format!("$ref '{left}' conflicts with $ref '{right}'")));
            }
            Ok(SchemaKind::Ref(left))
        }

        (SchemaKind::OneOf(_) | SchemaKind::AnyOf(_), _) | (_, SchemaKind::OneOf(_) | SchemaKind::AnyOf(_)) => {
            Err(GenError::UnsupportedUnionSchema { path: path.to_string() })
        }

        (left, right) => Err(conflict(format!(
            "{} cannot be merged with {}",
            describe(&left),
            describe(&right)
        ))),
    }
}

fn merge_objects(mut left: ObjectSchema, right: ObjectSchema, path: &str) -> GenResult<ObjectSchema> {
    if let Some(right_props) = right.properties {
        let props_path = pointer_child(path, "properties");
        let left_props = left.properties.get_or_insert_with(Default::default);
        for (name, prop) in right_props {
            match left_props.get_mut(&name) {
                Some(existing) => {
                    let current = std::mem::replace(existing, SchemaNode::new(SchemaKind::Unconstrained));
                    *existing = merge_nodes(current, prop, &pointer_child(&props_path, &name))?;
                }
                None => {
                    left_props.insert(name, prop);
                }
            }
        }
    }

    left.required = match (left.required, right.required) {
        (Some(mut a), Some(b)) => {
            for name in b {
                if !a.contains(&name) {
                    a.push(name);
                }
            }
            Some(a)
        }
        (a, b) => a.or(b),
    };

    left.additional_properties = match (left.additional_properties, right.additional_properties) {
        (Some(a), Some(b)) => Some(Box::new(merge_nodes(
            *a,
            *b,
            &pointer_child(path, "additionalProperties"),
        )?)),
        (a, b) => a.or(b),
    };

    left.pattern_properties |= right.pattern_properties;
    Ok(left)
}

fn describe(kind: &SchemaKind) -> String {
    match kind {
        SchemaKind::Ref(reference) => format!("$ref '{reference}'"),
        SchemaKind::Const { .. } => "const".to_string(),
        SchemaKind::Enum { .. } => "enum".to_string(),
        SchemaKind::Object(_) => "object".to_string(),
        SchemaKind::Array(_) => "array".to_string(),
        SchemaKind::AllOf(_) => "allOf".to_string(),
        SchemaKind::OneOf(_) => "oneOf".to_string(),
        SchemaKind::AnyOf(_) => "anyOf".to_string(),
        SchemaKind::Primitive { kind, .. } => format!("type '{kind}'"),
        SchemaKind::Unconstrained => "unconstrained schema".to_string(),
    }
}
