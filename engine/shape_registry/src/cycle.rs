//! Cycle detection over the shape-reference graph.
//!
//! A shape referencing another shape (directly, through `Nullable`,
//! `Union`, or an inline sub-shape field) recurses at equal type depth on
//! every value level, so a cycle among such references never terminates.
//! `ListOf`/`MapOf` bound recursion by data depth instead, so they break
//! the edge.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use shape_ir::{Name, ShapeBody, TypeExpr};

use crate::{RegistryError, ShapeEntry};

/// Collect shape names referenced from `ty` without crossing a
/// `ListOf`/`MapOf` boundary.
fn direct_refs(ty: &TypeExpr, out: &mut Vec<Name>) {
    match ty {
        TypeExpr::ShapeRef(name) => out.push(*name),
        TypeExpr::Nullable(inner) => direct_refs(inner, out),
        TypeExpr::Union(alts) => {
            for alt in alts {
                direct_refs(alt, out);
            }
        }
        TypeExpr::InlineShape(body) => body_refs(body, out),
        // Depth-bounded by the data, not the type: breaks the cycle.
        TypeExpr::ListOf(_) | TypeExpr::MapOf(_, _) => {}
        TypeExpr::Scalar(_) | TypeExpr::ClassRef(_) => {}
    }
}

fn body_refs(body: &ShapeBody, out: &mut Vec<Name>) {
    for field in &body.fields {
        direct_refs(&field.ty, out);
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Check the whole registry for shape-reference cycles.
///
/// Names that do not resolve to a registered shape contribute no edges;
/// unresolved references are a validation-time defect, not a seal-time one.
pub(crate) fn check(
    shapes: &BTreeMap<Name, ShapeEntry>,
    display: impl Fn(Name) -> &'static str,
) -> Result<(), RegistryError> {
    let mut marks: FxHashMap<Name, Mark> = FxHashMap::default();

    for &start in shapes.keys() {
        if marks.get(&start) == Some(&Mark::Done) {
            continue;
        }
        let mut trail: Vec<Name> = Vec::new();
        visit(start, shapes, &mut marks, &mut trail, &display)?;
    }
    Ok(())
}

fn visit(
    name: Name,
    shapes: &BTreeMap<Name, ShapeEntry>,
    marks: &mut FxHashMap<Name, Mark>,
    trail: &mut Vec<Name>,
    display: &impl Fn(Name) -> &'static str,
) -> Result<(), RegistryError> {
    match marks.get(&name) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::InProgress) => {
            // Render the cycle from its first occurrence on the trail.
            let from = trail.iter().position(|&n| n == name).unwrap_or(0);
            let mut chain: Vec<&str> = trail[from..].iter().map(|&n| display(n)).collect();
            chain.push(display(name));
            return Err(RegistryError::CyclicShape {
                chain: chain.join(" -> "),
            });
        }
        None => {}
    }

    let Some(entry) = shapes.get(&name) else {
        // Unregistered reference: no edges to follow.
        return Ok(());
    };

    marks.insert(name, Mark::InProgress);
    trail.push(name);

    let mut refs = Vec::new();
    body_refs(entry.body(), &mut refs);
    for target in refs {
        visit(target, shapes, marks, trail, display)?;
    }

    trail.pop();
    marks.insert(name, Mark::Done);
    Ok(())
}
