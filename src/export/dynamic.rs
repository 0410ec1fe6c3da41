//! Dynamic and sequence views.
//!
//! Only the elements reached by the view's relationships are drawn. Steps are ordered by
//! their order tokens; sequence diagrams keep participants in order of first appearance.

use super::{Edge, Flavor, Scene, include_scope_container, resolve_edge};
use crate::error::Result;
use crate::hierarchy::build_hierarchy;
use crate::layout::LayoutDirective;
use crate::model::Model;
use crate::ordering::compare_optional_tokens;
use crate::view::View;
use std::collections::HashSet;

pub(super) fn scene<'a>(
    model: &'a Model,
    view: &'a View,
    directive: &'a LayoutDirective,
) -> Result<Scene<'a>> {
    directive.validate_for_dynamic(&view.key)?;

    let mut scene = Scene::new(model, view, directive);
    let mut edges: Vec<Edge<'a>> = view
        .relationships
        .iter()
        .filter_map(|relationship_view| resolve_edge(model, view, relationship_view))
        .collect();
    edges.sort_by(|a, b| compare_optional_tokens(a.view.order.as_deref(), b.view.order.as_deref()));

    let mut seen = HashSet::new();
    let mut elements = Vec::new();
    for edge in &edges {
        for element in [edge.source, edge.destination] {
            if seen.insert(element.id.as_str()) {
                elements.push(element);
            }
        }
    }

    if view.scope.is_some() {
        include_scope_container(model, view, &mut elements);
    }

    let mut level = build_hierarchy(model, &elements);
    if scene.flavor != Flavor::Sequence {
        level.sort_by_alias(&scene.aliases);
    }
    scene.level = level;
    scene.edges = edges;
    Ok(scene)
}
