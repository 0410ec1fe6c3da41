//! Landscape, context, container and component views.

use super::{Scene, collect_edges, collect_elements, include_scope_container};
use crate::hierarchy::{Level, build_hierarchy};
use crate::layout::LayoutDirective;
use crate::model::Model;
use crate::ordering::relationship_sort_key;
use crate::view::{View, ViewKind};

pub(super) fn scene<'a>(
    model: &'a Model,
    view: &'a View,
    directive: &'a LayoutDirective,
) -> Scene<'a> {
    let mut scene = Scene::new(model, view, directive);
    let mut elements = collect_elements(model, view);

    if view.kind == ViewKind::Component {
        include_scope_container(model, view, &mut elements);
    }

    let mut level = match view.kind {
        ViewKind::Container | ViewKind::Component => build_hierarchy(model, &elements),
        _ => Level::flat(elements),
    };
    level.sort_by_alias(&scene.aliases);

    let mut edges = collect_edges(model, view, &level);
    edges.sort_by_cached_key(|edge| {
        relationship_sort_key(edge.source, edge.destination, &scene.aliases)
    });
    scene.level = level;
    scene.edges = edges;
    scene
}
