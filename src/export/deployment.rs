use super::{Scene, collect_edges, collect_elements};
use crate::hierarchy::build_deployment_tree;
use crate::layout::LayoutDirective;
use crate::model::Model;
use crate::ordering::relationship_sort_key;
use crate::view::View;

/// Deployment view: nesting follows deployment nodes, not the software structure.
pub(super) fn scene<'a>(
    model: &'a Model,
    view: &'a View,
    directive: &'a LayoutDirective,
) -> Scene<'a> {
    let mut scene = Scene::new(model, view, directive);
    let mut elements = collect_elements(model, view);
    if let Some(environment) = view.environment.as_deref() {
        elements.retain(|element| {
            let keep = element
                .environment
                .as_deref()
                .is_none_or(|own| own == environment);
            if !keep {
                tracing::debug!(
                    view = view.key.as_str(),
                    element = element.id.as_str(),
                    "skipping element of another deployment environment"
                );
            }
            keep
        });
    }

    let mut level = build_deployment_tree(model, &elements);
    level.sort_by_alias(&scene.aliases);
    let mut edges = collect_edges(model, view, &level);
    edges.sort_by_cached_key(|edge| {
        relationship_sort_key(edge.source, edge.destination, &scene.aliases)
    });
    scene.level = level;
    scene.edges = edges;
    scene
}
