use super::element::write_properties;
use super::writer::{MacroCall, PumlWriter};
use super::{Edge, Flavor, RenderPlan};
use crate::layout::{Direction, EffectiveDirective, Mode};
use crate::style::{ASYNC_DEPENDENCY_TAG, StyleKind};

pub(super) fn write_all(w: &mut PumlWriter, plan: &RenderPlan<'_, '_>) {
    for (position, edge) in plan.scene.edges.iter().enumerate() {
        write_properties(w, &edge.relationship.properties);
        w.line(relationship_call(plan, edge, position).render());
    }
}

fn relationship_call(plan: &RenderPlan<'_, '_>, edge: &Edge<'_>, position: usize) -> MacroCall {
    let relationship = edge.relationship;
    let response = edge.view.response;
    let (from, to) = if response {
        (edge.destination, edge.source)
    } else {
        (edge.source, edge.destination)
    };
    let directive = plan
        .scene
        .directive
        .effective_directive(relationship, response);
    let description = edge
        .view
        .description
        .as_deref()
        .unwrap_or(&relationship.description);
    let order = edge
        .view
        .order
        .clone()
        .unwrap_or_else(|| (position + 1).to_string());

    let mut call = match plan.scene.flavor {
        Flavor::Static => MacroCall::new(static_macro(relationship.id.as_str(), directive)),
        Flavor::Dynamic => {
            MacroCall::new(indexed_macro(directive.direction)).quoted(&order)
        }
        Flavor::Sequence => {
            if directive.direction.is_some() {
                tracing::debug!(
                    relationship = relationship.id.as_str(),
                    "sequence diagrams ignore relationship directions"
                );
            }
            MacroCall::new("Rel")
        }
    };
    call = call
        .raw(plan.scene.aliases.get(from))
        .raw(plan.scene.aliases.get(to))
        .quoted(description)
        .opt_quoted(relationship.technology.as_deref());

    let sprite = plan.edge_sprite(relationship).map(|sprite| sprite.reference());
    let mut tags = plan
        .styles
        .applicable_tags(&[StyleKind::Dependency], &relationship.tags);
    if relationship.is_asynchronous() && !tags.contains(&ASYNC_DEPENDENCY_TAG) {
        tags.push(ASYNC_DEPENDENCY_TAG);
    }
    let tags = (!tags.is_empty()).then(|| tags.join("+"));

    call = call
        .named_quoted("$sprite", sprite.as_deref())
        .named_quoted("$tags", tags.as_deref())
        .named_quoted("$link", relationship.url.as_deref());
    if plan.scene.flavor == Flavor::Sequence {
        call = call.named_quoted("$index", Some(order.as_str()));
    }
    call
}

fn static_macro(id: &str, directive: EffectiveDirective) -> String {
    let mode = match directive.mode {
        Some(Mode::Index) => {
            tracing::warn!(
                relationship = id,
                "index mode only applies to dynamic views, using the default macro"
            );
            Mode::Default
        }
        Some(mode) => mode,
        None => Mode::Default,
    };
    let fixed = match mode {
        Mode::Neighbor => "Rel_Neighbor",
        Mode::Back => "Rel_Back",
        Mode::BackNeighbor => "Rel_Back_Neighbor",
        Mode::Default | Mode::Index => return directed("Rel", directive.direction),
    };
    if directive.direction.is_some() {
        tracing::debug!(
            relationship = id,
            macro_name = fixed,
            "direction ignored for this relationship mode"
        );
    }
    fixed.to_string()
}

fn indexed_macro(direction: Option<Direction>) -> String {
    directed("RelIndex", direction)
}

fn directed(base: &str, direction: Option<Direction>) -> String {
    match direction {
        Some(direction) => format!("{base}_{}", direction.macro_suffix()),
        None => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directive(mode: Option<Mode>, direction: Option<Direction>) -> EffectiveDirective {
        EffectiveDirective { mode, direction }
    }

    #[test]
    fn static_macros() {
        assert_eq!(static_macro("r", directive(None, None)), "Rel");
        assert_eq!(static_macro("r", directive(None, Some(Direction::Up))), "Rel_Up");
        assert_eq!(
            static_macro("r", directive(Some(Mode::Default), Some(Direction::Left))),
            "Rel_Left"
        );
        assert_eq!(
            static_macro("r", directive(Some(Mode::Neighbor), Some(Direction::Left))),
            "Rel_Neighbor"
        );
        assert_eq!(static_macro("r", directive(Some(Mode::Back), None)), "Rel_Back");
        assert_eq!(
            static_macro("r", directive(Some(Mode::BackNeighbor), None)),
            "Rel_Back_Neighbor"
        );
        assert_eq!(
            static_macro("r", directive(Some(Mode::Index), Some(Direction::Down))),
            "Rel_Down"
        );
    }

    #[test]
    fn indexed_macros() {
        assert_eq!(indexed_macro(None), "RelIndex");
        assert_eq!(indexed_macro(Some(Direction::Right)), "RelIndex_Right");
    }
}
