//! C4-PlantUML document generation.
//!
//! Each view is turned into a [`Scene`] (rendered elements nested into boundaries plus
//! ordered relationships) by the orchestrator for its kind, then written out as header,
//! body, relationships and footer.

mod deployment;
mod dynamic;
mod element;
mod footer;
mod header;
mod relationship;
mod static_view;
mod writer;

use crate::error::Result;
use crate::hierarchy::Level;
use crate::icons::{IconCatalog, MapIconCatalog};
use crate::identity::Aliases;
use crate::layout::LayoutDirective;
use crate::model::{Element, ElementKind, Model, Relationship};
use crate::resolve::{AppliedStyles, SpriteRequirements, TagUsage, resolve_sprite};
use crate::sprite::Sprite;
use crate::style::{StyleKind, StyleStore};
use crate::view::{RelationshipView, View, ViewKind, Workspace};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use writer::PumlWriter;

/// Everything an export needs besides the workspace itself.
///
/// Read-only while exporting, so one context can serve several threads.
#[derive(Clone)]
pub struct ExportContext {
    layouts: HashMap<String, LayoutDirective>,
    styles: StyleStore,
    icons: Arc<dyn IconCatalog>,
}

impl fmt::Debug for ExportContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportContext")
            .field("layouts", &self.layouts)
            .field("styles", &self.styles)
            .finish_non_exhaustive()
    }
}

impl Default for ExportContext {
    fn default() -> Self {
        Self {
            layouts: HashMap::new(),
            styles: StyleStore::new(),
            icons: Arc::new(MapIconCatalog::new()),
        }
    }
}

impl ExportContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context with the workspace-wide styles declared in the view-set configuration.
    pub fn for_workspace(workspace: &Workspace) -> Self {
        Self::default().with_styles(StyleStore::from_properties(&workspace.configuration))
    }

    pub fn with_styles(mut self, styles: StyleStore) -> Self {
        self.styles = styles;
        self
    }

    pub fn with_icons(mut self, icons: impl IconCatalog + 'static) -> Self {
        self.icons = Arc::new(icons);
        self
    }

    pub fn with_layout(mut self, view_key: impl Into<String>, directive: LayoutDirective) -> Self {
        self.set_layout(view_key, directive);
        self
    }

    pub fn set_layout(&mut self, view_key: impl Into<String>, directive: LayoutDirective) {
        self.layouts.insert(view_key.into(), directive);
    }

    pub fn layout(&self, view_key: &str) -> &LayoutDirective {
        self.layouts
            .get(view_key)
            .unwrap_or_else(|| LayoutDirective::neutral())
    }

    pub fn styles(&self) -> &StyleStore {
        &self.styles
    }

    pub fn icons(&self) -> &dyn IconCatalog {
        self.icons.as_ref()
    }
}

/// One rendered view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub key: String,
    pub content: String,
}

impl Document {
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.key, extension.trim_start_matches('.'))
    }
}

pub fn export_view(ctx: &ExportContext, workspace: &Workspace, view: &View) -> Result<Document> {
    tracing::debug!(view = view.key.as_str(), kind = ?view.kind, "exporting view");
    let directive = ctx.layout(&view.key);
    let scene = match view.kind {
        ViewKind::SystemLandscape
        | ViewKind::SystemContext
        | ViewKind::Container
        | ViewKind::Component => static_view::scene(&workspace.model, view, directive),
        ViewKind::Dynamic | ViewKind::Sequence => {
            dynamic::scene(&workspace.model, view, directive)?
        }
        ViewKind::Deployment => deployment::scene(&workspace.model, view, directive),
    };
    let content = RenderPlan::new(ctx, &scene).render();
    Ok(Document {
        key: view.key.clone(),
        content,
    })
}

/// Exports every view; a failing view does not affect the others.
pub fn export_workspace(
    ctx: &ExportContext,
    workspace: &Workspace,
) -> Vec<(String, Result<Document>)> {
    workspace
        .views
        .iter()
        .map(|view| (view.key.clone(), export_view(ctx, workspace, view)))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flavor {
    Static,
    Dynamic,
    Sequence,
}

impl Flavor {
    fn of(kind: ViewKind) -> Self {
        match kind {
            ViewKind::Dynamic => Flavor::Dynamic,
            ViewKind::Sequence => Flavor::Sequence,
            _ => Flavor::Static,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Edge<'a> {
    pub view: &'a RelationshipView,
    pub relationship: &'a Relationship,
    pub source: &'a Element,
    pub destination: &'a Element,
}

pub(crate) struct Scene<'a> {
    pub model: &'a Model,
    pub view: &'a View,
    pub directive: &'a LayoutDirective,
    pub aliases: Aliases,
    pub flavor: Flavor,
    pub level: Level<'a>,
    pub edges: Vec<Edge<'a>>,
}

impl<'a> Scene<'a> {
    pub(crate) fn new(model: &'a Model, view: &'a View, directive: &'a LayoutDirective) -> Self {
        Self {
            model,
            view,
            directive,
            aliases: Aliases::new(model),
            flavor: Flavor::of(view.kind),
            level: Level::default(),
            edges: Vec::new(),
        }
    }

    /// Elements that own a sprite slot: every leaf, plus deployment node boundaries.
    fn sprite_bearers(&self) -> Vec<&'a Element> {
        let mut bearers = Vec::new();
        self.level.visit(&mut |element, boundary| {
            if !boundary || element.kind == ElementKind::DeploymentNode {
                bearers.push(element);
            }
        });
        bearers
    }
}

/// Looks up the elements a view lists, skipping dangling ids and unsupported kinds.
pub(crate) fn collect_elements<'a>(model: &'a Model, view: &View) -> Vec<&'a Element> {
    let mut seen = HashSet::new();
    let mut elements = Vec::new();
    for id in &view.elements {
        if !seen.insert(id.as_str()) {
            continue;
        }
        if let Some(element) = renderable(model, view, id) {
            elements.push(element);
        }
    }
    elements
}

/// Adds the container a view is scoped to, so its components are drawn inside it.
pub(crate) fn include_scope_container<'a>(
    model: &'a Model,
    view: &View,
    elements: &mut Vec<&'a Element>,
) {
    let scope = view
        .scope
        .as_deref()
        .and_then(|id| renderable(model, view, id))
        .filter(|scope| scope.kind == ElementKind::Container);
    match scope {
        Some(container) if !elements.iter().any(|e| e.id == container.id) => {
            elements.push(container);
        }
        Some(_) => {}
        None => tracing::debug!(view = view.key.as_str(), "view has no container scope"),
    }
}

pub(crate) fn renderable<'a>(model: &'a Model, view: &View, id: &str) -> Option<&'a Element> {
    let Some(element) = model.element(id) else {
        tracing::warn!(
            view = view.key.as_str(),
            element = id,
            "view references an unknown element"
        );
        return None;
    };
    if element.kind == ElementKind::Unknown {
        tracing::warn!(
            view = view.key.as_str(),
            element = id,
            "skipping element of unsupported kind"
        );
        return None;
    }
    Some(element)
}

/// Resolves the view's relationships whose both ends are rendered.
pub(crate) fn collect_edges<'a>(
    model: &'a Model,
    view: &'a View,
    level: &Level<'a>,
) -> Vec<Edge<'a>> {
    let mut rendered = HashSet::new();
    level.visit(&mut |element, _| {
        rendered.insert(element.id.as_str());
    });
    view.relationships
        .iter()
        .filter_map(|relationship_view| {
            let edge = resolve_edge(model, view, relationship_view)?;
            if rendered.contains(edge.source.id.as_str())
                && rendered.contains(edge.destination.id.as_str())
            {
                Some(edge)
            } else {
                tracing::debug!(
                    view = view.key.as_str(),
                    relationship = edge.relationship.id.as_str(),
                    "skipping relationship with an end outside the view"
                );
                None
            }
        })
        .collect()
}

pub(crate) fn resolve_edge<'a>(
    model: &'a Model,
    view: &View,
    relationship_view: &'a RelationshipView,
) -> Option<Edge<'a>> {
    let id = relationship_view.relationship.as_str();
    let Some(relationship) = model.relationship(id) else {
        tracing::warn!(
            view = view.key.as_str(),
            relationship = id,
            "view references an unknown relationship"
        );
        return None;
    };
    Some(Edge {
        view: relationship_view,
        relationship,
        source: renderable(model, view, &relationship.source)?,
        destination: renderable(model, view, &relationship.destination)?,
    })
}

/// A scene plus the styles and sprites resolved for it.
pub(crate) struct RenderPlan<'s, 'a> {
    pub scene: &'s Scene<'a>,
    pub styles: AppliedStyles,
    element_sprites: HashMap<&'a str, Sprite>,
    edge_sprites: HashMap<&'a str, Sprite>,
}

impl<'s, 'a> RenderPlan<'s, 'a> {
    pub(crate) fn new(ctx: &ExportContext, scene: &'s Scene<'a>) -> Self {
        let mut usage = TagUsage::new();
        let mut element_sprites = HashMap::new();
        for element in scene.sprite_bearers() {
            if let Some(sprite) = resolve_sprite(&element.properties, ctx.icons()) {
                element_sprites.insert(element.id.as_str(), sprite);
            }
        }
        scene.level.visit(&mut |element, boundary| {
            let kinds: &[StyleKind] = match (element.kind, boundary) {
                (ElementKind::Person, _) => &[StyleKind::Element, StyleKind::Person],
                (ElementKind::DeploymentNode, _) | (_, false) => &[StyleKind::Element],
                (_, true) => &[StyleKind::Boundary],
            };
            for kind in kinds {
                usage.record(*kind, &element.tags);
            }
        });

        let mut edge_sprites = HashMap::new();
        for edge in &scene.edges {
            usage.record(StyleKind::Dependency, &edge.relationship.tags);
            if edge.relationship.is_asynchronous() {
                usage.record_asynchronous();
            }
            if let Some(sprite) = resolve_sprite(&edge.relationship.properties, ctx.icons()) {
                edge_sprites.insert(edge.relationship.id.as_str(), sprite);
            }
        }

        let local = StyleStore::from_properties(&scene.view.properties);
        Self {
            scene,
            styles: AppliedStyles::resolve(ctx.styles(), &local, &usage),
            element_sprites,
            edge_sprites,
        }
    }

    pub(crate) fn element_sprite(&self, element: &Element) -> Option<&Sprite> {
        self.element_sprites.get(element.id.as_str())
    }

    pub(crate) fn edge_sprite(&self, relationship: &Relationship) -> Option<&Sprite> {
        self.edge_sprites.get(relationship.id.as_str())
    }

    pub(crate) fn sprite_requirements(&self) -> SpriteRequirements {
        SpriteRequirements::collect(
            self.element_sprites
                .values()
                .chain(self.edge_sprites.values())
                .chain(self.styles.records().flat_map(|record| record.sprites())),
        )
    }

    pub(crate) fn render(&self) -> String {
        let mut w = PumlWriter::new();
        header::write(&mut w, self);
        element::write_level(&mut w, self, &self.scene.level);
        w.blank();
        relationship::write_all(&mut w, self);
        footer::write(&mut w, self);
        w.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_file_names() {
        let document = Document {
            key: "containers".to_string(),
            content: String::new(),
        };
        assert_eq!(document.file_name("puml"), "containers.puml");
        assert_eq!(document.file_name(".wsd"), "containers.wsd");
    }

    #[test]
    fn context_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ExportContext>();
    }

    #[test]
    fn unregistered_views_use_the_neutral_directive() {
        let ctx = ExportContext::new().with_layout(
            "a",
            LayoutDirective {
                node_sep: Some(10),
                ..Default::default()
            },
        );
        assert_eq!(ctx.layout("a").node_sep, Some(10));
        assert_eq!(ctx.layout("b").node_sep, None);
    }

    #[test]
    fn unknown_kinds_and_dangling_ids_are_skipped() {
        let mut model = Model::new();
        model.add_element(Element::new("u", ElementKind::Person, "User"));
        model.add_element(Element::new("x", ElementKind::Unknown, "Custom"));
        let mut view = View::new("v", ViewKind::SystemContext);
        for id in ["u", "x", "missing", "u"] {
            view.elements.push(id.to_string());
        }
        let elements = collect_elements(&model, &view);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].id, "u");
    }
}
