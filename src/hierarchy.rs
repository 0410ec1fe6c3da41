//! Boundary nesting for the rendered elements of a view.
//!
//! Two containment axes exist: the software axis (system, container, component) used by
//! structural and dynamic views, and the physical axis (deployment node nesting) used by
//! deployment views. Both produce a [`Level`] tree; anything whose parent cannot be placed
//! stays at the level it was found on instead of being dropped.

use crate::identity::Aliases;
use crate::model::{Element, ElementKind, Model};
use indexmap::IndexMap;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Level<'a> {
    pub entries: Vec<Entry<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Entry<'a> {
    Boundary(BoundaryNode<'a>),
    Element(&'a Element),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryNode<'a> {
    pub element: &'a Element,
    pub content: Level<'a>,
}

impl<'a> Entry<'a> {
    pub fn element(&self) -> &'a Element {
        match self {
            Entry::Boundary(node) => node.element,
            Entry::Element(element) => *element,
        }
    }
}

impl<'a> Level<'a> {
    pub fn flat(elements: Vec<&'a Element>) -> Self {
        Self {
            entries: elements.into_iter().map(Entry::Element).collect(),
        }
    }

    /// Level whose entries follow the input position recorded for each of them.
    fn positioned(mut entries: Vec<(usize, Entry<'a>)>) -> Self {
        entries.sort_by_key(|(position, _)| *position);
        Self {
            entries: entries.into_iter().map(|(_, entry)| entry).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn boundaries(&self) -> impl Iterator<Item = &BoundaryNode<'a>> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Boundary(node) => Some(node),
            Entry::Element(_) => None,
        })
    }

    pub fn elements(&self) -> impl Iterator<Item = &'a Element> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Boundary(_) => None,
            Entry::Element(element) => Some(*element),
        })
    }

    /// Sorts every level by alias, boundaries ahead of plain elements.
    pub fn sort_by_alias(&mut self, aliases: &Aliases) {
        self.entries.sort_by(|a, b| {
            let key = |entry: &Entry<'a>| matches!(entry, Entry::Element(_));
            key(a)
                .cmp(&key(b))
                .then_with(|| aliases.get(a.element()).cmp(aliases.get(b.element())))
        });
        for entry in &mut self.entries {
            if let Entry::Boundary(node) = entry {
                node.content.sort_by_alias(aliases);
            }
        }
    }

    /// Visits every element of the tree in entry order; the flag is `true` for boundary
    /// owners.
    pub fn visit(&self, f: &mut impl FnMut(&'a Element, bool)) {
        for entry in &self.entries {
            match entry {
                Entry::Boundary(node) => {
                    f(node.element, true);
                    node.content.visit(f);
                }
                Entry::Element(element) => f(*element, false),
            }
        }
    }
}

fn parent_of_kind<'a>(
    model: &'a Model,
    element: &Element,
    kind: ElementKind,
) -> Option<&'a Element> {
    model.parent(element).filter(|parent| parent.kind == kind)
}

/// Nests components under their container and containers under their software system.
///
/// A component is nested only when its container is part of `elements`. A container is
/// always nested under its software system, which becomes a boundary even when it is not
/// part of `elements` itself. Every entry is placed where its earliest member appears in
/// `elements`, so first-appearance order survives the nesting.
pub fn build_hierarchy<'a>(model: &'a Model, elements: &[&'a Element]) -> Level<'a> {
    let present: HashSet<&str> = elements.iter().map(|e| e.id.as_str()).collect();
    let mut root: Vec<(usize, Entry<'a>)> = Vec::new();
    let mut components: IndexMap<&str, (usize, Vec<&'a Element>)> = IndexMap::new();
    let mut containers = Vec::new();
    let mut systems = Vec::new();

    for (position, &element) in elements.iter().enumerate() {
        match element.kind {
            ElementKind::Component => {
                match parent_of_kind(model, element, ElementKind::Container)
                    .filter(|container| present.contains(container.id.as_str()))
                {
                    Some(container) => components
                        .entry(container.id.as_str())
                        .or_insert_with(|| (position, Vec::new()))
                        .1
                        .push(element),
                    None => root.push((position, Entry::Element(element))),
                }
            }
            ElementKind::Container => containers.push((position, element)),
            ElementKind::SoftwareSystem => systems.push((position, element)),
            _ => root.push((position, Entry::Element(element))),
        }
    }

    let mut by_system: IndexMap<&str, SystemSlot<'a>> = IndexMap::new();
    for (position, container) in containers {
        let (position, entry) = match components.shift_remove(container.id.as_str()) {
            Some((first, children)) => (
                position.min(first),
                Entry::Boundary(BoundaryNode {
                    element: container,
                    content: Level::flat(children),
                }),
            ),
            None => (position, Entry::Element(container)),
        };
        match parent_of_kind(model, container, ElementKind::SoftwareSystem) {
            Some(system) => {
                let slot = by_system
                    .entry(system.id.as_str())
                    .or_insert_with(|| SystemSlot {
                        position,
                        system,
                        content: Vec::new(),
                    });
                slot.position = slot.position.min(position);
                slot.content.push((position, entry));
            }
            None => root.push((position, entry)),
        }
    }

    for (position, system) in systems {
        match by_system.get_mut(system.id.as_str()) {
            Some(slot) => slot.position = slot.position.min(position),
            None => root.push((position, Entry::Element(system))),
        }
    }
    root.extend(by_system.into_values().map(|slot| {
        (
            slot.position,
            Entry::Boundary(BoundaryNode {
                element: slot.system,
                content: Level::positioned(slot.content),
            }),
        )
    }));
    Level::positioned(root)
}

struct SystemSlot<'a> {
    position: usize,
    system: &'a Element,
    content: Vec<(usize, Entry<'a>)>,
}

/// Nests deployment elements under the deployment node that contains them.
///
/// Deployment nodes are always boundaries, possibly empty ones. An element whose parent is
/// not a deployment node of `elements` stays at the root.
pub fn build_deployment_tree<'a>(model: &'a Model, elements: &[&'a Element]) -> Level<'a> {
    let nodes: HashSet<&str> = elements
        .iter()
        .filter(|e| e.kind == ElementKind::DeploymentNode)
        .map(|e| e.id.as_str())
        .collect();
    let mut children: IndexMap<&str, Vec<&'a Element>> = IndexMap::new();
    let mut roots = Vec::new();
    for &element in elements {
        match parent_of_kind(model, element, ElementKind::DeploymentNode)
            .filter(|parent| nodes.contains(parent.id.as_str()))
        {
            Some(parent) => children.entry(parent.id.as_str()).or_default().push(element),
            None => roots.push(element),
        }
    }
    let mut visited = HashSet::new();
    deployment_level(&roots, &children, &mut visited)
}

fn deployment_level<'a>(
    elements: &[&'a Element],
    children: &IndexMap<&str, Vec<&'a Element>>,
    visited: &mut HashSet<&'a str>,
) -> Level<'a> {
    let mut level = Level::default();
    for &element in elements {
        if element.kind != ElementKind::DeploymentNode {
            level.entries.push(Entry::Element(element));
            continue;
        }
        if !visited.insert(element.id.as_str()) {
            continue;
        }
        let content = match children.get(element.id.as_str()) {
            Some(nested) => deployment_level(nested, children, visited),
            None => Level::default(),
        };
        level
            .entries
            .push(Entry::Boundary(BoundaryNode { element, content }));
    }
    level
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(level: &Level<'_>) -> (Vec<String>, Vec<String>) {
        (
            level.boundaries().map(|b| b.element.id.clone()).collect(),
            level.elements().map(|e| e.id.clone()).collect(),
        )
    }

    fn boundary<'l, 'a>(level: &'l Level<'a>, index: usize) -> &'l Level<'a> {
        &level.boundaries().nth(index).unwrap().content
    }

    fn entry_ids(level: &Level<'_>) -> Vec<String> {
        level
            .entries
            .iter()
            .map(|entry| entry.element().id.clone())
            .collect()
    }

    fn shop() -> Model {
        let mut model = Model::new();
        model.add_element(Element::new("user", ElementKind::Person, "User"));
        model.add_element(Element::new("shop", ElementKind::SoftwareSystem, "Shop"));
        model.add_element(Element::new("web", ElementKind::Container, "Web").with_parent("shop"));
        model.add_element(Element::new("db", ElementKind::Container, "DB").with_parent("shop"));
        model.add_element(Element::new("auth", ElementKind::Component, "Auth").with_parent("web"));
        model.add_element(Element::new("mail", ElementKind::Component, "Mail").with_parent("web"));
        model
    }

    fn select<'a>(model: &'a Model, ids: &[&str]) -> Vec<&'a Element> {
        ids.iter().filter_map(|id| model.element(id)).collect()
    }

    #[test]
    fn system_is_inferred_through_the_container() {
        let model = shop();
        let elements = select(&model, &["auth", "web"]);
        let level = build_hierarchy(&model, &elements);

        assert_eq!(ids(&level), (vec!["shop".to_string()], vec![]));
        let system = boundary(&level, 0);
        assert_eq!(ids(system), (vec!["web".to_string()], vec![]));
        assert_eq!(ids(boundary(system, 0)), (vec![], vec!["auth".to_string()]));
    }

    #[test]
    fn entries_keep_first_appearance_order() {
        let model = shop();
        let elements = select(&model, &["user", "web", "db"]);
        let level = build_hierarchy(&model, &elements);
        assert_eq!(entry_ids(&level), ["user", "shop"]);
        assert_eq!(entry_ids(boundary(&level, 0)), ["web", "db"]);
    }

    #[test]
    fn boundaries_take_the_position_of_their_earliest_member() {
        let model = shop();
        let elements = select(&model, &["mail", "user", "db", "web"]);
        let level = build_hierarchy(&model, &elements);
        assert_eq!(entry_ids(&level), ["shop", "user"]);
        let system = boundary(&level, 0);
        assert_eq!(entry_ids(system), ["web", "db"]);
        assert_eq!(entry_ids(boundary(system, 0)), ["mail"]);
    }

    #[test]
    fn sorting_puts_boundaries_first() {
        let model = shop();
        let elements = select(&model, &["user", "web"]);
        let mut level = build_hierarchy(&model, &elements);
        level.sort_by_alias(&Aliases::new(&model));
        assert_eq!(entry_ids(&level), ["shop", "user"]);
    }

    #[test]
    fn components_without_their_container_stay_flat() {
        let model = shop();
        let elements = select(&model, &["user", "auth", "mail"]);
        let level = build_hierarchy(&model, &elements);
        assert_eq!(level.boundaries().count(), 0);
        assert_eq!(level.elements().count(), 3);
    }

    #[test]
    fn containers_share_one_system_boundary() {
        let model = shop();
        let elements = select(&model, &["web", "user", "db", "shop"]);
        let mut level = build_hierarchy(&model, &elements);
        level.sort_by_alias(&Aliases::new(&model));

        assert_eq!(ids(&level), (vec!["shop".to_string()], vec!["user".to_string()]));
        assert_eq!(
            ids(boundary(&level, 0)),
            (vec![], vec!["db".to_string(), "web".to_string()])
        );
    }

    #[test]
    fn orphan_containers_are_not_dropped() {
        let mut model = Model::new();
        model.add_element(Element::new("c", ElementKind::Container, "Loose").with_parent("gone"));
        let elements = select(&model, &["c"]);
        let level = build_hierarchy(&model, &elements);
        assert_eq!(ids(&level), (vec![], vec!["c".to_string()]));
    }

    #[test]
    fn deployment_nodes_nest_recursively() {
        let mut model = Model::new();
        model.add_element(Element::new("aws", ElementKind::DeploymentNode, "AWS"));
        model.add_element(
            Element::new("region", ElementKind::DeploymentNode, "eu-central-1").with_parent("aws"),
        );
        model.add_element(
            Element::new("lb", ElementKind::InfrastructureNode, "LB").with_parent("region"),
        );
        model.add_element(
            Element::new("api", ElementKind::ContainerInstance, "API").with_parent("region"),
        );
        model.add_element(
            Element::new("stray", ElementKind::ContainerInstance, "Stray").with_parent("other"),
        );
        let elements = select(&model, &["api", "lb", "region", "aws", "stray"]);
        let mut level = build_deployment_tree(&model, &elements);
        level.sort_by_alias(&Aliases::new(&model));

        assert_eq!(ids(&level), (vec!["aws".to_string()], vec!["stray".to_string()]));
        let aws = boundary(&level, 0);
        assert_eq!(ids(aws), (vec!["region".to_string()], vec![]));
        assert_eq!(
            ids(boundary(aws, 0)),
            (vec![], vec!["api".to_string(), "lb".to_string()])
        );
    }

    #[test]
    fn empty_deployment_nodes_remain_boundaries() {
        let mut model = Model::new();
        model.add_element(Element::new("n", ElementKind::DeploymentNode, "Node"));
        let elements = select(&model, &["n"]);
        let level = build_deployment_tree(&model, &elements);
        assert_eq!(level.boundaries().count(), 1);
        assert!(boundary(&level, 0).is_empty());
    }
}
