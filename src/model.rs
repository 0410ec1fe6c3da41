//! Read-only view of the architecture model handed to the exporter.
//!
//! Elements and relationships are owned by the modelling side; the exporter only reads
//! them. Both carry a free-form [`PropertyBag`] that the codecs in [`crate::properties`],
//! [`crate::sprite`] and [`crate::style`] use as structured storage.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

pub type PropertyBag = IndexMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementKind {
    Person,
    SoftwareSystem,
    Container,
    Component,
    DeploymentNode,
    InfrastructureNode,
    SoftwareSystemInstance,
    ContainerInstance,
    #[serde(other)]
    Unknown,
}

impl ElementKind {
    pub fn is_deployment(self) -> bool {
        matches!(
            self,
            Self::DeploymentNode
                | Self::InfrastructureNode
                | Self::SoftwareSystemInstance
                | Self::ContainerInstance
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Location {
    #[default]
    Internal,
    External,
}

/// Storage flavour used to pick the `Db`/`Queue` macro variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum C4Type {
    Database,
    Queue,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InteractionStyle {
    #[default]
    Synchronous,
    Asynchronous,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: String,
    pub kind: ElementKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub tags: IndexSet<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: PropertyBag,
    #[serde(default)]
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c4_type: Option<C4Type>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// Element an instance was created from (container or software system).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_of: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<u32>,
}

impl Element {
    pub fn new(id: impl Into<String>, kind: ElementKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            description: None,
            technology: None,
            parent: None,
            tags: IndexSet::new(),
            properties: PropertyBag::new(),
            location: Location::Internal,
            c4_type: None,
            url: None,
            environment: None,
            instance_of: None,
            instance_id: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_technology(mut self, technology: impl Into<String>) -> Self {
        self.technology = Some(technology.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn with_c4_type(mut self, c4_type: C4Type) -> Self {
        self.c4_type = Some(c4_type);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn with_instance_of(mut self, element: impl Into<String>, instance_id: u32) -> Self {
        self.instance_of = Some(element.into());
        self.instance_id = Some(instance_id);
        self
    }

    pub fn is_external(&self) -> bool {
        self.location == Location::External
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: String,
    pub source: String,
    pub destination: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    #[serde(default)]
    pub interaction: InteractionStyle,
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub tags: IndexSet<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: PropertyBag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Relationship {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        destination: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            destination: destination.into(),
            description: description.into(),
            technology: None,
            interaction: InteractionStyle::Synchronous,
            tags: IndexSet::new(),
            properties: PropertyBag::new(),
            url: None,
        }
    }

    pub fn with_technology(mut self, technology: impl Into<String>) -> Self {
        self.technology = Some(technology.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn asynchronous(mut self) -> Self {
        self.interaction = InteractionStyle::Asynchronous;
        self
    }

    pub fn is_asynchronous(&self) -> bool {
        self.interaction == InteractionStyle::Asynchronous
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ModelDocument", into = "ModelDocument")]
pub struct Model {
    elements: IndexMap<String, Element>,
    relationships: IndexMap<String, Relationship>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ModelDocument {
    #[serde(default)]
    elements: Vec<Element>,
    #[serde(default)]
    relationships: Vec<Relationship>,
}

impl From<ModelDocument> for Model {
    fn from(doc: ModelDocument) -> Self {
        let mut model = Model::new();
        for element in doc.elements {
            model.add_element(element);
        }
        for relationship in doc.relationships {
            model.add_relationship(relationship);
        }
        model
    }
}

impl From<Model> for ModelDocument {
    fn from(model: Model) -> Self {
        Self {
            elements: model.elements.into_values().collect(),
            relationships: model.relationships.into_values().collect(),
        }
    }
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_element(&mut self, element: Element) {
        self.elements.insert(element.id.clone(), element);
    }

    pub fn add_relationship(&mut self, relationship: Relationship) {
        self.relationships
            .insert(relationship.id.clone(), relationship);
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    pub fn relationship(&self, id: &str) -> Option<&Relationship> {
        self.relationships.get(id)
    }

    pub fn relationship_mut(&mut self, id: &str) -> Option<&mut Relationship> {
        self.relationships.get_mut(id)
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.values()
    }

    pub fn parent(&self, element: &Element) -> Option<&Element> {
        element.parent.as_deref().and_then(|id| self.element(id))
    }

    /// Walks the parent chain, nearest ancestor first.
    ///
    /// The chain is bounded by the model size, so a corrupted parent link cannot loop.
    pub fn ancestors<'a>(&'a self, element: &'a Element) -> impl Iterator<Item = &'a Element> {
        let mut current = self.parent(element);
        let mut remaining = self.elements.len();
        std::iter::from_fn(move || {
            if remaining == 0 {
                return None;
            }
            remaining -= 1;
            let next = current?;
            current = self.parent(next);
            Some(next)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ancestors_walk_to_the_root() {
        let mut model = Model::new();
        model.add_element(Element::new("s", ElementKind::SoftwareSystem, "Shop"));
        model.add_element(Element::new("c", ElementKind::Container, "Api").with_parent("s"));
        model.add_element(Element::new("k", ElementKind::Component, "Auth").with_parent("c"));

        let component = model.element("k").unwrap();
        let names: Vec<&str> = model
            .ancestors(component)
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["Api", "Shop"]);
    }

    #[test]
    fn ancestors_stop_on_cycles() {
        let mut model = Model::new();
        model.add_element(Element::new("a", ElementKind::Container, "A").with_parent("b"));
        model.add_element(Element::new("b", ElementKind::Container, "B").with_parent("a"));
        let a = model.element("a").unwrap();
        assert_eq!(model.ancestors(a).count(), 2);
    }

    #[test]
    fn unknown_kinds_deserialize() {
        let json = r#"{"elements":[{"id":"x","kind":"customShape","name":"X"}]}"#;
        let model: Model = serde_json::from_str(json).unwrap();
        assert_eq!(model.element("x").unwrap().kind, ElementKind::Unknown);
    }
}
