use crate::model::{Model, PropertyBag};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewKind {
    SystemLandscape,
    SystemContext,
    Container,
    Component,
    Dynamic,
    Sequence,
    Deployment,
}

impl ViewKind {
    /// C4-PlantUML stdlib file every document of this kind includes.
    pub fn stdlib_include(self) -> &'static str {
        match self {
            Self::SystemLandscape | Self::SystemContext => "<C4/C4_Context>",
            Self::Container => "<C4/C4_Container>",
            Self::Component => "<C4/C4_Component>",
            Self::Dynamic => "<C4/C4_Dynamic>",
            Self::Sequence => "<C4/C4_Sequence>",
            Self::Deployment => "<C4/C4_Deployment>",
        }
    }
}

/// One relationship as it appears in a particular view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipView {
    pub relationship: String,
    /// Dot-segmented step token, only meaningful in dynamic views.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Rendered from destination back to source.
    #[serde(default)]
    pub response: bool,
}

impl RelationshipView {
    pub fn new(relationship: impl Into<String>) -> Self {
        Self {
            relationship: relationship.into(),
            order: None,
            description: None,
            response: false,
        }
    }

    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub key: String,
    pub kind: ViewKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Software system of a container view, container of a component view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default)]
    pub elements: Vec<String>,
    #[serde(default)]
    pub relationships: Vec<RelationshipView>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: PropertyBag,
}

impl View {
    pub fn new(key: impl Into<String>, kind: ViewKind) -> Self {
        Self {
            key: key.into(),
            kind,
            title: None,
            description: None,
            scope: None,
            environment: None,
            elements: Vec::new(),
            relationships: Vec::new(),
            properties: PropertyBag::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn add_element(&mut self, id: impl Into<String>) {
        let id = id.into();
        if !self.elements.contains(&id) {
            self.elements.push(id);
        }
    }

    pub fn add_relationship(&mut self, relationship: RelationshipView) {
        self.relationships.push(relationship);
    }

    /// Adds every relationship of `model` whose both ends are already in the view.
    pub fn add_connecting_relationships(&mut self, model: &Model) {
        for relationship in model.relationships() {
            let connects = self.elements.contains(&relationship.source)
                && self.elements.contains(&relationship.destination);
            let present = self
                .relationships
                .iter()
                .any(|view| view.relationship == relationship.id);
            if connects && !present {
                self.relationships
                    .push(RelationshipView::new(relationship.id.clone()));
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub model: Model,
    #[serde(default)]
    pub views: Vec<View>,
    /// View-set configuration; holds the workspace-wide style declarations.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub configuration: PropertyBag,
}

impl Workspace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn view(&self, key: &str) -> Option<&View> {
        self.views.iter().find(|view| view.key == key)
    }
}
