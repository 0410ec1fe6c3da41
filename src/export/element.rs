use super::writer::{MacroCall, PumlWriter};
use super::{Flavor, RenderPlan};
use crate::hierarchy::{Entry, Level};
use crate::model::{C4Type, Element, ElementKind, Model, PropertyBag};
use crate::properties::TabularProperty;
use crate::style::StyleKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Person,
    System,
    Container,
    Component,
    DeploymentNode,
    Node,
}

impl Family {
    fn of(kind: ElementKind) -> Option<Self> {
        match kind {
            ElementKind::Person => Some(Family::Person),
            ElementKind::SoftwareSystem | ElementKind::SoftwareSystemInstance => {
                Some(Family::System)
            }
            ElementKind::Container | ElementKind::ContainerInstance => Some(Family::Container),
            ElementKind::Component => Some(Family::Component),
            ElementKind::DeploymentNode => Some(Family::DeploymentNode),
            ElementKind::InfrastructureNode => Some(Family::Node),
            ElementKind::Unknown => None,
        }
    }

    fn base(self) -> &'static str {
        match self {
            Family::Person => "Person",
            Family::System => "System",
            Family::Container => "Container",
            Family::Component => "Component",
            Family::DeploymentNode => "Deployment_Node",
            Family::Node => "Node",
        }
    }
}

/// How an element is drawn. Instances borrow what they lack from the element they
/// instantiate.
struct Appearance<'a> {
    family: Family,
    storage: Option<C4Type>,
    external: bool,
    technology: Option<&'a str>,
    description: Option<&'a str>,
}

impl<'a> Appearance<'a> {
    fn of(model: &'a Model, element: &'a Element) -> Option<Self> {
        let family = Family::of(element.kind)?;
        let template = match element.kind {
            ElementKind::SoftwareSystemInstance | ElementKind::ContainerInstance => element
                .instance_of
                .as_deref()
                .and_then(|id| model.element(id)),
            _ => None,
        };
        Some(Self {
            family,
            storage: element.c4_type.or(template.and_then(|t| t.c4_type)),
            external: element.is_external() || template.is_some_and(Element::is_external),
            technology: element
                .technology
                .as_deref()
                .or(template.and_then(|t| t.technology.as_deref())),
            description: element
                .description
                .as_deref()
                .or(template.and_then(|t| t.description.as_deref())),
        })
    }

    fn macro_name(&self) -> String {
        let mut name = self.family.base().to_string();
        if matches!(
            self.family,
            Family::System | Family::Container | Family::Component
        ) {
            match self.storage {
                Some(C4Type::Database) => name.push_str("Db"),
                Some(C4Type::Queue) => name.push_str("Queue"),
                None => {}
            }
        }
        if self.external && !matches!(self.family, Family::DeploymentNode | Family::Node) {
            name.push_str("_Ext");
        }
        name
    }

    fn has_technology(&self) -> bool {
        !matches!(self.family, Family::Person | Family::System)
    }
}

/// Writes the entries of `level` in the order the scene arranged them.
pub(super) fn write_level(w: &mut PumlWriter, plan: &RenderPlan<'_, '_>, level: &Level<'_>) {
    for entry in &level.entries {
        match entry {
            Entry::Boundary(node) => {
                open_boundary(w, plan, node.element);
                write_level(w, plan, &node.content);
                close_boundary(w, plan);
            }
            Entry::Element(element) => write_element(w, plan, element),
        }
    }
}

fn write_element(w: &mut PumlWriter, plan: &RenderPlan<'_, '_>, element: &Element) {
    let Some(call) = element_call(plan, element) else {
        tracing::warn!(element = element.id.as_str(), "skipping element of unsupported kind");
        return;
    };
    write_properties(w, &element.properties);
    w.line(call.render());
}

fn element_call(plan: &RenderPlan<'_, '_>, element: &Element) -> Option<MacroCall> {
    let look = Appearance::of(plan.scene.model, element)?;
    let mut call = MacroCall::new(look.macro_name())
        .raw(plan.scene.aliases.get(element))
        .quoted(&element.name);
    if look.has_technology() {
        call = call.opt_quoted(look.technology);
    }
    let style_kinds: &[StyleKind] = if element.kind == ElementKind::Person {
        &[StyleKind::Element, StyleKind::Person]
    } else {
        &[StyleKind::Element]
    };
    let sprite = plan.element_sprite(element).map(|sprite| sprite.reference());
    Some(
        call.opt_quoted(look.description)
            .named_quoted("$sprite", sprite.as_deref())
            .named_quoted("$tags", tags_argument(plan, style_kinds, element).as_deref())
            .named_quoted("$link", element.url.as_deref()),
    )
}

fn tags_argument(
    plan: &RenderPlan<'_, '_>,
    kinds: &[StyleKind],
    element: &Element,
) -> Option<String> {
    let tags = plan.styles.applicable_tags(kinds, &element.tags);
    (!tags.is_empty()).then(|| tags.join("+"))
}

fn open_boundary(w: &mut PumlWriter, plan: &RenderPlan<'_, '_>, element: &Element) {
    let call = match element.kind {
        ElementKind::DeploymentNode => element_call(plan, element),
        ElementKind::SoftwareSystem => Some(boundary_call("System_Boundary", plan, element)),
        ElementKind::Container => Some(boundary_call("Container_Boundary", plan, element)),
        _ => None,
    }
    .unwrap_or_else(|| boundary_call("Boundary", plan, element));

    write_properties(w, &element.properties);
    match plan.scene.flavor {
        Flavor::Sequence => w.line(call.render()),
        Flavor::Static | Flavor::Dynamic => w.line(format!("{} {{", call.render())),
    }
    w.indent();
}

fn boundary_call(name: &str, plan: &RenderPlan<'_, '_>, element: &Element) -> MacroCall {
    MacroCall::new(name)
        .raw(plan.scene.aliases.get(element))
        .quoted(&element.name)
        .named_quoted(
            "$tags",
            tags_argument(plan, &[StyleKind::Boundary], element).as_deref(),
        )
        .named_quoted("$link", element.url.as_deref())
}

fn close_boundary(w: &mut PumlWriter, plan: &RenderPlan<'_, '_>) {
    w.dedent();
    match plan.scene.flavor {
        Flavor::Sequence => w.line("Boundary_End()"),
        Flavor::Static | Flavor::Dynamic => w.line("}"),
    }
}

/// `SetPropertyHeader`/`WithoutPropertyHeader` followed by one `AddProperty` per row.
pub(super) fn write_properties(w: &mut PumlWriter, properties: &PropertyBag) {
    let Some(table) = TabularProperty::decode(properties) else {
        return;
    };
    match table.header() {
        Some(header) => w.line(quoted_call("SetPropertyHeader", header).render()),
        None => w.line("WithoutPropertyHeader()"),
    }
    for row in table.rows() {
        w.line(quoted_call("AddProperty", row).render());
    }
}

fn quoted_call(name: &str, values: &[String]) -> MacroCall {
    values
        .iter()
        .fold(MacroCall::new(name), |call, value| call.quoted(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macro_names_follow_kind_storage_and_location() {
        let mut model = Model::new();
        model.add_element(
            Element::new("db", ElementKind::Container, "DB")
                .with_c4_type(C4Type::Database)
                .with_location(crate::model::Location::External)
                .with_technology("Postgres"),
        );
        model.add_element(
            Element::new("i", ElementKind::ContainerInstance, "DB").with_instance_of("db", 1),
        );
        model.add_element(
            Element::new("q", ElementKind::SoftwareSystem, "Bus").with_c4_type(C4Type::Queue),
        );
        model.add_element(
            Element::new("p", ElementKind::Person, "P").with_c4_type(C4Type::Database),
        );

        let name = |id: &str| {
            Appearance::of(&model, model.element(id).unwrap())
                .unwrap()
                .macro_name()
        };
        assert_eq!(name("db"), "ContainerDb_Ext");
        assert_eq!(name("i"), "ContainerDb_Ext");
        assert_eq!(name("q"), "SystemQueue");
        assert_eq!(name("p"), "Person");

        let instance = Appearance::of(&model, model.element("i").unwrap()).unwrap();
        assert_eq!(instance.technology, Some("Postgres"));
    }

    #[test]
    fn property_block_precedes_with_header() {
        let mut bag = PropertyBag::new();
        TabularProperty::with_header(
            ["Property", "Value"],
            vec![vec!["region".to_string(), "eu-central-1".to_string()]],
        )
        .unwrap()
        .encode_into(&mut bag);
        let mut w = PumlWriter::new();
        write_properties(&mut w, &bag);
        assert_eq!(
            w.finish(),
            "SetPropertyHeader(\"Property\", \"Value\")\nAddProperty(\"region\", \"eu-central-1\")\n"
        );
    }

    #[test]
    fn headerless_tables_reset_the_header() {
        let mut bag = PropertyBag::new();
        TabularProperty::new(None, vec![vec!["a".to_string()]])
            .unwrap()
            .encode_into(&mut bag);
        let mut w = PumlWriter::new();
        write_properties(&mut w, &bag);
        assert_eq!(w.finish(), "WithoutPropertyHeader()\nAddProperty(\"a\")\n");
    }
}
