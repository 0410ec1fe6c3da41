use super::writer::{MacroCall, PumlWriter};
use super::RenderPlan;
use crate::style::{BoxAttributes, DependencyStyle, StyleRecord};

pub(super) fn write(w: &mut PumlWriter, plan: &RenderPlan<'_, '_>) {
    let view = plan.scene.view;
    let directive = plan.scene.directive;

    w.line(format!("@startuml(id={})", view.key));
    if let Some(title) = view.title.as_deref().filter(|t| !t.is_empty()) {
        w.line(format!("title {}", single_line(title)));
    }
    if let Some(description) = view.description.as_deref().filter(|d| !d.is_empty()) {
        w.line(format!("caption {}", single_line(description)));
    }
    w.blank();

    w.line(format!("!include {}", view.kind.stdlib_include()));
    let requirements = plan.sprite_requirements();
    for include in &requirements.includes {
        w.line(format!("!include {include}"));
    }
    for definition in &requirements.definitions {
        w.line(definition);
    }
    w.blank();

    if let Some(node_sep) = directive.node_sep {
        w.line(format!("skinparam nodesep {node_sep}"));
    }
    if let Some(rank_sep) = directive.rank_sep {
        w.line(format!("skinparam ranksep {rank_sep}"));
    }
    if let Some(line_type) = directive.line_type {
        w.line(format!("skinparam linetype {}", line_type.skin_value()));
    }
    if let Some(layout) = directive.layout {
        w.line(layout.directive());
    }
    if directive.show_person_outline {
        w.line("SHOW_PERSON_OUTLINE()");
    }
    if directive.hide_stereotypes {
        w.line("HIDE_STEREOTYPE()");
    }
    w.blank();

    for record in plan.styles.records() {
        w.line(tag_definition(record).render());
    }
    w.blank();
}

fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

pub(super) fn tag_definition(record: &StyleRecord) -> MacroCall {
    let call = MacroCall::new(record.kind().macro_name()).quoted(record.tag());
    match record {
        StyleRecord::Element(style) => box_attributes(call, &style.attributes)
            .named_quoted("$techn", style.technology.as_deref()),
        StyleRecord::Person(style) => box_attributes(call, &style.attributes)
            .named_quoted("$techn", style.technology.as_deref()),
        StyleRecord::Boundary(style) => box_attributes(call, &style.attributes)
            .named_quoted("$type", style.boundary_type.as_deref()),
        StyleRecord::Dependency(style) => dependency_attributes(call, style),
    }
}

fn box_attributes(call: MacroCall, attributes: &BoxAttributes) -> MacroCall {
    let sprite = attributes.sprite.as_ref().map(|s| s.reference());
    let legend_sprite = attributes.legend_sprite.as_ref().map(|s| s.reference());
    let shadowing = attributes.shadowing.map(|s| s.to_string());
    let border_width = attributes.border_width.map(|w| w.to_string());
    call.named_quoted("$bgColor", attributes.background_color.as_deref())
        .named_quoted("$fontColor", attributes.font_color.as_deref())
        .named_quoted("$borderColor", attributes.border_color.as_deref())
        .named_quoted("$shadowing", shadowing.as_deref())
        .named_raw("$shape", attributes.shape.map(|s| s.directive()))
        .named_quoted("$sprite", sprite.as_deref())
        .named_quoted("$legendText", attributes.legend_text.as_deref())
        .named_quoted("$legendSprite", legend_sprite.as_deref())
        .named_raw("$borderStyle", attributes.border_style.map(|s| s.directive()))
        .named_quoted("$borderThickness", border_width.as_deref())
}

fn dependency_attributes(call: MacroCall, style: &DependencyStyle) -> MacroCall {
    let sprite = style.sprite.as_ref().map(|s| s.reference());
    let legend_sprite = style.legend_sprite.as_ref().map(|s| s.reference());
    let line_width = style.line_width.map(|w| w.to_string());
    call.named_quoted("$textColor", style.font_color.as_deref())
        .named_quoted("$lineColor", style.line_color.as_deref())
        .named_raw("$lineStyle", style.line_style.map(|s| s.directive()))
        .named_quoted("$sprite", sprite.as_deref())
        .named_quoted("$techn", style.technology.as_deref())
        .named_quoted("$legendText", style.legend_text.as_deref())
        .named_quoted("$legendSprite", legend_sprite.as_deref())
        .named_quoted("$lineThickness", line_width.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{BoundaryStyle, ElementStyle, LineStyle, Shape};

    #[test]
    fn element_tag_definition() {
        let record: StyleRecord = ElementStyle::new("critical")
            .unwrap()
            .background_color("#ff0000")
            .shadowing(true)
            .shape(Shape::RoundedBox)
            .border_style(LineStyle::Dashed)
            .border_width(2)
            .technology("Rust")
            .into();
        assert_eq!(
            tag_definition(&record).render(),
            r##"AddElementTag("critical", $bgColor="#ff0000", $shadowing="true", $shape=RoundedBoxShape(), $borderStyle=DashedLine(), $borderThickness="2", $techn="Rust")"##
        );
    }

    #[test]
    fn boundary_and_dependency_tag_definitions() {
        let boundary: StyleRecord = BoundaryStyle::new("k8s")
            .unwrap()
            .border_color("blue")
            .boundary_type("Cluster")
            .into();
        assert_eq!(
            tag_definition(&boundary).render(),
            r#"AddBoundaryTag("k8s", $borderColor="blue", $type="Cluster")"#
        );
        let dependency: StyleRecord = DependencyStyle::asynchronous_default().into();
        assert_eq!(
            tag_definition(&dependency).render(),
            r#"AddRelTag("Asynchronous", $lineStyle=DashedLine())"#
        );
    }
}
