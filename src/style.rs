//! Tag styles (`AddElementTag`, `AddBoundaryTag`, `AddPersonTag`, `AddRelTag`).
//!
//! Styles are declared either workspace-wide (view-set configuration) or on a single
//! view. Each one is stored as a JSON document under `c4:<kind>Style:<tag>`.

use crate::error::{Error, Result};
use crate::model::PropertyBag;
use crate::sprite::Sprite;
use serde::{Deserialize, Serialize};

/// Tag carried implicitly by asynchronous relationships.
pub const ASYNC_DEPENDENCY_TAG: &str = "Asynchronous";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleKind {
    Element,
    Boundary,
    Person,
    Dependency,
}

impl StyleKind {
    pub const ALL: [StyleKind; 4] = [
        StyleKind::Element,
        StyleKind::Boundary,
        StyleKind::Person,
        StyleKind::Dependency,
    ];

    pub fn property_prefix(self) -> &'static str {
        match self {
            StyleKind::Element => "c4:elementStyle",
            StyleKind::Boundary => "c4:boundaryStyle",
            StyleKind::Person => "c4:personStyle",
            StyleKind::Dependency => "c4:dependencyStyle",
        }
    }

    pub fn macro_name(self) -> &'static str {
        match self {
            StyleKind::Element => "AddElementTag",
            StyleKind::Boundary => "AddBoundaryTag",
            StyleKind::Person => "AddPersonTag",
            StyleKind::Dependency => "AddRelTag",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
    Bold,
}

impl LineStyle {
    pub fn directive(self) -> &'static str {
        match self {
            LineStyle::Solid => "SolidLine()",
            LineStyle::Dashed => "DashedLine()",
            LineStyle::Dotted => "DottedLine()",
            LineStyle::Bold => "BoldLine()",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Shape {
    RoundedBox,
    EightSided,
}

impl Shape {
    pub fn directive(self) -> &'static str {
        match self {
            Shape::RoundedBox => "RoundedBoxShape()",
            Shape::EightSided => "EightSidedShape()",
        }
    }
}

/// Attributes shared by element, boundary and person styles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_style: Option<LineStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadowing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite: Option<Sprite>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend_sprite: Option<Sprite>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStyle {
    tag: String,
    #[serde(flatten)]
    pub attributes: BoxAttributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryStyle {
    tag: String,
    #[serde(flatten)]
    pub attributes: BoxAttributes,
    /// Boundary type label shown instead of the default one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonStyle {
    tag: String,
    #[serde(flatten)]
    pub attributes: BoxAttributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyStyle {
    tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_style: Option<LineStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite: Option<Sprite>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend_sprite: Option<Sprite>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend_text: Option<String>,
}

fn validate_tag(tag: String) -> Result<String> {
    if tag.trim().is_empty() {
        Err(Error::BlankStyleTag)
    } else {
        Ok(tag)
    }
}

macro_rules! box_style_setters {
    ($style:ident) => {
        impl $style {
            pub fn tag(&self) -> &str {
                &self.tag
            }

            pub fn background_color(mut self, color: impl Into<String>) -> Self {
                self.attributes.background_color = Some(color.into());
                self
            }

            pub fn font_color(mut self, color: impl Into<String>) -> Self {
                self.attributes.font_color = Some(color.into());
                self
            }

            pub fn border_color(mut self, color: impl Into<String>) -> Self {
                self.attributes.border_color = Some(color.into());
                self
            }

            pub fn border_style(mut self, style: LineStyle) -> Self {
                self.attributes.border_style = Some(style);
                self
            }

            pub fn border_width(mut self, width: u32) -> Self {
                self.attributes.border_width = Some(width);
                self
            }

            pub fn shadowing(mut self, shadowing: bool) -> Self {
                self.attributes.shadowing = Some(shadowing);
                self
            }

            pub fn shape(mut self, shape: Shape) -> Self {
                self.attributes.shape = Some(shape);
                self
            }

            pub fn sprite(mut self, sprite: impl Into<Sprite>) -> Self {
                self.attributes.sprite = Some(sprite.into());
                self
            }

            pub fn legend_sprite(mut self, sprite: impl Into<Sprite>) -> Self {
                self.attributes.legend_sprite = Some(sprite.into());
                self
            }

            pub fn legend_text(mut self, text: impl Into<String>) -> Self {
                self.attributes.legend_text = Some(text.into());
                self
            }
        }
    };
}

box_style_setters!(ElementStyle);
box_style_setters!(BoundaryStyle);
box_style_setters!(PersonStyle);

impl ElementStyle {
    pub fn new(tag: impl Into<String>) -> Result<Self> {
        Ok(Self {
            tag: validate_tag(tag.into())?,
            attributes: BoxAttributes::default(),
            technology: None,
        })
    }

    pub fn technology(mut self, technology: impl Into<String>) -> Self {
        self.technology = Some(technology.into());
        self
    }
}

impl BoundaryStyle {
    pub fn new(tag: impl Into<String>) -> Result<Self> {
        Ok(Self {
            tag: validate_tag(tag.into())?,
            attributes: BoxAttributes::default(),
            boundary_type: None,
        })
    }

    pub fn boundary_type(mut self, boundary_type: impl Into<String>) -> Self {
        self.boundary_type = Some(boundary_type.into());
        self
    }
}

impl PersonStyle {
    pub fn new(tag: impl Into<String>) -> Result<Self> {
        Ok(Self {
            tag: validate_tag(tag.into())?,
            attributes: BoxAttributes::default(),
            technology: None,
        })
    }

    pub fn technology(mut self, technology: impl Into<String>) -> Self {
        self.technology = Some(technology.into());
        self
    }
}

impl DependencyStyle {
    pub fn new(tag: impl Into<String>) -> Result<Self> {
        Ok(Self {
            tag: validate_tag(tag.into())?,
            font_color: None,
            line_color: None,
            line_style: None,
            line_width: None,
            technology: None,
            sprite: None,
            legend_sprite: None,
            legend_text: None,
        })
    }

    /// Dashed style given to asynchronous relationships without an explicit style.
    pub fn asynchronous_default() -> Self {
        Self {
            tag: ASYNC_DEPENDENCY_TAG.to_string(),
            font_color: None,
            line_color: None,
            line_style: Some(LineStyle::Dashed),
            line_width: None,
            technology: None,
            sprite: None,
            legend_sprite: None,
            legend_text: None,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn font_color(mut self, color: impl Into<String>) -> Self {
        self.font_color = Some(color.into());
        self
    }

    pub fn line_color(mut self, color: impl Into<String>) -> Self {
        self.line_color = Some(color.into());
        self
    }

    pub fn line_style(mut self, style: LineStyle) -> Self {
        self.line_style = Some(style);
        self
    }

    pub fn line_width(mut self, width: u32) -> Self {
        self.line_width = Some(width);
        self
    }

    pub fn technology(mut self, technology: impl Into<String>) -> Self {
        self.technology = Some(technology.into());
        self
    }

    pub fn sprite(mut self, sprite: impl Into<Sprite>) -> Self {
        self.sprite = Some(sprite.into());
        self
    }

    pub fn legend_sprite(mut self, sprite: impl Into<Sprite>) -> Self {
        self.legend_sprite = Some(sprite.into());
        self
    }

    pub fn legend_text(mut self, text: impl Into<String>) -> Self {
        self.legend_text = Some(text.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StyleRecord {
    Element(ElementStyle),
    Boundary(BoundaryStyle),
    Person(PersonStyle),
    Dependency(DependencyStyle),
}

impl From<ElementStyle> for StyleRecord {
    fn from(style: ElementStyle) -> Self {
        StyleRecord::Element(style)
    }
}

impl From<BoundaryStyle> for StyleRecord {
    fn from(style: BoundaryStyle) -> Self {
        StyleRecord::Boundary(style)
    }
}

impl From<PersonStyle> for StyleRecord {
    fn from(style: PersonStyle) -> Self {
        StyleRecord::Person(style)
    }
}

impl From<DependencyStyle> for StyleRecord {
    fn from(style: DependencyStyle) -> Self {
        StyleRecord::Dependency(style)
    }
}

impl StyleRecord {
    pub fn kind(&self) -> StyleKind {
        match self {
            StyleRecord::Element(_) => StyleKind::Element,
            StyleRecord::Boundary(_) => StyleKind::Boundary,
            StyleRecord::Person(_) => StyleKind::Person,
            StyleRecord::Dependency(_) => StyleKind::Dependency,
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            StyleRecord::Element(style) => style.tag(),
            StyleRecord::Boundary(style) => style.tag(),
            StyleRecord::Person(style) => style.tag(),
            StyleRecord::Dependency(style) => style.tag(),
        }
    }

    pub fn sprites(&self) -> impl Iterator<Item = &Sprite> {
        let (sprite, legend) = match self {
            StyleRecord::Element(style) => {
                (&style.attributes.sprite, &style.attributes.legend_sprite)
            }
            StyleRecord::Boundary(style) => {
                (&style.attributes.sprite, &style.attributes.legend_sprite)
            }
            StyleRecord::Person(style) => {
                (&style.attributes.sprite, &style.attributes.legend_sprite)
            }
            StyleRecord::Dependency(style) => (&style.sprite, &style.legend_sprite),
        };
        sprite.iter().chain(legend.iter())
    }

    pub fn property_key(&self) -> String {
        format!("{}:{}", self.kind().property_prefix(), self.tag())
    }

    fn to_json(&self) -> serde_json::Result<String> {
        match self {
            StyleRecord::Element(style) => serde_json::to_string(style),
            StyleRecord::Boundary(style) => serde_json::to_string(style),
            StyleRecord::Person(style) => serde_json::to_string(style),
            StyleRecord::Dependency(style) => serde_json::to_string(style),
        }
    }

    fn from_json(kind: StyleKind, json: &str) -> serde_json::Result<Self> {
        Ok(match kind {
            StyleKind::Element => StyleRecord::Element(serde_json::from_str(json)?),
            StyleKind::Boundary => StyleRecord::Boundary(serde_json::from_str(json)?),
            StyleKind::Person => StyleRecord::Person(serde_json::from_str(json)?),
            StyleKind::Dependency => StyleRecord::Dependency(serde_json::from_str(json)?),
        })
    }

    /// Stores the style in `bag`, replacing an earlier declaration with the same tag.
    pub fn store(&self, bag: &mut PropertyBag) {
        match self.to_json() {
            Ok(json) => {
                bag.insert(self.property_key(), json);
            }
            Err(err) => tracing::warn!(tag = self.tag(), error = %err, "cannot encode style"),
        }
    }
}

/// Style declarations decoded from one property bag, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleStore {
    records: Vec<StyleRecord>,
}

impl StyleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_properties(bag: &PropertyBag) -> Self {
        let mut records = Vec::new();
        for (key, value) in bag {
            let Some(kind) = StyleKind::ALL.into_iter().find(|kind| {
                key.strip_prefix(kind.property_prefix())
                    .and_then(|rest| rest.strip_prefix(':'))
                    .is_some()
            }) else {
                continue;
            };
            match StyleRecord::from_json(kind, value) {
                Ok(record) => records.push(record),
                Err(err) => {
                    tracing::warn!(
                        key = key.as_str(),
                        error = %err,
                        "ignoring malformed style record"
                    );
                }
            }
        }
        Self { records }
    }

    pub fn push(&mut self, record: impl Into<StyleRecord>) {
        self.records.push(record.into());
    }

    pub fn of_kind(&self, kind: StyleKind) -> impl Iterator<Item = &StyleRecord> {
        self.records.iter().filter(move |record| record.kind() == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
