//! Per-view layout directives: skin parameters, legend, and the ordered dependency
//! rules that steer relationship direction and mode.

use crate::error::{Error, Result};
use crate::model::Relationship;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn inverse(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn macro_suffix(self) -> &'static str {
        match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::Left => "Left",
            Direction::Right => "Right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    Default,
    Neighbor,
    Back,
    BackNeighbor,
    /// Index-based relationship macro; only meaningful in dynamic diagrams.
    Index,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineType {
    Ortho,
    Polyline,
}

impl LineType {
    pub fn skin_value(self) -> &'static str {
        match self {
            LineType::Ortho => "ortho",
            LineType::Polyline => "polyline",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Legend {
    #[default]
    Show,
    Floating,
    None,
}

impl Legend {
    pub fn directive(self) -> Option<&'static str> {
        match self {
            Legend::Show => Some("SHOW_LEGEND()"),
            Legend::Floating => Some("SHOW_FLOATING_LEGEND()"),
            Legend::None => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagramLayout {
    TopDown,
    LeftRight,
    Landscape,
}

impl DiagramLayout {
    pub fn directive(self) -> &'static str {
        match self {
            DiagramLayout::TopDown => "LAYOUT_TOP_DOWN()",
            DiagramLayout::LeftRight => "LAYOUT_LEFT_RIGHT()",
            DiagramLayout::Landscape => "LAYOUT_LANDSCAPE()",
        }
    }
}

pub type RelationshipFilter = Arc<dyn Fn(&Relationship) -> bool + Send + Sync>;

/// One rule of a view's dependency configuration list.
#[derive(Clone)]
pub struct DependencyConfiguration {
    filter: RelationshipFilter,
    pub direction: Option<Direction>,
    pub mode: Option<Mode>,
}

impl fmt::Debug for DependencyConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyConfiguration")
            .field("direction", &self.direction)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl DependencyConfiguration {
    pub fn new(filter: impl Fn(&Relationship) -> bool + Send + Sync + 'static) -> Self {
        Self {
            filter: Arc::new(filter),
            direction: None,
            mode: None,
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn matches(&self, relationship: &Relationship) -> bool {
        (self.filter)(relationship)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LayoutDirective {
    pub node_sep: Option<u32>,
    pub rank_sep: Option<u32>,
    pub line_type: Option<LineType>,
    pub legend: Legend,
    pub layout: Option<DiagramLayout>,
    pub show_person_outline: bool,
    pub hide_stereotypes: bool,
    pub dependency_configurations: Vec<DependencyConfiguration>,
}

static NEUTRAL: Lazy<LayoutDirective> = Lazy::new(LayoutDirective::default);

impl LayoutDirective {
    /// Directive used for views without a registered one.
    pub fn neutral() -> &'static LayoutDirective {
        &NEUTRAL
    }

    pub fn with_dependency(mut self, configuration: DependencyConfiguration) -> Self {
        self.dependency_configurations.push(configuration);
        self
    }

    /// Dynamic diagrams always use the index relationship macro, so a rule that sets a
    /// mode cannot be honoured.
    pub fn validate_for_dynamic(&self, view_key: &str) -> Result<()> {
        match self
            .dependency_configurations
            .iter()
            .position(|configuration| configuration.mode.is_some())
        {
            Some(index) => Err(Error::DynamicViewMode {
                view: view_key.to_string(),
                index,
            }),
            None => Ok(()),
        }
    }

    pub fn effective_directive(
        &self,
        relationship: &Relationship,
        response: bool,
    ) -> EffectiveDirective {
        effective_directive(&self.dependency_configurations, relationship, response)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EffectiveDirective {
    pub mode: Option<Mode>,
    pub direction: Option<Direction>,
}

/// Resolves mode and direction for one relationship.
///
/// Rules are checked in declaration order and the last matching rule wins, separately
/// for mode and direction. Response relationships get the opposite direction.
pub fn effective_directive(
    configurations: &[DependencyConfiguration],
    relationship: &Relationship,
    response: bool,
) -> EffectiveDirective {
    let mut resolved = EffectiveDirective::default();
    for configuration in configurations {
        if !configuration.matches(relationship) {
            continue;
        }
        if let Some(mode) = configuration.mode {
            resolved.mode = Some(mode);
        }
        if let Some(direction) = configuration.direction {
            resolved.direction = Some(direction);
        }
    }
    if response {
        resolved.direction = resolved.direction.map(Direction::inverse);
    }
    resolved
}
