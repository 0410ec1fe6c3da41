use crate::export::ExportContext;
use crate::icons::MapIconCatalog;
use crate::layout::{
    DependencyConfiguration, DiagramLayout, Direction, LayoutDirective, Legend, LineType, Mode,
};
use crate::model::Relationship;
use crate::style::StyleStore;
use crate::view::Workspace;
use anyhow::Context;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

/// Export settings loaded from a configuration file.
#[derive(Debug, Clone, Default)]
pub struct ExportConfig {
    pub layouts: IndexMap<String, LayoutDirective>,
    pub icons: MapIconCatalog,
}

impl ExportConfig {
    pub fn layout(&self, view_key: &str) -> Option<&LayoutDirective> {
        self.layouts.get(view_key)
    }

    pub fn into_context(self, workspace: &Workspace) -> ExportContext {
        let mut ctx = ExportContext::new()
            .with_styles(StyleStore::from_properties(&workspace.configuration))
            .with_icons(self.icons);
        for (key, directive) in self.layouts {
            if workspace.view(&key).is_none() {
                tracing::warn!(view = key.as_str(), "layout configured for an unknown view");
            }
            ctx.set_layout(key, directive);
        }
        ctx
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    views: Option<IndexMap<String, ViewConfigFile>>,
    icons: Option<IndexMap<String, String>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ViewConfigFile {
    node_sep: Option<u32>,
    rank_sep: Option<u32>,
    line_type: Option<LineType>,
    legend: Option<Legend>,
    layout: Option<DiagramLayout>,
    show_person_outline: Option<bool>,
    hide_stereotypes: Option<bool>,
    dependencies: Option<Vec<DependencyRuleFile>>,
}

/// Matches on element ids and relationship tags; every given condition must hold.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
struct DependencyRuleFile {
    source: Option<String>,
    destination: Option<String>,
    tag: Option<String>,
    direction: Option<Direction>,
    mode: Option<Mode>,
}

impl DependencyRuleFile {
    fn matches(&self, relationship: &Relationship) -> bool {
        self.source.as_ref().is_none_or(|id| *id == relationship.source)
            && self
                .destination
                .as_ref()
                .is_none_or(|id| *id == relationship.destination)
            && self
                .tag
                .as_ref()
                .is_none_or(|tag| relationship.tags.contains(tag))
    }

    fn into_configuration(self) -> DependencyConfiguration {
        let direction = self.direction;
        let mode = self.mode;
        let mut configuration = DependencyConfiguration::new(move |r| self.matches(r));
        configuration.direction = direction;
        configuration.mode = mode;
        configuration
    }
}

impl From<ViewConfigFile> for LayoutDirective {
    fn from(file: ViewConfigFile) -> Self {
        let mut directive = LayoutDirective {
            node_sep: file.node_sep,
            rank_sep: file.rank_sep,
            line_type: file.line_type,
            layout: file.layout,
            ..Default::default()
        };
        if let Some(v) = file.legend {
            directive.legend = v;
        }
        if let Some(v) = file.show_person_outline {
            directive.show_person_outline = v;
        }
        if let Some(v) = file.hide_stereotypes {
            directive.hide_stereotypes = v;
        }
        directive.dependency_configurations = file
            .dependencies
            .unwrap_or_default()
            .into_iter()
            .map(DependencyRuleFile::into_configuration)
            .collect();
        directive
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<ExportConfig> {
    let Some(path) = path else {
        return Ok(ExportConfig::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("parsing config {}", path.display()))
}

/// Parses JSON, falling back to JSON5 for hand-written files.
pub fn parse_config(contents: &str) -> anyhow::Result<ExportConfig> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(contents).map_err(|json5_err| {
            anyhow::anyhow!("invalid config: {json_err} (as JSON5: {json5_err})")
        })?,
    };

    let mut config = ExportConfig::default();
    for (key, view) in parsed.views.unwrap_or_default() {
        config.layouts.insert(key, view.into());
    }
    config.icons = parsed.icons.unwrap_or_default().into_iter().collect();
    Ok(config)
}
