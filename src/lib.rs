//! Renders C4 architecture views as C4-PlantUML documents.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod hierarchy;
pub mod icons;
pub mod identity;
pub mod layout;
pub mod model;
pub mod ordering;
pub mod properties;
pub mod resolve;
pub mod sequence;
pub mod sprite;
pub mod style;
pub mod view;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{ExportConfig, load_config};
pub use error::{Error, Result};
pub use export::{Document, ExportContext, export_view, export_workspace};
pub use layout::{DependencyConfiguration, Direction, LayoutDirective, Mode};
pub use model::{Element, ElementKind, Model, Relationship};
pub use sequence::DynamicSequence;
pub use view::{RelationshipView, View, ViewKind, Workspace};
