//! Which styles and sprites a rendered view actually needs.

use crate::icons::IconCatalog;
use crate::model::PropertyBag;
use crate::sprite::{ICON_PROPERTY, LibrarySprite, Sprite};
use crate::style::{ASYNC_DEPENDENCY_TAG, DependencyStyle, StyleKind, StyleRecord, StyleStore};
use indexmap::IndexSet;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Tags carried by the rendered nodes and edges of one view, per style kind.
#[derive(Debug, Clone, Default)]
pub struct TagUsage {
    tags: HashMap<StyleKind, HashSet<String>>,
    asynchronous: bool,
}

impl TagUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record<'t>(&mut self, kind: StyleKind, tags: impl IntoIterator<Item = &'t String>) {
        self.tags
            .entry(kind)
            .or_default()
            .extend(tags.into_iter().cloned());
    }

    /// Asynchronous edges implicitly carry [`ASYNC_DEPENDENCY_TAG`].
    pub fn record_asynchronous(&mut self) {
        self.asynchronous = true;
        self.tags
            .entry(StyleKind::Dependency)
            .or_default()
            .insert(ASYNC_DEPENDENCY_TAG.to_string());
    }

    pub fn contains(&self, kind: StyleKind, tag: &str) -> bool {
        self.tags.get(&kind).is_some_and(|tags| tags.contains(tag))
    }

    pub fn has_asynchronous(&self) -> bool {
        self.asynchronous
    }
}

/// Styles emitted as tag definitions, one list per kind, each sorted by tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppliedStyles {
    by_kind: HashMap<StyleKind, Vec<StyleRecord>>,
}

impl AppliedStyles {
    /// View-local declarations shadow workspace-wide ones with the same tag. Only tags in
    /// use survive. Asynchronous edges get a dashed default unless a style with that tag is
    /// declared.
    pub fn resolve(global: &StyleStore, local: &StyleStore, usage: &TagUsage) -> Self {
        let mut by_kind = HashMap::new();
        for kind in StyleKind::ALL {
            let mut seen = HashSet::new();
            let mut applied: Vec<StyleRecord> = local
                .of_kind(kind)
                .chain(global.of_kind(kind))
                .filter(|record| usage.contains(kind, record.tag()))
                .filter(|record| seen.insert(record.tag().to_string()))
                .cloned()
                .collect();
            if kind == StyleKind::Dependency
                && usage.has_asynchronous()
                && !seen.contains(ASYNC_DEPENDENCY_TAG)
            {
                applied.push(DependencyStyle::asynchronous_default().into());
            }
            applied.sort_by(|a, b| a.tag().cmp(b.tag()));
            if !applied.is_empty() {
                by_kind.insert(kind, applied);
            }
        }
        Self { by_kind }
    }

    pub fn of_kind(&self, kind: StyleKind) -> &[StyleRecord] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn has(&self, kind: StyleKind, tag: &str) -> bool {
        self.of_kind(kind).iter().any(|record| record.tag() == tag)
    }

    /// Tags worth a `$tags=` argument: the ones some applied style of `kinds` targets.
    pub fn applicable_tags<'t>(
        &self,
        kinds: &[StyleKind],
        tags: impl IntoIterator<Item = &'t String>,
    ) -> Vec<&'t str> {
        tags.into_iter()
            .map(String::as_str)
            .filter(|tag| kinds.iter().any(|kind| self.has(*kind, tag)))
            .collect()
    }

    pub fn records(&self) -> impl Iterator<Item = &StyleRecord> {
        StyleKind::ALL.into_iter().flat_map(|kind| self.of_kind(kind))
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }
}

/// Sprite of a node or edge: an explicit `c4:sprite` record, else the catalog icon named by
/// `c4:icon`.
pub fn resolve_sprite(properties: &PropertyBag, icons: &dyn IconCatalog) -> Option<Sprite> {
    if let Some(sprite) = Sprite::load(properties) {
        return Some(sprite);
    }
    let name = properties.get(ICON_PROPERTY)?;
    match icons.lookup(name) {
        Some(url) => Some(LibrarySprite::from_catalog(url).into()),
        None => {
            tracing::warn!(icon = name.as_str(), "icon not found in catalog");
            None
        }
    }
}

/// `!include` targets and extra definitions required by a set of sprites.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpriteRequirements {
    pub includes: BTreeSet<String>,
    pub definitions: IndexSet<String>,
}

impl SpriteRequirements {
    pub fn collect<'s>(sprites: impl IntoIterator<Item = &'s Sprite>) -> Self {
        let mut requirements = Self::default();
        for sprite in sprites {
            requirements
                .includes
                .extend(sprite.includes().into_iter().map(str::to_string));
            requirements
                .definitions
                .extend(sprite.definitions().iter().cloned());
        }
        requirements
    }

    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.definitions.is_empty()
    }
}
