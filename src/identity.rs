use crate::model::{Element, Model};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

static NON_ALIAS_CHARS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").unwrap());

/// Stable PlantUML aliases for every element of a model.
///
/// An alias is the element's name path from the root, prefixed by the deployment
/// environment for deployment elements and suffixed by the instance id for instances.
/// Repeated aliases get `_2`, `_3`, ... in model order.
#[derive(Debug, Clone, Default)]
pub struct Aliases {
    by_id: HashMap<String, String>,
}

impl Aliases {
    pub fn new(model: &Model) -> Self {
        let mut by_id = HashMap::new();
        let mut used = HashSet::new();
        for element in model.elements() {
            let base = base_alias(model, element);
            let mut alias = base.clone();
            let mut n = 1;
            while used.contains(&alias) {
                n += 1;
                alias = format!("{base}_{n}");
            }
            used.insert(alias.clone());
            by_id.insert(element.id.clone(), alias);
        }
        Self { by_id }
    }

    pub fn get<'a>(&'a self, element: &'a Element) -> &'a str {
        self.by_id
            .get(&element.id)
            .map(String::as_str)
            .unwrap_or(element.id.as_str())
    }
}

fn base_alias(model: &Model, element: &Element) -> String {
    let mut segments: Vec<String> = model
        .ancestors(element)
        .map(|ancestor| sanitize(&ancestor.name))
        .collect();
    segments.reverse();
    segments.push(sanitize(&element.name));

    if element.kind.is_deployment() {
        if let Some(environment) = &element.environment {
            segments.insert(0, sanitize(environment));
        }
    }
    if let Some(instance_id) = element.instance_id {
        segments.push(instance_id.to_string());
    }

    let alias = segments
        .into_iter()
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    if alias.is_empty() {
        let fallback = sanitize(&element.id);
        if fallback.is_empty() {
            "element".to_string()
        } else {
            fallback
        }
    } else {
        alias
    }
}

fn sanitize(name: &str) -> String {
    NON_ALIAS_CHARS_RE.replace_all(name, "").into_owned()
}
