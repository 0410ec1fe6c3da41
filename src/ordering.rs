//! Deterministic iteration order for elements and relationships.

use crate::identity::Aliases;
use crate::model::Element;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Step token of a dynamic view, e.g. `2.1.3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderToken(Vec<u32>);

impl OrderToken {
    pub fn top_level(step: u32) -> Self {
        Self(vec![step])
    }

    pub fn child(&self, step: u32) -> Self {
        let mut segments = self.0.clone();
        segments.push(step);
        Self(segments)
    }

    pub fn segments(&self) -> &[u32] {
        &self.0
    }
}

impl fmt::Display for OrderToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, segment) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for OrderToken {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .split('.')
            .map(str::parse::<u32>)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

/// Compares dot-segmented order tokens segment by segment, numerically.
///
/// `"2" < "10"`, `"5" < "5.1"`, `"5.2" < "5.10"`. Segments that are not numbers fall back
/// to a string comparison and sort after numeric segments.
pub fn compare_order_tokens(a: &str, b: &str) -> Ordering {
    let mut left = a.trim().split('.');
    let mut right = b.trim().split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ord = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(l), Ok(r)) => l.cmp(&r),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => l.cmp(r),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

/// Relationship views without a token go last.
pub fn compare_optional_tokens(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => compare_order_tokens(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn sort_elements(elements: &mut [&Element], aliases: &Aliases) {
    elements.sort_by(|a, b| aliases.get(a).cmp(aliases.get(b)));
}

/// Static-view relationship key: source alias followed by destination alias.
pub fn relationship_sort_key(source: &Element, destination: &Element, aliases: &Aliases) -> String {
    format!("{}{}", aliases.get(source), aliases.get(destination))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementKind, Model};

    #[test]
    fn numeric_per_segment_comparison() {
        assert_eq!(compare_order_tokens("2", "10"), Ordering::Less);
        assert_eq!(compare_order_tokens("5", "5.1"), Ordering::Less);
        assert_eq!(compare_order_tokens("5.2", "5.10"), Ordering::Less);
        assert_eq!(compare_order_tokens("5.10", "5.2"), Ordering::Greater);
        assert_eq!(compare_order_tokens("3.1.2", "3.1.2"), Ordering::Equal);
        assert_eq!(compare_order_tokens("10", "9.9"), Ordering::Greater);
    }

    #[test]
    fn sorting_tokens_matches_parsed_order() {
        let mut tokens = vec!["10", "2.1", "1", "2", "2.10", "2.2", "11.1"];
        tokens.sort_by(|a, b| compare_order_tokens(a, b));
        assert_eq!(tokens, vec!["1", "2", "2.1", "2.2", "2.10", "10", "11.1"]);

        let parsed: Vec<OrderToken> = tokens.iter().map(|t| t.parse().unwrap()).collect();
        let mut sorted = parsed.clone();
        sorted.sort();
        assert_eq!(parsed, sorted);
    }

    #[test]
    fn missing_tokens_sort_last() {
        assert_eq!(compare_optional_tokens(Some("9"), None), Ordering::Less);
        assert_eq!(compare_optional_tokens(None, Some("1")), Ordering::Greater);
    }

    #[test]
    fn order_token_display() {
        let token = OrderToken::top_level(2).child(1).child(3);
        assert_eq!(token.to_string(), "2.1.3");
        assert_eq!("2.1.3".parse::<OrderToken>().unwrap(), token);
        assert!("2.x".parse::<OrderToken>().is_err());
    }

    #[test]
    fn elements_sort_by_alias() {
        let mut model = Model::new();
        model.add_element(Element::new("1", ElementKind::SoftwareSystem, "Zeta"));
        model.add_element(Element::new("2", ElementKind::Person, "Alpha"));
        model.add_element(Element::new("3", ElementKind::SoftwareSystem, "Mid"));
        let aliases = Aliases::new(&model);
        let mut elements: Vec<&Element> = model.elements().collect();
        sort_elements(&mut elements, &aliases);
        let names: Vec<&str> = elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Mid", "Zeta"]);
    }
}
