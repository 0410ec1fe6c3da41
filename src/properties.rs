//! Tabular properties (`SetPropertyHeader` / `AddProperty`) stored in a property bag.
//!
//! A table is exploded into one bag entry per cell:
//! `c4:properties:header:<column>` for the header and
//! `c4:properties:value:<row>:<column>` for the values. Decoding does not rely on the
//! bag's iteration order; rows and columns are rebuilt from the numeric key suffixes.

use crate::error::{Error, Result};
use crate::model::PropertyBag;
use std::collections::BTreeMap;

pub const PROPERTY_HEADER_PREFIX: &str = "c4:properties:header";
pub const PROPERTY_VALUE_PREFIX: &str = "c4:properties:value";
pub const MAX_PROPERTY_COLUMNS: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabularProperty {
    header: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
}

impl TabularProperty {
    /// Validates and normalises a table: an empty header counts as no header and empty
    /// rows are dropped, since neither leaves a trace in the encoded form.
    pub fn new(header: Option<Vec<String>>, rows: Vec<Vec<String>>) -> Result<Self> {
        let header = header.filter(|columns| !columns.is_empty());
        if let Some(columns) = &header {
            if columns.len() > MAX_PROPERTY_COLUMNS {
                return Err(Error::TooManyHeaderColumns {
                    len: columns.len(),
                    max: MAX_PROPERTY_COLUMNS,
                });
            }
        }
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() > MAX_PROPERTY_COLUMNS {
                return Err(Error::TooManyRowColumns {
                    row,
                    len: cells.len(),
                    max: MAX_PROPERTY_COLUMNS,
                });
            }
            if let Some(columns) = &header {
                if cells.len() > columns.len() {
                    return Err(Error::RowExceedsHeader {
                        row,
                        len: cells.len(),
                        header: columns.len(),
                    });
                }
            }
        }
        let rows = rows.into_iter().filter(|cells| !cells.is_empty()).collect();
        Ok(Self { header, rows })
    }

    pub fn with_header<I, S>(header: I, rows: Vec<Vec<String>>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Some(header.into_iter().map(Into::into).collect()), rows)
    }

    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// A table without value rows renders nothing, header or not, and is stored as no
    /// table at all.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Replaces any table previously stored in `bag`. An empty table only clears it.
    pub fn encode_into(&self, bag: &mut PropertyBag) {
        clear(bag);
        if self.is_empty() {
            return;
        }
        if let Some(header) = &self.header {
            for (index, column) in header.iter().enumerate() {
                bag.insert(format!("{PROPERTY_HEADER_PREFIX}:{index}"), column.clone());
            }
        }
        for (row, cells) in self.rows.iter().enumerate() {
            for (column, value) in cells.iter().enumerate() {
                bag.insert(
                    format!("{PROPERTY_VALUE_PREFIX}:{row}:{column}"),
                    value.clone(),
                );
            }
        }
    }

    /// Rebuilds the table stored in `bag`.
    ///
    /// Returns `None` when no table is stored, when it has no value rows, or when any key
    /// under the reserved prefixes does not follow the index pattern.
    pub fn decode(bag: &PropertyBag) -> Option<Self> {
        let mut header: BTreeMap<usize, String> = BTreeMap::new();
        let mut rows: BTreeMap<usize, BTreeMap<usize, String>> = BTreeMap::new();

        for (key, value) in bag {
            if let Some(suffix) = reserved_suffix(key, PROPERTY_HEADER_PREFIX) {
                let index = suffix.parse::<usize>().ok()?;
                header.insert(index, value.clone());
            } else if let Some(suffix) = reserved_suffix(key, PROPERTY_VALUE_PREFIX) {
                let (row, column) = suffix.split_once(':')?;
                let row = row.parse::<usize>().ok()?;
                let column = column.parse::<usize>().ok()?;
                rows.entry(row).or_default().insert(column, value.clone());
            }
        }

        if rows.is_empty() {
            return None;
        }
        let header = if header.is_empty() {
            None
        } else {
            Some(header.into_values().collect())
        };
        Some(Self {
            header,
            rows: rows
                .into_values()
                .map(|cells| cells.into_values().collect())
                .collect(),
        })
    }
}

fn reserved_suffix<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    key.strip_prefix(prefix)?.strip_prefix(':')
}

fn clear(bag: &mut PropertyBag) {
    bag.retain(|key, _| {
        reserved_suffix(key, PROPERTY_HEADER_PREFIX).is_none()
            && reserved_suffix(key, PROPERTY_VALUE_PREFIX).is_none()
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn round_trips_headers_and_ragged_rows() {
        let all = ["a", "b", "c", "d"];
        for header_len in 0..=MAX_PROPERTY_COLUMNS {
            let header = if header_len == 0 {
                None
            } else {
                Some(cells(&all[..header_len]))
            };
            let max_row = if header_len == 0 {
                MAX_PROPERTY_COLUMNS
            } else {
                header_len
            };
            let rows: Vec<Vec<String>> = (0..=max_row)
                .rev()
                .map(|len| cells(&["1", "2", "3", "4"][..len]))
                .collect();
            let table = TabularProperty::new(header, rows).unwrap();

            let mut bag = PropertyBag::new();
            bag.insert("unrelated".to_string(), "kept".to_string());
            table.encode_into(&mut bag);

            assert_eq!(TabularProperty::decode(&bag), Some(table));
            assert_eq!(bag.get("unrelated").map(String::as_str), Some("kept"));
        }
    }

    #[test]
    fn header_only_table_is_stored_as_no_table() {
        let table = TabularProperty::with_header(["Property", "Value"], vec![]).unwrap();
        assert!(table.is_empty());

        let mut bag = PropertyBag::new();
        TabularProperty::with_header(["Old"], vec![cells(&["row"])])
            .unwrap()
            .encode_into(&mut bag);
        bag.insert("unrelated".to_string(), "kept".to_string());
        table.encode_into(&mut bag);

        assert_eq!(bag.len(), 1);
        assert!(bag.contains_key("unrelated"));
        assert_eq!(TabularProperty::decode(&bag), None);
    }

    #[test]
    fn decoding_ignores_bag_order() {
        let mut bag = PropertyBag::new();
        bag.insert("c4:properties:value:10:1".into(), "k".into());
        bag.insert("c4:properties:value:2:1".into(), "b".into());
        bag.insert("c4:properties:header:1".into(), "Value".into());
        bag.insert("c4:properties:value:10:0".into(), "j".into());
        bag.insert("c4:properties:value:2:0".into(), "a".into());
        bag.insert("c4:properties:header:0".into(), "Property".into());

        let table = TabularProperty::decode(&bag).unwrap();
        assert_eq!(table.header(), Some(&cells(&["Property", "Value"])[..]));
        assert_eq!(table.rows(), &[cells(&["a", "b"]), cells(&["j", "k"])]);
    }

    #[test]
    fn absent_and_malformed_tables_decode_to_none() {
        let mut bag = PropertyBag::new();
        assert_eq!(TabularProperty::decode(&bag), None);

        bag.insert("c4:properties:header:0".into(), "Only header".into());
        assert_eq!(TabularProperty::decode(&bag), None);

        bag.insert("c4:properties:value:x:0".into(), "bad".into());
        assert_eq!(TabularProperty::decode(&bag), None);
    }

    #[test]
    fn re_encoding_replaces_previous_table() {
        let mut bag = PropertyBag::new();
        TabularProperty::with_header(["A", "B", "C"], vec![cells(&["1", "2", "3"])])
            .unwrap()
            .encode_into(&mut bag);
        let smaller = TabularProperty::new(None, vec![cells(&["x"])]).unwrap();
        smaller.encode_into(&mut bag);
        assert_eq!(TabularProperty::decode(&bag), Some(smaller));
    }

    #[test]
    fn rejects_rows_wider_than_allowed() {
        let err = TabularProperty::new(None, vec![cells(&["1", "2", "3", "4", "5"])]).unwrap_err();
        assert!(matches!(err, Error::TooManyRowColumns { row: 0, len: 5, .. }));

        let err = TabularProperty::with_header(["A"], vec![cells(&["1", "2"])]).unwrap_err();
        assert!(matches!(
            err,
            Error::RowExceedsHeader {
                row: 0,
                len: 2,
                header: 1
            }
        ));

        let err = TabularProperty::with_header(["A", "B", "C", "D", "E"], Vec::new()).unwrap_err();
        assert!(matches!(err, Error::TooManyHeaderColumns { len: 5, .. }));
    }
}
