//! Search: the ordered filter list for one listing session
//!
//! A [`Search`] is bound to a [`Definition`]. It is rebuilt from a query
//! string with [`Search::init`], edited by position, and serialized back with
//! [`Search::to_query`]. Fragments that do not parse are dropped silently;
//! [`Search::dropped`] reports how many.

use crate::definition::Definition;
use crate::filter::Filter;
use crate::operation::{Operation, Toggle};
use crate::parser::parse_fragment;
use crate::serializer::{self, WireParam};

#[derive(Debug, Clone, PartialEq)]
pub struct Search {
    definition: Definition,
    filters: Vec<Filter>,
    dropped: usize,
}

impl Search {
    /// Empty search over `definition`
    pub fn new(definition: Definition) -> Self {
        Self {
            definition,
            filters: Vec::new(),
            dropped: 0,
        }
    }

    /// Rebuild a search from a raw query string.
    ///
    /// A leading `?` is ignored. Fragments are parsed left to right; any that
    /// fail are logged and skipped. A `gte` bound directly followed by an
    /// `lte` bound on the same column is read back as a single range.
    pub fn init(definition: Definition, query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut parsed = Vec::new();
        let mut dropped = 0;

        for fragment in query.split('&').filter(|f| !f.is_empty()) {
            match parse_fragment(&definition, fragment) {
                Ok(filter) => parsed.push(filter),
                Err(e) => {
                    tracing::debug!(fragment = %fragment, error = %e, "Dropped query fragment");
                    dropped += 1;
                }
            }
        }

        let filters = merge_ranges(parsed);
        tracing::debug!(filters = filters.len(), dropped, "Search initialized");

        Self {
            definition,
            filters,
            dropped,
        }
    }

    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Fragments dropped by the last [`init`](Self::init)
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Append a default filter for the first filterable column.
    /// Does nothing when the definition has none.
    pub fn add_filter(&mut self) {
        let filter = self
            .definition
            .first_filterable()
            .and_then(|(name, def)| Filter::from_column(name, def));
        if let Some(filter) = filter {
            tracing::trace!(column = %filter.column(), "Added filter");
            self.filters.push(filter);
        }
    }

    /// Append a default filter for `column`. Returns `false` when the column
    /// is unknown or not filterable.
    pub fn add_filter_for(&mut self, column: &str) -> bool {
        let Some(filter) = self
            .definition
            .column(column)
            .and_then(|def| Filter::from_column(column, def))
        else {
            return false;
        };
        tracing::trace!(column = %column, "Added filter");
        self.filters.push(filter);
        true
    }

    /// Replace the filter at `index`. Out-of-range indices are ignored.
    pub fn update_filter(&mut self, index: usize, filter: Filter) {
        if let Some(slot) = self.filters.get_mut(index) {
            tracing::trace!(index, filter = %filter, "Updated filter");
            *slot = filter;
        }
    }

    /// Remove the filter at `index`. Out-of-range indices are ignored.
    pub fn remove_filter(&mut self, index: usize) {
        if index < self.filters.len() {
            let removed = self.filters.remove(index);
            tracing::trace!(index, column = %removed.column(), "Removed filter");
        }
    }

    /// Switch a null/future/past test on or off for the filter at `index`.
    ///
    /// Switching off restores the wrapped operation, or the column's default
    /// when there is none. Tests the filter's kind does not offer are ignored.
    pub fn toggle(&mut self, index: usize, toggle: Toggle) {
        let Some(filter) = self.filters.get(index) else {
            return;
        };
        let operation = filter.operation().clone().toggle(toggle).or_else(|| {
            self.definition
                .column(filter.column())
                .and_then(|def| Operation::default_for(&def.column_type))
        });
        if let Some(updated) = operation.and_then(|op| filter.with_operation(op)) {
            self.update_filter(index, updated);
        }
    }

    pub fn to_params(&self) -> Vec<WireParam> {
        serializer::to_params(&self.filters)
    }

    /// Query string for the current filters, omitting incomplete ones
    pub fn to_query(&self) -> String {
        serializer::to_query(&self.filters)
    }
}

/// Fold each `gte` filter immediately followed by an `lte` filter on the same
/// column into one `Between`. Bounds that are out of order stay separate.
fn merge_ranges(filters: Vec<Filter>) -> Vec<Filter> {
    let mut merged: Vec<Filter> = Vec::with_capacity(filters.len());
    let mut iter = filters.into_iter().peekable();

    while let Some(filter) = iter.next() {
        let range = match (filter.operation(), iter.peek()) {
            (Operation::GreaterOrEqual(low), Some(next))
                if next.column() == filter.column() && next.kind() == filter.kind() =>
            {
                match next.operation() {
                    Operation::LesserOrEqual(high) if low.compare(high).is_le() => filter
                        .with_operation(Operation::Between(low.clone(), high.clone())),
                    _ => None,
                }
            }
            _ => None,
        };

        match range {
            Some(range) => {
                tracing::trace!(column = %range.column(), "Merged range bounds");
                iter.next();
                merged.push(range);
            }
            None => merged.push(filter),
        }
    }
    merged
}
