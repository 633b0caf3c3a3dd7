//! # Predicate Builder
//!
//! Composes the WHERE / ORDER BY / LIMIT tail of the filtered searches.
//!
//! ## Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  base SELECT (owned by the repository)                                  │
//! │    WHERE  group₁ AND group₂ AND ... AND groupₙ                          │
//! │    ORDER BY <fixed per search>                                          │
//! │    LIMIT ?                                                              │
//! │                                                                         │
//! │  Item search:                                                           │
//! │    one group per search term:                                           │
//! │      (LOWER(b.name) LIKE ? OR LOWER(m.name) LIKE ? OR ... 7 columns)    │
//! │    then b.name = ?  /  c.name = ?  when selected                        │
//! │                                                                         │
//! │  Invoice search:                                                        │
//! │    date range, price level, status,                                     │
//! │    (itemIds ∋ id₁ OR ... OR note LIKE ? OR ... 6 columns)  if ids,      │
//! │    customer / delivery / worker names, delivery selector                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The builders are pure: they return a [`SqlFragment`] and never touch a
//! connection. Groups appear in the parameter list in the same order they
//! appear in the SQL text.

use crate::filter::{DeliveryFilter, InvoiceFilter, ItemFilter, NO_DELIVERY};
use crate::sql::{contains_pattern, eq, json_array_contains, like, not_eq, SqlFragment};

/// Columns searched by every item search term, in binding order.
pub const ITEM_SEARCH_COLUMNS: [&str; 7] = [
    "LOWER(b.name)",
    "LOWER(m.name)",
    "LOWER(q.name)",
    "LOWER(c.name)",
    "LOWER(i.SKU)",
    "LOWER(i.boxId)",
    "LOWER(i.discription)",
];

/// Columns matched against `searchVal` inside the invoice search group.
pub const INVOICE_SEARCH_COLUMNS: [&str; 6] = [
    "posinvoices.note",
    "posinvoices.id",
    "customers.name",
    "deliveries.name",
    "posinvoices.computerName",
    "workers.name",
];

pub const ITEM_ORDER_BY: &str = "i.display_order ASC";
pub const INVOICE_ORDER_BY: &str = "posinvoices.newDate DESC, posinvoices.id DESC";

const INVOICE_DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Builder
// =============================================================================

/// Accumulates AND-joined predicate groups.
#[derive(Debug, Default)]
pub struct PredicateBuilder {
    predicates: Vec<SqlFragment>,
}

impl PredicateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one predicate to the conjunction.
    pub fn and(&mut self, predicate: SqlFragment) -> &mut Self {
        self.predicates.push(predicate);
        self
    }

    /// Adds a parenthesized disjunction. An empty list adds nothing.
    pub fn and_any_of(&mut self, alternatives: Vec<SqlFragment>) -> &mut Self {
        if alternatives.is_empty() {
            return self;
        }

        let mut group = SqlFragment::raw("(");
        for (index, alternative) in alternatives.into_iter().enumerate() {
            if index > 0 {
                group.push_sql(" OR ");
            }
            group.push_fragment(alternative);
        }
        group.push_sql(")");

        self.predicates.push(group);
        self
    }

    /// Number of predicate groups added so far.
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Appends the accumulated predicates, ordering and a bound limit to
    /// `base`.
    pub fn finish(self, base: &str, order_by: &str, limit: u32) -> SqlFragment {
        let mut query = SqlFragment::raw(base);

        for (index, predicate) in self.predicates.into_iter().enumerate() {
            query.push_sql(if index == 0 { " WHERE " } else { " AND " });
            query.push_fragment(predicate);
        }

        query.push_sql(" ORDER BY ");
        query.push_sql(order_by);
        query.push_sql(" LIMIT ");
        query.push_bind(limit);
        query
    }
}

// =============================================================================
// Searches
// =============================================================================

/// Builds the full item search query on top of `base`.
///
/// ## Arguments
/// * `base` - SELECT ... FROM items i JOIN brand b ... (no WHERE clause)
/// * `filter` - normalized `/itemsFilter` input
pub fn item_search(base: &str, filter: &ItemFilter) -> SqlFragment {
    let mut builder = PredicateBuilder::new();

    for term in &filter.search_terms {
        let pattern = contains_pattern(term);
        builder.and_any_of(
            ITEM_SEARCH_COLUMNS
                .iter()
                .map(|column| like(column, pattern.as_str()))
                .collect(),
        );
    }

    if let Some(brand) = &filter.brand {
        builder.and(eq("b.name", brand.as_str()));
    }
    if let Some(category) = &filter.category {
        builder.and(eq("c.name", category.as_str()));
    }

    builder.finish(base, ITEM_ORDER_BY, filter.limit)
}

/// Builds the full invoice search query on top of `base`.
///
/// ## Arguments
/// * `base` - SELECT ... FROM posinvoices JOIN customers ... LEFT JOIN
///   deliveries ... LEFT JOIN workers ... (no WHERE clause)
/// * `filter` - normalized `/posinvoicesFilter` input
pub fn invoice_search(base: &str, filter: &InvoiceFilter) -> SqlFragment {
    let mut builder = PredicateBuilder::new();

    let mut range = SqlFragment::raw("DATE(posinvoices.newDate) BETWEEN ");
    range
        .push_bind(filter.start_date.format(INVOICE_DATE_FORMAT).to_string())
        .push_sql(" AND ")
        .push_bind(filter.end_date.format(INVOICE_DATE_FORMAT).to_string());
    builder.and(range);

    if let Some(level) = &filter.price_level {
        builder.and(like("posinvoices.priceLevel", contains_pattern(level)));
    }
    builder.and(like(
        "posinvoices.invStatus",
        contains_pattern(filter.status.as_str()),
    ));

    if filter.has_search_group() {
        let search_pattern = contains_pattern(&filter.search_val);
        let alternatives = filter
            .item_ids
            .iter()
            .map(|id| json_array_contains("posinvoices.itemIds", id.as_str()))
            .chain(
                INVOICE_SEARCH_COLUMNS
                    .iter()
                    .map(|column| like(column, search_pattern.as_str())),
            )
            .collect();
        builder.and_any_of(alternatives);
    }

    if let Some(customer) = &filter.customer {
        builder.and(like("customers.name", contains_pattern(customer)));
    }
    if let Some(delivery) = &filter.delivery_name {
        builder.and(like("deliveries.name", contains_pattern(delivery)));
    }
    if let Some(worker) = &filter.worker {
        builder.and(like("workers.name", contains_pattern(worker)));
    }

    match &filter.delivery {
        DeliveryFilter::Any => {}
        DeliveryFilter::ExcludeNoDelivery => {
            builder.and(not_eq("deliveries.name", NO_DELIVERY));
        }
        DeliveryFilter::Named(name) => {
            builder.and(like("deliveries.name", contains_pattern(name)));
        }
    }

    builder.finish(base, INVOICE_ORDER_BY, filter.limit)
}

// =============================================================================
// Unit Tests
// =============================================================================
