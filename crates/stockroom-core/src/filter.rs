//! # Filter Normalization
//!
//! Turns raw query-string parameters into typed filter specifications.
//!
//! ## Sentinels
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The frontend sends dropdown labels verbatim. Labels that mean          │
//! │  "nothing selected" collapse to None here, so the predicate builder     │
//! │  never compares against UI vocabulary.                                  │
//! │                                                                         │
//! │   brandDivVal        "Select brand.."     ──► brand = None              │
//! │   categoryDivVal     "Select category.."  ──► category = None           │
//! │   priceSelectVal     "All"                ──► price_level = None        │
//! │   deliverySelectVal  "Both"               ──► DeliveryFilter::Any       │
//! │   deliverySelectVal  "Delivery"           ──► ExcludeNoDelivery         │
//! │   checkIcon          "...fa-circle-check" ──► InvoiceStatus::Paid       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Parse problems with a safe default (e.g. `limit=abc`) never fail the
//! request. They come back as [`Normalized::warnings`] for the caller to log.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Constants
// =============================================================================

/// Brand dropdown label meaning "no brand selected".
pub const BRAND_SENTINEL: &str = "Select brand..";

/// Category dropdown label meaning "no category selected".
pub const CATEGORY_SENTINEL: &str = "Select category..";

/// Price-level dropdown label meaning "any price level".
pub const ALL_SENTINEL: &str = "All";

/// Delivery dropdown label meaning "delivered or not".
pub const BOTH_SENTINEL: &str = "Both";

/// Delivery dropdown label meaning "only invoices that were delivered".
pub const DELIVERY_LABEL: &str = "Delivery";

/// Name of the delivery row that stands for "no delivery".
pub const NO_DELIVERY: &str = "No Delivery";

/// Icon class whose presence in `checkIcon` selects paid invoices.
pub const PAID_ICON_MARKER: &str = "fa-circle-check";

/// Token the frontend sends in place of a literal `+`.
pub const PLUS_TOKEN: &str = "plus";

/// Default row cap for item searches.
pub const DEFAULT_ITEM_LIMIT: u32 = 70;

/// Default row cap for invoice searches.
pub const DEFAULT_INVOICE_LIMIT: u32 = 50;

/// Default row cap for model lookups (effectively unbounded).
pub const DEFAULT_MODEL_LIMIT: u32 = 1_000_000;

const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Normalized Wrapper
// =============================================================================

/// A normalized value plus the non-fatal issues found while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    pub value: T,
    pub warnings: Vec<CoreError>,
}

impl<T> Normalized<T> {
    fn new(value: T, warnings: Vec<CoreError>) -> Self {
        Self { value, warnings }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Lower-cases free text and splits it on single spaces.
///
/// An empty input yields one empty term, and consecutive spaces yield empty
/// terms between them. Each empty term becomes a `%%` pattern which matches
/// every row with a non-null column.
pub fn split_search_terms(raw: &str) -> Vec<String> {
    raw.to_lowercase().split(' ').map(str::to_string).collect()
}

/// Rewrites the `plus` escape token back to `+`.
pub fn decode_category(raw: &str) -> String {
    raw.replace(PLUS_TOKEN, "+")
}

/// Returns `None` for absent, empty, or sentinel values.
fn selected<'a>(params: &'a HashMap<String, String>, key: &str, sentinel: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(String::as_str)
        .filter(|v| !v.is_empty() && *v != sentinel)
}

/// Returns `None` for absent or empty values.
fn non_empty<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

fn required<'a>(params: &'a HashMap<String, String>, key: &str) -> CoreResult<&'a str> {
    params
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| CoreError::missing(key))
}

/// Parses `limit`, falling back to `default` when absent or malformed.
///
/// `0` is a valid limit and yields an empty result set.
fn parse_limit(
    params: &HashMap<String, String>,
    default: u32,
    warnings: &mut Vec<CoreError>,
) -> u32 {
    match params.get("limit").map(|s| s.trim()) {
        None | Some("") => default,
        Some(raw) => raw.parse::<u32>().unwrap_or_else(|_| {
            warnings.push(CoreError::invalid("limit", raw));
            default
        }),
    }
}

fn parse_date(params: &HashMap<String, String>, key: &str) -> CoreResult<NaiveDate> {
    let raw = required(params, key)?;
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| CoreError::invalid(key, raw))
}

// =============================================================================
// Item Filter
// =============================================================================

/// A normalized `/itemsFilter` request.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFilter {
    /// Lower-cased terms; every term must match at least one searched column.
    pub search_terms: Vec<String>,
    /// Exact brand name, or `None` for any brand.
    pub brand: Option<String>,
    /// Exact category name with `plus` already decoded.
    pub category: Option<String>,
    pub limit: u32,
}

impl ItemFilter {
    /// Builds an item filter from raw query parameters.
    ///
    /// ## Arguments
    /// * `params` - `search`, `brandDivVal`, `categoryDivVal`, `limit`
    ///
    /// ## Returns
    /// The filter plus any non-fatal parse warnings. This never fails:
    /// an absent `search` is treated as an empty string.
    pub fn from_params(params: &HashMap<String, String>) -> Normalized<ItemFilter> {
        let mut warnings = Vec::new();

        let search = params.get("search").map(String::as_str).unwrap_or("");
        let filter = ItemFilter {
            search_terms: split_search_terms(search),
            brand: selected(params, "brandDivVal", BRAND_SENTINEL).map(str::to_string),
            category: selected(params, "categoryDivVal", CATEGORY_SENTINEL).map(decode_category),
            limit: parse_limit(params, DEFAULT_ITEM_LIMIT, &mut warnings),
        };

        Normalized::new(filter, warnings)
    }
}

// =============================================================================
// Model Filter
// =============================================================================

/// A normalized `GET /model` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFilter {
    /// Name substring; empty matches every model.
    pub search: String,
    pub limit: u32,
}

impl ModelFilter {
    pub fn from_params(params: &HashMap<String, String>) -> Normalized<ModelFilter> {
        let mut warnings = Vec::new();
        let filter = ModelFilter {
            search: params.get("search").cloned().unwrap_or_default(),
            limit: parse_limit(params, DEFAULT_MODEL_LIMIT, &mut warnings),
        };
        Normalized::new(filter, warnings)
    }
}

// =============================================================================
// Invoice Filter
// =============================================================================

/// Paid/canceled selector driven by the `checkIcon` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceStatus {
    Paid,
    Canceled,
}

impl InvoiceStatus {
    /// Reads the status from the icon class string the frontend sends.
    pub fn from_icon(icon: &str) -> Self {
        if icon.contains(PAID_ICON_MARKER) {
            InvoiceStatus::Paid
        } else {
            InvoiceStatus::Canceled
        }
    }

    /// Stored `invStatus` text.
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Paid => "Paid",
            InvoiceStatus::Canceled => "Canceled",
        }
    }
}

/// Tri-state delivery selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryFilter {
    /// No constraint.
    Any,
    /// Delivery name differs from [`NO_DELIVERY`].
    ExcludeNoDelivery,
    /// Delivery name contains the given text.
    Named(String),
}

impl DeliveryFilter {
    fn from_select(value: Option<&str>) -> Self {
        match value {
            None | Some("") | Some(BOTH_SENTINEL) => DeliveryFilter::Any,
            Some(DELIVERY_LABEL) => DeliveryFilter::ExcludeNoDelivery,
            Some(other) => DeliveryFilter::Named(other.to_string()),
        }
    }
}

/// A normalized `/posinvoicesFilter` request.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceFilter {
    /// Inclusive date range over the invoice's calendar day.
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: InvoiceStatus,
    /// Price level substring, `None` for "All".
    pub price_level: Option<String>,
    pub delivery: DeliveryFilter,
    /// Item ids that must appear in the invoice's `itemIds` array (any of).
    pub item_ids: Vec<String>,
    /// Free text matched against note, id and the joined names.
    pub search_val: String,
    pub customer: Option<String>,
    pub delivery_name: Option<String>,
    pub worker: Option<String>,
    pub limit: u32,
}

impl InvoiceFilter {
    /// Builds an invoice filter from raw query parameters.
    ///
    /// ## Errors
    /// - [`CoreError::MissingParameter`] when `search`, `checkIcon`,
    ///   `startDate` or `endDate` is absent
    /// - [`CoreError::InvalidFilterValue`] when a date is not `YYYY-MM-DD`
    ///
    /// ## Search group
    /// `search` is a comma-separated list of item ids. The free-text
    /// group is only added when its first element is non-empty; empty
    /// elements are dropped.
    pub fn from_params(params: &HashMap<String, String>) -> CoreResult<Normalized<InvoiceFilter>> {
        let mut warnings = Vec::new();

        let search = required(params, "search")?;
        let icon = required(params, "checkIcon")?;
        let start_date = parse_date(params, "startDate")?;
        let end_date = parse_date(params, "endDate")?;

        let item_ids = if search.split(',').next().is_some_and(|first| !first.is_empty()) {
            search
                .split(',')
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect()
        } else {
            Vec::new()
        };

        let filter = InvoiceFilter {
            start_date,
            end_date,
            status: InvoiceStatus::from_icon(icon),
            price_level: selected(params, "priceSelectVal", ALL_SENTINEL).map(str::to_string),
            delivery: DeliveryFilter::from_select(params.get("deliverySelectVal").map(String::as_str)),
            item_ids,
            search_val: params.get("searchVal").cloned().unwrap_or_default(),
            customer: non_empty(params, "customer").map(str::to_string),
            delivery_name: non_empty(params, "delivery").map(str::to_string),
            worker: non_empty(params, "worker").map(str::to_string),
            limit: parse_limit(params, DEFAULT_INVOICE_LIMIT, &mut warnings),
        };

        Ok(Normalized::new(filter, warnings))
    }

    /// True when the id/free-text OR group should be emitted.
    pub fn has_search_group(&self) -> bool {
        !self.item_ids.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn invoice_params(extra: &[(&str, &str)]) -> HashMap<String, String> {
        let mut p = params(&[
            ("search", ""),
            ("checkIcon", "fa-solid fa-circle-check"),
            ("startDate", "2024-01-01"),
            ("endDate", "2024-01-31"),
        ]);
        p.extend(params(extra));
        p
    }

    #[test]
    fn test_search_terms_are_lowercased_and_split_on_spaces() {
        assert_eq!(split_search_terms("Glass IPhone"), vec!["glass", "iphone"]);
        assert_eq!(split_search_terms(""), vec![""]);
        assert_eq!(split_search_terms("a  b"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_brand_sentinel_equals_absent() {
        let with_sentinel = ItemFilter::from_params(&params(&[
            ("search", "case"),
            ("brandDivVal", BRAND_SENTINEL),
        ]));
        let without = ItemFilter::from_params(&params(&[("search", "case")]));

        assert_eq!(with_sentinel.value, without.value);
        assert_eq!(with_sentinel.value.brand, None);
    }

    #[test]
    fn test_category_plus_token_equals_literal_plus() {
        let escaped = ItemFilter::from_params(&params(&[("categoryDivVal", "Glass plus Frame")]));
        let literal = ItemFilter::from_params(&params(&[("categoryDivVal", "Glass + Frame")]));

        assert_eq!(escaped.value.category.as_deref(), Some("Glass + Frame"));
        assert_eq!(escaped.value.category, literal.value.category);

        let sentinel = ItemFilter::from_params(&params(&[("categoryDivVal", CATEGORY_SENTINEL)]));
        assert_eq!(sentinel.value.category, None);
    }

    #[test]
    fn test_limit_defaults_and_warnings() {
        let absent = ItemFilter::from_params(&params(&[]));
        assert_eq!(absent.value.limit, DEFAULT_ITEM_LIMIT);
        assert!(absent.warnings.is_empty());

        let junk = ItemFilter::from_params(&params(&[("limit", "abc")]));
        assert_eq!(junk.value.limit, DEFAULT_ITEM_LIMIT);
        assert_eq!(junk.warnings, vec![CoreError::invalid("limit", "abc")]);

        let zero = ItemFilter::from_params(&params(&[("limit", "0")]));
        assert_eq!(zero.value.limit, 0);
        assert!(zero.warnings.is_empty());
    }

    #[test]
    fn test_model_filter_defaults() {
        let filter = ModelFilter::from_params(&params(&[("search", "iPhone")]));
        assert_eq!(filter.value.search, "iPhone");
        assert_eq!(filter.value.limit, DEFAULT_MODEL_LIMIT);
    }

    #[test]
    fn test_invoice_filter_requires_search_and_dates() {
        let mut p = invoice_params(&[]);
        p.remove("search");
        assert_eq!(
            InvoiceFilter::from_params(&p),
            Err(CoreError::missing("search"))
        );

        let mut p = invoice_params(&[]);
        p.remove("endDate");
        assert_eq!(
            InvoiceFilter::from_params(&p),
            Err(CoreError::missing("endDate"))
        );

        let p = invoice_params(&[("startDate", "01/02/2024")]);
        assert_eq!(
            InvoiceFilter::from_params(&p),
            Err(CoreError::invalid("startDate", "01/02/2024"))
        );
    }

    #[test]
    fn test_invoice_status_from_icon() {
        assert_eq!(InvoiceStatus::from_icon("fa-solid fa-circle-check"), InvoiceStatus::Paid);
        assert_eq!(InvoiceStatus::from_icon("fa-solid fa-ban"), InvoiceStatus::Canceled);
    }

    #[test]
    fn test_delivery_select_is_tri_state() {
        let any = InvoiceFilter::from_params(&invoice_params(&[("deliverySelectVal", "Both")])).unwrap();
        assert_eq!(any.value.delivery, DeliveryFilter::Any);

        let delivered =
            InvoiceFilter::from_params(&invoice_params(&[("deliverySelectVal", "Delivery")])).unwrap();
        assert_eq!(delivered.value.delivery, DeliveryFilter::ExcludeNoDelivery);

        let named =
            InvoiceFilter::from_params(&invoice_params(&[("deliverySelectVal", "Ali")])).unwrap();
        assert_eq!(named.value.delivery, DeliveryFilter::Named("Ali".to_string()));
    }

    #[test]
    fn test_invoice_search_ids() {
        let none = InvoiceFilter::from_params(&invoice_params(&[])).unwrap();
        assert!(!none.value.has_search_group());

        let ids = InvoiceFilter::from_params(&invoice_params(&[("search", "12,,40")])).unwrap();
        assert_eq!(ids.value.item_ids, vec!["12", "40"]);

        let leading_empty = InvoiceFilter::from_params(&invoice_params(&[("search", ",12")])).unwrap();
        assert!(!leading_empty.value.has_search_group());
    }

    #[test]
    fn test_price_level_all_is_unfiltered() {
        let all = InvoiceFilter::from_params(&invoice_params(&[("priceSelectVal", "All")])).unwrap();
        assert_eq!(all.value.price_level, None);

        let tier = InvoiceFilter::from_params(&invoice_params(&[("priceSelectVal", "Wholesale")])).unwrap();
        assert_eq!(tier.value.price_level.as_deref(), Some("Wholesale"));
        assert_eq!(tier.value.limit, DEFAULT_INVOICE_LIMIT);
    }
}
