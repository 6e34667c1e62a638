//! Query and aggregation building.
//!
//! Turns raw HTTP query parameters into filter predicates, pagination windows,
//! sort orders and grouping statements for the songs table. Nothing in here
//! touches a connection; [`super::SqliteSongStore`] executes what is built.

use super::models::SongField;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const DEFAULT_TOP_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Raw list parameters as received in the query string.
///
/// Everything is kept as text so that malformed numbers fall back to defaults
/// instead of rejecting the request.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct TopParams {
    pub by: Option<String>,
    pub limit: Option<String>,
}

/// Parses the leading integer of `s`, ignoring leading whitespace and any
/// trailing garbage: `"12abc"` is 12, `" -3"` is -3, `"abc"` is `None`.
/// Values beyond the `i64` range saturate.
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits: &str = {
        let end = digits
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(digits.len());
        &digits[..end]
    };
    if digits.is_empty() {
        return None;
    }

    let magnitude = digits.bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

/// Missing, unparsable and zero values all mean "use the default".
fn int_or_default(raw: Option<&str>, default: u32) -> i64 {
    match raw.and_then(parse_leading_int) {
        None | Some(0) => i64::from(default),
        Some(value) => value,
    }
}

/// Clamps a requested limit to `[1, MAX_LIMIT]`.
pub fn resolve_limit(raw: Option<&str>, default: u32) -> u32 {
    int_or_default(raw, default).clamp(1, i64::from(MAX_LIMIT)) as u32
}

/// Floors a requested page number at 1.
pub fn resolve_page(raw: Option<&str>) -> u32 {
    int_or_default(raw, 1).clamp(1, i64::from(u32::MAX)) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.limit))
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Field(SongField),
    CreatedAt,
    UpdatedAt,
    Id,
}

impl SortKey {
    fn from_name(name: &str) -> Option<SortKey> {
        match name {
            "createdAt" => Some(SortKey::CreatedAt),
            "updatedAt" => Some(SortKey::UpdatedAt),
            "_id" => Some(SortKey::Id),
            other => SongField::from_name(other).map(SortKey::Field),
        }
    }

    fn column(&self) -> &'static str {
        match self {
            SortKey::Field(field) => field.column(),
            SortKey::CreatedAt => "created_at",
            SortKey::UpdatedAt => "updated_at",
            SortKey::Id => "id",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub key: SortKey,
    pub descending: bool,
}

impl SortOrder {
    pub const NEWEST_FIRST: SortOrder = SortOrder {
        key: SortKey::CreatedAt,
        descending: true,
    };
}

/// Parses a sort expression such as `"-createdAt"` or `"artist, -title"`.
///
/// Unknown fields are skipped; an expression with no known field yields the
/// default newest-first order.
pub fn parse_sort(raw: Option<&str>) -> Vec<SortOrder> {
    let orders: Vec<SortOrder> = raw
        .unwrap_or_default()
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .filter_map(|token| {
            let (descending, name) = match token.strip_prefix('-') {
                Some(name) => (true, name),
                None => (false, token.strip_prefix('+').unwrap_or(token)),
            };
            SortKey::from_name(name).map(|key| SortOrder { key, descending })
        })
        .fold(Vec::new(), |mut acc, order| {
            if !acc.iter().any(|o: &SortOrder| o.key == order.key) {
                acc.push(order);
            }
            acc
        });

    if orders.is_empty() {
        vec![SortOrder::NEWEST_FIRST]
    } else {
        orders
    }
}

/// Case-insensitive substring filters. Per-field filters are ANDed together;
/// the free text search matches if any of the four fields contains it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongFilter {
    pub fields: Vec<(SongField, String)>,
    pub search: Option<String>,
}

impl SongFilter {
    pub fn with_field(mut self, field: SongField, value: impl Into<String>) -> Self {
        self.fields.push((field, value.into()));
        self
    }

    pub fn with_search(mut self, value: impl Into<String>) -> Self {
        self.search = Some(value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.search.is_none()
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub filter: SongFilter,
    pub sort: Vec<SortOrder>,
    pub pagination: Pagination,
}

impl Default for ListQuery {
    fn default() -> Self {
        ListQuery {
            filter: SongFilter::default(),
            sort: vec![SortOrder::NEWEST_FIRST],
            pagination: Pagination::default(),
        }
    }
}

impl ListQuery {
    pub fn from_params(params: &ListParams) -> Self {
        let mut filter = SongFilter::default();
        for (field, value) in [
            (SongField::Title, &params.title),
            (SongField::Artist, &params.artist),
            (SongField::Album, &params.album),
            (SongField::Genre, &params.genre),
        ] {
            if let Some(value) = non_empty(value) {
                filter = filter.with_field(field, value);
            }
        }
        filter.search = non_empty(&params.q);

        ListQuery {
            filter,
            sort: parse_sort(params.sort.as_deref()),
            pagination: Pagination {
                page: resolve_page(params.page.as_deref()),
                limit: resolve_limit(params.limit.as_deref(), DEFAULT_PAGE_LIMIT),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopBy {
    /// Artists ranked by number of songs.
    Songs,
    /// Albums ranked by number of songs.
    Albums,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTopBy(pub String);

impl fmt::Display for InvalidTopBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid 'by' parameter. Use 'songs' or 'albums'.")
    }
}

impl std::error::Error for InvalidTopBy {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopQuery {
    pub by: TopBy,
    pub limit: u32,
}

impl TopQuery {
    pub fn from_params(params: &TopParams) -> Result<Self, InvalidTopBy> {
        let by = match params.by.as_deref() {
            None | Some("songs") => TopBy::Songs,
            Some("albums") => TopBy::Albums,
            Some(other) => return Err(InvalidTopBy(other.to_string())),
        };
        Ok(TopQuery {
            by,
            limit: resolve_limit(params.limit.as_deref(), DEFAULT_TOP_LIMIT),
        })
    }
}

// =============================================================================
// SQL building
// =============================================================================

/// Name of the SQL scalar that lowercases text with full Unicode rules.
/// [`super::SqliteSongStore`] registers it on every connection.
pub(crate) const FOLD_CASE_FN: &str = "fold_case";

/// Case folding shared by the SQL scalar and the bound needles, so that both
/// sides of a comparison are folded the same way.
pub(crate) fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

fn contains_clause(field: SongField) -> String {
    format!("instr({}({}), ?) > 0", FOLD_CASE_FN, field.column())
}

/// A `WHERE` clause (possibly empty) and its positional arguments.
pub(crate) struct SqlPredicate {
    pub clause: String,
    pub args: Vec<Value>,
}

impl SongFilter {
    pub(crate) fn to_sql(&self) -> SqlPredicate {
        let mut conditions = Vec::new();
        let mut args = Vec::new();

        for (field, value) in &self.fields {
            conditions.push(contains_clause(*field));
            args.push(Value::Text(fold_case(value)));
        }

        if let Some(search) = &self.search {
            let any_field = SongField::ALL
                .iter()
                .map(|field| contains_clause(*field))
                .collect::<Vec<_>>()
                .join(" OR ");
            conditions.push(format!("({})", any_field));
            let needle = fold_case(search);
            args.extend(SongField::ALL.iter().map(|_| Value::Text(needle.clone())));
        }

        let clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        SqlPredicate { clause, args }
    }
}

/// `ORDER BY` clause for `sort`. Ties are broken by insertion order, in the
/// direction of the last sort key, so paging is deterministic.
pub(crate) fn order_by_sql(sort: &[SortOrder]) -> String {
    let direction = |descending: bool| if descending { "DESC" } else { "ASC" };
    let tie_break = direction(sort.last().map(|o| o.descending).unwrap_or(true));

    let mut terms: Vec<String> = sort
        .iter()
        .map(|order| format!("{} {}", order.key.column(), direction(order.descending)))
        .collect();
    terms.push(format!("rowid {}", tie_break));
    format!("ORDER BY {}", terms.join(", "))
}

/// Grouped aggregations over the songs table. Rows come back ordered by song
/// count descending, then by grouping key ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Grouping {
    Genre,
    /// Per artist, with the number of distinct albums.
    Artist,
    /// Per album, with the number of distinct artists.
    Album,
}

impl Grouping {
    pub(crate) fn sql(&self) -> String {
        let (key, related) = match self {
            Grouping::Genre => ("genre", None),
            Grouping::Artist => ("artist", Some("album")),
            Grouping::Album => ("album", Some("artist")),
        };
        let related = related
            .map(|column| format!(", COUNT(DISTINCT {}) AS related", column))
            .unwrap_or_default();
        format!(
            "SELECT {key}, COUNT(*) AS songs{related} FROM songs GROUP BY {key} ORDER BY songs DESC, {key} ASC"
        )
    }

    /// Same ranking as [`Grouping::sql`], without related counts, capped at `?1` rows.
    pub(crate) fn ranking_sql(&self) -> String {
        let key = match self {
            Grouping::Genre => "genre",
            Grouping::Artist => "artist",
            Grouping::Album => "album",
        };
        format!(
            "SELECT {key}, COUNT(*) AS songs FROM songs GROUP BY {key} ORDER BY songs DESC, {key} ASC LIMIT ?1"
        )
    }
}
