//! Task listing query parameters: pagination bounds, sort whitelist, and
//! filter validation.
//!
//! Raw query-string values arrive as [`TaskListQuery`] and are turned into a
//! validated [`TaskFilter`] before any store access. Pagination and sorting
//! never fail (bad values fall back to defaults); malformed ids and
//! timestamps are validation errors.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Page used when `page` is absent, malformed, or below 1.
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when `limit` is absent, malformed, or below 1.
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest accepted page size; bigger requests are clamped.
pub const MAX_LIMIT: i64 = 100;

/// Resolve the requested page number.
pub fn normalize_page(raw: Option<&str>) -> i64 {
    match raw.and_then(|v| v.trim().parse::<i64>().ok()) {
        Some(page) if page >= 1 => page,
        _ => DEFAULT_PAGE,
    }
}

/// Resolve the requested page size.
///
/// Non-positive or unparseable values fall back to [`DEFAULT_LIMIT`] rather
/// than flooring at 1; values above [`MAX_LIMIT`] are clamped.
pub fn normalize_limit(raw: Option<&str>) -> i64 {
    match raw.and_then(|v| v.trim().parse::<i64>().ok()) {
        Some(limit) if limit >= 1 => limit.min(MAX_LIMIT),
        _ => DEFAULT_LIMIT,
    }
}

/// Number of pages needed to show `total` rows at `limit` rows per page.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if limit <= 0 || total <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    Deadline,
    Title,
}

impl SortField {
    /// Column name on the `tasks` table. Only these strings ever reach SQL.
    pub fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::Deadline => "deadline",
            SortField::Title => "title",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "created_at" => Some(SortField::CreatedAt),
            "deadline" => Some(SortField::Deadline),
            "title" => Some(SortField::Title),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn keyword(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A whitelisted ordering for task listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for TaskSort {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl TaskSort {
    /// Parse `field[,direction]` (comma or whitespace separated).
    ///
    /// Anything outside the whitelist yields the default ordering
    /// (`created_at desc`); this never fails.
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty());

        let Some(field) = parts.next().and_then(SortField::from_name) else {
            return Self::default();
        };

        let direction = match parts.next().map(str::to_ascii_lowercase).as_deref() {
            None | Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            Some(_) => return Self::default(),
        };

        if parts.next().is_some() {
            return Self::default();
        }

        Self { field, direction }
    }
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Raw `GET /tasks` query string. Every value is kept as text so that
/// malformed input can be handled per field instead of rejecting the request
/// wholesale.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TaskListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
    pub subject_id: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub deadline_before: Option<String>,
    pub deadline_after: Option<String>,
}

/// Validated task listing filter. All present predicates are ANDed.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFilter {
    pub page: i64,
    pub limit: i64,
    pub status: Option<String>,
    pub subject_id: Option<DbId>,
    pub search: Option<String>,
    pub sort: TaskSort,
    pub deadline_before: Option<Timestamp>,
    pub deadline_after: Option<Timestamp>,
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            status: None,
            subject_id: None,
            search: None,
            sort: TaskSort::default(),
            deadline_before: None,
            deadline_after: None,
        }
    }
}

impl TaskFilter {
    /// Row offset of the first item on the current page. Saturates instead
    /// of overflowing for absurdly large pages.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// Trimmed value, or `None` when absent or blank.
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_rfc3339(name: &str, raw: &str) -> Result<Timestamp, CoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| CoreError::validation(format!("{name} must be RFC3339")))
}

impl TaskListQuery {
    /// `true` when the request is the plain default listing: no predicates,
    /// no explicit sort, and it resolves to the first default-sized page.
    /// Only such requests may be answered from the list cache.
    pub fn is_unfiltered(&self) -> bool {
        non_blank(&self.status).is_none()
            && non_blank(&self.subject_id).is_none()
            && non_blank(&self.search).is_none()
            && non_blank(&self.sort).is_none()
            && non_blank(&self.deadline_before).is_none()
            && non_blank(&self.deadline_after).is_none()
            && normalize_page(self.page.as_deref()) == DEFAULT_PAGE
            && normalize_limit(self.limit.as_deref()) == DEFAULT_LIMIT
    }

    /// Validate the raw parameters into a [`TaskFilter`].
    pub fn to_filter(&self) -> Result<TaskFilter, CoreError> {
        let subject_id = match non_blank(&self.subject_id) {
            None => None,
            Some(raw) => match raw.parse::<DbId>() {
                Ok(id) if id > 0 => Some(id),
                _ => return Err(CoreError::validation("invalid subject_id")),
            },
        };

        let deadline_before = non_blank(&self.deadline_before)
            .map(|raw| parse_rfc3339("deadline_before", raw))
            .transpose()?;
        let deadline_after = non_blank(&self.deadline_after)
            .map(|raw| parse_rfc3339("deadline_after", raw))
            .transpose()?;

        Ok(TaskFilter {
            page: normalize_page(self.page.as_deref()),
            limit: normalize_limit(self.limit.as_deref()),
            status: non_blank(&self.status).map(str::to_string),
            subject_id,
            search: non_blank(&self.search).map(str::to_string),
            sort: non_blank(&self.sort).map(TaskSort::parse).unwrap_or_default(),
            deadline_before,
            deadline_after,
        })
    }
}

/// Escape `%`, `_` and `\` so user search text matches literally inside an
/// `ILIKE ... ESCAPE '\'` pattern.
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    use super::*;

    fn query() -> TaskListQuery {
        TaskListQuery::default()
    }

    // -- pagination ----------------------------------------------------------

    #[test]
    fn limit_above_max_is_clamped() {
        assert_eq!(normalize_limit(Some("500")), 100);
        assert_eq!(normalize_limit(Some("100")), 100);
    }

    #[test]
    fn non_positive_limit_falls_back_to_default() {
        assert_eq!(normalize_limit(Some("0")), DEFAULT_LIMIT);
        assert_eq!(normalize_limit(Some("-3")), DEFAULT_LIMIT);
        assert_eq!(normalize_limit(Some("ten")), DEFAULT_LIMIT);
        assert_eq!(normalize_limit(None), DEFAULT_LIMIT);
    }

    #[test]
    fn non_positive_page_falls_back_to_first() {
        assert_eq!(normalize_page(Some("0")), 1);
        assert_eq!(normalize_page(Some("-1")), 1);
        assert_eq!(normalize_page(Some("abc")), 1);
        assert_eq!(normalize_page(Some("4")), 4);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(250, 100), 3);
    }

    #[test]
    fn offset_follows_page_and_limit() {
        let filter = TaskFilter {
            page: 3,
            limit: 20,
            ..TaskFilter::default()
        };
        assert_eq!(filter.offset(), 40);
    }

    #[test]
    fn offset_saturates_for_huge_pages() {
        let filter = TaskFilter {
            page: i64::MAX,
            limit: MAX_LIMIT,
            ..TaskFilter::default()
        };
        assert_eq!(filter.offset(), i64::MAX);
    }

    // -- sorting -------------------------------------------------------------

    #[test]
    fn sort_accepts_whitelisted_fields_and_directions() {
        assert_eq!(
            TaskSort::parse("title desc"),
            TaskSort {
                field: SortField::Title,
                direction: SortDirection::Desc
            }
        );
        assert_eq!(
            TaskSort::parse("deadline,desc"),
            TaskSort {
                field: SortField::Deadline,
                direction: SortDirection::Desc
            }
        );
        assert_eq!(
            TaskSort::parse("created_at"),
            TaskSort {
                field: SortField::CreatedAt,
                direction: SortDirection::Asc
            }
        );
        assert_eq!(TaskSort::parse("title ASC").direction, SortDirection::Asc);
    }

    #[test]
    fn sort_outside_whitelist_falls_back_silently() {
        assert_eq!(TaskSort::parse("malicious; DROP TABLE"), TaskSort::default());
        assert_eq!(TaskSort::parse("title sideways"), TaskSort::default());
        assert_eq!(TaskSort::parse("title desc extra"), TaskSort::default());
        assert_eq!(TaskSort::parse("id"), TaskSort::default());
        assert_eq!(TaskSort::default().field.column(), "created_at");
        assert_eq!(TaskSort::default().direction.keyword(), "DESC");
    }

    // -- filter --------------------------------------------------------------

    #[test]
    fn empty_query_is_the_default_filter() {
        let filter = query().to_filter().unwrap();
        assert_eq!(filter, TaskFilter::default());
        assert!(query().is_unfiltered());
    }

    #[test]
    fn blank_values_are_ignored() {
        let q = TaskListQuery {
            status: Some("   ".into()),
            search: Some(String::new()),
            ..query()
        };
        assert!(q.is_unfiltered());
        let filter = q.to_filter().unwrap();
        assert_eq!(filter.status, None);
        assert_eq!(filter.search, None);
    }

    #[test]
    fn any_predicate_or_paging_makes_query_filtered() {
        let with_status = TaskListQuery {
            status: Some("done".into()),
            ..query()
        };
        assert!(!with_status.is_unfiltered());

        let second_page = TaskListQuery {
            page: Some("2".into()),
            ..query()
        };
        assert!(!second_page.is_unfiltered());

        let big_page = TaskListQuery {
            limit: Some("50".into()),
            ..query()
        };
        assert!(!big_page.is_unfiltered());

        let sorted = TaskListQuery {
            sort: Some("title".into()),
            ..query()
        };
        assert!(!sorted.is_unfiltered());
    }

    #[test]
    fn invalid_subject_id_is_rejected() {
        for raw in ["abc", "0", "-4", "1.5"] {
            let q = TaskListQuery {
                subject_id: Some(raw.into()),
                ..query()
            };
            assert_matches!(q.to_filter(), Err(CoreError::Validation(_)), "{raw}");
        }
    }

    #[test]
    fn subject_id_and_status_are_kept() {
        let q = TaskListQuery {
            subject_id: Some(" 12 ".into()),
            status: Some("done".into()),
            ..query()
        };
        let filter = q.to_filter().unwrap();
        assert_eq!(filter.subject_id, Some(12));
        assert_eq!(filter.status.as_deref(), Some("done"));
    }

    #[test]
    fn deadline_bounds_must_be_rfc3339() {
        let bad = TaskListQuery {
            deadline_before: Some("2025-12-01".into()),
            ..query()
        };
        assert_matches!(
            bad.to_filter(),
            Err(CoreError::Validation(msg)) if msg.contains("deadline_before")
        );

        let bad_after = TaskListQuery {
            deadline_after: Some("yesterday".into()),
            ..query()
        };
        assert_matches!(
            bad_after.to_filter(),
            Err(CoreError::Validation(msg)) if msg.contains("deadline_after")
        );

        let good = TaskListQuery {
            deadline_after: Some("2025-12-01T12:00:00+02:00".into()),
            ..query()
        };
        let filter = good.to_filter().unwrap();
        assert_eq!(
            filter.deadline_after,
            Some(chrono::Utc.with_ymd_and_hms(2025, 12, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
