//! Query state: which slice of history is requested and how it is shown.

use crate::api::{HistoryQuery, RecordType};

/// Page sizes offered by the page-size control.
pub const PAGE_SIZES: [u32; 4] = [10, 20, 50, 100];

// ── Sorting ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Self::Asc => "▲",
            Self::Desc => "▼",
        }
    }
}

/// Sortable table columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    Id,
    Type,
    Content,
    Size,
    CreatedAt,
}

impl SortField {
    /// Display order; index + 1 is the number key bound to the column.
    pub const ALL: [SortField; 5] = [
        Self::Id,
        Self::Type,
        Self::Content,
        Self::Size,
        Self::CreatedAt,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Type => "Type",
            Self::Content => "Content",
            Self::Size => "Size",
            Self::CreatedAt => "Time",
        }
    }
}

// ── Filters ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FavoriteFilter {
    #[default]
    All,
    Favorited,
    NotFavorited,
}

impl FavoriteFilter {
    pub fn as_param(self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::Favorited => Some(true),
            Self::NotFavorited => Some(false),
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::All => Self::Favorited,
            Self::Favorited => Self::NotFavorited,
            Self::NotFavorited => Self::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Favorited => "Favorited",
            Self::NotFavorited => "Not favorited",
        }
    }
}

/// Advance the type filter: All → Text → Image → File → Group → All.
pub fn next_type_filter(current: Option<&RecordType>) -> Option<RecordType> {
    match current {
        None => Some(RecordType::FILTERABLE[0].clone()),
        Some(kind) => RecordType::FILTERABLE
            .iter()
            .position(|t| t == kind)
            .and_then(|idx| RecordType::FILTERABLE.get(idx + 1))
            .cloned(),
    }
}

// ── State ───────────────────────────────────────────────────────────────────

/// Client-held parameters controlling which page is requested.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryState {
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
    /// Total matching records as last reported by the server.
    pub total_records: u64,
    pub type_filter: Option<RecordType>,
    /// Empty means no search.
    pub search_query: String,
    pub favorite_filter: FavoriteFilter,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
    /// Set while a history fetch is in flight.
    pub is_loading: bool,
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(20)
    }
}

impl QueryState {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total_records: 0,
            type_filter: None,
            search_query: String::new(),
            favorite_filter: FavoriteFilter::All,
            sort_field: SortField::Id,
            sort_order: SortOrder::Desc,
            is_loading: false,
        }
    }

    /// Build the request for the current page and filters.
    pub fn to_query(&self) -> HistoryQuery {
        HistoryQuery {
            page: self.page,
            page_size: self.page_size,
            kind: self.type_filter.clone(),
            search: (!self.search_query.is_empty()).then(|| self.search_query.clone()),
            favorited: self.favorite_filter.as_param(),
        }
    }

    /// `ceil(total / page_size)`; 0 when there are no records.
    pub fn total_pages(&self) -> u32 {
        let size = u64::from(self.page_size.max(1));
        u32::try_from(self.total_records.div_ceil(size)).unwrap_or(u32::MAX)
    }

    /// Whether any server-side filter (search, type, favorite) is active.
    pub fn has_active_filter(&self) -> bool {
        !self.search_query.is_empty()
            || self.type_filter.is_some()
            || self.favorite_filter != FavoriteFilter::All
    }

    pub fn can_go_prev(&self) -> bool {
        self.page > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Pagination text, e.g. `21-40 / 45`, or `No records`.
    pub fn page_range_label(&self) -> String {
        if self.total_records == 0 {
            return "No records".to_string();
        }
        let size = u64::from(self.page_size);
        let start = u64::from(self.page.saturating_sub(1)) * size + 1;
        let end = (u64::from(self.page) * size).min(self.total_records);
        format!("{start}-{end} / {}", self.total_records)
    }

    /// Column click: same column toggles direction, a new column starts descending.
    pub fn set_sort(&mut self, field: SortField) {
        if self.sort_field == field {
            self.sort_order = self.sort_order.toggled();
        } else {
            self.sort_field = field;
            self.sort_order = SortOrder::Desc;
        }
    }

    /// Step the page size through [`PAGE_SIZES`]. Returns true if it changed.
    pub fn step_page_size(&mut self, larger: bool) -> bool {
        let next = if larger {
            PAGE_SIZES.iter().copied().find(|&s| s > self.page_size)
        } else {
            PAGE_SIZES.iter().rev().copied().find(|&s| s < self.page_size)
        };
        match next {
            Some(size) => {
                self.page_size = size;
                self.page = 1;
                true
            }
            _ => false,
        }
    }

    /// Clamp `page` to the last page after a load. Returns true if it moved.
    pub fn clamp_page(&mut self) -> bool {
        let last = self.total_pages().max(1);
        if self.page > last {
            self.page = last;
            true
        } else {
            false
        }
    }
}
