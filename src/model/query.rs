//! [`SearchQuery`] and [`SearchResult`] — spec §3.

use chrono::NaiveDate;

use super::conversation::Conversation;
use super::message::Role;
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Any,
    All,
}

impl Default for MatchMode {
    fn default() -> Self {
        MatchMode::Any
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Score,
    Date,
    Title,
    Messages,
}

impl Default for SortBy {
    fn default() -> Self {
        SortBy::Score
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Desc
    }
}

pub const MIN_LIMIT: u32 = 1;
pub const MAX_LIMIT: u32 = 1000;
pub const DEFAULT_LIMIT: u32 = 10;

/// Search parameters (spec §3 `SearchQuery`). Constructed only through
/// [`SearchQueryBuilder`] so that every instance is validated.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub keywords: Vec<String>,
    pub match_mode: MatchMode,
    pub phrases: Vec<String>,
    pub exclude_keywords: Vec<String>,
    pub title_filter: Option<String>,
    pub role_filter: Option<Role>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub min_messages: Option<u32>,
    pub max_messages: Option<u32>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub limit: u32,
}

/// Builder for [`SearchQuery`]; validates invariants at `build()` (spec §3).
#[derive(Debug, Clone, Default)]
pub struct SearchQueryBuilder {
    keywords: Vec<String>,
    match_mode: MatchMode,
    phrases: Vec<String>,
    exclude_keywords: Vec<String>,
    title_filter: Option<String>,
    role_filter: Option<Role>,
    from_date: Option<NaiveDate>,
    to_date: Option<NaiveDate>,
    min_messages: Option<u32>,
    max_messages: Option<u32>,
    sort_by: SortBy,
    sort_order: SortOrder,
    limit: Option<u32>,
}

impl SearchQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    pub fn phrases(mut self, phrases: Vec<String>) -> Self {
        self.phrases = phrases;
        self
    }

    pub fn exclude_keywords(mut self, keywords: Vec<String>) -> Self {
        self.exclude_keywords = keywords;
        self
    }

    pub fn title_filter(mut self, title: impl Into<String>) -> Self {
        self.title_filter = Some(title.into());
        self
    }

    pub fn role_filter(mut self, role: Role) -> Self {
        self.role_filter = Some(role);
        self
    }

    pub fn from_date(mut self, date: NaiveDate) -> Self {
        self.from_date = Some(date);
        self
    }

    pub fn to_date(mut self, date: NaiveDate) -> Self {
        self.to_date = Some(date);
        self
    }

    pub fn min_messages(mut self, n: u32) -> Self {
        self.min_messages = Some(n);
        self
    }

    pub fn max_messages(mut self, n: u32) -> Self {
        self.max_messages = Some(n);
        self
    }

    pub fn sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = order;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn build(self) -> Result<SearchQuery, ValidationError> {
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        if limit < MIN_LIMIT || limit > MAX_LIMIT {
            return Err(ValidationError::LimitOutOfRange(limit));
        }

        if let Some(min) = self.min_messages
            && min < 1
        {
            return Err(ValidationError::OutOfRange {
                field: "min_messages",
                min: 1,
                value: min as i64,
            });
        }
        if let Some(max) = self.max_messages
            && max < 1
        {
            return Err(ValidationError::OutOfRange {
                field: "max_messages",
                min: 1,
                value: max as i64,
            });
        }
        if let (Some(min), Some(max)) = (self.min_messages, self.max_messages)
            && min > max
        {
            return Err(ValidationError::MessageRangeInverted { min, max });
        }

        Ok(SearchQuery {
            keywords: self.keywords,
            match_mode: self.match_mode,
            phrases: self.phrases,
            exclude_keywords: self.exclude_keywords,
            title_filter: self.title_filter,
            role_filter: self.role_filter,
            from_date: self.from_date,
            to_date: self.to_date,
            min_messages: self.min_messages,
            max_messages: self.max_messages,
            sort_by: self.sort_by,
            sort_order: self.sort_order,
            limit,
        })
    }
}

/// A single ranked search hit (spec §3 `SearchResult`).
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub conversation: Conversation,
    pub score: f64,
    pub matched_message_ids: Vec<String>,
    pub snippet: String,
}
