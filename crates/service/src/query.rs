//! Composable listing filters.
//!
//! Every field is optional; supplied fields narrow the result with AND
//! semantics. The same predicates are evaluated in process by the memory
//! store and translated to SQL conditions by the SeaORM store.

use chrono::NaiveDate;
use serde::Deserialize;

use models::{car, company, service, user};

/// Which services a listing may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every mechanic's services (administrative view).
    All,
    /// Only services owned by this mechanic (self-service view).
    Mechanic(i32),
}

/// How the date range bounds compare against `service.date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Inclusive,
    Exclusive,
}

impl Scope {
    /// The administrative listing has always excluded both endpoints while
    /// the self-service listing includes them. Each surface keeps its own
    /// behaviour.
    pub fn date_bound(self) -> Bound {
        match self {
            Scope::All => Bound::Exclusive,
            Scope::Mechanic(_) => Bound::Inclusive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub bound: Bound,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        let after_start = match (self.start, self.bound) {
            (None, _) => true,
            (Some(s), Bound::Inclusive) => date >= s,
            (Some(s), Bound::Exclusive) => date > s,
        };
        let before_end = match (self.end, self.bound) {
            (None, _) => true,
            (Some(e), Bound::Inclusive) => date <= e,
            (Some(e), Bound::Exclusive) => date < e,
        };
        after_start && before_end
    }
}

/// Admin user listing: `username` is a case-sensitive substring match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    pub username: Option<String>,
    pub is_admin: Option<bool>,
}

impl UserFilter {
    pub fn matches(&self, u: &user::Model) -> bool {
        self.username.as_deref().map_or(true, |needle| u.username.contains(needle))
            && self.is_admin.map_or(true, |flag| u.is_admin == flag)
    }
}

/// Company listing: case-insensitive substring on `name`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyFilter {
    pub name: Option<String>,
}

impl CompanyFilter {
    pub fn matches(&self, c: &company::Model) -> bool {
        self.name.as_deref().map_or(true, |needle| contains_ignore_case(&c.name, needle))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CarFilter {
    pub name: Option<String>,
    pub company_id: Option<i32>,
}

impl CarFilter {
    pub fn matches(&self, c: &car::Model) -> bool {
        self.name.as_deref().map_or(true, |needle| contains_ignore_case(&c.name, needle))
            && self.company_id.map_or(true, |id| c.company_id == id)
    }
}

/// Caller-supplied service listing parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceQuery {
    pub customer: Option<String>,
    pub mechanic: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// A [`ServiceQuery`] bound to the scope it runs under.
#[derive(Debug, Clone)]
pub struct ServiceFilter {
    pub scope: Scope,
    pub query: ServiceQuery,
}

impl ServiceFilter {
    pub fn new(scope: Scope, query: ServiceQuery) -> Self {
        Self { scope, query }
    }

    pub fn date_range(&self) -> DateRange {
        DateRange {
            start: self.query.start_date,
            end: self.query.end_date,
            bound: self.scope.date_bound(),
        }
    }

    /// Mechanic ids a row must equal. A scoped listing combined with an
    /// explicit mechanic filter yields both, so a mismatch matches nothing.
    pub fn mechanic_constraints(&self) -> Vec<i32> {
        let mut ids = Vec::with_capacity(2);
        if let Scope::Mechanic(id) = self.scope {
            ids.push(id);
        }
        if let Some(id) = self.query.mechanic {
            ids.push(id);
        }
        ids
    }

    pub fn matches(&self, s: &service::Model) -> bool {
        self.mechanic_constraints().iter().all(|id| s.mechanic_id == *id)
            && self.query.customer.as_deref().map_or(true, |needle| contains_ignore_case(&s.customer, needle))
            && self.date_range().contains(s.date)
    }
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Escape `needle` for use inside a SQL `LIKE` pattern with `\` as the
/// escape character, wrapped in `%` on both sides.
pub fn like_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}
