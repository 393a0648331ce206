//! Engagement list filtering and sorting.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use crate::engagement::Engagement;
use crate::Time;

/// Fields an engagement list can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EngagementSortField {
    /// Engagement start
    StartDate,
    /// Engagement end
    EndDate,
    /// Customer name, case-insensitive
    CustomerName,
    /// Project name, case-insensitive
    ProjectName,
}

impl EngagementSortField {
    /// All fields in declaration order.
    pub const ALL: [EngagementSortField; 4] = [
        EngagementSortField::StartDate,
        EngagementSortField::EndDate,
        EngagementSortField::CustomerName,
        EngagementSortField::ProjectName,
    ];

    /// Human readable field name.
    pub fn text(self) -> &'static str {
        match self {
            EngagementSortField::StartDate => "Start Date",
            EngagementSortField::EndDate => "End Date",
            EngagementSortField::CustomerName => "Customer Name",
            EngagementSortField::ProjectName => "Project Name",
        }
    }
}

impl std::str::FromStr for EngagementSortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "startdate" => Ok(EngagementSortField::StartDate),
            "enddate" => Ok(EngagementSortField::EndDate),
            "customername" => Ok(EngagementSortField::CustomerName),
            "projectname" => Ok(EngagementSortField::ProjectName),
            other => Err(format!("unknown sort field: {}", other)),
        }
    }
}

/// A sort clause. Equality is structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortOption {
    /// Field to sort by
    pub sort_field: EngagementSortField,

    /// Direction
    pub is_ascending: bool,
}

impl SortOption {
    /// Create a sort clause.
    pub fn new(sort_field: EngagementSortField, is_ascending: bool) -> Self {
        Self { sort_field, is_ascending }
    }

    /// Compare two engagements under this clause.
    ///
    /// Missing dates always sort last, whatever the direction.
    pub fn compare(&self, a: &Engagement, b: &Engagement) -> Ordering {
        let directed = |o: Ordering| if self.is_ascending { o } else { o.reverse() };
        match self.sort_field {
            EngagementSortField::StartDate => compare_dates(a.start_date, b.start_date, directed),
            EngagementSortField::EndDate => compare_dates(a.end_date, b.end_date, directed),
            EngagementSortField::CustomerName => {
                directed(a.customer_name.to_lowercase().cmp(&b.customer_name.to_lowercase()))
            }
            EngagementSortField::ProjectName => {
                directed(a.project_name.to_lowercase().cmp(&b.project_name.to_lowercase()))
            }
        }
    }
}

fn compare_dates(a: Option<Time>, b: Option<Time>, directed: impl Fn(Ordering) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => directed(a.cmp(&b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Lifecycle status derived from engagement dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementStatus {
    /// Starts in the future, or has no start date
    Upcoming,
    /// Started and not yet ended
    Active,
    /// Ended
    Past,
}

impl EngagementStatus {
    /// Status of an engagement at `now`.
    pub fn of(engagement: &Engagement, now: Time) -> Self {
        match (engagement.start_date, engagement.end_date) {
            (_, Some(end)) if end < now => EngagementStatus::Past,
            (Some(start), _) if start <= now => EngagementStatus::Active,
            _ => EngagementStatus::Upcoming,
        }
    }
}

/// Filter applied to the engagement list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngagementFilter {
    /// Case-insensitive match on customer or project name
    pub search_term: Option<String>,

    /// Statuses to keep; `None` keeps all
    pub allowed_statuses: Option<Vec<EngagementStatus>>,

    /// Sort clause
    pub sort: Option<SortOption>,
}

impl EngagementFilter {
    /// Whether a single engagement passes the search and status clauses.
    pub fn matches(&self, engagement: &Engagement, now: Time) -> bool {
        let term_ok = match self.search_term.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                engagement.customer_name.to_lowercase().contains(&term)
                    || engagement.project_name.to_lowercase().contains(&term)
            }
            _ => true,
        };

        let status_ok = match &self.allowed_statuses {
            Some(statuses) => statuses.contains(&EngagementStatus::of(engagement, now)),
            None => true,
        };

        term_ok && status_ok
    }

    /// Matching engagements, ordered by the sort clause. The sort is stable.
    pub fn apply(&self, engagements: &[Engagement], now: Time) -> Vec<Engagement> {
        let mut out: Vec<Engagement> = engagements
            .iter()
            .filter(|e| self.matches(e, now))
            .cloned()
            .collect();

        if let Some(sort) = &self.sort {
            out.sort_by(|a, b| sort.compare(a, b));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn engagement(customer: &str, project: &str, start: Option<Time>, end: Option<Time>) -> Engagement {
        Engagement {
            start_date: start,
            end_date: end,
            ..Engagement::draft(customer, project)
        }
    }

    fn now() -> Time {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_status_from_dates() {
        let now = now();
        let past = engagement("a", "p", Some(now - Duration::days(30)), Some(now - Duration::days(1)));
        let active = engagement("a", "p", Some(now - Duration::days(1)), Some(now + Duration::days(1)));
        let upcoming = engagement("a", "p", Some(now + Duration::days(3)), None);
        let undated = engagement("a", "p", None, None);

        assert_eq!(EngagementStatus::of(&past, now), EngagementStatus::Past);
        assert_eq!(EngagementStatus::of(&active, now), EngagementStatus::Active);
        assert_eq!(EngagementStatus::of(&upcoming, now), EngagementStatus::Upcoming);
        assert_eq!(EngagementStatus::of(&undated, now), EngagementStatus::Upcoming);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let list = vec![
            engagement("Acme", "Rocket", None, None),
            engagement("Globex", "Dome", None, None),
        ];
        let filter = EngagementFilter {
            search_term: Some("  rock ".to_string()),
            ..Default::default()
        };

        let out = filter.apply(&list, now());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].customer_name, "Acme");
    }

    #[test]
    fn test_sort_by_name_both_directions() {
        let list = vec![
            engagement("beta", "x", None, None),
            engagement("Alpha", "y", None, None),
            engagement("gamma", "z", None, None),
        ];

        let mut filter = EngagementFilter {
            sort: Some(SortOption::new(EngagementSortField::CustomerName, true)),
            ..Default::default()
        };
        let names: Vec<_> = filter.apply(&list, now()).into_iter().map(|e| e.customer_name).collect();
        assert_eq!(names, vec!["Alpha", "beta", "gamma"]);

        filter.sort = Some(SortOption::new(EngagementSortField::CustomerName, false));
        let names: Vec<_> = filter.apply(&list, now()).into_iter().map(|e| e.customer_name).collect();
        assert_eq!(names, vec!["gamma", "beta", "Alpha"]);
    }

    #[test]
    fn test_missing_dates_sort_last() {
        let now = now();
        let list = vec![
            engagement("none", "p", None, None),
            engagement("late", "p", Some(now + Duration::days(5)), None),
            engagement("early", "p", Some(now - Duration::days(5)), None),
        ];

        for ascending in [true, false] {
            let filter = EngagementFilter {
                sort: Some(SortOption::new(EngagementSortField::StartDate, ascending)),
                ..Default::default()
            };
            let out = filter.apply(&list, now);
            assert_eq!(out.last().unwrap().customer_name, "none");
        }
    }

    #[test]
    fn test_status_filter() {
        let now = now();
        let list = vec![
            engagement("past", "p", None, Some(now - Duration::days(1))),
            engagement("future", "p", Some(now + Duration::days(1)), None),
        ];
        let filter = EngagementFilter {
            allowed_statuses: Some(vec![EngagementStatus::Past]),
            ..Default::default()
        };

        let out = filter.apply(&list, now);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].customer_name, "past");
    }

    #[test]
    fn test_parse_sort_field() {
        assert_eq!("start-date".parse::<EngagementSortField>().unwrap(), EngagementSortField::StartDate);
        assert_eq!("projectName".parse::<EngagementSortField>().unwrap(), EngagementSortField::ProjectName);
        assert!("budget".parse::<EngagementSortField>().is_err());
    }
}
