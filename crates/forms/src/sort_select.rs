//! Sort select of the engagement filter bar.

use lodestar_core::{EngagementFilter, EngagementSortField, SortOption};
use serde::Serialize;

/// Display text for a sort clause, e.g. `"Start Date Asc"`.
pub fn sort_display_value(field: EngagementSortField, is_ascending: bool) -> String {
    format!("{} {}", field.text(), if is_ascending { "Asc" } else { "Desc" })
}

/// A selectable sort clause. Displays as its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSelectOption {
    /// Field to sort by
    pub sort_field: EngagementSortField,
    /// Direction
    pub is_ascending: bool,
}

impl SortSelectOption {
    /// Option for a clause.
    pub fn new(option: SortOption) -> Self {
        Self {
            sort_field: option.sort_field,
            is_ascending: option.is_ascending,
        }
    }

    /// The clause this option selects.
    pub fn sort_option(&self) -> SortOption {
        SortOption::new(self.sort_field, self.is_ascending)
    }
}

impl std::fmt::Display for SortSelectOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&sort_display_value(self.sort_field, self.is_ascending))
    }
}

/// Every field in both directions, ascending first.
pub fn sort_select_options() -> Vec<SortSelectOption> {
    EngagementSortField::ALL
        .iter()
        .flat_map(|&field| {
            [true, false]
                .into_iter()
                .map(move |asc| SortSelectOption::new(SortOption::new(field, asc)))
        })
        .collect()
}

/// The option matching the filter's current sort, if any.
pub fn current_selection(filter: &EngagementFilter) -> Option<SortSelectOption> {
    let sort = filter.sort?;
    sort_select_options()
        .into_iter()
        .find(|o| o.sort_option() == sort)
}

/// The filter with its sort clause replaced by `option`.
pub fn select(filter: &EngagementFilter, option: SortSelectOption) -> EngagementFilter {
    EngagementFilter {
        sort: Some(option.sort_option()),
        ..filter.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodestar_core::EngagementStatus;

    #[test]
    fn test_display_values() {
        let labels: Vec<String> = sort_select_options().iter().map(ToString::to_string).collect();
        assert_eq!(
            labels,
            vec![
                "Start Date Asc",
                "Start Date Desc",
                "End Date Asc",
                "End Date Desc",
                "Customer Name Asc",
                "Customer Name Desc",
                "Project Name Asc",
                "Project Name Desc",
            ]
        );
    }

    #[test]
    fn test_display_matches_field_text_for_every_option() {
        for field in EngagementSortField::ALL {
            for asc in [true, false] {
                let expected = format!("{} {}", field.text(), if asc { "Asc" } else { "Desc" });
                assert_eq!(sort_display_value(field, asc), expected);
            }
        }
    }

    #[test]
    fn test_select_preserves_other_keys() {
        let filter = EngagementFilter {
            search_term: Some("acme".to_string()),
            allowed_statuses: Some(vec![EngagementStatus::Active]),
            sort: Some(SortOption::new(EngagementSortField::StartDate, true)),
        };
        let option = SortSelectOption::new(SortOption::new(EngagementSortField::ProjectName, false));

        let next = select(&filter, option);
        assert_eq!(next.search_term, filter.search_term);
        assert_eq!(next.allowed_statuses, filter.allowed_statuses);
        assert_eq!(next.sort, Some(SortOption::new(EngagementSortField::ProjectName, false)));
    }

    #[test]
    fn test_current_selection_is_structural() {
        let mut filter = EngagementFilter::default();
        assert_eq!(current_selection(&filter), None);

        filter.sort = Some(SortOption::new(EngagementSortField::EndDate, false));
        let selected = current_selection(&filter).unwrap();
        assert_eq!(selected.to_string(), "End Date Desc");
    }
}
