//! Available filter options under the current selection
//!
//! A facet row is one (contractor, cruise) pair. The filtered set is every row
//! matching all selections; each non-active facet is narrowed to the values
//! present in that set, while the active facet keeps its full list.

use crate::db::models::{Contractor, Cruise};
use crate::dto::{FacetKey, FilterOptions, MapDataFilter};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetRow {
    pub contractor_id: i32,
    pub contract_type_id: i32,
    pub contract_status_id: i32,
    pub sponsoring_state: String,
    pub year: i32,
    pub cruise_id: Option<i32>,
}

impl FacetRow {
    fn matches(&self, filter: &MapDataFilter) -> bool {
        fn accepts<T: PartialEq>(selected: &Option<T>, value: &T) -> bool {
            selected.as_ref().map_or(true, |s| s == value)
        }

        accepts(&filter.contractor_id, &self.contractor_id)
            && accepts(&filter.contract_type_id, &self.contract_type_id)
            && accepts(&filter.contract_status_id, &self.contract_status_id)
            && accepts(&filter.sponsoring_state, &self.sponsoring_state)
            && accepts(&filter.year, &self.year)
            && filter.cruise_id.map_or(true, |id| self.cruise_id == Some(id))
    }
}

/// One row per (contractor, cruise); contractors without cruises get one row
pub fn facet_rows(contractors: &[Contractor], cruises: &[Cruise]) -> Vec<FacetRow> {
    contractors
        .iter()
        .flat_map(|c| {
            let row = |cruise_id| FacetRow {
                contractor_id: c.id,
                contract_type_id: c.contract_type_id,
                contract_status_id: c.contract_status_id,
                sponsoring_state: c.sponsoring_state.clone(),
                year: c.contractual_year,
                cruise_id,
            };

            let mut rows: Vec<FacetRow> = cruises
                .iter()
                .filter(|cruise| cruise.contractor_id == c.id)
                .map(|cruise| row(Some(cruise.id)))
                .collect();
            if rows.is_empty() {
                rows.push(row(None));
            }
            rows
        })
        .collect()
}

fn narrow<T, K, F>(full: &[T], active: bool, present: &HashSet<K>, key: F) -> Vec<T>
where
    T: Clone,
    K: Eq + std::hash::Hash,
    F: Fn(&T) -> K,
{
    if active {
        return full.to_vec();
    }
    full.iter().filter(|item| present.contains(&key(item))).cloned().collect()
}

/// Restrict `full` to what is still reachable under `filter`
pub fn available_options(
    rows: &[FacetRow],
    full: &FilterOptions,
    filter: &MapDataFilter,
    active: Option<FacetKey>,
) -> FilterOptions {
    let filtered: Vec<&FacetRow> = rows.iter().filter(|r| r.matches(filter)).collect();
    let is_active = |key| active == Some(key);

    let contractors: HashSet<i32> = filtered.iter().map(|r| r.contractor_id).collect();
    let types: HashSet<i32> = filtered.iter().map(|r| r.contract_type_id).collect();
    let statuses: HashSet<i32> = filtered.iter().map(|r| r.contract_status_id).collect();
    let states: HashSet<String> = filtered.iter().map(|r| r.sponsoring_state.clone()).collect();
    let years: HashSet<i32> = filtered.iter().map(|r| r.year).collect();
    let cruises: HashSet<i32> = filtered.iter().filter_map(|r| r.cruise_id).collect();

    FilterOptions {
        contractors: narrow(&full.contractors, is_active(FacetKey::ContractorId), &contractors, |o| o.id),
        contract_types: narrow(&full.contract_types, is_active(FacetKey::ContractTypeId), &types, |o| o.id),
        contract_statuses: narrow(
            &full.contract_statuses,
            is_active(FacetKey::ContractStatusId),
            &statuses,
            |o| o.id,
        ),
        sponsoring_states: narrow(
            &full.sponsoring_states,
            is_active(FacetKey::SponsoringState),
            &states,
            |s| s.clone(),
        ),
        contractual_years: narrow(&full.contractual_years, is_active(FacetKey::Year), &years, |y| *y),
        cruises: narrow(&full.cruises, is_active(FacetKey::CruiseId), &cruises, |o| o.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::LookupOption;
    use chrono::NaiveDate;

    fn contractor(id: i32, type_id: i32, state: &str, year: i32) -> Contractor {
        Contractor {
            id,
            name: format!("Contractor {}", id),
            contract_type_id: type_id,
            contract_status_id: 1,
            sponsoring_state: state.into(),
            contractual_year: year,
            remarks: None,
        }
    }

    fn cruise(id: i32, contractor_id: i32) -> Cruise {
        Cruise {
            id,
            contractor_id,
            name: format!("Cruise {}", id),
            research_vessel: None,
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            end_date: None,
        }
    }

    fn option(id: i32) -> LookupOption {
        LookupOption { id, name: format!("Option {}", id) }
    }

    fn fixture() -> (Vec<FacetRow>, FilterOptions) {
        let contractors = vec![
            contractor(1, 1, "Poland", 2001),
            contractor(2, 1, "China", 2001),
            contractor(6, 2, "Russian Federation", 2012),
        ];
        let cruises = vec![cruise(2, 2), cruise(3, 2), cruise(7, 6)];

        let full = FilterOptions {
            contractors: vec![option(1), option(2), option(6)],
            contract_types: vec![option(1), option(2)],
            contract_statuses: vec![option(1)],
            sponsoring_states: vec!["China".into(), "Poland".into(), "Russian Federation".into()],
            contractual_years: vec![2001, 2012],
            cruises: vec![option(2), option(3), option(7)],
        };
        (facet_rows(&contractors, &cruises), full)
    }

    #[test]
    fn test_contractor_without_cruises_still_has_a_row() {
        let (rows, _) = fixture();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().any(|r| r.contractor_id == 1 && r.cruise_id.is_none()));
    }

    #[test]
    fn test_no_selection_keeps_everything() {
        let (rows, full) = fixture();
        let options = available_options(&rows, &full, &MapDataFilter::default(), None);
        assert_eq!(options, full);
    }

    #[test]
    fn test_selection_narrows_other_facets() {
        let (rows, full) = fixture();
        let filter = MapDataFilter { contract_type_id: Some(1), ..Default::default() };

        let options = available_options(&rows, &full, &filter, None);
        assert_eq!(options.contractors, vec![option(1), option(2)]);
        assert_eq!(options.sponsoring_states, vec!["China".to_string(), "Poland".to_string()]);
        assert_eq!(options.contractual_years, vec![2001]);
        assert_eq!(options.cruises, vec![option(2), option(3)]);
    }

    #[test]
    fn test_active_facet_is_not_self_excluded() {
        let (rows, full) = fixture();
        let filter = MapDataFilter { contract_type_id: Some(1), ..Default::default() };

        let options = available_options(&rows, &full, &filter, Some(FacetKey::ContractTypeId));
        assert_eq!(options.contract_types, full.contract_types);
        assert_eq!(options.contractors, vec![option(1), option(2)]);
    }

    #[test]
    fn test_unmatched_selection_empties_non_active_facets() {
        let (rows, full) = fixture();
        let filter = MapDataFilter { year: Some(1999), ..Default::default() };

        let options = available_options(&rows, &full, &filter, Some(FacetKey::Year));
        assert!(options.contractors.is_empty());
        assert!(options.cruises.is_empty());
        assert_eq!(options.contractual_years, full.contractual_years);
    }
}
