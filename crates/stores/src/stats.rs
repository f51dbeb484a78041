//! Display statistics derived from the current record list.
//!
//! Statistics are a pure function of the list and are recomputed in full
//! whenever it changes, never patched incrementally, so they cannot
//! drift from the records they summarize.

use std::collections::BTreeMap;

use chrono::Utc;
use normalize::string_key;
use serde_json::Value;

pub type Stats = BTreeMap<String, u64>;

#[derive(Debug, Clone, Copy)]
pub enum Predicate {
    /// Counts every record.
    Total,
    /// Field compared as a string, tolerating numeric/boolean values.
    FieldEquals(&'static str, &'static str),
    /// Date or datetime field falling on the current day (tournées'
    /// "aujourd'hui" card).
    FieldIsToday(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct StatCategory {
    pub name: &'static str,
    pub predicate: Predicate,
}

impl StatCategory {
    pub const fn total(name: &'static str) -> Self {
        Self {
            name,
            predicate: Predicate::Total,
        }
    }

    pub const fn equals(name: &'static str, field: &'static str, value: &'static str) -> Self {
        Self {
            name,
            predicate: Predicate::FieldEquals(field, value),
        }
    }

    pub const fn today(name: &'static str, field: &'static str) -> Self {
        Self {
            name,
            predicate: Predicate::FieldIsToday(field),
        }
    }
}

/// Count records per category. An empty list yields every category
/// mapped to zero.
pub fn compute_stats(records: &[Value], categories: &[StatCategory]) -> Stats {
    let today = Utc::now().format("%Y-%m-%d").to_string();
    let mut stats = Stats::new();
    for category in categories {
        let count = records
            .iter()
            .filter(|r| matches(r, category.predicate, &today))
            .count() as u64;
        stats.insert(category.name.to_string(), count);
    }
    stats
}

fn matches(record: &Value, predicate: Predicate, today: &str) -> bool {
    match predicate {
        Predicate::Total => true,
        Predicate::FieldEquals(field, expected) => record
            .get(field)
            .and_then(string_key)
            .is_some_and(|v| v == expected),
        Predicate::FieldIsToday(field) => record
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|v| v.starts_with(today)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const CATEGORIES: &[StatCategory] = &[
        StatCategory::total("total"),
        StatCategory::equals("disponibles", "etat", "Disponible"),
        StatCategory::equals("enMission", "etat", "En mission"),
    ];

    #[test]
    fn empty_list_yields_all_zeros() {
        let stats = compute_stats(&[], CATEGORIES);
        assert_eq!(stats.len(), CATEGORIES.len());
        assert!(stats.values().all(|&c| c == 0));
    }

    #[test]
    fn category_counts_sum_to_list_length() {
        let records = vec![
            json!({ "etat": "Disponible" }),
            json!({ "etat": "Disponible" }),
            json!({ "etat": "En mission" }),
        ];
        let stats = compute_stats(&records, CATEGORIES);
        assert_eq!(stats["total"], 3);
        assert_eq!(stats["disponibles"] + stats["enMission"], 3);
    }

    #[test]
    fn string_comparison_tolerates_booleans() {
        let categories = &[StatCategory::equals("payees", "estPayee", "true")];
        let records = vec![json!({ "estPayee": true }), json!({ "estPayee": false })];
        assert_eq!(compute_stats(&records, categories)["payees"], 1);
    }

    #[test]
    fn today_predicate_matches_date_and_datetime() {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        let records = vec![
            json!({ "dateTournee": today }),
            json!({ "dateTournee": format!("{today}T08:30:00Z") }),
            json!({ "dateTournee": "2020-01-01" }),
        ];
        let categories = &[StatCategory::today("aujourdHui", "dateTournee")];
        assert_eq!(compute_stats(&records, categories)["aujourdHui"], 2);
    }
}
