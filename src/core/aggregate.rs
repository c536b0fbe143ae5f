use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::Hash;

use crate::domain::model::OrderRecord;

pub fn count_where<F>(rows: &[&OrderRecord], predicate: F) -> usize
where
    F: Fn(&OrderRecord) -> bool,
{
    rows.iter().filter(|r| predicate(r)).count()
}

pub fn count_unique<'a, K, F>(rows: &[&'a OrderRecord], key: F) -> usize
where
    K: Eq + Hash,
    F: Fn(&'a OrderRecord) -> Option<K>,
{
    rows.iter()
        .filter_map(|r| key(*r))
        .collect::<std::collections::HashSet<_>>()
        .len()
}

pub fn unique_values<'a, F>(rows: &[&'a OrderRecord], key: F) -> Vec<String>
where
    F: Fn(&'a OrderRecord) -> Option<&'a str>,
{
    rows.iter()
        .filter_map(|r| key(*r))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// 缺值與 NaN 不計入
pub fn sum<F>(rows: &[&OrderRecord], value: F) -> f64
where
    F: Fn(&OrderRecord) -> Option<f64>,
{
    rows.iter()
        .filter_map(|r| value(r))
        .filter(|v| !v.is_nan())
        .sum()
}

/// 平均值；沒有任何有效值時回傳 `None`
pub fn mean<F>(rows: &[&OrderRecord], value: F) -> Option<f64>
where
    F: Fn(&OrderRecord) -> Option<f64>,
{
    mean_of(rows.iter().filter_map(|r| value(r)))
}

pub fn mean_of<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (total, count) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(total, count), v| (total + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(total / count as f64)
    }
}

/// 各值出現次數，次數多的在前，同次數依鍵排序
pub fn value_counts<'a, K, F>(rows: &[&'a OrderRecord], key: F) -> Vec<(K, usize)>
where
    K: Ord,
    F: Fn(&'a OrderRecord) -> Option<K>,
{
    sort_desc(group_count(rows, key, |_| true))
}

/// 出現次數最多的前 `n` 個值
pub fn nlargest_counts<'a, K, F>(rows: &[&'a OrderRecord], key: F, n: usize) -> Vec<(K, usize)>
where
    K: Ord,
    F: Fn(&'a OrderRecord) -> Option<K>,
{
    let mut counts = value_counts(rows, key);
    counts.truncate(n);
    counts
}

/// 每組中 `present` 為真的列數
pub fn group_count<'a, K, F, P>(rows: &[&'a OrderRecord], key: F, present: P) -> BTreeMap<K, usize>
where
    K: Ord,
    F: Fn(&'a OrderRecord) -> Option<K>,
    P: Fn(&'a OrderRecord) -> bool,
{
    let mut groups = BTreeMap::new();
    for row in rows.iter().copied() {
        if let Some(k) = key(row) {
            let counter = groups.entry(k).or_insert(0);
            if present(row) {
                *counter += 1;
            }
        }
    }
    groups
}

/// 每組中不重複值的數量
pub fn group_unique<'a, K, V, F, G>(rows: &[&'a OrderRecord], key: F, value: G) -> BTreeMap<K, usize>
where
    K: Ord,
    V: Eq + Hash,
    F: Fn(&'a OrderRecord) -> Option<K>,
    G: Fn(&'a OrderRecord) -> Option<V>,
{
    let mut groups: BTreeMap<K, std::collections::HashSet<V>> = BTreeMap::new();
    for row in rows.iter().copied() {
        if let Some(k) = key(row) {
            let set = groups.entry(k).or_default();
            if let Some(v) = value(row) {
                set.insert(v);
            }
        }
    }
    groups.into_iter().map(|(k, set)| (k, set.len())).collect()
}

pub fn group_sum<'a, K, F, G>(rows: &[&'a OrderRecord], key: F, value: G) -> BTreeMap<K, f64>
where
    K: Ord,
    F: Fn(&'a OrderRecord) -> Option<K>,
    G: Fn(&'a OrderRecord) -> Option<f64>,
{
    let mut groups = BTreeMap::new();
    for row in rows.iter().copied() {
        if let Some(k) = key(row) {
            let total = groups.entry(k).or_insert(0.0);
            if let Some(v) = value(row).filter(|v| !v.is_nan()) {
                *total += v;
            }
        }
    }
    groups
}

/// 每組平均；整組都沒有值的組別不會出現在結果中
pub fn group_mean<'a, K, F, G>(rows: &[&'a OrderRecord], key: F, value: G) -> BTreeMap<K, f64>
where
    K: Ord,
    F: Fn(&'a OrderRecord) -> Option<K>,
    G: Fn(&'a OrderRecord) -> Option<f64>,
{
    let mut groups: BTreeMap<K, (f64, usize)> = BTreeMap::new();
    for row in rows.iter().copied() {
        if let (Some(k), Some(v)) = (key(row), value(row)) {
            if v.is_nan() {
                continue;
            }
            let entry = groups.entry(k).or_insert((0.0, 0));
            entry.0 += v;
            entry.1 += 1;
        }
    }
    groups
        .into_iter()
        .map(|(k, (total, count))| (k, total / count as f64))
        .collect()
}

/// 每個鍵出現的列數 (不分組合併)，用於找出重複購買的客戶
pub fn occurrences<'a, K, F>(rows: &[&'a OrderRecord], key: F) -> HashMap<K, usize>
where
    K: Eq + Hash,
    F: Fn(&'a OrderRecord) -> Option<K>,
{
    let mut counts = HashMap::new();
    for row in rows.iter().copied() {
        if let Some(k) = key(row) {
            *counts.entry(k).or_insert(0) += 1;
        }
    }
    counts
}

/// 依數值由大到小排序；穩定排序，同值維持鍵的順序
pub fn sort_desc<K, V>(groups: BTreeMap<K, V>) -> Vec<(K, V)>
where
    K: Ord,
    V: PartialOrd,
{
    let mut sorted: Vec<(K, V)> = groups.into_iter().collect();
    sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    sorted
}

pub fn top_n<K, V>(groups: BTreeMap<K, V>, n: usize) -> Vec<(K, V)>
where
    K: Ord,
    V: PartialOrd,
{
    let mut sorted = sort_desc(groups);
    sorted.truncate(n);
    sorted
}

/// 數值最大的一組
pub fn idx_max<K, V>(groups: BTreeMap<K, V>) -> Option<(K, V)>
where
    K: Ord,
    V: PartialOrd,
{
    sort_desc(groups).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(state: &str, customer: &str, value: Option<f64>) -> OrderRecord {
        OrderRecord {
            customer_state: Some(state.to_string()),
            customer_unique_id: Some(customer.to_string()),
            payment_value: value,
            ..Default::default()
        }
    }

    fn fixture() -> Vec<OrderRecord> {
        vec![
            row("SP", "c1", Some(10.0)),
            row("SP", "c1", Some(30.0)),
            row("RJ", "c2", None),
            row("MG", "c3", Some(f64::NAN)),
            row("RJ", "c4", Some(5.0)),
            OrderRecord::default(),
        ]
    }

    #[test]
    fn test_value_counts_sorted_by_count_then_key() {
        let records = fixture();
        let rows: Vec<&OrderRecord> = records.iter().collect();
        let counts = value_counts(&rows, |r| r.customer_state.as_deref());
        assert_eq!(counts, vec![("RJ", 2), ("SP", 2), ("MG", 1)]);
    }

    #[test]
    fn test_mean_and_sum_skip_missing_values() {
        let records = fixture();
        let rows: Vec<&OrderRecord> = records.iter().collect();
        assert_eq!(sum(&rows, |r| r.payment_value), 45.0);
        assert_eq!(mean(&rows, |r| r.payment_value), Some(15.0));
        assert_eq!(mean(&rows[2..3], |r| r.payment_value), None);
        assert_eq!(mean_of(Vec::<f64>::new()), None);
    }

    #[test]
    fn test_group_mean_drops_groups_without_values() {
        let records = fixture();
        let rows: Vec<&OrderRecord> = records.iter().collect();
        let means = group_mean(&rows, |r| r.customer_state.as_deref(), |r| r.payment_value);
        assert_eq!(means.get("SP"), Some(&20.0));
        assert_eq!(means.get("RJ"), Some(&5.0));
        assert_eq!(means.get("MG"), None);
    }

    #[test]
    fn test_group_unique_and_count_unique() {
        let records = fixture();
        let rows: Vec<&OrderRecord> = records.iter().collect();
        let unique = group_unique(
            &rows,
            |r| r.customer_state.as_deref(),
            |r| r.customer_unique_id.as_deref(),
        );
        assert_eq!(unique.get("SP"), Some(&1));
        assert_eq!(unique.get("RJ"), Some(&2));
        assert_eq!(count_unique(&rows, |r| r.customer_unique_id.as_deref()), 4);
    }

    #[test]
    fn test_top_n_and_idx_max() {
        let mut groups = BTreeMap::new();
        groups.insert("a", 3.0);
        groups.insert("b", 7.0);
        groups.insert("c", 7.0);
        groups.insert("d", 1.0);

        assert_eq!(top_n(groups.clone(), 2), vec![("b", 7.0), ("c", 7.0)]);
        assert_eq!(idx_max(groups), Some(("b", 7.0)));
        assert_eq!(idx_max(BTreeMap::<&str, f64>::new()), None);
    }
}
