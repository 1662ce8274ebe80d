use super::model::{CollectionScan, RecordGroup};

/// Keep the groups in which at least one record's dependency string contains
/// `keyword` (case-sensitive substring). Everything else is dropped.
pub fn filter_groups(groups: Vec<RecordGroup>, keyword: &str) -> Vec<RecordGroup> {
    groups
        .into_iter()
        .filter(|group| group.iter().any(|r| r.dependency.contains(keyword)))
        .collect()
}

/// Apply [`filter_groups`] to a scan. An empty keyword leaves it untouched.
pub fn filter_scan(mut scan: CollectionScan, keyword: &str) -> CollectionScan {
    if !keyword.is_empty() {
        scan.groups = filter_groups(scan.groups, keyword);
    }
    scan
}
