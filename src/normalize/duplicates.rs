use std::collections::HashSet;

/// Append `suffix` to every column after the first `pivot` whose name was
/// already seen (the pivot and everything before it count as seen).
///
/// Columns up to the pivot and first sightings after it keep their name.
/// Without a pivot the names come back unchanged.
pub fn rename_after_column(columns: &[String], pivot: &str, suffix: &str) -> Vec<String> {
    let Some(pivot_idx) = columns.iter().position(|c| c == pivot) else {
        return columns.to_vec();
    };

    let mut seen: HashSet<&str> = columns[..=pivot_idx].iter().map(String::as_str).collect();
    let mut renamed = columns.to_vec();

    for (i, col) in columns.iter().enumerate().skip(pivot_idx + 1) {
        if seen.contains(col.as_str()) {
            renamed[i] = format!("{col}{suffix}");
        } else {
            seen.insert(col.as_str());
        }
    }

    renamed
}
