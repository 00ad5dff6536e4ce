use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Ensure the parent directory of a path exists.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    Ok(())
}

/// Output file stem derived from the input document, `targets` as fallback.
pub fn output_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().trim().to_string())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "targets".to_string())
}

pub fn output_path(dir: &Path, stem: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{stem}{suffix}"))
}

/// Makes names unique ignoring ASCII case by appending `_2`, `_3`, ...
///
/// SQLite column names and worksheet names are case-insensitive.
pub fn unique_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    names
        .into_iter()
        .map(|name| {
            let mut candidate = name.to_string();
            let mut counter = 1;
            while !seen.insert(candidate.to_ascii_lowercase()) {
                counter += 1;
                candidate = format!("{name}_{counter}");
            }
            candidate
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stems_fall_back_to_targets() {
        assert_eq!(output_stem(Path::new("data/targets.json")), "targets");
        assert_eq!(output_stem(Path::new("data/custom.xml")), "custom");
        assert_eq!(output_stem(Path::new("")), "targets");
    }

    #[test]
    fn names_are_unique_ignoring_case() {
        assert_eq!(
            unique_names(["Value", "value", "VALUE", "value_2"]),
            vec!["Value", "value_2", "VALUE_3", "value_2_2"]
        );
    }
}
