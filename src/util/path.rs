use path_clean::clean;
use std::path::{Component, Path};

// Splits a display name into the vault directory (always `/`-delimited on both
// ends) and the bare file name.
pub fn split_display_name(display_name: &str) -> (String, String) {
    let mut parts = normal_parts(display_name);
    let name = parts.pop().unwrap_or_default();
    (join_dir(&parts), name)
}

// `docs//2019/./` -> `/docs/2019/`
pub fn normalize_dir(path: &str) -> String {
    join_dir(&normal_parts(path))
}

fn normal_parts(path: &str) -> Vec<String> {
    clean(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

fn join_dir(parts: &[String]) -> String {
    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", parts.join("/"))
    }
}

pub fn get_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_names_live_in_root() {
        assert_eq!(
            split_display_name("report.txt"),
            ("/".to_string(), "report.txt".to_string())
        );
        assert_eq!(
            split_display_name("./report.txt"),
            ("/".to_string(), "report.txt".to_string())
        );
    }

    #[test]
    fn nested_names_are_normalised() {
        assert_eq!(
            split_display_name("/docs/./2019//q2/../q3/report.txt"),
            ("/docs/2019/q3/".to_string(), "report.txt".to_string())
        );
    }

    #[test]
    fn directories_keep_both_slashes() {
        assert_eq!(normalize_dir("/"), "/");
        assert_eq!(normalize_dir("docs//2019/./"), "/docs/2019/");
    }

    #[test]
    fn file_name_of_path() {
        assert_eq!(get_file_name(Path::new("/tmp/out/data.bin")), "data.bin");
        assert_eq!(get_file_name(Path::new("/")), "");
    }
}
