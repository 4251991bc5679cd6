use chrono::NaiveDateTime;

/// Metadata of one imported file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub file_id: i64,
    /// Vault directory, `/`-delimited on both ends.
    pub path: String,
    pub name: String,
    pub timestamp: NaiveDateTime,
    pub size: u64,
    pub hash: String,
}

impl FileRecord {
    /// Path and name joined, without the leading `/`.
    pub fn display_name(&self) -> String {
        format!("{}{}", self.path.trim_start_matches('/'), self.name)
    }
}

/// Integrity issue found by a vault check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub file_id: i64,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(path: &str, name: &str) -> FileRecord {
        FileRecord {
            file_id: 1,
            path: path.to_string(),
            name: name.to_string(),
            timestamp: NaiveDate::from_ymd_opt(2019, 4, 14)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            size: 0,
            hash: String::new(),
        }
    }

    #[test]
    fn display_name_drops_root_slash() {
        assert_eq!(record("/", "a.txt").display_name(), "a.txt");
        assert_eq!(record("/docs/q3/", "a.txt").display_name(), "docs/q3/a.txt");
    }
}
