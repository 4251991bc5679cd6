use chrono::NaiveDateTime;
use std::path::Path;

use crate::error::Error;
use crate::util::date::format_timestamp;
use crate::vault::{FileRecord, FileVault, VaultError};
use crate::VERSION;

/// Runs commands against the embedded vault and renders the results the way
/// the vault server renders its responses.
pub struct LocalBackend {
    vault: FileVault,
}

impl LocalBackend {
    pub fn new(vault: FileVault) -> Self {
        Self { vault }
    }

    pub fn vault(&self) -> &FileVault {
        &self.vault
    }

    pub fn check(&self) -> Result<String, Error> {
        let problems = self.vault.check()?;
        if problems.is_empty() {
            return Ok("No errors.\n".to_string());
        }
        Ok(problems
            .iter()
            .map(|p| format!("{:10}: {}\n", p.file_id, p.message))
            .collect())
    }

    pub fn exist(&self, filename: &str) -> Result<String, Error> {
        let ids = self.vault.query_filename(filename)?;
        Ok(ids.iter().map(|id| format!("{:10}\n", id)).collect())
    }

    pub fn extract(&self, file_id: i64, filename: Option<&str>) -> Result<String, Error> {
        let written = self.vault.extract(file_id, filename)?;
        Ok(format!("{:10}: {}\n", file_id, written))
    }

    pub fn hash(&self, hash: &str) -> Result<String, Error> {
        let records = self.vault.list_hash(hash)?;
        Ok(render_listing(&records, FileRecord::display_name))
    }

    /// A duplicate import is not an error: it renders with `+` in place of `:`.
    pub fn import(
        &self,
        source: &Path,
        filename: &str,
        modified: NaiveDateTime,
    ) -> Result<String, Error> {
        match self.vault.import(source, filename, modified) {
            Ok(file_id) => Ok(format!("{:10}: {}\n", file_id, filename)),
            Err(VaultError::Exists { file_id }) => Ok(format!("{:10}+ {}\n", file_id, filename)),
            Err(e) => Err(e.into()),
        }
    }

    pub fn info(&self, file_id: Option<i64>) -> Result<String, Error> {
        let Some(file_id) = file_id else {
            return Ok(format!("Filevault Client {}\n", VERSION));
        };

        let record = self.vault.info(file_id)?;
        Ok(format!(
            "File ID: {}\nPath: {}\nName: {}\nDate: {}\nSize: {}\nHash: {}\n",
            record.file_id,
            record.path,
            record.name,
            format_timestamp(&record.timestamp),
            record.size,
            record.hash
        ))
    }

    pub fn list(&self, path: &str) -> Result<String, Error> {
        let records = self.vault.list_path(path)?;
        Ok(render_listing(&records, |r| r.name.clone()))
    }

    pub fn query(&self, terms: &str) -> Result<String, Error> {
        let records = self.vault.query(terms)?;
        Ok(render_listing(&records, FileRecord::display_name))
    }
}

fn render_listing(records: &[FileRecord], label: impl Fn(&FileRecord) -> String) -> String {
    records
        .iter()
        .map(|r| format!("{:10}: {}\n", r.file_id, label(r)))
        .collect()
}
