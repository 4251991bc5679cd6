use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::config::settings::LocalSettings;
use crate::util::date::{format_timestamp, parse_timestamp};
use crate::util::fs::{commit, staging_file};
use crate::util::path::{normalize_dir, split_display_name};
use crate::vault::models::{FileRecord, Problem};
use crate::vault::VaultError;

const RECORD_COLUMNS: &str = "file_id, path, name, timestamp, size, hash";

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS files (file_id INTEGER PRIMARY KEY \
                      AUTOINCREMENT,path TEXT NOT NULL,name TEXT NOT NULL,timestamp TEXT NOT \
                      NULL,size INTEGER NOT NULL,hash TEXT NOT NULL);CREATE INDEX IF NOT EXISTS \
                      idx_files_hash ON files(hash);CREATE INDEX IF NOT EXISTS idx_files_path_name \
                      ON files(path, name);";

pub struct FileVault {
    connection: Connection,
    root: PathBuf,
}

impl FileVault {
    /// Opens (and if needed initialises) the vault described by the local settings.
    pub fn open(settings: &LocalSettings) -> Result<Self, VaultError> {
        match settings.db_type.to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => {}
            other => return Err(VaultError::UnsupportedDatabase(other.to_string())),
        }

        let connection = Connection::open(&settings.db_connect)?;
        connection.execute_batch(SCHEMA)?;
        std::fs::create_dir_all(&settings.root_path)?;

        Ok(Self {
            connection,
            root: settings.root_path.clone(),
        })
    }

    fn blob_path(&self, hash: &str) -> PathBuf {
        let prefix = hash.get(..2).unwrap_or(hash);
        self.root.join(prefix).join(hash)
    }

    /// Stores `source` under `display_name`. Importing the same content under
    /// the same name again yields [`VaultError::Exists`] carrying the original id.
    pub fn import(
        &self,
        source: &Path,
        display_name: &str,
        modified: NaiveDateTime,
    ) -> Result<i64, VaultError> {
        let (path, name) = split_display_name(display_name);
        if name.is_empty() {
            return Err(VaultError::InvalidName(display_name.to_string()));
        }

        let (hash, size) = hash_file(source)?;

        let existing: Option<i64> = self
            .connection
            .query_row(
                "SELECT file_id FROM files WHERE hash = ?1 AND path = ?2 AND name = ?3 \
                 ORDER BY file_id LIMIT 1",
                params![hash, path, name],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(file_id) = existing {
            return Err(VaultError::Exists { file_id });
        }

        self.store_blob(source, &hash)?;

        self.connection.execute(
            "INSERT INTO files (path, name, timestamp, size, hash) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                path,
                name,
                format_timestamp(&modified),
                i64::try_from(size).unwrap_or(i64::MAX),
                hash,
            ],
        )?;
        let file_id = self.connection.last_insert_rowid();
        log::info!("imported {}{} as {} ({})", path, name, file_id, hash);
        Ok(file_id)
    }

    // blobs are written once; identical content shares the same file
    fn store_blob(&self, source: &Path, hash: &str) -> Result<(), VaultError> {
        let blob = self.blob_path(hash);
        if blob.is_file() {
            return Ok(());
        }
        if let Some(dir) = blob.parent() {
            std::fs::create_dir_all(dir)?;
        }
        copy_via_staging(source, &blob)?;
        Ok(())
    }

    /// Writes the content of `file_id` to `filename`, or to the recorded name
    /// when none is given. Returns the name written.
    pub fn extract(&self, file_id: i64, filename: Option<&str>) -> Result<String, VaultError> {
        let record = self.info(file_id)?;
        let blob = self.blob_path(&record.hash);
        if !blob.is_file() {
            return Err(VaultError::MissingContent {
                file_id,
                hash: record.hash,
            });
        }

        let target = filename.unwrap_or(&record.name).to_string();
        copy_via_staging(&blob, Path::new(&target))?;
        Ok(target)
    }

    pub fn info(&self, file_id: i64) -> Result<FileRecord, VaultError> {
        let sql = format!("SELECT {} FROM files WHERE file_id = ?1", RECORD_COLUMNS);
        self.connection
            .query_row(&sql, params![file_id], record_from_row)
            .optional()?
            .ok_or(VaultError::NotFound(file_id))
    }

    /// Ids of files with the given name. A name containing `/` must match the
    /// full vault path as well.
    pub fn query_filename(&self, filename: &str) -> Result<Vec<i64>, VaultError> {
        let records = if filename.contains('/') {
            let (path, name) = split_display_name(filename);
            self.select("path = ?1 AND name = ?2", &[path, name])?
        } else {
            self.select("name = ?1", &[filename.to_string()])?
        };
        Ok(records.into_iter().map(|r| r.file_id).collect())
    }

    pub fn list_hash(&self, hash: &str) -> Result<Vec<FileRecord>, VaultError> {
        self.select("hash = ?1", &[hash.trim().to_ascii_lowercase()])
    }

    pub fn list_path(&self, path: &str) -> Result<Vec<FileRecord>, VaultError> {
        self.select("path = ?1", &[normalize_dir(path)])
    }

    /// Files whose path and name contain every whitespace-separated term,
    /// ignoring ASCII case.
    pub fn query(&self, terms: &str) -> Result<Vec<FileRecord>, VaultError> {
        let patterns: Vec<String> = terms
            .split_whitespace()
            .map(|term| format!("%{}%", escape_like(term)))
            .collect();
        if patterns.is_empty() {
            return Ok(Vec::new());
        }

        let filter = (1..=patterns.len())
            .map(|i| format!("(path || name) LIKE ?{} ESCAPE '\\'", i))
            .collect::<Vec<_>>()
            .join(" AND ");
        self.select(&filter, &patterns)
    }

    /// Verifies every record against its stored content.
    pub fn check(&self) -> Result<Vec<Problem>, VaultError> {
        let mut problems = Vec::new();

        for record in self.select("1 = 1", &[])? {
            let blob = self.blob_path(&record.hash);
            if !blob.is_file() {
                problems.push(Problem {
                    file_id: record.file_id,
                    message: format!("Missing content {}", record.hash),
                });
                continue;
            }

            let (hash, size) = hash_file(&blob)?;
            if size != record.size {
                problems.push(Problem {
                    file_id: record.file_id,
                    message: format!("Size mismatch: recorded {}, stored {}", record.size, size),
                });
            }
            if hash != record.hash {
                problems.push(Problem {
                    file_id: record.file_id,
                    message: format!("Hash mismatch: recorded {}, stored {}", record.hash, hash),
                });
            }
        }

        log::debug!("vault check found {} problem(s)", problems.len());
        Ok(problems)
    }

    fn select(&self, filter: &str, values: &[String]) -> Result<Vec<FileRecord>, VaultError> {
        let sql = format!(
            "SELECT {} FROM files WHERE {} ORDER BY file_id",
            RECORD_COLUMNS, filter
        );
        let mut stmt = self.connection.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), record_from_row)?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<FileRecord> {
    let timestamp: String = row.get(3)?;
    let timestamp = parse_timestamp(&timestamp)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;
    let size: i64 = row.get(4)?;

    Ok(FileRecord {
        file_id: row.get(0)?,
        path: row.get(1)?,
        name: row.get(2)?,
        timestamp,
        size: u64::try_from(size).unwrap_or(0),
        hash: row.get(5)?,
    })
}

/// SHA-256 (lowercase hex) and length of a file.
pub fn hash_file(path: &Path) -> io::Result<(String, u64)> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];
    let mut size: u64 = 0;

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
        size += read as u64;
    }

    Ok((hex::encode(hasher.finalize()), size))
}

fn copy_via_staging(source: &Path, destination: &Path) -> io::Result<()> {
    let mut input = File::open(source)?;
    let mut staged = staging_file(destination)?;
    io::copy(&mut input, &mut staged)?;
    commit(staged, destination)
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        vault: FileVault,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let settings = LocalSettings {
            db_type: "sqlite".to_string(),
            db_connect: dir.path().join("vault.db").display().to_string(),
            root_path: dir.path().join("files"),
        };
        let vault = FileVault::open(&settings).unwrap();
        Fixture { dir, vault }
    }

    fn when() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 6, 13)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    impl Fixture {
        fn source(&self, name: &str, content: &[u8]) -> PathBuf {
            let path = self.dir.path().join(name);
            std::fs::write(&path, content).unwrap();
            path
        }
    }

    #[test]
    fn rejects_unknown_database_type() {
        let dir = tempfile::tempdir().unwrap();
        let settings = LocalSettings {
            db_type: "mysql".to_string(),
            db_connect: "user:pass@/vault".to_string(),
            root_path: dir.path().to_path_buf(),
        };
        assert!(matches!(
            FileVault::open(&settings),
            Err(VaultError::UnsupportedDatabase(t)) if t == "mysql"
        ));
    }

    #[test]
    fn import_records_metadata_and_stores_content() {
        let fx = fixture();
        let source = fx.source("report.txt", b"quarterly numbers");

        let id = fx.vault.import(&source, "docs/report.txt", when()).unwrap();
        let record = fx.vault.info(id).unwrap();

        assert_eq!(record.path, "/docs/");
        assert_eq!(record.name, "report.txt");
        assert_eq!(record.size, 17);
        assert_eq!(record.timestamp, when());
        assert_eq!(record.hash, hash_file(&source).unwrap().0);
        assert!(fx.vault.blob_path(&record.hash).is_file());
    }

    #[test]
    fn duplicate_import_returns_existing_id() {
        let fx = fixture();
        let source = fx.source("report.txt", b"same bytes");

        let first = fx.vault.import(&source, "report.txt", when()).unwrap();
        match fx.vault.import(&source, "report.txt", when()) {
            Err(VaultError::Exists { file_id }) => assert_eq!(file_id, first),
            other => panic!("expected Exists, got {:?}", other),
        }

        // same content under another name is a new record sharing the blob
        let other = fx.vault.import(&source, "copy.txt", when()).unwrap();
        assert_ne!(other, first);
        assert_eq!(fx.vault.list_hash(&fx.vault.info(first).unwrap().hash).unwrap().len(), 2);
    }

    #[test]
    fn import_rejects_names_without_file_part() {
        let fx = fixture();
        let source = fx.source("a.txt", b"a");
        assert!(matches!(
            fx.vault.import(&source, "docs/..", when()),
            Err(VaultError::InvalidName(_))
        ));
    }

    #[test]
    fn extract_round_trips_content() {
        let fx = fixture();
        let content: Vec<u8> = (0..=255u8).cycle().take(200_000).collect();
        let source = fx.source("blob.bin", &content);
        let id = fx.vault.import(&source, "blob.bin", when()).unwrap();

        let target = fx.dir.path().join("out.bin");
        let written = fx
            .vault
            .extract(id, Some(target.to_str().unwrap()))
            .unwrap();

        assert_eq!(written, target.to_str().unwrap());
        assert_eq!(std::fs::read(&target).unwrap(), content);
        let leftovers = std::fs::read_dir(fx.dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .filter(|name| name.to_string_lossy().ends_with(".part"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn extract_unknown_id_creates_nothing() {
        let fx = fixture();
        let target = fx.dir.path().join("missing.bin");

        assert!(matches!(
            fx.vault.extract(42, Some(target.to_str().unwrap())),
            Err(VaultError::NotFound(42))
        ));
        assert!(!target.exists());
    }

    #[test]
    fn extract_keeps_user_files_next_to_target() {
        let fx = fixture();
        let source = fx.source("notes.txt", b"fresh notes");
        let id = fx.vault.import(&source, "notes.txt", when()).unwrap();

        let target = fx.dir.path().join("out.txt");
        let neighbour = fx.dir.path().join(".out.txt.part");
        std::fs::write(&neighbour, b"keep me").unwrap();

        fx.vault.extract(id, Some(target.to_str().unwrap())).unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"fresh notes");
        assert_eq!(std::fs::read(&neighbour).unwrap(), b"keep me");
    }

    #[test]
    fn lookups_by_name_path_hash_and_terms() {
        let fx = fixture();
        let a = fx.source("a", b"alpha");
        let b = fx.source("b", b"beta");

        let annual = fx.vault.import(&a, "reports/Annual_Report.pdf", when()).unwrap();
        let notes = fx.vault.import(&b, "reports/notes.txt", when()).unwrap();
        let root = fx.vault.import(&b, "notes.txt", when()).unwrap();

        assert_eq!(fx.vault.query_filename("notes.txt").unwrap(), vec![notes, root]);
        assert_eq!(fx.vault.query_filename("reports/notes.txt").unwrap(), vec![notes]);
        assert!(fx.vault.query_filename("nothing.txt").unwrap().is_empty());

        let listed: Vec<i64> = fx
            .vault
            .list_path("/reports/")
            .unwrap()
            .iter()
            .map(|r| r.file_id)
            .collect();
        assert_eq!(listed, vec![annual, notes]);

        let beta_hash = hash_file(&b).unwrap().0;
        assert_eq!(fx.vault.list_hash(&beta_hash.to_uppercase()).unwrap().len(), 2);

        let found: Vec<i64> = fx
            .vault
            .query("annual REPORT ")
            .unwrap()
            .iter()
            .map(|r| r.file_id)
            .collect();
        assert_eq!(found, vec![annual]);

        // `_` is literal, not a wildcard
        assert_eq!(fx.vault.query("l_r").unwrap().len(), 1);
        assert!(fx.vault.query("s_t").unwrap().is_empty());
        assert!(fx.vault.query("   ").unwrap().is_empty());
    }

    #[test]
    fn check_reports_missing_and_corrupted_content() {
        let fx = fixture();
        assert!(fx.vault.check().unwrap().is_empty());

        let ok = fx.source("ok", b"fine");
        let bad = fx.source("bad", b"will be corrupted");
        let gone = fx.source("gone", b"will be deleted");
        fx.vault.import(&ok, "ok.txt", when()).unwrap();
        let bad_id = fx.vault.import(&bad, "bad.txt", when()).unwrap();
        let gone_id = fx.vault.import(&gone, "gone.txt", when()).unwrap();

        let bad_record = fx.vault.info(bad_id).unwrap();
        std::fs::write(fx.vault.blob_path(&bad_record.hash), b"tampered").unwrap();
        let gone_record = fx.vault.info(gone_id).unwrap();
        std::fs::remove_file(fx.vault.blob_path(&gone_record.hash)).unwrap();

        let problems = fx.vault.check().unwrap();
        let ids: Vec<i64> = problems.iter().map(|p| p.file_id).collect();
        assert_eq!(ids, vec![bad_id, bad_id, gone_id]);
        assert!(problems[0].message.starts_with("Size mismatch"));
        assert!(problems[1].message.starts_with("Hash mismatch"));
        assert!(problems[2].message.starts_with("Missing content"));
    }
}
