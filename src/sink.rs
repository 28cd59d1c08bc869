//! Output artifacts
//!
//! Ingredients go to `{outdir}/dataset.ndjson`, `{outdir}/dataset.sqlite`, or
//! both, depending on the configured formats. Both artifacts are rebuilt from
//! scratch on every run.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::{Config, OutputFormat};
use crate::db::migrations::{get_schema_version, run_migrations};
use crate::db::Database;
use crate::error::{PipelineError, PipelineResult};
use crate::models::Ingredient;

/// Newline-delimited JSON writer
pub struct NdjsonSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl NdjsonSink {
    /// Create (or truncate) the output file
    pub fn create(path: &Path) -> PipelineResult<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(File::create(path)?),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&mut self, ingredient: &Ingredient) -> PipelineResult<()> {
        let line = ingredient.to_json_line().map_err(io::Error::from)?;
        self.writer.write_all(line.as_bytes())?;
        Ok(())
    }

    pub fn flush(&mut self) -> PipelineResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// The set of enabled outputs for one run
pub struct Sinks {
    ndjson: Option<NdjsonSink>,
    database: Option<Database>,
}

impl Sinks {
    /// Reset and open every configured output
    pub fn open(config: &Config) -> PipelineResult<Self> {
        fs::create_dir_all(&config.outdir)?;

        let ndjson = if config.wants(OutputFormat::Ndjson) {
            let sink = NdjsonSink::create(&config.ndjson_path())?;
            tracing::info!(path = %sink.path().display(), "writing NDJSON output");
            Some(sink)
        } else {
            None
        };

        let database = if config.wants(OutputFormat::Sqlite) {
            let path = config.sqlite_path();
            remove_database_files(&path)?;
            let db = Database::new(&path)?;
            let version = db.with_conn(|conn| {
                run_migrations(conn)?;
                get_schema_version(conn)
            })?;
            tracing::info!(path = %path.display(), schema_version = version, "writing SQLite output");
            Some(db)
        } else {
            None
        };

        Ok(Self { ndjson, database })
    }

    pub fn database(&self) -> Option<&Database> {
        self.database.as_ref()
    }

    /// Drain `records` into every output, returning the number written.
    ///
    /// SQLite inserts for one call share a transaction, so a failing stream
    /// leaves the database without any of its rows.
    pub fn write_all<I>(&mut self, records: I) -> PipelineResult<usize>
    where
        I: IntoIterator<Item = PipelineResult<Ingredient>>,
    {
        let Sinks { ndjson, database } = self;

        let written = match database {
            Some(db) => db.with_conn_mut(|conn| {
                let tx = conn.transaction()?;
                let mut written = 0;
                for record in records {
                    let ingredient = record?;
                    if let Some(sink) = ndjson.as_mut() {
                        sink.write(&ingredient)?;
                    }
                    ingredient.insert(&tx)?;
                    written += 1;
                }
                tx.commit()?;
                Ok::<_, PipelineError>(written)
            })?,
            None => {
                let mut written = 0;
                for record in records {
                    let ingredient = record?;
                    if let Some(sink) = ndjson.as_mut() {
                        sink.write(&ingredient)?;
                    }
                    written += 1;
                }
                written
            }
        };

        if let Some(sink) = ndjson.as_mut() {
            sink.flush()?;
        }
        Ok(written)
    }
}

fn remove_database_files(path: &Path) -> io::Result<()> {
    for suffix in ["", "-wal", "-shm"] {
        let mut name = path.as_os_str().to_owned();
        name.push(suffix);
        match fs::remove_file(PathBuf::from(name)) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
