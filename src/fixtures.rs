//! Loading of the conversion task's input artifacts.
//!
//! The demo scenario converts a PL/SQL procedure into a runnable program.
//! The procedure source, table definitions, and CSV data live on disk; this
//! module loads them eagerly and fails fast, since a run without its inputs
//! is meaningless.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

/// The input artifacts of one conversion task.
#[derive(Clone, Debug)]
pub struct ScenarioFixtures {
    /// PL/SQL procedure to convert.
    pub procedure: String,
    /// DDL for the tables the procedure reads.
    pub tables: String,
    pub departments: String,
    pub employees: String,
    pub salaries: String,
}

/// Errors while loading fixtures. Always fatal.
#[derive(Debug, Error, Diagnostic)]
pub enum FixtureError {
    #[error("fixture file not found: {path}")]
    #[diagnostic(
        code(colloquy::fixtures::not_found),
        help("Point COLLOQUY_FIXTURES_DIR at a directory with the scenario files.")
    )]
    NotFound { path: PathBuf },

    #[error("failed to read fixture {path}")]
    #[diagnostic(code(colloquy::fixtures::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScenarioFixtures {
    /// Loads all fixture files from `dir`.
    ///
    /// # Errors
    ///
    /// Returns the first missing or unreadable file.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let dir = dir.as_ref();
        Ok(Self {
            procedure: read(dir.join("plsql_procedure.sql"))?,
            tables: read(dir.join("tables.sql"))?,
            departments: read(dir.join("departments.csv"))?,
            employees: read(dir.join("employees.csv"))?,
            salaries: read(dir.join("salaries.csv"))?,
        })
    }
}

fn read(path: PathBuf) -> Result<String, FixtureError> {
    if !path.exists() {
        return Err(FixtureError::NotFound { path });
    }
    std::fs::read_to_string(&path).map_err(|source| FixtureError::Io { path, source })
}
