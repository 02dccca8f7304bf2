//! omego-db - Database collaborators for omego
//!
//! This crate provides the traits the schema manager drives (`SchemaDatabase`,
//! `DatabaseDump`, `InitScriptGenerator`), a logged subprocess runner, and
//! their implementations on top of `psql`, `pg_dump` and the OMERO CLI.

pub mod error;
pub mod external;
pub mod omero_cli;
pub mod psql;
pub mod traits;

pub use error::{DbError, DbResult};
pub use external::{CommandOutput, ExternalCommand};
pub use omero_cli::OmeroCli;
pub use psql::PsqlBackend;
pub use traits::{DatabaseDump, InitScriptGenerator, SchemaDatabase};
