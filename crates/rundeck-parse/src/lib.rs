//! rundeck-parse - schema-driven parsing of Rundeck XML API responses
//!
//! The Rundeck HTTP API answers with deeply nested XML whose shape depends on
//! the operation that produced it. This crate turns those documents into
//! native value trees by interpreting declarative parse tables: each table
//! describes the tags a response may contain, which children are mandatory,
//! optional or repeated, and which mutually exclusive bodies a wrapper tag
//! can take.
//!
//! # Quick Start
//!
//! ```
//! # fn main() -> rundeck_parse::Result<()> {
//! let value = rundeck_parse::parse_response(
//!     r#"<result><jobs count="1">
//!         <job><id>3</id><name>ls</name><project>web</project></job>
//!     </jobs></result>"#,
//! )?;
//! let jobs = value
//!     .get("result")
//!     .and_then(|result| result.get("jobs"))
//!     .and_then(|jobs| jobs.get("count"))
//!     .and_then(|count| count.as_number());
//! assert_eq!(jobs, Some(1));
//! # Ok(())
//! # }
//! ```
//!
//! Custom shapes are parsed by building a [`Schema`] and passing it to
//! [`parse_with`], or by evaluating against an already-parsed
//! `roxmltree` node through [`engine::evaluate`].

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Attempt, Error, ErrorKind, Result};

pub mod value;
pub use value::{Array, Object, Value};

pub mod schema;
pub use schema::Schema;

pub mod engine;
pub use engine::evaluate;

pub mod catalog;
pub use catalog::{catalog, Catalog};

use tracing::trace;

/// Parse an XML response body against the catalog root table.
///
/// The root table is an alternative over every top-level shape the API
/// produces, so this is the right entry point for any response whose
/// operation is unknown to the caller.
pub fn parse_response(xml: &str) -> Result<Value> {
    parse_with(xml, &catalog().response)
}

/// Parse an XML response body against a specific table.
pub fn parse_with(xml: &str, schema: &Schema) -> Result<Value> {
    trace!(bytes = xml.len(), "evaluating response document");
    let document = roxmltree::Document::parse(xml)
        .map_err(|err| Error::new(ErrorKind::Document {
            message: err.to_string(),
        }))?;
    engine::evaluate(document.root_element(), schema)
}
