//! # tabula-filter
//!
//! Type-aware filter criteria for tabular data, serialized to and from a
//! PostgREST-style query string (`age=gte.18&status=in.(active)`).
//!
//! A [`Definition`] describes the columns. A [`Search`] holds the ordered
//! [`Filter`]s built against it: it is rebuilt from a bookmarked query string
//! and serialized back whenever a request is made. Fragments that cannot be
//! understood are dropped, and incomplete filters serialize to nothing.
//!
//! ```
//! use tabula_filter::{ColumnDef, ColumnType, Definition, Search};
//!
//! let definition = Definition::new()
//!     .with_column("age", ColumnDef::new(ColumnType::Int))
//!     .with_column(
//!         "status",
//!         ColumnDef::new(ColumnType::Enum {
//!             choices: vec!["active".into(), "closed".into()],
//!         }),
//!     );
//!
//! let search = Search::init(definition, "age=gte.18&status=in.(\"active\")&bogus=eq.1");
//! assert_eq!(search.len(), 2);
//! assert_eq!(search.dropped(), 1);
//! assert_eq!(search.to_query(), "age=gte.18&status=in.(active)");
//! ```

pub mod definition;
pub mod error;
pub mod filter;
pub mod kind;
pub mod operand;
pub mod operation;
pub mod parser;
pub mod search;
pub mod serializer;

pub use definition::{ColumnDef, ColumnType, Definition};
pub use error::{DefinitionError, FilterError};
pub use filter::Filter;
pub use kind::Kind;
pub use operand::{EnumOperand, Operand};
pub use operation::{Operation, Toggle};
pub use parser::parse_fragment;
pub use search::Search;
pub use serializer::{WireParam, to_query};
