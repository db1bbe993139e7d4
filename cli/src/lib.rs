//! # tabula
//!
//! Command-line inspector for tabular filter queries. Loads a JSON schema
//! document and runs query strings through `tabula-filter`: parse them into
//! filters, normalize them, serialize filter lists, or list the filterable
//! columns.

pub mod app;
pub mod core;
pub mod utils;
