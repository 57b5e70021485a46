//! `actions` crate — the catalogue of automated actions an Automated node
//! can select.
//!
//! The editor reads the catalogue through [`ActionCatalogue`] to fill in a
//! node's `action_id`, `action_label` and parameter names.  The engine never
//! consults it: it only sees what the editor already embedded in the node.

pub mod error;
pub mod traits;
pub mod builtin;
pub mod mock;

pub use error::CatalogueError;
pub use traits::{ActionCatalogue, AutomationAction};
pub use builtin::BuiltinCatalogue;
