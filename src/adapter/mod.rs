//! Format adapter layer
//!
//! Each source family gets an adapter that turns its parsed input into a
//! format-independent [`PlaySource`]. The [`InputRouter`] picks the adapter
//! by input kind.

pub mod plain_text;
mod router;
pub mod tei;
mod traits;

pub use plain_text::{PlainTextAdapter, PLAIN_TEXT_KIND};
pub use router::InputRouter;
pub use tei::{TeiAdapter, TeiElement, TEI_KIND};
pub use traits::{AdapterInput, FormatAdapter, PlaySource};
