//! Typed SAML 2.0 protocol objects.
//!
//! Messages share a [`MessageHeader`]; assertions carry their own
//! identification. [`ProtocolObject`] is the closed sum the marshaller
//! registry works with, and the URI vocabularies live in [`uris`].

mod assertion;
mod header;
mod name_id;
mod object;
mod request;
mod response;
mod statement;
mod status;
mod subject;
pub mod uris;

pub use assertion::*;
pub use header::*;
pub use name_id::*;
pub use object::*;
pub use request::*;
pub use response::*;
pub use statement::*;
pub use status::*;
pub use subject::*;
pub use uris::*;

/// Generates a fresh message ID (an XML `NCName`).
#[must_use]
pub fn new_id() -> String {
    format!("_id{}", uuid::Uuid::new_v4())
}
