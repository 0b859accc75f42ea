//! Types shared by every monitoring crate: identifiers, hub wire protocol,
//! token identity decoding, and constants.

pub mod constants;
pub mod error;
pub mod identity;
pub mod protocol;
pub mod types;
