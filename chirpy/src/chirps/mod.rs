//! Chirps: short posts owned by a single user.
//!
//! Creating a chirp needs a valid access token; deleting one additionally
//! needs the token's subject to be the chirp's author.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{ChirpError, ChirpResult};
pub use manager::ChirpManager;
pub use models::{Chirp, ChirpId, MAX_CHIRP_LENGTH, SortOrder};
