//! Client state that survives restarts: OAuth2 token and pagination cursor.

pub mod cursor;
pub mod store;
pub mod token;
