#[cfg(test)]
pub mod common;

mod readings_fetch;
