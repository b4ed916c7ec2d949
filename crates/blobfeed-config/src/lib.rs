pub mod config;
pub mod error;
pub mod path;

#[cfg(test)]
pub mod test_utils;
