#[cfg(test)]
pub use fixtures::*;
