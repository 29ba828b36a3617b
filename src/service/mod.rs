pub mod export;
pub mod fetch;
pub mod finance;
pub mod flatten;
