pub mod earnings;
pub mod flattened;

pub use earnings::EarningsRecord;
pub use flattened::FlattenedRecord;
