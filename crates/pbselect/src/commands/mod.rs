pub mod compile;
pub mod helpers;
pub mod records;
pub mod shape;
pub mod usage;
