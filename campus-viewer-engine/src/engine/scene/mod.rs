pub mod bounds;
pub mod grouping;
pub mod hierarchy;
pub mod lighting;
