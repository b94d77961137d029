pub mod meter;
pub mod palette;
pub mod scheduler;
