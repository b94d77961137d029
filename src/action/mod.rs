pub mod dispatch;
pub mod grammar;
