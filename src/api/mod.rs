pub mod leave;
pub mod report;
pub mod user;
