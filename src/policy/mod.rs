pub mod assignment;
pub mod balance;
pub mod review;
