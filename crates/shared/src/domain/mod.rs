pub mod identity;
pub mod requests;
pub mod responses;
