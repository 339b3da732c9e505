pub mod quiz;
pub mod quiz_record;
pub mod result;
pub mod session;
pub mod user;
