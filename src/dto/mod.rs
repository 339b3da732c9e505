pub mod auth_dto;
pub mod quiz_dto;
pub mod result_dto;
pub mod session_dto;
