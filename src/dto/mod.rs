//! DTOs de la API
//!
//! Formas de request/response expuestas por las rutas HTTP.

pub mod common;
pub mod mini_program_dto;
pub mod park_dto;
pub mod qrcode_dto;
pub mod vehicle_dto;

pub use common::ApiResponse;
