//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación: el flujo de
//! cumplimiento de vehículos, el ciclo de vida de parques, los códigos QR,
//! los flujos del mini-programa y la generación de credenciales.

pub mod compliance_service;
pub mod credentials;
pub mod mini_program_service;
pub mod park_service;
pub mod qrcode_service;

pub use compliance_service::{ComplianceService, VehicleWorkflow};
pub use mini_program_service::MiniProgramService;
pub use park_service::ParkService;
pub use qrcode_service::QrCodeService;
