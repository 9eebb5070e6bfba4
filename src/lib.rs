//! Registro de cumplimiento de vehículos en parques industriales
//!
//! Alta, auditoría y despacho de vehículos externos, internos y maquinaria
//! no de carretera; ciclo de vida de parques con ventana de validez y
//! renovaciones; enriquecimiento desde el registro de vehículos de terceros.

pub mod clients;
pub mod config;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::build_router;
pub use state::AppState;
