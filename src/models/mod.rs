//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean al schema PostgreSQL:
//! los tres tipos de vehículo, parques, renovaciones, códigos QR y los datos del
//! registro de vehículos de terceros.

pub mod external_vehicle;
pub mod internal_vehicle;
pub mod non_road;
pub mod park;
pub mod qrcode;
pub mod registry;
pub mod vehicle;

pub use external_vehicle::{ExternalVehicle, ExternalVehicleDetails};
pub use internal_vehicle::{InternalVehicle, InternalVehicleDetails};
pub use non_road::{NonRoadMachinery, NonRoadMachineryDetails};
pub use park::{NewPark, Park, ParkFilters, ParkUpdate, RenewalFilters, RenewalRecord, RenewalWithPark};
pub use qrcode::{QrCode, QrCodeChanges};
pub use registry::ThirdPartyVehicleData;
pub use vehicle::{
    AuditStatus, DispatchStatus, PlateColor, RoadVehicleRegistration, VehicleFilters, VehicleKind,
    VehicleRecord,
};
