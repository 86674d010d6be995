// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route in this tier sits behind `jwt_auth_middleware`, which injects the
// caller's `Principal` into request extensions before any handler extractor
// runs.
//
// Route Prefix: /api/vehicles/:vehicleId/devices/:deviceId/configurations

pub mod configuration;

pub use configuration::*;
