pub mod configuration;
pub mod contacts_client;
pub mod domain;
pub mod routes;
pub mod startup;
pub mod telemetry;
