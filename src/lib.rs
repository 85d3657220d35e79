pub mod configuration;
pub mod decoder;
pub mod domain;
pub mod email_client;
pub mod greenlight;
pub mod routes;
pub mod slack;
pub mod startup;
pub mod telemetry;
pub mod utils;
pub mod welcome_email;
