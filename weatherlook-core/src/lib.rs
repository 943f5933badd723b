//! Core library for the `weatherlook` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - One HTTP client parameterized by per-provider profiles
//! - The lookup controller reconciling geolocation and search lookups
//! - Shared domain models (queries, observations, errors)
//!
//! It is used by `weatherlook-cli`, but can also be reused by other front ends.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod geolocation;
pub mod model;
pub mod provider;

pub use client::WeatherClient;
pub use config::{Config, ProviderConfig};
pub use controller::{LookupController, LookupOutcome, LookupSnapshot, LookupState};
pub use error::{ErrorKind, LookupError};
pub use geolocation::{FixedGeolocator, GeolocationError, Geolocator, IpGeolocator, NoGeolocator};
pub use model::{Coordinates, LocationQuery, WeatherObservation};
pub use provider::{ProviderId, ProviderProfile, WeatherProvider};
