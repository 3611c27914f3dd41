//! # Engine Module
//!
//! Typed parameters and the element-wise physics transforms.
//!
//! ## Architecture
//!
//! - **Setup Records** ([`setup`]) - Loading and eager validation of the scene record
//! - **Parameters** ([`config`]) - Material, beam, G-value and tally-grid specifications
//! - **Dose** ([`dose`]) - Deposited energy (keV) to absorbed dose (Gy)
//! - **Temperature** ([`temperature`]) - Adiabatic temperature rise from dose
//! - **Radiolysis** ([`radiolysis`]) - Species concentration and production rate from energy
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events for front ends
//! - **Error Handling** ([`error`]) - The error type returned by every workflow
//!
//! Every transform builds a new grid that shares the geometry of its input; inputs are
//! never modified.

pub mod config;
pub mod dose;
pub mod error;
pub mod progress;
pub mod radiolysis;
pub mod setup;
pub mod temperature;
