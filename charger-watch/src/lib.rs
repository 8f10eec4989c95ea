//! Charging-station availability monitor.
//!
//! Given a location and a radius, ranks nearby charging stations, polls
//! their live charge-point status on a fixed interval, and sends a
//! notification when an occupied charge point becomes free.

pub mod catalog;
pub mod config;
pub mod detect;
pub mod domain;
pub mod geo;
pub mod geocode;
pub mod notify;
pub mod poll;
pub mod provider;
pub mod snapshot;
pub mod web;
