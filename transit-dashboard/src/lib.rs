//! Transit dashboard state engine.
//!
//! Keeps a station map, a single station selection with its live departures,
//! and ambient weather and air quality consistent while all four resources
//! load independently and out of order.

pub mod config;
pub mod dashboard;
pub mod domain;
pub mod logging;
pub mod map;
pub mod selection;
pub mod slot;
pub mod source;
pub mod view;
pub mod web;
