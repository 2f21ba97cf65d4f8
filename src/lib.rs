//! Client for a remote cloud-cost analysis service.
//!
//! Uploads a CSV of cloud usage to `predict-cost` or `detect-waste`, holds
//! the outcome in a [`controller::Controller`], and renders the returned
//! JSON for the terminal or the local web dashboard.

pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod export;
pub mod history;
pub mod model;
pub mod render;
pub mod web;
