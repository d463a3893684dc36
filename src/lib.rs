// Library exports for PixelHub
// The binary and integration tests both drive the client through these modules

pub mod account;
pub mod auth;
pub mod commands;
pub mod config;
pub mod contact;
pub mod donation;
pub mod error;
pub mod gateway;
pub mod models;
pub mod processing;
pub mod repository;
pub mod routes;
pub mod state;
pub mod threads;
pub mod validation;
