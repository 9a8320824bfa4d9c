// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod api;
pub mod config;
pub mod controller;
pub mod errors;
pub mod ledger;
pub mod notify;
pub mod server;
pub mod telemetry;
