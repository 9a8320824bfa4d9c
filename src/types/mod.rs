// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Domain types shared by the pipeline, the reconciler and the node.

pub mod address;
pub mod hash;
pub mod operation;
pub mod record;
