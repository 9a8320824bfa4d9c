// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod address_tests;
pub mod fingerprint_tests;
