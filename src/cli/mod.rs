// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Terminal output for the jointspace CLI

pub mod reporter;

pub use reporter::Reporter;
