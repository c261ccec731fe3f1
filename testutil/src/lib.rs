// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Shared test-only data and helpers for the SSCP workspace.

#![deny(missing_docs)]

pub mod data;
