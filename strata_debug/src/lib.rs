// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing and scene-tree dumps for strata diagnostics.
//!
//! This crate provides development-time tooling on top of
//! [`strata_core`]:
//!
//! - [`pretty::PrettyPrintSink`] — human-readable one-line-per-event
//!   trace output.
//! - [`dump::tree_dump`] / [`dump::tree_json`] — scene-tree snapshots
//!   as indented text or JSON.

pub mod dump;
pub mod pretty;
