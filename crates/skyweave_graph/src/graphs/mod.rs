// SPDX-License-Identifier: MIT OR Apache-2.0
//! Specialized graph types built on the core framework.

pub mod show;
