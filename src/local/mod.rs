// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Local filesystem state: version tracking, path mapping and certificate files.

pub mod materializer;
pub mod paths;
pub mod versions;

pub use materializer::LocalMaterializer;
pub use paths::{PathMapping, StorePath};
pub use versions::VersionStore;
