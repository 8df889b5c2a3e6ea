// Readerly - Reading Shelves and Club Progress
// Copyright (C) 2026 Readerly contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Remote collection access
//!
//! The remote side exposes the user's shelves and club progress as plain
//! per-resource endpoints with no multi-resource transaction. This module
//! holds the seam trait the core depends on, the wire models, and the HTTP
//! implementation.

pub mod client;
pub mod remote;
pub mod wire;

// Re-export commonly used types
pub use client::{ClientConfig, RemoteClient, MAX_CONCURRENCY};
pub use remote::RemoteCollection;
pub use wire::{ProgressRecord, ProgressUpdateRecord, ShelfRecord};
