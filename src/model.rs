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


//! Core domain types: identifiers, shelf kinds, shelves
//!
//! Identifiers are opaque strings minted by the remote side and are wrapped in
//! transparent newtypes so a shelf id can never be passed where an edition id
//! is expected. The core never parses or interprets them.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! opaque_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new<S: Into<String>>(id: S) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

opaque_id!(
    /// Identifier of one shelf belonging to the signed-in user
    ShelfId
);

opaque_id!(
    /// Identifier of one published form of a book.
    ///
    /// The core only references editions by id; metadata lives elsewhere.
    EditionId
);

opaque_id!(
    /// Identifier of a book club
    ClubId
);

/// Kind tag carried by every shelf.
///
/// The three reading-status kinds (WantToRead, Reading, Read) are mutually
/// exclusive per edition. Owned is independent of reading status, and custom
/// shelves are unconstrained many-to-many collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShelfKind {
    WantToRead,
    Reading,
    Read,
    Owned,
    /// Any user-created shelf; the display name carries its identity
    #[serde(other)]
    Custom,
}

impl ShelfKind {
    /// The three canonical reading-status kinds, in lifecycle order
    pub const READING_STATUS_KINDS: [ShelfKind; 3] =
        [ShelfKind::WantToRead, ShelfKind::Reading, ShelfKind::Read];

    /// True for the kinds that participate in canonical exclusivity
    pub fn is_reading_status(&self) -> bool {
        matches!(
            self,
            ShelfKind::WantToRead | ShelfKind::Reading | ShelfKind::Read
        )
    }

    /// Parse a wire tag; anything unrecognized is a custom shelf
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "want_to_read" => ShelfKind::WantToRead,
            "reading" => ShelfKind::Reading,
            "read" => ShelfKind::Read,
            "owned" => ShelfKind::Owned,
            _ => ShelfKind::Custom,
        }
    }

    /// Wire tag for this kind
    pub fn as_tag(&self) -> &'static str {
        match self {
            ShelfKind::WantToRead => "want_to_read",
            ShelfKind::Reading => "reading",
            ShelfKind::Read => "read",
            ShelfKind::Owned => "owned",
            ShelfKind::Custom => "custom",
        }
    }
}

impl fmt::Display for ShelfKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Who can see a shelf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Private,
    Public,
}

impl Visibility {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "public" => Visibility::Public,
            _ => Visibility::Private,
        }
    }
}

/// One shelf in the signed-in user's collection.
///
/// Shelves are created and deleted through shelf-management screens; the core
/// only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shelf {
    /// Remote identifier
    pub id: ShelfId,

    /// Display name
    pub name: String,

    /// Kind tag; drives exclusivity rules
    pub kind: ShelfKind,

    /// Private/public visibility
    pub visibility: Visibility,
}

impl Shelf {
    pub fn new<S: Into<String>>(id: ShelfId, name: S, kind: ShelfKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            visibility: Visibility::Private,
        }
    }
}

// ===== TESTS =====
