//! Identifiers for individuals and pregnancy records.
//!
//! The host owns individuals and usually already has a UUID for each, so
//! [`IndividualId`] converts from a host [`Uuid`] as-is. [`PregnancyId`]s are
//! minted by the engine when a pregnancy is attached.
//!
//! Fresh IDs are UUID v7. Their leading timestamp makes records created in a
//! run sort in creation order, so a summary or a log grep lists pregnancies
//! in the order they happened without a separate counter. The role each ID
//! plays shows in its display prefix (`ind-`, `preg-`); serialized form is the
//! bare UUID so host saves stay compatible.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident => $prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Mint a fresh time-ordered identifier.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// The underlying UUID.
            pub const fn uuid(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

define_id! {
    /// A simulated individual, usually mirroring the host's own ID.
    IndividualId => "ind"
}

define_id! {
    /// A pregnancy record attached to its carrier.
    PregnancyId => "preg"
}
