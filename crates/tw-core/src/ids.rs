//! Strongly typed identifier wrappers for host-owned objects.
//!
//! The host simulation hands out integer identities for the agents it lets
//! us control and the entities we merely observe.  Wrapping them keeps an
//! elevator id from ever being used to look up a passenger sentry.
//!
//! All IDs are `Copy + Ord + Hash` so they can key `BTreeMap`s (the driver
//! relies on ordered maps for deterministic iteration).

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty) => $label:literal;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", $label, self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(raw: $inner) -> $name {
                $name(raw)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Identity of an agent, something the core issues commands to.
    pub struct AgentId(u32) => "agent";
}

typed_id! {
    /// Identity of a passively observed entity.
    pub struct EntityId(u32) => "entity";
}
