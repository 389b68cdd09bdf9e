/// Declares a field-selection bitmask for partial reads, matches and writes.
macro_rules! field_mask {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$fmeta:meta])* $flag:ident = $bit:expr),* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(u8);

        impl $name {
            $($(#[$fmeta])* pub const $flag: Self = Self(1 << $bit);)*

            /// No field.
            pub const NONE: Self = Self(0);

            /// Every field.
            pub const ALL: Self = Self(0 $(| (1 << $bit))*);

            /// Returns `true` if every field of `other` is selected.
            #[must_use]
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            #[must_use]
            pub const fn bits(self) -> u8 {
                self.0
            }
        }

        impl std::ops::BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl std::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }
    };
}

field_mask! {
    /// Selects [`Node`](super::Node) fields.
    NodeFields {
        ID = 0,
        CONTAINING_FACE = 1,
        GEOM = 2,
    }
}

field_mask! {
    /// Selects [`Edge`](super::Edge) fields.
    EdgeFields {
        ID = 0,
        START_NODE = 1,
        END_NODE = 2,
        FACE_LEFT = 3,
        FACE_RIGHT = 4,
        NEXT_LEFT = 5,
        NEXT_RIGHT = 6,
        GEOM = 7,
    }
}

field_mask! {
    /// Selects [`Face`](super::Face) fields.
    FaceFields {
        ID = 0,
        MBR = 1,
    }
}
