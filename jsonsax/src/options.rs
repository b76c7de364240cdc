// SPDX-License-Identifier: Apache-2.0

/// Parser option flags, fixed for the duration of one parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ParseOptions(u8);

impl ParseOptions {
    /// Relaxed mode: unquoted keys, comments and raw control characters in
    /// strings are accepted.
    pub const NONE: ParseOptions = ParseOptions(0);

    /// Reject everything that is not plain JSON.
    pub const STRICT: ParseOptions = ParseOptions(1 << 0);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: ParseOptions) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_strict(self) -> bool {
        self.contains(Self::STRICT)
    }
}

impl core::ops::BitOr for ParseOptions {
    type Output = ParseOptions;

    fn bitor(self, rhs: ParseOptions) -> ParseOptions {
        ParseOptions(self.0 | rhs.0)
    }
}

impl core::ops::BitOrAssign for ParseOptions {
    fn bitor_assign(&mut self, rhs: ParseOptions) {
        self.0 |= rhs.0;
    }
}
