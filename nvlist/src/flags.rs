// SPDX-License-Identifier: Apache-2.0

bitflags::bitflags! {
    /// Creation flags for an [`NvList`](crate::NvList).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct NvFlags: u32 {
        /// Names are compared ASCII case-insensitively.
        const IGNORE_CASE = 1 << 0;
        /// Several entries may share a name.
        const NO_UNIQUE = 1 << 1;
    }
}

impl NvFlags {
    /// Whether lookups fold name case.
    pub fn ignores_case(&self) -> bool {
        self.contains(NvFlags::IGNORE_CASE)
    }

    /// Whether duplicate names are accepted.
    pub fn allows_duplicates(&self) -> bool {
        self.contains(NvFlags::NO_UNIQUE)
    }
}
