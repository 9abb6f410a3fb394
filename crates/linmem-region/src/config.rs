//! Region configuration parameters.

/// Configuration for the linear memory region and its allocator.
///
/// All values are immutable after the region is created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionConfig {
    /// Growth increment in bytes.
    ///
    /// Default: 65_536 (one wasm page). Must be a power of two.
    pub page_size: u32,

    /// Maximum number of pages the region may grow to.
    ///
    /// Default: 65_536, the wasm32 ceiling of 4 GiB.
    pub max_pages: u32,

    /// Allocation granularity in bytes. Every block size is rounded up to
    /// this and every block address is a multiple of it.
    ///
    /// Default: 8. Must be a power of two.
    pub alignment: u32,
}

impl RegionConfig {
    /// Default page size: one 64 KiB wasm page.
    pub const DEFAULT_PAGE_SIZE: u32 = 65_536;

    /// Default page ceiling.
    pub const DEFAULT_MAX_PAGES: u32 = 65_536;

    /// Default allocation granularity.
    pub const DEFAULT_ALIGNMENT: u32 = 8;

    /// Bytes covered by `pages` pages.
    pub fn pages_to_bytes(&self, pages: u32) -> u64 {
        u64::from(pages) * u64::from(self.page_size)
    }

    /// Largest region size in bytes this configuration permits.
    pub fn max_bytes(&self) -> u64 {
        self.pages_to_bytes(self.max_pages)
    }
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            page_size: Self::DEFAULT_PAGE_SIZE,
            max_pages: Self::DEFAULT_MAX_PAGES,
            alignment: Self::DEFAULT_ALIGNMENT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ceiling_is_four_gib() {
        let config = RegionConfig::default();
        assert_eq!(config.max_bytes(), 4 * 1024 * 1024 * 1024);
    }

    #[test]
    fn pages_to_bytes_scales_by_page_size() {
        let config = RegionConfig {
            page_size: 1024,
            ..RegionConfig::default()
        };
        assert_eq!(config.pages_to_bytes(3), 3072);
    }
}
