//! Bridge configuration, guest layout, and validation.

use std::error::Error;
use std::fmt;

use linmem_core::{Address, MemoryError};
use linmem_region::RegionConfig;

// ── Error ───────────────────────────────────────────────────────

/// Errors detected while validating configuration or loading a guest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `page_size` is zero or not a power of two.
    InvalidPageSize {
        /// The configured value.
        value: u32,
    },
    /// `alignment` is zero, not a power of two, or larger than a page.
    InvalidAlignment {
        /// The configured value.
        value: u32,
    },
    /// `max_pages` is zero.
    NoPages,
    /// `staging_capacity` is zero.
    StagingEmpty,
    /// The guest reported an unusable heap layout.
    InvalidLayout {
        /// Which check failed.
        reason: String,
    },
    /// The region could not be created or the staging buffer reserved.
    Memory(MemoryError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPageSize { value } => {
                write!(f, "page_size must be a non-zero power of two, got {value}")
            }
            Self::InvalidAlignment { value } => write!(
                f,
                "alignment must be a power of two no larger than a page, got {value}"
            ),
            Self::NoPages => write!(f, "max_pages must be at least 1"),
            Self::StagingEmpty => write!(f, "staging_capacity must be at least 1"),
            Self::InvalidLayout { reason } => write!(f, "invalid guest layout: {reason}"),
            Self::Memory(e) => write!(f, "memory: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Memory(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MemoryError> for ConfigError {
    fn from(e: MemoryError) -> Self {
        Self::Memory(e)
    }
}

// ── BridgeConfig ────────────────────────────────────────────────

/// Host-side settings for a bridge session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Region and allocator parameters.
    pub region: RegionConfig,
    /// Bytes reserved once at load for source text handed to the guest.
    ///
    /// Default: 8192. Rounded up to `region.alignment` when reserved.
    pub staging_capacity: u32,
}

impl BridgeConfig {
    /// Default staging buffer size.
    pub const DEFAULT_STAGING_CAPACITY: u32 = 8 * 1024;

    /// Check every structural invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let page_size = self.region.page_size;
        if !page_size.is_power_of_two() {
            return Err(ConfigError::InvalidPageSize { value: page_size });
        }
        let alignment = self.region.alignment;
        if !alignment.is_power_of_two() || alignment > page_size {
            return Err(ConfigError::InvalidAlignment { value: alignment });
        }
        if self.region.max_pages == 0 {
            return Err(ConfigError::NoPages);
        }
        if self.staging_capacity == 0 {
            return Err(ConfigError::StagingEmpty);
        }
        Ok(())
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            region: RegionConfig::default(),
            staging_capacity: Self::DEFAULT_STAGING_CAPACITY,
        }
    }
}

// ── GuestLayout ─────────────────────────────────────────────────

/// Memory layout reported by a guest module's exports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GuestLayout {
    /// Region size at instantiation, in pages.
    pub initial_pages: u32,
    /// First address past the guest's static data; the heap starts here.
    pub heap_base: Address,
    /// End of the guest's initial heap. Informational: the allocator
    /// grows past it on demand.
    pub heap_end: Address,
}

impl GuestLayout {
    /// Check the layout against the region it will live in.
    pub fn validate(&self, region: &RegionConfig) -> Result<(), ConfigError> {
        let invalid = |reason: String| Err(ConfigError::InvalidLayout { reason });
        if self.heap_base.is_null() {
            return invalid("heap_base is null".into());
        }
        if !self.heap_base.is_aligned(region.alignment) {
            return invalid(format!(
                "heap_base {} is not {}-byte aligned",
                self.heap_base, region.alignment
            ));
        }
        if self.initial_pages > region.max_pages {
            return invalid(format!(
                "initial_pages {} exceeds max_pages {}",
                self.initial_pages, region.max_pages
            ));
        }
        let initial_bytes = region.pages_to_bytes(self.initial_pages);
        if u64::from(self.heap_base.0) > initial_bytes {
            return invalid(format!(
                "heap_base {} lies outside the initial {initial_bytes}-byte region",
                self.heap_base
            ));
        }
        if self.heap_end < self.heap_base {
            return invalid(format!(
                "heap_end {} is below heap_base {}",
                self.heap_end, self.heap_base
            ));
        }
        Ok(())
    }
}
