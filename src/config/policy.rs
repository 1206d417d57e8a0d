//! Full-page-cache policy derived from `[performance]`.

/// Lowest accepted page cache TTL, in seconds.
pub const MIN_PAGE_CACHE_TTL: u64 = 3600;

/// Which full-page cache serves the pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheApplication {
    BuiltIn,
    Varnish,
}

impl CacheApplication {
    /// Numeric code used by the framework's cache config (`1` built-in, `2` Varnish).
    pub fn code(self) -> u8 {
        match self {
            Self::BuiltIn => 1,
            Self::Varnish => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::BuiltIn => "built-in",
            Self::Varnish => "varnish",
        }
    }
}

/// Effective page cache settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCachePolicy {
    pub application: CacheApplication,
    pub ttl: u64,
}

/// Clamp a configured TTL to at least `MIN_PAGE_CACHE_TTL`.
pub(super) fn clamp_ttl(ttl: i64) -> u64 {
    u64::try_from(ttl).map_or(MIN_PAGE_CACHE_TTL, |ttl| ttl.max(MIN_PAGE_CACHE_TTL))
}
