//! Configuration Module - Substrate Tuning Parameters
//!
//! Manages all configuration parameters for the chunk substrate and the
//! processor synchronization primitives.

/// Main configuration for the hierarchical-heap chunk substrate
///
/// # Examples
///
/// ```rust
/// use fgc::HeapConfig;
///
/// let config = HeapConfig::default();
///
/// let config = HeapConfig {
///     num_processors: 8,
///     timing_enabled: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct HeapConfig {
    /// Minimum chunk size in bytes
    ///
    /// Must be a multiple of `GC_MODEL_MINALIGN` and at least
    /// `heap_limit_slop`. Every chunk's start/limit is aligned to this
    /// boundary.
    ///
    /// Default: 4KB
    pub block_size: usize,

    /// Size requested for a fresh mmap'd chunk when the free pool is
    /// empty or too small to satisfy a request.
    ///
    /// Must be a multiple of `block_size`.
    ///
    /// Default: 1MB
    pub alloc_size: usize,

    /// Number of processors participating in the coordinator.
    ///
    /// Default: auto-detected via `num_cpus::get()`
    pub num_processors: usize,

    /// Slop reserved below a processor's allocation limit.
    ///
    /// Mirrors `GC_HEAP_LIMIT_SLOP`; `block_size` must be >= this value.
    ///
    /// Default: 512 bytes
    pub heap_limit_slop: usize,

    /// Enable timing instrumentation around the critical section and BSP
    /// join barriers.
    ///
    /// Default: false
    pub timing_enabled: bool,

    /// Whether freed chunks are coalesced with adjacent free chunks when
    /// returned to the pool.
    ///
    /// Default: true
    pub coalesce_on_free: bool,

    /// Number of objects forwarded between tracing-counter samples.
    ///
    /// Default: 1024
    pub trace_sample_interval: usize,

    /// Enable verbose substrate logging.
    ///
    /// Default: false
    pub verbose: bool,

    /// Enable statistics collection.
    ///
    /// Default: true
    pub stats_enabled: bool,
}

impl Default for HeapConfig {
    fn default() -> Self {
        HeapConfig {
            block_size: 4 * KB,
            alloc_size: MB,
            num_processors: num_cpus::get(),
            heap_limit_slop: 512,
            timing_enabled: false,
            coalesce_on_free: true,
            trace_sample_interval: 1024,
            verbose: false,
            stats_enabled: true,
        }
    }
}

impl HeapConfig {
    /// Validate configuration
    ///
    /// Checks the invariants `HM_configChunks` asserts in the original
    /// runtime: block size alignment, slop bound, and alloc-size
    /// divisibility.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_size == 0 {
            return Err(ConfigError::InvalidBlockSize(
                "block_size must be > 0".to_string(),
            ));
        }

        if !self.block_size.is_power_of_two() {
            return Err(ConfigError::InvalidBlockSize(
                "block_size must be a power of two".to_string(),
            ));
        }

        if self.block_size < self.heap_limit_slop {
            return Err(ConfigError::InvalidBlockSize(
                "block_size must be >= heap_limit_slop".to_string(),
            ));
        }

        if self.alloc_size == 0 || self.alloc_size % self.block_size != 0 {
            return Err(ConfigError::InvalidAllocSize(
                "alloc_size must be a non-zero multiple of block_size".to_string(),
            ));
        }

        if self.num_processors == 0 {
            return Err(ConfigError::InvalidProcessorCount(
                "num_processors must be > 0".to_string(),
            ));
        }

        if self.trace_sample_interval == 0 {
            return Err(ConfigError::InvalidTraceSampleInterval(
                "trace_sample_interval must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Build configuration from environment variables
    ///
    /// Overrides defaults with environment variables:
    /// - FGC_BLOCK_SIZE
    /// - FGC_ALLOC_SIZE
    /// - FGC_NUM_PROCESSORS
    /// - FGC_TIMING
    /// - FGC_VERBOSE
    ///
    /// # Examples
    ///
    /// ```bash
    /// export FGC_BLOCK_SIZE=8192
    /// export FGC_NUM_PROCESSORS=16
    /// export FGC_VERBOSE=1
    /// ```
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("FGC_BLOCK_SIZE") {
            if let Ok(size) = val.parse::<usize>() {
                config.block_size = size;
            }
        }

        if let Ok(val) = std::env::var("FGC_ALLOC_SIZE") {
            if let Ok(size) = val.parse::<usize>() {
                config.alloc_size = size;
            }
        }

        if let Ok(val) = std::env::var("FGC_NUM_PROCESSORS") {
            if let Ok(n) = val.parse::<usize>() {
                config.num_processors = n;
            }
        }

        if let Ok(val) = std::env::var("FGC_TIMING") {
            config.timing_enabled = val == "1" || val.eq_ignore_ascii_case("true");
        }

        if let Ok(val) = std::env::var("FGC_VERBOSE") {
            config.verbose = val == "1" || val.eq_ignore_ascii_case("true");
        }

        config
    }
}

/// Error types for configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid block size: {0}")]
    InvalidBlockSize(String),

    #[error("Invalid alloc size: {0}")]
    InvalidAllocSize(String),

    #[error("Invalid processor count: {0}")]
    InvalidProcessorCount(String),

    #[error("Invalid trace sample interval: {0}")]
    InvalidTraceSampleInterval(String),
}

const KB: usize = 1024;
const MB: usize = 1024 * 1024;
