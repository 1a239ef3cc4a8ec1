//! Substrate Logging and Tracing
//!
//! Comprehensive logging for chunk-substrate and coordinator operations,
//! useful for:
//! - Performance analysis
//! - Debugging
//! - Production monitoring
//!
//! Log Levels:
//! - ERROR: substrate failures
//! - WARN: unusual conditions
//! - INFO: chunk lifecycle, coordinator state transitions
//! - DEBUG: detailed operations
//! - TRACE: per-chunk / per-object operations

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Instant;

/// Log level for substrate operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

/// Substrate event types
#[derive(Debug, Clone)]
pub enum GcEvent {
    /// A fresh chunk was mmap'd and added to the free-chunk pool
    ChunkMapped { address: usize, size: usize },

    /// A chunk was split into a retained and a returned piece
    ChunkSplit {
        address: usize,
        split_point: usize,
        retained_size: usize,
    },

    /// Two adjacent free chunks were coalesced
    ChunkCoalesced {
        left: usize,
        right: usize,
        merged_size: usize,
    },

    /// A level head was promoted to a lower (older) level
    LevelPromoted { from_level: u32, to_level: u32 },

    /// Chunks at or above `min_level` were returned to the free pool
    LevelFreed { min_level: u32, bytes_freed: usize },

    /// The coordinator's BSP state machine transitioned
    CoordinatorStateChange { from: String, to: String },

    /// A processor entered or left the rotating critical section
    CriticalSection { processor: usize, entered: bool },

    /// A BSP pipeline step completed across all participants
    BspStep {
        step: usize,
        participants: usize,
        continued: bool,
    },

    /// Heap statistics
    HeapStats {
        used_bytes: usize,
        total_bytes: usize,
        utilization: f64,
    },

    /// Allocation failure
    AllocationFailure { size: usize, heap_used: usize },

    /// Forwarding/tracing statistics sampled during object iteration
    TraceStats {
        objects_copied: u64,
        bytes_copied: u64,
    },
}

/// Substrate logger configuration
#[derive(Debug, Clone)]
pub struct GcLoggerConfig {
    /// Minimum log level
    pub level: LogLevel,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: Option<String>,

    /// Enable JSON format
    pub json: bool,

    /// Enable timestamps
    pub timestamps: bool,
}

impl Default for GcLoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            console: true,
            file: None,
            json: false,
            timestamps: true,
        }
    }
}

/// Substrate logger - centralized logging for chunk/coordinator operations
pub struct GcLogger {
    config: GcLoggerConfig,
    events: Mutex<Vec<(Instant, GcEvent)>>,
    enabled: AtomicBool,
}

impl GcLogger {
    /// Create new substrate logger
    pub fn new(config: GcLoggerConfig) -> Self {
        Self {
            config,
            events: Mutex::new(Vec::new()),
            enabled: AtomicBool::new(true),
        }
    }

    /// Enable logging
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    /// Disable logging
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    /// Check if logging is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Log a substrate event
    pub fn log(&self, event: GcEvent) {
        if !self.is_enabled() {
            return;
        }

        let event_level = self.event_level(&event);
        if event_level > self.config.level {
            return;
        }

        let timestamp = Instant::now();

        if let Ok(mut events) = self.events.lock() {
            events.push((timestamp, event.clone()));
        }

        if self.config.console {
            self.output_console(&event);
        }

        if let Some(ref _path) = self.config.file {
            // TODO: Implement file output
        }
    }

    /// Get log level for event
    fn event_level(&self, event: &GcEvent) -> LogLevel {
        match event {
            GcEvent::AllocationFailure { .. } => LogLevel::Error,
            GcEvent::CoordinatorStateChange { .. } | GcEvent::HeapStats { .. } => LogLevel::Info,
            GcEvent::ChunkMapped { .. }
            | GcEvent::LevelPromoted { .. }
            | GcEvent::LevelFreed { .. }
            | GcEvent::BspStep { .. } => LogLevel::Debug,
            GcEvent::ChunkSplit { .. }
            | GcEvent::ChunkCoalesced { .. }
            | GcEvent::CriticalSection { .. }
            | GcEvent::TraceStats { .. } => LogLevel::Trace,
        }
    }

    /// Output to console
    fn output_console(&self, event: &GcEvent) {
        if self.config.timestamps {
            let now = chrono::Local::now();
            print!("[{}] ", now.format("%Y-%m-%d %H:%M:%S%.3f"));
        }

        if self.config.json {
            self.output_json(event);
        } else {
            self.output_human(event);
        }
    }

    /// Output in human-readable format
    fn output_human(&self, event: &GcEvent) {
        match event {
            GcEvent::ChunkMapped { address, size } => {
                println!("[HH] chunk mapped at {:#x} ({} bytes)", address, size);
            },
            GcEvent::ChunkSplit {
                address,
                split_point,
                retained_size,
            } => {
                println!(
                    "[HH] chunk {:#x} split at {:#x} (retained {} bytes)",
                    address, split_point, retained_size
                );
            },
            GcEvent::ChunkCoalesced {
                left,
                right,
                merged_size,
            } => {
                println!(
                    "[HH] coalesced {:#x} + {:#x} -> {} bytes",
                    left, right, merged_size
                );
            },
            GcEvent::LevelPromoted { from_level, to_level } => {
                println!("[HH] level {} promoted to {}", from_level, to_level);
            },
            GcEvent::LevelFreed { min_level, bytes_freed } => {
                println!(
                    "[HH] freed levels >= {} ({} bytes)",
                    min_level, bytes_freed
                );
            },
            GcEvent::CoordinatorStateChange { from, to } => {
                println!("[SYNC] coordinator {} -> {}", from, to);
            },
            GcEvent::CriticalSection { processor, entered } => {
                println!(
                    "[SYNC] processor {} {} critical section",
                    processor,
                    if *entered { "entered" } else { "left" }
                );
            },
            GcEvent::BspStep {
                step,
                participants,
                continued,
            } => {
                println!(
                    "[SYNC] BSP step {} finished ({} participants, continued={})",
                    step, participants, continued
                );
            },
            GcEvent::HeapStats {
                used_bytes,
                total_bytes,
                utilization,
            } => {
                println!(
                    "[HH] heap: {}/{} bytes ({:.1}% utilized)",
                    used_bytes,
                    total_bytes,
                    utilization * 100.0
                );
            },
            GcEvent::AllocationFailure { size, heap_used } => {
                eprintln!(
                    "[HH] allocation failure: {} bytes (heap used: {})",
                    size, heap_used
                );
            },
            GcEvent::TraceStats {
                objects_copied,
                bytes_copied,
            } => {
                println!(
                    "[HH] traced {} objects ({} bytes)",
                    objects_copied, bytes_copied
                );
            },
        }
    }

    /// Output in JSON format
    fn output_json(&self, event: &GcEvent) {
        let json = match event {
            GcEvent::ChunkMapped { address, size } => serde_json::json!({
                "type": "chunk_mapped",
                "address": address,
                "size": size
            }),
            GcEvent::ChunkSplit {
                address,
                split_point,
                retained_size,
            } => serde_json::json!({
                "type": "chunk_split",
                "address": address,
                "split_point": split_point,
                "retained_size": retained_size
            }),
            GcEvent::ChunkCoalesced {
                left,
                right,
                merged_size,
            } => serde_json::json!({
                "type": "chunk_coalesced",
                "left": left,
                "right": right,
                "merged_size": merged_size
            }),
            GcEvent::LevelPromoted { from_level, to_level } => serde_json::json!({
                "type": "level_promoted",
                "from_level": from_level,
                "to_level": to_level
            }),
            GcEvent::LevelFreed { min_level, bytes_freed } => serde_json::json!({
                "type": "level_freed",
                "min_level": min_level,
                "bytes_freed": bytes_freed
            }),
            GcEvent::CoordinatorStateChange { from, to } => serde_json::json!({
                "type": "coordinator_state_change",
                "from": from,
                "to": to
            }),
            GcEvent::CriticalSection { processor, entered } => serde_json::json!({
                "type": "critical_section",
                "processor": processor,
                "entered": entered
            }),
            GcEvent::BspStep {
                step,
                participants,
                continued,
            } => serde_json::json!({
                "type": "bsp_step",
                "step": step,
                "participants": participants,
                "continued": continued
            }),
            GcEvent::HeapStats {
                used_bytes,
                total_bytes,
                utilization,
            } => serde_json::json!({
                "type": "heap_stats",
                "used_bytes": used_bytes,
                "total_bytes": total_bytes,
                "utilization": utilization
            }),
            GcEvent::AllocationFailure { size, heap_used } => serde_json::json!({
                "type": "allocation_failure",
                "size": size,
                "heap_used": heap_used
            }),
            GcEvent::TraceStats {
                objects_copied,
                bytes_copied,
            } => serde_json::json!({
                "type": "trace_stats",
                "objects_copied": objects_copied,
                "bytes_copied": bytes_copied
            }),
        };

        if let Ok(json_str) = serde_json::to_string(&json) {
            println!("{}", json_str);
        }
    }

    /// Get all events
    pub fn get_events(&self) -> Vec<(Instant, GcEvent)> {
        if let Ok(events) = self.events.lock() {
            events.clone()
        } else {
            Vec::new()
        }
    }

    /// Clear all events
    pub fn clear_events(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    /// Get event count
    pub fn event_count(&self) -> usize {
        if let Ok(events) = self.events.lock() {
            events.len()
        } else {
            0
        }
    }
}

impl Default for GcLogger {
    fn default() -> Self {
        Self::new(GcLoggerConfig::default())
    }
}

/// Global substrate logger
lazy_static::lazy_static! {
    static ref GLOBAL_LOGGER: Mutex<GcLogger> = Mutex::new(GcLogger::default());
}

/// Log a substrate event to the global logger
pub fn log_event(event: GcEvent) {
    if let Ok(logger) = GLOBAL_LOGGER.lock() {
        logger.log(event);
    }
}

/// Configure global logger
pub fn configure_logger(config: GcLoggerConfig) {
    if let Ok(mut logger) = GLOBAL_LOGGER.lock() {
        *logger = GcLogger::new(config);
    }
}

/// Get global logger event count
pub fn get_event_count() -> usize {
    if let Ok(logger) = GLOBAL_LOGGER.lock() {
        logger.event_count()
    } else {
        0
    }
}
