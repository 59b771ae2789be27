// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Name of the bookkeeping root when the config does not give one
pub const BOOKKEEPING_NAME: &str = "Bookkeeping";
/// Record-field suffix of the upward systematic variation
pub const UP_SUFFIX: &str = "_up";
/// Record-field suffix of the downward systematic variation
pub const DOWN_SUFFIX: &str = "_dn";
/// Records per parallel work unit when `chunk_size` is not configured
pub const DEFAULT_CHUNK_SIZE: usize = 1024;
/// Worker count fallback when the platform cannot report its parallelism
pub const FALLBACK_CONCURRENCY: usize = 4;
/// Records read in `--debug` mode when the config sets no `debug_limit`
pub const DEBUG_RECORD_LIMIT: u64 = 10_000;
