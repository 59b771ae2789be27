// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_CHUNK_SIZE, FALLBACK_CONCURRENCY};
use crate::config::{Config, Strategy};
use crate::engine::parallel::ParallelExecutor;
use crate::engine::sequential::SequentialExecutor;
use crate::traits::CutflowExecutor;

/// Factory for creating cutflow drivers from configuration
pub struct ExecutorFactory;

impl ExecutorFactory {
    /// Create a driver based on the configuration strategy
    pub fn from_config(cfg: &Config) -> Box<dyn CutflowExecutor> {
        let options = &cfg.executor_options;

        match cfg.strategy {
            Strategy::Sequential => Box::new(SequentialExecutor::new(options.debug_limit)),
            Strategy::Parallel => {
                let max_concurrency = options.max_concurrency.unwrap_or_else(|| {
                    std::thread::available_parallelism()
                        .map(|n| n.get())
                        .unwrap_or(FALLBACK_CONCURRENCY)
                });
                let chunk_size = options.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE);
                Box::new(ParallelExecutor::new(max_concurrency, chunk_size, options.debug_limit))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(yaml: &str) -> Config {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_strategy_selects_driver() {
        let sequential = config("name: a\nstrategy: sequential\n");
        let parallel = config("name: b\nstrategy: parallel\nexecutor_options:\n  max_concurrency: 2\n  chunk_size: 16\n");

        assert_eq!(ExecutorFactory::from_config(&sequential).strategy(), "sequential");
        assert_eq!(ExecutorFactory::from_config(&parallel).strategy(), "parallel");
    }

    #[test]
    fn test_default_strategy_is_sequential() {
        assert_eq!(ExecutorFactory::from_config(&config("name: c\n")).strategy(), "sequential");
    }
}
