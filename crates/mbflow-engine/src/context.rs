//! Block dispatch backend.
//!
//! Every "for all blocks" stage of the march goes through
//! [`ExecutionContext::for_each_block`], which returns only after every
//! block has finished. Blocks are exclusively owned, so parallel dispatch
//! needs no locking.

use mbflow_coupling::BlockSolver;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::config::{ConfigError, ExecutionConfig};

/// Serial or thread-pool dispatch over a block list.
#[derive(Debug)]
pub struct ExecutionContext {
    pool: Option<ThreadPool>,
}

impl ExecutionContext {
    /// Build the backend described by `config`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ThreadCountZero`] for `Some(0)` threads and
    /// [`ConfigError::ThreadPool`] if the pool cannot be created.
    pub fn new(config: &ExecutionConfig) -> Result<Self, ConfigError> {
        match config.threads {
            Some(0) => Err(ConfigError::ThreadCountZero),
            Some(1) => Ok(Self::serial()),
            threads => {
                let mut builder = ThreadPoolBuilder::new().thread_name(|k| format!("mbflow-block-{k}"));
                if let Some(n) = threads {
                    builder = builder.num_threads(n);
                }
                let pool = builder.build().map_err(|e| ConfigError::ThreadPool {
                    reason: e.to_string(),
                })?;
                Ok(Self { pool: Some(pool) })
            }
        }
    }

    /// Run every block on the calling thread.
    pub fn serial() -> Self {
        Self { pool: None }
    }

    /// Worker threads in use; 1 for serial dispatch.
    pub fn threads(&self) -> usize {
        self.pool.as_ref().map_or(1, |p| p.current_num_threads())
    }

    /// Apply `f` to every block and wait for all of them.
    pub fn for_each_block<F>(&self, blocks: &mut [Box<dyn BlockSolver>], f: F)
    where
        F: Fn(&mut dyn BlockSolver) + Send + Sync,
    {
        match &self.pool {
            None => blocks.iter_mut().for_each(|b| f(b.as_mut())),
            Some(pool) => pool.install(|| blocks.par_iter_mut().for_each(|b| f(b.as_mut()))),
        }
    }

    /// Tear the worker pool down.
    pub fn shutdown(self) {
        drop(self.pool);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbflow_test_utils::{calls_for, rectangle_fields, RecordingSolver, SolverCall};

    fn blocks(n: usize) -> (Vec<Box<dyn BlockSolver>>, mbflow_test_utils::CallLog) {
        let log = RecordingSolver::new_log();
        let blocks = (0..n)
            .map(|k| {
                let fields = rectangle_fields(2, 2, [k as f64, 0.0], [1.0, 1.0]);
                Box::new(RecordingSolver::new(&format!("b{k}"), fields, log.clone()))
                    as Box<dyn BlockSolver>
            })
            .collect();
        (blocks, log)
    }

    #[test]
    fn serial_visits_every_block_once() {
        let ctx = ExecutionContext::new(&ExecutionConfig { threads: Some(1) }).unwrap();
        assert_eq!(ctx.threads(), 1);
        let (mut bs, log) = blocks(3);
        ctx.for_each_block(&mut bs, |b| b.clear_flux());
        for k in 0..3 {
            assert_eq!(calls_for(&log, &format!("b{k}")), vec![SolverCall::ClearFlux]);
        }
    }

    #[test]
    fn pool_visits_every_block_once() {
        let ctx = ExecutionContext::new(&ExecutionConfig { threads: Some(3) }).unwrap();
        assert_eq!(ctx.threads(), 3);
        let (mut bs, log) = blocks(5);
        ctx.for_each_block(&mut bs, |b| b.time_march_rk3(2));
        for k in 0..5 {
            assert_eq!(calls_for(&log, &format!("b{k}")), vec![SolverCall::Rk3(2)]);
        }
        ctx.shutdown();
    }

    #[test]
    fn zero_threads_is_rejected() {
        match ExecutionContext::new(&ExecutionConfig { threads: Some(0) }) {
            Err(ConfigError::ThreadCountZero) => {}
            other => panic!("expected ThreadCountZero, got {other:?}"),
        }
    }
}
