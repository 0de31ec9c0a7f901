use std::io;

use tokio::runtime::{Builder, Runtime};

use crate::config::RuntimeConfig;

pub mod signal;

/// Builds a multi-threaded Tokio runtime according to `config`.
pub fn build(config: &RuntimeConfig) -> io::Result<Runtime> {
    let mut builder = Builder::new_multi_thread();
    builder.enable_all();

    if let Some(n) = config.worker_threads {
        builder.worker_threads(n.get());
    }

    builder.build()
}
