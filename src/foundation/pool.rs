use rayon::prelude::*;

use crate::foundation::core::RasterSettings;
use crate::foundation::error::{BlendError, BlendResult};

/// Run `f` on a dedicated pool when `settings.threads` asks for one, else on the caller's pool.
pub(crate) fn install<R, F>(settings: &RasterSettings, f: F) -> BlendResult<R>
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    match settings.threads {
        Some(n) if settings.parallel => Ok(build_thread_pool(Some(n))?.install(f)),
        _ => Ok(f()),
    }
}

/// Call `f(row_index, row)` for every `row_len`-wide row of `buf`.
pub(crate) fn for_each_row<T, F>(buf: &mut [T], row_len: usize, parallel: bool, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync + Send,
{
    if row_len == 0 {
        return;
    }
    if parallel {
        buf.par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(j, row)| f(j, row));
    } else {
        buf.chunks_mut(row_len)
            .enumerate()
            .for_each(|(j, row)| f(j, row));
    }
}

fn build_thread_pool(threads: Option<usize>) -> BlendResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(BlendError::validation(
            "raster settings 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| BlendError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}
