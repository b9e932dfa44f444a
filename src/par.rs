//! Per-pixel kernels, sequential or rayon-parallel.
//!
//! Each output pixel depends only on the same-coordinate input pixel(s), so
//! the parallel path partitions freely and produces output identical to the
//! sequential one.

use alloc::vec::Vec;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Pixels per histogram chunk on the parallel path.
#[cfg(feature = "rayon")]
const CHUNK: usize = 64 * 1024;

/// Map every pixel of `src` through `f`.
#[cfg(not(feature = "rayon"))]
pub(crate) fn map<S, D, F>(src: &[S], f: F) -> Vec<D>
where
    S: Sync,
    D: Send,
    F: Fn(&S) -> D + Sync + Send,
{
    src.iter().map(f).collect()
}

/// Map every pixel of `src` through `f`.
#[cfg(feature = "rayon")]
pub(crate) fn map<S, D, F>(src: &[S], f: F) -> Vec<D>
where
    S: Sync,
    D: Send,
    F: Fn(&S) -> D + Sync + Send,
{
    src.par_iter().map(f).collect()
}

/// Map same-coordinate pixel pairs of `a` and `b` through `f`.
///
/// Both slices must have the same length.
#[cfg(not(feature = "rayon"))]
pub(crate) fn zip_map<A, B, D, F>(a: &[A], b: &[B], f: F) -> Vec<D>
where
    A: Sync,
    B: Sync,
    D: Send,
    F: Fn(&A, &B) -> D + Sync + Send,
{
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(a, b)| f(a, b)).collect()
}

/// Map same-coordinate pixel pairs of `a` and `b` through `f`.
///
/// Both slices must have the same length.
#[cfg(feature = "rayon")]
pub(crate) fn zip_map<A, B, D, F>(a: &[A], b: &[B], f: F) -> Vec<D>
where
    A: Sync,
    B: Sync,
    D: Send,
    F: Fn(&A, &B) -> D + Sync + Send,
{
    debug_assert_eq!(a.len(), b.len());
    a.par_iter().zip(b).map(|(a, b)| f(a, b)).collect()
}

/// Count how often each 8-bit value occurs.
#[cfg(not(feature = "rayon"))]
pub(crate) fn histogram<S, F>(src: &[S], value: F) -> [u64; 256]
where
    S: Sync,
    F: Fn(&S) -> u8 + Sync + Send,
{
    count(src, &value)
}

/// Count how often each 8-bit value occurs.
#[cfg(feature = "rayon")]
pub(crate) fn histogram<S, F>(src: &[S], value: F) -> [u64; 256]
where
    S: Sync,
    F: Fn(&S) -> u8 + Sync + Send,
{
    src.par_chunks(CHUNK)
        .map(|chunk| count(chunk, &value))
        .reduce(
            || [0u64; 256],
            |mut acc, part| {
                for (a, p) in acc.iter_mut().zip(part) {
                    *a += p;
                }
                acc
            },
        )
}

fn count<S, F>(src: &[S], value: &F) -> [u64; 256]
where
    F: Fn(&S) -> u8,
{
    let mut bins = [0u64; 256];
    for px in src {
        bins[usize::from(value(px))] += 1;
    }
    bins
}
