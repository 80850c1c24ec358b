//! Bounded-concurrency resolution of image candidates.
//!
//! DOM handles are not shareable across threads, so candidates are captured
//! into plain data first ([`crate::images::ImageCapture`]) and resolved here
//! as pure string work on a small rayon pool. Results come back in the
//! original candidate order regardless of completion order.

use log::debug;
use rayon::prelude::*;

use crate::images::{ImageCapture, ImageResolver};
use crate::options::Heuristics;

/// Resolve a batch of captured image candidates.
///
/// Each candidate gets up to `image_probe_attempts` tries; a try succeeds
/// when it yields a usable absolute URL. Failed candidates resolve to
/// `None` rather than failing the batch.
#[must_use]
pub fn resolve_captures(
    captures: &[ImageCapture],
    resolver: &ImageResolver,
    heuristics: &Heuristics,
) -> Vec<Option<String>> {
    if captures.is_empty() {
        return Vec::new();
    }

    let threads = heuristics.image_probe_concurrency.max(1);
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(|| {
            captures
                .par_iter()
                .map(|capture| resolve_one(capture, resolver, heuristics))
                .collect()
        }),
        Err(err) => {
            debug!("probe pool unavailable, resolving sequentially: {err}");
            captures
                .iter()
                .map(|capture| resolve_one(capture, resolver, heuristics))
                .collect()
        }
    }
}

fn resolve_one(
    capture: &ImageCapture,
    resolver: &ImageResolver,
    heuristics: &Heuristics,
) -> Option<String> {
    let attempts = heuristics.image_probe_attempts.max(1);
    for attempt in 1..=attempts {
        match resolver.resolve_capture(capture) {
            Ok(Some(url)) => return Some(url),
            Ok(None) => return None,
            Err(err) => {
                debug!("image probe attempt {attempt}/{attempts} failed: {err}");
            }
        }
    }
    None
}
