//! The outer suspension wrapper.
//!
//! Recipes express "come back later" as [`Verdict::Retry`]; the host
//! expresses it as a retry request recorded on the operation context. This
//! wrapper folds one into the other so entry points can be written purely in
//! terms of verdicts.

use crate::error::LifecycleResult;
use crate::verdict::Verdict;
use cloudify_model::{CloudifyContext, OP_DELETE, OPERATION};
use std::future::Future;

/// Run one lifecycle recipe against `ctx`, translating its verdict into the
/// host's retry protocol. On a completed delete the runtime properties are
/// cleared so the host forgets the instance entirely.
pub async fn run<F>(ctx: &CloudifyContext, recipe: F) -> LifecycleResult<Verdict>
where
    F: Future<Output = LifecycleResult<Verdict>>,
{
    let verdict = recipe.await.map_err(|e| {
        log::error!("Operation '{}' failed: {}", ctx.operation.name, e);
        e
    })?;

    match &verdict {
        Verdict::Complete => {
            if ctx.operation.name == OP_DELETE && !ctx.runtime().contains(OPERATION) {
                ctx.runtime().clear();
            }
            log::info!("Operation '{}' complete", ctx.operation.name);
        }
        Verdict::Retry { message, delay } => {
            log::info!(
                "Operation '{}' suspended for {:?}: {}",
                ctx.operation.name,
                delay,
                message
            );
            ctx.operation.retry(message.clone(), *delay);
        }
    }
    Ok(verdict)
}
