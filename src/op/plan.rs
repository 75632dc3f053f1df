//! Full Planning Pass
//!
//! Run validation, resolution and emission back to back. This is what the
//! command-line tool uses, and what most callers want: a manifest goes in,
//! the invocation parameters for one variant come out, and any failure is
//! reported through a single error type.

use crate::manifest::{Defaults, Manifest};
use crate::op::{emit, resolve, validate};

/// Plan Errors
///
/// Union of the errors of all steps of the planning pass.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Manifest(#[from] crate::manifest::Error),
    #[error(transparent)]
    Validation(#[from] validate::Error),
    #[error(transparent)]
    Resolve(#[from] resolve::Error),
}

/// Outcome of a planning pass.
#[derive(Clone, Debug)]
pub struct Plan {
    pub resolved: resolve::ResolvedPlan,
    pub invocation: emit::InvocationSpec,
}

/// Plan a variant
///
/// Validate the entire manifest, then resolve and emit the requested variant
/// with the given defaults, overrides and additional stages. Validation
/// covers all variants, not just the requested one, so a defect in any
/// variant fails every planning pass. Both validation and resolution use
/// `defaults`; the defaults declared in the manifest are not consulted.
pub fn plan(
    manifest: &Manifest,
    defaults: &Defaults,
    variant: &str,
    overrides: &resolve::Overrides,
    stages: &[Box<dyn resolve::Stage>],
) -> Result<Plan, Error> {
    validate::validate_with(manifest, defaults)?;

    let resolved = resolve::resolve_with(manifest, defaults, variant, overrides, stages)?;
    let invocation = emit::emit(&resolved);

    Ok(Plan {
        resolved: resolved,
        invocation: invocation,
    })
}

/// Plan a variant of a manifest file
///
/// Like `plan()`, but loads the manifest from `path` and uses the defaults it
/// declares.
pub fn plan_path(
    path: &std::path::Path,
    variant: &str,
    overrides: &resolve::Overrides,
) -> Result<Plan, Error> {
    let manifest = Manifest::parse_path(path)?;
    plan(&manifest, manifest.defaults(), variant, overrides, &[])
}
