//! Build Plan Resolution
//!
//! Merge a build variant with the global defaults and caller-provided
//! overrides into a fully resolved build plan. Precedence is, from highest
//! to lowest: overrides, variant attributes, defaults. The merged plan is
//! then passed through an ordered sequence of stages and finally re-checked
//! against the same constraints `op::validate` enforces on the manifest.
//!
//! Resolution is deterministic. Nothing but the explicit arguments is
//! consulted; in particular, neither the process environment nor the clock.

use serde;
use std::collections::BTreeMap;

use crate::manifest::{BuildVariant, Defaults, Manifest, SigningProfile};
use crate::op::validate;

/// Resolve Errors
///
/// This is the exhaustive list of possible errors raised by the resolve
/// operation. See each error for details.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The requested variant is not declared in the manifest.
    #[error("unknown variant `{0}`")]
    UnknownVariant(String),
    /// An override uses an unknown key or a value of the wrong type.
    #[error("invalid override `{key}={value}`: {reason}")]
    InvalidOverride {
        key: String,
        value: String,
        reason: String,
    },
    /// A stage refused the plan.
    #[error("stage `{stage}` failed: {reason}")]
    Stage {
        stage: String,
        reason: String,
    },
    /// The merged plan violates a manifest constraint.
    #[error(transparent)]
    Validation(#[from] validate::Error),
}

/// Overrides
///
/// Key-value assignments taking precedence over everything declared in the
/// manifest. Keys use the manifest spelling (`target-sdk`, `multi-dex`, ...).
/// Keys and values are only interpreted during resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Overrides {
    entries: BTreeMap<String, String>,
}

impl Overrides {
    /// Create an empty set of overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an override, replacing any previous value for the key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Parse a single `KEY=VALUE` assignment
    ///
    /// The key is everything up to the first `=`, the value everything after
    /// it. Surrounding whitespace of the key is stripped.
    pub fn parse_assignment(s: &str) -> Result<(String, String), Error> {
        match s.split_once('=') {
            Some((k, v)) if !k.trim().is_empty() => {
                Ok((k.trim().to_string(), v.to_string()))
            },
            _ => Err(Error::InvalidOverride {
                key: s.to_string(),
                value: String::new(),
                reason: "expected KEY=VALUE".to_string(),
            }),
        }
    }

    /// Collect overrides from a list of `KEY=VALUE` assignments. Later
    /// assignments of the same key win.
    pub fn from_assignments<I, S>(assignments: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut o = Self::new();
        for a in assignments {
            let (k, v) = Self::parse_assignment(a.as_ref())?;
            o.set(k, v);
        }
        Ok(o)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|v| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Overrides {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut o = Self::new();
        for (k, v) in iter {
            o.set(k, v);
        }
        o
    }
}

/// Resolved Build Plan
///
/// The fully merged configuration of a single variant. Every attribute has a
/// concrete value. Plans are created per invocation and handed to
/// `op::emit`; they are never persisted.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPlan {
    pub variant: String,
    pub application_id: String,
    pub namespace: String,

    pub min_sdk: u32,
    pub target_sdk: u32,
    pub compile_sdk: u32,

    pub multi_dex_enabled: bool,

    pub version_code: u32,
    pub version_name: String,
    pub ndk_version: Option<String>,
    pub java_version: u32,

    pub signing: Option<SigningProfile>,
    pub plugins: Vec<String>,
    pub flutter_source: Option<String>,
}

/// Plan Stage
///
/// A stage transforms a merged plan into a new plan. Stages run in order,
/// each receiving the output of its predecessor. Any closure of the form
/// `Fn(ResolvedPlan) -> Result<ResolvedPlan, Error>` is a stage as well.
pub trait Stage {
    /// Name of the stage, used in logs and errors.
    fn name(&self) -> &str;

    /// Transform the plan.
    fn apply(&self, plan: ResolvedPlan) -> Result<ResolvedPlan, Error>;
}

impl<F> Stage for F
where
    F: Fn(ResolvedPlan) -> Result<ResolvedPlan, Error>,
{
    fn name(&self) -> &str {
        "custom"
    }

    fn apply(&self, plan: ResolvedPlan) -> Result<ResolvedPlan, Error> {
        self(plan)
    }
}

/// Append a suffix to the application identifier, like Gradle's
/// `applicationIdSuffix`. The namespace is left untouched.
#[derive(Clone, Debug)]
pub struct ApplicationIdSuffix(pub String);

impl Stage for ApplicationIdSuffix {
    fn name(&self) -> &str {
        "application-id-suffix"
    }

    fn apply(&self, mut plan: ResolvedPlan) -> Result<ResolvedPlan, Error> {
        plan.application_id.push_str(&self.0);
        Ok(plan)
    }
}

/// Append a suffix to the version name, like Gradle's `versionNameSuffix`.
#[derive(Clone, Debug)]
pub struct VersionNameSuffix(pub String);

impl Stage for VersionNameSuffix {
    fn name(&self) -> &str {
        "version-name-suffix"
    }

    fn apply(&self, mut plan: ResolvedPlan) -> Result<ResolvedPlan, Error> {
        plan.version_name.push_str(&self.0);
        Ok(plan)
    }
}

fn invalid_override(key: &str, value: &str, reason: impl Into<String>) -> Error {
    Error::InvalidOverride {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn override_u32(key: &str, value: &str) -> Result<u32, Error> {
    value.trim().parse().map_err(
        |_| invalid_override(key, value, "expected a non-negative integer")
    )
}

fn override_bool(key: &str, value: &str) -> Result<bool, Error> {
    value.trim().parse().map_err(
        |_| invalid_override(key, value, "expected `true` or `false`")
    )
}

fn override_string(key: &str, value: &str) -> Result<String, Error> {
    if crate::manifest::is_quotable(value) {
        Ok(value.to_string())
    } else {
        Err(invalid_override(
            key,
            value,
            "value must not contain quotes, backslashes or control characters",
        ))
    }
}

// Merge variant and defaults
//
// Build the plan from the variant attributes, falling back to the defaults
// for anything the variant leaves unset. Signing profiles are looked up but
// not yet checked for existence, so overrides can still replace them.
struct Merge<'a> {
    application_id: String,
    namespace: Option<String>,
    min_sdk: u32,
    target_sdk: u32,
    compile_sdk: u32,
    multi_dex_enabled: bool,
    version_code: u32,
    version_name: String,
    ndk_version: Option<String>,
    java_version: u32,
    signing_profile: Option<&'a str>,
}

impl<'a> Merge<'a> {
    fn new(variant: &'a BuildVariant, defaults: &'a Defaults) -> Self {
        Self {
            application_id: variant.application_id.clone(),
            namespace: variant.namespace.clone(),
            min_sdk: variant.min_sdk,
            target_sdk: variant.target_sdk.unwrap_or(defaults.target_sdk),
            compile_sdk: variant.compile_sdk.unwrap_or(defaults.compile_sdk),
            multi_dex_enabled: variant.multi_dex.unwrap_or(defaults.multi_dex),
            version_code: variant.version_code.unwrap_or(defaults.version_code),
            version_name: variant.version_name.clone()
                .unwrap_or_else(|| defaults.version_name.clone()),
            ndk_version: variant.ndk_version.clone()
                .or_else(|| defaults.ndk_version.clone()),
            java_version: defaults.java_version,
            signing_profile: variant.signing_profile.as_deref()
                .or(defaults.signing_profile.as_deref()),
        }
    }

    fn apply(&mut self, overrides: &'a Overrides) -> Result<(), Error> {
        for (key, value) in overrides.iter() {
            tracing::debug!(key, value, "applying override");

            match key {
                "application-id" => self.application_id = override_string(key, value)?,
                "namespace" => self.namespace = Some(override_string(key, value)?),
                "min-sdk" => self.min_sdk = override_u32(key, value)?,
                "target-sdk" => self.target_sdk = override_u32(key, value)?,
                "compile-sdk" => self.compile_sdk = override_u32(key, value)?,
                "multi-dex" => self.multi_dex_enabled = override_bool(key, value)?,
                "version-code" => self.version_code = override_u32(key, value)?,
                "version-name" => self.version_name = override_string(key, value)?,
                "ndk-version" => self.ndk_version = Some(override_string(key, value)?),
                "java-version" => self.java_version = override_u32(key, value)?,
                // An empty profile name drops signing entirely.
                "signing-profile" => {
                    self.signing_profile = if value.is_empty() { None } else { Some(value) };
                },
                _ => return Err(invalid_override(key, value, "unknown key")),
            }
        }

        Ok(())
    }

    fn finish(
        self,
        manifest: &Manifest,
        variant: &str,
    ) -> Result<ResolvedPlan, Error> {
        validate::check_signing_profile(manifest, variant, self.signing_profile)?;
        let signing = self.signing_profile
            .and_then(|v| manifest.signing_profile(v))
            .cloned();

        let namespace = self.namespace
            .unwrap_or_else(|| self.application_id.clone());

        Ok(ResolvedPlan {
            variant: variant.to_string(),
            application_id: self.application_id,
            namespace: namespace,
            min_sdk: self.min_sdk,
            target_sdk: self.target_sdk,
            compile_sdk: self.compile_sdk,
            multi_dex_enabled: self.multi_dex_enabled,
            version_code: self.version_code,
            version_name: self.version_name,
            ndk_version: self.ndk_version,
            java_version: self.java_version,
            signing: signing,
            plugins: manifest.plugins().to_vec(),
            flutter_source: manifest.flutter_source().map(str::to_string),
        })
    }
}

// Stages declared by the variant itself. They run before caller stages.
fn variant_stages(variant: &BuildVariant) -> Vec<Box<dyn Stage>> {
    let mut stages: Vec<Box<dyn Stage>> = Vec::new();

    if let Some(v) = &variant.application_id_suffix {
        stages.push(Box::new(ApplicationIdSuffix(v.clone())));
    }
    if let Some(v) = &variant.version_name_suffix {
        stages.push(Box::new(VersionNameSuffix(v.clone())));
    }

    stages
}

/// Resolve build plan
///
/// Resolve the variant named `variant` of the manifest into a build plan,
/// using `defaults` for unset attributes and letting `overrides` take
/// precedence over everything. Only the stages declared by the variant are
/// run. See `resolve_with()` to add custom stages.
pub fn resolve(
    manifest: &Manifest,
    defaults: &Defaults,
    variant: &str,
    overrides: &Overrides,
) -> Result<ResolvedPlan, Error> {
    resolve_with(manifest, defaults, variant, overrides, &[])
}

/// Resolve build plan with custom stages
///
/// Like `resolve()`, but runs `stages` in order after the stages declared by
/// the variant. The final plan is checked against the manifest constraints,
/// so neither overrides nor stages can produce an inconsistent plan.
pub fn resolve_with(
    manifest: &Manifest,
    defaults: &Defaults,
    variant: &str,
    overrides: &Overrides,
    stages: &[Box<dyn Stage>],
) -> Result<ResolvedPlan, Error> {
    let build_variant = manifest.variant(variant)
        .ok_or_else(|| Error::UnknownVariant(variant.to_string()))?;

    let mut merge = Merge::new(build_variant, defaults);
    merge.apply(overrides)?;
    let mut plan = merge.finish(manifest, variant)?;

    let builtin = variant_stages(build_variant);
    for stage in builtin.iter().chain(stages.iter()) {
        tracing::debug!(variant, stage = stage.name(), "running stage");
        plan = stage.apply(plan)?;
    }

    validate::check_sdk_versions(variant, plan.min_sdk, plan.target_sdk, plan.compile_sdk)?;
    validate::check_identifier(variant, "applicationId", &plan.application_id)?;
    validate::check_identifier(variant, "namespace", &plan.namespace)?;

    tracing::info!(
        variant,
        application_id = %plan.application_id,
        min_sdk = plan.min_sdk,
        target_sdk = plan.target_sdk,
        compile_sdk = plan.compile_sdk,
        "resolved build plan"
    );

    Ok(plan)
}
