//! Manifest Validation
//!
//! Check the cross-field constraints of a parsed manifest. The manifest
//! parser only guarantees that required keys are present and values are
//! well-formed in isolation. This operation checks that each variant refers
//! to a declared signing profile, orders its SDK levels correctly, and
//! carries a proper application identifier.

use once_cell::sync::Lazy;
use regex::Regex;

// Reverse-domain-name application identifier as accepted by Android: two or
// more dot-separated segments, each starting with an ASCII letter.
static APPLICATION_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+$")
        .expect("application-id pattern must compile")
});

/// Validation Errors
///
/// This is the exhaustive list of constraint violations reported by the
/// validate operation. Each carries the name of the offending variant.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The variant refers to a signing profile that is not declared.
    #[error("variant `{variant}` refers to unknown signing profile `{profile}`")]
    UnknownSigningProfile {
        variant: String,
        profile: String,
    },
    /// The SDK levels of the variant are not ordered as
    /// `minSdk <= targetSdk <= compileSdk`.
    #[error(
        "variant `{variant}` requires minSdk ({min_sdk}) <= targetSdk ({target_sdk}) <= compileSdk ({compile_sdk})"
    )]
    SdkVersionConflict {
        variant: String,
        min_sdk: u32,
        target_sdk: u32,
        compile_sdk: u32,
    },
    /// The application identifier or namespace, named by `key`, is not a
    /// reverse-domain name.
    #[error("variant `{variant}` has invalid {key} `{value}`")]
    InvalidIdentifier {
        variant: String,
        key: &'static str,
        value: String,
    },
}

/// Outcome of `validate()`.
pub type ValidationResult = Result<(), Error>;

/// Check whether a string is a valid Android application identifier.
pub fn is_application_id(s: &str) -> bool {
    APPLICATION_ID.is_match(s)
}

pub(crate) fn check_signing_profile(
    manifest: &crate::manifest::Manifest,
    variant: &str,
    profile: Option<&str>,
) -> ValidationResult {
    match profile {
        Some(name) if manifest.signing_profile(name).is_none() => {
            Err(Error::UnknownSigningProfile {
                variant: variant.to_string(),
                profile: name.to_string(),
            })
        },
        _ => Ok(()),
    }
}

pub(crate) fn check_sdk_versions(
    variant: &str,
    min_sdk: u32,
    target_sdk: u32,
    compile_sdk: u32,
) -> ValidationResult {
    if min_sdk <= target_sdk && target_sdk <= compile_sdk {
        Ok(())
    } else {
        Err(Error::SdkVersionConflict {
            variant: variant.to_string(),
            min_sdk: min_sdk,
            target_sdk: target_sdk,
            compile_sdk: compile_sdk,
        })
    }
}

// Check `value` is a reverse-domain name. `key` names the attribute in the
// error, using the Gradle spelling.
pub(crate) fn check_identifier(
    variant: &str,
    key: &'static str,
    value: &str,
) -> ValidationResult {
    if is_application_id(value) {
        Ok(())
    } else {
        Err(Error::InvalidIdentifier {
            variant: variant.to_string(),
            key: key,
            value: value.to_string(),
        })
    }
}

/// Validate manifest
///
/// Check every variant of the manifest, in name order, against the signing,
/// SDK and identifier constraints. Attributes a variant does not set are
/// taken from the manifest defaults. The first violation is returned; the
/// manifest is not modified.
pub fn validate(manifest: &crate::manifest::Manifest) -> ValidationResult {
    validate_with(manifest, manifest.defaults())
}

/// Validate manifest against explicit defaults
///
/// Like `validate()`, but unset variant attributes are taken from
/// `defaults` rather than from the manifest. Use this with the same defaults
/// later passed to `op::resolve`.
pub fn validate_with(
    manifest: &crate::manifest::Manifest,
    defaults: &crate::manifest::Defaults,
) -> ValidationResult {
    for variant in manifest.variants() {
        let profile = variant.signing_profile.as_deref()
            .or(defaults.signing_profile.as_deref());

        check_signing_profile(manifest, &variant.name, profile)?;
        check_sdk_versions(
            &variant.name,
            variant.min_sdk,
            variant.target_sdk.unwrap_or(defaults.target_sdk),
            variant.compile_sdk.unwrap_or(defaults.compile_sdk),
        )?;
        check_identifier(&variant.name, "applicationId", &variant.application_id)?;
        if let Some(v) = &variant.namespace {
            check_identifier(&variant.name, "namespace", v)?;
        }

        tracing::debug!(variant = %variant.name, "variant is valid");
    }

    Ok(())
}
