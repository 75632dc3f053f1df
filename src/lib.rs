//! Android Build Plan
//!
//! This crate resolves the build variants of an Android application from a
//! declarative manifest into the parameters handed to the Android Gradle
//! build. It does not build anything itself. Compilation, signing and
//! packaging are left to Gradle, which receives the resolved parameters.
//!
//! Model
//! -----
//!
//! The manifest is a TOML-formatted file, usually called `android-build.toml`,
//! placed in the application repository. It declares:
//!
//!  * The ordered list of Gradle plugins applied to the build.
//!  * Global defaults for SDK levels, versioning and signing.
//!  * Named signing profiles, each referring to a keystore and key alias.
//!  * Named build variants (`debug`, `release`, ...) with their application
//!    identifier, SDK levels, signing profile and feature flags.
//!
//! Processing happens in four steps, each implemented by its own module:
//!
//!  1. [`manifest`] parses and verifies the document into an immutable
//!     [`manifest::Manifest`].
//!  2. [`op::validate`] checks cross-field constraints: signing references
//!     must resolve, SDK levels must be ordered as
//!     `minSdk <= targetSdk <= compileSdk`, and application identifiers must
//!     be reverse-domain names.
//!  3. [`op::resolve`] merges one variant with the defaults and caller
//!     overrides, then runs the ordered stage pipeline, yielding a
//!     [`op::resolve::ResolvedPlan`].
//!  4. [`op::emit`] flattens the plan into an [`op::emit::InvocationSpec`],
//!     which can be rendered as JSON, properties, or Gradle arguments.
//!
//! [`op::plan`] runs all steps in sequence.
//!
//! Every operation is a pure function of its arguments. In particular, the
//! defaults are an explicit argument to the resolver rather than global
//! state, and the process environment is never consulted.
//!
//! Manifest
//! --------
//!
//! ```toml
//! version = 1
//! plugins = ["com.android.application", "kotlin-android"]
//!
//! [defaults]
//! compile-sdk = 34
//! target-sdk = 33
//!
//! [signing.debug]
//! keystore = "debug.keystore"
//! alias = "androiddebugkey"
//!
//! [variant.debug]
//! application-id = "com.example.app"
//! min-sdk = 21
//! signing-profile = "debug"
//! application-id-suffix = ".debug"
//!
//! [variant.release]
//! application-id = "com.example.app"
//! min-sdk = 21
//! signing-profile = "debug"
//! ```

pub mod manifest;

/// Build Operations
///
/// The `op` module is a collection of all operations that can be performed via
/// the command-line interface. Each operation is implemented in a submodule
/// and can be used independently.
pub mod op {
    pub mod emit;
    pub mod plan;
    pub mod resolve;
    pub mod validate;
}
