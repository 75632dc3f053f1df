//! Build Manifest
//!
//! This is the typed model of the Android build manifest. The manifest is a
//! TOML document declaring the build variants of an application, the signing
//! profiles they refer to, and the global defaults shared by all variants.
//!
//! Parsing happens in two steps. First, the document is converted into the
//! `Raw*` types via `serde`, which only verifies syntactic correctness.
//! Second, the raw content is verified and converted into the immutable
//! `Manifest` type. Only the latter is consumed by the operations in `op`.

use serde;
use std::collections::BTreeMap;
use toml;

/// Built-in `compileSdk` if neither manifest nor caller provides one.
pub const DEFAULT_COMPILE_SDK: u32 = 34;
/// Built-in `targetSdk` if neither manifest nor caller provides one.
pub const DEFAULT_TARGET_SDK: u32 = 34;
/// Built-in JVM bytecode level.
pub const DEFAULT_JAVA_VERSION: u32 = 11;

/// Gradle plugin of the Flutter toolchain.
pub const FLUTTER_PLUGIN: &str = "dev.flutter.flutter-gradle-plugin";
/// Plugins the Flutter plugin must be applied after.
pub const FLUTTER_PLUGIN_PREDECESSORS: &[&str] = &["com.android.application", "kotlin-android"];

/// Manifest Errors
///
/// This is the exhaustive list of possible errors raised when loading a
/// manifest. See each error for details.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading the manifest file failed with the given error.
    #[error("cannot read manifest {path:?}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The manifest is not valid TOML, or its values have the wrong type.
    #[error("cannot parse manifest: {0}")]
    Syntax(#[from] toml::de::Error),
    /// The manifest is syntactically valid, but a required key is missing or
    /// a value is not acceptable at the given location.
    #[error("malformed manifest at `{location}`: {reason}")]
    MalformedConfig {
        location: String,
        reason: String,
    },
}

impl Error {
    fn malformed(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedConfig {
            location: location.into(),
            reason: reason.into(),
        }
    }

    fn missing(location: impl Into<String>) -> Self {
        Self::malformed(location, "required key is missing")
    }
}

/// Raw Defaults Table
///
/// Sub-type of `Raw` representing the `[defaults]` table. Every entry is
/// optional and falls back to the built-in default.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawDefaults {
    pub target_sdk: Option<u32>,
    pub compile_sdk: Option<u32>,
    pub multi_dex: Option<bool>,
    pub version_code: Option<u32>,
    pub version_name: Option<String>,
    pub ndk_version: Option<String>,
    pub java_version: Option<u32>,
    pub signing_profile: Option<String>,
}

/// Raw Signing Table
///
/// Sub-type of `Raw` representing one `[signing.<name>]` table.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawSigning {
    /// Path to the keystore. Opaque to the resolver.
    pub keystore: Option<String>,
    /// Alias of the key inside the keystore.
    pub alias: Option<String>,
    /// Name of the environment variable holding the store password. Only
    /// forwarded, never read.
    pub store_password_env: Option<String>,
    /// Name of the environment variable holding the key password.
    pub key_password_env: Option<String>,
}

/// Raw Flutter Table
///
/// Sub-type of `Raw` representing the `[flutter]` table.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawFlutter {
    /// Path to the Flutter project root, relative to the Android project.
    pub source: Option<String>,
}

/// Raw Variant Table
///
/// Sub-type of `Raw` representing one `[variant.<name>]` table. The options
/// are one-to-one mappings of their equivalents in the Android Gradle
/// `defaultConfig` and `buildTypes` blocks.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawVariant {
    pub application_id: Option<String>,
    pub namespace: Option<String>,

    pub min_sdk: Option<u32>,
    pub target_sdk: Option<u32>,
    pub compile_sdk: Option<u32>,

    pub signing_profile: Option<String>,
    pub multi_dex: Option<bool>,

    pub version_code: Option<u32>,
    pub version_name: Option<String>,
    pub ndk_version: Option<String>,

    pub application_id_suffix: Option<String>,
    pub version_name_suffix: Option<String>,
}

/// Raw Manifest Content
///
/// This type contains the raw manifest content as parsed by `toml` and
/// converted into rust types via `serde`.
///
/// Note that content of the type is not verified other than for syntactic
/// correctness required by the given types. Semantic correctness is verified
/// when converting into a `Manifest`.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Raw {
    /// Version of the manifest format. Only version `1` is currently
    /// supported.
    pub version: u32,

    /// Ordered list of Gradle plugin identifiers applied to the build.
    #[serde(default)]
    pub plugins: Vec<String>,
    /// Global defaults shared by all variants.
    pub defaults: Option<RawDefaults>,
    /// Flutter integration, if the application is built with Flutter.
    pub flutter: Option<RawFlutter>,
    /// Signing profiles indexed by name.
    #[serde(default)]
    pub signing: BTreeMap<String, RawSigning>,
    /// Build variants indexed by name.
    #[serde(default)]
    pub variant: BTreeMap<String, RawVariant>,
}

impl Raw {
    fn parse_str(content: &str) -> Result<Self, Error> {
        Ok(toml::from_str(content)?)
    }
}

/// Global Defaults
///
/// Values used for every variant attribute a variant does not set itself.
/// The resolver receives this explicitly, so callers can substitute their own
/// defaults instead of the ones declared in the manifest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Defaults {
    pub target_sdk: u32,
    pub compile_sdk: u32,
    pub multi_dex: bool,
    pub version_code: u32,
    pub version_name: String,
    pub ndk_version: Option<String>,
    pub java_version: u32,
    pub signing_profile: Option<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            target_sdk: DEFAULT_TARGET_SDK,
            compile_sdk: DEFAULT_COMPILE_SDK,
            multi_dex: false,
            version_code: 1,
            version_name: "1.0".to_string(),
            ndk_version: None,
            java_version: DEFAULT_JAVA_VERSION,
            signing_profile: None,
        }
    }
}

impl Defaults {
    fn from_raw(raw: RawDefaults) -> Self {
        let builtin = Self::default();

        Self {
            target_sdk: raw.target_sdk.unwrap_or(builtin.target_sdk),
            compile_sdk: raw.compile_sdk.unwrap_or(builtin.compile_sdk),
            multi_dex: raw.multi_dex.unwrap_or(builtin.multi_dex),
            version_code: raw.version_code.unwrap_or(builtin.version_code),
            version_name: raw.version_name.unwrap_or(builtin.version_name),
            ndk_version: raw.ndk_version,
            java_version: raw.java_version.unwrap_or(builtin.java_version),
            signing_profile: raw.signing_profile,
        }
    }
}

/// Signing Profile
///
/// A named reference to the credentials used to sign a build artifact. The
/// strings are handed to the build executor verbatim.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningProfile {
    pub name: String,
    pub keystore: String,
    pub alias: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_password_env: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_password_env: Option<String>,
}

/// Build Variant
///
/// A named build configuration as declared in the manifest. Optional
/// attributes are left unset here and filled in from the defaults by the
/// resolver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildVariant {
    pub name: String,
    pub application_id: String,
    pub namespace: Option<String>,

    pub min_sdk: u32,
    pub target_sdk: Option<u32>,
    pub compile_sdk: Option<u32>,

    pub signing_profile: Option<String>,
    pub multi_dex: Option<bool>,

    pub version_code: Option<u32>,
    pub version_name: Option<String>,
    pub ndk_version: Option<String>,

    pub application_id_suffix: Option<String>,
    pub version_name_suffix: Option<String>,
}

/// Manifest Abstraction
///
/// This type represents a valid and verified manifest. Unlike `Raw`, all
/// required keys are present and all strings are safe to interpolate into
/// build files. The content is immutable once parsed.
#[derive(Clone, Debug)]
pub struct Manifest {
    plugins: Vec<String>,
    flutter_source: Option<String>,
    defaults: Defaults,
    signing: BTreeMap<String, SigningProfile>,
    variants: BTreeMap<String, BuildVariant>,
}

// Check whether a string is a valid identifier
//
// This verifies that the given string consists of only alphanumeric
// characters plus `-`, `_`. Empty identifiers are rejected.
fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(
        |v| v.is_alphanumeric() || v == '-' || v == '_'
    )
}

// Check whether a string contains no quotes or escapes
//
// Strings passing this check can be interpolated into Gradle and properties
// files without escaping.
pub(crate) fn is_quotable(s: &str) -> bool {
    s.chars().all(
        |v| !v.is_control()
            && v != '\\'
            && v != '\''
            && v != '"'
    )
}

// Require an optional string to be quotable, if present.
fn check_quotable(location: String, value: &Option<String>) -> Result<(), Error> {
    match value {
        Some(v) if !is_quotable(v) => Err(Error::malformed(
            location,
            "value must not contain quotes, backslashes or control characters",
        )),
        _ => Ok(()),
    }
}

// Verify plugin order
//
// The Flutter plugin configures the Android build and thus has to be applied
// after the Android and Kotlin plugins, if those are listed.
fn verify_plugin_order(plugins: &[String]) -> Result<(), Error> {
    let flutter = match plugins.iter().position(|v| v == FLUTTER_PLUGIN) {
        Some(v) => v,
        None => return Ok(()),
    };

    for (idx, plugin) in plugins.iter().enumerate().skip(flutter + 1) {
        if FLUTTER_PLUGIN_PREDECESSORS.contains(&plugin.as_str()) {
            return Err(Error::malformed(
                format!("plugins[{}]", flutter),
                format!("`{}` must be applied after `{}` (plugins[{}])", FLUTTER_PLUGIN, plugin, idx),
            ));
        }
    }

    Ok(())
}

fn verify_defaults(raw: &RawDefaults) -> Result<(), Error> {
    check_quotable("defaults.version-name".to_string(), &raw.version_name)?;
    check_quotable("defaults.ndk-version".to_string(), &raw.ndk_version)?;
    Ok(())
}

fn verify_signing(name: &str, raw: RawSigning) -> Result<SigningProfile, Error> {
    let table = format!("signing.{}", name);

    if !is_identifier(name) {
        return Err(Error::malformed(table, "profile name must be an identifier"));
    }

    check_quotable(format!("{}.keystore", table), &raw.keystore)?;
    check_quotable(format!("{}.alias", table), &raw.alias)?;
    check_quotable(format!("{}.store-password-env", table), &raw.store_password_env)?;
    check_quotable(format!("{}.key-password-env", table), &raw.key_password_env)?;

    let keystore = raw.keystore
        .ok_or_else(|| Error::missing(format!("{}.keystore", table)))?;
    let alias = raw.alias
        .ok_or_else(|| Error::missing(format!("{}.alias", table)))?;

    Ok(SigningProfile {
        name: name.to_string(),
        keystore: keystore,
        alias: alias,
        store_password_env: raw.store_password_env,
        key_password_env: raw.key_password_env,
    })
}

fn verify_variant(name: &str, raw: RawVariant) -> Result<BuildVariant, Error> {
    let table = format!("variant.{}", name);

    if !is_identifier(name) {
        return Err(Error::malformed(table, "variant name must be an identifier"));
    }

    check_quotable(format!("{}.application-id", table), &raw.application_id)?;
    check_quotable(format!("{}.namespace", table), &raw.namespace)?;
    check_quotable(format!("{}.version-name", table), &raw.version_name)?;
    check_quotable(format!("{}.ndk-version", table), &raw.ndk_version)?;
    check_quotable(format!("{}.application-id-suffix", table), &raw.application_id_suffix)?;
    check_quotable(format!("{}.version-name-suffix", table), &raw.version_name_suffix)?;

    let application_id = raw.application_id
        .ok_or_else(|| Error::missing(format!("{}.application-id", table)))?;
    let min_sdk = raw.min_sdk
        .ok_or_else(|| Error::missing(format!("{}.min-sdk", table)))?;

    Ok(BuildVariant {
        name: name.to_string(),
        application_id: application_id,
        namespace: raw.namespace,
        min_sdk: min_sdk,
        target_sdk: raw.target_sdk,
        compile_sdk: raw.compile_sdk,
        signing_profile: raw.signing_profile,
        multi_dex: raw.multi_dex,
        version_code: raw.version_code,
        version_name: raw.version_name,
        ndk_version: raw.ndk_version,
        application_id_suffix: raw.application_id_suffix,
        version_name_suffix: raw.version_name_suffix,
    })
}

impl Manifest {
    /// Parse manifest from raw
    ///
    /// Take a raw representation of the manifest and perform post-parsing
    /// verification, ensuring the final manifest will not contain invalid
    /// entries. Cross-field constraints (SDK ordering, signing references,
    /// identifier format) are left to `op::validate`.
    pub fn from_raw(raw: Raw) -> Result<Self, Error> {
        // We only support version '1'. Any other version number is explicitly
        // defined to be incompatible. Unknown keys are accepted and ignored.
        if raw.version != 1 {
            return Err(Error::malformed(
                "version",
                format!("unsupported manifest version {}", raw.version),
            ));
        }

        let mut plugins: Vec<String> = Vec::with_capacity(raw.plugins.len());
        for (idx, plugin) in raw.plugins.into_iter().enumerate() {
            let location = format!("plugins[{}]", idx);
            if plugin.is_empty() || !is_quotable(&plugin) {
                return Err(Error::malformed(location, "invalid plugin identifier"));
            }
            if plugins.contains(&plugin) {
                return Err(Error::malformed(
                    location,
                    format!("plugin `{}` is listed twice", plugin),
                ));
            }
            plugins.push(plugin);
        }
        verify_plugin_order(&plugins)?;

        let flutter_source = raw.flutter.and_then(|v| v.source);
        check_quotable("flutter.source".to_string(), &flutter_source)?;

        let raw_defaults = raw.defaults.unwrap_or_default();
        verify_defaults(&raw_defaults)?;
        let defaults = Defaults::from_raw(raw_defaults);

        let mut signing = BTreeMap::new();
        for (name, v) in raw.signing {
            let profile = verify_signing(&name, v)?;
            signing.insert(name, profile);
        }

        if raw.variant.is_empty() {
            return Err(Error::malformed("variant", "at least one variant must be declared"));
        }

        let mut variants = BTreeMap::new();
        for (name, v) in raw.variant {
            let variant = verify_variant(&name, v)?;
            variants.insert(name, variant);
        }

        tracing::debug!(
            variants = variants.len(),
            profiles = signing.len(),
            plugins = plugins.len(),
            "parsed manifest"
        );

        Ok(
            Self {
                plugins: plugins,
                flutter_source: flutter_source,
                defaults: defaults,
                signing: signing,
                variants: variants,
            }
        )
    }

    /// Parse manifest from string
    ///
    /// Parse the given string as a literal manifest in TOML representation.
    /// Content is verified and invalid manifests are refused.
    pub fn parse_str(content: &str) -> Result<Self, Error> {
        Raw::parse_str(content).and_then(Self::from_raw)
    }

    /// Parse manifest from file-system
    ///
    /// Open the specified file and parse it as a manifest. The file is
    /// completely read into memory and closed again before parsing.
    pub fn parse_path(path: &std::path::Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(
            |v| Error::Io {
                path: path.to_path_buf(),
                source: v,
            }
        )?;

        Self::parse_str(&content)
    }

    /// Ordered list of declared plugins.
    pub fn plugins(&self) -> &[String] {
        &self.plugins
    }

    /// Path to the Flutter project root, if declared.
    pub fn flutter_source(&self) -> Option<&str> {
        self.flutter_source.as_deref()
    }

    /// Defaults declared in the manifest, completed with built-in values.
    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// Signing profiles indexed by name.
    pub fn signing_profiles(&self) -> &BTreeMap<String, SigningProfile> {
        &self.signing
    }

    /// Look up a signing profile by name.
    pub fn signing_profile(&self, name: &str) -> Option<&SigningProfile> {
        self.signing.get(name)
    }

    /// Iterate all variants in name order.
    pub fn variants(&self) -> impl Iterator<Item = &BuildVariant> {
        self.variants.values()
    }

    /// Look up a variant by name.
    pub fn variant(&self, name: &str) -> Option<&BuildVariant> {
        self.variants.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "
        version = 1
        [variant.debug]
        application-id = \"com.example.app\"
        min-sdk = 21
    ";

    // Verify basic parsing of `Raw`
    //
    // Raw parsing only cares for syntax, so neither the version nor missing
    // variants are refused at this level.
    #[test]
    fn raw_parse_minimal() {
        let r = Raw::parse_str("version = 12345678").unwrap();

        assert_eq!(r.version, 12345678);
        assert!(r.variant.is_empty());
        assert!(r.plugins.is_empty());
    }

    // Verify basic parsing of `Manifest`
    //
    // A single variant with only the required keys must parse, and all
    // defaults must fall back to their built-in values.
    #[test]
    fn manifest_parse_minimal() {
        let m = Manifest::parse_str(MINIMAL).unwrap();

        let v = m.variant("debug").unwrap();
        assert_eq!(v.application_id, "com.example.app");
        assert_eq!(v.min_sdk, 21);
        assert_eq!(v.target_sdk, None);
        assert_eq!(m.defaults(), &Defaults::default());
        assert!(m.signing_profiles().is_empty());
    }

    // Verify parsing of unknown manifest versions
    #[test]
    fn manifest_parse_unknown_version() {
        let s = MINIMAL.replace("version = 1", "version = 2");

        assert!(matches!(
            Manifest::parse_str(&s),
            Err(Error::MalformedConfig { ref location, .. }) if location == "version",
        ));
    }

    // Verify that manifests without variants are refused.
    #[test]
    fn manifest_parse_no_variant() {
        assert!(matches!(
            Manifest::parse_str("version = 1"),
            Err(Error::MalformedConfig { ref location, .. }) if location == "variant",
        ));
    }

    // Verify required variant keys
    //
    // Both `application-id` and `min-sdk` are required, and the error must
    // name the offending key.
    #[test]
    fn manifest_parse_required_keys() {
        let s = "
            version = 1
            [variant.release]
            min-sdk = 21
        ";

        match Manifest::parse_str(s) {
            Err(Error::MalformedConfig { location, .. }) => {
                assert_eq!(location, "variant.release.application-id");
            },
            v => panic!("unexpected result: {:?}", v),
        }

        let s = "
            version = 1
            [variant.release]
            application-id = \"com.example.app\"
        ";

        match Manifest::parse_str(s) {
            Err(Error::MalformedConfig { location, .. }) => {
                assert_eq!(location, "variant.release.min-sdk");
            },
            v => panic!("unexpected result: {:?}", v),
        }
    }

    // Verify type errors are reported as syntax errors.
    #[test]
    fn manifest_parse_wrong_type() {
        let s = MINIMAL.replace("min-sdk = 21", "min-sdk = \"21\"");

        assert!(matches!(Manifest::parse_str(&s), Err(Error::Syntax(_))));
        assert!(matches!(Manifest::parse_str("version = "), Err(Error::Syntax(_))));
    }

    // Verify quoting restrictions
    //
    // Strings interpolated into build files must not contain quotes or
    // control characters.
    #[test]
    fn manifest_parse_unquotable() {
        let s = MINIMAL.replace("com.example.app", "com.example.\\\"app");
        assert!(matches!(Manifest::parse_str(&s), Err(Error::MalformedConfig { .. })));

        let s = format!("{}version-name = \"1.0\\n\"\n", MINIMAL);
        assert!(matches!(Manifest::parse_str(&s), Err(Error::MalformedConfig { .. })));
    }

    // Verify parsing of signing profiles
    //
    // Profiles require both a keystore and an alias. Password environment
    // variables are optional and forwarded verbatim.
    #[test]
    fn manifest_parse_signing() {
        let s = format!(
            "{}{}",
            MINIMAL,
            "
            [signing.release]
            keystore = \"keys/release.jks\"
            alias = \"upload\"
            store-password-env = \"RELEASE_STORE_PASSWORD\"
            ",
        );

        let m = Manifest::parse_str(&s).unwrap();
        let p = m.signing_profile("release").unwrap();
        assert_eq!(p.keystore, "keys/release.jks");
        assert_eq!(p.alias, "upload");
        assert_eq!(p.store_password_env.as_deref(), Some("RELEASE_STORE_PASSWORD"));
        assert_eq!(p.key_password_env, None);

        let s = format!("{}[signing.release]\nkeystore = \"a.jks\"\n", MINIMAL);
        match Manifest::parse_str(&s) {
            Err(Error::MalformedConfig { location, .. }) => {
                assert_eq!(location, "signing.release.alias");
            },
            v => panic!("unexpected result: {:?}", v),
        }
    }

    // Verify parsing of defaults and plugins
    #[test]
    fn manifest_parse_defaults_plugins() {
        let s = format!(
            "{}{}",
            "
            plugins = [\"com.android.application\", \"kotlin-android\"]
            [defaults]
            compile-sdk = 33
            multi-dex = true
            signing-profile = \"debug\"
            ",
            MINIMAL.replace("version = 1", ""),
        );
        let s = format!("version = 1\n{}", s);

        let m = Manifest::parse_str(&s).unwrap();
        assert_eq!(m.plugins(), &["com.android.application", "kotlin-android"]);
        assert_eq!(m.defaults().compile_sdk, 33);
        assert_eq!(m.defaults().target_sdk, DEFAULT_TARGET_SDK);
        assert!(m.defaults().multi_dex);
        assert_eq!(m.defaults().signing_profile.as_deref(), Some("debug"));

        let s = format!("plugins = [\"a\", \"a\"]\n{}", MINIMAL);
        assert!(matches!(Manifest::parse_str(&s), Err(Error::MalformedConfig { .. })));
    }

    // Verify plugin order
    //
    // The Flutter plugin must follow the Android and Kotlin plugins. The
    // error points at the Flutter plugin entry.
    #[test]
    fn manifest_parse_plugin_order() {
        let s = format!(
            "plugins = [\"{}\", \"kotlin-android\", \"com.android.application\"]\n{}",
            FLUTTER_PLUGIN,
            MINIMAL,
        );

        match Manifest::parse_str(&s) {
            Err(Error::MalformedConfig { location, .. }) => {
                assert_eq!(location, "plugins[0]");
            },
            v => panic!("unexpected result: {:?}", v),
        }

        let s = format!(
            "plugins = [\"com.android.application\", \"{}\", \"kotlin-android\"]\n{}",
            FLUTTER_PLUGIN,
            MINIMAL,
        );
        assert!(matches!(
            Manifest::parse_str(&s),
            Err(Error::MalformedConfig { ref location, .. }) if location == "plugins[1]",
        ));

        let s = format!(
            "plugins = [\"com.android.application\", \"kotlin-android\", \"{}\"]\n{}",
            FLUTTER_PLUGIN,
            MINIMAL,
        );
        assert_eq!(Manifest::parse_str(&s).unwrap().plugins().len(), 3);

        let s = format!("plugins = [\"{}\", \"com.example.other\"]\n{}", FLUTTER_PLUGIN, MINIMAL);
        assert!(Manifest::parse_str(&s).is_ok());
    }

    // Verify the Flutter source path is carried and checked.
    #[test]
    fn manifest_parse_flutter_source() {
        let s = format!("{}[flutter]\nsource = \"../..\"\n", MINIMAL);
        assert_eq!(Manifest::parse_str(&s).unwrap().flutter_source(), Some("../.."));

        assert_eq!(Manifest::parse_str(MINIMAL).unwrap().flutter_source(), None);

        let s = format!("{}[flutter]\nsource = \"a\\tb\"\n", MINIMAL);
        assert!(matches!(Manifest::parse_str(&s), Err(Error::MalformedConfig { .. })));
    }

    // Verify variant names must be identifiers.
    #[test]
    fn manifest_parse_variant_name() {
        let s = MINIMAL.replace("[variant.debug]", "[variant.\"de bug\"]");

        assert!(matches!(Manifest::parse_str(&s), Err(Error::MalformedConfig { .. })));
    }

    // Verify loading from the file-system
    #[test]
    fn manifest_parse_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("android-build.toml");

        assert!(matches!(Manifest::parse_path(&path), Err(Error::Io { .. })));

        std::fs::write(&path, MINIMAL).unwrap();
        let m = Manifest::parse_path(&path).unwrap();
        assert_eq!(m.variants().count(), 1);
    }
}
