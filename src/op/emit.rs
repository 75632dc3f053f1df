//! Invocation Parameters
//!
//! Flatten a resolved build plan into the parameter set handed to the
//! external build executor. The emitter is a pure transformation; writing
//! files or spawning Gradle is left to the caller.
//!
//! The parameter names follow the Android Gradle DSL (`applicationId`,
//! `minSdk`, ...). Signing parameters are grouped under `signing.`.

use serde;
use std::collections::BTreeMap;

use crate::op::resolve::ResolvedPlan;

/// Parameter Value
///
/// A single invocation parameter. Serializes to the matching JSON scalar.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum Param {
    Str(String),
    Int(u32),
    Bool(bool),
}

impl std::fmt::Display for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Param::Str(v) => f.write_str(v),
            Param::Int(v) => write!(f, "{}", v),
            Param::Bool(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Param::Str(v.to_string())
    }
}

impl From<String> for Param {
    fn from(v: String) -> Self {
        Param::Str(v)
    }
}

impl From<u32> for Param {
    fn from(v: u32) -> Self {
        Param::Int(v)
    }
}

impl From<bool> for Param {
    fn from(v: bool) -> Self {
        Param::Bool(v)
    }
}

// Escape a Java properties value
//
// Properties files are read as ISO-8859-1 and drop leading whitespace of
// values. Escape leading spaces and backslashes, and write everything outside
// of printable ASCII as `\uXXXX` UTF-16 code units.
fn escape_property(value: &str) -> String {
    let mut out = String::with_capacity(value.len());

    for (idx, c) in value.chars().enumerate() {
        match c {
            ' ' if idx == 0 => out.push_str("\\ "),
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x20'..='\x7e' => out.push(c),
            _ => {
                let mut buf = [0u16; 2];
                for unit in c.encode_utf16(&mut buf) {
                    out.push_str(&format!("\\u{:04x}", unit));
                }
            },
        }
    }

    out
}

// Quote a shell word
//
// Words consisting of only safe characters are returned as-is. Anything else
// is wrapped in single quotes, with embedded single quotes written as `'\''`.
fn quote_shell(word: &str) -> String {
    let safe = !word.is_empty() && word.chars().all(
        |v| v.is_ascii_alphanumeric() || "-_./=:,+@%".contains(v)
    );

    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', "'\\''"))
    }
}

/// Invocation Spec
///
/// Flat, sorted mapping of parameter names to values. Iteration order is
/// stable, so all renderings are deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct InvocationSpec {
    params: BTreeMap<String, Param>,
}

impl InvocationSpec {
    fn insert(&mut self, key: &str, value: impl Into<Param>) {
        self.params.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Param> {
        self.params.get(key)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Param)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Render as `KEY=VALUE` lines
    ///
    /// Produce the content of a Java properties file, one parameter per line.
    /// Values are escaped so a properties reader yields them unchanged,
    /// including leading whitespace and non-ASCII characters.
    pub fn to_properties(&self) -> String {
        let mut out = String::new();
        for (k, v) in self.iter() {
            out.push_str(k);
            out.push('=');
            out.push_str(&escape_property(&v.to_string()));
            out.push('\n');
        }
        out
    }

    /// Render as Gradle command-line arguments
    ///
    /// Produce a `--project-prop <prefix>.<KEY>=<VALUE>` argument pair for
    /// every parameter, suitable for `std::process::Command::args()`. With an
    /// empty prefix, the bare parameter name is used.
    pub fn to_gradle_args(&self, prefix: &str) -> Vec<std::ffi::OsString> {
        let mut args = Vec::with_capacity(self.len() * 2);

        for (k, v) in self.iter() {
            let mut arg = std::ffi::OsString::new();

            if !prefix.is_empty() {
                arg.push(prefix);
                arg.push(".");
            }
            arg.push(k);
            arg.push("=");
            arg.push(v.to_string());

            args.push(std::ffi::OsString::from("--project-prop"));
            args.push(arg);
        }

        args
    }

    /// Render as shell command-line
    ///
    /// Like `to_gradle_args()`, but produce one `--project-prop` pair per
    /// line, with every argument quoted for POSIX shells.
    pub fn to_gradle_command_line(&self, prefix: &str) -> String {
        let mut out = String::new();

        for pair in self.to_gradle_args(prefix).chunks(2) {
            let words: Vec<String> = pair.iter()
                .map(|v| quote_shell(&v.to_string_lossy()))
                .collect();
            out.push_str(&words.join(" "));
            out.push('\n');
        }

        out
    }
}

/// Emit invocation parameters
///
/// Flatten the plan into an `InvocationSpec`. Optional plan attributes
/// without a value are omitted, as are signing parameters of unsigned plans.
pub fn emit(plan: &ResolvedPlan) -> InvocationSpec {
    let mut spec = InvocationSpec::default();

    spec.insert("variant", plan.variant.as_str());
    spec.insert("applicationId", plan.application_id.as_str());
    spec.insert("namespace", plan.namespace.as_str());

    spec.insert("minSdk", plan.min_sdk);
    spec.insert("targetSdk", plan.target_sdk);
    spec.insert("compileSdk", plan.compile_sdk);

    spec.insert("multiDexEnabled", plan.multi_dex_enabled);

    spec.insert("versionCode", plan.version_code);
    spec.insert("versionName", plan.version_name.as_str());
    if let Some(v) = &plan.ndk_version {
        spec.insert("ndkVersion", v.as_str());
    }
    spec.insert("javaVersion", plan.java_version);

    if !plan.plugins.is_empty() {
        spec.insert("plugins", plan.plugins.join(","));
    }

    if let Some(v) = &plan.flutter_source {
        spec.insert("flutter.source", v.as_str());
    }

    if let Some(signing) = &plan.signing {
        spec.insert("signing.profile", signing.name.as_str());
        spec.insert("signing.keystore", signing.keystore.as_str());
        spec.insert("signing.alias", signing.alias.as_str());
        if let Some(v) = &signing.store_password_env {
            spec.insert("signing.storePasswordEnv", v.as_str());
        }
        if let Some(v) = &signing.key_password_env {
            spec.insert("signing.keyPasswordEnv", v.as_str());
        }
    }

    tracing::debug!(variant = %plan.variant, params = spec.len(), "emitted invocation spec");

    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Manifest;
    use crate::op::resolve::{resolve, Overrides};
    use pretty_assertions::assert_eq;

    fn plan(s: &str, variant: &str) -> ResolvedPlan {
        let m = Manifest::parse_str(s).unwrap();
        resolve(&m, m.defaults(), variant, &Overrides::new()).unwrap()
    }

    const DEBUG: &str = "
        version = 1
        [signing.debug]
        keystore = \"debug.keystore\"
        alias = \"androiddebugkey\"
        [variant.debug]
        application-id = \"com.example.app\"
        min-sdk = 21
        target-sdk = 33
        compile-sdk = 33
        signing-profile = \"debug\"
    ";

    // Verify the debug variant emits its SDK levels and identifiers.
    #[test]
    fn emit_debug() {
        let spec = emit(&plan(DEBUG, "debug"));

        assert_eq!(spec.get("applicationId"), Some(&Param::from("com.example.app")));
        assert_eq!(spec.get("minSdk"), Some(&Param::Int(21)));
        assert_eq!(spec.get("targetSdk"), Some(&Param::Int(33)));
        assert_eq!(spec.get("compileSdk"), Some(&Param::Int(33)));
        assert_eq!(spec.get("multiDexEnabled"), Some(&Param::Bool(false)));
        assert_eq!(spec.get("signing.alias"), Some(&Param::from("androiddebugkey")));
        assert_eq!(spec.get("ndkVersion"), None);
        assert_eq!(spec.get("plugins"), None);
    }

    // Verify unsigned plans carry no signing parameters.
    #[test]
    fn emit_unsigned() {
        let s = "
            version = 1
            plugins = [\"com.android.application\", \"kotlin-android\"]
            [variant.ci]
            application-id = \"com.example.app\"
            min-sdk = 24
            ndk-version = \"25.1.8937393\"
        ";
        let spec = emit(&plan(s, "ci"));

        assert!(spec.iter().all(|(k, _)| !k.starts_with("signing.")));
        assert_eq!(spec.get("ndkVersion"), Some(&Param::from("25.1.8937393")));
        assert_eq!(
            spec.get("plugins"),
            Some(&Param::from("com.android.application,kotlin-android")),
        );
    }

    // Verify the JSON rendering uses native scalars.
    #[test]
    fn emit_json() {
        let spec = emit(&plan(DEBUG, "debug"));
        let v = serde_json::to_value(&spec).unwrap();

        assert_eq!(v["minSdk"], serde_json::json!(21));
        assert_eq!(v["multiDexEnabled"], serde_json::json!(false));
        assert_eq!(v["applicationId"], serde_json::json!("com.example.app"));
    }

    // Verify the textual renderings
    //
    // Both renderings list the parameters in key order.
    #[test]
    fn emit_renderings() {
        let spec = emit(&plan(DEBUG, "debug"));

        let props = spec.to_properties();
        let lines: Vec<&str> = props.lines().collect();
        assert_eq!(lines.len(), spec.len());
        assert_eq!(lines[0], "applicationId=com.example.app");
        assert!(lines.contains(&"minSdk=21"));
        assert!(lines.contains(&"signing.keystore=debug.keystore"));

        let args = spec.to_gradle_args("android");
        assert_eq!(args.len(), spec.len() * 2);
        assert_eq!(args[0], "--project-prop");
        assert_eq!(args[1], "android.applicationId=com.example.app");

        let args = spec.to_gradle_args("");
        assert_eq!(args[1], "applicationId=com.example.app");
    }

    // Verify properties escaping
    //
    // Leading whitespace and non-ASCII characters must survive a round
    // through a Java properties reader.
    #[test]
    fn emit_properties_escaping() {
        assert_eq!(escape_property(" 1.0"), "\\ 1.0");
        assert_eq!(escape_property("1.0 beta"), "1.0 beta");
        assert_eq!(escape_property("Caf\u{e9}"), "Caf\\u00e9");
        assert_eq!(escape_property("\u{1f600}"), "\\ud83d\\ude00");

        let s = DEBUG.replace("compile-sdk = 33", "compile-sdk = 33\nversion-name = \" 1.0 \u{e9}\"");
        let props = emit(&plan(&s, "debug")).to_properties();
        assert!(props.lines().any(|v| v == "versionName=\\ 1.0 \\u00e9"));
    }

    // Verify shell quoting of the Gradle command-line
    #[test]
    fn emit_gradle_command_line() {
        let s = DEBUG.replace("debug.keystore", "my keys/debug.keystore");
        let out = emit(&plan(&s, "debug")).to_gradle_command_line("android");

        assert!(out.lines().any(|v| v == "--project-prop android.minSdk=21"));
        assert!(out.lines().any(|v| v == "--project-prop 'android.signing.keystore=my keys/debug.keystore'"));
        assert_eq!(quote_shell("it's"), "'it'\\''s'");
        assert_eq!(quote_shell(""), "''");
    }

    // Verify the Flutter source is passed through.
    #[test]
    fn emit_flutter_source() {
        let s = format!("{}[flutter]\nsource = \"../..\"\n", DEBUG);
        let spec = emit(&plan(&s, "debug"));

        assert_eq!(spec.get("flutter.source"), Some(&Param::from("../..")));
        assert_eq!(emit(&plan(DEBUG, "debug")).get("flutter.source"), None);
    }
}
