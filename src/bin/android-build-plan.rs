//! Android Build Plan Tooling
//!
//! This is the entry-point of `android-build-plan`, a command-line tool to
//! resolve the build variants of an Android application. Its main input is
//! the `android-build.toml` manifest, which declares the variants, their
//! signing profiles and the global defaults.
//!
//! This CLI is mainly a dispatcher of the operations available in
//! `android_build_plan::op::*`. It is a simple clap-based CLI that forwards
//! the arguments to the library and prints the results to STDOUT. Diagnostics
//! go to STDERR via `tracing`, filtered by `RUST_LOG`.

use android_build_plan::{manifest, op};
use clap;

struct Cli {
    cmd: clap::Command,
}

fn arg_variant() -> clap::Arg {
    clap::Arg::new("variant")
        .long("variant")
        .value_name("NAME")
        .help("Name of the build variant to operate on")
        .required(true)
}

fn arg_set() -> clap::Arg {
    clap::Arg::new("set")
        .long("set")
        .value_name("KEY=VALUE")
        .help("Override a variant attribute, taking precedence over the manifest")
        .action(clap::ArgAction::Append)
}

// Update a file if required
//
// Write the given content to the specified file, but only if the file content
// does not already match. This keeps the timestamp stable, so Gradle does not
// consider its inputs changed when the parameters are the same.
fn update_file(
    path: &std::path::Path,
    content: &str,
) -> Result<(), std::io::Error> {
    match std::fs::read_to_string(path) {
        Ok(old) if old == content => {
            tracing::debug!(path = ?path, "output is up to date");
            Ok(())
        },
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => std::fs::write(path, content),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("android_build_plan=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

impl Cli {
    fn new() -> Self {
        let mut cmd;

        cmd = clap::Command::new("android-build-plan")
            .propagate_version(true)
            .subcommand_required(true)
            .about("Android Build Plan Tooling")
            .long_about("Resolve Android build variants into Gradle invocation parameters")
            .version(clap::crate_version!());

        cmd = cmd.arg(
            clap::Arg::new("manifest")
                .long("manifest")
                .value_name("PATH")
                .help("Path to the build manifest relative to the working directory")
                .default_value("./android-build.toml")
                .value_parser(clap::builder::ValueParser::os_string())
        );

        cmd = cmd.arg(
            clap::Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log resolution steps to STDERR")
                .global(true)
                .action(clap::ArgAction::SetTrue)
        );

        cmd = cmd.subcommand(
            clap::Command::new("validate")
                .about("Check the manifest for constraint violations")
        );

        cmd = cmd.subcommand(
            clap::Command::new("resolve")
                .about("Print the resolved build plan of a variant as JSON")
                .arg(arg_variant())
                .arg(arg_set())
        );

        cmd = cmd.subcommand(
            clap::Command::new("emit")
                .about("Print the invocation parameters of a variant")
                .arg(arg_variant())
                .arg(arg_set())
                .arg(
                    clap::Arg::new("format")
                        .long("format")
                        .value_name("FORMAT")
                        .help("Output format of the parameters")
                        .default_value("json")
                        .value_parser(["json", "properties", "gradle"])
                )
                .arg(
                    clap::Arg::new("output")
                        .long("output")
                        .value_name("PATH")
                        .help("Write the parameters to a file instead of STDOUT")
                        .value_parser(clap::builder::ValueParser::os_string())
                )
                .arg(
                    clap::Arg::new("prefix")
                        .long("prefix")
                        .value_name("PREFIX")
                        .help("Prefix of Gradle project properties")
                        .default_value("android")
                )
        );

        Self {
            cmd: cmd,
        }
    }

    fn manifest(
        &self,
        m: &clap::ArgMatches,
    ) -> Result<manifest::Manifest, u8> {
        let path = m.get_one::<std::ffi::OsString>("manifest")
            .expect("Manifest path lacks a value");

        manifest::Manifest::parse_path(std::path::Path::new(path)).map_err(
            |e| {
                eprintln!("Cannot load build manifest {:?}: {}", path, e);
                1
            }
        )
    }

    fn overrides(
        &self,
        m_op: &clap::ArgMatches,
    ) -> Result<op::resolve::Overrides, u8> {
        let assignments = m_op.get_many::<String>("set")
            .into_iter()
            .flatten();

        op::resolve::Overrides::from_assignments(assignments).map_err(
            |e| {
                eprintln!("Cannot parse overrides: {}", e);
                2
            }
        )
    }

    fn plan(
        &self,
        m: &clap::ArgMatches,
        m_op: &clap::ArgMatches,
    ) -> Result<op::plan::Plan, u8> {
        let manifest = self.manifest(m)?;
        let overrides = self.overrides(m_op)?;
        let variant = m_op.get_one::<String>("variant")
            .expect("Variant-flag lacks a value");

        op::plan::plan(&manifest, manifest.defaults(), variant, &overrides, &[]).map_err(
            |e| {
                eprintln!("Cannot plan variant '{}': {}", variant, e);
                1
            }
        )
    }

    fn json<T: serde::Serialize>(&self, value: &T) -> Result<String, u8> {
        serde_json::to_string_pretty(value).map_err(
            |e| {
                eprintln!("Cannot serialize output: {}", e);
                1
            }
        )
    }

    fn op_validate(
        &self,
        m: &clap::ArgMatches,
    ) -> Result<(), u8> {
        let manifest = self.manifest(m)?;

        match op::validate::validate(&manifest) {
            Err(e) => {
                eprintln!("Manifest is invalid: {}", e);
                Err(1)
            },
            Ok(()) => {
                tracing::info!(variants = manifest.variants().count(), "manifest is valid");
                Ok(())
            },
        }
    }

    fn op_resolve(
        &self,
        m: &clap::ArgMatches,
        m_op: &clap::ArgMatches,
    ) -> Result<(), u8> {
        let plan = self.plan(m, m_op)?;
        println!("{}", self.json(&plan.resolved)?);
        Ok(())
    }

    fn op_emit(
        &self,
        m: &clap::ArgMatches,
        m_op: &clap::ArgMatches,
    ) -> Result<(), u8> {
        let plan = self.plan(m, m_op)?;
        let format = m_op.get_one::<String>("format")
            .expect("Format-flag lacks a value");
        let prefix = m_op.get_one::<String>("prefix")
            .expect("Prefix-flag lacks a value");

        let content = match format.as_str() {
            "properties" => plan.invocation.to_properties(),
            "gradle" => plan.invocation.to_gradle_command_line(prefix),
            _ => self.json(&plan.invocation)? + "\n",
        };

        match m_op.get_one::<std::ffi::OsString>("output") {
            Some(path) => update_file(std::path::Path::new(path), &content).map_err(
                |e| {
                    eprintln!("Cannot write {:?}: {}", path, e);
                    1
                }
            ),
            None => {
                print!("{}", content);
                Ok(())
            },
        }
    }

    fn run(mut self) -> Result<(), u8> {
        let (m, r);

        r = self.cmd.try_get_matches_from_mut(
            std::env::args_os(),
        );

        match r {
            Ok(v) => m = v,
            Err(e) => {
                return match e.kind() {
                    clap::error::ErrorKind::DisplayHelp |
                    clap::error::ErrorKind::DisplayVersion => {
                        e.print().expect("Cannot write to STDERR");
                        Ok(())
                    },
                    _ => {
                        e.print().expect("Cannot write to STDERR");
                        Err(2)
                    }
                }
            }
        }

        init_logging(m.get_flag("verbose"));

        match m.subcommand() {
            Some(("validate", _)) => self.op_validate(&m),
            Some(("resolve", m_op)) => self.op_resolve(&m, m_op),
            Some(("emit", m_op)) => self.op_emit(&m, m_op),
            _ => std::unreachable!(),
        }
    }
}

fn main() -> std::process::ExitCode {
    match Cli::new().run() {
        Ok(()) => 0.into(),
        Err(v) => v.into(),
    }
}
