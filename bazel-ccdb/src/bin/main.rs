// SPDX-License-Identifier: GPL-3.0-or-later

use bazel_ccdb::{args, config, context, modes, workspace};
use std::env;
use std::process::ExitCode;

/// Driver function of the application.
fn main() -> anyhow::Result<ExitCode> {
    // Parse the command line arguments.
    let matches = args::cli().get_matches();
    let arguments = args::Arguments::try_from(matches)?;
    // Initialize the logging system, `RUST_LOG` takes precedence over the flags.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(arguments.log_level())).init();
    // Get the package name and version from Cargo
    let pkg_name = env!("CARGO_PKG_NAME");
    let pkg_version = env!("CARGO_PKG_VERSION");
    log::info!("{pkg_name} v{pkg_version}");
    let os = env::consts::OS;
    let family = env::consts::FAMILY;
    let arch = env::consts::ARCH;
    log::info!("Running on... {family}/{os} {arch}");
    log::info!("{arguments}");

    // Capture application context.
    let context = context::Context::capture()?;
    log::info!("{context}");
    // Locate the workspace, replay can run outside of `bazel run`.
    let replay = matches!(arguments.mode, args::Mode::Replay { .. });
    let workspace = workspace::Workspace::locate(&context, replay)?;
    log::info!("Workspace root: {}", workspace.root().display());
    // Load the configuration.
    let configuration = config::Loader::load(&context, Some(workspace.root()), &arguments.config)?;
    log::info!("{configuration}");

    // Run the application.
    let application = modes::Mode::configure(context, workspace, arguments, configuration)?;
    log::debug!("Configuration complete, running the generation now...");
    let result = application.run();
    log::debug!("Exit code: {result:?}");

    Ok(result)
}
