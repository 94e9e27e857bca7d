// SPDX-License-Identifier: GPL-3.0-or-later

//! Generates the shell completion scripts of `bazel-ccdb`.
//!
//! Usage: `generate-completions [OUTPUT_DIRECTORY]`, the scripts are written
//! into the current directory when no directory is given.

use bazel_ccdb::args;
use clap_complete::{Shell, generate_to};
use std::path::PathBuf;
use std::{env, fs, io};

const BINARY_NAME: &str = "bazel-ccdb";

fn main() -> io::Result<()> {
    let directory = env::args_os().nth(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&directory)?;

    let mut command = args::cli();
    for shell in [Shell::Bash, Shell::Zsh, Shell::Fish] {
        let path = generate_to(shell, &mut command, BINARY_NAME, &directory)?;
        println!("Generated {shell} completion: {}", path.display());
    }
    Ok(())
}
