// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Options shared by `build` and `stage`
fn target_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("descriptor").required(true).help("Path to the distribution descriptor (TOML)"))
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .default_value(".")
                .help("Destination directory"),
        )
        .arg(Arg::new("platform").long("platform").help("Platform used in file names"))
        .arg(Arg::new("machine").long("machine").help("Machine used for the Architecture field"))
        .arg(
            Arg::new("alternate")
                .long("alternate")
                .action(ArgAction::SetTrue)
                .help("Alternate product mode"),
        )
        .arg(
            Arg::new("keep_files")
                .long("keep-files")
                .action(ArgAction::SetTrue)
                .help("Keep staging trees and per-instance archives"),
        )
}

fn build_cli() -> Command {
    Command::new("debforge")
        .version(env!("CARGO_PKG_VERSION"))
        .author("debforge contributors")
        .about("Build Debian packages from a product distribution")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase log verbosity"),
        )
        .subcommand(target_args(
            Command::new("build").about("Build every package instance and bundle them when needed"),
        ))
        .subcommand(target_args(
            Command::new("stage").about("Write the staging trees without running dpkg"),
        ))
        .subcommand(
            Command::new("control")
                .about("Print the control file of one package instance")
                .arg(Arg::new("descriptor").required(true).help("Path to the distribution descriptor (TOML)"))
                .arg(Arg::new("subpackage").short('s').long("subpackage").help("Subpackage to render"))
                .arg(Arg::new("machine").long("machine").help("Machine used for the Architecture field")),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "elvish", "fish", "powershell", "zsh"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("debforge.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
