use anyhow::Result;
use clap::{Parser, Subcommand};
use console::{Term, style};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use unibuild_core::{
    BuildConfig, BuildTarget, FuseOutcome, SignOptions, create_universal_binaries, require_sdk_root,
    sign_artifacts, supports_universal_binaries, xcode_version,
};
use unibuild_platform::{HostInfo, target_arm_arch};

/// unibuild - resolve Apple build targets, fuse and sign universal binaries
#[derive(Parser)]
#[command(name = "unibuild")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the architectures and derived facets for a build target
    Resolve {
        /// Build target (native, x86_64, arm64, universal, iOS, visionOS)
        #[arg(default_value = "native")]
        target: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve the platform SDK root for a build target
    Sdk {
        /// Build target (native, x86_64, arm64, universal, iOS, visionOS)
        #[arg(default_value = "native")]
        target: String,

        /// Extra configure arguments that may carry a sysroot override
        #[arg(long, allow_hyphen_values = true)]
        build_args: Option<String>,
    },

    /// Fuse per-architecture libraries into universal binaries
    Fuse {
        /// Install output directory (fused output goes to <dir>/lib)
        #[arg(long)]
        install_dir: PathBuf,

        /// Directory holding the primary-architecture builds
        #[arg(long)]
        primary_dir: PathBuf,

        /// Directory holding the secondary-architecture builds
        #[arg(long)]
        secondary_dir: PathBuf,

        /// Library file names to fuse
        #[arg(required = true)]
        libs: Vec<String>,
    },

    /// Code-sign built artifacts under an install tree
    Sign {
        /// Install tree to scan for signable artifacts
        install_path: PathBuf,
    },

    /// Show host and toolchain capabilities
    Status,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .without_time()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve { target, json } => cmd_resolve(&target, json),
        Commands::Sdk { target, build_args } => cmd_sdk(&target, build_args),
        Commands::Fuse {
            install_dir,
            primary_dir,
            secondary_dir,
            libs,
        } => cmd_fuse(&install_dir, &primary_dir, &secondary_dir, &libs),
        Commands::Sign { install_path } => cmd_sign(&install_path, cli.verbose),
        Commands::Status => cmd_status(),
    }
}

fn parse_target(term: &Term, name: &str) -> Result<BuildTarget> {
    match name.parse::<BuildTarget>() {
        Ok(target) => Ok(target),
        Err(e) => {
            term.write_line(&format!("{} {}", style("error:").red().bold(), e))?;
            std::process::exit(2);
        }
    }
}

fn cmd_resolve(target_name: &str, json: bool) -> Result<()> {
    let term = Term::stderr();
    let target = parse_target(&term, target_name)?;

    let mut config = BuildConfig::new(".");
    if let Err(e) = config.set_target(target) {
        term.write_line(&format!("{} {}", style("error:").red().bold(), e))?;
        std::process::exit(1);
    }

    let pair = config.arch_pair();

    if json {
        let value = serde_json::json!({
            "target": config.target(),
            "target_name": config.target_name(),
            "primary": pair.primary,
            "secondary": pair.secondary,
            "target_arch": config.target_arch(),
            "is_native": config.is_native(),
            "is_x86": config.is_x86(),
            "is_arm64": config.is_arm64(),
            "is_universal": config.is_universal(),
            "is_embedded": config.is_embedded(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Target:       {}", config.target_name());
    println!("Primary:      {}", pair.primary);
    if let Some(secondary) = &pair.secondary {
        println!("Secondary:    {}", secondary);
    }
    println!("Configure as: {}", config.target_arch());
    println!("Embedded:     {}", config.is_embedded());

    Ok(())
}

fn cmd_sdk(target_name: &str, build_args: Option<String>) -> Result<()> {
    let term = Term::stderr();
    let target = parse_target(&term, target_name)?;

    let mut config = BuildConfig::new(".");
    config.build_args = build_args;
    // SDK selection only needs the target family, so a universal
    // request resolves like a desktop one here.
    let sdk_target = if target == BuildTarget::Universal {
        BuildTarget::Native
    } else {
        target
    };
    if let Err(e) = config.set_target(sdk_target) {
        term.write_line(&format!("{} {}", style("error:").red().bold(), e))?;
        std::process::exit(1);
    }

    match require_sdk_root(&config) {
        Ok(Some(root)) => println!("{}", root.display()),
        Ok(None) => {
            term.write_line(&format!(
                "{} no SDK root resolved, the toolchain default applies",
                style("::").cyan().bold()
            ))?;
        }
        Err(e) => {
            term.write_line(&format!("{} {}", style("error:").red().bold(), e))?;
            std::process::exit(1);
        }
    }

    Ok(())
}

fn cmd_fuse(install_dir: &Path, primary_dir: &Path, secondary_dir: &Path, libs: &[String]) -> Result<()> {
    let term = Term::stderr();
    let config = BuildConfig::new(install_dir);

    let outcomes = match create_universal_binaries(&config, libs, primary_dir, secondary_dir) {
        Ok(outcomes) => outcomes,
        Err(e) => {
            term.write_line(&format!("{} {}", style("error:").red().bold(), e))?;
            std::process::exit(1);
        }
    };

    for outcome in &outcomes {
        print_outcome(&term, outcome)?;
    }

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    if failed > 0 {
        term.write_line(&format!(
            "{} {} of {} libraries failed to fuse",
            style("error:").red().bold(),
            failed,
            outcomes.len()
        ))?;
        std::process::exit(1);
    }

    term.write_line(&format!(
        "{} Fused {} library(ies) into {}",
        style("::").green().bold(),
        outcomes.len(),
        install_dir.join("lib").display()
    ))?;

    Ok(())
}

fn print_outcome(term: &Term, outcome: &FuseOutcome) -> Result<()> {
    let symbol = if outcome.is_ok() {
        style("+").green().bold()
    } else {
        style("!").red().bold()
    };
    let detail = match &outcome.error {
        Some(error) => format!("({})", error),
        None => match &outcome.command {
            Some(command) => format!("({})", command),
            None => "(relinked)".to_string(),
        },
    };
    term.write_line(&format!(
        "  {} {} {}",
        symbol,
        outcome.lib_name,
        style(detail).dim()
    ))?;
    Ok(())
}

fn cmd_sign(install_path: &Path, verbose: bool) -> Result<()> {
    let term = Term::stderr();

    let report = sign_artifacts(install_path, SignOptions { verbose })?;

    if report.skipped {
        term.write_line(&format!(
            "{} code signing skipped, host cannot sign",
            style("::").cyan().bold()
        ))?;
        return Ok(());
    }

    if let Some(identity) = &report.identity {
        term.write_line(&format!(
            "{} Signing with identity '{}'",
            style("::").cyan().bold(),
            identity
        ))?;
    }

    if verbose {
        for outcome in &report.outcomes {
            let symbol = if outcome.is_ok() {
                style("+").green().bold()
            } else {
                style("!").red().bold()
            };
            term.write_line(&format!("  {} {}", symbol, outcome.path.display()))?;
        }
    }

    term.write_line(&format!(
        "{} Signed {} artifact(s), {} failed",
        style("::").green().bold(),
        report.signed(),
        report.failed()
    ))?;

    Ok(())
}

fn cmd_status() -> Result<()> {
    let term = Term::stderr();
    let host = HostInfo::current();

    term.write_line(&format!(
        "{} unibuild v{}",
        style("::").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    ))?;
    term.write_line("")?;
    term.write_line(&format!("  Host OS:     {}", host.os))?;
    term.write_line(&format!("  Host arch:   {}", host.arch))?;
    term.write_line(&format!("  ARM variant: {}", target_arm_arch()))?;
    term.write_line(&format!("  User:        {}", host.username))?;
    term.write_line(&format!("  Hostname:    {}", host.hostname))?;
    term.write_line(&format!(
        "  Xcode:       {}",
        xcode_version().unwrap_or_else(|| "(not found)".to_string())
    ))?;
    term.write_line(&format!("  Universal:   {}", supports_universal_binaries()))?;

    Ok(())
}
