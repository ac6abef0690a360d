use anyhow::Result;
use benchload::commands::{
    init_tracing, list_apps_command, list_suites_command, load_command, run_suite_command,
    scan_command, IngestContext,
};
use clap::{Args, Parser, Subcommand};

/// Benchmark ingestion CLI.
///
/// This CLI is a thin wrapper around `benchload-core` (exposed in code as
/// `benchload_core`). All substantive logic lives in the library so it can be
/// tested thoroughly and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "benchload",
    version,
    about = "Load C/C++ benchmark suites into a source-to-source harness",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Ingest config (YAML or JSON). Defaults to `benchload.yaml` in the cwd, if present.
    #[arg(long, global = true)]
    config: Option<String>,

    /// Catalog file replacing the built-in one (YAML or JSON).
    #[arg(long, global = true)]
    catalog: Option<String>,

    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the benchmark suites in the catalog.
    ListSuites {
        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List the apps of one suite.
    ListApps {
        /// Suite name (case-insensitive), e.g. `CHStone`.
        #[arg(long)]
        suite: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Classify the files of a benchmark folder into sources and dirents.
    Scan {
        /// Folder to scan. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        dir: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Load one app: build with retry, amalgamate if asked, resolve its entry.
    Load {
        #[arg(long)]
        suite: String,

        #[arg(long)]
        app: String,

        /// Load from this previously transformed tree instead of the original.
        #[arg(long)]
        cache_path: Option<String>,

        /// Emit the loaded program and a manifest under this directory.
        #[arg(long)]
        out: Option<String>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Load and emit every app of a suite into the output dir.
    RunSuite {
        #[arg(long)]
        suite: String,

        /// Comma-separated app keys; defaults to every app of the suite.
        #[arg(long, value_delimiter = ',')]
        apps: Vec<String>,

        /// Try the cached tree under the output dir before the original.
        #[arg(long, default_value_t = false)]
        caching: bool,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    if let Command::Scan { dir, json } = &cli.command {
        return scan_command(dir, *json);
    }

    let ctx = IngestContext::load(cli.global.config.as_deref(), cli.global.catalog.as_deref())?;
    match cli.command {
        Command::ListSuites { json } => list_suites_command(&ctx, json)?,
        Command::ListApps { suite, json } => list_apps_command(&ctx, &suite, json)?,
        Command::Load { suite, app, cache_path, out, json } => {
            load_command(&ctx, &suite, &app, cache_path.as_deref(), out.as_deref(), json)?
        }
        Command::RunSuite { suite, apps, caching, json } => {
            run_suite_command(&ctx, &suite, &apps, caching, json)?;
        }
        Command::Scan { .. } => {}
    }

    Ok(())
}
