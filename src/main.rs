use clap::{Parser, Subcommand};
use folio::imaging::RustBackend;
use folio::site::{self, BuildOptions};
use folio::{config, output, serve};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Shared flags for commands that process images.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the image cache and re-encode every variant
    #[arg(long)]
    no_cache: bool,
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Static site generator for a personal blog and photo portfolio")]
#[command(long_about = "\
Static site generator for a personal blog and photo portfolio

Posts and photos are markdown files with YAML front matter. Each collection
lists its files in reverse file-name order, so date-prefixed names put the
newest first.

Content structure:

  content/
  ├── config.toml                      # Site config (optional)
  ├── posts/
  │   ├── 2024-05-20-gear.md           # Date prefix: ordering and default date
  │   └── 2024-02-03-winter-light.md
  ├── photos/
  │   └── harbour.md                   # image: img/harbour.jpg
  ├── img/                             # Photo originals → copied to output
  └── styles/                          # Extra CSS → copied to output

Front matter:

  ---
  title: Harbour at Dawn               # required
  date: 2024-03-02T06:10:00+01:00      # required unless the file name has one
  tags: [coast, film]
  image: img/harbour.jpg
  location / camera / lens / settings  # optional, shown on photo pages
  ---

Run 'folio gen-config' to generate a documented config.toml.
Set FOLIO_LOG (e.g. FOLIO_LOG=folio=debug) for diagnostics.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "_site", global = true)]
    output: PathBuf,

    /// Log debug diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site into the output directory
    Build(CacheArgs),
    /// Build, then serve the output directory for local preview
    Serve(CacheArgs),
    /// Validate content without writing output
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let backend = RustBackend::new();

    match cli.command {
        Command::Build(cache_args) => {
            let content = site::load_site(&cli.source)?;
            init_thread_pool(&content.config.processing);
            println!("==> Building {}", cli.source.display());
            let report = site::build_content(
                &backend,
                &content,
                &build_options(&cli.source, &cli.output, &cache_args),
            )?;
            output::print_build_report(&report);
        }
        Command::Serve(cache_args) => {
            let content = site::load_site(&cli.source)?;
            init_thread_pool(&content.config.processing);
            println!("==> Building {}", cli.source.display());
            let report = site::build_content(
                &backend,
                &content,
                &build_options(&cli.source, &cli.output, &cache_args),
            )?;
            output::print_build_report(&report);

            let (server, addr) = serve::bind(&content.config.serve)?;
            output::print_serve_banner(&cli.output, addr);
            serve::run(&server, &cli.output);
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let report = site::check(&backend, &cli.source)?;
            output::print_check_report(&report);
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn build_options(source: &Path, output: &Path, cache_args: &CacheArgs) -> BuildOptions {
    BuildOptions {
        content_root: source.to_path_buf(),
        output_root: output.to_path_buf(),
        use_cache: !cache_args.no_cache,
    }
}

/// Route `tracing` events to stderr. `FOLIO_LOG` overrides the level.
fn init_tracing(verbose: bool) {
    let level = if verbose { "folio=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("FOLIO_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available cores: config can lower it, not raise it.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
