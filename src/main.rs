use clap::{Args, Parser, Subcommand, ValueEnum};
use photofolio::generate::{self, render_page};
use photofolio::join::{Catalog, ImageFilter};
use photofolio::loader::FsImageLoader;
use photofolio::pages::{self, RenderContext};
use photofolio::source::DirSource;
use photofolio::{check, config, output, probe};
use std::path::{Path, PathBuf};

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
#[command(name = "photofolio")]
#[command(about = "Static site builder for photo portfolios")]
#[command(long_about = "\
Static site builder for photo portfolios

The catalog is six JSON collections. Images are joined with their EXIF,
camera, lens, series and visibility rows and rendered into a homepage grid,
a series overview, one page per series, and a permalink page per photo.

Site structure:

  site/
  ├── config.toml             # Site config (optional)
  ├── json/
  │   ├── images.json         # image_id, src, thumbnail, title, date, ...
  │   ├── exif.json           # camera/lens ids and settings per image
  │   ├── camera.json
  │   ├── lens.json
  │   ├── series.json         # series_id 0 = uncategorized
  │   └── visibility.json     # homepage / series visibility per image
  └── images/                 # Assets, copied with their relative paths
      └── thumbs/

Image URLs in the catalog are relative to the site root.

Run 'photofolio gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Site root: config.toml and the image assets
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// Directory of the JSON collections [default: <source>/json]
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Command,
}

/// Overrides for the connection probe. `--slow` wins over `--fast`.
#[derive(Args, Clone, Copy)]
struct ConnectionArgs {
    /// Treat the connection as slow: always run the thumbnail pass
    #[arg(long, global = true)]
    slow: bool,

    /// Treat the connection as fast: skip the probe and the thumbnail pass
    #[arg(long, global = true)]
    fast: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PageKind {
    /// The homepage grid
    Home,
    /// The series overview
    Series,
    /// One series, selected by `series_id` in --query
    SeriesView,
}

#[derive(Subcommand)]
enum Command {
    /// Build the whole site into the output directory
    Build,
    /// Validate the catalog and the image assets without building
    Check,
    /// Render a single page to stdout
    Render {
        #[arg(long, value_enum, default_value = "home")]
        page: PageKind,
        /// Query string of the page URL, e.g. "series_id=3"
        #[arg(long, default_value = "")]
        query: String,
    },
    /// Time one image load and print the connection verdict
    Probe {
        /// Image URL to time [default: probe.sample, or the first homepage image]
        #[arg(long)]
        url: Option<String>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let site_config = config::load_config(&cli.source)?;
    init_thread_pool(&site_config.processing);

    let data_dir = cli.data.clone().unwrap_or_else(|| cli.source.join("json"));
    let catalog = load_catalog(&data_dir)?;
    let loader = FsImageLoader::new(&cli.source);

    match cli.command {
        Command::Build => {
            let slow = connection_is_slow(&cli.connection, &catalog, &site_config, &loader);
            let ctx = RenderContext {
                config: &site_config,
                loader: &loader,
                slow,
            };
            println!("==> Building {} \u{2192} {}", cli.source.display(), cli.output.display());
            let report = generate::generate(&catalog, &ctx, Some(&cli.source), &cli.output)?;
            output::print_build_output(&report, slow);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", data_dir.display());
            let inventory = check::check_catalog(
                &catalog,
                &loader,
                &site_config.lightbox.placeholder_dir,
            );
            output::print_check_output(&inventory);
            if inventory.issues.is_empty() {
                println!("==> Catalog is valid");
            } else {
                return Err(format!("{} asset issue(s) found", inventory.issues.len()).into());
            }
        }
        Command::Render { page, query } => {
            let slow = connection_is_slow(&cli.connection, &catalog, &site_config, &loader);
            let ctx = RenderContext {
                config: &site_config,
                loader: &loader,
                slow,
            };
            let html = match page {
                PageKind::Home => {
                    let built = pages::homepage(&catalog, &ctx);
                    render_page(&built.page, &site_config, &built.images)?
                }
                PageKind::Series => {
                    let list = pages::series_list_page(&catalog, &ctx);
                    render_page(&list, &site_config, &[])?
                }
                PageKind::SeriesView => {
                    let series_id = pages::series_id_from_query(&query);
                    let built = pages::series_detail_page(&catalog, series_id, &ctx);
                    render_page(&built.page, &site_config, &built.images)?
                }
            };
            println!("{}", html.into_string());
        }
        Command::Probe { url } => {
            let Some(url) = url.or_else(|| sample_url(&catalog, &site_config)) else {
                return Err("no image to probe: the homepage is empty and probe.sample is unset".into());
            };
            let threshold = site_config.probe.threshold();
            let report = probe::probe(&loader, &url, threshold);
            output::print_probe_output(&url, &report, threshold);
        }
        // Printed before the catalog is loaded
        Command::GenConfig => {}
    }

    Ok(())
}

fn load_catalog(data_dir: &Path) -> Result<Catalog, photofolio::source::FetchError> {
    Catalog::load(&DirSource::new(data_dir)).inspect_err(|e| {
        log::error!("Failed to load catalog from {}: {e}", data_dir.display());
    })
}

/// The probe's sample image: `probe.sample`, else the first homepage image.
fn sample_url(catalog: &Catalog, site_config: &config::SiteConfig) -> Option<String> {
    site_config.probe.sample.clone().or_else(|| {
        catalog
            .images(&ImageFilter::homepage())
            .into_iter()
            .next()
            .map(|image| image.src)
    })
}

/// Resolve `--slow`/`--fast`, or run the probe.
fn connection_is_slow(
    args: &ConnectionArgs,
    catalog: &Catalog,
    site_config: &config::SiteConfig,
    loader: &FsImageLoader,
) -> bool {
    if args.slow {
        return true;
    }
    if args.fast {
        return false;
    }
    match sample_url(catalog, site_config) {
        Some(url) => probe::is_slow_connection(loader, &url, site_config.probe.threshold()),
        None => false,
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. The user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
