use clap::{Parser, Subcommand};
use gallery_prep::{config, logging, output, pipeline};
use std::path::PathBuf;

fn version_string() -> &'static str {
    if env!("GALLERY_PREP_RELEASE") == "true" {
        return env!("CARGO_PKG_VERSION");
    }
    match env!("GALLERY_PREP_GIT_HASH") {
        "" => "dev@unknown",
        // Leaked once at startup
        hash => Box::leak(format!("dev@{hash}").into_boxed_str()),
    }
}

#[derive(Parser)]
#[command(name = "gallery-prep")]
#[command(about = "Prepare photo-gallery sources for a static site")]
#[command(long_about = "\
Prepare photo-gallery sources for a static site

Reads a manifest of pages, copies every photo and asset into a per-page
output directory, writes a size-bounded `.small` derivative next to each
copy, and emits the manifest again as JSON with camera metadata filled in.

Manifest (info.toml):

  [pages.japan]
  title = \"Japan\"
  date = \"2024-04-02\"
  location = \"local:/photos/2024-japan\"   # only `local:` is supported

  [pages.japan.assets.map]
  src = \"route.png\"

  [pages.japan.photos.shrine]
  src = \"DSCF0042.JPG\"

Output:

  public/photos/japan/shrine.JPG
  public/photos/japan/shrine.small.JPG     # ≤ 2000px, ≤ 1 MiB
  public/photos/japan/assets/map.png
  public/photos/japan/assets/map.small.png
  src/info.json                            # make, model, iso, f_stop, ...

A missing source or a broken image fails only that item; the run goes on
and exits non-zero at the end. An unknown location scheme or an unreadable
manifest stops the run immediately.

Run 'gallery-prep gen-config' to generate a documented gallery.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file [default: ./gallery.toml if present]. Relative paths
    /// inside it resolve against its directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug-level logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Copy sources, generate derivatives, write the enriched manifest (default)
    Build,
    /// Validate the manifest and check that every source exists, writing nothing
    Check,
    /// Print a stock gallery.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json_logs);

    match cli.command.unwrap_or(Command::Build) {
        Command::Build => {
            let config = config::load_cli_config(cli.config.as_deref())?;

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    output::print_event(&event);
                }
            });
            let result = pipeline::run(&config, Some(tx));
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;

            let summary = result?;
            println!();
            output::print_summary(&summary);
            println!("==> Manifest written to {}", config.manifest_output.display());
            summary.ensure_clean()?;
        }
        Command::Check => {
            let config = config::load_cli_config(cli.config.as_deref())?;
            println!("==> Checking {}", config.manifest.display());
            let report = pipeline::check(&config)?;
            output::print_check(&report);
            report.ensure_ok()?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
