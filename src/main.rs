use clap::{Parser, Subcommand};
use page_builder::builder::{OutputFiles, PageBuilder};
use page_builder::{config, output, render};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "page-builder")]
#[command(about = "Resolve page-structure files into render-ready page records")]
#[command(long_about = "\
Resolve page-structure files into render-ready page records

Site layout:

  site/
  ├── page-builder.toml          # Optional config (see gen-config)
  ├── structure/                 # One page tree per *.json file
  │   ├── en.json
  │   └── de.json
  └── content/                   # Markdown fragments referenced by path
      ├── home.md
      └── docs/intro.md

Pages reference content with {\"content\": \"docs/intro.md\"}; add
\"hoist\": true to merge the rendered fragment into the surrounding block.
Each page with data becomes one record keyed by <path>/<output>.")]
#[command(version)]
struct Cli {
    /// Site root containing page-builder.toml
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Show debug diagnostics (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render content, resolve structures and write pages.json
    Build,
    /// Resolve structures and report pages without writing anything
    Check,
    /// Print a stock page-builder.toml with all options documented
    GenConfig,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Build => {
            let site_config = config::load_config(&cli.root)?;
            let output_dir = cli.root.join(&site_config.output);
            println!("==> Resolving {}", cli.root.display());
            let pages = resolve(&cli.root, site_config)?;

            std::fs::create_dir_all(&output_dir)?;
            let manifest_path = output_dir.join("pages.json");
            let json = serde_json::to_string_pretty(&pages)?;
            std::fs::write(&manifest_path, json)?;
            println!("==> Wrote {}", manifest_path.display());
        }
        Command::Check => {
            let site_config = config::load_config(&cli.root)?;
            println!("==> Checking {}", cli.root.display());
            let pages = resolve(&cli.root, site_config)?;
            println!();
            output::print_pages(&pages);
            println!("==> Structure is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Render content and resolve every structure file under `root`.
fn resolve(
    root: &Path,
    site_config: config::BuilderConfig,
) -> Result<OutputFiles, Box<dyn std::error::Error>> {
    let mut fragments = render::render_content(&root.join(&site_config.content))?;
    let mut pages = OutputFiles::new();

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_build_event(&event) {
                println!("{}", line);
            }
        }
    });

    let result = PageBuilder::new(site_config)
        .with_events(tx)
        .build(root, &mut fragments, &mut pages);
    // The builder owned the sender; once it is dropped the printer drains and exits.
    let _ = printer.join();

    result?;
    Ok(pages)
}
