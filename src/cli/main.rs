//! Command line entry point.
//!
//! Looks up regions for state/territory codes, builds region geometry
//! from Natural Earth, and writes it out as GeoJSON or a zipped shapefile.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::FmtSubscriber;

use epa_regions::export::{to_geojson, write_shapefile_zip};
use epa_regions::{get, look_up, to_regionmask, GetOptions, Settings};

#[derive(Parser, Debug)]
#[command(name = "epa-regions")]
#[command(about = "EPA regions from US state/territory codes and Natural Earth shapefiles")]
struct Args {
    /// Optional TOML settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log progress at info level
    #[arg(long, global = true)]
    info: bool,

    /// Log at debug level
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the region for each 2-letter code
    LookUp {
        #[arg(required = true)]
        codes: Vec<String>,
    },
    /// Build region geometry and print a summary
    Get {
        #[command(flatten)]
        source: SourceArgs,

        /// Write the regions as GeoJSON
        #[arg(long)]
        geojson: Option<PathBuf>,
    },
    /// Write the regions as a zipped shapefile
    Save {
        #[command(flatten)]
        source: SourceArgs,

        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Print the region containing a lon/lat point
    Mask {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
    },
}

#[derive(ClapArgs, Debug)]
struct SourceArgs {
    /// Natural Earth resolution: 10m, 50m or 110m
    #[arg(short, long, default_value = "10m")]
    resolution: String,

    /// Natural Earth version, e.g. v5.1.2
    #[arg(long = "ne-version", default_value = "v5.1.2")]
    version: String,

    /// States (and DC) only
    #[arg(long)]
    states_only: bool,
}

impl SourceArgs {
    fn options(&self) -> Result<GetOptions> {
        Ok(GetOptions {
            resolution: self.resolution.parse()?,
            version: self.version.parse()?,
            states_only: self.states_only,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.debug {
        Level::DEBUG
    } else if args.info {
        Level::INFO
    } else {
        Level::WARN
    };
    // RUST_LOG directives take precedence over the flags
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let settings =
        Settings::resolve(args.config.as_deref()).context("Failed to load settings")?;
    info!("Cache directory: {}", settings.cache_dir.display());

    match args.command {
        Command::LookUp { codes } => {
            for row in look_up(&codes)? {
                println!("{}\t{}\t{}", row.code, row.label(), row.office);
            }
        }
        Command::Get { source, geojson } => {
            let regions = get(&settings, source.options()?)
                .await
                .context("Failed to build regions")?;

            for r in &regions.regions {
                println!(
                    "{}\t{}\t{}",
                    r.label,
                    r.office,
                    r.constituents.join(", ")
                );
            }

            if let Some(path) = geojson {
                let body = serde_json::to_string(&to_geojson(&regions))?;
                std::fs::write(&path, body)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Wrote {}", path.display());
            }
        }
        Command::Save { source, out } => {
            let regions = get(&settings, source.options()?)
                .await
                .context("Failed to build regions")?;
            let path = write_shapefile_zip(&regions, &out)?;
            println!("{}", path.display());
        }
        Command::Mask { source, lon, lat } => {
            let regions = get(&settings, source.options()?)
                .await
                .context("Failed to build regions")?;
            let mask = to_regionmask(&regions)?;

            match mask.mask_point(lon, lat) {
                Some(number) => {
                    let region = mask
                        .regions()
                        .iter()
                        .find(|r| r.number == number)
                        .context("Mask returned an unknown region")?;
                    println!("{}\t{}", region.abbrev, region.name);
                }
                None => println!("({}, {}) is outside all EPA regions", lon, lat),
            }
        }
    }

    Ok(())
}
