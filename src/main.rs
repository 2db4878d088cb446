mod api;
mod app;
mod board;
mod city;
mod clock_sync;
mod config;
mod error;
mod fetch;
mod format;
mod logging;
mod projection;
mod report;
mod schedule;
mod settings;
mod solar;
mod terminal;
mod terminator;
mod topo;
mod ui;

use api::{HttpApi, MapSource, WorldApi};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use clock_sync::ClockSync;
use config::BoardConfig;
use projection::{FittedEquirectangular, ProjectorSlot};
use report::CurveFormat;
use settings::Settings;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "termclock")]
#[command(author = "termclock contributors")]
#[command(version)]
#[command(about = "Terminal world clock with server-synced time and a day/night terminator map", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/termclock/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Clock server base URL, overrides the config file
    #[arg(long, global = true)]
    server: Option<String>,

    /// Log level filter (RUST_LOG still wins)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive world clock board (default)
    Board {
        /// 24-hour clock faces
        #[arg(long)]
        twenty_four: bool,

        /// Land topology: URL, file path, or `none`
        #[arg(long)]
        map: Option<String>,
    },

    /// Print the solar position for an instant
    Sun {
        /// RFC 3339 instant, defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },

    /// Print the day/night terminator curve
    Terminator {
        /// RFC 3339 instant, defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,

        #[arg(long, value_enum, default_value_t = CurveFormat::Svg)]
        format: CurveFormat,

        /// Fit the projection to this land topology (URL or file)
        #[arg(long)]
        map: Option<String>,
    },

    /// Look up a city's timezone on the server
    Lookup {
        /// City name
        query: String,
    },

    /// Fetch server time once and report the device clock offset
    Sync,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Board {
        twenty_four: false,
        map: None,
    });

    let config_path = cli.config.unwrap_or_else(Settings::config_path);
    let loaded = Settings::load_from(&config_path);
    let level = cli.log_level.unwrap_or_else(|| match &loaded {
        Ok(settings) => settings.log.level.clone(),
        Err(_) => "info".to_string(),
    });
    logging::init(&level, matches!(command, Commands::Board { .. }));
    let settings = loaded.unwrap_or_else(|err| {
        log::warn!("ignoring config: {err}");
        Settings::default()
    });

    let mut config = BoardConfig::from_settings(&settings);
    if let Some(server) = cli.server {
        config.base_url = server;
    }

    match command {
        Commands::Board { twenty_four, map } => {
            config.twenty_four |= twenty_four;
            if let Some(map) = map {
                config.map_source = MapSource::parse(&map);
            }
            ui::run(config)?;
        }
        Commands::Sun { at } => {
            let instant = at.unwrap_or_else(Utc::now);
            print!("{}", report::sun_report(instant));
        }
        Commands::Terminator { at, format, map } => {
            let instant = at.unwrap_or_else(Utc::now);
            let mut slot = ProjectorSlot::default();
            if let Some(map) = map {
                let (width, height) = slot.canvas();
                match MapSource::parse(&map).load(&config.map_object, config.timeout) {
                    Ok(land) => match FittedEquirectangular::fit(&land.bounds, width, height) {
                        Some(fitted) => slot.install(fitted),
                        None => slot.mark_unavailable(),
                    },
                    Err(err) => {
                        log::warn!("{err}; using plain equirectangular projection");
                        slot.mark_unavailable();
                    }
                }
            }
            let curve = terminator::build_curve(instant, &slot);
            let mut out = io::stdout().lock();
            out.write_all(report::curve_report(&curve, format).as_bytes())?;
        }
        Commands::Lookup { query } => {
            let api = HttpApi::new(&config.base_url, config.timeout);
            match api.lookup_city(&query) {
                Ok(city) => print!("{}", report::city_report(&city)),
                Err(err) => {
                    eprintln!("{}", err.hint());
                    return Err(io::Error::other(err));
                }
            }
        }
        Commands::Sync => {
            let api = HttpApi::new(&config.base_url, config.timeout);
            let mut clock = ClockSync::default();
            clock.begin_sync();
            let timezones = config.initial_board().timezones();
            match api.server_time(&timezones) {
                Ok(server_ms) => {
                    clock.resync(server_ms);
                    print!("{}", report::sync_report(server_ms, &clock.offset_label()));
                }
                Err(err) => {
                    clock.fail_sync();
                    eprintln!("{}: {}", clock.status().label(), clock.offset_label());
                    return Err(io::Error::other(err));
                }
            }
        }
    }

    Ok(())
}
