use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use loopreel::preview::driver::PreviewDriver;
use loopreel::probe::HttpProbe;
use loopreel::timing::{Locale, Speed};
use loopreel::{AnimationSettings, CarouselStore, PreviewRenderer, Project, SettingsPatch, Variant};

#[derive(Parser)]
#[command(name = "loopreel", version)]
#[command(about = "loopreel: image animation embed codes from a YAML project")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print or write the embed code for a project file
    Render {
        /// Project file (YAML)
        config: PathBuf,

        /// Write output to file instead of stdout
        #[arg(short)]
        o: Option<PathBuf>,

        /// Fetch and decode every image before accepting it
        #[arg(long)]
        probe: bool,
    },

    /// Validate a project file and print its timing
    Check {
        /// Project file (YAML)
        config: PathBuf,
    },

    /// Print the timing a speed value produces
    Timing {
        /// Speed, 1 (slowest) to 50 (fastest); out-of-range values are clamped
        #[arg(long, allow_negative_numbers = true)]
        speed: i64,

        /// Animation variant
        #[arg(long, default_value = "loop")]
        variant: Variant,

        /// Hold after each falling-line cycle (ms)
        #[arg(long)]
        pause_ms: Option<i64>,

        /// Label language
        #[arg(long, value_enum, default_value_t = LabelLanguage::En)]
        locale: LabelLanguage,
    },

    /// Run the preview loop headless and log the frames it produces
    Preview {
        /// Project file (YAML)
        config: PathBuf,

        /// How long to run (seconds)
        #[arg(long, default_value = "5", value_parser = parse_seconds)]
        seconds: Duration,

        /// Simulated viewport width (px)
        #[arg(long, default_value_t = 800.0)]
        viewport: f64,
    },

    /// Start a live-reload authoring server for a project file
    Dev {
        /// Project file (YAML)
        config: PathBuf,

        /// Server port
        #[arg(long, default_value_t = 4444)]
        port: u16,
    },
}

/// Language for speed labels.
#[derive(Clone, Copy, ValueEnum)]
enum LabelLanguage {
    /// English
    En,
    /// Japanese
    Ja,
}

impl From<LabelLanguage> for Locale {
    fn from(lang: LabelLanguage) -> Locale {
        match lang {
            LabelLanguage::En => Locale::En,
            LabelLanguage::Ja => Locale::Ja,
        }
    }
}

fn init_tracing(verbosity: u8) -> anyhow::Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("loopreel={level}").parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("error: bad log filter: {e}");
        process::exit(1);
    }

    match cli.command {
        Commands::Render { config, o, probe } => {
            let project = load_project(&config);
            let embed = if probe {
                let rt = runtime();
                match rt.block_on(render_probed(&project)) {
                    Ok(embed) => embed,
                    Err(e) => {
                        eprintln!("error: {e:#}");
                        process::exit(1);
                    }
                }
            } else {
                match loopreel::render_project(&project) {
                    Ok(embed) => embed,
                    Err(e) => {
                        eprintln!("error: {e:#}");
                        process::exit(1);
                    }
                }
            };

            if let Some(out_path) = o {
                match fs::write(&out_path, &embed) {
                    Ok(()) => {
                        eprintln!(
                            "wrote {} embed to {} ({} bytes)",
                            project.variant,
                            out_path.display(),
                            embed.len()
                        );
                    }
                    Err(e) => {
                        eprintln!("error: cannot write '{}': {e}", out_path.display());
                        process::exit(1);
                    }
                }
            } else {
                print!("{embed}");
            }
        }

        Commands::Check { config } => {
            let project = load_project(&config);
            if let Err(e) = project.validate() {
                eprintln!("error: {}: {e:#}", config.display());
                process::exit(1);
            }
            let mut settings = AnimationSettings::for_variant(project.variant);
            if let Err(e) = settings.apply(&project.settings) {
                eprintln!("error: {}: {e}", config.display());
                process::exit(1);
            }
            println!("{}", loopreel::describe_timing(project.variant, &settings, project.locale));
            println!(
                "{} image(s), {} required, {} allowed",
                project.images.len(),
                project.variant.min_images(),
                project.variant.max_images()
            );
            eprintln!("ok: {}", config.display());
        }

        Commands::Timing {
            speed,
            variant,
            pause_ms,
            locale,
        } => {
            let speed = Speed::clamped(speed);
            let mut settings = AnimationSettings::for_variant(variant);
            let patch = SettingsPatch {
                speed: Some(speed.get() as i64),
                pause_ms,
                ..SettingsPatch::default()
            };
            if let Err(e) = settings.apply(&patch) {
                eprintln!("error: {e}");
                process::exit(1);
            }
            println!("{}", loopreel::describe_timing(variant, &settings, locale.into()));
        }

        Commands::Preview {
            config,
            seconds,
            viewport,
        } => {
            let project = load_project(&config);
            let store = match project.into_store() {
                Ok(store) => store,
                Err(e) => {
                    eprintln!("error: {}: {e:#}", config.display());
                    process::exit(1);
                }
            };
            let rt = runtime();
            rt.block_on(run_preview(store, seconds, viewport));
        }

        Commands::Dev { config, port } => {
            let rt = runtime();
            rt.block_on(async {
                if let Err(e) = loopreel::server::run_dev_server(config, port).await {
                    eprintln!("error: dev server failed: {e:#}");
                    process::exit(1);
                }
            });
        }
    }
}

fn runtime() -> tokio::runtime::Runtime {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        }
    }
}

fn load_project(path: &Path) -> Project {
    match Project::from_yaml_file(path) {
        Ok(project) => project,
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(1);
        }
    }
}

/// Like `render_project`, but every image goes through the HTTP probe.
async fn render_probed(project: &Project) -> anyhow::Result<String> {
    project.validate()?;
    let probe = HttpProbe::new()?;
    let mut store = CarouselStore::new(project.variant);
    store.update_settings(&project.settings)?;
    for raw in &project.images {
        if !store.load_image_from_url(raw, &probe).await {
            let reason = store.state().error.clone().unwrap_or_default();
            anyhow::bail!("{raw}: {reason}");
        }
    }
    store
        .generate_embed_code()
        .ok_or_else(|| anyhow::anyhow!("{} needs more images", project.variant))
}

/// Seconds as a finite, non-negative duration.
fn parse_seconds(raw: &str) -> Result<Duration, String> {
    let seconds: f64 = raw.parse().map_err(|e| format!("{raw:?} is not a number: {e}"))?;
    Duration::try_from_secs_f64(seconds)
        .map_err(|_| format!("{raw} is not a finite, non-negative number of seconds"))
}

async fn run_preview(store: CarouselStore, seconds: Duration, viewport: f64) {
    let mut renderer = PreviewRenderer::new(store.variant());
    let change = store.start_animation(&mut renderer);
    info!(variant = %store.variant(), ?change, "preview started");

    let renderer = Arc::new(Mutex::new(renderer));
    let mut driver = PreviewDriver::new(renderer).with_frame_interval(Duration::from_millis(250));
    driver.resize(viewport);
    let mut frames = driver.subscribe();
    driver.start();

    let deadline = tokio::time::sleep(seconds);
    tokio::pin!(deadline);
    let mut count = 0usize;
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            changed = frames.changed() => {
                if changed.is_err() {
                    break;
                }
                let visual = frames.borrow_and_update().clone();
                match visual {
                    Some(visual) => info!(frame = count, ?visual, "frame"),
                    None => info!(frame = count, "hidden"),
                }
                count += 1;
            }
        }
    }
    driver.stop();
    eprintln!("rendered {count} frame(s) in {:.1}s", seconds.as_secs_f64());
}
