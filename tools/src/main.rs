use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use assets::{AssetCache, AssetManifest};
use clap::{Parser, Subcommand, ValueEnum};
use codec::{ComponentData, EntityId};
use net::ConnectionManager;
use scene::{
    HostSyncManager, MirrorListener, MirrorScene, ObserverSyncManager, SyncTransport,
};
use scenecast_tools::{
    collect_entries, demo_assets, format_pretty, inspect_frame, sort_entries, DemoScene,
    EntrySort, FrameCapture, RecordingTransport, ToolConfig,
};
use schema::ChangeFlags;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "scenecast",
    version,
    about = "scenecast demo host, observer and frame inspector"
)]
struct Cli {
    /// JSON file with optional `sync` and `net` sections.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the animated demo scene.
    Host {
        #[arg(long, default_value_t = 7777)]
        port: u16,
        /// Stop after this many ticks.
        #[arg(long)]
        ticks: Option<u64>,
        /// Write the asset manifest observers should load.
        #[arg(long)]
        manifest: Option<PathBuf>,
    },
    /// Connect to a host and mirror its scene.
    Observe {
        #[arg(long, default_value = "127.0.0.1")]
        address: String,
        #[arg(long, default_value_t = 7777)]
        port: u16,
        /// Asset manifest written by the host; the demo assets otherwise.
        #[arg(long)]
        manifest: Option<PathBuf>,
        /// Directory to write received frames to.
        #[arg(long)]
        capture: Option<PathBuf>,
        /// Stop after this many seconds.
        #[arg(long)]
        duration: Option<f32>,
    },
    /// Decode captured frames.
    Inspect {
        /// A frame file, or a directory of them.
        path: PathBuf,
        /// Optional glob filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Sort inspected frames.
        #[arg(long, value_enum)]
        sort: Option<EntrySort>,
        /// Limit the number of inspected frames (after sorting).
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ToolConfig::load_or_default(cli.config.as_deref())?;
    match cli.command {
        Command::Host {
            port,
            ticks,
            manifest,
        } => run_host(config, port, ticks, manifest.as_deref()),
        Command::Observe {
            address,
            port,
            manifest,
            capture,
            duration,
        } => {
            let assets = load_assets(manifest.as_deref())?;
            let manager = ConnectionManager::new(config.net.clone());
            manager
                .connect_to(&address, port)
                .with_context(|| format!("connect to {address}:{port}"))?;
            info!(%address, port, "connecting");
            let pacing = Pacing {
                interval: config.sync.tick_interval(),
                give_up: Duration::from_millis(config.net.connect_timeout_ms)
                    + Duration::from_secs(1),
                duration: duration.map(Duration::from_secs_f32),
            };
            match capture {
                Some(dir) => {
                    let transport = RecordingTransport::new(manager, FrameCapture::create(dir)?);
                    let observer = ObserverSyncManager::new(transport, assets, config.sync);
                    let observer = run_observer(observer, &pacing)?;
                    let capture = observer.transport().capture();
                    info!(
                        frames = capture.frames(),
                        dir = %capture.dir().display(),
                        "capture complete"
                    );
                    print_mirror(observer.scene());
                }
                None => {
                    let observer = ObserverSyncManager::new(manager, assets, config.sync);
                    let observer = run_observer(observer, &pacing)?;
                    print_mirror(observer.scene());
                }
            }
            Ok(())
        }
        Command::Inspect {
            path,
            glob,
            sort,
            limit,
            format,
        } => {
            let limits = config.sync.codec_limits();
            if path.is_dir() {
                let entries = collect_entries(&path, glob.as_deref())?;
                let mut entries = sort_entries(entries, sort);
                let limit = limit.or(sort.map(|EntrySort::Size| 10));
                if let Some(limit) = limit {
                    entries.truncate(limit);
                }
                for entry in entries {
                    let bytes = fs::read(&entry.path)
                        .with_context(|| format!("read frame {}", entry.path.display()))?;
                    let report = inspect_frame(&bytes, &limits)
                        .with_context(|| format!("inspect {}", entry.path.display()))?;
                    if matches!(format, OutputFormat::Pretty) {
                        println!("== {} ({} bytes) ==", entry.path.display(), entry.size);
                    }
                    print_report(&report, format)?;
                }
            } else {
                let bytes = fs::read(&path)
                    .with_context(|| format!("read frame {}", path.display()))?;
                let report = inspect_frame(&bytes, &limits)?;
                print_report(&report, format)?;
            }
            Ok(())
        }
    }
}

fn run_host(
    config: ToolConfig,
    port: u16,
    ticks: Option<u64>,
    manifest: Option<&Path>,
) -> Result<()> {
    let assets = Arc::new(AssetCache::build(&demo_assets()));
    if let Some(path) = manifest {
        assets
            .to_manifest()
            .save(path)
            .with_context(|| format!("save manifest {}", path.display()))?;
        info!(path = %path.display(), assets = assets.len(), "wrote asset manifest");
    }

    let mut manager = ConnectionManager::new(config.net);
    let addr = manager
        .start_listening(port)
        .with_context(|| format!("listen on port {port}"))?;
    info!(%addr, "hosting demo scene");

    let interval = config.sync.tick_interval();
    let mut host = HostSyncManager::new(manager, assets, config.sync);
    let mut demo = DemoScene::new();
    let start = Instant::now();
    let mut tick = 0u64;
    while ticks.map_or(true, |limit| tick < limit) {
        let started = Instant::now();
        demo.advance(start.elapsed().as_secs_f32());
        let report = host.tick(demo.scene())?;
        if report.dropped > 0 {
            warn!(tick, dropped = report.dropped, "dropped observers after failed sends");
        }
        if report.throttled > 0 {
            debug!(tick, connections = report.throttled, "throttled congested observers");
        }
        if report.frames_sent > 0 {
            debug!(
                tick,
                frames = report.frames_sent,
                bytes = report.bytes_sent,
                tombstones = report.tombstones,
                "sent"
            );
        }
        tick += 1;
        thread::sleep(interval.saturating_sub(started.elapsed()));
    }
    info!(ticks = tick, "host stopped");
    Ok(())
}

struct Pacing {
    interval: Duration,
    /// How long to wait for the first connection.
    give_up: Duration,
    duration: Option<Duration>,
}

fn run_observer<T: SyncTransport>(
    mut observer: ObserverSyncManager<T>,
    pacing: &Pacing,
) -> Result<ObserverSyncManager<T>> {
    observer.set_listener(Box::new(LogListener));
    let start = Instant::now();
    let mut connected = false;
    loop {
        let elapsed = start.elapsed();
        if pacing.duration.is_some_and(|limit| elapsed >= limit) {
            break;
        }
        let report = observer.tick(elapsed.as_secs_f32())?;
        if report.desyncs > 0 {
            warn!(desyncs = report.desyncs, "dropped desynced connection");
        }
        if observer.connections().is_empty() {
            if connected {
                info!("host disconnected");
                break;
            }
            if elapsed >= pacing.give_up {
                bail!("no connection after {:?}", pacing.give_up);
            }
        } else if !connected {
            connected = true;
            info!("connected");
        }
        thread::sleep(pacing.interval);
    }
    Ok(observer)
}

struct LogListener;

impl MirrorListener for LogListener {
    fn entity_created(&mut self, entity: EntityId) {
        debug!(%entity, "entity created");
    }

    fn component_updated(&mut self, entity: EntityId, data: &ComponentData, flags: ChangeFlags) {
        debug!(%entity, kind = %data.kind(), %flags, "component updated");
    }

    fn entity_destroyed(&mut self, entity: EntityId) {
        debug!(%entity, "entity destroyed");
    }
}

fn load_assets(manifest: Option<&Path>) -> Result<Arc<AssetCache>> {
    let cache = match manifest {
        Some(path) => {
            let manifest = AssetManifest::load(path)
                .with_context(|| format!("load manifest {}", path.display()))?;
            AssetCache::from_manifest(&manifest)
        }
        None => AssetCache::build(&demo_assets()),
    };
    Ok(Arc::new(cache))
}

fn print_report(report: &scenecast_tools::FrameReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).context("serialize json")?;
            println!("{json}");
        }
        OutputFormat::Pretty => print!("{}", format_pretty(report)),
    }
    Ok(())
}

fn print_mirror(scene: &MirrorScene) {
    println!("mirrored entities: {}", scene.len());
    for entity in scene.entity_ids() {
        let name = scene
            .transform(entity)
            .map_or("<no transform>", |transform| transform.name.as_str());
        let kinds: Vec<_> = scene
            .entity(entity)
            .map(|e| e.components().map(|c| c.kind().name()).collect())
            .unwrap_or_default();
        println!("  {entity} {name}: {}", kinds.join(", "));
    }
}
