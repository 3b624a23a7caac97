use anyhow::{anyhow, bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use pip_core::{EventStream, Pose, Vec3};
use pip_representation::{Control, PipConfig, Representation, RepresentationEvent, Surface};
use pip_scene::SceneMode;
use pip_test_utils::{FakeFrame, FakeXrPlatform, Harness, WIDGET_BARCODE};
use pip_xr::{SessionMode, XrSession};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("pip-sim")
        .version(pip_representation::VERSION)
        .about("Product in Perspective simulator")
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .default_value("info")
                .help("Log filter used when RUST_LOG is unset"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .subcommand(
            Command::new("run")
                .about("Scan a barcode, enter AR, place the model and exit")
                .arg(
                    Arg::new("barcode")
                        .long("barcode")
                        .default_value(WIDGET_BARCODE)
                        .help("Barcode shown to the camera"),
                )
                .arg(
                    Arg::new("vr")
                        .long("vr")
                        .action(ArgAction::SetTrue)
                        .help("Let the platform land in immersive VR instead of AR"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the event trace as JSON lines"),
                )
                .arg(
                    Arg::new("wait-ms")
                        .long("wait-ms")
                        .default_value("3000")
                        .value_parser(value_parser!(u64))
                        .help("How long to wait for each expected event"),
                ),
        )
        .subcommand(Command::new("config").about("Print the effective configuration"))
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

fn load_config(matches: &ArgMatches) -> Result<PipConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => PipConfig::load(path)
            .with_context(|| format!("loading {}", path.display())),
        None => Ok(Harness::config()),
    }
}

#[derive(Debug)]
struct RunOptions {
    barcode: String,
    vr: bool,
    json: bool,
    wait: Duration,
}

impl RunOptions {
    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            barcode: matches
                .get_one::<String>("barcode")
                .cloned()
                .unwrap_or_else(|| WIDGET_BARCODE.to_string()),
            vr: matches.get_flag("vr"),
            json: matches.get_flag("json"),
            wait: Duration::from_millis(
                matches.get_one::<u64>("wait-ms").copied().unwrap_or(3000),
            ),
        }
    }
}

/// Prints every outward event while waiting for specific ones
struct Trace {
    events: EventStream<RepresentationEvent>,
    json: bool,
    wait: Duration,
    printed: usize,
}

impl Trace {
    fn print(&mut self, event: &RepresentationEvent) -> Result<()> {
        self.printed += 1;
        if self.json {
            println!("{}", serde_json::to_string(event)?);
        } else {
            println!("{:>3}  {:?}", self.printed, event);
        }
        Ok(())
    }

    async fn until(
        &mut self,
        what: &str,
        wanted: impl Fn(&RepresentationEvent) -> bool,
    ) -> Result<RepresentationEvent> {
        let deadline = Instant::now() + self.wait;
        loop {
            let event = match tokio::time::timeout_at(deadline, self.events.next()).await {
                Ok(Some(event)) => event,
                Ok(None) => bail!("event stream closed while waiting for {what}"),
                Err(_) => bail!("timed out waiting for {what}"),
            };
            self.print(&event)?;
            if wanted(&event) {
                return Ok(event);
            }
        }
    }

    async fn wait_for(&mut self, wanted: &RepresentationEvent) -> Result<()> {
        self.until(&format!("{wanted:?}"), |e| e == wanted).await?;
        Ok(())
    }
}

async fn send(controls: &mpsc::Sender<Control>, control: Control) -> Result<()> {
    controls
        .send(control)
        .await
        .map_err(|_| anyhow!("representation loop stopped"))
}

async fn forward_signals(harness: &Harness, controls: &mpsc::Sender<Control>) -> Result<()> {
    for signal in harness.platform.take_signals() {
        send(controls, Control::Signal(signal)).await?;
    }
    Ok(())
}

async fn run_scenario(config: PipConfig, options: RunOptions) -> Result<()> {
    let platform = FakeXrPlatform::new();
    if options.vr {
        platform.land_in(SessionMode::ImmersiveVr);
    }
    let harness = Harness::with_platform(platform);

    let mut collaborators = harness.collaborators();
    collaborators.storage = Arc::new(config.model_storage());

    let mut representation = Representation::load(config, collaborators)
        .await
        .context("startup failed")?;
    let mut trace = Trace {
        events: representation.subscribe(),
        json: options.json,
        wait: options.wait,
        printed: 0,
    };
    representation.start().await;

    let (controls, mut rx) = mpsc::channel(64);
    let runner = tokio::spawn(async move {
        representation.run(&mut rx).await;
    });

    trace.wait_for(&RepresentationEvent::Ready).await?;

    tracing::info!("showing barcode {}", options.barcode);
    harness.camera.show_code(&options.barcode);
    trace
        .until("a recognized product", |e| {
            matches!(e, RepresentationEvent::CandidateChanged(_))
        })
        .await
        .with_context(|| format!("barcode {} is not in the catalog", options.barcode))?;

    send(&controls, Control::Select).await?;
    trace
        .wait_for(&RepresentationEvent::SurfaceChanged(Surface::Scene))
        .await?;
    forward_signals(&harness, &controls).await?;

    if options.vr {
        trace
            .until("an error", |e| matches!(e, RepresentationEvent::Error(_)))
            .await?;
    } else {
        trace
            .wait_for(&RepresentationEvent::SceneModeChanged(SceneMode::Placing))
            .await?;

        // Let the hit-test source resolve before the first frame
        tokio::time::sleep(Duration::from_millis(20)).await;
        let session = harness
            .platform
            .last_session()
            .ok_or_else(|| anyhow!("no session was requested"))?;
        let floor = Pose::at(Vec3::new(0.0, -1.2, -1.5));
        send(
            &controls,
            Control::Frame(Arc::new(FakeFrame::new(session.id()).with_hit(floor))),
        )
        .await?;
        send(&controls, Control::Proceed).await?;
        trace
            .wait_for(&RepresentationEvent::SceneModeChanged(SceneMode::Viewing))
            .await?;

        harness.platform.exit_presentation();
        forward_signals(&harness, &controls).await?;
    }

    trace
        .wait_for(&RepresentationEvent::SurfaceChanged(Surface::Scanner))
        .await?;

    send(&controls, Control::Shutdown).await?;
    runner.await?;
    tracing::info!("flow completed after {} events", trace.printed);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    let level = matches
        .get_one::<String>("log-level")
        .map_or("info", String::as_str);
    init_tracing(level, matches.get_flag("log-json"));

    let config = load_config(&matches)?;

    match matches.subcommand() {
        Some(("config", _)) => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
        Some(("run", args)) => {
            run_scenario(config, RunOptions::from_matches(args)).await?;
        }
        _ => {
            cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
