//! Interactive detector tuning and camera-to-arm data collection

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::{debug, error, info, warn};
use opencv::{
    core::{Mat, Size},
    highgui,
};

use hue_arm_calib::calibration::RecordSink;
use hue_arm_calib::constants::frame;
use hue_arm_calib::control::InputEvent;
use hue_arm_calib::overlay::StatusOverlay;
use hue_arm_calib::source::{FrameSource, SourceKind};
use hue_arm_calib::tuning::TuningPanel;
use hue_arm_calib::{
    detect, ArmDriver, CalibrationError, CalibrationSession, DatasetFile, Detection,
    DetectorConfig, PoseDims, Result, SimulatedArm, TriggerOutcome,
};

const FRAME_WINDOW: &str = "window";
const PANEL_WINDOW: &str = "panel";

#[derive(Parser)]
#[command(name = "hue-arm-calib", version)]
#[command(about = "HSV target detection and camera-to-arm correspondence collection")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tune the detector on live frames; `s` saves the configuration
    Tune(SourceArgs),

    /// Collect target/arm-pose correspondences into a dataset file
    Calibrate(CalibrateArgs),

    /// Write the default detector configuration
    InitConfig {
        /// Destination file
        #[arg(default_value = "output.json")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Camera (`/dev/videoN` or an index) or still image path
    #[arg(long, default_value = "/dev/video0")]
    input: String,

    /// Detector configuration to start from (defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where the save key writes the configuration
    #[arg(long, default_value = "output.json")]
    save_to: PathBuf,

    /// Working frame width
    #[arg(long, default_value_t = frame::WIDTH)]
    width: i32,

    /// Working frame height
    #[arg(long, default_value_t = frame::HEIGHT)]
    height: i32,
}

#[derive(Args, Debug)]
struct CalibrateArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Correspondence dataset; records are appended
    #[arg(long, default_value = "data.csv")]
    data: PathBuf,

    /// Pose values stored per record (3: x,y,z  4: x,y,z,r)
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(3..=4))]
    pose_dims: u8,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Tune(args) => run_tune(&args),
        Commands::Calibrate(args) => run_calibrate(&args),
        Commands::InitConfig { path, force } => run_init_config(&path, force),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

// ── init-config ───────────────────────────────────────────────────────

fn run_init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(CalibrationError::io(
            format!("{} already exists (use --force to overwrite)", path.display()),
            std::io::Error::from(std::io::ErrorKind::AlreadyExists),
        ));
    }
    DetectorConfig::default().to_json_file(path)?;
    println!("default configuration written to {}", path.display());
    Ok(())
}

// ── tune ──────────────────────────────────────────────────────────────

fn run_tune(args: &SourceArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    let mut source = open_source(args)?;
    let mut panel = TuningPanel::create(PANEL_WINDOW, &config)?;
    info!("tuning: s saves to {}, q quits", args.save_to.display());

    let result = tune_loop(source.as_mut(), &mut panel, &mut config, &args.save_to);
    finish(source.as_mut(), result)
}

fn tune_loop(
    source: &mut dyn FrameSource,
    panel: &mut TuningPanel,
    config: &mut DetectorConfig,
    save_to: &Path,
) -> Result<()> {
    loop {
        let frame = source.next_frame()?;
        let detection = detect(&frame, *config)?;
        show(&detection.annotated, &detection.mask)?;

        match InputEvent::from_key(wait_key()?) {
            InputEvent::Quit => return Ok(()),
            InputEvent::SaveConfig => save_config(config, save_to),
            InputEvent::Reconfigure => {
                panel.poll(config)?;
            }
            InputEvent::Trigger => match detection.best() {
                Some(best) => info!(
                    "best target at ({}, {}), angle {:.1}, arc length {:.1}",
                    best.point.x, best.point.y, best.angle, best.arc_length
                ),
                None => info!("no objects detected"),
            },
            InputEvent::Cancel
            | InputEvent::GoHome
            | InputEvent::ResetHome
            | InputEvent::Jog { .. } => {}
        }
    }
}

// ── calibrate ─────────────────────────────────────────────────────────

fn run_calibrate(args: &CalibrateArgs) -> Result<()> {
    let config = load_config(args.source.config.as_deref())?;
    let pose_dims = PoseDims::from_count(args.pose_dims as usize).unwrap_or(PoseDims::Xyzr);
    let mut source = open_source(&args.source)?;
    let mut panel = TuningPanel::create(PANEL_WINDOW, &config)?;

    let mut arm = SimulatedArm::default();
    arm.go_home()?;

    let dataset = DatasetFile::new(args.data.clone());
    info!(
        "calibrating: {} pose values per record, appending to {}",
        pose_dims.count(),
        dataset.path().display()
    );
    let mut session = CalibrationSession::new(arm, dataset, pose_dims, config);

    let result = calibrate_loop(source.as_mut(), &mut panel, &mut session, &args.source.save_to);
    info!("{} records written this session", session.records_written());
    finish(source.as_mut(), result)
}

fn calibrate_loop<A: ArmDriver, S: RecordSink>(
    source: &mut dyn FrameSource,
    panel: &mut TuningPanel,
    session: &mut CalibrationSession<A, S>,
    save_to: &Path,
) -> Result<()> {
    loop {
        let frame = source.next_frame()?;
        let Detection {
            mask,
            mut annotated,
            candidates,
            ..
        } = detect(&frame, session.config())?;

        let pose = match session.arm_mut().current_pose() {
            Ok(pose) => Some(pose),
            Err(e) => {
                debug!("pose unavailable for overlay: {}", e);
                None
            }
        };
        StatusOverlay::new(
            session.state(),
            pose.as_deref(),
            candidates.first(),
            session.last_record(),
        )
        .draw(&mut annotated)?;
        show(&annotated, &mask)?;

        match InputEvent::from_key(wait_key()?) {
            InputEvent::Trigger => match session.trigger(&candidates) {
                Ok(TriggerOutcome::Captured(record)) => println!("{}", record),
                Ok(outcome) => debug!("trigger: {:?}", outcome),
                Err(e) => recover(e)?,
            },
            InputEvent::Cancel => {
                session.cancel();
            }
            InputEvent::SaveConfig => save_config(&session.config(), save_to),
            InputEvent::GoHome => {
                if let Err(e) = session.arm_mut().go_home() {
                    recover(e)?;
                }
            }
            InputEvent::ResetHome => {
                if let Err(e) = session.arm_mut().reset_home() {
                    recover(e)?;
                }
            }
            event @ InputEvent::Jog { .. } => {
                if let Some(delta) = event.jog_delta() {
                    if let Err(e) = session.arm_mut().jog(&delta) {
                        recover(e)?;
                    }
                }
            }
            InputEvent::Quit => return Ok(()),
            InputEvent::Reconfigure => {
                let mut config = session.config();
                if panel.poll(&mut config)? {
                    session.reconfigure(config);
                }
            }
        }
    }
}

// ── shared ────────────────────────────────────────────────────────────

fn load_config(path: Option<&Path>) -> Result<DetectorConfig> {
    match path {
        Some(path) => {
            let config = DetectorConfig::from_json_file(path)?;
            info!("configuration loaded from {}", path.display());
            Ok(config)
        }
        None => Ok(DetectorConfig::default()),
    }
}

fn open_source(args: &SourceArgs) -> Result<Box<dyn FrameSource>> {
    let kind: SourceKind = match args.input.parse() {
        Ok(kind) => kind,
        Err(never) => match never {},
    };
    let source = kind.open(Size::new(args.width, args.height))?;
    highgui::named_window(FRAME_WINDOW, highgui::WINDOW_AUTOSIZE)
        .map_err(|e| CalibrationError::opencv("Creating frame window", e))?;
    Ok(source)
}

fn show(annotated: &Mat, mask: &Mat) -> Result<()> {
    highgui::imshow(FRAME_WINDOW, annotated)
        .map_err(|e| CalibrationError::opencv("Showing frame", e))?;
    highgui::imshow(PANEL_WINDOW, mask).map_err(|e| CalibrationError::opencv("Showing mask", e))
}

fn wait_key() -> Result<i32> {
    highgui::wait_key(1).map_err(|e| CalibrationError::opencv("Polling keys", e))
}

/// Saving the configuration never stops the loop
fn save_config(config: &DetectorConfig, path: &Path) {
    match config.to_json_file(path) {
        Ok(()) => info!("configuration saved to {}", path.display()),
        Err(e) => warn!("{}", e),
    }
}

/// Log recoverable errors and keep going; anything else ends the loop
fn recover(e: CalibrationError) -> Result<()> {
    if e.is_recoverable() {
        warn!("{}", e);
        println!("{}", e.user_message());
        Ok(())
    } else {
        Err(e)
    }
}

fn finish(source: &mut dyn FrameSource, result: Result<()>) -> Result<()> {
    if let Err(e) = source.close() {
        warn!("closing frame source: {}", e);
    }
    if let Err(e) = highgui::destroy_all_windows() {
        debug!("destroying windows: {}", e);
    }
    result
}
