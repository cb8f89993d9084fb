use config::Config;
use device_camera::interface::DeviceCamera;
use device_display::impl_console::DeviceDisplayConsole;
use device_display::impl_gui::DeviceDisplayGui;
use feature_extractor::impl_tract_onnx::{ExtractorConfig, FeatureExtractorTractOnnx};
use feature_extractor::interface::FeatureExtractor;
use feature_extractor::model_store::ensure_model;
use library::frame_scheduler::impl_display_refresh::FrameSchedulerDisplayRefresh;
use library::frame_scheduler::interface::FrameScheduler;
use library::logger::impl_console::LoggerConsole;
use library::logger::interface::Logger;
use std::io::BufRead;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use studio::core::Event;
use studio::main::Studio;

mod classifier;
mod config;
mod device_camera;
mod device_display;
mod feature_extractor;
mod library;
mod sample_buffer;
mod studio;

type Error = Box<dyn std::error::Error + Send + Sync>;

/// Everything the studio needs apart from its display.
struct Devices {
    class_cameras: Vec<Arc<dyn DeviceCamera + Send + Sync>>,
    prediction_camera: Arc<dyn DeviceCamera + Send + Sync>,
    feature_extractor: Arc<dyn FeatureExtractor + Send + Sync>,
    frame_scheduler: Arc<dyn FrameScheduler + Send + Sync>,
}

fn main() -> Result<(), Error> {
    let config = Config::default();
    let console = std::env::args().skip(1).any(|arg| arg == "--console");

    let logger: Arc<dyn Logger + Send + Sync> =
        Arc::new(LoggerConsole::new(config.logger_timezone));

    ensure_model(
        &config.extractor_model_url,
        &config.extractor_model_path,
        logger.clone(),
    )?;

    let feature_extractor = Arc::new(FeatureExtractorTractOnnx::load(
        &config.extractor_model_path,
        ExtractorConfig {
            input_width: config.extractor_input_width,
            input_height: config.extractor_input_height,
            output_name: config.extractor_output_name.clone(),
            dimension: config.extractor_dimension,
        },
        logger.clone(),
    )?);

    // One physical camera backs every capture source and the prediction source.
    let camera = camera(&config, logger.clone());

    let devices = Devices {
        class_cameras: (0..config.class_count()).map(|_| camera.clone()).collect(),
        prediction_camera: camera,
        feature_extractor,
        frame_scheduler: Arc::new(FrameSchedulerDisplayRefresh::new(config.refresh_rate)),
    };

    if console {
        run_console(config, logger, devices)
    } else {
        run_gui(config, logger, devices)
    }
}

#[cfg(feature = "webcam")]
fn camera(
    config: &Config,
    logger: Arc<dyn Logger + Send + Sync>,
) -> Arc<dyn DeviceCamera + Send + Sync> {
    use device_camera::impl_nokhwa::{DeviceCameraNokhwa, WebcamConfig};

    Arc::new(DeviceCameraNokhwa::new(
        WebcamConfig {
            index: 0,
            width: config.camera_width,
            height: config.camera_height,
            framerate: 30,
        },
        logger,
    ))
}

#[cfg(not(feature = "webcam"))]
fn camera(
    config: &Config,
    logger: Arc<dyn Logger + Send + Sync>,
) -> Arc<dyn DeviceCamera + Send + Sync> {
    use device_camera::impl_fake::DeviceCameraFake;

    let _ = logger.warn("Built without the webcam feature, frames are synthetic");
    Arc::new(DeviceCameraFake::new(
        logger,
        config.camera_width,
        config.camera_height,
    ))
}

fn run_gui(
    config: Config,
    logger: Arc<dyn Logger + Send + Sync>,
    devices: Devices,
) -> Result<(), Error> {
    let gui = DeviceDisplayGui::new(config.class_names.clone());

    let mut studio = Studio::new(
        config,
        logger,
        devices.class_cameras,
        devices.prediction_camera,
        devices.feature_extractor,
        Arc::new(Mutex::new(gui.clone())),
        devices.frame_scheduler,
    )?;
    let sender = studio.sender();

    let studio_thread = std::thread::spawn(move || studio.run());

    // The window owns the main thread until it is closed.
    let window_result = gui.run_window(sender.clone());

    let _ = sender.send(Event::Shutdown);
    studio_thread
        .join()
        .map_err(|_| "studio thread panicked".to_string())?;

    window_result
}

fn run_console(
    config: Config,
    logger: Arc<dyn Logger + Send + Sync>,
    devices: Devices,
) -> Result<(), Error> {
    let display = DeviceDisplayConsole::new(config.class_names.clone());

    let mut studio = Studio::new(
        config,
        logger.clone(),
        devices.class_cameras,
        devices.prediction_camera,
        devices.feature_extractor,
        Arc::new(Mutex::new(display)),
        devices.frame_scheduler,
    )?;

    let sender = studio.sender();
    std::thread::spawn(move || read_commands(sender, logger));

    studio.run();
    Ok(())
}

/// Feeds stdin commands to the studio until `quit` or end of input.
fn read_commands(events: Sender<Event>, logger: Arc<dyn Logger + Send + Sync>) {
    let _ = logger.info("Commands: enable | capture <n> | train | reset | quit");

    for line in std::io::stdin().lock().lines() {
        let Ok(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let Some(event) = parse_command(&line) else {
            let _ = logger.warn(&format!("Unknown command: {}", line.trim()));
            continue;
        };

        let quit = matches!(event, Event::Shutdown);
        if events.send(event).is_err() || quit {
            return;
        }
    }

    let _ = events.send(Event::Shutdown);
}

/// `capture <n>` takes a 1-based class number and toggles gathering for it.
fn parse_command(line: &str) -> Option<Event> {
    let mut words = line.split_whitespace();
    let event = match (words.next()?, words.next()) {
        ("enable", None) => Event::EnableCameraPressed,
        ("capture", Some(class)) => {
            Event::CaptureToggled(class.parse::<usize>().ok()?.checked_sub(1)?)
        }
        ("train", None) => Event::TrainPressed,
        ("reset", None) => Event::ResetPressed,
        ("quit", None) => Event::Shutdown,
        _ => return None,
    };
    if words.next().is_some() {
        return None;
    }
    Some(event)
}
