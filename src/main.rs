use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use id_verify::camera::{classify_facing, list_devices, CameraCapture, FrameSource};
use id_verify::config::Config;
use id_verify::gemini::{GeminiClient, DEFAULT_MODEL, GEMINI_API_KEY_ENV};
use id_verify::workflow::{VerificationWorkflow, Verifier, WorkflowStep};

#[derive(Parser)]
#[command(name = "id-verify")]
#[command(version)]
#[command(about = "Camera-based identity verification wizard")]
#[command(
    long_about = "Walks through capturing a photo ID and a live selfie with the device \
    camera, submits both to Gemini for a match and authenticity judgment, and shows \
    the result."
)]
#[command(after_help = "EXAMPLES:
    # Run the verification wizard
    id-verify verify

    # Keep the captured stills for audit
    id-verify verify --output ./captures

    # Use a specific model
    id-verify verify --model gemini-2.0-pro

    # List detected cameras with their inferred facing
    id-verify list-cameras

ENVIRONMENT:
    GEMINI_API_KEY    Required for 'verify'. Your Gemini API key (.env supported).")]
struct Cli {
    /// Path to a config file (default: ~/.config/id-verify/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the capture and verification wizard
    #[command(after_help = "EXAMPLES:
    id-verify verify
    id-verify verify --output ./captures
    id-verify verify --model gemini-2.0-pro")]
    Verify {
        /// Directory to save the captured ID and selfie JPEGs into
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Gemini model to use (overrides config)
        #[arg(long)]
        model: Option<String>,
    },

    /// List available camera devices
    ListCameras,
}

/// A user action parsed from one line of wizard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WizardAction {
    Start,
    Shutter,
    Confirm,
    Retake,
    Flip,
    Cancel,
    Restart,
    Quit,
}

/// Parse a line of input into an action for the current step.
///
/// An empty line means "the main thing": start on the welcome screen,
/// shutter on a capture screen, confirm on a review screen. Everything
/// else is a one-letter command.
fn parse_action(step: WorkflowStep, input: &str) -> Option<WizardAction> {
    let trimmed = input.trim().to_lowercase();

    if trimmed.is_empty() {
        return match step {
            WorkflowStep::Welcome => Some(WizardAction::Start),
            WorkflowStep::CaptureId | WorkflowStep::CaptureSelfie => Some(WizardAction::Shutter),
            WorkflowStep::ReviewId | WorkflowStep::ReviewSelfie => Some(WizardAction::Confirm),
            _ => None,
        };
    }

    match trimmed.as_str() {
        "q" | "quit" => Some(WizardAction::Quit),
        "c" | "cancel" => Some(WizardAction::Cancel),
        "f" | "flip" => Some(WizardAction::Flip),
        "k" | "keep" | "y" => Some(WizardAction::Confirm),
        "r" => match step {
            WorkflowStep::Result => Some(WizardAction::Restart),
            _ => Some(WizardAction::Retake),
        },
        "retake" => Some(WizardAction::Retake),
        "restart" => Some(WizardAction::Restart),
        _ => None,
    }
}

/// Print the screen for the current step and the available actions.
fn render_step<S: FrameSource, V: Verifier>(workflow: &VerificationWorkflow<S, V>) {
    println!();
    if let Some(message) = workflow.error() {
        println!("! {}", message);
    }

    match workflow.step() {
        WorkflowStep::Welcome => {
            println!("=== Identity Verification ===");
            println!("You will capture a photo of your ID, then a selfie.");
            println!("[Enter] start    [q] quit");
        }
        WorkflowStep::CaptureId => {
            println!("--- Capture ID document (back camera) ---");
            println!("Hold your ID steady in front of the camera.");
            print_capture_actions(workflow.can_flip());
        }
        WorkflowStep::CaptureSelfie => {
            println!("--- Capture selfie (front camera) ---");
            println!("Look straight at the camera.");
            print_capture_actions(workflow.can_flip());
        }
        WorkflowStep::ReviewId => {
            if let Some(image) = workflow.id_image() {
                println!(
                    "Captured ID photo: {}x{}, {} bytes",
                    image.width,
                    image.height,
                    image.data.len()
                );
            }
            println!("[Enter/k] keep    [r] retake    [c] cancel    [q] quit");
        }
        WorkflowStep::ReviewSelfie => {
            if let Some(image) = workflow.selfie_image() {
                println!(
                    "Captured selfie: {}x{}, {} bytes",
                    image.width,
                    image.height,
                    image.data.len()
                );
            }
            println!("[Enter/k] keep    [r] retake    [c] cancel    [q] quit");
        }
        WorkflowStep::Processing => {
            println!("Verifying...");
        }
        WorkflowStep::Result => {
            println!("=== Result ===");
            match workflow.outcome() {
                Some(outcome) => {
                    let verdict = if outcome.is_match {
                        "MATCH"
                    } else {
                        "NO MATCH"
                    };
                    println!("{} (confidence {:.0}%)", verdict, outcome.confidence * 100.0);
                    println!("{}", outcome.reasoning);
                }
                None => {
                    // Error message already printed above
                }
            }
            println!("[r] restart    [q] quit");
        }
    }
}

fn print_capture_actions(can_flip: bool) {
    if can_flip {
        println!("[Enter] capture    [f] flip camera    [c] cancel    [q] quit");
    } else {
        println!("[Enter] capture    [c] cancel    [q] quit");
    }
}

/// Save the two captured stills for audit.
fn save_captures<S: FrameSource, V: Verifier>(
    workflow: &VerificationWorkflow<S, V>,
    dir: &Path,
) -> Result<(), io::Error> {
    std::fs::create_dir_all(dir)?;
    if let Some(image) = workflow.id_image() {
        std::fs::write(dir.join("id.jpg"), &image.data)?;
    }
    if let Some(image) = workflow.selfie_image() {
        std::fs::write(dir.join("selfie.jpg"), &image.data)?;
    }
    log::info!("captured stills saved to {}", dir.display());
    Ok(())
}

async fn run_verify(
    config: Config,
    model: Option<String>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let model = model
        .or_else(|| config.gemini.model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let api_key = std::env::var(GEMINI_API_KEY_ENV).map_err(|_| {
        format!(
            "{} is not set. Export it or add it to a .env file.",
            GEMINI_API_KEY_ENV
        )
    })?;
    let client = GeminiClient::with_model(api_key, model)?;
    let camera = CameraCapture::new(config.camera_settings())?;
    let mut workflow = VerificationWorkflow::new(camera, client);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        render_step(&workflow);
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        let Some(action) = parse_action(workflow.step(), &line) else {
            println!("Unrecognized input.");
            continue;
        };

        let result = match action {
            WizardAction::Quit => break,
            WizardAction::Start => workflow.start(),
            WizardAction::Shutter => workflow.press_shutter(),
            WizardAction::Retake => workflow.retake(),
            WizardAction::Flip => workflow.flip(),
            WizardAction::Cancel => workflow.cancel(),
            WizardAction::Restart => workflow.restart(),
            WizardAction::Confirm => {
                let verifying = workflow.step() == WorkflowStep::ReviewSelfie;
                if verifying {
                    println!("Verifying...");
                }
                let result = workflow.confirm().await;
                if verifying && result.is_ok() {
                    if let Some(dir) = &output {
                        if let Err(e) = save_captures(&workflow, dir) {
                            log::warn!("could not save captures: {}", e);
                        }
                    }
                }
                result
            }
        };

        if let Err(e) = result {
            // The wizard only offers valid actions; reaching this means
            // the input mapped to a trigger the step does not support.
            println!("{}", e);
        }
    }

    Ok(())
}

fn run_list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    let devices = list_devices()?;
    if devices.is_empty() {
        println!("No cameras detected.");
        return Ok(());
    }

    println!("Detected cameras:");
    for device in &devices {
        let facing = match classify_facing(&device.name) {
            Some(facing) => format!("{} facing", facing),
            None => "facing unknown".to_string(),
        };
        println!("  {} - {}", device, facing);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::ListCameras) => run_list_cameras(),
        Some(Commands::Verify { output, model }) => run_verify(config, model, output).await,
        None => run_verify(config, None, None).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
