// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::{Args, Parser, Subcommand};

use crate::cli::logging::LogLevel;

/// Default heatmap tensor shape: one image, 17 COCO keypoints, 64x48 cells.
pub const DEFAULT_SHAPE: &str = "1,17,64,48";

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Annotate Options:
    --image, -i <IMAGE>      Original image the heatmaps were computed for
    --heatmap <HEATMAP>      Raw little-endian f32 heatmap file
    --shape <SHAPE>          Heatmap tensor shape [default: 1,17,64,48]
    --output-size <W,H>      Heatmap width,height used for scaling [default: tensor size]
    --marker-ratio <R>       Joint radius as a fraction of the mean image side [default: 0.005]
    --font <FONT>            TrueType font for the posture label
    --save-dir <DIR>         Base directory for annotated images [default: runs/posture]
    --weak-conf <CONF>       Warn about keypoints whose peak is below this value [default: 0.3]
    --verbose                Show verbose output
    --quiet, -q              Print errors only

Examples:
    posture-inference annotate --image person.jpg --heatmap person.f32
    posture-inference annotate -i person.jpg --heatmap person.f32 --shape 1,17,96,72
    posture-inference annotate -i person.jpg --heatmap person.f32 --output-size 48,64 --font Arial.ttf"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode heatmaps, classify the posture and save an annotated image
    Annotate(AnnotateArgs),
}

/// Arguments for the annotate command.
#[derive(Args, Debug)]
pub struct AnnotateArgs {
    /// Original image the heatmaps were computed for
    #[arg(short, long)]
    pub image: String,

    /// Raw little-endian f32 heatmap file
    #[arg(long)]
    pub heatmap: String,

    /// Heatmap tensor shape as comma-separated dimensions
    #[arg(long, default_value = DEFAULT_SHAPE)]
    pub shape: String,

    /// Heatmap width,height used for the scale factors
    #[arg(long)]
    pub output_size: Option<String>,

    /// Joint radius as a fraction of the mean image side
    #[arg(long, default_value_t = 0.005)]
    pub marker_ratio: f32,

    /// TrueType font for the posture label
    #[arg(long)]
    pub font: Option<String>,

    /// Base directory for annotated images
    #[arg(long, default_value = "runs/posture")]
    pub save_dir: String,

    /// Warn about keypoints whose peak heatmap value is below this
    #[arg(long, default_value_t = 0.3)]
    pub weak_conf: f32,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,

    /// Print errors only
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,
}

impl AnnotateArgs {
    /// Console log level selected by `--quiet` and `--verbose`.
    #[must_use]
    pub const fn log_level(&self) -> LogLevel {
        if self.quiet {
            LogLevel::Quiet
        } else if self.verbose {
            LogLevel::Verbose
        } else {
            LogLevel::Normal
        }
    }
}
