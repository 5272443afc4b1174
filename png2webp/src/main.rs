use clap::{CommandFactory, Parser};
use png2webp::conversion_api::{ConversionSettings, DEFAULT_METHOD, DEFAULT_QUALITY};
use png2webp::disposal::{Disposer, MissingTrashPolicy};
use png2webp::driver::run_batch;
use png2webp::exif_tags::TagOrder;
use shared_utils::logging::{init_logging, LogConfig};
use std::path::PathBuf;
use tracing::error;

const NOTICE: &str = "\
example usage:

    Basic Usage (80% quality, good for most cases):
png2webp --path ./images --quality 80

    Faster Conversion (method 4 is slightly faster than default 6, see if you like it):
png2webp --path ./images --quality 80 --method 4

    WebP files will use current datetime of creation:
png2webp --path ./images --quality 80 --use_current_date

    Send the original PNG files to the recycle bin after conversion:
png2webp --path ./images --quality 80 --delete_after

    Lossless Conversion (slower process, almost same size to PNG, generally not advised for most scenarios):
    Caution: Utilizing --lossless combined with --quality 100 significantly increases conversion time.
png2webp --path ./images --lossless --quality 80 --use_current_date
";

#[derive(Parser)]
#[command(name = "png2webp")]
#[command(
    version,
    about = "Convert PNG images to WebP format while preserving ComfyUI's metadata and timestamps.",
    long_about = None,
    after_help = NOTICE
)]
struct Cli {
    /// Path to the directory containing PNG images
    #[arg(long)]
    path: PathBuf,

    /// Send the PNG images to the recycle bin after converting to WebP
    #[arg(long = "delete_after")]
    delete_after: bool,

    /// Use current date instead of copying original file datetime
    #[arg(long = "use_current_date")]
    use_current_date: bool,

    /// WebP quality (0-100)
    #[arg(long, default_value_t = DEFAULT_QUALITY, value_parser = clap::value_parser!(u8).range(0..=100))]
    quality: u8,

    /// Use lossless compression
    #[arg(long)]
    lossless: bool,

    /// Compression method (0=fast, 6=better)
    #[arg(long, default_value_t = DEFAULT_METHOD, value_parser = clap::value_parser!(u8).range(0..=6))]
    method: u8,

    /// What to do when --delete_after is set but no recycle bin is available
    #[arg(long = "on_missing_trash", value_enum, default_value_t = MissingTrashPolicy::Prompt)]
    on_missing_trash: MissingTrashPolicy,

    /// Assign EXIF tags to metadata keys in sorted key order instead of file order
    #[arg(long = "sorted_tags")]
    sorted_tags: bool,

    /// Directory for png2webp_conversion.log
    #[arg(long = "log_dir", default_value = ".")]
    log_dir: PathBuf,
}

impl Cli {
    fn settings(&self) -> ConversionSettings {
        ConversionSettings {
            lossless: self.lossless,
            quality: self.quality,
            method: self.method,
            use_current_date: self.use_current_date,
            delete_after: self.delete_after,
            tag_order: if self.sorted_tags {
                TagOrder::Sorted
            } else {
                TagOrder::Source
            },
        }
    }
}

fn main() -> anyhow::Result<()> {
    if std::env::args_os().len() <= 1 {
        Cli::command().print_help()?;
        return Ok(());
    }

    let cli = Cli::parse();

    let _guard = init_logging("png2webp", LogConfig::new().with_log_dir(&cli.log_dir))?;

    if !cli.path.exists() {
        eprintln!("Error: {} does not exist", cli.path.display());
        return Ok(());
    }

    let mut disposer = Disposer::system(cli.on_missing_trash);
    if let Err(e) = run_batch(&cli.path, &cli.settings(), &mut disposer) {
        error!("{}", e);
    }

    Ok(())
}
