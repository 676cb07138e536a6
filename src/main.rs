use clap::{Parser, Subcommand};
use file_bridge::{BridgeConfig, EncodedImage, FileBridge, FileFilter, FileSelection};
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON instead of the bare value
    #[clap(long, global = true)]
    json: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode a file as a data URI
    Encode {
        path: PathBuf,
        /// MIME type; guessed from the extension when omitted
        #[clap(short, long)]
        mime: Option<String>,
    },
    /// Pick an image with the native open dialog and encode it
    Pick {
        /// Extension patterns such as "*.jpg;*.png"
        #[clap(short, long)]
        filter: Vec<String>,
        #[clap(short, long)]
        mime: Option<String>,
    },
    /// Ask for an output location with the native save dialog
    SavePath {
        #[clap(short, long)]
        default_name: Option<String>,
    },
    /// Decode a data URI read from a file and write the raw bytes
    Decode { input: PathBuf, output: PathBuf },
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let mut config = match &args.config {
        Some(path) => BridgeConfig::load(path)?,
        None => BridgeConfig::default(),
    };
    if config.start_directory.is_none() {
        config.start_directory = dirs::picture_dir();
    }

    let bridge = FileBridge::native(config);

    match args.command {
        Command::Encode { path, mime } => {
            let image = match mime {
                Some(mime) => bridge.read_file_as_data_uri(&path, &mime)?,
                None => bridge.read_file_as_data_uri_guessed(&path)?,
            };
            print_image(&image, args.json)?;
        }
        Command::Pick { filter, mime } => {
            let filters: Vec<FileFilter> = filter
                .iter()
                .map(|patterns| FileFilter::parse(patterns.as_str(), patterns))
                .collect();
            match bridge.select_input_image(&filters)? {
                FileSelection::Selected(path) => {
                    let image = match mime {
                        Some(mime) => bridge.read_file_as_data_uri(&path, &mime)?,
                        None => bridge.read_file_as_data_uri_guessed(&path)?,
                    };
                    print_image(&image, args.json)?;
                }
                FileSelection::Cancelled => println!("No file selected"),
            }
        }
        Command::SavePath { default_name } => {
            let default_name = default_name.unwrap_or_default();
            match bridge.select_output_path(&default_name)? {
                FileSelection::Selected(path) => println!("{}", path.display()),
                FileSelection::Cancelled => println!("No file path selected"),
            }
        }
        Command::Decode { input, output } => {
            let image = EncodedImage::parse(&fs::read_to_string(&input)?)?;
            bridge.write_output(&output, &image.decode()?)?;
            println!("Wrote {} bytes ({}) to {}", image.byte_len, image.mime_type, output.display());
        }
    }

    Ok(())
}

fn print_image(image: &EncodedImage, json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(image)?);
    } else {
        println!("{}", image.data_uri);
    }
    Ok(())
}
