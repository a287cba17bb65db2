use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clipmon::listener::{LinuxCapability, ListenerFactory, ListenerOptions, Platform};
use clipmon::logging::init_logger;
use clipmon::models::{ClipboardChangeEvent, ClipboardDataType, NotificationType};
use clipmon::storage::{Config, ConfigStorage, TomlConfigStorage, ensure_directories};

#[derive(Parser)]
#[command(name = "clipmon")]
#[command(about = "Clipboard change monitor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print clipboard changes until Enter is pressed
    Watch {
        /// Override the configured notification type
        #[arg(short, long, value_enum)]
        notification_type: Option<NotificationArg>,

        /// Suppress repeated identical images
        #[arg(long)]
        verify_images: bool,

        /// Write every new image into this directory
        #[arg(long, value_name = "DIR")]
        save_images: Option<PathBuf>,
    },

    /// Empty the clipboard (Linux only)
    Clear,

    /// Show the config file location and effective settings
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum NotificationArg {
    ChangeNotificationOnly,
    ChangedWithData,
    All,
}

impl From<NotificationArg> for NotificationType {
    fn from(arg: NotificationArg) -> Self {
        match arg {
            NotificationArg::ChangeNotificationOnly => NotificationType::ChangeNotificationOnly,
            NotificationArg::ChangedWithData => NotificationType::ChangedWithData,
            NotificationArg::All => NotificationType::All,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (data_dir, config_dir) = ensure_directories()?;
    let config_storage = TomlConfigStorage::new(config_dir.join("clipmon.toml"));
    let config = config_storage.load()?;

    // Only the long-running monitor gets the file logger
    if matches!(cli.command, Commands::Watch { .. }) {
        if let Err(e) = init_logger(
            data_dir.join("clipmon.log"),
            &config.logging.file_level,
            &config.logging.console_level,
        ) {
            env_logger::init();
            log::warn!("File logging unavailable, using env_logger: {:#}", e);
        }
    } else {
        env_logger::init();
    }

    match cli.command {
        Commands::Watch {
            notification_type,
            verify_images,
            save_images,
        } => cmd_watch(&config, notification_type, verify_images, save_images),
        Commands::Clear => cmd_clear(&config),
        Commands::Config => cmd_config(&config_storage, &config),
    }
}

/// Subscribe a printer, monitor, and stop when stdin yields a line
fn cmd_watch(
    config: &Config,
    notification_type: Option<NotificationArg>,
    verify_images: bool,
    save_images: Option<PathBuf>,
) -> Result<()> {
    let mut options = ListenerOptions::from(config);
    if let Some(arg) = notification_type {
        options.notification_type = arg.into();
    }
    options.verify_new_image_data |= verify_images;

    let factory = ListenerFactory::detect(options)?;
    let mut listener = factory.create();

    listener.subscribe(move |event| {
        println!("{}", describe(event));
        if let (Some(dir), Some(image)) = (&save_images, event.image_content()) {
            let path = dir.join(format!("clip-{}", unix_millis()));
            let saved = image.save(&path)?;
            println!("  saved {}", saved.display());
        }
        Ok(())
    });

    listener
        .start()
        .context("Failed to start clipboard monitoring")?;
    println!(
        "Watching the {} clipboard ({:?}). Press Enter to stop.",
        listener.platform(),
        listener.notification_type()
    );

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;

    listener.stop();
    Ok(())
}

fn cmd_clear(config: &Config) -> Result<()> {
    let factory = ListenerFactory::detect(ListenerOptions::from(config))?;
    if factory.platform() != Platform::Linux {
        bail!("Clearing the clipboard is only supported on Linux");
    }

    let listener = factory.create_for::<LinuxCapability>()?;
    if !listener.clear_clipboard() {
        bail!("Failed to clear clipboard (is xclip or wl-clipboard installed?)");
    }

    println!("Clipboard cleared.");
    Ok(())
}

fn cmd_config(storage: &TomlConfigStorage, config: &Config) -> Result<()> {
    println!("Config file: {}", storage.path().display());
    println!();
    let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;
    print!("{}", rendered);
    Ok(())
}

fn describe(event: &ClipboardChangeEvent) -> String {
    match event.data_type() {
        ClipboardDataType::Files => {
            let paths: Vec<&str> = event.file_paths().collect();
            format!("[files] {}", paths.join(", "))
        }
        ClipboardDataType::Image => match event.image_content() {
            Some(image) => format!("[image] {} ({} bytes)", image.format(), image.len()),
            None => "[image]".to_string(),
        },
        _ => event.summary(80),
    }
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}
