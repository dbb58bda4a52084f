use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{Local, Utc};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::debug;

use crate::clipboard::copy_image_to_clipboard;
use crate::export::{ExportFormat, FileExporter, default_file_name};
use crate::generation::{GenerationController, GenerationOutcome};
use crate::history::{HistoryStore, JsonFileStore};
use crate::logging::init_tracing;
use crate::models::{
    ContentKind, ErrorCorrectionLevel, HistoryEntry, PayloadConfig, RenderParams, Shape,
    VCardConfig, WifiConfig, WifiSecurity,
};
use crate::payload;
use crate::render::{QrCodeEncoder, RenderedImage};
use crate::settings::Settings;
use crate::tui::{browse_history, format_millis};
use crate::utils::{data_dir, format_path_with_tilde, sanitize_for_terminal, sanitize_single_line};

#[derive(Parser)]
#[command(name = "qrforge")]
#[command(version)]
#[command(about = "Generate QR codes for links, text, contacts and WiFi networks", long_about = None)]
pub struct Cli {
    /// More log output on stderr (-v info, -vv debug); QRFORGE_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a QR code and write it to a file
    Generate(GenerateArgs),
    /// Print the payload string a QR code would carry, without rendering
    Payload(ContentArgs),
    /// Manage saved configurations
    #[command(subcommand)]
    History(HistoryCommand),
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// List saved entries, newest first
    List {
        #[arg(long)]
        kind: Option<ContentKind>,
        /// Print the entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one entry in detail
    Show { id: String },
    /// Delete one entry
    Delete { id: String },
    /// Delete every entry
    Clear,
    /// Regenerate a saved entry and write it to a file
    Export {
        id: String,
        #[arg(long)]
        format: Option<ExportFormat>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Browse entries interactively
    Browse,
}

/// What to encode. Only the flags for the selected kind are consulted.
#[derive(Args, Debug, Default)]
pub struct ContentArgs {
    /// url, text, email, phone, wifi or vcard (defaults to the configured kind)
    #[arg(short, long)]
    pub kind: Option<ContentKind>,
    /// URL, text, email address or phone number
    #[arg(short, long)]
    pub text: Option<String>,

    #[arg(long, help_heading = "WiFi")]
    pub ssid: Option<String>,
    #[arg(long, help_heading = "WiFi")]
    pub password: Option<String>,
    /// WPA, WEP or nopass
    #[arg(long, help_heading = "WiFi")]
    pub security: Option<WifiSecurity>,
    #[arg(long, help_heading = "WiFi")]
    pub hidden: bool,

    #[arg(long, help_heading = "vCard")]
    pub first_name: Option<String>,
    #[arg(long, help_heading = "vCard")]
    pub last_name: Option<String>,
    #[arg(long, help_heading = "vCard")]
    pub org: Option<String>,
    #[arg(long, help_heading = "vCard")]
    pub tel: Option<String>,
    #[arg(long, help_heading = "vCard")]
    pub vcard_email: Option<String>,
    #[arg(long, help_heading = "vCard")]
    pub vcard_url: Option<String>,
}

impl ContentArgs {
    pub fn to_config(
        &self,
        default_kind: ContentKind,
        render_params: RenderParams,
    ) -> PayloadConfig {
        let wifi = WifiConfig {
            ssid: self.ssid.clone().unwrap_or_default(),
            password: self.password.clone().unwrap_or_default(),
            security: self.security.unwrap_or_default(),
            hidden: self.hidden,
        };
        let vcard = VCardConfig {
            first_name: self.first_name.clone().unwrap_or_default(),
            last_name: self.last_name.clone().unwrap_or_default(),
            organization: self.org.clone().unwrap_or_default(),
            phone: self.tel.clone().unwrap_or_default(),
            email: self.vcard_email.clone().unwrap_or_default(),
            url: self.vcard_url.clone().unwrap_or_default(),
        };

        PayloadConfig::new(self.kind.unwrap_or(default_kind))
            .with_text(self.text.clone().unwrap_or_default())
            .with_wifi(wifi)
            .with_vcard(vcard)
            .with_render_params(render_params)
    }
}

/// Per-invocation overrides of the configured render parameters
#[derive(Args, Debug, Default)]
pub struct RenderArgs {
    /// Error correction level: L, M, Q or H
    #[arg(long, help_heading = "Rendering")]
    pub ecc: Option<ErrorCorrectionLevel>,
    /// Foreground color (#rgb, #rrggbb or #rrggbbaa)
    #[arg(long, help_heading = "Rendering")]
    pub fg: Option<String>,
    /// Background color
    #[arg(long, help_heading = "Rendering")]
    pub bg: Option<String>,
    /// Quiet zone in modules
    #[arg(long, help_heading = "Rendering")]
    pub margin: Option<u32>,
    /// Image side in pixels
    #[arg(long, help_heading = "Rendering")]
    pub width: Option<u32>,
    /// square, circle or rounded
    #[arg(long, help_heading = "Rendering")]
    pub shape: Option<Shape>,
}

impl RenderArgs {
    pub fn apply(&self, base: &RenderParams) -> RenderParams {
        let mut params = base.clone();
        if let Some(level) = self.ecc {
            params.error_correction_level = level;
        }
        if let Some(fg) = &self.fg {
            params.foreground_color = fg.clone();
        }
        if let Some(bg) = &self.bg {
            params.background_color = bg.clone();
        }
        if let Some(margin) = self.margin {
            params.margin = margin;
        }
        if let Some(width) = self.width {
            params.width = width;
        }
        if let Some(shape) = self.shape {
            params.shape = shape;
        }
        params
    }
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub content: ContentArgs,
    #[command(flatten)]
    pub render: RenderArgs,

    /// png, svg or pdf (defaults to the output extension, then the configured format)
    #[arg(long, help_heading = "Output")]
    pub format: Option<ExportFormat>,
    /// Output file (defaults to qrcode-<millis>.<ext> in the current directory)
    #[arg(short, long, help_heading = "Output")]
    pub output: Option<PathBuf>,
    /// Also save the configuration to history
    #[arg(long, help_heading = "Output")]
    pub save: bool,
    /// History entry name (defaults to "QR Code - <date>")
    #[arg(long, requires = "save", help_heading = "Output")]
    pub name: Option<String>,
    /// Copy the image to the clipboard
    #[arg(long, help_heading = "Output")]
    pub copy: bool,
    /// Print the code to the terminal
    #[arg(long, help_heading = "Output")]
    pub preview: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        println!("Use --help for usage information");
        return Ok(());
    };

    let settings = Settings::load_default()?;
    match command {
        Commands::Generate(args) => generate(&args, &settings),
        Commands::Payload(args) => print_payload(&args, &settings),
        Commands::History(command) => run_history(command, &settings),
    }
}

fn generate(args: &GenerateArgs, settings: &Settings) -> Result<()> {
    let params = args.render.apply(&settings.render);
    let config = args.content.to_config(settings.default_kind, params);

    let Some(image) = render(&config, settings)? else {
        return Ok(());
    };

    let path = write_image(&image, args.format, args.output.as_deref(), settings)?;
    println!("Saved QR code to {}", format_path_with_tilde(&path));

    if args.save {
        let entry = HistoryEntry::snapshot(&config, args.name.clone());
        open_store()?.save(entry.clone()).context("Failed to save to history")?;
        println!("Saved to history as '{}' ({})", sanitize_single_line(&entry.name), entry.id);
    }

    if args.copy {
        // Clipboard trouble never fails the command
        match copy_image_to_clipboard(&image) {
            Ok(()) => println!("Copied image to clipboard"),
            Err(e) => eprintln!("Warning: {:#}", e),
        }
    }

    if args.preview {
        println!();
        println!("{}", image.to_terminal_string());
    }

    Ok(())
}

fn print_payload(args: &ContentArgs, settings: &Settings) -> Result<()> {
    let config = args.to_config(settings.default_kind, settings.render.clone());
    match payload::encode_if_ready(&config) {
        Some(payload) => println!("{}", sanitize_for_terminal(&payload)),
        None => eprintln!("{}", not_ready_hint(config.kind)),
    }
    Ok(())
}

/// One generation attempt. `Ok(None)` when the configuration is incomplete.
fn render(config: &PayloadConfig, settings: &Settings) -> Result<Option<Arc<RenderedImage>>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start async runtime")?;

    let controller = GenerationController::new(Arc::new(QrCodeEncoder::new()))
        .with_timeout(settings.generation_timeout());

    match runtime.block_on(controller.on_config_change(config)) {
        GenerationOutcome::Rendered(image) => Ok(Some(image)),
        GenerationOutcome::NotReady => {
            eprintln!("{}", not_ready_hint(config.kind));
            Ok(None)
        }
        GenerationOutcome::Failed(message) => Err(anyhow!(message)),
        GenerationOutcome::Superseded { sequence, latest } => {
            Err(anyhow!("generation attempt {} was superseded by {}", sequence, latest))
        }
    }
}

fn write_image(
    image: &RenderedImage,
    format: Option<ExportFormat>,
    output: Option<&Path>,
    settings: &Settings,
) -> Result<PathBuf> {
    let format = format
        .or_else(|| output.and_then(ExportFormat::from_path))
        .unwrap_or(settings.export_format);
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(default_file_name(format, Utc::now())),
    };
    debug!(path = %path.display(), %format, "writing export");

    FileExporter::new()
        .write_to(image, format, &path)
        .with_context(|| format!("Failed to export QR code to {}", path.display()))?;
    Ok(path)
}

fn not_ready_hint(kind: ContentKind) -> String {
    let needed = match kind {
        ContentKind::Url => "a URL (--text)",
        ContentKind::Text => "some text (--text)",
        ContentKind::Email => "an email address (--text)",
        ContentKind::Phone => "a phone number (--text)",
        ContentKind::Wifi => "a network name (--ssid)",
        ContentKind::Vcard => "a first or last name (--first-name / --last-name)",
    };
    format!("Nothing to generate yet: {} QR codes need {}", kind, needed)
}

fn open_store() -> Result<HistoryStore> {
    let dir = data_dir()?;
    debug!(dir = %dir.display(), "opening history");
    Ok(HistoryStore::new(Arc::new(JsonFileStore::new(dir))))
}

fn run_history(command: HistoryCommand, settings: &Settings) -> Result<()> {
    let store = open_store()?;

    match command {
        HistoryCommand::List { kind, json } => {
            let entries: Vec<HistoryEntry> = store
                .list()
                .into_iter()
                .filter(|entry| kind.is_none_or(|k| entry.config.kind == k))
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("No saved QR codes");
            } else {
                for entry in &entries {
                    println!(
                        "{}  {:<5}  {:<12}  {}",
                        entry.id,
                        entry.config.kind,
                        format_millis(entry.timestamp),
                        sanitize_single_line(&entry.name)
                    );
                }
            }
        }
        HistoryCommand::Show { id } => {
            let entry = find_entry(&store, &id)?;
            print_entry(&entry);
        }
        HistoryCommand::Delete { id } => {
            let name = store.get(&id).map(|entry| entry.name);
            if store.delete(&id)? {
                let name = name.unwrap_or_default();
                println!("Deleted '{}'", sanitize_single_line(&name));
            } else {
                println!("No history entry with id '{}'", sanitize_single_line(&id));
            }
        }
        HistoryCommand::Clear => {
            store.clear()?;
            println!("History cleared");
        }
        HistoryCommand::Export { id, format, output } => {
            let entry = find_entry(&store, &id)?;
            if let Some(image) = render(&entry.config, settings)? {
                let path = write_image(&image, format, output.as_deref(), settings)?;
                println!("Saved QR code to {}", format_path_with_tilde(&path));
            }
        }
        HistoryCommand::Browse => {
            if let Some(entry) = browse_history(&store)? {
                println!("{}", sanitize_for_terminal(&payload::encode(&entry.config)));
                println!("id: {}", entry.id);
            }
        }
    }

    Ok(())
}

fn find_entry(store: &HistoryStore, id: &str) -> Result<HistoryEntry> {
    match store.get(id) {
        Some(entry) => Ok(entry),
        None => bail!("No history entry with id '{}'", sanitize_single_line(id)),
    }
}

fn print_entry(entry: &HistoryEntry) {
    let params = &entry.config.render_params;
    let saved = entry
        .created_at()
        .map(|ts| ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "unknown".to_string());

    println!("Name:    {}", sanitize_single_line(&entry.name));
    println!("Id:      {}", entry.id);
    println!("Kind:    {}", entry.config.kind);
    println!("Saved:   {}", saved);
    println!(
        "Render:  level {}, {} on {}, margin {}, {}px, {}",
        params.error_correction_level,
        sanitize_single_line(&params.foreground_color),
        sanitize_single_line(&params.background_color),
        params.margin,
        params.width,
        params.shape
    );
    println!("Payload:");
    for line in sanitize_for_terminal(&payload::encode(&entry.config)).lines() {
        println!("  {}", line);
    }
}
