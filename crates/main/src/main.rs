use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use invoice_pdf::{FontSource, ImageSource, Invoice, InvoiceRenderer, Labels, RendererConfig};
use log::info;

/// Renders invoices to PDF from the command line.
///
/// Fonts are looked up through `INVOICE_PDF_FONT_FILE`, `INVOICE_PDF_FONTS_DIR` or an
/// `assets/fonts` directory unless `--font` is given. Hangul labels need a font that covers them.
#[derive(Parser)]
#[command(author, version, about = "Render invoices to PDF")]
struct Cli {
    /// Single font file used for every text style.
    #[arg(long, global = true)]
    font: Option<PathBuf>,

    /// JSON file overriding the printed labels.
    #[arg(long, global = true, conflicts_with = "english")]
    labels: Option<PathBuf>,

    /// Use English labels instead of the Korean defaults.
    #[arg(long, global = true)]
    english: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an invoice read from a JSON file.
    Render {
        /// Invoice JSON file.
        #[arg(long, short)]
        input: PathBuf,

        /// Destination PDF file.
        #[arg(long, short, default_value = "invoice.pdf")]
        output: PathBuf,

        /// Signature image placed next to the grand total.
        #[arg(long)]
        signature: Option<PathBuf>,
    },

    /// Render the built-in demo invoice.
    Sample {
        /// Destination PDF file.
        #[arg(long, short, default_value = "invoice.pdf")]
        output: PathBuf,

        /// Signature image placed next to the grand total.
        #[arg(long)]
        signature: Option<PathBuf>,
    },

    /// Write the demo invoice as JSON to use as a starting point.
    Template {
        /// Destination JSON file.
        #[arg(long, short, default_value = "invoice.json")]
        output: PathBuf,
    },
}

fn main() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = renderer_config(&cli)?;

    match cli.command {
        Commands::Render {
            input,
            output,
            signature,
        } => {
            let invoice: Invoice = serde_json::from_slice(&fs::read(&input)?)?;
            info!("Loaded invoice #{} from {}", invoice.number, input.display());
            render(config, with_signature(invoice, signature), &output)
        }
        Commands::Sample { output, signature } => {
            render(config, with_signature(Invoice::sample(), signature), &output)
        }
        Commands::Template { output } => {
            fs::write(&output, serde_json::to_vec_pretty(&Invoice::sample())?)?;
            println!("Saved {}", output.display());
            Ok(())
        }
    }
}

fn renderer_config(cli: &Cli) -> Result<RendererConfig, Box<dyn Error>> {
    let labels = match (&cli.labels, cli.english) {
        (Some(path), _) => Labels::from_json_file(path)?,
        (None, true) => Labels::english(),
        (None, false) => Labels::default(),
    };

    let fonts = cli
        .font
        .as_ref()
        .map(|path| FontSource::file(path.clone()))
        .unwrap_or_default();

    Ok(RendererConfig::new().with_labels(labels).with_fonts(fonts))
}

fn with_signature(invoice: Invoice, signature: Option<PathBuf>) -> Invoice {
    match signature {
        Some(path) => {
            invoice.with_signature(ImageSource::from_path(path.to_string_lossy().into_owned()))
        }
        None => invoice,
    }
}

fn render(config: RendererConfig, invoice: Invoice, output: &Path) -> Result<(), Box<dyn Error>> {
    let pdf = InvoiceRenderer::new(config).render_to_file(&invoice, output)?;
    println!("Saved {} ({} bytes)", output.display(), pdf.bytes.len());
    Ok(())
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
