use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use processo_core::summary::{
    MISSING_IMAGE_MESSAGE, analyze_or_describe, summarize_in_chunks,
};
use processo_core::{
    CaseDocument, Config, CostBreakdown, ImageFormat, OpenAiClient, SectionSplitter,
};
use processo_sections::{HeadingSplitter, RegexSplitter};

mod output;

use output::ColorMode;

/// Court filing extractor - pull text, tables and sections out of legal-case PDFs
#[derive(Parser, Debug)]
#[command(name = "processo", version, about, long_about = None)]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the extraction cascade and show what the winning strategy found
    Extract {
        /// Path to the PDF
        pdf: PathBuf,

        /// Print the extraction result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract and split the text into facts, parties and subjects
    Sections {
        /// Path to the PDF
        pdf: PathBuf,

        /// Which splitter to use
        #[arg(long, value_enum, default_value_t = SplitterKind::Regex)]
        splitter: SplitterKind,

        /// Print the sections as JSON
        #[arg(long)]
        json: bool,
    },

    /// Full run: extract, split, summarise and write the case document
    Process {
        /// Path to the PDF
        pdf: PathBuf,

        /// Path to write the case document JSON to
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip provider calls and keep the facts section unsummarised
        #[arg(long)]
        no_ai: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SplitterKind {
    Regex,
    Heading,
}

impl SplitterKind {
    fn splitter(self) -> Box<dyn SectionSplitter> {
        match self {
            SplitterKind::Regex => Box::new(RegexSplitter::new()),
            SplitterKind::Heading => Box::new(HeadingSplitter::new()),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_file(&processo_core::config_file::load_config()).apply_env();
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Command::Extract { pdf, json } => extract(&config, &pdf, json, cli.no_color),
        Command::Sections {
            pdf,
            splitter,
            json,
        } => sections(&config, &pdf, splitter, json, cli.no_color),
        Command::Process { pdf, output, no_ai } => {
            process(&config, &pdf, output, no_ai, cli.no_color).await
        }
    }
}

fn check_exists(pdf: &Path) -> anyhow::Result<()> {
    if !pdf.exists() {
        anyhow::bail!("File not found: {}", pdf.display());
    }
    Ok(())
}

fn display_name(pdf: &Path) -> String {
    pdf.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| pdf.display().to_string())
}

fn extract(config: &Config, pdf: &Path, json: bool, no_color: bool) -> anyhow::Result<()> {
    check_exists(pdf)?;
    let pipeline = processo_ingest::default_pipeline(config);
    let result = pipeline.extract(pdf);

    let mut stdout = std::io::stdout();
    if json {
        writeln!(stdout, "{}", serde_json::to_string_pretty(&result)?)?;
    } else {
        output::print_extraction_summary(
            &mut stdout,
            &display_name(pdf),
            &result,
            ColorMode(!no_color),
        )?;
    }
    Ok(())
}

fn sections(
    config: &Config,
    pdf: &Path,
    kind: SplitterKind,
    json: bool,
    no_color: bool,
) -> anyhow::Result<()> {
    check_exists(pdf)?;
    let pipeline = processo_ingest::default_pipeline(config);
    let result = pipeline.extract(pdf);
    let splitter = kind.splitter();
    let sections = splitter.split(result.text());

    let mut stdout = std::io::stdout();
    if json {
        writeln!(stdout, "{}", serde_json::to_string_pretty(&sections)?)?;
    } else {
        output::print_sections(&mut stdout, splitter.name(), &sections, ColorMode(!no_color))?;
    }
    Ok(())
}

async fn process(
    config: &Config,
    pdf: &Path,
    output: Option<PathBuf>,
    no_ai: bool,
    no_color: bool,
) -> anyhow::Result<()> {
    check_exists(pdf)?;
    let color = ColorMode(!no_color && output.is_none());

    let pipeline = processo_ingest::default_pipeline(config);
    let pre = {
        let pdf = pdf.to_path_buf();
        tokio::task::spawn_blocking(move || processo_ingest::preprocess(&pdf, &pipeline)).await?
    };
    tracing::info!(method = %pre.extraction.method(), "pre-processing finished");

    let document = if no_ai {
        CaseDocument::new(&pre.sections, pre.sections.facts.clone())
    } else {
        if config.openai.api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY is not set; summaries will contain error messages");
        }
        let client = OpenAiClient::new(config.openai.clone());

        let image = render_page_image(config, pdf).await;
        let (image_analysis, image_cost) = match image {
            Some(bytes) => {
                let outcome =
                    analyze_or_describe(&client, &bytes, ImageFormat::Jpeg.mime_type()).await;
                (outcome.text, outcome.cost)
            }
            None => (MISSING_IMAGE_MESSAGE.to_string(), None),
        };

        let facts = summarize_in_chunks(&client, &pre.sections.facts).await;
        CaseDocument::new(&pre.sections, facts.text)
            .with_image_analysis(image_analysis)
            .with_cost_breakdown(CostBreakdown::new(facts.cost, image_cost))
    };

    let json = serde_json::to_string_pretty(&document)?;
    match output {
        Some(path) => {
            std::fs::write(&path, json)?;
            println!("Case document written to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout();
            output::print_case_document(&mut stdout, &document, color)?;
            writeln!(stdout)?;
            writeln!(stdout, "{}", json)?;
        }
    }
    Ok(())
}

/// JPEG bytes of the structured page, or `None` when it cannot be rendered.
async fn render_page_image(config: &Config, pdf: &Path) -> Option<Vec<u8>> {
    let rasterizer = processo_ingest::rasterizer(config);
    let pdf = pdf.to_path_buf();
    let rendered = tokio::task::spawn_blocking(move || -> anyhow::Result<Vec<u8>> {
        let scratch = tempfile::tempdir()?;
        let image = processo_ingest::render_structured_page(&rasterizer, &pdf, scratch.path())?;
        Ok(std::fs::read(image)?)
    })
    .await;

    match rendered {
        Ok(Ok(bytes)) => Some(bytes),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "failed to render page image");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "page rendering task failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_process_flags() {
        let cli = Cli::parse_from(["processo", "process", "a.pdf", "-o", "out.json", "--no-ai"]);
        match cli.command {
            Command::Process { pdf, output, no_ai } => {
                assert_eq!(pdf, PathBuf::from("a.pdf"));
                assert_eq!(output, Some(PathBuf::from("out.json")));
                assert!(no_ai);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn sections_defaults_to_regex_splitter() {
        let cli = Cli::parse_from(["processo", "sections", "a.pdf"]);
        match cli.command {
            Command::Sections { splitter, .. } => assert_eq!(splitter, SplitterKind::Regex),
            other => panic!("unexpected command: {other:?}"),
        }
        let cli = Cli::parse_from(["processo", "--no-color", "sections", "a.pdf", "--splitter", "heading"]);
        assert!(cli.no_color);
        match cli.command {
            Command::Sections { splitter, .. } => {
                assert_eq!(splitter.splitter().name(), "heading")
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = check_exists(Path::new("/nonexistent/peticao.pdf")).unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
