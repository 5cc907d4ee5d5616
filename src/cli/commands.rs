use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use url::Url;

use crate::analytics;
use crate::export::{self, ExportManifest};
use crate::extract::Extractor;
use crate::history;
use crate::models::{ExportFormat, ExportOptions, ExportScope, PdfOptions};
use crate::normalize;
use crate::platforms::PlatformRegistry;

#[derive(Parser)]
#[command(name = "ai-chat-exporter")]
#[command(version)]
#[command(about = "Extract and export AI chat conversations from saved pages", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract a conversation from a saved HTML page and print it as JSON
    Extract {
        /// Path to the saved HTML page, or `-` for stdin
        input: PathBuf,
        /// Platform id (claude, chatgpt, gemini, perplexity); auto-detected
        /// when omitted
        #[arg(long)]
        platform: Option<String>,
        /// Original page URL, used to resolve relative links
        #[arg(long)]
        url: Option<String>,
        /// Keep each turn's raw markup on the message
        #[arg(long)]
        keep_html: bool,
    },
    /// Extract and render one format (or all text formats) to disk
    Export {
        /// Path to the saved HTML page, or `-` for stdin
        input: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value = "markdown")]
        format: ExportFormat,
        /// Render every non-print format in one run
        #[arg(long, conflicts_with = "format")]
        all: bool,
        /// Output directory
        #[arg(long, short, default_value = ".")]
        out_dir: PathBuf,
        /// Platform id; auto-detected when omitted
        #[arg(long)]
        platform: Option<String>,
        /// Original page URL
        #[arg(long)]
        url: Option<String>,
        /// Export one message (1-based)
        #[arg(long, conflicts_with_all = ["range_start", "range_end"])]
        single: Option<usize>,
        /// First message of a range (1-based, inclusive)
        #[arg(long, requires = "range_end")]
        range_start: Option<usize>,
        /// Last message of a range (1-based, inclusive)
        #[arg(long, requires = "range_start")]
        range_end: Option<usize>,
        /// Drop thinking/trace blocks from the output
        #[arg(long)]
        no_thinking: bool,
        /// Drop the metadata header from the output
        #[arg(long)]
        no_metadata: bool,
        /// Keep raw per-message HTML in formats that can carry it
        #[arg(long)]
        keep_html: bool,
        /// Scrub emails, phone numbers, keys and document names
        #[arg(long)]
        redact: bool,
        /// Write a SHA-256 manifest next to each artifact
        #[arg(long)]
        sign: bool,
        /// Base filename ({base} in the template)
        #[arg(long)]
        filename: Option<String>,
        /// Filename template, tokens: {base} {platform} {date} {time} {scope}
        #[arg(long)]
        template: Option<String>,
        /// PDF page size
        #[arg(long, default_value = "a4")]
        page_size: String,
        /// PDF orientation
        #[arg(long, default_value = "portrait")]
        orientation: String,
        /// PDF font scale multiplier
        #[arg(long, default_value_t = 1.0)]
        font_scale: f32,
    },
    /// Extract and print derived conversation metrics
    Stats {
        /// Path to the saved HTML page
        input: PathBuf,
        /// Platform id; auto-detected when omitted
        #[arg(long)]
        platform: Option<String>,
    },
    /// Show the recent export history
    History,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Extract { input, platform, url, keep_html }) => {
            extract_command(&input, platform.as_deref(), url.as_deref(), keep_html)
        }
        Some(Commands::Export {
            input,
            format,
            all,
            out_dir,
            platform,
            url,
            single,
            range_start,
            range_end,
            no_thinking,
            no_metadata,
            keep_html,
            redact,
            sign,
            filename,
            template,
            page_size,
            orientation,
            font_scale,
        }) => {
            let scope = match (single, range_start, range_end) {
                (Some(index), _, _) => ExportScope::Single { index },
                (None, Some(start), Some(end)) => ExportScope::Range { start, end },
                _ => ExportScope::All,
            };
            let options = ExportOptions {
                include_thinking: !no_thinking,
                include_metadata: !no_metadata,
                include_html: keep_html,
                redact_sensitive: redact,
                include_signature: sign,
                scope,
                filename,
                filename_template: template,
                pdf: PdfOptions { page_size, orientation, font_scale },
            };
            let formats: Vec<ExportFormat> =
                if all { export::BULK_FORMATS.to_vec() } else { vec![format] };
            export_command(&input, platform.as_deref(), url.as_deref(), &formats, &options, &out_dir)
        }
        Some(Commands::Stats { input, platform }) => stats_command(&input, platform.as_deref()),
        Some(Commands::History) => history_command(),
        None => {
            println!("Use --help for usage information");
            Ok(())
        }
    }
}

fn load_document(
    input: &Path,
    platform: Option<&str>,
    url: Option<&str>,
    keep_html: bool,
) -> Result<crate::models::ConversationDocument> {
    let html = if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read from stdin")?;
        buf
    } else {
        fs::read_to_string(input)
            .with_context(|| format!("failed to read {}", input.display()))?
    };

    let registry = PlatformRegistry::builtin();
    let config = match platform {
        Some(id) => registry
            .get(id)
            .with_context(|| format!("unknown platform '{id}'"))?
            .clone(),
        None => {
            let dom = scraper::Html::parse_document(&html);
            match registry.detect(&dom) {
                Some(config) => config.clone(),
                None => bail!("could not detect the chat platform; pass --platform"),
            }
        }
    };

    let mut extractor = Extractor::new(&config).with_html_retention(keep_html);
    if let Some(raw) = url {
        let parsed = Url::parse(raw).with_context(|| format!("invalid url '{raw}'"))?;
        extractor = extractor.with_source_url(parsed);
    }

    let raw = extractor
        .extract(&html)
        .with_context(|| format!("extraction failed for {}", input.display()))?;
    let doc = normalize::normalize(&raw).context("conversation is empty after cleaning")?;
    Ok(doc)
}

fn extract_command(
    input: &Path,
    platform: Option<&str>,
    url: Option<&str>,
    keep_html: bool,
) -> Result<()> {
    let doc = load_document(input, platform, url, keep_html)?;
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

fn export_command(
    input: &Path,
    platform: Option<&str>,
    url: Option<&str>,
    formats: &[ExportFormat],
    options: &ExportOptions,
    out_dir: &Path,
) -> Result<()> {
    let doc = load_document(input, platform, url, options.include_html)?;
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let history_path = history::default_path();
    for format in formats {
        let artifact = export::generate(&doc, *format, options)?;
        let out_path = out_dir.join(&artifact.filename);
        fs::write(&out_path, &artifact.bytes)
            .with_context(|| format!("failed to write {}", out_path.display()))?;
        println!("wrote {} ({} bytes)", out_path.display(), artifact.bytes.len());

        if let Some(manifest) = &artifact.manifest {
            let manifest_path = out_dir.join(ExportManifest::filename(&artifact.filename));
            fs::write(&manifest_path, serde_json::to_string_pretty(manifest)?)
                .with_context(|| format!("failed to write {}", manifest_path.display()))?;
            println!("wrote {}", manifest_path.display());
        }

        if let Some(path) = &history_path {
            let record = history::ExportRecord::from_artifact(
                &artifact,
                *format,
                &doc.metadata.platform,
                &doc.metadata.scope,
            );
            if let Err(err) = history::append(path, record) {
                tracing::warn!(error = %err, "could not record export history");
            }
        }
    }
    Ok(())
}

fn stats_command(input: &Path, platform: Option<&str>) -> Result<()> {
    let doc = load_document(input, platform, None, false)?;
    let report = analytics::analyze(&doc);

    println!("Conversation Statistics");
    println!("=======================");
    println!("Title: {}", doc.metadata.title);
    println!("Platform: {}", doc.metadata.platform);
    println!("Messages: {} ({} user, {} assistant)",
        report.flow.turn_count, report.flow.user_turns, report.flow.assistant_turns);
    println!("Initiated by: {}", report.flow.initiated_by);
    println!("Mean assistant response: {:.1} words", report.flow.mean_assistant_words);
    println!("Trace blocks: {}", doc.metadata.thinking_block_count);
    for (kind, count) in &doc.metadata.block_type_breakdown {
        println!("  {kind}: {count}");
    }
    println!("References: {} links/documents, {} attachments, {} citations",
        doc.metadata.reference_count, doc.metadata.attachment_count, doc.metadata.citation_count);
    println!();
    println!("Vocabulary richness: {:.2} ({} unique / {} total)",
        report.vocabulary.ratio, report.vocabulary.unique_words, report.vocabulary.total_words);
    println!("Structural complexity: {}/4", report.complexity.score);
    println!(
        "Thinking patterns: reasoning {}, questioning {}, correction {}, exploration {}",
        report.thinking_patterns.reasoning,
        report.thinking_patterns.questioning,
        report.thinking_patterns.correction,
        report.thinking_patterns.exploration,
    );
    Ok(())
}

fn history_command() -> Result<()> {
    let Some(path) = history::default_path() else {
        bail!("no data directory available on this system");
    };
    let records = history::load(&path);
    if records.is_empty() {
        println!("No exports recorded yet.");
        return Ok(());
    }

    println!("Recent exports (newest first):");
    for record in records {
        println!(
            "  {}  {:>8}  {:<12} {:<10} {}",
            record.exported_at.format("%Y-%m-%d %H:%M"),
            record.bytes,
            record.format.as_str(),
            record.platform,
            record.filename,
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_geometry_flags_parse() {
        let cli = Cli::try_parse_from([
            "ai-chat-exporter",
            "export",
            "page.html",
            "--format",
            "pdf",
            "--page-size",
            "letter",
            "--orientation",
            "landscape",
            "--font-scale",
            "1.25",
        ])
        .unwrap();
        let Some(Commands::Export { page_size, orientation, font_scale, .. }) = cli.command else {
            panic!("expected export subcommand");
        };
        assert_eq!(page_size, "letter");
        assert_eq!(orientation, "landscape");
        assert_eq!(font_scale, 1.25);
    }

    #[test]
    fn test_single_conflicts_with_range() {
        let result = Cli::try_parse_from([
            "ai-chat-exporter",
            "export",
            "page.html",
            "--single",
            "2",
            "--range-start",
            "1",
            "--range-end",
            "3",
        ]);
        assert!(result.is_err());
    }
}
