use anyhow::{anyhow, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};
use doc_ingest_core::{
    ingest_document_with_cancel, CancelToken, MediaType, SourceDocument, MIME_PDF,
    MIME_WORD_DOCX, MIME_WORD_DOC_LEGACY,
};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use walkdir::WalkDir;

const SUPPORTED_EXTENSIONS: [&str; 5] = ["pdf", "docx", "doc", "txt", "md"];

#[derive(Parser)]
#[command(name = "doc-ingest", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Wall-clock deadline per document, in seconds.
    #[arg(long, default_value = "30")]
    timeout_secs: u64,
}

#[derive(Subcommand)]
enum Command {
    /// Extract and normalize a single document.
    Extract {
        /// Path of the document to ingest.
        #[arg(long)]
        file: String,
        /// Declared media type; inferred from the file extension when omitted.
        #[arg(long)]
        media_type: Option<String>,
        /// Emit a JSON report instead of the bare text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Extract and normalize every supported document under a folder,
    /// best-effort: unreadable documents are reported and skipped.
    Batch {
        /// Folder to walk recursively.
        #[arg(long)]
        folder: String,
        /// Emit a JSON report instead of a summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

struct IngestedFile {
    path: PathBuf,
    media_type: MediaType,
    text: String,
}

struct SkippedFile {
    path: PathBuf,
    reason: String,
}

struct BatchReport {
    ingested: Vec<IngestedFile>,
    skipped: Vec<SkippedFile>,
}

fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    let timeout = Duration::from_secs(cli.timeout_secs);

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "doc-ingest boot"
    );

    match cli.command {
        Command::Extract {
            file,
            media_type,
            json,
        } => {
            let path = Path::new(&file);
            let declared = media_type.unwrap_or_else(|| declared_type_for_path(path).to_string());
            let ingested = ingest_file(path, &declared, timeout)?;

            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "path": ingested.path,
                        "media_type": ingested.media_type.to_string(),
                        "chars": ingested.text.chars().count(),
                        "text": ingested.text,
                    })
                );
            } else {
                println!("{}", ingested.text);
            }
        }
        Command::Batch { folder, json } => {
            let report = run_batch(Path::new(&folder), timeout)?;

            for skipped in &report.skipped {
                warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped document");
            }

            if json {
                let files: Vec<_> = report
                    .ingested
                    .iter()
                    .map(|file| {
                        serde_json::json!({
                            "path": file.path,
                            "media_type": file.media_type.to_string(),
                            "chars": file.text.chars().count(),
                            "text": file.text,
                        })
                    })
                    .collect();
                let skipped: Vec<_> = report
                    .skipped
                    .iter()
                    .map(|file| {
                        serde_json::json!({
                            "path": file.path,
                            "reason": file.reason,
                        })
                    })
                    .collect();
                println!(
                    "{}",
                    serde_json::json!({ "ingested": files, "skipped": skipped })
                );
            } else {
                for file in &report.ingested {
                    println!(
                        "{} [{}] {} chars",
                        file.path.display(),
                        file.media_type,
                        file.text.chars().count()
                    );
                }
                println!(
                    "{} ingested, {} skipped at {}",
                    report.ingested.len(),
                    report.skipped.len(),
                    Utc::now().to_rfc3339()
                );
            }
        }
    }

    Ok(())
}

fn ingest_file(path: &Path, declared_type: &str, timeout: Duration) -> anyhow::Result<IngestedFile> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let media_type = MediaType::from_declared(declared_type);
    let text = ingest_with_deadline(bytes, media_type, timeout)?;

    Ok(IngestedFile {
        path: path.to_path_buf(),
        media_type,
        text,
    })
}

// The core checks the token between parsing units, so a pathological
// container is abandoned at the next page boundary after the deadline.
fn ingest_with_deadline(
    bytes: Vec<u8>,
    media_type: MediaType,
    timeout: Duration,
) -> anyhow::Result<String> {
    let token = CancelToken::new();
    let worker_token = token.clone();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let document = SourceDocument::with_media_type(&bytes, media_type);
        let _ = tx.send(ingest_document_with_cancel(&document, &worker_token));
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => result.map_err(|error| anyhow!(error.to_string())),
        Err(RecvTimeoutError::Timeout) => {
            token.cancel();
            Err(anyhow!(
                "extraction exceeded the {}s deadline and was cancelled",
                timeout.as_secs()
            ))
        }
        Err(RecvTimeoutError::Disconnected) => Err(anyhow!("extraction worker stopped unexpectedly")),
    }
}

fn run_batch(folder: &Path, timeout: Duration) -> anyhow::Result<BatchReport> {
    let files = discover_documents(folder);

    if files.is_empty() {
        return Err(anyhow!(
            "no supported documents found in {}",
            folder.display()
        ));
    }

    let mut ingested = Vec::new();
    let mut skipped = Vec::new();

    for path in files {
        let declared = declared_type_for_path(&path);
        match ingest_file(&path, declared, timeout) {
            Ok(file) => ingested.push(file),
            Err(error) => skipped.push(SkippedFile {
                path,
                reason: error.to_string(),
            }),
        }
    }

    Ok(BatchReport { ingested, skipped })
}

fn discover_documents(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let supported = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                SUPPORTED_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            });

        if supported {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

fn declared_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();

    if extension.eq_ignore_ascii_case("pdf") {
        MIME_PDF
    } else if extension.eq_ignore_ascii_case("docx") {
        MIME_WORD_DOCX
    } else if extension.eq_ignore_ascii_case("doc") {
        MIME_WORD_DOC_LEGACY
    } else {
        "text/plain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn extensions_map_to_declared_types() {
        assert_eq!(declared_type_for_path(Path::new("a.pdf")), MIME_PDF);
        assert_eq!(declared_type_for_path(Path::new("a.DOCX")), MIME_WORD_DOCX);
        assert_eq!(
            declared_type_for_path(Path::new("a.doc")),
            MIME_WORD_DOC_LEGACY
        );
        assert_eq!(declared_type_for_path(Path::new("notes.md")), "text/plain");
    }

    #[test]
    fn discover_documents_is_recursive_and_sorted() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let base = dir.path();
        let nested = base.join("nested");
        fs::create_dir(&nested)?;

        File::create(base.join("b.txt")).and_then(|mut file| file.write_all(b"hello"))?;
        File::create(nested.join("a.pdf")).and_then(|mut file| file.write_all(b"%PDF-1.4"))?;
        File::create(base.join("ignored.png")).and_then(|mut file| file.write_all(b"\x89PNG"))?;

        let files = discover_documents(base);
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("b.txt"));
        Ok(())
    }

    #[test]
    fn batch_skips_unreadable_documents() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("good.txt"), "Hello...   world!!!  foo")?;
        fs::write(dir.path().join("broken.pdf"), b"%PDF-1.4\n%broken")?;

        let report = run_batch(dir.path(), Duration::from_secs(5))?;

        assert_eq!(report.ingested.len(), 1);
        assert_eq!(report.ingested[0].text, "Hello. world! foo");
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].path.ends_with("broken.pdf"));
        Ok(())
    }

    #[test]
    fn batch_fails_on_empty_folder() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let result = run_batch(dir.path(), Duration::from_secs(5));
        assert!(result.is_err());
        Ok(())
    }
}
