use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use docsort_models::{Document, ListDocumentsResponse, UploadResponse};
use reqwest::{multipart, Client, Response};
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "docsort-cli")]
#[command(about = "CLI tool for DocSort")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, default_value = "http://localhost:5000")]
    endpoint: String,

    /// Print raw JSON responses
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a PDF or image and print its category
    Upload {
        /// File to upload
        file: PathBuf,
    },
    /// List stored documents
    List,
    /// Show one document with its extracted text
    Show {
        /// Document id
        id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = Client::new();
    let endpoint = cli.endpoint.trim_end_matches('/');

    match cli.command {
        Commands::Upload { file } => upload_document(&client, endpoint, &file, cli.json).await,
        Commands::List => list_documents(&client, endpoint, cli.json).await,
        Commands::Show { id } => show_document(&client, endpoint, id, cli.json).await,
    }
}

/// Fails with the server's error body on a non-2xx status.
async fn check(response: Response, action: &str) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let error_text = response.text().await?;
    error!("Failed to {}: {} {}", action, status, error_text);
    bail!("{action} failed with {status}: {error_text}")
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn upload_document(client: &Client, endpoint: &str, file: &Path, json: bool) -> Result<()> {
    info!("Uploading document: {}", file.display());

    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("cannot read {}", file.display()))?;
    let filename = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .context("upload path has no file name")?;
    let form = multipart::Form::new().part("file", multipart::Part::bytes(bytes).file_name(filename));

    let response = client
        .post(format!("{endpoint}/api/documents"))
        .multipart(form)
        .send()
        .await?;
    let created: UploadResponse = check(response, "upload document").await?.json().await?;

    if json {
        return print_json(&created);
    }
    let doc = created.document;
    println!("✅ Document stored:");
    println!("   Id: {}", doc.id);
    println!("   File: {}", doc.filename);
    println!("   Category: {}", doc.category);
    println!("   Extraction: {}", doc.extraction_method);
    Ok(())
}

async fn list_documents(client: &Client, endpoint: &str, json: bool) -> Result<()> {
    info!("Listing documents");

    let response = client.get(format!("{endpoint}/api/documents")).send().await?;
    let list: ListDocumentsResponse = check(response, "list documents").await?.json().await?;

    if json {
        return print_json(&list);
    }
    println!("📂 Documents:");
    for doc in list.documents {
        println!("   • [{}] {} - {}", doc.id, doc.filename, doc.category);
    }
    Ok(())
}

async fn show_document(client: &Client, endpoint: &str, id: i64, json: bool) -> Result<()> {
    info!("Getting document: {}", id);

    let response = client
        .get(format!("{endpoint}/api/documents/{id}"))
        .send()
        .await?;
    let doc: Document = check(response, "get document").await?.json().await?;

    if json {
        return print_json(&doc);
    }
    println!("📄 Document details:");
    println!("   Id: {}", doc.id);
    println!("   File: {}", doc.filename);
    println!("   Category: {}", doc.category);
    println!("   Extraction: {}", doc.extraction_method);
    println!("   Size: {} bytes", doc.size_bytes);
    println!("   SHA-256: {}", doc.content_sha256);
    println!("   Uploaded: {}", doc.created_at);
    println!();
    println!("{}", doc.extracted_text);
    Ok(())
}
