use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use quill_core::records::read_records;
use quill_core::{Combinator, Index, IndexConfig};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "Index JSON records in memory and query them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Source {
    /// Input path (a .json/.jsonl file or a directory of them)
    #[arg(long)]
    input: String,
    /// Analyzer configuration (JSON mapping field names to analyzers)
    #[arg(long)]
    config: String,
    /// Fields to index, comma-separated; defaults to every configured field
    #[arg(long, value_delimiter = ',')]
    fields: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a free-text query against one field and print ranked records
    Search {
        #[command(flatten)]
        source: Source,
        /// Field to query
        #[arg(long)]
        field: String,
        /// Query text, analyzed with the field's analyzer
        #[arg(long)]
        query: String,
        /// How query terms combine: and, or, dismax
        #[arg(long, default_value = "or")]
        mode: Combinator,
        /// Maximum results; -1 prints every match
        #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
        limit: i64,
        /// Print doc ids and scores alongside records
        #[arg(long, default_value_t = false)]
        scores: bool,
    },
    /// Print index statistics
    Stats {
        #[command(flatten)]
        source: Source,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search { source, field, query, mode, limit, scores } => {
            let index = build_index(&source)?;
            search(&index, &field, &query, mode, limit, scores)
        }
        Commands::Stats { source } => {
            let index = build_index(&source)?;
            println!("{}", serde_json::to_string_pretty(&index.stats())?);
            Ok(())
        }
    }
}

fn build_index(source: &Source) -> Result<Index> {
    let config_file = File::open(&source.config).with_context(|| format!("opening config {}", source.config))?;
    let config = IndexConfig::from_reader(BufReader::new(config_file))?;
    let fields: Vec<String> = if source.fields.is_empty() {
        config.field_names().map(str::to_string).collect()
    } else {
        source.fields.clone()
    };
    let mut index = config.build()?;

    for file in input_files(Path::new(&source.input)) {
        let records = read_records(&file).with_context(|| format!("reading {}", file.display()))?;
        let count = records.len();
        index.index_batch(records, &fields)?;
        tracing::debug!(file = %file.display(), count, "indexed file");
    }

    let stats = index.stats();
    let num_terms: usize = stats.fields.values().map(|f| f.num_terms).sum();
    tracing::info!(num_docs = stats.num_docs, num_terms, "ingested documents");
    Ok(index)
}

fn search(index: &Index, field: &str, query: &str, mode: Combinator, limit: i64, scores: bool) -> Result<()> {
    let Some(node) = index.match_query(field, query, mode)? else {
        tracing::info!(query, "query produced no terms");
        return Ok(());
    };
    let limit = usize::try_from(limit).ok();
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for hit in index.search(&node, limit) {
        let Some(record) = index.doc(hit.doc_id) else { continue };
        if scores {
            let line = serde_json::json!({ "doc_id": hit.doc_id, "score": hit.score, "record": record });
            writeln!(out, "{line}")?;
        } else {
            writeln!(out, "{record}")?;
        }
    }
    out.flush()?;
    Ok(())
}

fn input_files(input_path: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reads_json_and_jsonl_from_a_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.json"), r#"[{"name": "doe world"}, {"name": "jack"}]"#).unwrap();
        fs::write(dir.path().join("b.jsonl"), "{\"name\": \"john\"}\n\n{\"name\": \"world\"}\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let files = input_files(dir.path());
        assert_eq!(files, vec![dir.path().join("a.json"), dir.path().join("b.jsonl")]);
        let total: usize = files.iter().map(|f| read_records(f).unwrap().len()).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn builds_an_index_from_config_and_input() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("config.json");
        fs::write(&config, r#"{"fields": {"name": {"type": "autocomplete"}, "type": {"type": "identifier"}}}"#).unwrap();
        let data = dir.path().join("data.json");
        fs::write(&data, r#"[{"name": "doe world", "type": "user"}, {"name": "jack", "type": "admin"}]"#).unwrap();

        let source = Source {
            input: data.to_string_lossy().to_string(),
            config: config.to_string_lossy().to_string(),
            fields: Vec::new(),
        };
        let index = build_index(&source).unwrap();
        assert_eq!(index.num_docs(), 2);
        assert_eq!(index.doc_freq("type", "admin"), 1);
        let q = index.match_query("name", "ja", Combinator::Or).unwrap().unwrap();
        assert_eq!(index.top_n(&q, None).len(), 1);
    }
}
