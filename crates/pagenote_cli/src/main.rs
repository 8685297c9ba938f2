//! Command-line probe for `pagenote_core`.
//!
//! # Responsibility
//! - Verify core linkage (`ping`, `version`).
//! - Import, export and list pages in a SQLite database file.
//!
//! Output is plain and deterministic so it can be diffed in scripts.

use anyhow::{anyhow, bail, Context, Result};
use log::info;
use pagenote_core::{
    default_log_level, derive_preview, from_markdown, from_snapshot, init_logging, open_db,
    to_markdown, to_plain_text, to_snapshot, NewPage, PageId, PageListQuery, PageStorage,
    PageUpdate, SqlitePageStorage,
};
use std::env;
use std::process;

const USAGE: &str = "usage:
  pagenote ping
  pagenote version
  pagenote import <db> <markdown-file> [--tag <tag>]...
  pagenote export <db> <page-id> [--format markdown|text|json]
  pagenote list <db> [--limit <n>] [--tag <tag>]";

fn main() {
    if let Ok(dir) = env::var("PAGENOTE_LOG_DIR") {
        if let Err(err) = init_logging(default_log_level(), &dir) {
            eprintln!("warning: {err}");
        }
    }

    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(err) = run(&args) {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

fn run(args: &[String]) -> Result<()> {
    let Some((command, rest)) = args.split_first() else {
        println!("{USAGE}");
        return Ok(());
    };
    match command.as_str() {
        "ping" => println!("pagenote_core ping={}", pagenote_core::ping()),
        "version" => println!("pagenote_core version={}", pagenote_core::core_version()),
        "import" => import(rest)?,
        "export" => export(rest)?,
        "list" => list(rest)?,
        "help" | "--help" | "-h" => println!("{USAGE}"),
        other => bail!("unknown command `{other}`\n{USAGE}"),
    }
    Ok(())
}

/// Positional arguments plus repeated `--name value` options.
struct Parsed<'a> {
    positional: Vec<&'a str>,
    options: Vec<(&'a str, &'a str)>,
}

impl<'a> Parsed<'a> {
    fn new(args: &'a [String]) -> Result<Self> {
        let mut positional = Vec::new();
        let mut options = Vec::new();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.strip_prefix("--") {
                Some(name) => {
                    let value = iter
                        .next()
                        .ok_or_else(|| anyhow!("option --{name} needs a value"))?;
                    options.push((name, value.as_str()));
                }
                None => positional.push(arg.as_str()),
            }
        }
        Ok(Self {
            positional,
            options,
        })
    }

    fn positional(&self, index: usize, name: &str) -> Result<&'a str> {
        self.positional
            .get(index)
            .copied()
            .ok_or_else(|| anyhow!("missing <{name}>\n{USAGE}"))
    }

    fn all(&self, name: &str) -> Vec<String> {
        self.options
            .iter()
            .filter(|(key, _)| *key == name)
            .map(|(_, value)| (*value).to_string())
            .collect()
    }

    fn last(&self, name: &str) -> Option<&'a str> {
        self.options
            .iter()
            .rev()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }
}

fn import(args: &[String]) -> Result<()> {
    let parsed = Parsed::new(args)?;
    let db_path = parsed.positional(0, "db")?;
    let source_path = parsed.positional(1, "markdown-file")?;

    let source = std::fs::read_to_string(source_path)
        .with_context(|| format!("failed to read `{source_path}`"))?;
    let document = from_markdown(&source);
    let preview = derive_preview(&document);
    let snapshot = to_snapshot(&document);
    let content = to_markdown(&document);

    let conn = open_db(db_path).with_context(|| format!("failed to open `{db_path}`"))?;
    let storage = SqlitePageStorage::new(&conn);
    let page_id = storage.create_page(&NewPage {
        title: preview.title.clone(),
        content: content.clone(),
        snapshot: Some(snapshot.clone()),
        preview_text: preview.preview_text.clone(),
        preview_image: preview.preview_image.clone(),
    })?;

    let tags = parsed.all("tag");
    if !tags.is_empty() {
        storage.update_page(&PageUpdate {
            id: page_id,
            title: preview.title,
            content,
            snapshot,
            preview_text: preview.preview_text,
            preview_image: preview.preview_image,
            tags,
        })?;
    }
    info!(
        "event=cli_import module=cli status=ok page_id={} blocks={}",
        page_id,
        document.len()
    );
    println!("{page_id}");
    Ok(())
}

fn export(args: &[String]) -> Result<()> {
    let parsed = Parsed::new(args)?;
    let db_path = parsed.positional(0, "db")?;
    let page_id: PageId = parsed
        .positional(1, "page-id")?
        .parse()
        .context("page id must be a uuid")?;

    let conn = open_db(db_path).with_context(|| format!("failed to open `{db_path}`"))?;
    let record = SqlitePageStorage::new(&conn).get_page(page_id)?;
    let document = match &record.snapshot {
        Some(snapshot) if !snapshot.is_empty() => from_snapshot(snapshot)?,
        _ => from_markdown(&record.content),
    };

    match parsed.last("format").unwrap_or("markdown") {
        "markdown" | "md" => println!("{}", to_markdown(&document)),
        "text" => println!("{}", to_plain_text(&document)),
        "json" => println!("{}", to_snapshot(&document).to_json_string()?),
        other => bail!("unknown format `{other}`"),
    }
    Ok(())
}

fn list(args: &[String]) -> Result<()> {
    let parsed = Parsed::new(args)?;
    let db_path = parsed.positional(0, "db")?;
    let limit = parsed
        .last("limit")
        .map(str::parse::<u32>)
        .transpose()
        .context("limit must be a non-negative integer")?;

    let conn = open_db(db_path).with_context(|| format!("failed to open `{db_path}`"))?;
    let pages = SqlitePageStorage::new(&conn).list_pages(&PageListQuery {
        tag: parsed.last("tag").map(str::to_string),
        limit,
        offset: 0,
    })?;
    for page in pages {
        let tags = if page.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", page.tags.join(","))
        };
        println!("{}\t{}{}", page.id, page.title, tags);
    }
    Ok(())
}
