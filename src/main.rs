//! `echomine` CLI: list, search, and render exported AI chat transcripts.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use eyre::{Context, Result};

use echomine::config::ResolvedConfig;
use echomine::export::{render, RenderOptions};
use echomine::model::{MatchMode, Role, SearchQueryBuilder, SortBy, SortOrder};
use echomine::provider::{Adapter, ProviderKind};

/// Stream, search, and render exported AI chat transcripts to Markdown.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Override provider auto-detection.
    #[arg(long, global = true, value_enum)]
    provider: Option<ProviderArg>,

    /// Path to a specific configuration file.
    /// Defaults to $XDG_CONFIG_HOME/echomine/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every conversation in an export file.
    List {
        /// Path to the export JSON file.
        path: PathBuf,
        #[arg(long, value_enum)]
        sort_by: Option<SortByArg>,
        #[arg(long, value_enum, default_value = "desc")]
        sort_order: SortOrderArg,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Search an export file with BM25 ranking.
    Search {
        /// Path to the export JSON file.
        path: PathBuf,
        /// Keywords to search for (ORed or ANDed per --match-mode).
        #[arg(short, long, value_delimiter = ',')]
        keywords: Vec<String>,
        #[arg(long, value_enum, default_value = "any")]
        match_mode: MatchModeArg,
        /// Exact phrases that must all appear (case-insensitive).
        #[arg(long = "phrase")]
        phrases: Vec<String>,
        /// Keywords that must not appear.
        #[arg(long = "exclude")]
        exclude_keywords: Vec<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_enum)]
        role: Option<RoleArg>,
        #[arg(long, value_parser = parse_naive_date)]
        from: Option<NaiveDate>,
        #[arg(long, value_parser = parse_naive_date)]
        to: Option<NaiveDate>,
        #[arg(long)]
        min_messages: Option<u32>,
        #[arg(long)]
        max_messages: Option<u32>,
        #[arg(long, value_enum)]
        sort_by: Option<SortByArg>,
        #[arg(long, value_enum, default_value = "desc")]
        sort_order: SortOrderArg,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Render a single conversation to Markdown.
    Render {
        /// Path to the export JSON file.
        path: PathBuf,
        /// Conversation id to render.
        #[arg(long)]
        id: String,
        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        no_front_matter: bool,
        #[arg(long)]
        message_ids: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ProviderArg {
    Openai,
    Claude,
}

impl From<ProviderArg> for ProviderKind {
    fn from(value: ProviderArg) -> Self {
        match value {
            ProviderArg::Openai => ProviderKind::OpenAi,
            ProviderArg::Claude => ProviderKind::Claude,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum MatchModeArg {
    Any,
    All,
}

impl From<MatchModeArg> for MatchMode {
    fn from(value: MatchModeArg) -> Self {
        match value {
            MatchModeArg::Any => MatchMode::Any,
            MatchModeArg::All => MatchMode::All,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortByArg {
    Score,
    Date,
    Title,
    Messages,
}

impl From<SortByArg> for SortBy {
    fn from(value: SortByArg) -> Self {
        match value {
            SortByArg::Score => SortBy::Score,
            SortByArg::Date => SortBy::Date,
            SortByArg::Title => SortBy::Title,
            SortByArg::Messages => SortBy::Messages,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortOrderArg {
    Asc,
    Desc,
}

impl From<SortOrderArg> for SortOrder {
    fn from(value: SortOrderArg) -> Self {
        match value {
            SortOrderArg::Asc => SortOrder::Asc,
            SortOrderArg::Desc => SortOrder::Desc,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    User,
    Assistant,
    System,
}

impl From<RoleArg> for Role {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::User => Role::User,
            RoleArg::Assistant => Role::Assistant,
            RoleArg::System => Role::System,
        }
    }
}

fn parse_naive_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| e.to_string())
}

fn adapter_for(path: &PathBuf, provider: Option<ProviderArg>) -> Result<Adapter> {
    match provider {
        Some(p) => Ok(Adapter::new(p.into())),
        None => Adapter::detect(path).wrap_err_with(|| format!("detecting provider for {}", path.display())),
    }
}

fn main() -> Result<()> {
    echomine::logging::init();
    let cli = Cli::parse();
    let file_config = echomine::config::load_file_config(cli.config.as_deref())?;
    let config = ResolvedConfig::merge(file_config);

    match cli.command {
        Command::List {
            path,
            sort_by,
            sort_order,
            limit,
        } => run_list(&path, cli.provider, sort_by, sort_order, limit),
        Command::Search {
            path,
            keywords,
            match_mode,
            phrases,
            exclude_keywords,
            title,
            role,
            from,
            to,
            min_messages,
            max_messages,
            sort_by,
            sort_order,
            limit,
        } => run_search(
            &path,
            cli.provider,
            keywords,
            match_mode,
            phrases,
            exclude_keywords,
            title,
            role,
            from,
            to,
            min_messages,
            max_messages,
            sort_by,
            sort_order,
            limit,
            &config,
        ),
        Command::Render {
            path,
            id,
            output,
            no_front_matter,
            message_ids,
        } => run_render(&path, cli.provider, &id, output, no_front_matter, message_ids, &config),
    }
}

fn run_list(
    path: &PathBuf,
    provider: Option<ProviderArg>,
    sort_by: Option<SortByArg>,
    sort_order: SortOrderArg,
    limit: Option<u32>,
) -> Result<()> {
    let adapter = adapter_for(path, provider)?;

    // `list` means "show the whole export" by default, so it does not fall
    // back to the config's search-oriented `default_limit` — only an
    // explicit flag overrides the practical ceiling.
    let query = SearchQueryBuilder::new()
        .sort_by(sort_by.map(SortBy::from).unwrap_or(SortBy::Date))
        .sort_order(sort_order.into())
        .limit(limit.unwrap_or(echomine::model::query::MAX_LIMIT))
        .build()?;

    let mut skipped = 0usize;
    let stream = adapter.stream_conversations(
        path,
        Some(Box::new(|_event| skipped += 1)),
        None,
    )?;
    let results = echomine::search::run(stream, &query)?;

    for result in &results {
        println!(
            "{}\t{}\t{}\t{} messages",
            result.conversation.id(),
            result.conversation.updated_at_or_created().to_rfc3339(),
            result.conversation.title(),
            result.conversation.messages().len(),
        );
    }
    if skipped > 0 {
        eprintln!("skipped {skipped} invalid record(s)");
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_search(
    path: &PathBuf,
    provider: Option<ProviderArg>,
    keywords: Vec<String>,
    match_mode: MatchModeArg,
    phrases: Vec<String>,
    exclude_keywords: Vec<String>,
    title: Option<String>,
    role: Option<RoleArg>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    min_messages: Option<u32>,
    max_messages: Option<u32>,
    sort_by: Option<SortByArg>,
    sort_order: SortOrderArg,
    limit: Option<u32>,
    config: &ResolvedConfig,
) -> Result<()> {
    let adapter = adapter_for(path, provider)?;

    let mut builder = SearchQueryBuilder::new()
        .keywords(keywords)
        .match_mode(match_mode.into())
        .phrases(phrases)
        .exclude_keywords(exclude_keywords)
        .sort_by(sort_by.map(SortBy::from).unwrap_or(config.default_sort_by))
        .sort_order(sort_order.into())
        .limit(limit.unwrap_or(config.default_limit));
    if let Some(title) = title {
        builder = builder.title_filter(title);
    }
    if let Some(role) = role {
        builder = builder.role_filter(role.into());
    }
    if let Some(from) = from {
        builder = builder.from_date(from);
    }
    if let Some(to) = to {
        builder = builder.to_date(to);
    }
    if let Some(min) = min_messages {
        builder = builder.min_messages(min);
    }
    if let Some(max) = max_messages {
        builder = builder.max_messages(max);
    }
    let query = builder.build()?;

    let stream = adapter.stream_conversations(path, None, None)?;
    let results = echomine::search::run(stream, &query)?;

    for result in &results {
        println!(
            "{:.3}\t{}\t{}\n  {}",
            result.score,
            result.conversation.id(),
            result.conversation.title(),
            result.snippet,
        );
    }
    Ok(())
}

fn run_render(
    path: &PathBuf,
    provider: Option<ProviderArg>,
    id: &str,
    output: Option<PathBuf>,
    no_front_matter: bool,
    message_ids: bool,
    config: &ResolvedConfig,
) -> Result<()> {
    let adapter = adapter_for(path, provider)?;
    let conversation = adapter
        .get_conversation_by_id(path, id)?
        .ok_or_else(|| eyre::eyre!("no conversation with id {id} in {}", path.display()))?;

    let options = RenderOptions {
        front_matter: !no_front_matter,
        message_ids,
        tags: config.tags.clone(),
        ..RenderOptions::default()
    };
    let markdown = render(&conversation, &options);

    match output {
        Some(path) => fs::write(&path, markdown)
            .wrap_err_with(|| format!("writing {}", path.display()))?,
        None => print!("{markdown}"),
    }
    Ok(())
}
