//! seoscout CLI
//!
//! Keyword research over DataForSEO and OpenRouter: one subcommand per user
//! action, results rendered as tables, exports on demand.

mod render;

use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use seoscout_agents::{
    cluster_keywords, create_backend, ContentAgent, ContentType, GenerateParams, Humanizer,
    HumanizerConfig, OpenRouterBackend, OpenRouterConfig, ResearchAgent, SharedBackend,
};
use seoscout_core::{export, Category, Filters, Query, ResultSet, Session};
use seoscout_data::DataSource;

#[derive(Parser)]
#[command(name = "seoscout")]
#[command(author, version, about = "Keyword research over DataForSEO and OpenRouter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value = "1", global = true)]
    verbose: u8,

    /// OpenRouter API key (or set OPENROUTER_API_KEY env var)
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true, global = true)]
    openrouter_key: Option<String>,

    /// LLM model to use
    #[arg(long, env = "OPENROUTER_MODEL", default_value = "google/gemini-2.5-flash-lite", global = true)]
    model: String,

    /// Export the fetched table (csv, xlsx, json)
    #[arg(long, value_enum, global = true)]
    export: Option<ExportFormat>,

    /// Output file for exports and drafts
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Xlsx,
    Json,
}

impl ExportFormat {
    fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Research keyword ideas for a seed keyword
    Keywords {
        /// The seed keyword
        #[arg(short, long)]
        seed: String,

        /// Target country code
        #[arg(long, default_value = "us")]
        country: String,

        /// Target language code
        #[arg(long, default_value = "en")]
        language: String,

        /// Minimum monthly search volume
        #[arg(long, default_value = "100")]
        min_volume: u64,

        /// Maximum difficulty score (0-100)
        #[arg(long, default_value = "70")]
        max_difficulty: u32,

        /// Maximum keywords to request
        #[arg(long, default_value = "50")]
        limit: usize,

        /// Skip the LLM insight pass
        #[arg(long)]
        no_insights: bool,

        /// Also print intent clusters
        #[arg(long)]
        clusters: bool,
    },

    /// Analyze the organic SERP for a keyword
    Serp {
        /// The keyword to search
        #[arg(short, long)]
        keyword: String,

        #[arg(long, default_value = "us")]
        country: String,

        #[arg(long, default_value = "en")]
        language: String,

        /// Add a content-gap note per result (one LLM call each)
        #[arg(long)]
        insights: bool,
    },

    /// Search-volume metrics for a comma-separated keyword list
    Volume {
        /// Keywords, comma-separated
        #[arg(short, long)]
        keywords: String,

        #[arg(long, default_value = "us")]
        country: String,

        #[arg(long, default_value = "en")]
        language: String,
    },

    /// Google Trends interest over time (up to 5 keywords)
    Trends {
        /// Keywords, comma-separated
        #[arg(short, long)]
        keywords: String,

        /// Trends window
        #[arg(long, default_value = "past_12_months")]
        time_range: String,

        #[arg(long, default_value = "us")]
        country: String,
    },

    /// Find competing domains for a target domain
    Competitors {
        /// Target domain
        #[arg(short, long)]
        domain: String,

        #[arg(long, default_value = "us")]
        country: String,

        #[arg(long, default_value = "en")]
        language: String,

        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Keywords a domain ranks for
    Ranked {
        /// Target domain
        #[arg(short, long)]
        domain: String,

        #[arg(long, default_value = "us")]
        country: String,

        #[arg(long, default_value = "en")]
        language: String,

        #[arg(long, default_value = "100")]
        limit: usize,
    },

    /// Full domain-rankings report with quick wins
    Domain {
        /// Target domain
        #[arg(short, long)]
        domain: String,

        #[arg(long, default_value = "us")]
        country: String,

        #[arg(long, default_value = "en")]
        language: String,

        #[arg(long, default_value = "100")]
        limit: usize,
    },

    /// On-page analysis of a URL
    Onpage {
        /// URL to analyze (scheme optional)
        #[arg(short, long)]
        url: String,
    },

    /// Generate a content brief from the live SERP
    Brief {
        /// The keyword to brief
        #[arg(short, long)]
        keyword: String,

        #[arg(long, default_value = "general")]
        audience: String,

        #[arg(long, default_value = "us")]
        country: String,

        #[arg(long, default_value = "en")]
        language: String,
    },

    /// Draft long-form content for a keyword
    Generate {
        /// Primary keyword
        #[arg(short, long)]
        keyword: String,

        /// Content title
        #[arg(short, long)]
        title: String,

        /// blog-post, landing-page, product-page, guide, comparison
        #[arg(long, default_value = "blog-post")]
        content_type: String,

        #[arg(long, default_value = "general")]
        audience: String,

        /// Target word count
        #[arg(short, long, default_value = "1500")]
        words: usize,

        /// Skip fresh SERP/keyword/trends research
        #[arg(long)]
        no_research: bool,

        /// Run the humanization pass on the draft
        #[arg(long)]
        humanize: bool,
    },

    /// Refine an existing draft toward a new target length
    Refine {
        /// Draft file to refine
        #[arg(short, long)]
        input: PathBuf,

        /// What to change
        #[arg(long)]
        instruction: String,

        /// New target word count
        #[arg(short, long)]
        words: usize,

        /// Primary keyword to maintain
        #[arg(long, default_value = "")]
        keyword: String,
    },

    /// Suggest improvements for an existing draft
    Suggest {
        /// Draft file to critique
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Humanize an existing draft
    Humanize {
        /// Draft file to humanize
        #[arg(short, long)]
        input: PathBuf,

        /// Target word count (defaults to the draft's length)
        #[arg(long, default_value = "0")]
        target_words: usize,
    },

    /// List models available on the gateway
    Models,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    let backend: Option<SharedBackend> = match &cli.openrouter_key {
        Some(key) => Some(create_backend(OpenRouterConfig::new(key, &cli.model))?),
        None => None,
    };

    let source = DataSource::from_env();
    if !source.is_configured() {
        eprintln!("Warning: DataForSEO credentials not set; analyses will return no rows.");
        eprintln!("         Set DATAFORSEO_USERNAME and DATAFORSEO_PASSWORD.");
    }

    let research = ResearchAgent::new(source, backend.clone());
    let mut session = Session::new();

    match cli.command {
        Commands::Keywords {
            seed,
            country,
            language,
            min_volume,
            max_difficulty,
            limit,
            no_insights,
            clusters,
        } => {
            let query = Query::new(&seed)
                .with_locale(&country, &language)
                .with_filters(Filters {
                    min_volume,
                    max_difficulty,
                })
                .with_limit(limit);

            let outcome = research.research_keywords(&query, !no_insights).await;
            println!("Keyword ideas for '{}' ({} rows)\n", seed, outcome.rows.len());

            if clusters {
                let grouped = cluster_keywords(&outcome.rows);
                println!("Intent clusters:");
                println!("  informational: {}", grouped.informational.join(", "));
                println!("  commercial:    {}", grouped.commercial.join(", "));
                println!("  navigational:  {}", grouped.navigational.join(", "));
                println!("  other:         {}\n", grouped.other.join(", "));
            }

            let narrative = outcome.analysis.clone();
            finish_table(
                &mut session,
                ResultSet::Keywords(outcome.rows),
                narrative.as_deref().map(|n| ("AI Insights", n)),
                cli.export,
                cli.output,
            )?;
        }

        Commands::Serp {
            keyword,
            country,
            language,
            insights,
        } => {
            let query = Query::new(&keyword).with_locale(&country, &language);
            let rows = research.analyze_serp(&query, insights).await;
            println!("SERP for '{}' ({} results)\n", keyword, rows.len());

            if insights {
                for row in rows.iter().filter(|r| r.insight.is_some()) {
                    println!("#{} {}", row.position, row.url);
                    println!("   {}", row.insight.as_deref().unwrap_or(""));
                }
                println!();
            }

            finish_table(&mut session, ResultSet::Serp(rows), None, cli.export, cli.output)?;
        }

        Commands::Volume {
            keywords,
            country,
            language,
        } => {
            let list = split_keywords(&keywords)?;
            let query = Query::new(&list[0]).with_locale(&country, &language);
            let rows = research.search_volume(&list, &query).await;
            println!("Search volume for {} keywords\n", list.len());
            finish_table(&mut session, ResultSet::Volume(rows), None, cli.export, cli.output)?;
        }

        Commands::Trends {
            keywords,
            time_range,
            country,
        } => {
            let list = split_keywords(&keywords)?;
            let query = Query::new(&list[0]).with_locale(&country, "en");
            let report = research.trends(&list, &time_range, &query).await;

            if let Some(note) = &report.note {
                println!("{}\n", note);
            }
            if !report.related_queries.is_empty() {
                println!("Related queries: {}\n", report.related_queries.join(", "));
            }
            finish_table(&mut session, ResultSet::Trends(report), None, cli.export, cli.output)?;
        }

        Commands::Competitors {
            domain,
            country,
            language,
            limit,
        } => {
            let query = Query::new(&domain)
                .with_locale(&country, &language)
                .with_limit(limit);
            let rows = research.competitor_domains(&query).await;
            println!("Competitors of {} ({} domains)\n", domain, rows.len());
            finish_table(
                &mut session,
                ResultSet::Competitors(rows),
                None,
                cli.export,
                cli.output,
            )?;
        }

        Commands::Ranked {
            domain,
            country,
            language,
            limit,
        } => {
            let query = Query::new(&domain)
                .with_locale(&country, &language)
                .with_limit(limit);
            let rows = research.ranked_keywords(&query).await;
            println!("Ranked keywords for {} ({} rows)\n", domain, rows.len());
            finish_table(&mut session, ResultSet::Ranked(rows), None, cli.export, cli.output)?;
        }

        Commands::Domain {
            domain,
            country,
            language,
            limit,
        } => {
            let query = Query::new(&domain)
                .with_locale(&country, &language)
                .with_limit(limit);
            let report = research.domain_report(&query).await;
            print_domain_report(&report);

            finish_table(
                &mut session,
                ResultSet::Ranked(report.top_traffic.clone()),
                report
                    .insights
                    .ai_recommendations
                    .as_deref()
                    .map(|r| ("AI Recommendations", r)),
                cli.export,
                cli.output,
            )?;
        }

        Commands::Onpage { url } => {
            let report = research.analyze_content(&url).await;
            if report.status_code == 0 {
                println!("No on-page data retrieved for {}", report.url);
            } else {
                let insights = report.insights.clone();
                finish_table(
                    &mut session,
                    ResultSet::OnPage(report),
                    insights.as_deref().map(|i| ("AI Insights", i)),
                    cli.export,
                    cli.output,
                )?;
            }
        }

        Commands::Brief {
            keyword,
            audience,
            country,
            language,
        } => {
            let query = Query::new(&keyword).with_locale(&country, &language);
            let serp = research.analyze_serp(&query, false).await;
            match research.content_brief(&keyword, &serp, &audience).await {
                Some(brief) => {
                    render::print_narrative(&format!("Content brief: {}", keyword), &brief);
                    write_text_output(cli.output, "brief", &brief)?;
                }
                None => {
                    return Err(anyhow!(
                        "no brief generated - is OPENROUTER_API_KEY set and the gateway reachable?"
                    ))
                }
            }
        }

        Commands::Generate {
            keyword,
            title,
            content_type,
            audience,
            words,
            no_research,
            humanize,
        } => {
            let backend = backend.clone().ok_or_else(|| {
                anyhow!("OpenRouter API key required. Set OPENROUTER_API_KEY or use --openrouter-key")
            })?;

            let content_type: ContentType = content_type
                .parse()
                .map_err(|e: String| anyhow!(e))?;

            let context = if no_research {
                None
            } else {
                let query = Query::new(&keyword).with_limit(10);
                Some(research.content_context(&keyword, &query).await)
            };

            let agent = ContentAgent::new(backend.clone());
            let params = GenerateParams {
                keyword: keyword.clone(),
                title: title.clone(),
                content_type,
                audience,
                target_words: words,
            };
            let mut draft = agent.generate(&params, context.as_ref()).await?;

            if humanize {
                let humanizer = Humanizer::new(HumanizerConfig::default());
                if humanizer.is_configured() {
                    let outcome = humanizer
                        .humanize(&draft.content, words, Some(&backend))
                        .await?;
                    println!(
                        "Humanized: {} -> {} words ({}% of target, {} sections, {} chunks)",
                        outcome.original_words,
                        outcome.final_words,
                        outcome.accuracy_percentage,
                        outcome.sections_processed,
                        outcome.chunks_processed,
                    );
                    draft.replace_content(outcome.content);
                    draft.humanized = true;
                } else {
                    eprintln!("Humanizer credentials not set (HUMANIZER_EMAIL / HUMANIZER_PW); skipping.");
                }
            }

            println!(
                "\nGenerated {} words of {} content.",
                draft.word_count, draft.content_type
            );
            print_preview(&draft.content);

            let path = write_text_output(cli.output, "draft", &draft.content)?;
            println!("\nDraft saved to: {}", path.display());
            session.draft = Some(draft);
        }

        Commands::Refine {
            input,
            instruction,
            words,
            keyword,
        } => {
            let backend = backend.clone().ok_or_else(|| {
                anyhow!("OpenRouter API key required. Set OPENROUTER_API_KEY or use --openrouter-key")
            })?;

            let current = fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;

            let agent = ContentAgent::new(backend);
            let refined = agent.refine(&current, &instruction, &keyword, words).await?;

            let new_words = refined.split_whitespace().count();
            println!("Refined draft: {} words (target {})", new_words, words);
            print_preview(&refined);

            let path = write_text_output(cli.output, "refined", &refined)?;
            println!("\nRefined draft saved to: {}", path.display());
        }

        Commands::Suggest { input } => {
            let backend = backend.clone().ok_or_else(|| {
                anyhow!("OpenRouter API key required. Set OPENROUTER_API_KEY or use --openrouter-key")
            })?;

            let content = fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;

            let agent = ContentAgent::new(backend);
            let suggestions = agent.suggest_improvements(&content).await?;

            println!("Improvement suggestions:");
            for suggestion in suggestions {
                println!("  - {}", suggestion);
            }
        }

        Commands::Humanize {
            input,
            target_words,
        } => {
            let content = fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;

            let humanizer = Humanizer::new(HumanizerConfig::default());
            let outcome = humanizer
                .humanize(&content, target_words, backend.as_ref())
                .await?;

            println!("Humanization complete");
            println!("  Original:  {} words", outcome.original_words);
            println!("  Final:     {} words ({}% of target)", outcome.final_words, outcome.accuracy_percentage);
            println!("  Sections:  {}", outcome.sections_processed);
            println!("  Chunks:    {}", outcome.chunks_processed);
            println!("  Structure preserved: {}", outcome.structure_preserved);
            if outcome.expanded {
                println!("  Expanded to reach the target band");
            }

            let path = write_text_output(cli.output, "humanized", &outcome.content)?;
            println!("\nHumanized draft saved to: {}", path.display());
        }

        Commands::Models => {
            let key = cli.openrouter_key.ok_or_else(|| {
                anyhow!("OpenRouter API key required. Set OPENROUTER_API_KEY or use --openrouter-key")
            })?;
            let gateway = OpenRouterBackend::new(OpenRouterConfig::new(&key, &cli.model))?;
            for model in gateway.available_models().await {
                println!("{}", model);
            }
        }
    }

    Ok(())
}

/// Store a result set in the session, render it, and export on demand
fn finish_table(
    session: &mut Session,
    results: ResultSet,
    narrative: Option<(&str, &str)>,
    export_format: Option<ExportFormat>,
    output: Option<PathBuf>,
) -> Result<()> {
    let category = results.category();
    session.store(results);

    if let Some(stored) = session.latest(category) {
        render::print_table(&stored.to_table());

        if let Some((header, text)) = narrative {
            render::print_narrative(header, text);
        }

        if let Some(format) = export_format {
            let path = export_results(stored, category, format, output)?;
            println!("\nExported to: {}", path.display());
        }
    }

    Ok(())
}

fn export_results(
    results: &ResultSet,
    category: Category,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> Result<PathBuf> {
    let path = output.unwrap_or_else(|| default_output_path(category.label(), format.extension()));

    match format {
        ExportFormat::Csv => fs::write(&path, export::to_csv(&results.to_table())?)?,
        ExportFormat::Xlsx => fs::write(&path, export::to_xlsx(&results.to_table())?)?,
        ExportFormat::Json => fs::write(&path, export::to_json(results)?)?,
    }

    Ok(path)
}

fn default_output_path(label: &str, extension: &str) -> PathBuf {
    let timestamp = chrono::Utc::now().format("%Y-%m-%d_%H-%M-%S");
    let slug = label.replace([' ', '-'], "_");
    PathBuf::from(format!("seoscout_{}_{}.{}", slug, timestamp, extension))
}

fn write_text_output(output: Option<PathBuf>, kind: &str, content: &str) -> Result<PathBuf> {
    let path = output.unwrap_or_else(|| default_output_path(kind, "md"));
    fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

fn print_preview(content: &str) {
    println!("\n{}", "=".repeat(60));
    let preview: String = content.chars().take(1000).collect();
    println!("{}", preview);
    if content.chars().count() > 1000 {
        println!("...\n[truncated - see full draft in the output file]");
    }
}

fn print_domain_report(report: &seoscout_core::DomainReport) {
    println!("Domain report: {}", report.domain);
    println!("  Keywords ranking:    {}", report.total_keywords);
    println!("  Estimated traffic:   {:.0} visits/month", report.total_traffic);
    println!("  Total search volume: {}", report.total_search_volume);
    println!("  Average position:    {:.1}", report.avg_position);
    println!(
        "  Positions: top3={} top10={} 11-20={} 21-50={} 50+={}",
        report.distribution.top_3,
        report.distribution.top_10,
        report.distribution.positions_11_20,
        report.distribution.positions_21_50,
        report.distribution.beyond_50,
    );

    println!("\n{}", report.insights.summary);
    for strength in &report.insights.strengths {
        println!("  + {}", strength);
    }
    for opportunity in &report.insights.opportunities {
        println!("  ~ {}", opportunity);
    }
    for recommendation in &report.insights.recommendations {
        println!("  > {}", recommendation);
    }

    if !report.quick_wins.is_empty() {
        println!("\nQuick wins (positions 11-20 with volume):");
        render::print_table(&ResultSet::Ranked(report.quick_wins.clone()).to_table());
    }

    println!("\nTop traffic keywords:");
}

fn split_keywords(raw: &str) -> Result<Vec<String>> {
    let list: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect();
    if list.is_empty() {
        return Err(anyhow!("no keywords given"));
    }
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keywords() {
        let list = split_keywords("seo, content marketing , ,link building").unwrap();
        assert_eq!(list, vec!["seo", "content marketing", "link building"]);
        assert!(split_keywords(" , ").is_err());
    }

    #[test]
    fn test_default_output_path_slug() {
        let path = default_output_path("keyword ideas", "csv");
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("seoscout_keyword_ideas_"));
        assert!(name.ends_with(".csv"));
    }

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
