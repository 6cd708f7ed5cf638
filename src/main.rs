use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use serper_mcp::config::{find_config_file, get_config, load_config, Config};
use serper_mcp::mcp::{McpServer, SseServer, ToolRegistry};
use serper_mcp::models::{AutocompleteQuery, LensRequest, ScrapeRequest, SearchRequest};
use serper_mcp::serper::{SearchVertical, SerperClient};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Serper MCP - Web search tools over the Serper API, as a CLI and MCP server
#[derive(Parser, Debug)]
#[command(name = "serper-mcp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Web search via the Serper API, exposed as MCP tools", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overall command timeout in seconds
    #[arg(long, global = true, default_value_t = 120)]
    timeout: u64,

    /// Show the recognized environment variables and exit
    #[arg(long, global = true)]
    env: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Pretty JSON on a terminal, compact otherwise
    Auto,
    /// Compact JSON (machine-readable)
    Json,
    /// Pretty-printed JSON
    Pretty,
}

/// SERP vertical to query
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SearchKind {
    Web,
    Images,
    Videos,
    News,
    Places,
    Maps,
    Reviews,
    Shopping,
    Scholar,
    Patents,
}

impl From<SearchKind> for SearchVertical {
    fn from(kind: SearchKind) -> Self {
        match kind {
            SearchKind::Web => SearchVertical::Web,
            SearchKind::Images => SearchVertical::Images,
            SearchKind::Videos => SearchVertical::Videos,
            SearchKind::News => SearchVertical::News,
            SearchKind::Places => SearchVertical::Places,
            SearchKind::Maps => SearchVertical::Maps,
            SearchKind::Reviews => SearchVertical::Reviews,
            SearchKind::Shopping => SearchVertical::Shopping,
            SearchKind::Scholar => SearchVertical::Scholar,
            SearchKind::Patents => SearchVertical::Patents,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search a SERP vertical
    #[command(alias = "s")]
    Search {
        /// Search query string
        query: String,

        /// Which vertical to search
        #[arg(long, short, value_enum, default_value_t = SearchKind::Web)]
        kind: SearchKind,

        /// Region code (ISO 3166-1 alpha-2)
        #[arg(long, default_value = "us")]
        gl: String,

        /// Language code (ISO 639-1)
        #[arg(long, default_value = "en")]
        hl: String,

        /// Location for localized results
        #[arg(long)]
        location: Option<String>,

        /// Number of results
        #[arg(long, short)]
        num: Option<u32>,

        /// Result page
        #[arg(long, short)]
        page: Option<u32>,

        /// Time filter (qdr:h, qdr:d, qdr:w, qdr:m, qdr:y)
        #[arg(long)]
        tbs: Option<String>,

        /// Limit results to a domain
        #[arg(long)]
        site: Option<String>,

        /// Limit to file types (pdf, doc, ...)
        #[arg(long)]
        filetype: Option<String>,

        /// Pages with word in the URL
        #[arg(long)]
        inurl: Option<String>,

        /// Pages with word in the title
        #[arg(long)]
        intitle: Option<String>,

        /// Sites similar to a domain
        #[arg(long)]
        related: Option<String>,

        /// Google's cached version of a URL
        #[arg(long)]
        cache: Option<String>,

        /// Results dated before (YYYY-MM-DD)
        #[arg(long)]
        before: Option<String>,

        /// Results dated after (YYYY-MM-DD)
        #[arg(long)]
        after: Option<String>,

        /// Exact phrase match
        #[arg(long)]
        exact: Option<String>,

        /// Comma-separated terms to exclude
        #[arg(long)]
        exclude: Option<String>,

        /// Comma-separated alternative terms
        #[arg(long = "or")]
        or_terms: Option<String>,
    },

    /// Extract the content of a web page
    Scrape {
        /// URL of the page to extract
        url: String,

        /// Include markdown content
        #[arg(long)]
        markdown: bool,
    },

    /// Autocomplete suggestions for one or more queries
    Autocomplete {
        /// Queries to complete
        #[arg(required = true)]
        queries: Vec<String>,

        /// Region code
        #[arg(long, default_value = "us")]
        gl: String,

        /// Language code
        #[arg(long, default_value = "en")]
        hl: String,

        /// Location for localized suggestions
        #[arg(long)]
        location: Option<String>,
    },

    /// Reverse image search via Google Lens
    Lens {
        /// URL of the image to search for
        image_url: String,

        /// Region code
        #[arg(long, default_value = "us")]
        gl: String,

        /// Language code
        #[arg(long, default_value = "en")]
        hl: String,
    },

    /// List the available MCP tools
    Tools {
        /// Include the full input schemas
        #[arg(long)]
        detailed: bool,
    },

    /// Check Serper API health
    Health,

    /// Run the MCP server
    Serve {
        /// Serve over stdio (default)
        #[arg(long, conflicts_with = "sse")]
        stdio: bool,

        /// Serve the SSE session transport over HTTP
        #[arg(long)]
        sse: bool,

        /// Bind address for the SSE transport
        #[arg(long)]
        host: Option<String>,

        /// Bind port for the SSE transport
        #[arg(long)]
        port: Option<u16>,
    },
}

fn print_env_vars() {
    println!("Environment variables recognized by serper-mcp:");
    println!();
    println!("  SERPER_API_KEY          Serper API key (required for API calls)");
    println!("  MCP_TOKEN               Bearer token for the SSE server (optional)");
    println!("  SERPER_MCP_SERVER__HOST     SSE bind address (default: 127.0.0.1)");
    println!("  SERPER_MCP_SERVER__PORT     SSE bind port (default: 3001)");
    println!("  SERPER_MCP_SERPER__BASE_URL Upstream base URL override");
    println!("  RUST_LOG                Log filter override");
    println!();
    println!("Example:");
    println!("  export SERPER_API_KEY=\"your-key\"");
    println!("  serper-mcp serve --sse --port 3001");
    std::process::exit(0);
}

fn print_value(value: &serde_json::Value, output: OutputFormat) -> Result<()> {
    let pretty = match output {
        OutputFormat::Pretty => true,
        OutputFormat::Json => false,
        OutputFormat::Auto => std::io::stdout().is_terminal(),
    };

    if pretty {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", serde_json::to_string(value)?);
    }
    Ok(())
}

fn build_client(config: &Config) -> Result<Arc<SerperClient>> {
    let client = match &config.serper.api_key {
        Some(key) => SerperClient::new(key.clone())?,
        None => SerperClient::from_env()
            .context("set SERPER_API_KEY or serper.api_key in the config file")?,
    };

    Ok(Arc::new(client.with_base_url(config.serper.base_url.clone())))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.env {
        print_env_vars();
    }

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("serper_mcp={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration from file if specified or found in default locations
    let config = match find_config_file(cli.config.as_deref()) {
        Some(path) => {
            tracing::info!("Using config file: {}", path.display());
            load_config(&path)?
        }
        None => get_config(),
    };

    let timeout = Duration::from_secs(cli.timeout);

    match cli.command {
        Some(Commands::Search {
            query,
            kind,
            gl,
            hl,
            location,
            num,
            page,
            tbs,
            site,
            filetype,
            inurl,
            intitle,
            related,
            cache,
            before,
            after,
            exact,
            exclude,
            or_terms,
        }) => {
            let client = build_client(&config)?;

            let mut request = SearchRequest::new(&query).gl(gl).hl(hl);
            request.location = location;
            request.num = num;
            request.page = page;
            request.tbs = tbs;
            request.site = site;
            request.filetype = filetype;
            request.inurl = inurl;
            request.intitle = intitle;
            request.related = related;
            request.cache = cache;
            request.before = before;
            request.after = after;
            request.exact = exact;
            request.exclude = exclude;
            request.or_terms = or_terms;

            let result = tokio::time::timeout(timeout, client.search(kind.into(), &request))
                .await
                .context("search timed out")??;
            print_value(&result, cli.output)?;
        }

        Some(Commands::Scrape { url, markdown }) => {
            let client = build_client(&config)?;
            let request = ScrapeRequest::new(url).include_markdown(markdown);

            let result = tokio::time::timeout(timeout, client.scrape(&request))
                .await
                .context("scrape timed out")??;
            print_value(&result, cli.output)?;
        }

        Some(Commands::Autocomplete {
            queries,
            gl,
            hl,
            location,
        }) => {
            let client = build_client(&config)?;
            let batch: Vec<AutocompleteQuery> = queries
                .into_iter()
                .map(|q| AutocompleteQuery {
                    q,
                    gl: gl.clone(),
                    hl: hl.clone(),
                    location: location.clone(),
                })
                .collect();

            let result = tokio::time::timeout(timeout, client.autocomplete(&batch))
                .await
                .context("autocomplete timed out")??;
            print_value(&result, cli.output)?;
        }

        Some(Commands::Lens { image_url, gl, hl }) => {
            let client = build_client(&config)?;
            let request = LensRequest {
                url: image_url,
                gl,
                hl,
                location: None,
            };

            let result = tokio::time::timeout(timeout, client.lens(&request))
                .await
                .context("lens search timed out")??;
            print_value(&result, cli.output)?;
        }

        Some(Commands::Tools { detailed }) => {
            let client = build_client(&config)?;
            let registry = ToolRegistry::from_client(client);

            if detailed || !matches!(cli.output, OutputFormat::Auto) {
                let descriptors = serde_json::Value::Array(registry.descriptors());
                print_value(&descriptors, cli.output)?;
            } else if std::io::stdout().is_terminal() {
                let mut table = Table::new();
                table.load_preset(UTF8_FULL);
                table.set_header(vec!["Tool", "Description"]);
                for tool in registry.all() {
                    table.add_row(vec![
                        Cell::new(&tool.name),
                        Cell::new(&tool.description),
                    ]);
                }
                println!("{table}");
                println!("{} tools registered", registry.len());
            } else {
                let descriptors = serde_json::Value::Array(registry.descriptors());
                print_value(&descriptors, cli.output)?;
            }
        }

        Some(Commands::Health) => {
            let client = build_client(&config)?;
            let status = tokio::time::timeout(timeout, client.health())
                .await
                .context("health check timed out")?;

            print_value(&serde_json::to_value(&status)?, cli.output)?;
            if !status.is_healthy() {
                std::process::exit(1);
            }
        }

        Some(Commands::Serve {
            stdio: _,
            sse,
            host,
            port,
        }) => {
            let client = build_client(&config)?;
            let registry = ToolRegistry::from_client(client.clone());

            if sse {
                let host = host.unwrap_or_else(|| config.server.host.clone());
                let port = port.unwrap_or(config.server.port);
                let addr = format!("{}:{}", host, port)
                    .parse()
                    .with_context(|| format!("invalid bind address {}:{}", host, port))?;

                let server = SseServer::new(client, registry, config.server.token.clone());
                server.serve(addr).await?;
            } else {
                let server = McpServer::new(&registry)?;
                server.run().await?;
            }
        }

        // Bare invocation serves stdio, matching how MCP clients launch servers
        None => {
            let client = build_client(&config)?;
            let registry = ToolRegistry::from_client(client);
            let server = McpServer::new(&registry)?;
            server.run().await?;
        }
    }

    Ok(())
}
