use std::time::Duration;

use clap::Parser;
use docsearch::config::Config;
use docsearch::elastic::ElasticClient;
use docsearch::markdown::format_results;
use docsearch::search::request::DEFAULT_PAGE_SIZE;
use docsearch::search::{DocumentSearch, Lang, SearchRequest, SiteFilter};
use reqwest::Client;
use tracing::info;

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Search document collections in Elasticsearch.
///
/// Connection settings come from ELASTICSEARCH_URL, ELASTICSEARCH_USERNAME,
/// ELASTICSEARCH_PASSWORD, DOCSEARCH_NAMESPACE, DOCSEARCH_TIMEOUT_SECS and
/// DOCSEARCH_MIN_MATCH_RATIO; flags override them.
#[derive(Parser, Debug)]
#[command(name = "docsearch", version)]
struct Cli {
    /// Collection handle to search (repeat for several collections)
    #[arg(short = 'H', long = "handle", required = true)]
    handles: Vec<String>,

    /// Document language code (e.g. en, fr, es)
    #[arg(short, long, default_value = "en")]
    lang: Lang,

    /// Number of results to return
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    size: u32,

    /// Number of results to skip
    #[arg(long, default_value_t = 0)]
    offset: u32,

    /// Restrict to a site: "domain" or "domain/path/prefix" (repeatable)
    #[arg(long = "site")]
    sites: Vec<SiteFilter>,

    /// Elasticsearch base URL
    #[arg(long)]
    url: Option<String>,

    /// Alias namespace
    #[arg(long)]
    namespace: Option<String>,

    /// Print Markdown instead of JSON
    #[arg(long)]
    markdown: bool,

    /// Query text
    query: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("docsearch=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(url) = &cli.url {
        config = config.with_url(url)?;
    }
    if let Some(namespace) = cli.namespace {
        config = config.with_namespace(namespace);
    }

    let http = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
    let backend = ElasticClient::from_config(http, &config);
    info!(url = %config.url, namespace = %config.namespace, "using search backend");

    let search = DocumentSearch::new(backend, config.settings());
    let query = cli.query.join(" ");
    let request = SearchRequest::new(cli.handles, cli.lang, query.as_str())
        .with_page(cli.size, cli.offset)
        .with_site_filters(cli.sites);

    let results = search.search(&request).await?;

    if cli.markdown {
        print!("{}", format_results(&results, &query));
    } else {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }
    Ok(())
}
