//! autoroute CLI: manage a route tree in a SQLite document store.
//!
//! Usage:
//!   autoroute init [--base /routes] [--db path] [--config file]
//!   autoroute create <uri> --content <ref> [--locale <locale>]
//!   autoroute reroute <old-uri> <new-uri>
//!   autoroute tree [path]

use autoroute::{
    AdapterError, AdapterResult, AutoRoute, Config, ContentRef, DocumentStore, Node, NodeKind,
    NodePath, OpenStore, PlaceholderPatcher, RouteAdapter, RouteStack, RouteType, Session,
    SqliteStore, StorageError, UriContext, TAG_NO_MULTILANG,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "autoroute",
    version,
    about = "Route tree adapter for hierarchical document stores"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to SQLite database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Path to YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Route base path (overrides the configuration file)
    #[arg(long, global = true)]
    base: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the route base path
    Init,
    /// Create a route for a content document
    Create {
        /// URI relative to the base path
        uri: String,
        /// Content reference the route points at
        #[arg(long)]
        content: String,
        /// Locale of the content
        #[arg(long)]
        locale: Option<String>,
    },
    /// Create placeholder nodes for every prefix of a URI
    Patch {
        /// URI relative to the base path
        uri: String,
    },
    /// Move a route to a new URI, leaving a redirect behind
    Reroute {
        /// Current URI of the route
        old: String,
        /// New URI for the route
        new: String,
    },
    /// Remove a route and everything below it
    Remove {
        /// URI of the route
        uri: String,
    },
    /// Show the route at a URI
    Show {
        /// URI of the route
        uri: String,
    },
    /// List routes pointing at a content reference
    Referrers {
        /// Content reference
        content: String,
    },
    /// Print the node tree below the base path or a given path
    Tree {
        /// Absolute store path (defaults to the base path)
        path: Option<String>,
    },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("autoroute=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config, String> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path).map_err(|e| format!("Failed to load configuration: {}", e))?,
        None => Config::default(),
    };
    if let Some(db) = &cli.db {
        config.database = Some(db.clone());
    }
    if let Some(base) = &cli.base {
        config.adapter.route_basepath = base.clone();
    }
    Ok(config)
}

fn open_store(config: &Config) -> Result<SqliteStore, String> {
    let db_path = config.database_path();
    SqliteStore::open(&db_path).map_err(|e| format!("Failed to open database: {}", e))
}

/// The route at `uri`, or a not-found error naming the full path
fn required_route(adapter: &RouteAdapter, session: &dyn Session, uri: &str) -> AdapterResult<AutoRoute> {
    match adapter.find_route_for_uri(session, uri)? {
        Some(route) => Ok(route),
        None => Err(StorageError::NodeNotFound(adapter.base_path().join_uri(uri)?).into()),
    }
}

fn describe(route: &AutoRoute) -> String {
    format!(
        "{} [{}] -> {} ({})",
        route.path(),
        route.route_type(),
        route.content(),
        route.tag()
    )
}

fn cmd_init(store: &SqliteStore, config: &Config) -> AdapterResult<()> {
    let base = NodePath::parse(config.adapter.route_basepath.as_str())?;
    let mut session = store.session()?;
    let mut current = session
        .find(&NodePath::root())?
        .ok_or(StorageError::NodeNotFound(NodePath::root()))?;

    for segment in base.segments() {
        let path = current.path.join(segment)?;
        current = match session.find(&path)? {
            Some(existing) => existing,
            None => session.create_child(&current, segment, NodeKind::Intermediate)?,
        };
    }
    session.save()?;

    println!("Route base path '{}' is ready", base);
    Ok(())
}

fn cmd_create(
    store: &SqliteStore,
    config: &Config,
    uri: &str,
    content: &str,
    locale: Option<String>,
) -> AdapterResult<()> {
    let mut session = store.session()?;
    let adapter = RouteAdapter::new(&*session, &config.adapter)?;

    let mut context = UriContext::new(uri, content);
    context.locale = locale;
    let tag = adapter.generate_tag(&context);
    let route = adapter.create_route(&mut *session, &context, &tag)?;
    session.save()?;

    println!("Created route {}", describe(&route));
    Ok(())
}

fn cmd_patch(store: &SqliteStore, config: &Config, uri: &str) -> AdapterResult<()> {
    let mut session = store.session()?;
    let adapter = RouteAdapter::new(&*session, &config.adapter)?;

    let stack = RouteStack::from_uri(adapter.base_path().clone(), uri)?;
    let nodes = PlaceholderPatcher::new().make_routes(&mut *session, &stack)?;
    session.save()?;

    for node in nodes {
        println!("{:<12}  {}", node.kind.name(), node.path);
    }
    Ok(())
}

fn cmd_reroute(store: &SqliteStore, config: &Config, old_uri: &str, new_uri: &str) -> AdapterResult<()> {
    let mut session = store.session()?;
    let adapter = RouteAdapter::new(&*session, &config.adapter)?;

    let mut old = required_route(&adapter, &*session, old_uri)?;
    if old.route_type() == RouteType::Redirect {
        return Err(AdapterError::Conflict {
            path: old.path().clone(),
            found: "redirect route",
        });
    }

    let mut context = UriContext::new(new_uri, old.content().clone());
    if old.tag() != TAG_NO_MULTILANG {
        context = context.with_locale(old.tag());
    }
    let new = adapter.create_route(&mut *session, &context, old.tag())?;
    let relocated = adapter.relocate_children(&mut *session, &old, &new)?;
    adapter.create_redirect(&mut old, &new);
    session.persist(old.as_node())?;
    session.save()?;

    println!("Created route {}", describe(&new));
    println!("Relocated {} child node(s)", relocated.len());
    println!("Redirecting {} -> {}", old.path(), new.path());
    Ok(())
}

fn cmd_remove(store: &SqliteStore, config: &Config, uri: &str) -> AdapterResult<()> {
    let mut session = store.session()?;
    let adapter = RouteAdapter::new(&*session, &config.adapter)?;

    let route = required_route(&adapter, &*session, uri)?;
    adapter.remove_route(&mut *session, &route)?;

    println!("Removed route {}", route.path());
    Ok(())
}

fn cmd_show(store: &SqliteStore, config: &Config, uri: &str) -> AdapterResult<()> {
    let session = store.read_session()?;
    let adapter = RouteAdapter::new(&*session, &config.adapter)?;

    let route = required_route(&adapter, &*session, uri)?;
    println!("path:     {}", route.path());
    println!("id:       {}", route.id());
    println!("class:    {}", route.data().class);
    println!("type:     {}", route.route_type());
    println!("content:  {}", route.content());
    println!("tag:      {}", route.tag());
    if let Some(target) = adapter.resolve_redirect(&*session, &route)? {
        println!("target:   {}", target.path());
    } else if let Some(id) = route.redirect_target() {
        println!("target:   {} (missing)", id);
    }
    Ok(())
}

fn cmd_referrers(store: &SqliteStore, config: &Config, content: &str) -> AdapterResult<()> {
    let session = store.read_session()?;
    let adapter = RouteAdapter::new(&*session, &config.adapter)?;

    let routes = adapter.referring_routes(&*session, &ContentRef::new(content))?;
    if routes.is_empty() {
        println!("No routes point at '{}'.", content);
        return Ok(());
    }
    for route in routes {
        println!("{}", describe(&route));
    }
    Ok(())
}

fn print_tree(session: &dyn Session, node: &Node, depth: usize) -> AdapterResult<()> {
    let label = match node.route() {
        Some(route) => format!("route {} -> {}", route.route_type, route.content),
        None => node.kind.name().to_string(),
    };
    let name = if node.path.is_root() { "/" } else { node.name() };
    println!("{}{}  ({})", "  ".repeat(depth), name, label);

    for child in session.list_children(&node.path)? {
        print_tree(session, &child, depth + 1)?;
    }
    Ok(())
}

fn cmd_tree(store: &SqliteStore, config: &Config, path: Option<String>) -> AdapterResult<()> {
    let start = NodePath::parse(path.unwrap_or_else(|| config.adapter.route_basepath.clone()))?;
    let session = store.read_session()?;
    let node = session
        .find(&start)?
        .ok_or(StorageError::NodeNotFound(start))?;
    print_tree(&*session, &node, 0)
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let store = match open_store(&config) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Init => cmd_init(&store, &config),
        Commands::Create { uri, content, locale } => cmd_create(&store, &config, &uri, &content, locale),
        Commands::Patch { uri } => cmd_patch(&store, &config, &uri),
        Commands::Reroute { old, new } => cmd_reroute(&store, &config, &old, &new),
        Commands::Remove { uri } => cmd_remove(&store, &config, &uri),
        Commands::Show { uri } => cmd_show(&store, &config, &uri),
        Commands::Referrers { content } => cmd_referrers(&store, &config, &content),
        Commands::Tree { path } => cmd_tree(&store, &config, path),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
