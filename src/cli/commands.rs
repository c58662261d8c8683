use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::domain::{Domain, Resolution, Router};
use crate::hot_reload::{watch_config, RouterHandle};

/// Command-line interface for radixroute
#[derive(Parser, Debug)]
#[command(name = "radixroute")]
#[command(about = "Inspect and exercise radix-tree route configurations", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Load a route configuration and report domain and route counts
    Check {
        /// Route configuration file (YAML or JSON)
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the route table
    Routes {
        #[arg(short, long)]
        config: PathBuf,

        /// Only the domain serving this host
        #[arg(long)]
        host: Option<String>,
    },
    /// Resolve a request against a domain
    Lookup {
        #[arg(short, long)]
        config: PathBuf,

        /// Host header value, with optional port
        #[arg(long)]
        host: String,

        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Extra request header as `Name: value`, repeatable
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Request path
        path: String,
    },
    /// Build the URL of a named route
    Reverse {
        #[arg(short, long)]
        config: PathBuf,

        #[arg(long)]
        host: String,

        /// Route name
        #[arg(short, long)]
        name: String,

        /// Parameter values in order, or `key=value` pairs
        args: Vec<String>,
    },
    /// Keep reloading the configuration whenever it changes
    Watch {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Run a parsed command line, writing results to stdout.
///
/// # Errors
///
/// Any load, lookup, or I/O error from the command.
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(&cli.command, &mut out)
}

/// Run one command, writing results to `out`.
///
/// `watch` blocks until the process is stopped.
///
/// # Errors
///
/// Any load, lookup, or I/O error from the command.
pub fn execute(command: &Commands, out: &mut impl Write) -> anyhow::Result<()> {
    match command {
        Commands::Check { config } => {
            let router = Router::load(config)?;
            check(&router, config, out)
        }
        Commands::Routes { config, host } => {
            let router = Router::load(config)?;
            match host {
                Some(host) => print_routes(find_domain(&router, host)?, out),
                None => {
                    for domain in router.domains() {
                        print_routes(domain, out)?;
                    }
                    Ok(())
                }
            }
        }
        Commands::Lookup {
            config,
            host,
            method,
            headers,
            path,
        } => {
            let router = Router::load(config)?;
            let domain = find_domain(&router, host)?;
            let method = parse_method(method)?;
            let headers = parse_headers(headers)?;
            let resolution = domain.resolve(&method, path, &headers)?;
            print_resolution(domain, &method, path, &resolution, out)
        }
        Commands::Reverse {
            config,
            host,
            name,
            args,
        } => {
            let router = Router::load(config)?;
            let domain = find_domain(&router, host)?;
            let url = reverse(domain, name, args)?;
            writeln!(out, "{url}")?;
            Ok(())
        }
        Commands::Watch { config } => watch(config),
    }
}

fn find_domain<'r>(router: &'r Router, host: &str) -> anyhow::Result<&'r Domain> {
    router
        .lookup(host)
        .ok_or_else(|| anyhow!("no domain configured for host {host}"))
}

fn parse_method(method: &str) -> anyhow::Result<Method> {
    Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
        .with_context(|| format!("invalid method {method:?}"))
}

fn parse_headers(raw: &[String]) -> anyhow::Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for line in raw {
        let Some((name, value)) = line.split_once(':') else {
            bail!("header {line:?} is not `Name: value`");
        };
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .with_context(|| format!("invalid header name in {line:?}"))?;
        let value = HeaderValue::from_str(value.trim())
            .with_context(|| format!("invalid header value in {line:?}"))?;
        headers.append(name, value);
    }
    Ok(headers)
}

fn reverse(domain: &Domain, name: &str, args: &[String]) -> anyhow::Result<String> {
    let url = if args.iter().any(|a| a.contains('=')) {
        let mut pairs = Vec::with_capacity(args.len());
        for arg in args {
            let pair = arg
                .split_once('=')
                .ok_or_else(|| anyhow!("cannot mix positional and key=value arguments: {arg}"))?;
            pairs.push(pair);
        }
        domain.reverse_url_with(name, &pairs)?
    } else {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        domain.reverse_url(name, &args)?
    };
    Ok(url)
}

fn check(router: &Router, config: &Path, out: &mut impl Write) -> anyhow::Result<()> {
    let domains = router.domains();
    let routes: usize = domains.iter().map(|d| d.table().len()).sum();
    writeln!(
        out,
        "{}: {} domains, {} routes",
        config.display(),
        domains.len(),
        routes
    )?;
    for domain in domains {
        writeln!(
            out,
            "  {} ({}): {} routes",
            domain.key(),
            domain.name,
            domain.table().len()
        )?;
    }
    Ok(())
}

fn print_routes(domain: &Domain, out: &mut impl Write) -> anyhow::Result<()> {
    writeln!(out, "{} ({})", domain.key(), domain.name)?;
    let mut routes: Vec<_> = domain.table().routes().collect();
    routes.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.method.cmp(&b.method)));
    for route in routes {
        writeln!(
            out,
            "  {:<7} {:<32} {}.{}  [{}]",
            route.method, route.path, route.controller, route.action, route.name
        )?;
    }
    Ok(())
}

fn print_resolution(
    domain: &Domain,
    method: &Method,
    path: &str,
    resolution: &Resolution,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match resolution {
        Resolution::Found {
            method: found_method,
            route,
            params,
        } => {
            writeln!(
                out,
                "{method} {path} -> {}.{} [{}]",
                route.controller, route.action, route.name
            )?;
            if found_method != method {
                writeln!(out, "  matched as {found_method}")?;
            }
            for param in params {
                writeln!(out, "  {} = {}", param.key, param.value)?;
            }
        }
        Resolution::RedirectTrailingSlash(to) => {
            writeln!(out, "{method} {path} -> redirect (trailing slash) {to}")?;
        }
        Resolution::RedirectFixedPath(to) => {
            writeln!(out, "{method} {path} -> redirect (fixed path) {to}")?;
        }
        Resolution::MethodNotAllowed { allow } => {
            writeln!(out, "{method} {path} -> 405 Method Not Allowed")?;
            writeln!(out, "  Allow: {allow}")?;
        }
        Resolution::AutoOptions { allow } => {
            writeln!(out, "{method} {path} -> 200 OK")?;
            writeln!(out, "  Allow: {allow}")?;
        }
        Resolution::NotFound => {
            writeln!(out, "{method} {path} -> 404 Not Found")?;
            if let Some(target) = &domain.not_found {
                writeln!(out, "  handler: {}.{}", target.controller, target.action)?;
            }
        }
    }
    Ok(())
}

fn watch(config: &Path) -> anyhow::Result<()> {
    let handle = Arc::new(RouterHandle::load(config)?);
    let _watcher = watch_config(Arc::clone(&handle), |router| {
        info!(domains_count = router.len(), "Route configuration reloaded");
    })
    .with_context(|| format!("watching {}", config.display()))?;

    info!(path = %config.display(), "Watching route configuration, Ctrl-C to stop");
    loop {
        std::thread::park();
    }
}
