use anyhow::Result;
use clap::{Parser, Subcommand};

use tabgroup::server::{router, AppState};
use tabgroup_local::gemini::{self, GeminiClient};

#[derive(Parser, Debug)]
#[command(name = "tabgroup")]
#[command(about = "Group browser tabs by topic with Gemini (HTTP service)", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server.
    Serve(ServeCmd),
    /// Diagnose configuration/launch issues (json; no secrets).
    Doctor(DoctorCmd),
    /// Print version info.
    Version(VersionCmd),
}

#[derive(clap::Args, Debug)]
struct ServeCmd {
    /// Address to bind.
    #[arg(long, env = "TABGROUP_BIND", default_value = "127.0.0.1:8787")]
    bind: String,
    /// Gemini model id.
    #[arg(long, env = "TABGROUP_GEMINI_MODEL", default_value = gemini::DEFAULT_MODEL)]
    model: String,
}

#[derive(clap::Args, Debug)]
struct DoctorCmd {
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

#[derive(clap::Args, Debug)]
struct VersionCmd {
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Optional env-file loader (opt-in).
    //
    // Safety:
    // - opt-in only (TABGROUP_ENV_FILE)
    // - sets vars only if not already set in the process environment
    // - does not log values
    if let Ok(p) = std::env::var("TABGROUP_ENV_FILE") {
        let p = p.trim();
        if !p.is_empty() {
            if let Ok(txt) = std::fs::read_to_string(p) {
                for raw in txt.lines() {
                    let s = raw.trim();
                    if s.is_empty() || s.starts_with('#') {
                        continue;
                    }
                    let Some((k, v)) = s.split_once('=') else {
                        continue;
                    };
                    let k = k.trim();
                    let v = v.trim();
                    if k.is_empty() {
                        continue;
                    }
                    // Don't override explicit process env.
                    if std::env::var_os(k).is_none() {
                        std::env::set_var(k, v);
                    }
                }
            }
        }
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
                )
                .init();

            let backend = GeminiClient::from_env(reqwest::Client::new())
                .map_err(|e| anyhow::anyhow!(e.to_string()))?;
            let state = AppState {
                backend: std::sync::Arc::new(backend),
                model: args.model,
                retry: tabgroup_core::RetryPolicy::default(),
                started: std::time::Instant::now(),
            };
            let app = router(state);
            let listener = tokio::net::TcpListener::bind(&args.bind).await?;
            tracing::info!(addr = %listener.local_addr()?, "listening");
            axum::serve(listener, app).await?;
        }
        Commands::Doctor(args) => {
            fn has_env(k: &str) -> bool {
                std::env::var(k).ok().is_some_and(|v| !v.trim().is_empty())
            }

            // Env presence (booleans only; never print values).
            let key_configured = has_env("TABGROUP_GEMINI_API_KEY")
                || has_env("GEMINI_API_KEY")
                || has_env("GOOGLE_API_KEY");
            let base_url_overridden = has_env("TABGROUP_GEMINI_BASE_URL");
            let model = gemini::gemini_model_from_env();
            let bind = std::env::var("TABGROUP_BIND")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "127.0.0.1:8787".to_string());

            let report = serde_json::json!({
                "schema_version": 1,
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
                "configured": {
                    "gemini_api_key": key_configured,
                    "base_url_override": base_url_overridden,
                },
                "model": model,
                "bind": bind,
                "checks": [{
                    "name": "gemini_api_key",
                    "ok": key_configured,
                    "hint": if key_configured {
                        ""
                    } else {
                        "Set TABGROUP_GEMINI_API_KEY (or GEMINI_API_KEY / GOOGLE_API_KEY)."
                    },
                }],
            });
            match args.output.to_ascii_lowercase().as_str() {
                "json" => println!("{}", serde_json::to_string(&report)?),
                _ => {
                    println!(
                        "gemini_api_key: {}",
                        if key_configured { "ok" } else { "missing" }
                    );
                    println!("model: {model}");
                    println!("bind: {bind}");
                    if !key_configured {
                        println!(
                            "hint: set TABGROUP_GEMINI_API_KEY (or GEMINI_API_KEY / GOOGLE_API_KEY)"
                        );
                    }
                }
            }
        }
        Commands::Version(args) => {
            let v = serde_json::json!({
                "schema_version": 1,
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            });
            match args.output.to_ascii_lowercase().as_str() {
                "json" => println!("{}", serde_json::to_string(&v)?),
                _ => println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            }
        }
    }
    Ok(())
}
