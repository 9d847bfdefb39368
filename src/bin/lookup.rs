//! Command-line CNPJ lookup.
//!
//! Usage: `lookup <cnpj> [--single]`
//!
//! Resolves the CNPJ through the multi-source resolver (or the single-source one
//! with `--single`) using the same environment configuration as the server, and
//! prints the canonical record as JSON.

use cnpj_lookup_api::cnpj::{mask_document, Cnpj};
use cnpj_lookup_api::config::Config;
use cnpj_lookup_api::resolver::{MultiSourceResolver, SingleSourceResolver};
use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cnpj_lookup_api=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let single = args.iter().any(|a| a == "--single");
    let raw = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .ok_or_else(|| anyhow::anyhow!("usage: lookup <cnpj> [--single]"))?;

    let cnpj = Cnpj::parse(raw)?;
    let config = Config::from_env()?;

    let record = if single {
        SingleSourceResolver::from_config(&config)?
            .resolve_cnpj(&cnpj)
            .await?
    } else {
        MultiSourceResolver::from_config(&config)?
            .resolve_cnpj(&cnpj)
            .await?
    };

    println!("CNPJ {}", cnpj.formatted());
    if let Some(name) = &record.razao_social {
        println!("{}", name);
    }
    if let Some(info) = &record.api_info {
        println!("Fonte: {} ({})", info.fonte, info.timestamp);
    }
    for partner in record.quadro_societario.iter().flatten() {
        println!(
            "  Sócio: {} [{}]",
            partner.nome.as_deref().unwrap_or("-"),
            partner.documento.as_deref().map(mask_document).unwrap_or_default()
        );
    }
    println!();
    println!("{}", serde_json::to_string_pretty(&record)?);

    Ok(())
}
