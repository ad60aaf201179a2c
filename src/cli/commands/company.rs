use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::engine::ResourceEngine;
use crate::pages::ListPage;
use crate::resource::catalog;
use crate::session::{normalize_slug, Company};

#[derive(Subcommand)]
pub enum CompanyCommands {
    #[command(about = "List active companies")]
    List,

    #[command(about = "Activate a company by slug")]
    Use {
        #[arg(help = "Company slug")]
        slug: String,
    },

    #[command(about = "Show the active company")]
    Current,
}

pub async fn handle(cmd: CompanyCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        CompanyCommands::List => list(output_format).await,
        CompanyCommands::Use { slug } => activate(slug, output_format).await,
        CompanyCommands::Current => current(output_format).await,
    }
}

async fn list(output_format: OutputFormat) -> anyhow::Result<()> {
    let store = crate::cli::session_store()?;
    let client = crate::cli::api_client(store.clone())?;

    let config = catalog::find("companies").expect("built-in companies resource");
    let engine = ResourceEngine::new(client, store, config);
    let mut page = ListPage::new(engine);

    if let Err(err) = page.load().await {
        output_error(&output_format, err.message())?;
        anyhow::bail!("company list failed");
    }

    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "companies": page.engine().table().rows(),
                    "count": page.engine().table().total_items(),
                }))?
            );
        }
        OutputFormat::Text => print!("{}", page.render()),
    }
    Ok(())
}

async fn activate(slug: String, output_format: OutputFormat) -> anyhow::Result<()> {
    let Some(slug) = normalize_slug(&slug) else {
        output_error(&output_format, "Invalid company slug")?;
        anyhow::bail!("invalid slug");
    };

    let store = crate::cli::session_store()?;
    let client = crate::cli::api_client(store.clone())?;

    let mut session = store.load()?;
    if !session.may_activate(&slug) {
        output_error(&output_format, "You may only activate your own company")?;
        anyhow::bail!("company not allowed");
    }

    // The backend lists active companies; an unknown or inactive slug is
    // rejected here instead of failing on the next request.
    let companies = client.get_list("companies/", &[]).await?;
    let known = companies.items.iter().any(|c| {
        serde_json::from_value::<Company>(c.clone())
            .map(|c| c.slug == slug && c.is_active)
            .unwrap_or(false)
    });
    if !known {
        output_error(&output_format, &format!("Company '{}' not found or inactive", slug))?;
        anyhow::bail!("company not found");
    }

    session.company = Some(slug.clone());
    store.save(&session)?;

    output_success(
        &output_format,
        &format!("Switched to company '{}'", slug),
        Some(json!({ "current_company": slug })),
    )
}

async fn current(output_format: OutputFormat) -> anyhow::Result<()> {
    let store = crate::cli::session_store()?;
    let session = store.load()?;

    match session.active_company() {
        Some(slug) => output_success(
            &output_format,
            &format!("Current company: {}", slug),
            Some(json!({ "current_company": slug })),
        ),
        None => output_success(
            &output_format,
            "No company selected",
            Some(json!({ "current_company": null })),
        ),
    }
}
