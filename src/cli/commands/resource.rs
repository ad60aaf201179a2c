use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{confirm, output_error, output_success, parse_filters, read_values};
use crate::cli::OutputFormat;
use crate::engine::ResourceEngine;
use crate::pages::{FormPage, ListPage};
use crate::resource::catalog;

#[derive(Subcommand)]
pub enum ResourceCommands {
    #[command(about = "List records with pagination, search and ordering")]
    List {
        #[arg(help = "Resource name, e.g. leads")]
        name: String,
        #[arg(long, help = "Page number (1-indexed)")]
        page: Option<u32>,
        #[arg(long, help = "Records per page")]
        page_size: Option<u32>,
        #[arg(long, help = "Search term across the resource's search fields")]
        search: Option<String>,
        #[arg(long, help = "Ordering key, prefix with '-' for descending")]
        ordering: Option<String>,
        #[arg(long = "filter", help = "Extra filter as field=value, repeatable")]
        filters: Vec<String>,
    },

    #[command(about = "Show one record")]
    Show {
        #[arg(help = "Resource name")]
        name: String,
        #[arg(help = "Record id")]
        id: String,
    },

    #[command(about = "Create a record from a JSON object (arg or stdin)")]
    Create {
        #[arg(help = "Resource name")]
        name: String,
        #[arg(long, help = "JSON object with the field values")]
        data: Option<String>,
    },

    #[command(about = "Update a record from a JSON object (arg or stdin)")]
    Update {
        #[arg(help = "Resource name")]
        name: String,
        #[arg(help = "Record id")]
        id: String,
        #[arg(long, help = "JSON object with the changed field values")]
        data: Option<String>,
    },

    #[command(about = "Delete one or more records")]
    Delete {
        #[arg(help = "Resource name")]
        name: String,
        #[arg(help = "Record ids", required = true)]
        ids: Vec<String>,
        #[arg(long, help = "Skip the confirmation prompt")]
        yes: bool,
    },

    #[command(about = "Show a resource's fields, columns and permissions")]
    Describe {
        #[arg(help = "Resource name")]
        name: String,
    },
}

pub async fn handle(cmd: ResourceCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ResourceCommands::List { name, page, page_size, search, ordering, filters } => {
            list(name, page, page_size, search, ordering, filters, output_format).await
        }
        ResourceCommands::Show { name, id } => show(name, id, output_format).await,
        ResourceCommands::Create { name, data } => create(name, data, output_format).await,
        ResourceCommands::Update { name, id, data } => update(name, id, data, output_format).await,
        ResourceCommands::Delete { name, ids, yes } => delete(name, ids, yes, output_format).await,
        ResourceCommands::Describe { name } => describe(name, output_format),
    }
}

fn engine_for(name: &str) -> anyhow::Result<ResourceEngine> {
    let config = catalog::find(name)
        .ok_or_else(|| anyhow::anyhow!("unknown resource '{}'; see `tenantctl resource describe`", name))?;
    let store = crate::cli::session_store()?;
    let client = crate::cli::api_client(store.clone())?;
    Ok(ResourceEngine::new(client, store, config))
}

#[allow(clippy::too_many_arguments)]
async fn list(
    name: String,
    page: Option<u32>,
    page_size: Option<u32>,
    search: Option<String>,
    ordering: Option<String>,
    filters: Vec<String>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let mut engine = engine_for(&name)?;
    if !engine.can_view() {
        output_error(&output_format, &format!("Permission denied to view {}", engine.config().plural))?;
        anyhow::bail!("permission denied");
    }

    engine.table_mut().set_filters(parse_filters(&filters)?);
    if let Some(term) = search {
        engine.set_search(term);
    }
    if ordering.is_some() {
        engine.set_ordering(ordering).map_err(|e| anyhow::anyhow!(e.message().to_string()))?;
    }
    if let Some(size) = page_size {
        engine.table_mut().set_page_size(size);
    }
    // Page comes last: a size change resets to page 1 by design.
    if let Some(page) = page {
        engine.table_mut().set_page(page);
    }

    let mut list_page = ListPage::new(engine);
    if let Err(err) = list_page.load().await {
        output_error(&output_format, err.message())?;
        anyhow::bail!("list failed");
    }

    match output_format {
        OutputFormat::Json => {
            let table = list_page.engine().table();
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "rows": table.rows(),
                    "count": table.total_items(),
                    "page": table.current_page(),
                }))?
            );
        }
        OutputFormat::Text => print!("{}", list_page.render()),
    }
    Ok(())
}

async fn show(name: String, id: String, output_format: OutputFormat) -> anyhow::Result<()> {
    let engine = engine_for(&name)?;
    if !engine.can_view() {
        output_error(&output_format, &format!("Permission denied to view {}", engine.config().plural))?;
        anyhow::bail!("permission denied");
    }

    match engine.get(&id).await {
        Ok(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Err(err) => {
            output_error(&output_format, err.message())?;
            anyhow::bail!("show failed");
        }
    }
}

async fn create(name: String, data: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let engine = engine_for(&name)?;
    if !engine.can_create() {
        output_error(&output_format, &format!("Permission denied to create {}", engine.config().name))?;
        anyhow::bail!("permission denied");
    }

    let mut form = FormPage::create(engine);
    form.set_values(read_values(data)?);

    match form.submit().await {
        Ok(record) => output_success(
            &output_format,
            &format!("Created {}", form.engine().config().name),
            Some(json!({ "record": record })),
        ),
        Err(err) => {
            report_form_errors(&form, err.message(), &output_format)?;
            anyhow::bail!("create failed");
        }
    }
}

async fn update(name: String, id: String, data: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let engine = engine_for(&name)?;
    if !engine.can_update() {
        output_error(&output_format, &format!("Permission denied to update {}", engine.config().name))?;
        anyhow::bail!("permission denied");
    }

    let mut form = FormPage::edit(engine, id);
    if let Err(err) = form.load_existing().await {
        output_error(&output_format, err.message())?;
        anyhow::bail!("update failed");
    }
    form.set_values(read_values(data)?);

    match form.submit().await {
        Ok(record) => output_success(
            &output_format,
            &format!("Updated {}", form.engine().config().name),
            Some(json!({ "record": record })),
        ),
        Err(err) => {
            report_form_errors(&form, err.message(), &output_format)?;
            anyhow::bail!("update failed");
        }
    }
}

async fn delete(name: String, ids: Vec<String>, yes: bool, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut engine = engine_for(&name)?;
    if !engine.can_delete() {
        output_error(&output_format, &format!("Permission denied to delete {}", engine.config().plural))?;
        anyhow::bail!("permission denied");
    }

    let noun = if ids.len() == 1 {
        format!("{} {}", engine.config().name, ids[0])
    } else {
        format!("{} {}", ids.len(), engine.config().plural)
    };
    if !yes && !confirm(&format!("Delete {}?", noun)) {
        output_success(&output_format, "Aborted", None)?;
        return Ok(());
    }

    if ids.len() == 1 {
        match engine.remove(&ids[0]).await {
            Ok(()) => output_success(&output_format, &format!("Deleted {}", noun), None),
            Err(err) => {
                output_error(&output_format, err.message())?;
                anyhow::bail!("delete failed");
            }
        }
    } else {
        let outcome = engine.remove_many(&ids).await;
        if outcome.all_succeeded() {
            output_success(
                &output_format,
                &format!("Deleted {} {}", outcome.deleted.len(), engine.config().plural),
                None,
            )
        } else {
            for (id, message) in &outcome.failed {
                output_error(&output_format, &format!("{}: {}", id, message))?;
            }
            output_error(
                &output_format,
                &format!(
                    "Deleted {}, failed {}",
                    outcome.deleted.len(),
                    outcome.failed.len()
                ),
            )?;
            anyhow::bail!("bulk delete partially failed");
        }
    }
}

fn describe(name: String, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = catalog::find(&name)
        .ok_or_else(|| anyhow::anyhow!("unknown resource '{}'", name))?;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
        OutputFormat::Text => {
            println!("{} ({})  endpoint: {}", config.name, config.plural, config.endpoint);
            println!("Fields:");
            for field in &config.fields {
                let required = if field.required { " required" } else { "" };
                println!("  {} ({:?}{})", field.name, field.kind, required);
            }
            println!("Search: {}", config.search_fields.join(", "));
            println!("Ordering: {}", config.ordering_fields.join(", "));
        }
    }
    Ok(())
}

fn report_form_errors(form: &FormPage, message: &str, output_format: &OutputFormat) -> anyhow::Result<()> {
    if form.field_errors().is_empty() {
        return output_error(output_format, message);
    }
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "success": false,
                    "error": message,
                    "field_errors": form.field_errors(),
                }))?
            );
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
            for (field, error) in form.field_errors() {
                eprintln!("  {}: {}", field, error);
            }
        }
    }
    Ok(())
}
