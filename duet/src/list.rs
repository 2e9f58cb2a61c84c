use std::path::PathBuf;

use anyhow::Context as _;
use duet_core::{
    CollectionView, db,
    duet_state::{Collection, Listing, Record, export},
};

use crate::args::FilterArgs;

async fn load(
    client: &db::Client,
    collection: Collection,
    filters: &FilterArgs,
) -> anyhow::Result<CollectionView> {
    let mut view = CollectionView::for_collection(collection);
    view.filters = filters.to_state();
    view.refresh(client).await;
    if let Some(error) = view.error() {
        anyhow::bail!("Failed to fetch {collection}: {error}");
    }
    Ok(view)
}

pub async fn print(
    client: &db::Client,
    collection: Collection,
    filters: &FilterArgs,
) -> anyhow::Result<()> {
    let view = load(client, collection, filters).await?;
    let listing = view.visible(filters.today());
    match &listing {
        Listing::Flat(records) => {
            for record in records {
                println!("{}", line(&view, record));
            }
        }
        Listing::Grouped(groups) => {
            for group in groups {
                println!("{}", group.key);
                for record in &group.records {
                    println!("  {}", line(&view, record));
                }
            }
        }
    }
    tracing::info!(
        shown = listing.len(),
        fetched = view.records().len(),
        "listed {collection}"
    );
    Ok(())
}

pub async fn options(client: &db::Client, collection: Collection) -> anyhow::Result<()> {
    let view = load(client, collection, &FilterArgs::default()).await?;
    for field in view.preset().categorical_fields {
        println!("{field}: {}", view.categorical_options(field).join(", "));
    }
    Ok(())
}

pub async fn export(
    client: &db::Client,
    collection: Collection,
    filters: &FilterArgs,
    output: Option<PathBuf>,
) -> anyhow::Result<PathBuf> {
    let view = load(client, collection, filters).await?;
    let today = filters.today();
    let records = view.visible(today).into_records();
    let path = output.unwrap_or_else(|| export::file_name(collection.as_str(), today).into());
    std::fs::write(&path, export::to_csv(&records))
        .with_context(|| format!("Failed to write to {path:?}"))?;
    tracing::info!(count = records.len(), "exported {collection}");
    Ok(path)
}

fn line(view: &CollectionView, record: &Record) -> String {
    let preset = view.preset();
    let mut parts = vec![];
    for field in preset.date_field.into_iter().chain(preset.time_field) {
        if let Some(text) = record.text(field)
            && !text.is_empty()
        {
            parts.push(text.into_owned());
        }
    }
    let label = preset
        .display_fields
        .iter()
        .filter_map(|field| record.text(field))
        .find(|text| !text.is_empty())
        .unwrap_or_default();
    parts.push(label.into_owned());
    if !record.relation_names().is_empty() {
        parts.push(format!("[{}]", record.relation_names().join(", ")));
    }
    parts.join("  ")
}
