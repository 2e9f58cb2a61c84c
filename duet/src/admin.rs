use std::io::{BufRead as _, Write as _};

use duet_core::{
    AdminTable, Session,
    db::{self, Row},
    duet_state::{Collection, RecordId},
    editor::{FieldDescriptor, FieldKind},
};

use crate::args::AdminCommand;

pub async fn run(session: &Session, command: AdminCommand) -> anyhow::Result<()> {
    match command {
        AdminCommand::Fields { collection } => {
            let mut table = open(session, collection).await?;
            table.open_add();
            if let Some(form) = table.editor().form() {
                for field in form.fields() {
                    println!("{}", describe_field(&table, field));
                }
            }
            table.cancel();
        }
        AdminCommand::Rows { collection } => {
            let table = open(session, collection).await?;
            let label = collection.label_field();
            for row in table.rows() {
                println!("{}  {}", text(row, "id"), text(row, label));
            }
        }
        AdminCommand::Add { collection, set } => {
            let mut table = open(session, collection).await?;
            table.open_add();
            fill_and_submit(&mut table, &set).await?;
            println!("Created {collection} record");
        }
        AdminCommand::Edit {
            collection,
            id,
            set,
        } => {
            let mut table = open(session, collection).await?;
            table.open_edit(&RecordId(id.clone()))?;
            fill_and_submit(&mut table, &set).await?;
            println!("Updated {collection} `{id}`");
        }
        AdminCommand::Delete {
            collection,
            id,
            yes,
        } => {
            let mut table = open(session, collection).await?;
            let id = RecordId(id);
            let confirmation = table.request_delete(&id)?;
            let label = table
                .row(&id)
                .map(|row| text(row, collection.label_field()))
                .unwrap_or_default();
            if !yes && !confirm(&format!("Delete {collection} `{id}` ({label})?"))? {
                println!("Cancelled");
                return Ok(());
            }
            table.delete(confirmation).await?;
            println!("Deleted {collection} `{id}`");
        }
    }
    Ok(())
}

async fn open(session: &Session, collection: Collection) -> anyhow::Result<AdminTable<db::Client>> {
    let mut table = AdminTable::new(session.backend(), collection);
    table.load().await?;
    Ok(table)
}

async fn fill_and_submit(
    table: &mut AdminTable<db::Client>,
    set: &[(String, String)],
) -> anyhow::Result<()> {
    for (key, value) in set {
        table.set_field(key, value)?;
    }
    if let Err(e) = table.submit().await {
        table.cancel();
        return Err(e.into());
    }
    Ok(())
}

fn describe_field(table: &AdminTable<db::Client>, field: &FieldDescriptor) -> String {
    let kind = match field.kind {
        FieldKind::Boolean => "yes/no".to_string(),
        FieldKind::Date => "date".to_string(),
        FieldKind::Url => "url".to_string(),
        FieldKind::Text { multiline: true } => "long text".to_string(),
        FieldKind::Text { multiline: false } => "text".to_string(),
        FieldKind::Relation { collection } => {
            let options = table
                .options(collection)
                .iter()
                .map(|option| format!("{}={}", option.id, option.label))
                .collect::<Vec<_>>();
            format!("{collection}: {}", options.join(", "))
        }
    };
    format!("{:<16} {:<16} {kind}", field.key, field.label)
}

fn text(row: &Row, key: &str) -> String {
    match row.get(key) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
