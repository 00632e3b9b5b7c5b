//! Custom field management: `kong fields`.

use anyhow::Result;

use kong::config::{KongConfig, SchemaBackend};
use kong::errors::KongError;

use super::super::FieldsCommands;
use super::{open_local_store, parse_entity};

pub async fn cmd_fields(config: &KongConfig, command: FieldsCommands) -> Result<()> {
    if config.backend() == SchemaBackend::Rest {
        return Err(KongError::UnsupportedBackend {
            backend: config.backend().to_string(),
            operation: "custom field management",
        }
        .into());
    }
    let store = open_local_store(config)?;

    match command {
        FieldsCommands::Provision => {
            store.call(|db| db.provision_runtime_fields()).await?;
            println!("Runtime field view ready at {}", config.sqlite_path().display());
        }
        FieldsCommands::Add {
            entity,
            column,
            inactive,
        } => {
            let entity = parse_entity(&entity)?;
            let row = store
                .call(move |db| {
                    db.provision_runtime_fields()?;
                    db.register_runtime_field(entity.runtime_entity_type(), &column, !inactive)
                })
                .await?;
            println!(
                "Registered {}.{} ({})",
                row.entity_type,
                row.column().unwrap_or_default(),
                if row.field_active { "active" } else { "inactive" }
            );
        }
        FieldsCommands::List { entity } => {
            let entity = entity.as_deref().map(parse_entity).transpose()?;
            let rows = store
                .call(move |db| {
                    if !db.is_runtime_provisioned()? {
                        return Ok(Vec::new());
                    }
                    db.list_runtime_fields(entity.map(|e| e.runtime_entity_type()))
                })
                .await?;

            if rows.is_empty() {
                println!("No custom fields registered.");
                return Ok(());
            }
            println!("{:<16} {:<28} ACTIVE", "ENTITY", "COLUMN");
            for row in rows {
                println!(
                    "{:<16} {:<28} {}",
                    row.entity_type,
                    row.column_name.unwrap_or_default(),
                    if row.field_active { "yes" } else { "no" }
                );
            }
        }
    }

    Ok(())
}
