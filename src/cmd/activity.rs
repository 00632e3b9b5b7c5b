//! Activity commands: `kong activity diff` and `kong activity list`.

use anyhow::Result;
use std::sync::Arc;

use kong::activity::{ActivityDispatcher, entity_updated};
use kong::config::KongConfig;

use super::super::ActivityCommands;
use super::{open_local_store, parse_entity, print_json, read_json_object};

pub async fn cmd_activity(config: &KongConfig, command: ActivityCommands) -> Result<()> {
    match command {
        ActivityCommands::Diff {
            entity,
            id,
            old,
            new,
            project,
            actor,
            record,
        } => {
            let entity = parse_entity(&entity)?;
            let old_row = read_json_object(Some(&old))?;
            let new_row = read_json_object(Some(&new))?;
            let events = entity_updated(entity, id, project, actor.as_deref(), &old_row, &new_row);

            print_json(&events)?;

            if record {
                if !config.toml.activity.enabled {
                    tracing::warn!("Activity logging is disabled in kong.toml; events not recorded");
                    return Ok(());
                }
                let store = open_local_store(config)?;
                let dispatcher = ActivityDispatcher::spawn(Arc::new(store));
                dispatcher.send(events);
                dispatcher.shutdown().await;
            }
        }
        ActivityCommands::List { entity, id, limit } => {
            let entity = entity.as_deref().map(parse_entity).transpose()?;
            let store = open_local_store(config)?;
            let events = store
                .call(move |db| db.list_activity_events(entity.map(|e| e.as_str()), id, limit))
                .await?;

            if events.is_empty() {
                println!("No activity recorded.");
                return Ok(());
            }
            for event in events {
                println!(
                    "{}  {:<22} {}#{}  {}",
                    event.created_at.format("%Y-%m-%d %H:%M:%S"),
                    event.event_type,
                    event.entity_type,
                    event.entity_id,
                    event.description
                );
            }
        }
    }

    Ok(())
}
