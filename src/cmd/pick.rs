//! Payload filtering commands: `kong pick` and `kong prepare`.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use kong::activity::ActivityDispatcher;
use kong::config::KongConfig;
use kong::runtime::open_source;
use kong::writes::WriteKind;
use kong::{WritePreparer, compose, pick_entity_columns, pick_entity_columns_for_write};

use super::{open_local_store, parse_entity, print_json, read_input, read_json_object};

/// Where `kong prepare` records the write it prepared.
pub struct RecordArgs {
    pub id: i64,
    pub project: Option<i64>,
    pub actor: Option<String>,
    pub old: Option<PathBuf>,
}

pub async fn cmd_pick(
    config: &KongConfig,
    entity: &str,
    deny: &[String],
    input: Option<&Path>,
    static_only: bool,
) -> Result<()> {
    let entity = parse_entity(entity)?;
    let input = read_input(input)?;
    let deny = compose(deny.iter().map(|c| c.trim()).filter(|c| !c.is_empty()));

    let columns = if static_only {
        pick_entity_columns(entity, &input, &deny)
    } else {
        let source = open_source(config)?;
        pick_entity_columns_for_write(source.as_ref(), entity, &input, &deny).await
    };

    print_json(&columns)
}

pub async fn cmd_prepare(
    config: &KongConfig,
    entity: &str,
    kind: &str,
    input: Option<&Path>,
    record: Option<RecordArgs>,
) -> Result<()> {
    let entity = parse_entity(entity)?;
    let kind: WriteKind = kind.parse().map_err(anyhow::Error::msg)?;
    let input = read_input(input)?;
    let old_row = match record.as_ref().and_then(|r| r.old.as_deref()) {
        Some(path) => read_json_object(Some(path))?,
        None => Default::default(),
    };

    let activity = match &record {
        Some(_) if config.toml.activity.enabled => {
            ActivityDispatcher::spawn(Arc::new(open_local_store(config)?))
        }
        Some(_) => {
            tracing::warn!("Activity logging is disabled in kong.toml; write not recorded");
            ActivityDispatcher::disabled()
        }
        None => ActivityDispatcher::disabled(),
    };

    let preparer = WritePreparer::new(open_source(config)?, activity);
    let prepared = preparer.prepare(entity, kind, &input).await;

    if let Some(record) = record {
        let actor = record.actor.as_deref();
        match kind {
            WriteKind::Insert => preparer.record_created(
                entity,
                record.id,
                record.project,
                actor,
                prepared.columns.clone(),
            ),
            WriteKind::Update => preparer.record_updated(
                entity,
                record.id,
                record.project,
                actor,
                &old_row,
                &prepared.columns,
            ),
        }
    }
    preparer.shutdown().await;

    print_json(&prepared)
}
