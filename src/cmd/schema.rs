//! Static schema listing: `kong schema`.

use anyhow::Result;

use kong::{EntityKey, schema};

use super::{parse_entity, print_json};

pub fn cmd_schema(entity: Option<&str>, json: bool) -> Result<()> {
    let Some(name) = entity else {
        if json {
            let all: Vec<_> = EntityKey::ALL.iter().map(|e| schema(*e)).collect();
            return print_json(&all);
        }
        println!("{:<16} {:<18} {:>7}", "ENTITY", "TABLE", "COLUMNS");
        for entity in EntityKey::ALL {
            let s = schema(entity);
            println!("{:<16} {:<18} {:>7}", entity.as_str(), s.table, s.columns().len());
        }
        return Ok(());
    };

    let s = schema(parse_entity(name)?);
    if json {
        return print_json(s);
    }

    println!("{} ({})", s.entity.label(), s.table);
    println!();
    println!("{:<28} {:<24} {:<14} NAME", "FIELD", "COLUMN", "TYPE");
    for field in s.fields {
        let column = match field.writable_column() {
            Some(column) => column.to_string(),
            None => "(virtual)".to_string(),
        };
        println!(
            "{:<28} {:<24} {:<14} {}",
            field.id, column, field.data_type, field.name
        );
    }
    Ok(())
}
