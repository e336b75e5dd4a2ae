//! Connection listing and close handlers.

use bytesize::ByteSize;
use chrono::Utc;
use tabled::Tabled;

use mihoctl_core::{Connection, Controller, format_age};

use crate::cli::{CloseArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ConnectionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Network")]
    network: String,
    #[tabled(rename = "Chain")]
    chain: String,
    #[tabled(rename = "Rule")]
    rule: String,
    #[tabled(rename = "Up")]
    upload: String,
    #[tabled(rename = "Down")]
    download: String,
    #[tabled(rename = "Age")]
    age: String,
}

fn row(c: &Connection, now: chrono::DateTime<Utc>) -> ConnectionRow {
    let rule = if c.rule_payload.is_empty() {
        c.rule.clone()
    } else {
        format!("{}({})", c.rule, c.rule_payload)
    };
    ConnectionRow {
        id: c.id.chars().take(8).collect(),
        host: format!("{}:{}", c.target(), c.destination_port),
        network: c.transport(),
        chain: c.egress().to_owned(),
        rule,
        upload: ByteSize::b(c.upload).to_string(),
        download: ByteSize::b(c.download).to_string(),
        age: format_age(c.age(now)),
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn list(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = controller.connections().await?;
    let now = Utc::now();

    let out = output::render_list(
        &global.output,
        &snapshot.connections,
        |c| row(c, now),
        |c| c.id.clone(),
    );
    output::print_output(&out, global.quiet);

    if !global.quiet {
        eprintln!(
            "{} active · ↑ {} · ↓ {}",
            snapshot.connections.len(),
            ByteSize::b(snapshot.upload_total),
            ByteSize::b(snapshot.download_total),
        );
    }
    Ok(())
}

pub async fn close(
    controller: &Controller,
    args: CloseArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if args.all {
        controller.close_all_connections().await?;
        if !global.quiet {
            eprintln!("✓ Closed all connections");
        }
        return Ok(());
    }

    let Some(id) = args.id else {
        return Err(CliError::Validation {
            field: "id".into(),
            reason: "give a connection ID or --all".into(),
        });
    };

    controller.close_connection(&id).await.map_err(|e| match CliError::from(e) {
        CliError::NotFound { .. } => CliError::NotFound {
            message: format!("connection '{id}'"),
            list_command: "connections".into(),
        },
        other => other,
    })?;
    if !global.quiet {
        eprintln!("✓ Closed {id}");
    }
    Ok(())
}
