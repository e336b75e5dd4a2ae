//! Daemon status handler.

use bytesize::ByteSize;
use serde::Serialize;

use mihoctl_core::Controller;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct Status {
    address: String,
    version: String,
    connections: usize,
    upload_total: u64,
    download_total: u64,
}

fn detail(s: &Status) -> String {
    [
        format!("Address:      {}", s.address),
        format!("Version:      {}", s.version),
        format!("Connections:  {}", s.connections),
        format!("Uploaded:     {}", ByteSize::b(s.upload_total)),
        format!("Downloaded:   {}", ByteSize::b(s.download_total)),
    ]
    .join("\n")
}

pub async fn show(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let (version, snapshot) = tokio::try_join!(controller.version(), controller.connections())?;

    let status = Status {
        address: controller.client().base_url().to_string(),
        version,
        connections: snapshot.connections.len(),
        upload_total: snapshot.upload_total,
        download_total: snapshot.download_total,
    };
    let out = output::render_single(&global.output, &status, detail, |s| s.version.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}
