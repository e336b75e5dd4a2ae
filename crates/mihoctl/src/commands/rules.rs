//! Rule listing handler.

use tabled::Tabled;

use mihoctl_core::{Controller, Rule};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Payload")]
    payload: String,
    #[tabled(rename = "Proxy")]
    target: String,
    #[tabled(rename = "Size")]
    size: String,
}

impl From<&Rule> for RuleRow {
    fn from(r: &Rule) -> Self {
        Self {
            index: r.index,
            kind: r.kind.clone(),
            payload: r.payload.clone(),
            target: r.target.clone(),
            size: r.size.map(|s| s.to_string()).unwrap_or_default(),
        }
    }
}

pub async fn list(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let rules = controller.rules().await?;
    let out = output::render_list(&global.output, &rules, |r| RuleRow::from(r), |r| {
        format!("{},{},{}", r.kind, r.payload, r.target)
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
