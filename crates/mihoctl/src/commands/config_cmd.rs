//! Config subcommand handlers.

use serde::Serialize;

use mihoctl_config::{self as config, Config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::resolve;
use crate::error::CliError;
use crate::output;

/// Resolved settings as displayed, with the secret masked.
#[derive(Serialize)]
struct ConfigView {
    path: String,
    api_address: String,
    secret: String,
    test_url: String,
    timeout: u64,
}

impl ConfigView {
    fn new(cfg: &Config) -> Self {
        Self {
            path: config::config_path().display().to_string(),
            api_address: cfg.api_address.clone(),
            secret: config::mask_secret(&cfg.secret),
            test_url: cfg.test_url.clone(),
            timeout: cfg.timeout,
        }
    }
}

fn detail(v: &ConfigView) -> String {
    [
        format!("# {}", v.path),
        format!("api_address = \"{}\"", v.api_address),
        format!("secret      = \"{}\"", v.secret),
        format!("test_url    = \"{}\"", v.test_url),
        format!("timeout     = {}", v.timeout),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => {
            let path = config::config_path();
            let cfg = config::guided_init(&path)?;
            if !global.quiet {
                eprintln!("✓ Wrote {}", path.display());
                eprintln!("   Controller: {}", cfg.api_address);
            }
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = resolve(global)?;
            let view = ConfigView::new(&cfg);
            let out = output::render_single(&global.output, &view, detail, |v| v.path.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let path = config::config_path();
            let mut cfg = config::load_stored(&path)?;
            let setting = cfg.set_by_name(&key, &value)?;
            config::save_config_to(&cfg, &path)?;
            if !global.quiet {
                eprintln!("✓ Set {key} ({})", setting.label());
            }
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), false);
            Ok(())
        }
    }
}
