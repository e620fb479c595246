// Copyright (c) 2026 Authsel
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]

//! Operator tool: mint a token for a user, or migrate a registry off the
//! legacy wire format. Exercises `Service::get_or_create` and
//! `Registry::migrate_legacy` standalone, outside the HTTP collaborator.

use anyhow::{bail, Context, Result};

use authsel::auth::backend;
use authsel::auth::cancel::CancellationToken;
use authsel::config::RegistryConfig;

fn usage() -> ! {
    eprintln!("usage: authselctl <config.toml> mint <user-id>");
    eprintln!("       authselctl <config.toml> migrate");
    std::process::exit(2);
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| usage());
    let command = args.next().unwrap_or_else(|| usage());

    let raw = std::fs::read_to_string(&config_path)
        .with_context(|| format!("reading config file {config_path}"))?;
    let config = RegistryConfig::from_toml(&raw).context("parsing registry config")?;

    let kv = backend::open(&config.backend.url, config.backend.overwrite)
        .map_err(|e| anyhow::anyhow!("opening backend: {e}"))?;

    match command.as_str() {
        "mint" => {
            let user_id = args.next().unwrap_or_else(|| usage());
            let registry = authsel::auth::registry::Registry::new(kv);
            let token = authsel::auth::service::get_or_create(&registry, &user_id)
                .map_err(|e| anyhow::anyhow!("minting token: {e}"))?;
            println!("{}", token.serialize());
        }
        "migrate" => {
            let registry = authsel::auth::registry::Registry::new(kv);
            let cancel = CancellationToken::new();
            let migrated = registry
                .migrate_legacy(&cancel, |n| tracing::info!(migrated = n, "progress"))
                .map_err(|e| anyhow::anyhow!("migrating registry: {e}"))?;
            println!("migrated {migrated} legacy records");
        }
        other => bail!("unknown command {other:?}"),
    }

    Ok(())
}
