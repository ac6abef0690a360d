use anyhow::Result;
use serde::Serialize;

use benchload_core::catalog::AppSummary;

use crate::commands::IngestContext;

#[derive(Debug, Serialize)]
pub struct SuiteInfo {
    pub name: String,
    pub path: String,
    pub flags: Vec<String>,
    pub apps: usize,
}

/// List the suites of the active catalog.
pub fn list_suites_command(ctx: &IngestContext, json: bool) -> Result<()> {
    let suites: Vec<SuiteInfo> = ctx
        .catalog
        .suites()
        .iter()
        .map(|s| SuiteInfo {
            name: s.name.clone(),
            path: s.path.clone(),
            flags: s.flags.clone(),
            apps: s.apps.len(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&suites)?);
        return Ok(());
    }

    println!("Suites ({}):", suites.len());
    for suite in suites {
        let flags = if suite.flags.is_empty() { "-".to_string() } else { suite.flags.join(" ") };
        println!("  - {} [{} apps] path={} flags={}", suite.name, suite.apps, suite.path, flags);
    }
    Ok(())
}

/// List the apps of one suite, in catalog order.
pub fn list_apps_command(ctx: &IngestContext, suite: &str, json: bool) -> Result<()> {
    let suite = ctx.catalog.suite(suite)?;
    let apps: Vec<&AppSummary> =
        suite.app_list().iter().filter_map(|key| suite.app(key)).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&apps)?);
        return Ok(());
    }

    println!("Apps in {} ({}):", suite.name, apps.len());
    if apps.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for app in apps {
        let mut extras = Vec::new();
        if let Some(alt) = &app.alt_top_function {
            extras.push(format!("alt={alt}"));
        }
        if app.amalgamate {
            extras.push("amalgamate".to_string());
        }
        let extras =
            if extras.is_empty() { String::new() } else { format!(" ({})", extras.join(", ")) };
        println!(
            "  - {} [{}] dir={} top={}{}",
            app.key, app.standard, app.canonical_name, app.top_function, extras
        );
    }
    Ok(())
}
