//! Block-list subscription command handlers.

use std::fmt::Write as _;

use chrono::Utc;
use pidns_core::blocklists::{CatalogCard, SubscriptionCard};
use pidns_core::format::{format_date, format_number};
use pidns_core::models::{BlockList, BlockListStatistics, BlockListUpdate};
use pidns_core::{EnabledFilter, SubscriptionManager};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{BlocklistsArgs, BlocklistsCommand, ListStatus};
use crate::error::CliError;
use crate::output;

use super::{Ctx, util};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ListRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Entries")]
    entries: String,
    #[tabled(rename = "Updated")]
    last_updated: String,
    #[tabled(rename = "Status")]
    update_status: &'static str,
}

fn list_row(c: &SubscriptionCard) -> ListRow {
    ListRow {
        id: c.id.clone(),
        name: c.name.clone(),
        category: c.category.clone(),
        enabled: util::yes_no(c.enabled),
        entries: c.entries.clone(),
        last_updated: c.last_updated.clone(),
        update_status: c.update_status,
    }
}

#[derive(Tabled, Serialize)]
struct CatalogRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Action")]
    action: String,
}

fn catalog_row(c: &CatalogCard) -> CatalogRow {
    CatalogRow {
        name: c.name.clone(),
        category: c.category.clone(),
        url: c.url.clone(),
        action: c.action.to_string(),
    }
}

fn list_detail(l: &BlockList) -> String {
    let mut out = [
        format!("ID:          {}", l.id),
        format!("Name:        {}", l.name),
        format!("Category:    {}", l.category),
        format!("URL:         {}", l.url),
        format!("Enabled:     {}", util::yes_no(l.enabled)),
        format!("Entries:     {}", format_number(l.entry_count)),
        format!(
            "Updated:     {}",
            l.last_updated.map_or_else(|| "Never".to_owned(), format_date)
        ),
    ]
    .join("\n");
    if let Some(description) = l.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = write!(out, "\nDescription: {description}");
    }
    out
}

fn statistics_detail(s: &BlockListStatistics) -> String {
    let mut out = format!(
        "Block lists: {} ({} enabled)\nDomains:     {}\nLast update: {}",
        s.total_blocklists,
        s.enabled_blocklists,
        format_number(s.total_domains),
        s.last_update.map_or_else(|| "Never".to_owned(), format_date),
    );
    for (category, totals) in &s.category_stats {
        let _ = write!(
            out,
            "\n  {category:<12} {} lists, {} domains",
            totals.count,
            format_number(totals.domains)
        );
    }
    out
}

/// `--enable` / `--disable` as the tri-state the update body wants.
fn enabled_flag(enable: bool, disable: bool) -> Option<bool> {
    match (enable, disable) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

impl From<ListStatus> for EnabledFilter {
    fn from(s: ListStatus) -> Self {
        match s {
            ListStatus::Any => Self::Any,
            ListStatus::Enabled => Self::Enabled,
            ListStatus::Disabled => Self::Disabled,
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(ctx: &Ctx<'_>, args: BlocklistsArgs) -> Result<(), CliError> {
    let mut manager = SubscriptionManager::new(ctx.admin_session()?);

    match args.command {
        BlocklistsCommand::List { category, status } => {
            let loaded = manager.load().await;
            ctx.finish(loaded, "list")?;
            manager.set_category_filter(category);
            manager.set_status_filter(status.into());

            let view = manager.render(Utc::now());
            let data = manager.filtered();
            let out = output::render_view(
                ctx.global.output,
                &data,
                &view,
                list_row,
                |l: &&BlockList| l.id.to_string(),
            )?;
            ctx.print(&out);
            Ok(())
        }

        BlocklistsCommand::Add {
            source,
            name,
            category,
            description,
        } => {
            manager.open_add();
            if let Some(form) = manager.add_form_mut() {
                form.name = name;
                form.url = source;
                form.category = category;
                form.description = description.unwrap_or_default();
            }
            let added = manager.add().await;
            ctx.finish(added, "add")
        }

        BlocklistsCommand::Catalog => {
            let shown = manager.show_catalog().await;
            ctx.finish(shown, "catalog")?;
            let Some(catalog) = manager.catalog_modal().content() else {
                return Ok(());
            };
            let data: Vec<CatalogRow> = catalog.cards.rows().iter().map(catalog_row).collect();
            let out = output::render_view(
                ctx.global.output,
                &data,
                &catalog.cards,
                catalog_row,
                |r: &CatalogRow| r.url.clone(),
            )?;
            ctx.print(&out);
            Ok(())
        }

        BlocklistsCommand::AddPredefined { url } => {
            let added = manager.add_predefined(&url).await;
            ctx.finish(added, "add-predefined")
        }

        BlocklistsCommand::Show { id } => {
            let Some(list) = manager.fetch(&id).await else {
                return ctx.finish(false, "show");
            };
            let out = output::render_single(ctx.global.output, &list, list_detail, |l| {
                l.id.to_string()
            })?;
            ctx.print(&out);
            Ok(())
        }

        BlocklistsCommand::Edit {
            id,
            name,
            category,
            description,
            enable,
            disable,
        } => {
            let update = BlockListUpdate {
                name,
                category,
                description,
                enabled: enabled_flag(enable, disable),
            };
            let saved = manager.edit(&id, &update).await;
            ctx.finish(saved, "edit")
        }

        BlocklistsCommand::Toggle { id } => {
            let toggled = manager.toggle(&id).await;
            ctx.finish(toggled, "toggle")
        }

        BlocklistsCommand::Update { id } => {
            let updated = manager.update(&id).await;
            ctx.finish(updated, "update")
        }

        BlocklistsCommand::UpdateAll => {
            let updated = manager.update_all().await;
            ctx.finish(updated, "update-all")
        }

        BlocklistsCommand::Delete { id } => {
            let deleted = manager.delete(&id).await;
            ctx.finish(deleted, "delete")
        }

        BlocklistsCommand::Categories => {
            let Some(categories) = manager.categories().await else {
                return ctx.finish(false, "categories");
            };
            let out = output::render_single(
                ctx.global.output,
                &categories,
                |c| c.join("\n"),
                |c| c.join("\n"),
            )?;
            ctx.print(&out);
            Ok(())
        }

        BlocklistsCommand::Stats => {
            let Some(stats) = manager.statistics().await else {
                return ctx.finish(false, "stats");
            };
            let out = output::render_single(
                ctx.global.output,
                &stats,
                statistics_detail,
                |s| s.total_domains.to_string(),
            )?;
            ctx.print(&out);
            Ok(())
        }
    }
}
