//! Blacklist / whitelist command handlers.

use std::collections::BTreeMap;

use std::fmt::Write as _;

use chrono::Utc;
use pidns_core::entries::EntryRow;
use pidns_core::format::format_date;
use pidns_core::models::{DomainEntry, ListStatistics};
use pidns_core::{EntryListManager, ListKind, StatusFilter};
use tabled::Tabled;

use crate::cli::{EntriesArgs, EntriesCommand, EntryStatus, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::{Ctx, util};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct EntryTableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Expires")]
    expires: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Notes")]
    notes: String,
}

fn entry_row(r: &EntryRow) -> EntryTableRow {
    EntryTableRow {
        id: r.id.clone(),
        domain: r.domain.clone(),
        category: r.category.clone(),
        created: r.created.clone(),
        expires: r.expires.clone(),
        status: r.status,
        notes: r.notes.clone(),
    }
}

#[derive(Tabled)]
struct CheckRow {
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Listed")]
    listed: String,
}

fn entry_detail(e: &DomainEntry) -> String {
    let stamp = |t: Option<_>| t.map_or_else(|| "-".to_owned(), format_date);
    [
        format!("ID:       {}", e.id),
        format!("Domain:   {}", e.domain),
        format!("Category: {}", e.category),
        format!("Created:  {}", stamp(e.created_at)),
        format!("Updated:  {}", stamp(e.updated_at)),
        format!(
            "Expires:  {}",
            e.expires_at.map_or_else(|| "Never".to_owned(), format_date)
        ),
        format!("Notes:    {}", e.notes.as_deref().unwrap_or("-")),
    ]
    .join("\n")
}

fn statistics_detail(s: &ListStatistics) -> String {
    let mut out = format!(
        "Total:    {}\nActive:   {}\nExpired:  {}",
        s.total, s.active, s.expired
    );
    if !s.categories.is_empty() {
        out.push_str("\nActive by category:");
        for (category, count) in &s.categories {
            let _ = write!(out, "\n  {category:<12} {count}");
        }
    }
    out
}

impl From<EntryStatus> for StatusFilter {
    fn from(s: EntryStatus) -> Self {
        match s {
            EntryStatus::Any => Self::Any,
            EntryStatus::Active => Self::Active,
            EntryStatus::Expired => Self::Expired,
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(ctx: &Ctx<'_>, kind: ListKind, args: EntriesArgs) -> Result<(), CliError> {
    let mut manager = EntryListManager::new(kind, ctx.admin_session()?);

    match args.command {
        EntriesCommand::List {
            category,
            status,
            search,
        } => {
            let loaded = manager.load().await;
            ctx.finish(loaded, "list")?;
            manager.set_category_filter(category);
            manager.set_status_filter(status.into());
            if let Some(ref search) = search {
                manager.set_search(search);
            }

            let now = Utc::now();
            let view = manager.render(now);
            let data = manager.filtered(now);
            let out = output::render_view(
                ctx.global.output,
                &data,
                &view,
                entry_row,
                |e: &&DomainEntry| e.domain.clone(),
            )?;
            ctx.print(&out);
            Ok(())
        }

        EntriesCommand::Add {
            domain,
            category,
            expires,
            notes,
        } => {
            manager.open_create();
            if let Some(form) = manager.entry_form_mut() {
                form.domain = domain;
                form.category = category;
                form.expires_at = expires.unwrap_or_default();
                form.notes = notes.unwrap_or_default();
            }
            let saved = manager.save().await;
            ctx.finish(saved, "add")
        }

        EntriesCommand::Edit {
            id,
            domain,
            category,
            expires,
            notes,
            clear_expiry,
        } => {
            let loaded = manager.load().await;
            ctx.finish(loaded, "edit")?;
            if !manager.entries().iter().any(|e| e.id.loosely_matches(&id)) {
                return Err(CliError::NotFound {
                    resource_type: format!("{kind} entry"),
                    identifier: id,
                    list_command: format!("{kind} list"),
                });
            }
            manager.open_edit(&id);
            if let Some(form) = manager.entry_form_mut() {
                if let Some(domain) = domain {
                    form.domain = domain;
                }
                if let Some(category) = category {
                    form.category = category;
                }
                if let Some(notes) = notes {
                    form.notes = notes;
                }
                if clear_expiry {
                    form.expires_at.clear();
                } else if let Some(expires) = expires {
                    form.expires_at = expires;
                }
            }
            let saved = manager.save().await;
            ctx.finish(saved, "edit")
        }

        EntriesCommand::Show { id } => {
            let Some(entry) = manager.fetch_entry(&id).await else {
                return ctx.finish(false, "show");
            };
            let out = output::render_single(
                ctx.global.output,
                &entry,
                entry_detail,
                |e| e.domain.clone(),
            )?;
            ctx.print(&out);
            Ok(())
        }

        EntriesCommand::Delete { id } => {
            let deleted = manager.delete(&id).await;
            ctx.finish(deleted, "delete")
        }

        EntriesCommand::Import {
            file,
            data,
            category,
            preview,
        } => {
            if let Some(ref path) = file {
                let read = manager.load_import_file(path);
                ctx.finish(read, "import")?;
            } else {
                manager.open_import();
            }
            if let Some(draft) = manager.import_draft_mut() {
                if let Some(data) = data {
                    draft.data = data;
                }
                draft.category = category;
            }

            if preview {
                ctx.print(&manager.current_import_preview().join("\n"));
                return Ok(());
            }

            let Some(result) = manager.import().await else {
                return ctx.finish(false, "import");
            };
            let out = output::render_single(
                ctx.global.output,
                &result,
                |r| format!("Added:   {}\nSkipped: {}", r.added, r.skipped),
                |r| r.added.to_string(),
            )?;
            ctx.print(&out);
            Ok(())
        }

        EntriesCommand::Export { dir, copy } => {
            let Some(path) = manager.export(&dir).await else {
                return ctx.finish(false, "export");
            };
            ctx.print(&path.display().to_string());
            if copy {
                let text = std::fs::read_to_string(&path)?;
                util::copy(ctx, &text)?;
            }
            Ok(())
        }

        EntriesCommand::Cleanup => {
            let cleaned = manager.cleanup_expired().await;
            ctx.finish(cleaned, "cleanup")
        }

        EntriesCommand::Check { domains } => {
            let Some(found) = manager.check_domains(&domains).await else {
                return ctx.finish(false, "check");
            };
            render_check(ctx, &found)
        }

        EntriesCommand::Categories => {
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

        EntriesCommand::Stats => {
            let Some(stats) = manager.statistics().await else {
                return ctx.finish(false, "stats");
            };
            let out = output::render_single(
                ctx.global.output,
                &stats,
                statistics_detail,
                |s| s.active.to_string(),
            )?;
            ctx.print(&out);
            Ok(())
        }
    }
}

fn render_check(ctx: &Ctx<'_>, found: &BTreeMap<String, bool>) -> Result<(), CliError> {
    let rows: Vec<CheckRow> = found
        .iter()
        .map(|(domain, listed)| CheckRow {
            domain: domain.clone(),
            listed: util::yes_no(*listed),
        })
        .collect();
    let out = match ctx.global.output {
        OutputFormat::Table => output::render_table(&rows),
        OutputFormat::Plain => found
            .iter()
            .filter(|(_, listed)| **listed)
            .map(|(domain, _)| domain.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
        format => output::render_single(format, found, |_| String::new(), |_| String::new())?,
    };
    ctx.print(&out);
    Ok(())
}
