//! Human and JSON rendering for CLI results.
//!
//! Every command hands its result to one `render_*` function here. JSON mode
//! serializes the core types as-is; human mode prints one line per record.

use kinship_core::{Family, FamilyTree, FamilyWithStats, Member};
use serde::Serialize;
use serde_json::json;
use std::io::{self, Write};
use uuid::Uuid;

/// Shared width for human separators.
const RULE_WIDTH: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_mode(&mut out, mode, value, human_fn)
}

fn write_mode<T: Serialize>(
    out: &mut dyn Write,
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        }
        OutputMode::Human => human_fn(value, out)?,
    }
    Ok(())
}

fn rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = RULE_WIDTH)
}

fn member_line(w: &mut dyn Write, indent: usize, member: &Member) -> io::Result<()> {
    write!(w, "{:indent$}{}  {}", "", member.id, member.display_name())?;
    if let Some(dob) = member.date_of_birth.as_deref() {
        write!(w, "  (b. {dob})")?;
    }
    writeln!(w)
}

fn stats_line(w: &mut dyn Write, entry: &FamilyWithStats) -> io::Result<()> {
    writeln!(
        w,
        "{}  {}  members={} generations={}",
        entry.family.id, entry.family.name, entry.stats.member_count, entry.stats.generation_count
    )
}

pub fn render_created_family(
    mode: OutputMode,
    family: &Family,
    founder: &Member,
) -> anyhow::Result<()> {
    let value = json!({ "family": family, "founder": founder });
    render(mode, &value, |_, w| {
        writeln!(w, "created family {}  {}", family.id, family.name)?;
        write!(w, "founder: ")?;
        member_line(w, 0, founder)
    })
}

pub fn render_family_list(mode: OutputMode, families: &[FamilyWithStats]) -> anyhow::Result<()> {
    render(mode, &families, |families, w| {
        if families.is_empty() {
            return writeln!(w, "no families");
        }
        for entry in families.iter() {
            stats_line(w, entry)?;
        }
        Ok(())
    })
}

pub fn render_family_stats(mode: OutputMode, entry: &FamilyWithStats) -> anyhow::Result<()> {
    render(mode, entry, |entry, w| stats_line(w, entry))
}

pub fn render_member(mode: OutputMode, member: &Member) -> anyhow::Result<()> {
    render(mode, member, |member, w| member_line(w, 0, member))
}

pub fn render_members(mode: OutputMode, members: &[Member]) -> anyhow::Result<()> {
    render(mode, &members, |members, w| {
        for member in members.iter() {
            member_line(w, 0, member)?;
        }
        Ok(())
    })
}

pub fn render_message(mode: OutputMode, action: &str, id: Uuid) -> anyhow::Result<()> {
    let value = json!({ "status": action, "id": id });
    render(mode, &value, |_, w| writeln!(w, "{action} {id}"))
}

pub fn render_tree(mode: OutputMode, tree: &FamilyTree) -> anyhow::Result<()> {
    render(mode, tree, write_tree)
}

fn write_tree(tree: &FamilyTree, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}  {}", tree.family.id, tree.family.name)?;
    rule(w)?;
    for (index, level) in tree.levels.iter().enumerate() {
        writeln!(w, "generation {}", index + 1)?;
        for member in level {
            member_line(w, 2, member)?;
            if let Some(parent) = tree.parent_names.get(&member.id) {
                writeln!(w, "    parent: {parent}")?;
            }
        }
    }
    if !tree.detached.is_empty() {
        rule(w)?;
        writeln!(w, "detached (parent cycle)")?;
        for member in &tree.detached {
            member_line(w, 2, member)?;
        }
    }
    Ok(())
}
