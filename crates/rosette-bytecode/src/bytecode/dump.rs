//! Human-readable program dump for debugging and documentation.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use super::format::{Colors, LineBuilder, format_operands, format_target, width_for_count};
use super::program::Program;

/// Generate a human-readable dump of a role program.
pub fn dump(program: &Program, colors: Colors) -> String {
    let mut out = String::new();
    let ctx = DumpContext::new(program, colors);

    dump_state(&mut out, program, &ctx);
    dump_literals(&mut out, program, &ctx);
    dump_lookaround(&mut out, program, &ctx);
    dump_code(&mut out, program, &ctx);

    out
}

struct DumpContext {
    /// Literal ids entering at each offset.
    entry_labels: BTreeMap<u32, Vec<u32>>,
    offset_width: usize,
    literal_width: usize,
    look_width: usize,
    colors: Colors,
}

impl DumpContext {
    fn new(program: &Program, colors: Colors) -> Self {
        let mut entry_labels: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
        for (literal, entries) in program.literals().iter().enumerate() {
            for entry in entries {
                let ids = entry_labels.entry(entry.0).or_default();
                if !ids.contains(&(literal as u32)) {
                    ids.push(literal as u32);
                }
            }
        }

        Self {
            entry_labels,
            offset_width: width_for_count(program.code().len()),
            literal_width: width_for_count(program.literals().len()),
            look_width: width_for_count(program.lookaround().len()),
            colors,
        }
    }
}

fn dump_state(out: &mut String, program: &Program, ctx: &DumpContext) {
    let c = &ctx.colors;
    writeln!(out, "{}[state]{}", c.blue, c.reset).unwrap();
    writeln!(out, "handled_keys = {}", program.handled_key_count()).unwrap();
    writeln!(out, "role_states = {}", program.role_state_count()).unwrap();
    writeln!(out, "queues = {}", program.queue_count()).unwrap();
    writeln!(out, "som_slots = {}", program.som_slot_count()).unwrap();
    writeln!(out, "initial_groups = {:#x}", program.initial_groups()).unwrap();
    writeln!(out, "floating_min_offset = {}", program.floating_min_offset()).unwrap();
    out.push('\n');
}

fn dump_literals(out: &mut String, program: &Program, ctx: &DumpContext) {
    let c = &ctx.colors;
    let (lw, ow) = (ctx.literal_width, ctx.offset_width);

    writeln!(out, "{}[literals]{}", c.blue, c.reset).unwrap();
    for (literal, entries) in program.literals().iter().enumerate() {
        let offsets: Vec<String> = entries
            .iter()
            .map(|e| format!("{:0ow$}", e.0))
            .collect();
        writeln!(out, "L{literal:0lw$} -> {}", offsets.join(" ")).unwrap();
    }
    out.push('\n');
}

fn dump_lookaround(out: &mut String, program: &Program, ctx: &DumpContext) {
    let c = &ctx.colors;
    let w = ctx.look_width;

    writeln!(out, "{}[lookaround]{}", c.blue, c.reset).unwrap();
    for (i, entry) in program.lookaround().iter().enumerate() {
        writeln!(
            out,
            "#{i:0w$} {:+} {}{}{}",
            entry.offset, c.green, entry.reach, c.reset
        )
        .unwrap();
    }
    out.push('\n');
}

fn dump_code(out: &mut String, program: &Program, ctx: &DumpContext) {
    let c = &ctx.colors;
    let builder = LineBuilder::new(ctx.offset_width);

    writeln!(out, "{}[code]{}", c.blue, c.reset).unwrap();

    let mut first_label = true;
    for (offset, instr) in program.instructions() {
        if let Some(ids) = ctx.entry_labels.get(&offset.0) {
            let names: Vec<String> = ids
                .iter()
                .map(|id| format!("L{id:0lw$}", lw = ctx.literal_width))
                .collect();
            let sep = if first_label { "" } else { "\n" };
            writeln!(out, "{sep}{}{}{}:", c.blue, names.join(", "), c.reset).unwrap();
            first_label = false;
        }

        let prefix = builder.instruction_prefix(offset.0, instr.opcode().mnemonic());
        let base = format!("{prefix}{}", format_operands(&instr));
        let target = format_target(offset.0, &instr, ctx.offset_width);
        let target = if target.is_empty() {
            target
        } else {
            format!("{}{target}{}", c.dim, c.reset)
        };
        writeln!(out, "{}", builder.pad_target(base, &target)).unwrap();
    }
}
