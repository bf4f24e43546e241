//! Code statistics over a validated program.

use crate::grammar::Opcode;
use crate::program::Program;
use clap::ValueEnum;
use std::collections::{BTreeMap, HashMap, HashSet};

/// One statistic, selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatGroup {
    /// Number of instructions.
    Loc,
    /// Number of lines carrying a comment.
    Comments,
    /// Number of distinct labels defined.
    Labels,
    /// Number of jump, call and return instructions.
    Jumps,
    /// Jumps to labels defined further down.
    Fwjumps,
    /// Jumps to labels defined above.
    Backjumps,
    /// Jumps to labels that are never defined.
    Badjumps,
    /// Most frequent opcodes.
    Frequent,
    /// Empty line.
    Eol,
}

/// Collected statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    pub loc: usize,
    pub comments: usize,
    pub labels: usize,
    pub jumps: usize,
    pub fwjumps: usize,
    pub backjumps: usize,
    pub badjumps: usize,
    pub frequent: Vec<&'static str>,
}

impl Statistics {
    pub fn collect(program: &Program) -> Self {
        let mut definitions: HashMap<&str, usize> = HashMap::new();
        let mut labels: HashSet<&str> = HashSet::new();
        let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();

        for instruction in &program.instructions {
            *counts.entry(instruction.opcode.as_str()).or_default() += 1;
            if instruction.opcode == Opcode::Label {
                let name = instruction.operands[0].payload.as_str();
                labels.insert(name);
                definitions.entry(name).or_insert(instruction.order);
            }
        }

        let mut stats = Statistics {
            loc: program.len(),
            comments: program.comment_lines,
            labels: labels.len(),
            ..Default::default()
        };

        for instruction in &program.instructions {
            if instruction.opcode == Opcode::Return {
                stats.jumps += 1;
                continue;
            }
            if !instruction.opcode.is_label_jump() {
                continue;
            }
            stats.jumps += 1;

            let target = instruction.operands[0].payload.as_str();
            match definitions.get(target) {
                Some(&defined) if defined > instruction.order => stats.fwjumps += 1,
                Some(_) => stats.backjumps += 1,
                None => stats.badjumps += 1,
            }
        }

        let max = counts.values().copied().max().unwrap_or(0);
        stats.frequent = counts
            .into_iter()
            .filter(|&(_, count)| count == max)
            .map(|(name, _)| name)
            .collect();

        stats
    }

    /// Render the requested groups, one per line, in the order given.
    pub fn render(&self, groups: &[StatGroup]) -> String {
        let mut output = String::new();
        for group in groups {
            match group {
                StatGroup::Loc => output.push_str(&self.loc.to_string()),
                StatGroup::Comments => output.push_str(&self.comments.to_string()),
                StatGroup::Labels => output.push_str(&self.labels.to_string()),
                StatGroup::Jumps => output.push_str(&self.jumps.to_string()),
                StatGroup::Fwjumps => output.push_str(&self.fwjumps.to_string()),
                StatGroup::Backjumps => output.push_str(&self.backjumps.to_string()),
                StatGroup::Badjumps => output.push_str(&self.badjumps.to_string()),
                StatGroup::Frequent => output.push_str(&self.frequent.join(",")),
                StatGroup::Eol => {}
            }
            output.push('\n');
        }
        output
    }
}
