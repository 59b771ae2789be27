// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Predicate-free snapshots of a cutflow's counters.
//!
//! A [`CutflowReport`] keeps only what is needed after processing: each cut's
//! name, counters and lineage. Reports are written as `.cflow` text, one cut per
//! line:
//!
//! ```text
//! name,n_pass,n_pass_weighted,n_fail,n_fail_weighted,parent,fail_child,pass_child
//! ```
//!
//! with `null` for an absent link. Reports of the same cut network (for
//! example one per input file, or one per parallel job) can be summed.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::cutflow::CutStats;
use crate::errors::ReportError;

const NULL_LINK: &str = "null";
pub(super) const DELIMITER: char = ',';

/// Why `name` cannot stand as a field of a `.cflow` line, if it cannot.
pub(crate) fn unreportable_name(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        Some("names must not be empty")
    } else if name == NULL_LINK {
        Some("'null' marks an absent link")
    } else if name.contains(DELIMITER) {
        Some("names must not contain ','")
    } else if name.contains(['\n', '\r']) {
        Some("names must not contain line breaks")
    } else if name.trim() != name {
        Some("names must not start or end with whitespace")
    } else {
        None
    }
}

/// One cut of a report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub name: String,
    pub stats: CutStats,
    pub parent: Option<String>,
    pub fail_child: Option<String>,
    pub pass_child: Option<String>,
}

impl ReportEntry {
    fn same_lineage(&self, other: &ReportEntry) -> bool {
        self.name == other.name
            && self.parent == other.parent
            && self.fail_child == other.fail_child
            && self.pass_child == other.pass_child
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CutflowReport {
    entries: Vec<ReportEntry>,
    index: HashMap<String, usize>,
}

impl CutflowReport {
    pub(crate) fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<
            Item = (String, CutStats, Option<String>, Option<String>, Option<String>),
        >,
    {
        let entries: Vec<ReportEntry> = entries
            .into_iter()
            .map(|(name, stats, parent, fail_child, pass_child)| ReportEntry {
                name,
                stats,
                parent,
                fail_child,
                pass_child,
            })
            .collect();
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.name.clone(), i))
            .collect();
        Self { entries, index }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ReportEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn root(&self) -> Option<&ReportEntry> {
        self.entries.iter().find(|entry| entry.parent.is_none())
    }

    /// Whether both reports describe the same cuts wired the same way.
    pub fn is_equivalent(&self, other: &CutflowReport) -> bool {
        self.len() == other.len()
            && self.entries.iter().all(|entry| {
                other
                    .get(&entry.name)
                    .is_some_and(|theirs| entry.same_lineage(theirs))
            })
    }

    /// Cut-by-cut sum of two reports. An empty report is the identity.
    pub fn merge(&self, other: &CutflowReport) -> Result<CutflowReport, ReportError> {
        if self.is_empty() {
            return Ok(other.clone());
        }
        if other.is_empty() {
            return Ok(self.clone());
        }
        self.combine(other, |_, mine, theirs| {
            let mut sum = *mine;
            sum.merge(theirs);
            Ok(sum)
        })
    }

    /// Cut-by-cut `self - other`. Subtracting an empty report is the identity.
    ///
    /// Fails with [`ReportError::NegativeCount`] when `other` holds more raw
    /// passes or fails than `self` for any cut.
    pub fn difference(&self, other: &CutflowReport) -> Result<CutflowReport, ReportError> {
        if other.is_empty() {
            return Ok(self.clone());
        }
        self.combine(other, |name, mine, theirs| {
            mine.difference(theirs).ok_or_else(|| ReportError::NegativeCount {
                name: name.to_string(),
            })
        })
    }

    /// Sum any number of reports of the same network.
    pub fn sum<'a, I>(reports: I) -> Result<CutflowReport, ReportError>
    where
        I: IntoIterator<Item = &'a CutflowReport>,
    {
        reports
            .into_iter()
            .try_fold(CutflowReport::default(), |total, report| total.merge(report))
    }

    fn combine(
        &self,
        other: &CutflowReport,
        op: impl Fn(&str, &CutStats, &CutStats) -> Result<CutStats, ReportError>,
    ) -> Result<CutflowReport, ReportError> {
        if !self.is_equivalent(other) {
            return Err(ReportError::Inconsistent);
        }
        let mut combined = self.clone();
        for entry in &mut combined.entries {
            if let Some(theirs) = other.get(&entry.name) {
                entry.stats = op(&entry.name, &entry.stats, &theirs.stats)?;
            }
        }
        Ok(combined)
    }

    /// Cuts with neither a pass nor a fail successor, pass branches first.
    pub fn terminal_cut_names(&self) -> Vec<String> {
        let mut terminals = Vec::new();
        if let Some(root) = self.root() {
            self.collect_terminals(root, &mut terminals);
        }
        terminals
    }

    fn collect_terminals(&self, entry: &ReportEntry, terminals: &mut Vec<String>) {
        if entry.pass_child.is_none() && entry.fail_child.is_none() {
            terminals.push(entry.name.clone());
            return;
        }
        for child in [&entry.pass_child, &entry.fail_child].into_iter().flatten() {
            if let Some(child) = self.get(child) {
                self.collect_terminals(child, terminals);
            }
        }
    }

    /// Human-readable tree of counters. Fail successors are marked `☒`, pass
    /// successors `☑`.
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.root() {
            self.render_node(root, "", "", &mut out);
        }
        out
    }

    fn render_node(&self, entry: &ReportEntry, prefix: &str, tabs: &str, out: &mut String) {
        let _ = writeln!(out, "{}{}", prefix, entry.name);
        let stats = &entry.stats;
        let _ = writeln!(
            out,
            "{}pass: {} (raw) {:.2} (wgt)",
            tabs, stats.n_pass, stats.n_pass_weighted
        );
        let _ = writeln!(
            out,
            "{}fail: {} (raw) {:.2} (wgt)",
            tabs, stats.n_fail, stats.n_fail_weighted
        );

        if let Some(fail) = entry.fail_child.as_deref().and_then(|name| self.get(name)) {
            if entry.pass_child.is_some() {
                let prefix = format!("{}├☒─", tabs);
                self.render_node(fail, &prefix, &format!("{}│   ", tabs), out);
            } else {
                let prefix = format!("{}└☒─", tabs);
                self.render_node(fail, &prefix, &format!("{}    ", tabs), out);
            }
        }
        if let Some(pass) = entry.pass_child.as_deref().and_then(|name| self.get(name)) {
            let prefix = format!("{}└☑─", tabs);
            self.render_node(pass, &prefix, &format!("{}    ", tabs), out);
        }
    }

    /// Mermaid flowchart with a pass and a fail leaf under every cut.
    /// `orientation` is a mermaid direction such as `TD` or `LR`.
    pub fn to_mermaid(&self, orientation: &str) -> String {
        let mut out = format!("```mermaid\ngraph {}\n", orientation);
        if let Some(root) = self.root() {
            self.mermaid_node(root, &mut out);
        }
        out.push_str("```\n");
        out
    }

    fn mermaid_node(&self, entry: &ReportEntry, out: &mut String) {
        let name = &entry.name;
        match entry.parent.as_deref().and_then(|parent| self.get(parent)) {
            None => {
                let _ = writeln!(out, "    {}([\"{} <br/> (root node)\"])", name, name);
            }
            Some(parent) => {
                let side = if parent.fail_child.as_deref() == Some(name.as_str()) {
                    "Fail"
                } else {
                    "Pass"
                };
                let _ = writeln!(out, "    {}{} --> {}{{{}}}", parent.name, side, name, name);
            }
        }
        let stats = &entry.stats;
        let _ = writeln!(
            out,
            "    {} -- Fail --> {}Fail[/{} raw <br/> {:.2} wgt/]",
            name, name, stats.n_fail, stats.n_fail_weighted
        );
        let _ = writeln!(
            out,
            "    {} -- Pass --> {}Pass[/{} raw <br/> {:.2} wgt/]",
            name, name, stats.n_pass, stats.n_pass_weighted
        );

        for child in [&entry.fail_child, &entry.pass_child].into_iter().flatten() {
            if let Some(child) = self.get(child) {
                self.mermaid_node(child, out);
            }
        }
    }

    /// `cut,raw,wgt` rows along the path from the root to `terminal`. A step
    /// taken through a fail slot is written as `not(name)` with that cut's
    /// fail counters.
    pub fn path_csv(&self, terminal: &str) -> Result<String, ReportError> {
        let mut path = Vec::new();
        let mut cursor = self.get(terminal);
        while let Some(entry) = cursor {
            if path.len() == self.entries.len() {
                break;
            }
            path.push(entry);
            cursor = entry.parent.as_deref().and_then(|parent| self.get(parent));
        }
        if path.is_empty() {
            return Err(ReportError::UnknownCut {
                name: terminal.to_string(),
            });
        }
        path.reverse();

        let mut out = String::from("cut,raw,wgt\n");
        for (i, entry) in path.iter().enumerate() {
            let took_pass = match path.get(i + 1) {
                None => true,
                Some(next) => entry.pass_child.as_deref() == Some(next.name.as_str()),
            };
            let stats = &entry.stats;
            if took_pass {
                let _ = writeln!(
                    out,
                    "{},{},{:.2}",
                    entry.name, stats.n_pass, stats.n_pass_weighted
                );
            } else {
                let _ = writeln!(
                    out,
                    "not({}),{},{:.2}",
                    entry.name, stats.n_fail, stats.n_fail_weighted
                );
            }
        }
        Ok(out)
    }

    pub fn to_text(&self) -> String {
        let link = |link: &Option<String>| link.clone().unwrap_or_else(|| NULL_LINK.to_string());
        let mut out = String::new();
        for entry in &self.entries {
            let stats = &entry.stats;
            let _ = writeln!(
                out,
                "{},{},{},{},{},{},{},{}",
                entry.name,
                stats.n_pass,
                stats.n_pass_weighted,
                stats.n_fail,
                stats.n_fail_weighted,
                link(&entry.parent),
                link(&entry.fail_child),
                link(&entry.pass_child),
            );
        }
        out
    }

    pub fn from_text(text: &str) -> Result<CutflowReport, ReportError> {
        let mut entries = Vec::new();
        for (i, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            entries.push(parse_line(i + 1, line)?);
        }

        let report = CutflowReport::from_entries(entries.into_iter().map(|entry| {
            (
                entry.name,
                entry.stats,
                entry.parent,
                entry.fail_child,
                entry.pass_child,
            )
        }));
        report.check()?;
        Ok(report)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<CutflowReport, ReportError> {
        let text = fs::read_to_string(path)?;
        Self::from_text(&text)
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), ReportError> {
        fs::write(path, self.to_text())?;
        Ok(())
    }

    fn check(&self) -> Result<(), ReportError> {
        if self.index.len() != self.entries.len() {
            let duplicate = self
                .entries
                .iter()
                .enumerate()
                .find(|(i, entry)| self.index.get(&entry.name) != Some(i))
                .map(|(_, entry)| entry.name.clone())
                .unwrap_or_default();
            return Err(ReportError::Malformed {
                line: 0,
                reason: format!("cut '{}' appears more than once", duplicate),
            });
        }

        let mut root: Option<&str> = None;
        for entry in &self.entries {
            if entry.parent.is_none() {
                if let Some(first) = root {
                    return Err(ReportError::MultipleRoots {
                        first: first.to_string(),
                        second: entry.name.clone(),
                    });
                }
                root = Some(&entry.name);
            }
            for link in [&entry.parent, &entry.fail_child, &entry.pass_child]
                .into_iter()
                .flatten()
            {
                if !self.index.contains_key(link) {
                    return Err(ReportError::DanglingLink {
                        name: entry.name.clone(),
                        missing: link.clone(),
                    });
                }
            }
            for child in [&entry.fail_child, &entry.pass_child].into_iter().flatten() {
                let parent = self.get(child).and_then(|c| c.parent.as_deref());
                if parent != Some(entry.name.as_str()) {
                    return Err(ReportError::Malformed {
                        line: 0,
                        reason: format!("cut '{}' does not name '{}' as its parent", child, entry.name),
                    });
                }
            }
        }
        if root.is_none() && !self.entries.is_empty() {
            return Err(ReportError::NoRoot);
        }
        Ok(())
    }
}

fn parse_line(line: usize, text: &str) -> Result<ReportEntry, ReportError> {
    let malformed = |reason: String| ReportError::Malformed { line, reason };
    let fields: Vec<&str> = text.trim().split(DELIMITER).collect();
    if fields.len() != 8 {
        return Err(malformed(format!("expected 8 fields, found {}", fields.len())));
    }
    let count = |s: &str| {
        s.parse::<u64>()
            .map_err(|e| malformed(format!("bad count '{}': {}", s, e)))
    };
    let weight = |s: &str| {
        s.parse::<f64>()
            .map_err(|e| malformed(format!("bad weight '{}': {}", s, e)))
    };
    let link = |s: &str| (s != NULL_LINK).then(|| s.to_string());

    Ok(ReportEntry {
        name: fields[0].to_string(),
        stats: CutStats {
            n_pass: count(fields[1])?,
            n_pass_weighted: weight(fields[2])?,
            n_fail: count(fields[3])?,
            n_fail_weighted: weight(fields[4])?,
        },
        parent: link(fields[5]),
        fail_child: link(fields[6]),
        pass_child: link(fields[7]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CFLOW: &str = "\
Bookkeeping,10,12.5,0,0,null,null,HasLep
HasLep,6,7.5,4,5,Bookkeeping,NoLep,TwoJets
NoLep,1,1.5,3,3.5,HasLep,null,null
TwoJets,2,2.5,4,5,HasLep,null,null
";

    #[test]
    fn test_parse_and_write_text() {
        let report = CutflowReport::from_text(CFLOW).unwrap();
        assert_eq!(report.len(), 4);
        assert_eq!(report.root().unwrap().name, "Bookkeeping");

        let has_lep = report.get("HasLep").unwrap();
        assert_eq!(has_lep.stats.n_pass, 6);
        assert_eq!(has_lep.stats.n_fail_weighted, 5.0);
        assert_eq!(has_lep.fail_child.as_deref(), Some("NoLep"));
        assert_eq!(has_lep.pass_child.as_deref(), Some("TwoJets"));

        assert_eq!(report.to_text(), CFLOW);
    }

    #[test]
    fn test_malformed_text() {
        assert!(matches!(
            CutflowReport::from_text("A,1,1.0,0\n"),
            Err(ReportError::Malformed { line: 1, .. })
        ));
        assert!(matches!(
            CutflowReport::from_text("A,x,1.0,0,0,null,null,null\n"),
            Err(ReportError::Malformed { line: 1, .. })
        ));
        assert!(matches!(
            CutflowReport::from_text("A,1,1,0,0,null,null,null\nB,1,1,0,0,null,null,null\n"),
            Err(ReportError::MultipleRoots { .. })
        ));
        assert!(matches!(
            CutflowReport::from_text("A,1,1,0,0,null,null,Gone\n"),
            Err(ReportError::DanglingLink { .. })
        ));
    }

    #[test]
    fn test_merge_and_difference() {
        let report = CutflowReport::from_text(CFLOW).unwrap();
        let doubled = report.merge(&report).unwrap();
        assert_eq!(doubled.get("Bookkeeping").unwrap().stats.n_pass, 20);
        assert_eq!(doubled.get("TwoJets").unwrap().stats.n_fail_weighted, 10.0);

        let back = doubled.difference(&report).unwrap();
        assert_eq!(back, report);

        let empty = CutflowReport::default();
        assert_eq!(empty.merge(&report).unwrap(), report);
        assert_eq!(report.merge(&empty).unwrap(), report);

        let total = CutflowReport::sum([&report, &report, &report]).unwrap();
        assert_eq!(total.get("NoLep").unwrap().stats.n_pass, 3);
    }

    #[test]
    fn test_difference_larger_than_self_is_rejected() {
        let small = CutflowReport::from_text("R,2,2.0,1,1.0,null,null,null\n").unwrap();
        let large = CutflowReport::from_text("R,5,5.0,1,1.0,null,null,null\n").unwrap();
        assert!(matches!(
            small.difference(&large),
            Err(ReportError::NegativeCount { name }) if name == "R"
        ));

        let diff = large.difference(&small).unwrap();
        let stats = diff.get("R").unwrap().stats;
        assert_eq!((stats.n_pass, stats.n_pass_weighted), (3, 3.0));
        assert_eq!((stats.n_fail, stats.n_fail_weighted), (0, 0.0));
    }

    #[test]
    fn test_merge_of_different_networks_is_inconsistent() {
        let report = CutflowReport::from_text(CFLOW).unwrap();
        let other = CutflowReport::from_text("Bookkeeping,1,1,0,0,null,null,null\n").unwrap();
        assert!(matches!(report.merge(&other), Err(ReportError::Inconsistent)));
    }

    #[test]
    fn test_terminal_cut_names() {
        let report = CutflowReport::from_text(CFLOW).unwrap();
        assert_eq!(report.terminal_cut_names(), vec!["TwoJets", "NoLep"]);
    }

    #[test]
    fn test_render_tree() {
        let report = CutflowReport::from_text(CFLOW).unwrap();
        let expected = "\
Bookkeeping
pass: 10 (raw) 12.50 (wgt)
fail: 0 (raw) 0.00 (wgt)
└☑─HasLep
    pass: 6 (raw) 7.50 (wgt)
    fail: 4 (raw) 5.00 (wgt)
    ├☒─NoLep
    │   pass: 1 (raw) 1.50 (wgt)
    │   fail: 3 (raw) 3.50 (wgt)
    └☑─TwoJets
        pass: 2 (raw) 2.50 (wgt)
        fail: 4 (raw) 5.00 (wgt)
";
        assert_eq!(report.render_tree(), expected);
    }

    #[test]
    fn test_mermaid() {
        let report = CutflowReport::from_text(CFLOW).unwrap();
        let mermaid = report.to_mermaid("TD");
        assert!(mermaid.starts_with("```mermaid\ngraph TD\n"));
        assert!(mermaid.contains("    Bookkeeping([\"Bookkeeping <br/> (root node)\"])\n"));
        assert!(mermaid.contains("    HasLepFail --> NoLep{NoLep}\n"));
        assert!(mermaid.contains("    HasLep -- Pass --> HasLepPass[/6 raw <br/> 7.50 wgt/]\n"));
        assert!(mermaid.ends_with("```\n"));
    }

    #[test]
    fn test_path_csv() {
        let report = CutflowReport::from_text(CFLOW).unwrap();
        assert_eq!(
            report.path_csv("NoLep").unwrap(),
            "cut,raw,wgt\nBookkeeping,10,12.50\nnot(HasLep),4,5.00\nNoLep,1,1.50\n"
        );
        assert!(matches!(
            report.path_csv("Nope"),
            Err(ReportError::UnknownCut { .. })
        ));
    }

    #[test]
    fn test_unreportable_names() {
        assert!(unreportable_name("Lep,Pt").is_some());
        assert!(unreportable_name("null").is_some());
        assert!(unreportable_name("").is_some());
        assert!(unreportable_name(" Padded").is_some());
        assert!(unreportable_name("Two\nLines").is_some());
        assert_eq!(unreportable_name("LepPt > 40 (GeV)"), None);
        assert_eq!(unreportable_name("nullable"), None);
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vbswh.cflow");
        let report = CutflowReport::from_text(CFLOW).unwrap();
        report.write(&path).unwrap();
        assert_eq!(CutflowReport::from_file(&path).unwrap(), report);
    }
}
