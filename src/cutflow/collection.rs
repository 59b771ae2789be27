// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Named reports of one cut network, one per sample.
//!
//! A [`CutflowCollection`] lines up the reports of several samples (signal,
//! each background, data) so they can be summed or tabulated side by side.
//! Every member must be equivalent to the others; the check runs on insert.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::report::DELIMITER;
use crate::cutflow::CutflowReport;
use crate::errors::ReportError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CutflowCollection {
    samples: Vec<(String, CutflowReport)>,
}

impl CutflowCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection in iteration order; fails on the first
    /// inconsistent member.
    pub fn from_reports<I, S>(reports: I) -> Result<Self, ReportError>
    where
        I: IntoIterator<Item = (S, CutflowReport)>,
        S: Into<String>,
    {
        let mut collection = Self::new();
        for (name, report) in reports {
            collection.insert(name, report)?;
        }
        Ok(collection)
    }

    /// Reads one `.cflow` file per sample.
    pub fn from_files<I, S, P>(files: I) -> Result<Self, ReportError>
    where
        I: IntoIterator<Item = (S, P)>,
        S: Into<String>,
        P: AsRef<Path>,
    {
        let mut collection = Self::new();
        for (name, path) in files {
            collection.insert(name, CutflowReport::from_file(path)?)?;
        }
        Ok(collection)
    }

    /// Adds `report` under `name`, replacing any report already stored under
    /// that name. The report must be equivalent to the other members.
    pub fn insert(&mut self, name: impl Into<String>, report: CutflowReport) -> Result<(), ReportError> {
        let name = name.into();
        if name.contains([DELIMITER, '\n', '\r']) {
            return Err(ReportError::InvalidSampleName { name });
        }
        let consistent = self
            .samples
            .iter()
            .find(|(existing, _)| *existing != name)
            .map_or(true, |(_, member)| member.is_equivalent(&report));
        if !consistent {
            return Err(ReportError::Inconsistent);
        }

        match self.samples.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = report,
            None => self.samples.push((name, report)),
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CutflowReport> {
        self.samples
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, report)| report)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<CutflowReport> {
        let i = self.samples.iter().position(|(existing, _)| existing == name)?;
        Some(self.samples.remove(i).1)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.samples.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CutflowReport)> {
        self.samples.iter().map(|(name, report)| (name.as_str(), report))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample-by-sample sum. Samples present on both sides are merged; the
    /// rest are carried over, this collection's order first.
    pub fn merge(&self, other: &CutflowCollection) -> Result<CutflowCollection, ReportError> {
        let mut merged = CutflowCollection::new();
        for (name, report) in self.iter() {
            let report = match other.get(name) {
                Some(theirs) => report.merge(theirs)?,
                None => report.clone(),
            };
            merged.insert(name, report)?;
        }
        for (name, report) in other.iter() {
            if !self.contains(name) {
                merged.insert(name, report.clone())?;
            }
        }
        Ok(merged)
    }

    /// All samples summed into one report.
    pub fn sum(&self) -> Result<CutflowReport, ReportError> {
        CutflowReport::sum(self.samples.iter().map(|(_, report)| report))
    }

    pub fn terminal_cut_names(&self) -> Vec<String> {
        self.samples
            .first()
            .map(|(_, report)| report.terminal_cut_names())
            .unwrap_or_default()
    }

    /// Puts the samples in `order`, which must name every sample exactly once.
    pub fn reorder(&mut self, order: &[&str]) -> Result<(), ReportError> {
        let unique: HashSet<&str> = order.iter().copied().collect();
        let valid = order.len() == self.samples.len()
            && unique.len() == order.len()
            && order.iter().all(|name| self.contains(name));
        if !valid {
            return Err(ReportError::SampleOrder {
                expected: self.names().map(String::from).collect(),
                given: order.iter().map(|name| name.to_string()).collect(),
            });
        }

        let mut remaining = std::mem::take(&mut self.samples);
        for name in order {
            if let Some(i) = remaining.iter().position(|(existing, _)| existing == name) {
                self.samples.push(remaining.swap_remove(i));
            }
        }
        Ok(())
    }

    /// Renames samples by `(old, new)` pairs. Names not mentioned are kept.
    /// Nothing changes when the result would hold two samples of one name.
    pub fn rename<'a, I>(&mut self, renames: I) -> Result<(), ReportError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let renames: Vec<(&str, &str)> = renames.into_iter().collect();
        let renamed: Vec<String> = self
            .names()
            .map(|name| {
                renames
                    .iter()
                    .find(|(old, _)| *old == name)
                    .map_or(name, |(_, new)| *new)
                    .to_string()
            })
            .collect();

        let mut seen = HashSet::new();
        for name in &renamed {
            if name.contains([DELIMITER, '\n', '\r']) {
                return Err(ReportError::InvalidSampleName { name: name.clone() });
            }
            if !seen.insert(name.as_str()) {
                return Err(ReportError::DuplicateSample { name: name.clone() });
            }
        }

        for ((name, _), new) in self.samples.iter_mut().zip(renamed) {
            *name = new;
        }
        Ok(())
    }

    /// Side-by-side `raw,wgt` columns per sample along the path from the root
    /// to `terminal`:
    ///
    /// ```text
    /// ,signal,,ttbar,
    /// cut,raw,wgt,raw,wgt
    /// Bookkeeping,10,5.00,100,200.00
    /// ```
    pub fn path_csv(&self, terminal: &str) -> Result<String, ReportError> {
        let mut rows: Vec<String> = Vec::new();
        for (i, (name, report)) in self.samples.iter().enumerate() {
            let csv = report.path_csv(terminal)?;
            if i == 0 {
                rows.push(format!(",{},", name));
                rows.extend(csv.lines().map(String::from));
                continue;
            }
            rows[0].push_str(&format!(",{},", name));
            for (row, line) in rows[1..].iter_mut().zip(csv.lines()) {
                let counts = line.split_once(DELIMITER).map_or("", |(_, rest)| rest);
                row.push(DELIMITER);
                row.push_str(counts);
            }
        }

        let mut out = rows.join("\n");
        if !out.is_empty() {
            out.push('\n');
        }
        Ok(out)
    }

    pub fn write_csv<P: AsRef<Path>>(&self, path: P, terminal: &str) -> Result<(), ReportError> {
        fs::write(path, self.path_csv(terminal)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNAL: &str = "\
Bookkeeping,10,5,0,0,null,null,HasLep
HasLep,6,3,4,2,Bookkeeping,NoLep,TwoJets
NoLep,1,0.5,3,1.5,HasLep,null,null
TwoJets,2,1,4,2,HasLep,null,null
";

    const TTBAR: &str = "\
Bookkeeping,100,200,0,0,null,null,HasLep
HasLep,40,80,60,120,Bookkeeping,NoLep,TwoJets
NoLep,20,40,40,80,HasLep,null,null
TwoJets,10,20,30,60,HasLep,null,null
";

    fn report(text: &str) -> CutflowReport {
        CutflowReport::from_text(text).unwrap()
    }

    fn collection() -> CutflowCollection {
        CutflowCollection::from_reports([("signal", report(SIGNAL)), ("ttbar", report(TTBAR))]).unwrap()
    }

    #[test]
    fn test_inconsistent_member_is_rejected() {
        let mut samples = collection();
        let other = report("Bookkeeping,1,1,0,0,null,null,null\n");

        assert!(matches!(samples.insert("data", other), Err(ReportError::Inconsistent)));
        assert_eq!(samples.len(), 2);
        assert!(!samples.contains("data"));

        assert!(matches!(
            samples.insert("a,b", report(SIGNAL)),
            Err(ReportError::InvalidSampleName { .. })
        ));
    }

    #[test]
    fn test_insert_replaces_same_name() {
        let mut samples = collection();
        samples.insert("signal", report(TTBAR)).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples.get("signal").unwrap().get("Bookkeeping").unwrap().stats.n_pass, 100);

        let mut single = CutflowCollection::from_reports([("only", report(SIGNAL))]).unwrap();
        single
            .insert("only", report("Bookkeeping,1,1,0,0,null,null,null\n"))
            .unwrap();
        assert_eq!(single.terminal_cut_names(), vec!["Bookkeeping"]);
    }

    #[test]
    fn test_merge_sums_shared_samples_and_keeps_the_rest() {
        let first = collection();
        let second = CutflowCollection::from_reports([("ttbar", report(TTBAR)), ("data", report(SIGNAL))]).unwrap();

        let merged = first.merge(&second).unwrap();
        assert_eq!(merged.names().collect::<Vec<_>>(), vec!["signal", "ttbar", "data"]);
        assert_eq!(merged.get("ttbar").unwrap().get("Bookkeeping").unwrap().stats.n_pass, 200);
        assert_eq!(merged.get("signal").unwrap(), &report(SIGNAL));
        assert_eq!(merged.get("data").unwrap(), &report(SIGNAL));
    }

    #[test]
    fn test_sum_and_terminals() {
        let samples = collection();
        let total = samples.sum().unwrap();
        let root = total.get("Bookkeeping").unwrap().stats;
        assert_eq!((root.n_pass, root.n_pass_weighted), (110, 205.0));
        assert_eq!(samples.terminal_cut_names(), vec!["TwoJets", "NoLep"]);

        let empty = CutflowCollection::new();
        assert!(empty.terminal_cut_names().is_empty());
        assert!(empty.sum().unwrap().is_empty());
    }

    #[test]
    fn test_reorder() {
        let mut samples = collection();
        samples.reorder(&["ttbar", "signal"]).unwrap();
        assert_eq!(samples.names().collect::<Vec<_>>(), vec!["ttbar", "signal"]);
        assert_eq!(samples.get("signal").unwrap(), &report(SIGNAL));

        let bad_orders: [&[&str]; 3] = [&["ttbar"], &["ttbar", "ttbar"], &["ttbar", "signal", "data"]];
        for bad in bad_orders {
            assert!(matches!(samples.reorder(bad), Err(ReportError::SampleOrder { .. })));
        }
        assert_eq!(samples.names().collect::<Vec<_>>(), vec!["ttbar", "signal"]);
    }

    #[test]
    fn test_rename() {
        let mut samples = collection();
        samples.rename([("signal", "WH")]).unwrap();
        assert_eq!(samples.names().collect::<Vec<_>>(), vec!["WH", "ttbar"]);

        assert!(matches!(
            samples.rename([("WH", "ttbar")]),
            Err(ReportError::DuplicateSample { name }) if name == "ttbar"
        ));
        assert_eq!(samples.names().collect::<Vec<_>>(), vec!["WH", "ttbar"]);

        // swapping two names is fine
        samples.rename([("WH", "ttbar"), ("ttbar", "WH")]).unwrap();
        assert_eq!(samples.names().collect::<Vec<_>>(), vec!["ttbar", "WH"]);
        assert_eq!(samples.get("WH").unwrap(), &report(TTBAR));
    }

    #[test]
    fn test_side_by_side_csv() {
        let samples = collection();
        assert_eq!(
            samples.path_csv("TwoJets").unwrap(),
            "\
,signal,,ttbar,
cut,raw,wgt,raw,wgt
Bookkeeping,10,5.00,100,200.00
HasLep,6,3.00,40,80.00
TwoJets,2,1.00,10,20.00
"
        );
        let no_lep = samples.path_csv("NoLep").unwrap();
        assert!(no_lep.contains("\nnot(HasLep),4,2.00,60,120.00\n"));
        assert!(matches!(samples.path_csv("Nope"), Err(ReportError::UnknownCut { .. })));
        assert_eq!(CutflowCollection::new().path_csv("TwoJets").unwrap(), "");
    }

    #[test]
    fn test_from_files_and_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let signal = dir.path().join("signal.cflow");
        let ttbar = dir.path().join("ttbar.cflow");
        report(SIGNAL).write(&signal).unwrap();
        report(TTBAR).write(&ttbar).unwrap();

        let samples = CutflowCollection::from_files([("signal", &signal), ("ttbar", &ttbar)]).unwrap();
        assert_eq!(samples, collection());

        let csv = dir.path().join("TwoJets.csv");
        samples.write_csv(&csv, "TwoJets").unwrap();
        assert_eq!(fs::read_to_string(&csv).unwrap(), samples.path_csv("TwoJets").unwrap());
    }
}
