//! Batch driver: rules in, events out.
//!
//! A [`Worker`] resolves each rule through the provider registry, steps
//! every command it yields, then runs the shared deep scan once all rules
//! have registered their searches. It is a plain iterator, so the caller
//! decides the pace and dropping it cancels the rest of the batch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::command::{Command, Delete, ExecutionResult, Mode, Step};
use crate::deep_scan::{DeepScan, DeepScanner, ScanEvent};
use crate::error::Result;
use crate::provider::{CommandStream, ProviderRegistry};
use crate::rule::Rule;
use crate::session::Session;

/// A command that failed. The batch carries on without it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub path: String,
    pub error: String,
}

/// A rule that could not be resolved into commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRule {
    pub action: String,
    pub label: Option<String>,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    /// Liveness marker; nothing finished.
    Progress,
    Result(ExecutionResult),
    Failure(Failure),
    RuleSkipped(SkippedRule),
}

/// Everything one batch did (or would do).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub mode: Mode,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub results: Vec<ExecutionResult>,
    pub failures: Vec<Failure>,
    pub skipped_rules: Vec<SkippedRule>,
    pub deleted_count: u64,
    pub special_count: u64,
    /// Sum of known sizes; unknown sizes count as zero.
    pub bytes: u64,
}

pub struct Worker<'a> {
    session: &'a Session,
    registry: &'a ProviderRegistry,
    mode: Mode,
    rules: std::slice::Iter<'a, Rule>,
    commands: Option<CommandStream>,
    active: Option<Box<dyn Command>>,
    deep: Option<DeepScanner>,
    deep_scan: Option<DeepScan>,
}

impl<'a> Worker<'a> {
    pub fn new(
        session: &'a Session,
        registry: &'a ProviderRegistry,
        rules: &'a [Rule],
        mode: Mode,
    ) -> Self {
        Self {
            session,
            registry,
            mode,
            rules: rules.iter(),
            commands: None,
            active: None,
            deep: Some(DeepScanner::with_interval(session.deep_scan_interval)),
            deep_scan: None,
        }
    }

    /// Drain the batch into a report.
    pub fn run(self) -> BatchReport {
        let mode = self.mode;
        let started_at = Utc::now();
        let mut report = BatchReport {
            run_id: Uuid::new_v4(),
            mode,
            started_at,
            finished_at: started_at,
            results: Vec::new(),
            failures: Vec::new(),
            skipped_rules: Vec::new(),
            deleted_count: 0,
            special_count: 0,
            bytes: 0,
        };

        for event in self {
            match event {
                WorkerEvent::Progress => {}
                WorkerEvent::Result(result) => {
                    report.deleted_count += result.deleted_count;
                    report.special_count += result.special_count;
                    report.bytes += result.size.unwrap_or(0);
                    report.results.push(result);
                }
                WorkerEvent::Failure(failure) => report.failures.push(failure),
                WorkerEvent::RuleSkipped(skipped) => report.skipped_rules.push(skipped),
            }
        }

        report.finished_at = Utc::now();
        tracing::info!(
            run_id = %report.run_id,
            mode = %mode,
            results = report.results.len(),
            failures = report.failures.len(),
            skipped = report.skipped_rules.len(),
            bytes = report.bytes,
            "batch finished"
        );
        report
    }

    fn resolve(&mut self, rule: &Rule) -> Result<CommandStream> {
        let provider = self.registry.get(&rule.action)?;
        let requests = provider.deep_scan(rule, self.session)?;
        let commands = provider.commands(rule, self.session)?;
        if let Some(deep) = self.deep.as_mut() {
            for request in requests {
                deep.add_request(request);
            }
        }
        Ok(commands)
    }
}

impl Iterator for Worker<'_> {
    type Item = WorkerEvent;

    fn next(&mut self) -> Option<WorkerEvent> {
        loop {
            if let Some(command) = self.active.as_mut() {
                let step = command.step(self.mode, self.session);
                let descriptor = command.descriptor();
                match step {
                    Ok(Step::Progress) => return Some(WorkerEvent::Progress),
                    Ok(Step::Done(result)) => {
                        self.active = None;
                        if let Some(result) = result {
                            return Some(WorkerEvent::Result(result));
                        }
                        tracing::debug!(path = %descriptor, "command had nothing to do");
                    }
                    Err(e) => {
                        self.active = None;
                        tracing::warn!(path = %descriptor, error = %e, "command failed");
                        return Some(WorkerEvent::Failure(Failure {
                            path: descriptor,
                            error: e.to_string(),
                        }));
                    }
                }
                continue;
            }

            if let Some(commands) = self.commands.as_mut() {
                match commands.next() {
                    Some(command) => self.active = Some(command),
                    None => self.commands = None,
                }
                continue;
            }

            if let Some(rule) = self.rules.next() {
                match self.resolve(rule) {
                    Ok(commands) => self.commands = Some(commands),
                    Err(e) => {
                        tracing::warn!(action = %rule.action, error = %e, "rule skipped");
                        return Some(WorkerEvent::RuleSkipped(SkippedRule {
                            action: rule.action.clone(),
                            label: rule.label.clone(),
                            error: e.to_string(),
                        }));
                    }
                }
                continue;
            }

            if let Some(deep) = self.deep.take() {
                if !deep.is_empty() {
                    self.deep_scan = Some(deep.into_scan());
                }
                continue;
            }

            match self.deep_scan.as_mut()?.next() {
                Some(ScanEvent::Progress) => return Some(WorkerEvent::Progress),
                Some(ScanEvent::Found(hit)) => {
                    self.active = Some(Box::new(Delete::new(hit.path, hit.shred)));
                }
                None => self.deep_scan = None,
            }
        }
    }
}
