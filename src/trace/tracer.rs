//! Trace Orchestration
//!
//! Drives one trace through its stages:
//!
//! ```text
//! Start -> Normalizing -> Resolving -> Ambiguous
//!                                   -> Traversing -> (Planning) -> Done
//! ```
//!
//! `Error` is reachable from every stage. Each transition is reported to
//! the injected [`Logger`]. Index reads and the normalizer's existence
//! probe run under deadlines, and the whole trace runs under the overall
//! trace deadline.
//!
//! @module trace/tracer

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::choices::ChoiceCache;
use super::classify::RuleTable;
use super::normalize::{candidate_key, normalize};
use super::plan::Planner;
use super::resolve::{resolve, select, top_ties};
use super::storage::read_index_or_throw;
use super::traverse::collect_deps;
use super::types::{Candidate, DependencyIndex, TraceResult};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::logger::{Fields, LogLevel, Logger, SharedLogger};
use crate::core::timeout::{with_blocking_deadline, with_deadline};

// =============================================================================
// STAGES
// =============================================================================

/// Orchestrator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceStage {
    Start,
    Normalizing,
    Resolving,
    Ambiguous,
    Traversing,
    Planning,
    Done,
    Error,
}

impl TraceStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Normalizing => "normalizing",
            Self::Resolving => "resolving",
            Self::Ambiguous => "ambiguous",
            Self::Traversing => "traversing",
            Self::Planning => "planning",
            Self::Done => "done",
            Self::Error => "error",
        }
    }

    fn level(self) -> LogLevel {
        match self {
            Self::Error => LogLevel::Error,
            Self::Ambiguous | Self::Done => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }
}

impl fmt::Display for TraceStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Records visited stages and reports each transition
struct StageLog<'a> {
    logger: &'a dyn Logger,
    stages: Vec<TraceStage>,
}

impl<'a> StageLog<'a> {
    fn new(logger: &'a dyn Logger) -> Self {
        Self {
            logger,
            stages: Vec::new(),
        }
    }

    fn enter(&mut self, stage: TraceStage, fields: Fields<'_>) {
        self.stages.push(stage);
        self.logger
            .log(stage.level(), &format!("trace {}", stage), fields);
    }
}

// =============================================================================
// REQUEST / OUTCOME
// =============================================================================

/// One trace invocation
#[derive(Debug, Clone)]
pub struct TraceRequest {
    /// Raw user reference
    pub entry: String,
    /// Tracked root (the directory holding `src/`)
    pub root: PathBuf,
    /// Also compute a refactor plan
    pub plan: bool,
    /// Overrides `resolver.pick_first`
    pub pick_first: Option<bool>,
    /// Explicit pick among tied candidates
    pub choose: Option<String>,
}

impl TraceRequest {
    pub fn new(entry: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            entry: entry.into(),
            root: root.into(),
            plan: false,
            pick_first: None,
            choose: None,
        }
    }

    pub fn with_plan(mut self, plan: bool) -> Self {
        self.plan = plan;
        self
    }

    pub fn with_pick_first(mut self, pick_first: bool) -> Self {
        self.pick_first = Some(pick_first);
        self
    }

    pub fn with_choice(mut self, path: impl Into<String>) -> Self {
        self.choose = Some(path.into());
        self
    }
}

/// A finished trace and the stages it passed through
#[derive(Debug, Clone)]
pub struct TraceOutcome {
    pub result: TraceResult,
    pub stages: Vec<TraceStage>,
}

impl TraceOutcome {
    /// Terminal stage reached
    pub fn final_stage(&self) -> Option<TraceStage> {
        self.stages.last().copied()
    }

    pub fn exit_code(&self) -> i32 {
        self.result.exit_code()
    }
}

// =============================================================================
// TRACER
// =============================================================================

/// Entry point for dependency traces
pub struct Tracer {
    config: Config,
    logger: SharedLogger,
    planner: Planner,
}

impl Tracer {
    pub fn new(config: Config, logger: SharedLogger) -> Self {
        let planner = Planner::new(&config.planner);
        Self {
            config,
            logger,
            planner,
        }
    }

    /// Use a custom classification table for planning
    pub fn with_rules(config: Config, logger: SharedLogger, rules: RuleTable) -> Self {
        let planner = Planner::with_rules(&config.planner, rules);
        Self {
            config,
            logger,
            planner,
        }
    }

    /// Run a trace; ambiguity is a normal outcome, failures are errors
    pub async fn trace(&self, request: TraceRequest) -> Result<TraceOutcome> {
        let (result, stages) = self.execute(request).await;
        result.map(|result| TraceOutcome { result, stages })
    }

    /// Run a trace, folding any failure into an error-status result
    pub async fn trace_or_report(&self, request: TraceRequest) -> TraceOutcome {
        let entry = request.entry.clone();
        let (result, stages) = self.execute(request).await;
        let result = result.unwrap_or_else(|e| TraceResult::failed(entry, e.report()));
        TraceOutcome { result, stages }
    }

    async fn execute(&self, request: TraceRequest) -> (Result<TraceResult>, Vec<TraceStage>) {
        let entry = request.entry.clone();
        let mut log = StageLog::new(self.logger.as_ref());

        let result = with_deadline(
            "trace",
            self.config.timeouts.trace(),
            self.run(request, &mut log),
        )
        .await;

        if let Err(e) = &result {
            log.enter(
                TraceStage::Error,
                &[("entry", &entry), ("kind", &e.kind()), ("error", e)],
            );
        }
        (result, log.stages)
    }

    async fn run(&self, request: TraceRequest, log: &mut StageLog<'_>) -> Result<TraceResult> {
        log.enter(TraceStage::Start, &[("entry", &request.entry)]);

        log.enter(TraceStage::Normalizing, &[]);
        let normalized = {
            let entry = request.entry.clone();
            let root = request.root.clone();
            with_blocking_deadline("normalize", self.config.timeouts.normalize(), move || {
                Ok(normalize(&entry, &root))
            })
            .await?
        };

        log.enter(
            TraceStage::Resolving,
            &[
                ("normalized", &normalized.normalized),
                ("exists", &normalized.exists),
            ],
        );
        let index = self.load_index(&request).await?;
        let candidates = resolve(&normalized, &index);
        let pick_first = request
            .pick_first
            .unwrap_or(self.config.resolver.pick_first);

        let chosen = match self.choose(&request, &candidates, pick_first).await? {
            Some(chosen) => chosen,
            None => {
                let ties = top_ties(&candidates).to_vec();
                let count = ties.len();
                log.enter(TraceStage::Ambiguous, &[("candidates", &count)]);
                return Ok(TraceResult::ambiguous(request.entry, ties));
            }
        };

        log.enter(
            TraceStage::Traversing,
            &[("resolved", &chosen.path), ("reason", &chosen.reason)],
        );
        let deps = collect_deps(&index, &chosen.path, self.config.index.max_depth);
        let components_prefix = format!(
            "{}/",
            self.config.planner.components_dir.trim_end_matches('/')
        );
        let component_references: Vec<String> = deps
            .reverse
            .iter()
            .filter(|id| id.starts_with(&components_prefix))
            .cloned()
            .collect();

        let mut result = TraceResult::resolved(request.entry, chosen.path.clone(), deps);
        if !component_references.is_empty() {
            result.component_references = Some(component_references);
        }

        if request.plan {
            let name = candidate_key(&chosen.path);
            log.enter(TraceStage::Planning, &[("component", &name)]);
            result.plan = Some(self.planner.plan(&index, &chosen.path, &name)?);
        }

        let counts = result.counts;
        log.enter(
            TraceStage::Done,
            &[
                ("direct", &counts.direct),
                ("transitive", &counts.transitive),
                ("reverse", &counts.reverse),
            ],
        );
        Ok(result)
    }

    async fn load_index(&self, request: &TraceRequest) -> Result<DependencyIndex> {
        let path = self.config.index_path(&request.root);
        let max_age = Duration::from_millis(self.config.index.max_age_ms);

        let index = with_blocking_deadline("index_read", self.config.timeouts.index_read(), {
            let path = path.clone();
            move || read_index_or_throw(&path, max_age)
        })
        .await?;

        let shown = path.display();
        self.logger.debug(
            "index loaded",
            &[
                ("path", &shown),
                ("files", &index.stats.files),
                ("age_ms", &index.stats.age_ms),
            ],
        );
        Ok(index)
    }

    /// Settle on one candidate, or `None` when the tie stays unresolved
    async fn choose(
        &self,
        request: &TraceRequest,
        candidates: &[Candidate],
        pick_first: bool,
    ) -> Result<Option<Candidate>> {
        let ties = top_ties(candidates);
        if ties.len() <= 1 || pick_first {
            return select(&request.entry, candidates, pick_first).map(Some);
        }

        let tied: Vec<String> = ties.iter().map(|c| c.path.clone()).collect();
        let remember = self.config.resolver.remember_choices;
        let choices_path = Config::choices_path(&request.root);

        if let Some(wanted) = &request.choose {
            match ties.iter().find(|c| &c.path == wanted) {
                Some(candidate) => {
                    if remember {
                        let mut cache = self.load_choices(&choices_path).await?;
                        cache.remember(&request.entry, &tied, &candidate.path);
                        if let Err(e) = self.save_choices(cache).await {
                            self.logger
                                .warn("could not save choice", &[("error", &e)]);
                        }
                    }
                    return Ok(Some(candidate.clone()));
                }
                None => {
                    self.logger.warn(
                        "chosen path is not among the tied candidates",
                        &[("choice", wanted)],
                    );
                }
            }
        }

        if remember {
            let cache = self.load_choices(&choices_path).await?;
            if let Some(path) = cache.get(&request.entry, &tied) {
                self.logger
                    .debug("using remembered choice", &[("path", &path)]);
                return Ok(ties.iter().find(|c| c.path == path).cloned());
            }
        }

        Ok(None)
    }

    async fn load_choices(&self, path: &Path) -> Result<ChoiceCache> {
        let path = path.to_path_buf();
        let logger = self.logger.clone();
        with_blocking_deadline("choices_read", self.config.timeouts.index_read(), move || {
            Ok(ChoiceCache::load(&path, logger.as_ref()))
        })
        .await
    }

    async fn save_choices(&self, cache: ChoiceCache) -> Result<()> {
        with_blocking_deadline("choices_write", self.config.timeouts.index_read(), move || {
            cache.save()
        })
        .await
    }
}
