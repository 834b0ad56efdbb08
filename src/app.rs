use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use regex::Regex;
use tracing::info;

use crate::config::TableConfig;
use crate::controller::TableController;
use crate::error::{Error, Result};
use crate::filters::{ApplyOptions, FilterValues};
use crate::net::{MemoryRouter, ParamValue};
use crate::source::{FixtureRecord, FixtureSource, PageSource, QueryResultPage};
use crate::store::{CursorStore, FileStore, MemoryStore};
use crate::utils::PrintableReport;

/// Value a select filter uses for "no selection".
pub const ALL_SENTINEL: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLevel {
    /// Lines are clipped to the terminal width.
    Clipped,
    Full,
}

/// A user or browser action in a scripted session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Next,
    Previous,
    Reload,
    Back,
    Forward,
    Filter { key: String, value: String },
    Clear,
    PageSize(u32),
}

const STEP_PATTERN: &str = r"^(?:filter\s+(\w+)=(\S*)|page-size\s+(\d+)|(\w+))$";

impl Step {
    /// Parses a comma-separated script such as `next,next,prev,reload,filter status=active`.
    pub fn parse_script(script: &str) -> Result<Vec<Step>> {
        let re = Regex::new(STEP_PATTERN)?;
        script
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Step::parse_with(&re, s))
            .collect()
    }

    fn parse_with(re: &Regex, s: &str) -> Result<Self> {
        let caps = re
            .captures(s.trim())
            .ok_or_else(|| Error::Other(format!("invalid step: {:?}", s)))?;
        if let (Some(key), Some(value)) = (caps.get(1), caps.get(2)) {
            return Ok(Step::Filter {
                key: key.as_str().to_string(),
                value: value.as_str().to_string(),
            });
        }
        if let Some(size) = caps.get(3) {
            return Ok(Step::PageSize(size.as_str().parse()?));
        }
        match caps.get(4).map(|m| m.as_str()) {
            Some("next") => Ok(Step::Next),
            Some("prev" | "previous") => Ok(Step::Previous),
            Some("reload") => Ok(Step::Reload),
            Some("back") => Ok(Step::Back),
            Some("forward") => Ok(Step::Forward),
            Some("clear") => Ok(Step::Clear),
            _ => Err(Error::Other(format!("invalid step: {:?}", s))),
        }
    }
}

impl FromStr for Step {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Step::parse_with(&Regex::new(STEP_PATTERN)?, s)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Step::Next => write!(f, "next"),
            Step::Previous => write!(f, "prev"),
            Step::Reload => write!(f, "reload"),
            Step::Back => write!(f, "back"),
            Step::Forward => write!(f, "forward"),
            Step::Filter { key, value } => write!(f, "filter {}={}", key, value),
            Step::Clear => write!(f, "clear"),
            Step::PageSize(size) => write!(f, "page-size {}", size),
        }
    }
}

/// What one step left on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: String,
    pub location: String,
    pub current_page: u32,
    pub has_next_page: bool,
    pub history: Vec<String>,
    pub ids: Vec<u64>,
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let ids = self
            .ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        write!(
            f,
            "{:<18} page={:<3} next={:<5} depth={:<3} items=[{}] {}",
            self.step,
            self.current_page,
            self.has_next_page,
            self.history.len(),
            ids,
            self.location
        )
    }
}

impl PrintableReport for StepReport {}

#[derive(Debug, Clone)]
pub struct Config {
    pub table: TableConfig,
    pub initial_location: String,
    pub items: u64,
    /// Persist cursor histories here instead of in memory.
    pub state_dir: Option<PathBuf>,
    pub steps: Vec<Step>,
    pub report_level: ReportLevel,
}

#[derive(Debug)]
pub struct Runner {
    config: Config,
}

impl Runner {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<Vec<StepReport>> {
        let reports = match &self.config.state_dir {
            Some(dir) => self.run_with(FileStore::new(dir)?, Local::now().date_naive())?,
            None => self.run_with(MemoryStore::new(), Local::now().date_naive())?,
        };
        for report in &reports {
            report.print(self.config.report_level);
        }
        Ok(reports)
    }

    /// Plays the configured steps against a fixture backend.
    pub fn run_with<S: CursorStore>(&self, store: S, today: NaiveDate) -> Result<Vec<StepReport>> {
        let source = FixtureSource::new(self.config.items).with_cursor_key(&self.config.table.cursor_key);
        let router = MemoryRouter::with_initial_location(&self.config.initial_location)?;
        let mut table = TableController::new(self.config.table.clone(), router, store);

        let mut page = source.fetch(&table.request_params(today))?;
        let mut reports = vec![report("start", &table, &page)];

        for step in &self.config.steps {
            info!(%step, "step");
            match step {
                Step::Next => match &page.next_cursor {
                    Some(cursor) if table.controls(Some(cursor)).has_next_page => {
                        table.next_page(cursor)
                    }
                    _ => info!("already on the last page"),
                },
                Step::Previous => table.previous_page(),
                Step::Reload => {
                    let (router, store) = table.into_parts();
                    table = TableController::new(self.config.table.clone(), router, store);
                }
                Step::Back => {
                    table.back();
                }
                Step::Forward => {
                    table.forward();
                }
                Step::Filter { key, value } => {
                    let mut values = current_filters(&table);
                    if value.is_empty() || value == ALL_SENTINEL {
                        values.remove(key);
                    } else {
                        values.insert(key.clone(), ParamValue::from(value.as_str()));
                    }
                    table.apply_filters(&values, ApplyOptions::default());
                }
                Step::Clear => table.clear_filters(),
                Step::PageSize(size) => table.apply_page_size(*size),
            }
            page = source.fetch(&table.request_params(today))?;
            reports.push(report(&step.to_string(), &table, &page));
        }

        Ok(reports)
    }
}

/// Filters already in the URL, so editing one keeps the others.
fn current_filters<S: CursorStore>(table: &TableController<MemoryRouter, S>) -> FilterValues {
    table
        .view_state()
        .filters
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
}

fn report<S: CursorStore>(
    step: &str,
    table: &TableController<MemoryRouter, S>,
    page: &QueryResultPage<FixtureRecord>,
) -> StepReport {
    let controls = table.controls(page.next_cursor.as_ref());
    StepReport {
        step: step.to_string(),
        location: table.location().to_string(),
        current_page: controls.current_page,
        has_next_page: controls.has_next_page,
        history: table.pagination().state().history.clone(),
        ids: page.items.iter().map(|r| r.id).collect(),
    }
}
