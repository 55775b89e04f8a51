use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::engine::board::Board;
use crate::engine::operator::Operator;
use crate::engine::problem::Problem;
use crate::engine::scheduler::Scheduler;

pub const STEP_INTERVAL: Duration = Duration::from_millis(400);
pub const SOLUTION_DELAY: Duration = Duration::from_millis(50);
pub const ARC_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HintRole {
    Intermediate,
    Final,
    Solution,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HintStep {
    pub target: u32,
    pub role: HintRole,
    pub label: Option<String>,
}

/// What a cell currently shows while a hint is visible.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HintHighlight {
    pub role: HintRole,
    pub label: Option<String>,
}

/// Values visited while counting from the first operand to the answer,
/// clipped to the board.
pub fn step_values(problem: &Problem, board: Board) -> Vec<u32> {
    let a = problem.operand1;
    let b = problem.operand2;
    let raw: Vec<i64> = match problem.operator {
        Operator::Add => (1..=b).map(|i| a as i64 + i as i64).collect(),
        Operator::Sub => (1..=b).map(|i| a as i64 - i as i64).collect(),
        Operator::Mul => (1..=b).map(|i| a as i64 * i as i64).collect(),
        Operator::Div => {
            let n = a.checked_div(b).unwrap_or(0);
            (1..=n).map(|i| b as i64 * i as i64).collect()
        }
    };
    raw.into_iter()
        .filter(|&v| v >= 1 && v <= board.max() as i64)
        .map(|v| v as u32)
        .collect()
}

/// The ordered reveal sequence for one problem.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HintPlan {
    pub steps: Vec<HintStep>,
    /// Cell tagged as the solution once every step is shown.
    pub solution: Option<u32>,
}

impl HintPlan {
    pub fn for_problem(problem: &Problem, board: Board) -> Self {
        let values = step_values(problem, board);
        let last = values.len().saturating_sub(1);
        let counted = problem.operator == Operator::Div;
        let steps = values
            .iter()
            .enumerate()
            .map(|(i, &target)| HintStep {
                target,
                role: if i == last {
                    HintRole::Final
                } else {
                    HintRole::Intermediate
                },
                label: counted.then(|| (i + 1).to_string()),
            })
            .collect();

        let answer = problem.correct_answer();
        Self {
            steps,
            solution: board.contains(answer).then_some(answer),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step `index` (0-based) appears `(index + 1) * 400ms` after start.
    pub fn step_delay(index: usize) -> Duration {
        STEP_INTERVAL * (index as u32 + 1)
    }

    pub fn duration(&self) -> Duration {
        STEP_INTERVAL * self.steps.len() as u32
    }

    pub fn solution_delay(&self) -> Duration {
        self.duration() + SOLUTION_DELAY
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Cell centres of the single-row number line, in canvas units: x grows to
/// the right in columns, y grows upward from the top edge of the cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineGeometry {
    pub max: u32,
    pub cell_width: f64,
    pub max_rise: f64,
}

impl LineGeometry {
    const MIN_CELL_WIDTH: u16 = 3;

    /// Geometry for a board drawn across `width` columns with `height` rows
    /// of room above it. `None` when the area cannot hold the line.
    pub fn fit(board: Board, width: u16, height: u16) -> Option<Self> {
        let max = board.max();
        let cell = width / max as u16;
        if cell < Self::MIN_CELL_WIDTH || height < 2 {
            return None;
        }
        Some(Self {
            max,
            cell_width: cell as f64,
            max_rise: height as f64,
        })
    }

    pub fn width(&self) -> f64 {
        self.cell_width * self.max as f64
    }

    /// Centre of `value`'s cell; 0 sits on the left edge of cell 1.
    pub fn center(&self, value: u32) -> Option<Point> {
        if value > self.max {
            return None;
        }
        let x = if value == 0 {
            0.0
        } else {
            (value as f64 - 0.5) * self.cell_width
        };
        Some(Point { x, y: 0.0 })
    }
}

/// One curved jump between two positions on the line.
#[derive(Clone, Debug, PartialEq)]
pub struct Arc {
    pub from: u32,
    pub to: u32,
    pub start: Point,
    pub control: Point,
    pub end: Point,
    pub label: String,
    pub delay: Duration,
}

impl Arc {
    pub fn point_at(&self, t: f64) -> Point {
        let u = 1.0 - t;
        Point {
            x: u * u * self.start.x + 2.0 * u * t * self.control.x + t * t * self.end.x,
            y: u * u * self.start.y + 2.0 * u * t * self.control.y + t * t * self.end.y,
        }
    }

    pub fn apex(&self) -> Point {
        Point {
            x: (self.start.x + self.end.x) / 2.0,
            y: 0.25 * self.start.y + 0.5 * self.control.y + 0.25 * self.end.y,
        }
    }

    pub fn sample(&self, segments: usize) -> Vec<Point> {
        let n = segments.max(1);
        (0..=n).map(|i| self.point_at(i as f64 / n as f64)).collect()
    }
}

pub fn arc_jumps(problem: &Problem, board: Board) -> Vec<(u32, u32)> {
    let a = problem.operand1 as i64;
    let b = problem.operand2 as i64;
    let jumps: Vec<(i64, i64)> = match problem.operator {
        Operator::Add => (0..b).map(|i| (a + i, a + i + 1)).collect(),
        Operator::Sub => (0..b).map(|i| (a - i, a - i - 1)).collect(),
        Operator::Mul => (0..b).map(|i| (a * i, a * (i + 1))).collect(),
        Operator::Div if b > 0 => (0..a / b).map(|i| (b * i, b * (i + 1))).collect(),
        Operator::Div => Vec::new(),
    };
    let max = board.max() as i64;
    jumps
        .into_iter()
        .filter(|&(from, to)| (0..=max).contains(&from) && (0..=max).contains(&to))
        .map(|(from, to)| (from as u32, to as u32))
        .collect()
}

pub fn build_arcs(problem: &Problem, board: Board, geometry: &LineGeometry) -> Vec<Arc> {
    arc_jumps(problem, board)
        .into_iter()
        .enumerate()
        .filter_map(|(i, (from, to))| {
            let start = geometry.center(from)?;
            let end = geometry.center(to)?;
            let rise = geometry.max_rise.min((end.x - start.x).abs() * 0.5);
            Some(Arc {
                from,
                to,
                start,
                control: Point {
                    x: (start.x + end.x) / 2.0,
                    y: start.y + rise,
                },
                end,
                label: (i + 1).to_string(),
                delay: ARC_INTERVAL * i as u32,
            })
        })
        .collect()
}

/// How the hint is drawn on the current board.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HintLayout {
    /// Tag cells one at a time.
    Cells,
    /// Draw arcs along a single row; `None` when the geometry is unknown.
    Arcs(Option<LineGeometry>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HintEvent {
    Reveal(usize),
    Solution,
    ShowArc(usize),
    Complete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Running,
}

pub struct HintSequencer {
    state: SequencerState,
    timers: Scheduler<HintEvent>,
    plan: HintPlan,
    arcs: Vec<Arc>,
    visible_arcs: usize,
    highlights: BTreeMap<u32, HintHighlight>,
}

impl Default for HintSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl HintSequencer {
    pub fn new() -> Self {
        Self {
            state: SequencerState::Idle,
            timers: Scheduler::new(),
            plan: HintPlan::default(),
            arcs: Vec::new(),
            visible_arcs: 0,
            highlights: BTreeMap::new(),
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SequencerState::Running
    }

    pub fn highlights(&self) -> &BTreeMap<u32, HintHighlight> {
        &self.highlights
    }

    pub fn highlight(&self, value: u32) -> Option<&HintHighlight> {
        self.highlights.get(&value)
    }

    pub fn visible_arcs(&self) -> &[Arc] {
        &self.arcs[..self.visible_arcs]
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    /// Begin a new sequence. Ignored while one is already running. Returns
    /// whether the sequencer is now running.
    pub fn start(&mut self, now: Instant, problem: &Problem, board: Board, layout: HintLayout) -> bool {
        if self.is_running() {
            return false;
        }
        self.cancel();

        match layout {
            HintLayout::Cells => {
                let plan = HintPlan::for_problem(problem, board);
                if plan.is_empty() {
                    return false;
                }
                for i in 0..plan.steps.len() {
                    self.timers
                        .schedule(now, HintPlan::step_delay(i), HintEvent::Reveal(i));
                }
                self.timers
                    .schedule(now, plan.solution_delay(), HintEvent::Solution);
                self.timers
                    .schedule(now, plan.solution_delay(), HintEvent::Complete);
                self.plan = plan;
            }
            HintLayout::Arcs(geometry) => {
                let Some(geometry) = geometry else {
                    tracing::debug!("no line geometry, skipping arc hint");
                    return false;
                };
                let arcs = build_arcs(problem, board, &geometry);
                if arcs.is_empty() {
                    return false;
                }
                for (i, arc) in arcs.iter().enumerate() {
                    self.timers.schedule(now, arc.delay, HintEvent::ShowArc(i));
                }
                self.timers
                    .schedule(now, ARC_INTERVAL * arcs.len() as u32, HintEvent::Complete);
                self.arcs = arcs;
            }
        }

        tracing::debug!(pending = self.timers.pending(), "hint sequence started");
        self.state = SequencerState::Running;
        true
    }

    /// Abort any sequence and clear what it showed.
    pub fn cancel(&mut self) {
        let dropped = self.timers.cancel_all();
        if dropped > 0 {
            tracing::debug!(dropped, "hint sequence cancelled");
        }
        self.state = SequencerState::Idle;
        self.plan = HintPlan::default();
        self.arcs.clear();
        self.visible_arcs = 0;
        self.highlights.clear();
    }

    /// Fire due reveals. Returns true when anything visible changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let due = self.timers.drain_due(now);
        let changed = !due.is_empty();
        for event in due {
            match event {
                HintEvent::Reveal(i) => {
                    if let Some(step) = self.plan.steps.get(i) {
                        self.highlights.insert(
                            step.target,
                            HintHighlight {
                                role: step.role,
                                label: step.label.clone(),
                            },
                        );
                    }
                }
                HintEvent::Solution => {
                    if let Some(value) = self.plan.solution {
                        let label = self.highlights.get(&value).and_then(|h| h.label.clone());
                        self.highlights.insert(
                            value,
                            HintHighlight {
                                role: HintRole::Solution,
                                label,
                            },
                        );
                    }
                }
                HintEvent::ShowArc(i) => {
                    self.visible_arcs = (i + 1).min(self.arcs.len());
                }
                HintEvent::Complete => {
                    self.state = SequencerState::Idle;
                }
            }
        }
        changed
    }
}
