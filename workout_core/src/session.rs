//! Active training session state machine.
//!
//! A session walks the plan's flattened exercise list set by set:
//!
//! ```text
//! Idle -> Exercising -> Resting -> Exercising -> ... -> Completed
//! ```
//!
//! Rest never auto-starts: a rest interval opens paused and counts down
//! only after [`Session::resume`]. The countdown is driven by an injected
//! [`RestClock`]; the session stops that clock on every exit path,
//! including drop.

use crate::{cost, Error, FlatExercise, HistoryEntry, HistoryLog, Result, WorkoutPlan};
use chrono::{Datelike, NaiveDate};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::{Duration, Instant};
use uuid::Uuid;

// ============================================================================
// Rest clock
// ============================================================================

/// One-second tick source for rest countdowns
pub trait RestClock {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
    /// Whole seconds elapsed since the last call while running
    fn take_ticks(&mut self) -> u32;
}

#[derive(Debug, Default)]
struct ManualClockState {
    running: bool,
    pending: u32,
    starts: u32,
    stops: u32,
}

/// Clock advanced by hand. Clones share state, so a test can keep a
/// handle while the session owns another.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    inner: Rc<RefCell<ManualClockState>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `seconds` pass; ignored while stopped
    pub fn advance(&self, seconds: u32) {
        let mut state = self.inner.borrow_mut();
        if state.running {
            state.pending += seconds;
        }
    }

    pub fn starts(&self) -> u32 {
        self.inner.borrow().starts
    }

    pub fn stops(&self) -> u32 {
        self.inner.borrow().stops
    }
}

impl RestClock for ManualClock {
    fn start(&mut self) {
        let mut state = self.inner.borrow_mut();
        state.running = true;
        state.starts += 1;
    }

    fn stop(&mut self) {
        let mut state = self.inner.borrow_mut();
        if state.running {
            state.stops += 1;
        }
        state.running = false;
        state.pending = 0;
    }

    fn is_running(&self) -> bool {
        self.inner.borrow().running
    }

    fn take_ticks(&mut self) -> u32 {
        std::mem::take(&mut self.inner.borrow_mut().pending)
    }
}

/// Wall-clock ticks measured with [`Instant`]
#[derive(Debug, Default)]
pub struct SystemClock {
    anchor: Option<Instant>,
}

impl RestClock for SystemClock {
    fn start(&mut self) {
        if self.anchor.is_none() {
            self.anchor = Some(Instant::now());
        }
    }

    fn stop(&mut self) {
        self.anchor = None;
    }

    fn is_running(&self) -> bool {
        self.anchor.is_some()
    }

    fn take_ticks(&mut self) -> u32 {
        let Some(anchor) = self.anchor else {
            return 0;
        };
        let secs = anchor.elapsed().as_secs();
        if secs > 0 {
            self.anchor = Some(anchor + Duration::from_secs(secs));
        }
        u32::try_from(secs).unwrap_or(u32::MAX)
    }
}

// ============================================================================
// State
// ============================================================================

/// Countdown shown between sets
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RestTimer {
    pub remaining: u32,
    pub total: u32,
    pub paused: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Exercising,
    Resting(RestTimer),
    Completed,
}

impl SessionPhase {
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::Exercising => "exercising",
            SessionPhase::Resting(_) => "resting",
            SessionPhase::Completed => "completed",
        }
    }
}

/// What a transition did, for the caller to render
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    RestStarted { seconds: u32 },
    RestPaused,
    RestResumed,
    RestRestarted,
    RestTick { remaining: u32 },
    /// Rest is over; the caller should sound the alert
    RestFinished,
    ExerciseStarted { index: usize, name: String },
    Completed,
}

/// Display snapshot of a running session
#[derive(Clone, Debug, PartialEq)]
pub struct SessionProgress {
    pub exercise_idx: usize,
    pub exercise_count: usize,
    pub set_idx: u32,
    pub total_sets: u32,
    pub exercise: String,
    pub phase: SessionPhase,
}

pub struct Session<C: RestClock> {
    plan: WorkoutPlan,
    exercises: Vec<FlatExercise>,
    exercise_idx: usize,
    set_idx: u32,
    phase: SessionPhase,
    date: NaiveDate,
    clock: C,
}

impl<C: RestClock> std::fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("plan", &self.plan.id)
            .field("exercise_idx", &self.exercise_idx)
            .field("set_idx", &self.set_idx)
            .field("phase", &self.phase)
            .finish()
    }
}

impl<C: RestClock> Session<C> {
    /// Begin a session for `plan` on `today`.
    ///
    /// Fails when the plan is not scheduled for today's weekday or when a
    /// visible history entry already records it for today.
    pub fn start(plan: &WorkoutPlan, history: &HistoryLog, today: NaiveDate, mut clock: C) -> Result<Self> {
        let weekday = today.weekday();
        if !plan.is_scheduled_on(weekday) {
            return Err(Error::WrongDay(weekday));
        }
        if history.has_visible_entry(plan.id, today) {
            return Err(Error::AlreadyDoneToday(today));
        }

        let exercises = plan.flattened();
        if exercises.is_empty() {
            return Err(Error::Validation("plan has no exercises".into()));
        }
        if let Some(ex) = exercises.iter().find(|e| e.params.sets == 0) {
            return Err(Error::Validation(format!("'{}' has no sets", ex.name)));
        }

        clock.stop();
        tracing::info!(
            "Starting session for plan {} with {} exercises",
            plan.id,
            exercises.len()
        );

        Ok(Self {
            plan: plan.clone(),
            exercises,
            exercise_idx: 0,
            set_idx: 0,
            phase: SessionPhase::Exercising,
            date: today,
            clock,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_completed(&self) -> bool {
        self.phase == SessionPhase::Completed
    }

    pub fn plan(&self) -> &WorkoutPlan {
        &self.plan
    }

    pub fn exercises(&self) -> &[FlatExercise] {
        &self.exercises
    }

    pub fn current_exercise(&self) -> &FlatExercise {
        &self.exercises[self.exercise_idx]
    }

    pub fn exercise_idx(&self) -> usize {
        self.exercise_idx
    }

    pub fn set_idx(&self) -> u32 {
        self.set_idx
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn progress(&self) -> SessionProgress {
        let current = self.current_exercise();
        SessionProgress {
            exercise_idx: self.exercise_idx,
            exercise_count: self.exercises.len(),
            set_idx: self.set_idx,
            total_sets: current.params.sets,
            exercise: current.name.clone(),
            phase: self.phase,
        }
    }

    fn rest_timer_mut(&mut self, action: &'static str) -> Result<&mut RestTimer> {
        match &mut self.phase {
            SessionPhase::Resting(timer) => Ok(timer),
            other => Err(Error::guard(action, other.label())),
        }
    }

    fn end_rest(&mut self) -> SessionEvent {
        self.clock.stop();
        self.phase = SessionPhase::Exercising;
        tracing::debug!(
            "Rest over, set {} of '{}'",
            self.set_idx + 1,
            self.current_exercise().name
        );
        SessionEvent::RestFinished
    }

    /// Mark the current set done
    pub fn complete_set(&mut self) -> Result<SessionEvent> {
        if self.phase != SessionPhase::Exercising {
            return Err(Error::guard("complete a set", self.phase.label()));
        }

        let params = self.current_exercise().params;
        debug_assert!(self.set_idx < params.sets, "set index past last set");

        if let Some(rest) = cost::rest_after_set(&params, self.set_idx) {
            self.set_idx += 1;
            self.clock.stop();
            self.phase = SessionPhase::Resting(RestTimer {
                remaining: rest,
                total: rest,
                paused: true,
            });
            tracing::debug!("Set done, {}s rest ready", rest);
            return Ok(SessionEvent::RestStarted { seconds: rest });
        }

        if self.exercise_idx + 1 < self.exercises.len() {
            self.exercise_idx += 1;
            self.set_idx = 0;
            let name = self.current_exercise().name.clone();
            tracing::debug!("Moving to exercise {}: '{}'", self.exercise_idx, name);
            return Ok(SessionEvent::ExerciseStarted {
                index: self.exercise_idx,
                name,
            });
        }

        self.clock.stop();
        self.phase = SessionPhase::Completed;
        tracing::info!("Session for plan {} completed", self.plan.id);
        Ok(SessionEvent::Completed)
    }

    pub fn pause(&mut self) -> Result<SessionEvent> {
        let timer = self.rest_timer_mut("pause rest")?;
        if timer.paused {
            return Err(Error::guard("pause rest", "rest is already paused"));
        }
        timer.paused = true;
        self.clock.stop();
        Ok(SessionEvent::RestPaused)
    }

    pub fn resume(&mut self) -> Result<SessionEvent> {
        let timer = self.rest_timer_mut("resume rest")?;
        if !timer.paused {
            return Err(Error::guard("resume rest", "rest is already running"));
        }
        timer.paused = false;
        self.clock.start();
        Ok(SessionEvent::RestResumed)
    }

    /// Pause if running, resume if paused
    pub fn toggle_pause(&mut self) -> Result<SessionEvent> {
        if self.rest_timer_mut("toggle rest")?.paused {
            self.resume()
        } else {
            self.pause()
        }
    }

    /// Back to the full rest duration, paused
    pub fn restart(&mut self) -> Result<SessionEvent> {
        let timer = self.rest_timer_mut("restart rest")?;
        timer.remaining = timer.total;
        timer.paused = true;
        self.clock.stop();
        Ok(SessionEvent::RestRestarted)
    }

    /// End the rest immediately
    pub fn skip(&mut self) -> Result<SessionEvent> {
        let timer = self.rest_timer_mut("skip rest")?;
        timer.remaining = 0;
        Ok(self.end_rest())
    }

    /// Advance a running rest countdown by one second.
    ///
    /// Ticks arriving while paused or outside a rest are stale and ignored.
    pub fn tick(&mut self) -> Option<SessionEvent> {
        let SessionPhase::Resting(timer) = &mut self.phase else {
            return None;
        };
        if timer.paused {
            return None;
        }
        timer.remaining = timer.remaining.saturating_sub(1);
        if timer.remaining == 0 {
            return Some(self.end_rest());
        }
        Some(SessionEvent::RestTick {
            remaining: timer.remaining,
        })
    }

    /// Feed every tick the clock has accumulated into [`Session::tick`]
    pub fn poll(&mut self) -> Vec<SessionEvent> {
        let ticks = self.clock.take_ticks();
        let mut events = Vec::new();
        for _ in 0..ticks {
            match self.tick() {
                Some(event) => {
                    let done = event == SessionEvent::RestFinished;
                    events.push(event);
                    if done {
                        break;
                    }
                }
                None => break,
            }
        }
        events
    }

    /// Drop the session without recording anything
    pub fn abandon(self) {
        tracing::info!(
            "Abandoned session for plan {} at exercise {}",
            self.plan.id,
            self.exercise_idx
        );
    }

    /// Record the completed session.
    ///
    /// Every flattened exercise gets a key; exercises missing from
    /// `weights` are stored blank. Consumes the session.
    pub fn finish(self, weights: &BTreeMap<String, f64>) -> Result<HistoryEntry> {
        if !self.is_completed() {
            return Err(Error::guard("finish the session", self.phase.label()));
        }

        for name in weights.keys() {
            if !self.exercises.iter().any(|e| &e.name == name) {
                tracing::warn!("Ignoring weight for '{}', not part of this session", name);
            }
        }

        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            plan_id: self.plan.id,
            weekdays: self.plan.weekdays.clone(),
            groups: self.plan.groups.clone(),
            sub_groups: self.plan.sub_groups(),
            date: self.date,
            weights: self
                .exercises
                .iter()
                .map(|e| (e.name.clone(), weights.get(&e.name).copied()))
                .collect(),
            visible: true,
        };
        tracing::info!("Recorded history entry {} for plan {}", entry.id, entry.plan_id);
        Ok(entry)
    }
}

impl<C: RestClock> Drop for Session<C> {
    fn drop(&mut self) {
        self.clock.stop();
    }
}

// ============================================================================
// Single-session slot
// ============================================================================

/// Holds at most one session at a time
pub struct ActiveSession<C: RestClock> {
    current: Option<Session<C>>,
}

impl<C: RestClock> Default for ActiveSession<C> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<C: RestClock> ActiveSession<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    pub fn session(&self) -> Option<&Session<C>> {
        self.current.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut Session<C>> {
        self.current.as_mut()
    }

    /// Start a session. Refused while another one is still in progress; a
    /// completed one that was never saved is discarded.
    pub fn begin(
        &mut self,
        plan: &WorkoutPlan,
        history: &HistoryLog,
        today: NaiveDate,
        clock: C,
    ) -> Result<&mut Session<C>> {
        if let Some(existing) = &self.current {
            if !existing.is_completed() {
                return Err(Error::guard("start a new session", existing.phase.label()));
            }
            tracing::warn!(
                "Discarding unsaved completed session for plan {}",
                existing.plan.id
            );
        }
        let session = Session::start(plan, history, today, clock)?;
        Ok(self.current.insert(session))
    }

    /// Returns whether a session was dropped
    pub fn abandon(&mut self) -> bool {
        match self.current.take() {
            Some(session) => {
                session.abandon();
                true
            }
            None => false,
        }
    }

    /// Record the completed session and return to idle
    pub fn finish(&mut self, weights: &BTreeMap<String, f64>) -> Result<HistoryEntry> {
        match &self.current {
            None => return Err(Error::guard("finish the session", "idle")),
            Some(s) if !s.is_completed() => {
                return Err(Error::guard("finish the session", s.phase.label()))
            }
            Some(_) => {}
        }
        match self.current.take() {
            Some(session) => session.finish(weights),
            None => Err(Error::guard("finish the session", "idle")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::tests::entry;
    use crate::taxonomy::MuscleGroup;
    use crate::{ExerciseParams, PlanSubGroup, PlannedExercise};
    use chrono::{Utc, Weekday};

    // 2024-03-04 is a Monday
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    fn ex(name: &str, sets: u32, rest: u32) -> PlannedExercise {
        PlannedExercise {
            name: name.into(),
            params: ExerciseParams { sets, reps: 10, time_per_set: 40, rest },
        }
    }

    fn plan() -> WorkoutPlan {
        WorkoutPlan {
            id: Uuid::new_v4(),
            weekdays: vec![Weekday::Mon, Weekday::Thu],
            groups: vec![MuscleGroup::Chest, MuscleGroup::Arms],
            exercises: vec![
                PlanSubGroup {
                    sub_group: "Peitoral Médio".into(),
                    exercises: vec![ex("Supino Reto", 3, 60), ex("Crucifixo", 1, 45)],
                },
                PlanSubGroup {
                    sub_group: "Tríceps".into(),
                    exercises: vec![ex("Tríceps Pulley", 2, 30)],
                },
            ],
            created_at: Utc::now(),
        }
    }

    fn started(clock: &ManualClock) -> Session<ManualClock> {
        Session::start(&plan(), &HistoryLog::new(), monday(), clock.clone()).unwrap()
    }

    #[test]
    fn test_wrong_day_rejected() {
        let tuesday = monday().succ_opt().unwrap();
        let err = Session::start(&plan(), &HistoryLog::new(), tuesday, ManualClock::new()).unwrap_err();
        assert!(matches!(err, Error::WrongDay(Weekday::Tue)));
    }

    #[test]
    fn test_same_day_guard_respects_visibility() {
        let plan = plan();
        let mut history = HistoryLog::new();
        let done = entry(plan.id, monday(), &[("Supino Reto", Some(70.0))]);
        let done_id = done.id;
        history.append(done);

        let err = Session::start(&plan, &history, monday(), ManualClock::new()).unwrap_err();
        assert!(matches!(err, Error::AlreadyDoneToday(d) if d == monday()));

        history.set_visible(done_id, false).unwrap();
        assert!(Session::start(&plan, &history, monday(), ManualClock::new()).is_ok());
    }

    #[test]
    fn test_rest_opens_paused() {
        let clock = ManualClock::new();
        let mut session = started(&clock);

        assert_eq!(session.complete_set().unwrap(), SessionEvent::RestStarted { seconds: 60 });
        assert_eq!(
            session.phase(),
            SessionPhase::Resting(RestTimer { remaining: 60, total: 60, paused: true })
        );
        assert!(!clock.is_running());
        assert_eq!(session.set_idx(), 1);

        // Nothing counts down until resumed
        clock.advance(10);
        assert!(session.poll().is_empty());
        assert_eq!(session.tick(), None);
    }

    #[test]
    fn test_countdown_finishes_rest_with_alert() {
        let clock = ManualClock::new();
        let mut session = started(&clock);
        session.complete_set().unwrap();

        session.resume().unwrap();
        assert!(clock.is_running());

        clock.advance(59);
        let events = session.poll();
        assert_eq!(events.len(), 59);
        assert_eq!(events.last(), Some(&SessionEvent::RestTick { remaining: 1 }));

        clock.advance(5);
        assert_eq!(session.poll(), vec![SessionEvent::RestFinished]);
        assert_eq!(session.phase(), SessionPhase::Exercising);
        assert!(!clock.is_running());
    }

    #[test]
    fn test_pause_restart_skip() {
        let clock = ManualClock::new();
        let mut session = started(&clock);
        session.complete_set().unwrap();

        session.toggle_pause().unwrap();
        clock.advance(20);
        session.poll();
        assert_eq!(session.toggle_pause().unwrap(), SessionEvent::RestPaused);
        clock.advance(20);
        assert!(session.poll().is_empty());
        assert!(matches!(session.phase(), SessionPhase::Resting(t) if t.remaining == 40 && t.paused));

        assert_eq!(session.restart().unwrap(), SessionEvent::RestRestarted);
        assert_eq!(
            session.phase(),
            SessionPhase::Resting(RestTimer { remaining: 60, total: 60, paused: true })
        );

        assert_eq!(session.skip().unwrap(), SessionEvent::RestFinished);
        assert_eq!(session.phase(), SessionPhase::Exercising);
    }

    #[test]
    fn test_illegal_transitions_leave_state_alone() {
        let clock = ManualClock::new();
        let mut session = started(&clock);

        for result in [session.pause(), session.resume(), session.restart(), session.skip()] {
            assert!(matches!(result, Err(Error::GuardViolation { state: "exercising", .. })));
        }
        assert_eq!(session.phase(), SessionPhase::Exercising);

        session.complete_set().unwrap();
        let before = session.progress();
        assert!(matches!(
            session.complete_set(),
            Err(Error::GuardViolation { state: "resting", .. })
        ));
        assert!(session.pause().is_err());
        assert_eq!(session.progress(), before);
    }

    #[test]
    fn test_every_set_visited_once_in_order() {
        let clock = ManualClock::new();
        let mut session = started(&clock);
        let mut visited = Vec::new();
        let mut last = (0, 0);

        loop {
            let position = (session.exercise_idx(), session.set_idx());
            assert!(position >= last, "went backwards: {:?} -> {:?}", last, position);
            last = position;
            visited.push((session.current_exercise().name.clone(), session.set_idx()));

            match session.complete_set().unwrap() {
                SessionEvent::RestStarted { .. } => {
                    session.skip().unwrap();
                }
                SessionEvent::Completed => break,
                SessionEvent::ExerciseStarted { .. } => {}
                other => panic!("unexpected event {:?}", other),
            }
        }

        let expected = vec![
            ("Supino Reto".to_string(), 0),
            ("Supino Reto".to_string(), 1),
            ("Supino Reto".to_string(), 2),
            ("Crucifixo".to_string(), 0),
            ("Tríceps Pulley".to_string(), 0),
            ("Tríceps Pulley".to_string(), 1),
        ];
        assert_eq!(visited, expected);
        assert!(session.is_completed());
        assert!(session.complete_set().is_err());
    }

    #[test]
    fn test_last_set_moves_on_without_rest() {
        let clock = ManualClock::new();
        let mut session = started(&clock);
        for _ in 0..2 {
            session.complete_set().unwrap();
            session.skip().unwrap();
        }
        assert_eq!(
            session.complete_set().unwrap(),
            SessionEvent::ExerciseStarted { index: 1, name: "Crucifixo".into() }
        );
        assert_eq!(session.set_idx(), 0);
    }

    fn run_to_completion(session: &mut Session<ManualClock>) {
        while !session.is_completed() {
            if let SessionEvent::RestStarted { .. } = session.complete_set().unwrap() {
                session.skip().unwrap();
            }
        }
    }

    #[test]
    fn test_finish_snapshots_plan() {
        let clock = ManualClock::new();
        let mut session = started(&clock);
        let plan_id = session.plan().id;
        run_to_completion(&mut session);

        let weights = BTreeMap::from([
            ("Supino Reto".to_string(), 72.5),
            ("Agachamento".to_string(), 100.0),
        ]);
        let entry = session.finish(&weights).unwrap();

        assert_eq!(entry.plan_id, plan_id);
        assert_eq!(entry.date, monday());
        assert!(entry.visible);
        assert_eq!(entry.sub_groups, vec!["Peitoral Médio", "Tríceps"]);
        assert_eq!(entry.weights.len(), 3);
        assert_eq!(entry.weight_for("Supino Reto"), Some(72.5));
        assert_eq!(entry.weights.get("Crucifixo"), Some(&None));
        assert!(!entry.weights.contains_key("Agachamento"));
    }

    #[test]
    fn test_finish_before_completion_is_guarded() {
        let clock = ManualClock::new();
        let session = started(&clock);
        assert!(matches!(
            session.finish(&BTreeMap::new()),
            Err(Error::GuardViolation { .. })
        ));
    }

    #[test]
    fn test_clock_cancelled_when_session_dropped() {
        let clock = ManualClock::new();
        {
            let mut session = started(&clock);
            session.complete_set().unwrap();
            session.resume().unwrap();
            assert!(clock.is_running());
        }
        assert!(!clock.is_running());
        assert_eq!(clock.stops(), 1);
    }

    #[test]
    fn test_slot_allows_one_session() {
        let plan = plan();
        let history = HistoryLog::new();
        let mut slot = ActiveSession::new();

        let clock = ManualClock::new();
        slot.begin(&plan, &history, monday(), clock.clone()).unwrap().complete_set().unwrap();
        slot.session_mut().unwrap().resume().unwrap();

        let err = slot.begin(&plan, &history, monday(), ManualClock::new()).unwrap_err();
        assert!(matches!(err, Error::GuardViolation { .. }));
        assert!(clock.is_running());

        assert!(slot.abandon());
        assert!(!clock.is_running());
        assert!(slot.is_idle());
        assert!(!slot.abandon());
    }

    #[test]
    fn test_slot_discards_unsaved_completed_session() {
        let plan = plan();
        let history = HistoryLog::new();
        let mut slot = ActiveSession::new();

        let first_clock = ManualClock::new();
        let first = slot.begin(&plan, &history, monday(), first_clock.clone()).unwrap();
        first.complete_set().unwrap();
        first.resume().unwrap();
        assert!(first_clock.is_running());
        first.skip().unwrap();
        run_to_completion(first);
        assert!(slot.session().unwrap().is_completed());

        let second_clock = ManualClock::new();
        let session = slot.begin(&plan, &history, monday(), second_clock.clone()).unwrap();
        assert_eq!(session.phase(), SessionPhase::Exercising);
        assert_eq!((session.exercise_idx(), session.set_idx()), (0, 0));

        assert!(!first_clock.is_running());
        assert_eq!(first_clock.starts(), 1);
        assert_eq!(first_clock.stops(), 1);
        assert!(!slot.is_idle());
    }

    #[test]
    fn test_slot_failed_start_keeps_existing() {
        let plan = plan();
        let history = HistoryLog::new();
        let mut slot = ActiveSession::new();
        slot.begin(&plan, &history, monday(), ManualClock::new()).unwrap();

        let tuesday = monday().succ_opt().unwrap();
        let mut other = plan.clone();
        other.id = Uuid::new_v4();
        assert!(slot.begin(&other, &history, tuesday, ManualClock::new()).is_err());
        assert_eq!(slot.session().unwrap().plan().id, plan.id);
    }

    #[test]
    fn test_slot_finish() {
        let plan = plan();
        let mut history = HistoryLog::new();
        let mut slot = ActiveSession::new();

        assert!(slot.finish(&BTreeMap::new()).is_err());

        slot.begin(&plan, &history, monday(), ManualClock::new()).unwrap();
        assert!(matches!(
            slot.finish(&BTreeMap::new()),
            Err(Error::GuardViolation { state: "exercising", .. })
        ));
        assert!(!slot.is_idle());

        run_to_completion(slot.session_mut().unwrap());
        history.append(slot.finish(&BTreeMap::new()).unwrap());
        assert!(slot.is_idle());

        let err = slot.begin(&plan, &history, monday(), ManualClock::new()).unwrap_err();
        assert!(matches!(err, Error::AlreadyDoneToday(_)));
    }

    #[test]
    fn test_rest_costs_match_time_model() {
        // 4 sets, 40s each, 60s between: 160 + 180
        let params = ExerciseParams { sets: 4, reps: 8, time_per_set: 40, rest: 60 };
        let rests: u32 = (0..params.sets).filter_map(|i| cost::rest_after_set(&params, i)).sum();
        assert_eq!(u64::from(params.sets * params.time_per_set + rests), params.estimated_seconds());
        assert_eq!(params.estimated_seconds(), 340);
    }

    #[test]
    fn test_system_clock_idle_has_no_ticks() {
        let mut clock = SystemClock::default();
        assert_eq!(clock.take_ticks(), 0);
        clock.start();
        assert!(clock.is_running());
        clock.stop();
        assert_eq!(clock.take_ticks(), 0);
    }
}
