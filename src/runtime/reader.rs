use super::{
    Action, AnimTarget, Condition, OngoingTransition, PlaybackMode, Scene, TickContext, Time,
    Transition,
};
use crate::configlang::{compile_script, ConfigError, Schema};

use bumpalo::collections::Vec as BumpVec;
use bumpalo::Bump;
use log::{debug, info, trace};
use std::mem;
use std::rc::Rc;

#[derive(Debug)]
struct ConditionalAction {
    condition: Condition,
    actions: Rc<[Action]>,
    registered_at: Option<u64>,
    last_mode: Option<PlaybackMode>,
    expired: bool,
}

impl ConditionalAction {
    fn new(condition: Condition, actions: Rc<[Action]>) -> Self {
        ConditionalAction {
            condition,
            actions,
            registered_at: None,
            last_mode: None,
            expired: false,
        }
    }

    fn check(&mut self, ctx: &TickContext) -> bool {
        self.registered_at.get_or_insert(ctx.tick);
        let met = self.condition.is_met(ctx, self.last_mode);
        self.last_mode = Some(ctx.mode);
        self.expired = self.condition.has_expired(ctx);
        met
    }
}

#[derive(Debug)]
struct PeriodicAction {
    interval: Time,
    actions: Rc<[Action]>,
    registered_at: Option<u64>,
    next_fire: u64,
}

impl PeriodicAction {
    fn new(interval: Time, actions: Rc<[Action]>) -> Self {
        PeriodicAction {
            interval,
            actions,
            registered_at: None,
            next_fire: 0,
        }
    }

    /// Fires at most once per check, whatever the number of boundaries crossed.
    fn check(&mut self, ctx: &TickContext) -> bool {
        let registered_at = match self.registered_at {
            Some(tick) => tick,
            None => {
                self.registered_at = Some(ctx.tick);
                self.next_fire = ctx.tick;
                ctx.tick
            }
        };
        if ctx.tick < self.next_fire {
            return false;
        }
        let interval = self.interval.whole_ticks(ctx).max(1);
        let periods = (ctx.tick - registered_at) / interval + 1;
        self.next_fire = registered_at.saturating_add(periods.saturating_mul(interval));
        true
    }
}

/// Registrations produced while actions run; applied once the pass is over.
#[derive(Debug, Default)]
struct Staged {
    conditionals: Vec<ConditionalAction>,
    periodics: Vec<PeriodicAction>,
    transitions: Vec<(AnimTarget, Transition)>,
}

impl Staged {
    fn has_registrations(&self) -> bool {
        !self.conditionals.is_empty() || !self.periodics.is_empty()
    }
}

/// Runs a compiled config script against playback.
#[derive(Debug, Default)]
pub struct Reader {
    scene: Scene,
    conditionals: Vec<ConditionalAction>,
    periodics: Vec<PeriodicAction>,
    transitions: Vec<OngoingTransition>,
    staged: Staged,
    scratch: Bump,
    last_ctx: Option<TickContext>,
}

impl Reader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn conditional_count(&self) -> usize {
        self.conditionals.len()
    }

    pub fn periodic_count(&self) -> usize {
        self.periodics.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// Replaces the running script with `source`. Nothing changes unless the
    /// whole script parses and validates.
    pub fn load(&mut self, source: &str, schema: &Schema) -> Result<(), ConfigError> {
        let actions = compile_script(source, schema)?;
        info!("Loaded config with {} top-level statements", actions.len());
        self.load_actions(&actions);
        Ok(())
    }

    /// Resets the scene and runs `actions` as a fresh script.
    pub fn load_actions(&mut self, actions: &[Action]) {
        self.scene = Scene::default();
        self.conditionals.clear();
        self.periodics.clear();
        self.transitions.clear();
        self.staged = Staged::default();
        for action in actions {
            self.execute(action);
        }
        if let Some(ctx) = self.last_ctx {
            self.apply_staged(&ctx);
        }
    }

    fn execute(&mut self, action: &Action) {
        match action {
            Action::Assign {
                assignment,
                transition,
            } => {
                let target = self.scene.apply(assignment, transition.is_some());
                match (target, transition) {
                    (Some(target), Some(transition)) => {
                        self.staged.transitions.push((target, *transition));
                    }
                    (Some(target), None) => {
                        // A plain assignment cancels any blend on the property.
                        self.transitions.retain(|t| t.target != target);
                        self.staged.transitions.retain(|(t, _)| *t != target);
                    }
                    (None, _) => {}
                }
            }
            Action::On { condition, actions } => {
                self.staged
                    .conditionals
                    .push(ConditionalAction::new(*condition, Rc::clone(actions)));
            }
            Action::Every { interval, actions } => {
                self.staged
                    .periodics
                    .push(PeriodicAction::new(*interval, Rc::clone(actions)));
            }
        }
    }

    fn execute_block(&mut self, actions: &[Action]) {
        for action in actions {
            self.execute(action);
        }
    }

    /// New registrations are checked as soon as they land.
    fn apply_staged(&mut self, ctx: &TickContext) {
        while self.staged.has_registrations() {
            let conditionals = mem::take(&mut self.staged.conditionals);
            let periodics = mem::take(&mut self.staged.periodics);
            for mut entry in conditionals {
                if entry.check(ctx) {
                    trace!(
                        "Condition {:?} met on registration at tick {}",
                        entry.condition,
                        ctx.tick
                    );
                    self.execute_block(&entry.actions);
                }
                if !entry.expired {
                    self.conditionals.push(entry);
                }
            }
            for mut entry in periodics {
                if entry.check(ctx) {
                    self.execute_block(&entry.actions);
                }
                self.periodics.push(entry);
            }
        }
        for (target, transition) in mem::take(&mut self.staged.transitions) {
            let ongoing = OngoingTransition::start(target, &transition, ctx);
            self.transitions.retain(|t| t.target != target);
            debug!(
                "Transition on {:?} from tick {} to {}",
                target,
                ongoing.start_tick,
                ongoing.end_tick()
            );
            self.scene.drive(target, ongoing.factor(ctx.tick));
            self.transitions.push(ongoing);
        }
    }

    /// Advances the interpreter to the tick in `ctx`.
    pub fn update(&mut self, ctx: TickContext) {
        self.last_ctx = Some(ctx);
        self.apply_staged(&ctx);

        let mut scratch = mem::take(&mut self.scratch);
        {
            let mut matched: BumpVec<Rc<[Action]>> = BumpVec::new_in(&scratch);
            for entry in self.conditionals.iter_mut() {
                if entry.check(&ctx) {
                    trace!(
                        "Condition {:?} (registered at tick {:?}) met at tick {}",
                        entry.condition,
                        entry.registered_at,
                        ctx.tick
                    );
                    matched.push(Rc::clone(&entry.actions));
                }
            }
            for entry in self.periodics.iter_mut() {
                if entry.check(&ctx) {
                    trace!("Periodic action every {} fired at tick {}", entry.interval, ctx.tick);
                    matched.push(Rc::clone(&entry.actions));
                }
            }
            for block in matched.iter() {
                self.execute_block(block);
            }
        }
        scratch.reset();
        self.scratch = scratch;

        self.conditionals.retain(|entry| !entry.expired);
        self.apply_staged(&ctx);

        for transition in self.transitions.iter() {
            self.scene
                .drive(transition.target, transition.factor(ctx.tick));
        }
        self.transitions.retain(|t| !t.is_finished(ctx.tick));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::runtime::Assignment;

    fn schema() -> Schema {
        Schema::standard()
    }

    fn run(reader: &mut Reader, ticks: std::ops::Range<u64>) {
        for tick in ticks {
            reader.update(TickContext::at(tick));
        }
    }

    #[test]
    fn test_startup_runs_once() {
        let mut reader = Reader::new();
        reader
            .load("on startup { fall_speed 2 }", &schema())
            .unwrap();
        assert_eq!(1.0, reader.scene().fall_speed());
        run(&mut reader, 0..1);
        assert_eq!(2.0, reader.scene().fall_speed());
        assert_eq!(0, reader.conditional_count());
    }

    #[test]
    fn test_time_condition() {
        let mut reader = Reader::new();
        reader
            .load("on time=10 { title \"late\" }", &schema())
            .unwrap();
        run(&mut reader, 0..10);
        assert_eq!("midivis", reader.scene().title());
        assert_eq!(1, reader.conditional_count());
        run(&mut reader, 10..11);
        assert_eq!("late", reader.scene().title());
        assert_eq!(0, reader.conditional_count());
    }

    #[test]
    fn test_mode_condition_is_edge_triggered() {
        let mut reader = Reader::new();
        reader
            .load(
                "default_color 0 0 0 0\non mode=realtime { clear_note_colors note_color [] 1 2 3 255 }",
                &schema(),
            )
            .unwrap();
        let live = |tick| TickContext {
            mode: PlaybackMode::Realtime,
            ..TickContext::at(tick)
        };
        reader.update(TickContext::at(0));
        assert!(reader.scene().note_colors().is_empty());
        reader.update(live(1));
        reader.update(live(2));
        assert_eq!(1, reader.scene().note_colors().len());
        reader.update(TickContext::at(3));
        reader.update(live(4));
        assert_eq!(1, reader.scene().note_colors().len());
        assert_eq!(1, reader.conditional_count());
    }

    #[test]
    fn test_periodic_action() {
        let mut reader = Reader::new();
        reader
            .load("every 4 { note_color [] 0 0 0 255 }", &schema())
            .unwrap();
        run(&mut reader, 0..9);
        // Fired at 0, 4 and 8.
        assert_eq!(3, reader.scene().note_colors().len());

        // Skipping ticks fires once for the boundaries crossed.
        reader.update(TickContext::at(20));
        assert_eq!(4, reader.scene().note_colors().len());
        reader.update(TickContext::at(23));
        assert_eq!(4, reader.scene().note_colors().len());
        reader.update(TickContext::at(24));
        assert_eq!(5, reader.scene().note_colors().len());
        assert_eq!(1, reader.periodic_count());
    }

    #[test]
    fn test_transition_lifetime() {
        let mut reader = Reader::new();
        reader.update(TickContext::at(0));
        reader
            .load("fall_speed 3 (10 linear)", &schema())
            .unwrap();
        // Loaded while live, the transition starts at the last seen tick.
        assert_eq!(1, reader.transition_count());
        assert_eq!(1.0, reader.scene().fall_speed());
        reader.update(TickContext::at(5));
        assert_eq!(2.0, reader.scene().fall_speed());
        reader.update(TickContext::at(9));
        assert_eq!(1, reader.transition_count());
        reader.update(TickContext::at(10));
        assert_eq!(3.0, reader.scene().fall_speed());
        assert_eq!(0, reader.transition_count());
        reader.update(TickContext::at(11));
        assert_eq!(0, reader.transition_count());
        assert_eq!(3.0, reader.scene().fall_speed());
    }

    #[test]
    fn test_transition_timing_functions() {
        for (timing, halfway) in [("constant0", 1.0), ("ease_in_out_quad", 2.0)] {
            let mut reader = Reader::new();
            reader.update(TickContext::at(0));
            reader
                .load(&format!("fall_speed 3 (10 {})", timing), &schema())
                .unwrap();
            reader.update(TickContext::at(5));
            assert_eq!(halfway, reader.scene().fall_speed(), "{}", timing);
            assert_eq!(1, reader.transition_count());
            reader.update(TickContext::at(10));
            assert_eq!(3.0, reader.scene().fall_speed(), "{}", timing);
            reader.update(TickContext::at(11));
            assert_eq!(0, reader.transition_count());
            assert_eq!(3.0, reader.scene().fall_speed(), "{}", timing);
        }
    }

    #[test]
    fn test_new_transition_replaces_old() {
        let mut reader = Reader::new();
        reader
            .load(
                "background_color 255 255 255 (100)\non time=50 { background_color 0 0 0 (10 constant1) }",
                &schema(),
            )
            .unwrap();
        reader.update(TickContext::at(0));
        reader.update(TickContext::at(50));
        assert_eq!(1, reader.transition_count());
        assert_eq!(Color::BLACK, reader.scene().background_color());
    }

    #[test]
    fn test_failed_load_keeps_config() {
        let mut reader = Reader::new();
        reader.load("title \"kept\"", &schema()).unwrap();
        assert!(reader.load("title \"lost\" fall_speed 1000", &schema()).is_err());
        assert_eq!("kept", reader.scene().title());
        assert!(reader
            .load("key_range 90 20", &schema())
            .is_err());
        assert_eq!((21, 108), reader.scene().key_range());
    }

    #[test]
    fn test_nested_registration() {
        let mut reader = Reader::new();
        reader.load_actions(&[Action::On {
            condition: Condition::Time(Time::ticks(2.0)),
            actions: Rc::from(vec![Action::On {
                condition: Condition::Startup,
                actions: Rc::from(vec![Action::Assign {
                    assignment: Assignment::FallSpeed(4.0),
                    transition: None,
                }]),
            }]),
        }]);
        run(&mut reader, 0..2);
        assert_eq!(1.0, reader.scene().fall_speed());
        run(&mut reader, 2..3);
        // The inner startup condition is evaluated as soon as it registers.
        assert_eq!(4.0, reader.scene().fall_speed());
        assert_eq!(0, reader.conditional_count());
    }
}
