//! Lifecycle of a maze: carve, place the cheese, place the mouse, run, reset

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::maze_generator::{Carving, DirectionOrder, MazeGenerator, RandomOrder};
use crate::wall_follower::{CancelToken, NavigationConfig, RunOutcome, WallFollower};
use crate::{Grid, MazeError, Point, Rejection};

/// Notifications for whoever draws the maze
///
/// Movement notifications arrive from the navigation worker thread.
pub trait MazeObserver: Send + Sync {
    fn goal_placed(&self, _at: Point) {}
    fn agent_moved(&self, _at: Point) {}
    fn cell_vacated(&self, _at: Point) {}
    fn navigation_reached(&self, _steps: usize) {}
    fn reset(&self) {}
}

/// Observer that ignores everything
pub struct Silent;

impl MazeObserver for Silent {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Maze carved, waiting for the cheese
    Generated,
    /// Cheese placed, waiting for the mouse
    GoalPlaced,
    /// Mouse is looking for the cheese
    Navigating,
    /// Mouse found the cheese
    Reached,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionState::Generated => "waiting for the cheese",
            SessionState::GoalPlaced => "waiting for the mouse",
            SessionState::Navigating => "navigating",
            SessionState::Reached => "finished",
        })
    }
}

type Worker = JoinHandle<Result<RunOutcome, MazeError>>;

/// One maze and the mouse hunting for cheese in it
///
/// The mouse runs on a worker thread. [Session::reset] stops it and waits
/// for the worker to exit before carving a new maze, so the worker never
/// sees a half-carved grid.
pub struct Session<O = RandomOrder> {
    grid: Arc<Grid>,
    generator: MazeGenerator<O>,
    observer: Arc<dyn MazeObserver>,
    config: NavigationConfig,
    /// Source of the bearing seeds
    random: StdRng,
    state: SessionState,
    goal: Option<Point>,
    cancel: CancelToken,
    worker: Option<Worker>,
    /// Number of resets so far
    generation: u64,
}

impl<O: DirectionOrder> Session<O> {
    /// Carve a `width` x `depth` maze and wait for the cheese
    pub fn new(
        width: usize,
        depth: usize,
        mut generator: MazeGenerator<O>,
        config: NavigationConfig,
    ) -> Self {
        let mut grid = Grid::new(width, depth);
        generator.generate(&mut grid);
        let random = if let Some(state) = config.seed {
            StdRng::seed_from_u64(state)
        } else {
            StdRng::from_entropy()
        };

        Session {
            grid: Arc::new(grid),
            generator,
            observer: Arc::new(Silent),
            config,
            random,
            state: SessionState::Generated,
            goal: None,
            cancel: CancelToken::new(),
            worker: None,
            generation: 0,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn MazeObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn goal(&self) -> Option<Point> {
        self.goal
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn reject(&self, action: &'static str, reason: Rejection) -> MazeError {
        warn!("refused to {action}: {reason}");
        MazeError::InvalidStateTransition { action, reason }
    }

    fn expect_state(&self, action: &'static str, state: SessionState) -> Result<(), MazeError> {
        if self.state == state {
            Ok(())
        } else {
            Err(self.reject(action, Rejection::WrongState(self.state)))
        }
    }

    fn passage(&self, action: &'static str, x: usize, y: usize) -> Result<Point, MazeError> {
        let at = Point::new(x, y);
        if self.grid.is_passage(x, y)? {
            Ok(at)
        } else {
            Err(self.reject(action, Rejection::Wall(at)))
        }
    }

    /// Put the cheese on passage `(x, y)`
    pub fn place_goal(&mut self, x: usize, y: usize) -> Result<(), MazeError> {
        const ACTION: &str = "place the cheese";
        self.expect_state(ACTION, SessionState::Generated)?;
        let at = self.passage(ACTION, x, y)?;

        self.goal = Some(at);
        self.state = SessionState::GoalPlaced;
        info!("cheese placed at {at}");
        self.observer.goal_placed(at);
        Ok(())
    }

    /// Put the mouse on passage `(x, y)` and let it look for the cheese
    pub fn place_agent_and_start(&mut self, x: usize, y: usize) -> Result<(), MazeError> {
        const ACTION: &str = "place the mouse";
        self.expect_state(ACTION, SessionState::GoalPlaced)?;
        let start = self.passage(ACTION, x, y)?;
        let Some(goal) = self.goal else {
            return Err(self.reject(ACTION, Rejection::WrongState(self.state)));
        };

        let grid = Arc::clone(&self.grid);
        let observer = Arc::clone(&self.observer);
        let cancel = CancelToken::new();
        let config = self.config;
        let seed: u64 = self.random.gen();
        self.cancel = cancel.clone();

        info!("mouse placed at {start}");
        self.observer.agent_moved(start);
        self.worker = Some(thread::spawn(move || {
            let mut mouse = WallFollower::new(&grid, start, &mut StdRng::seed_from_u64(seed));
            debug!("mouse starts heading {:?}", mouse.bearing());
            mouse.go(goal, &cancel, observer.as_ref(), &config)
        }));
        self.state = SessionState::Navigating;
        Ok(())
    }

    /// Collect the result of the run, if the worker has exited
    pub fn poll(&mut self) -> Option<Result<RunOutcome, MazeError>> {
        if self.worker.as_ref()?.is_finished() {
            self.finish()
        } else {
            None
        }
    }

    /// Block until the mouse is done
    pub fn wait(&mut self) -> Result<RunOutcome, MazeError> {
        match self.finish() {
            Some(result) => result,
            None => Err(self.reject("wait for the mouse", Rejection::WrongState(self.state))),
        }
    }

    fn finish(&mut self) -> Option<Result<RunOutcome, MazeError>> {
        let result = self
            .worker
            .take()?
            .join()
            .unwrap_or(Err(MazeError::WorkerPanicked));

        self.state = match result {
            Ok(RunOutcome::Reached { .. }) => SessionState::Reached,
            _ => SessionState::GoalPlaced,
        };
        Some(result)
    }

    /// Stop the mouse, forget cheese and mouse, and carve a new maze
    pub fn reset(&mut self) -> Carving {
        self.cancel.cancel();
        if let Some(worker) = self.worker.take() {
            match worker.join() {
                Ok(Ok(outcome)) => debug!("navigation ended: {outcome:?}"),
                Ok(Err(e)) => warn!("navigation failed: {e}"),
                Err(_) => warn!("navigation worker panicked"),
            }
        }

        // The worker has exited, so this grid is no longer shared
        let carving = self.generator.regenerate(Arc::make_mut(&mut self.grid));
        self.goal = None;
        self.state = SessionState::Generated;
        self.generation += 1;
        info!(
            "maze regenerated ({} rooms), generation {}",
            carving.rooms, self.generation
        );
        self.observer.reset();
        carving
    }
}

impl<O> Drop for Session<O> {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use crate::analysis::MazeGraph;
    use crate::session::{MazeObserver, Session, SessionState};
    use crate::{
        FixedOrder, MazeError, MazeGenerator, NavigationConfig, Point, Rejection, RunOutcome,
    };

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Event {
        Goal(Point),
        Moved(Point),
        Vacated(Point),
        Reached(usize),
        Reset,
    }

    /// Observer remembering every notification
    #[derive(Default)]
    pub(crate) struct Recorder {
        events: Mutex<Vec<Event>>,
        /// Also forwards every notification, when set
        tap: Mutex<Option<Sender<Event>>>,
    }

    impl Recorder {
        /// Recorder that forwards each event to the returned receiver
        pub(crate) fn tapped() -> (Self, Receiver<Event>) {
            let (tx, rx) = mpsc::channel();
            let recorder = Recorder {
                tap: Mutex::new(Some(tx)),
                ..Default::default()
            };
            (recorder, rx)
        }

        pub(crate) fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, event: Event) {
            if let Some(tx) = self.tap.lock().unwrap().as_ref() {
                let _ = tx.send(event.clone());
            }
            self.events.lock().unwrap().push(event);
        }
    }

    impl MazeObserver for Recorder {
        fn goal_placed(&self, at: Point) {
            self.push(Event::Goal(at));
        }
        fn agent_moved(&self, at: Point) {
            self.push(Event::Moved(at));
        }
        fn cell_vacated(&self, at: Point) {
            self.push(Event::Vacated(at));
        }
        fn navigation_reached(&self, steps: usize) {
            self.push(Event::Reached(steps));
        }
        fn reset(&self) {
            self.push(Event::Reset);
        }
    }

    /// 5x5 maze with a single corridor from (1, 1) to (1, 3)
    fn golden() -> (Session<FixedOrder>, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let session = Session::new(
            5,
            5,
            MazeGenerator::with_order(FixedOrder::default()),
            NavigationConfig::default(),
        )
        .with_observer(recorder.clone());
        (session, recorder)
    }

    fn wrong_state(state: SessionState) -> Rejection {
        Rejection::WrongState(state)
    }

    #[test]
    fn new_session_waits_for_cheese() {
        let session = Session::new(
            21,
            15,
            MazeGenerator::new(Some(1)),
            NavigationConfig::default(),
        );

        assert_eq!(session.state(), SessionState::Generated);
        assert_eq!(session.goal(), None);
        assert_eq!(session.generation(), 0);
        assert!(MazeGraph::from_grid(session.grid()).is_perfect());
    }

    #[test]
    fn mouse_needs_cheese_first() {
        let (mut session, recorder) = golden();

        let err = session.place_agent_and_start(1, 1).unwrap_err();

        assert_eq!(
            err,
            MazeError::InvalidStateTransition {
                action: "place the mouse",
                reason: wrong_state(SessionState::Generated)
            }
        );
        assert_eq!(session.state(), SessionState::Generated);
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn cheese_on_wall_is_refused() {
        let (mut session, _) = golden();

        let err = session.place_goal(2, 2).unwrap_err();

        assert_eq!(
            err,
            MazeError::InvalidStateTransition {
                action: "place the cheese",
                reason: Rejection::Wall(Point::new(2, 2))
            }
        );
        assert_eq!(session.state(), SessionState::Generated);
        assert_eq!(session.goal(), None);
    }

    #[test]
    fn cheese_outside_grid_is_refused() {
        let (mut session, _) = golden();
        assert!(matches!(
            session.place_goal(5, 1),
            Err(MazeError::OutOfBounds { x: 5, y: 1, .. })
        ));
        assert_eq!(session.state(), SessionState::Generated);
    }

    #[test]
    fn cheese_is_placed_once() {
        let (mut session, _) = golden();
        session.place_goal(1, 3).unwrap();

        let err = session.place_goal(3, 3).unwrap_err();

        assert_eq!(
            err,
            MazeError::InvalidStateTransition {
                action: "place the cheese",
                reason: wrong_state(SessionState::GoalPlaced)
            }
        );
        assert_eq!(session.goal(), Some(Point::new(1, 3)));
    }

    #[test]
    fn mouse_on_wall_is_refused() {
        let (mut session, _) = golden();
        session.place_goal(1, 3).unwrap();

        let err = session.place_agent_and_start(0, 0).unwrap_err();

        assert!(matches!(
            err,
            MazeError::InvalidStateTransition {
                reason: Rejection::Wall(_),
                ..
            }
        ));
        assert_eq!(session.state(), SessionState::GoalPlaced);
    }

    #[test]
    fn mouse_finds_cheese() {
        let (mut session, recorder) = golden();
        session.place_goal(1, 3).unwrap();
        session.place_agent_and_start(1, 1).unwrap();

        // Whatever the initial bearing, the only way is along the corridor
        assert_eq!(session.wait(), Ok(RunOutcome::Reached { steps: 6 }));
        assert_eq!(session.state(), SessionState::Reached);

        let events = recorder.events();
        assert_eq!(events[0], Event::Goal(Point::new(1, 3)));
        assert_eq!(events[1], Event::Moved(Point::new(1, 1)));
        assert_eq!(events[2], Event::Vacated(Point::new(1, 1)));
        assert_eq!(events[events.len() - 2], Event::Moved(Point::new(1, 3)));
        assert_eq!(events[events.len() - 1], Event::Reached(6));
        assert_eq!(events.len(), 2 + 2 * 6 + 1);

        // Finished sessions only accept a reset
        assert!(session.place_goal(3, 3).is_err());
        assert!(session.wait().is_err());
    }

    #[test]
    fn mouse_put_on_cheese() {
        let (mut session, recorder) = golden();
        session.place_goal(1, 1).unwrap();
        session.place_agent_and_start(1, 1).unwrap();

        // The mouse sets off before sniffing, so it tours the whole maze
        assert_eq!(session.wait(), Ok(RunOutcome::Reached { steps: 12 }));
        assert_eq!(session.state(), SessionState::Reached);

        let events = recorder.events();
        assert_eq!(events[2], Event::Vacated(Point::new(1, 1)));
        assert_eq!(events[3], Event::Moved(Point::new(2, 1)));
        assert!(events.contains(&Event::Moved(Point::new(1, 3))));
        assert_eq!(events[events.len() - 2], Event::Moved(Point::new(1, 1)));
    }

    #[test]
    fn poll_collects_result() {
        let (mut session, _) = golden();
        assert!(session.poll().is_none());

        session.place_goal(1, 3).unwrap();
        session.place_agent_and_start(1, 1).unwrap();
        let outcome = loop {
            if let Some(outcome) = session.poll() {
                break outcome;
            }
            std::thread::sleep(Duration::from_millis(1));
        };

        assert_eq!(outcome, Ok(RunOutcome::Reached { steps: 6 }));
        assert_eq!(session.state(), SessionState::Reached);
        assert!(session.poll().is_none());
    }

    #[test]
    fn reset_stops_running_mouse() {
        let (recorder, events) = Recorder::tapped();
        let recorder = Arc::new(recorder);
        // Slow enough that the mouse cannot reach the far corner before the reset
        let config = NavigationConfig {
            step_delay: Some(Duration::from_millis(10)),
            seed: Some(9),
        };
        let mut session = Session::new(61, 61, MazeGenerator::new(Some(3)), config)
            .with_observer(recorder.clone());
        let before = session.grid().clone();

        session.place_goal(59, 59).unwrap();
        session.place_agent_and_start(1, 1).unwrap();
        // The first vacated cell comes from the worker, so the mouse is running
        loop {
            let event = events.recv_timeout(Duration::from_secs(10)).unwrap();
            if matches!(event, Event::Vacated(_)) {
                break;
            }
        }
        session.reset();

        assert_eq!(session.state(), SessionState::Generated);
        assert_eq!(session.goal(), None);
        assert_eq!(session.generation(), 1);
        assert_eq!(recorder.events().last(), Some(&Event::Reset));
        assert!(!recorder
            .events()
            .iter()
            .any(|e| matches!(e, Event::Reached(_))));

        // Worker is gone; the reset was the last thing anyone heard
        let after_reset: Vec<Event> = events.try_iter().collect();
        assert_eq!(after_reset.last(), Some(&Event::Reset));

        let grid = session.grid();
        assert_eq!((grid.width(), grid.depth()), (61, 61));
        assert_ne!(grid, &before);
        assert!(MazeGraph::from_grid(grid).is_perfect());
    }

    #[test]
    fn reset_allows_new_round() {
        let (mut session, recorder) = golden();
        session.place_goal(1, 3).unwrap();
        session.place_agent_and_start(1, 1).unwrap();
        session.wait().unwrap();

        session.reset();
        session.place_goal(3, 3).unwrap();
        session.place_agent_and_start(1, 3).unwrap();

        assert_eq!(session.wait(), Ok(RunOutcome::Reached { steps: 2 }));
        assert_eq!(session.generation(), 1);
        assert!(recorder.events().contains(&Event::Reset));
    }

    #[test]
    fn reset_from_fresh_session() {
        let mut session = Session::new(
            9,
            9,
            MazeGenerator::new(Some(2)),
            NavigationConfig::default(),
        );
        let carving = session.reset();

        assert_eq!(carving.rooms, 16);
        assert_eq!(session.state(), SessionState::Generated);
    }
}
