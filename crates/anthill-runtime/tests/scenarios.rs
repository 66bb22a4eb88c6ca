//! Single-move scenarios with fixed starting cells.

use anthill_runtime::prelude::*;

fn colony() -> Colony {
    Colony::from_config(ColonyConfig::default().with_seed(5)).unwrap()
}

#[test]
fn corner_ant_cannot_step_off_the_grid() {
    let colony = colony();
    let ant = colony.place(AgentKind::Worker, Position::new(0, 0)).unwrap();

    let outcome = ant.attempt_move_towards(Direction::West, colony.registry()).unwrap();

    assert_eq!(
        outcome,
        MoveOutcome::Rejected {
            candidate: Position::new(-1, 0),
            reason: Rejection::OutOfBounds,
        }
    );
    assert_eq!(colony.registry().position_of(ant.id()), Some(Position::new(0, 0)));
}

#[test]
fn second_ant_cannot_take_an_occupied_cell() {
    let colony = colony();
    let a = colony.place(AgentKind::Worker, Position::new(3, 4)).unwrap();
    let b = colony.place(AgentKind::Worker, Position::new(3, 3)).unwrap();

    let outcome = b.attempt_move_towards(Direction::South, colony.registry()).unwrap();

    assert!(matches!(
        outcome,
        MoveOutcome::Rejected { reason: Rejection::Occupied { ref by }, .. } if by == a.id()
    ));
    let pa = colony.registry().position_of(a.id()).unwrap();
    let pb = colony.registry().position_of(b.id()).unwrap();
    assert_eq!(pa, Position::new(3, 4));
    assert_ne!(pa, pb);
}

#[test]
fn nothing_may_enter_the_nest() {
    let colony = colony();
    let nest = colony.grid().nest_position();
    let neighbours = [
        (Position::new(nest.x, nest.y - 1), Direction::South),
        (Position::new(nest.x - 1, nest.y), Direction::East),
        (Position::new(nest.x + 1, nest.y), Direction::West),
        (Position::new(nest.x, nest.y + 1), Direction::North),
    ];
    for (start, towards) in neighbours {
        let ant = colony.place(AgentKind::Queen, start).unwrap();
        let outcome = ant.attempt_move_towards(towards, colony.registry()).unwrap();
        assert!(matches!(outcome, MoveOutcome::Rejected { reason: Rejection::Nest, .. }));
        assert_eq!(colony.registry().position_of(ant.id()), Some(start));
    }
    assert!(matches!(
        colony.place(AgentKind::Worker, nest),
        Err(ColonyError::InvalidPlacement { reason: Rejection::Nest, .. })
    ));
}

#[test]
fn a_freed_cell_can_be_taken() {
    let colony = colony();
    let a = colony.place(AgentKind::Worker, Position::new(1, 1)).unwrap();
    let b = colony.place(AgentKind::Worker, Position::new(2, 1)).unwrap();

    assert!(a.attempt_move_towards(Direction::North, colony.registry()).unwrap().is_moved());
    assert!(b.attempt_move_towards(Direction::West, colony.registry()).unwrap().is_moved());
    assert_eq!(colony.registry().position_of(b.id()), Some(Position::new(1, 1)));
    colony.verify().unwrap();
}

#[test]
fn events_report_moves_and_rejections() {
    let colony = colony();
    let mut events = colony.subscribe();
    let ant = colony.place(AgentKind::Worker, Position::new(0, 0)).unwrap();
    ant.attempt_move_towards(Direction::North, colony.registry()).unwrap();
    colony.run_n_iterations(3).unwrap();

    let first = events.try_recv().unwrap();
    assert_eq!(
        first,
        ColonyEvent::Spawned {
            id: ant.id().clone(),
            kind: AgentKind::Worker,
            position: Position::new(0, 0),
        }
    );
    let mut attempts = 0;
    while let Ok(event) = events.try_recv() {
        assert!(matches!(event, ColonyEvent::Moved { .. } | ColonyEvent::Rejected { .. }));
        attempts += 1;
    }
    assert_eq!(attempts, 3);
}
