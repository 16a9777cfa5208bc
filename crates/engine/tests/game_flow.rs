use puzzle_engine::archive::Archive;
use puzzle_engine::evaluate::Advice;
use puzzle_engine::{Board, Config, Game, GameError, IllegalMoveReason, Phase, PieceKind, Position};

fn pos(x: i32, y: i32) -> Position {
    Position::new(x, y).unwrap()
}

#[test]
fn king_capture_on_the_clearing_move_rearms_the_clear() {
    // Car (1,1); King (1,4); a second King (6,4) on the row the Car reaches next.
    let board = Board::from_layout("X7/8/8/K4K2/8/8/8/7P/8").unwrap();
    let mut game = Game::from_board(board, Config::default());

    game.move_car(pos(1, 4)).unwrap();
    assert_eq!(game.phase(), Phase::PendingClear(pos(1, 4)));

    let outcome = game.move_car(pos(6, 4)).unwrap();
    assert_eq!(outcome.captured.map(|p| p.kind), Some(PieceKind::King));
    assert_eq!(game.phase(), Phase::PendingClear(pos(6, 4)));
    // The pawn at (8,8) shares neither row 4 nor column 6.
    assert!(outcome.cleared.is_empty());
    assert_eq!(game.board().len(), 2);
}

#[test]
fn clear_spares_pieces_off_the_lines() {
    let board = Board::from_layout("8/4X3/8/8/4K3/8/8/8/8").unwrap();
    let mut game = Game::from_board(board, Config::default());
    game.add_piece(PieceKind::Bishop, pos(1, 1)).unwrap();
    game.add_piece(PieceKind::Advisor, pos(3, 9)).unwrap();
    game.add_piece(PieceKind::Cannon, pos(2, 8)).unwrap();

    game.move_car(pos(5, 5)).unwrap();
    let outcome = game.move_car(pos(3, 5)).unwrap();
    let cleared: Vec<_> = outcome.cleared.iter().map(|p| p.kind).collect();
    assert_eq!(cleared, vec![PieceKind::Advisor]);
    assert_eq!(game.board().len(), 3);
    assert_eq!(game.phase(), Phase::Normal);
}

#[test]
fn suggestion_prefers_the_king() {
    let board = Board::from_layout("8/4X3/8/8/4K3/8/8/R7/8").unwrap();
    let game = Game::from_board(board, Config::default());
    let Advice::Moves(s) = game.suggest() else {
        panic!("expected a safe move");
    };
    assert_eq!(s.best.destination(), pos(5, 5));
    assert!(s.best.breakdown.capture >= 1000.0);
    assert_eq!(s.direct_capture, None);
}

#[test]
fn lost_game_only_resets() {
    let mut game = Game::default();
    game.move_car(pos(4, 4)).unwrap();
    assert_eq!(game.phase(), Phase::Lost);
    let mut rng = rand::rngs::mock::StepRng::new(0, 1);
    assert!(matches!(game.evolve(&mut rng), Err(GameError::GameOver)));
    let car = game.board().car_id();
    assert_eq!(game.select_for_move(car), Err(GameError::GameOver));
    // Analysis still works on the final board.
    assert!(game.analyze(pos(4, 5)).is_ok());
    game.reset();
    assert_eq!(game.board(), &Board::start());
    game.select_for_move(car).unwrap();
}

#[test]
fn non_car_cannot_be_selected_or_deleted_car() {
    let mut game = Game::default();
    let pawn = game.board().piece_at(pos(6, 3)).unwrap().id;
    assert_eq!(
        game.select_for_move(pawn),
        Err(GameError::IllegalMove(IllegalMoveReason::NotTheCar))
    );
    assert_eq!(game.delete_at(pos(4, 7)), Err(GameError::ProtectedPieceDeletion));
    assert_eq!(game.add_piece(PieceKind::Car, pos(1, 1)), Err(GameError::DuplicateCar));
    assert_eq!(game.add_piece(PieceKind::Pawn, pos(6, 3)), Err(GameError::OccupiedCell(pos(6, 3))));
    assert_eq!(game.delete_at(pos(1, 1)), Err(GameError::EmptyCell(pos(1, 1))));
}

#[test]
fn archive_load_replaces_the_session() {
    let mut archive = Archive::in_memory();
    let mut game = Game::default();
    game.add_piece(PieceKind::Chariot, pos(1, 1)).unwrap();
    archive.save("edited", game.board()).unwrap();

    game.reset();
    assert!(archive.load("missing").is_err());
    assert_eq!(game.board(), &Board::start());

    let board = archive.load("edited").unwrap();
    game.load_board(board);
    assert_eq!(game.board().piece_at(pos(1, 1)).map(|p| p.kind), Some(PieceKind::Chariot));
    assert_eq!(game.move_count(), 0);
    assert_eq!(game.history().len(), 1);
}
