//! Property test: board evaluation matches an independent reference
//! implementation across random legal games.

use turnabout::{Board, Cell, Game, Mark, Verdict};

/// Straightforward reference evaluator, written independently of the
/// production line table: checks every row, column and diagonal by
/// coordinates, then fullness.
fn reference_evaluate(board: &Board) -> Verdict {
    let at = |row: usize, col: usize| board.get(row, col).unwrap();

    let lines: Vec<[(usize, usize); 3]> = (0..3)
        .map(|r| [(r, 0), (r, 1), (r, 2)])
        .chain((0..3).map(|c| [(0, c), (1, c), (2, c)]))
        .chain([
            [(0, 0), (1, 1), (2, 2)],
            [(0, 2), (1, 1), (2, 0)],
        ])
        .collect();

    for line in lines {
        if let Cell::Taken(mark) = at(line[0].0, line[0].1) {
            if line
                .iter()
                .all(|&(r, c)| at(r, c) == Cell::Taken(mark))
            {
                return Verdict::Won(mark);
            }
        }
    }

    let full = (0..3).all(|r| (0..3).all(|c| at(r, c) != Cell::Empty));
    if full { Verdict::Tie } else { Verdict::InProgress }
}

#[test]
fn evaluation_matches_reference_over_random_games() {
    fastrand::seed(7);

    for _ in 0..500 {
        let mut game = Game::new();
        let mut open: Vec<(usize, usize)> = (0..3)
            .flat_map(|r| (0..3).map(move |c| (r, c)))
            .collect();

        while !game.is_over() && !open.is_empty() {
            let pick = fastrand::usize(..open.len());
            let (row, col) = open.swap_remove(pick);
            let verdict = game.place(row, col).expect("cell drawn from open set");
            assert_eq!(verdict, reference_evaluate(game.board()));
        }
    }
}

#[test]
fn x_and_o_alternate_throughout_random_games() {
    fastrand::seed(11);

    for _ in 0..100 {
        let mut game = Game::new();
        let mut open: Vec<(usize, usize)> = (0..3)
            .flat_map(|r| (0..3).map(move |c| (r, c)))
            .collect();

        let mut expected = Mark::X;
        while !game.is_over() && !open.is_empty() {
            assert_eq!(game.to_move(), expected);
            let pick = fastrand::usize(..open.len());
            let (row, col) = open.swap_remove(pick);
            game.place(row, col).unwrap();
            expected = expected.opponent();
        }
    }
}
