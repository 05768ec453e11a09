use std::ops::Deref;

use tracing::trace;

use super::metadata::Color;
use crate::builder::QR;

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Hash)]
pub struct MaskPattern(u8);

impl MaskPattern {
    pub fn new(pattern: u8) -> Self {
        debug_assert!(pattern < 8, "Invalid masking pattern");
        Self(pattern)
    }

    pub fn all() -> impl Iterator<Item = MaskPattern> {
        (0..8).map(MaskPattern)
    }
}

impl Deref for MaskPattern {
    type Target = u8;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// Predicates over (row, col). A module is flipped where the predicate holds.
mod mask_functions {
    pub fn checkerboard(r: i16, c: i16) -> bool {
        (r + c) & 1 == 0
    }

    pub fn horizontal_lines(r: i16, _: i16) -> bool {
        r & 1 == 0
    }

    pub fn vertical_lines(_: i16, c: i16) -> bool {
        c % 3 == 0
    }

    pub fn diagonal_lines(r: i16, c: i16) -> bool {
        (r + c) % 3 == 0
    }

    pub fn large_checkerboard(r: i16, c: i16) -> bool {
        ((r >> 1) + (c / 3)) & 1 == 0
    }

    pub fn fields(r: i16, c: i16) -> bool {
        let p = r as i32 * c as i32;
        (p & 1) + (p % 3) == 0
    }

    pub fn diamonds(r: i16, c: i16) -> bool {
        let p = r as i32 * c as i32;
        ((p & 1) + (p % 3)) & 1 == 0
    }

    pub fn meadow(r: i16, c: i16) -> bool {
        let p = r as i32 * c as i32;
        (((r + c) as i32 & 1) + (p % 3)) & 1 == 0
    }
}

impl MaskPattern {
    pub fn mask_functions(self) -> fn(i16, i16) -> bool {
        debug_assert!(*self < 8, "Invalid pattern");

        match *self {
            0b000 => mask_functions::checkerboard,
            0b001 => mask_functions::horizontal_lines,
            0b010 => mask_functions::vertical_lines,
            0b011 => mask_functions::diagonal_lines,
            0b100 => mask_functions::large_checkerboard,
            0b101 => mask_functions::fields,
            0b110 => mask_functions::diamonds,
            0b111 => mask_functions::meadow,
            _ => unreachable!(),
        }
    }
}

// Selection
//------------------------------------------------------------------------------

// Applies every mask to a copy of the unmasked symbol and keeps the cheapest.
// The first of equally scored masks wins.
pub fn apply_best_mask(qr: &mut QR) -> MaskPattern {
    let best_mask = MaskPattern::all()
        .map(|m| {
            let mut candidate = qr.clone();
            candidate.apply_mask(m);
            let pen = compute_total_penalty(&candidate);
            trace!(mask = *m, penalty = pen, "Scored mask candidate");
            (m, pen)
        })
        .min_by_key(|&(_, pen)| pen)
        .map_or(MaskPattern(0), |(m, _)| m);
    qr.apply_mask(best_mask);
    best_mask
}

// Penalty of each of the 8 masks over the data of a finished symbol
pub fn penalty_scores(qr: &QR) -> [u32; 8] {
    let mut unmasked = qr.clone();
    if let Some(mask) = qr.mask() {
        unmasked.apply_mask(mask);
    }

    let mut scores = [0; 8];
    for (m, score) in MaskPattern::all().zip(scores.iter_mut()) {
        let mut candidate = unmasked.clone();
        candidate.apply_mask(m);
        *score = compute_total_penalty(&candidate);
    }
    scores
}

// Penalty
//------------------------------------------------------------------------------

pub fn compute_total_penalty(qr: &QR) -> u32 {
    let w = qr.width();
    let grid = (0..w * w)
        .map(|i| *qr.get((i / w) as i16, (i % w) as i16))
        .collect::<Vec<_>>();

    let adj_pen = compute_adjacent_penalty(&grid, w);
    let blk_pen = compute_block_penalty(&grid, w);
    let fp_pen_h = compute_finder_pattern_penalty(&grid, w, true);
    let fp_pen_v = compute_finder_pattern_penalty(&grid, w, false);
    let bal_pen = compute_balance_penalty(&grid);
    adj_pen + blk_pen + fp_pen_h + fp_pen_v + bal_pen
}

// 3 for each run of 5 same colored modules in a line, plus 1 per extra module
fn compute_adjacent_penalty(grid: &[Color], w: usize) -> u32 {
    let mut pen = 0;
    for is_hor in [true, false] {
        for i in 0..w {
            let get = |j: usize| if is_hor { grid[i * w + j] } else { grid[j * w + i] };
            let mut last = get(0);
            let mut run = 1;
            for j in 1..w {
                let clr = get(j);
                if clr == last {
                    run += 1;
                    continue;
                }
                if run >= 5 {
                    pen += run - 2;
                }
                last = clr;
                run = 1;
            }
            if run >= 5 {
                pen += run - 2;
            }
        }
    }
    pen
}

fn compute_block_penalty(grid: &[Color], w: usize) -> u32 {
    let mut pen = 0;
    for r in 0..w - 1 {
        for c in 0..w - 1 {
            let clr = grid[r * w + c];
            if clr == grid[(r + 1) * w + c]
                && clr == grid[r * w + c + 1]
                && clr == grid[(r + 1) * w + c + 1]
            {
                pen += 3;
            }
        }
    }
    pen
}

// 40 for each 1:1:3:1:1 pattern with 4 light modules on either side.
// Modules outside the symbol count as light.
fn compute_finder_pattern_penalty(grid: &[Color], w: usize, is_hor: bool) -> u32 {
    static PATTERN: [Color; 7] = [
        Color::Dark,
        Color::Light,
        Color::Dark,
        Color::Dark,
        Color::Dark,
        Color::Light,
        Color::Dark,
    ];

    let w = w as i32;
    let mut pen = 0;
    for i in 0..w {
        let get = |j: i32| {
            if j < 0 || j >= w {
                return Color::Light;
            }
            if is_hor {
                grid[(i * w + j) as usize]
            } else {
                grid[(j * w + i) as usize]
            }
        };
        let is_light = |range: std::ops::Range<i32>| range.into_iter().all(|j| get(j) == Color::Light);
        for j in 0..w - 6 {
            if (j..j + 7).map(get).ne(PATTERN.iter().copied()) {
                continue;
            }
            if is_light(j - 4..j) || is_light(j + 7..j + 11) {
                pen += 40;
            }
        }
    }
    pen
}

// 10 for every 5% the dark ratio deviates from 50%
fn compute_balance_penalty(grid: &[Color]) -> u32 {
    let tot = grid.len();
    let dark = grid.iter().filter(|&&c| c == Color::Dark).count();
    let dev = (dark * 2).abs_diff(tot) * 10 / tot;
    dev as u32 * 10
}

#[cfg(test)]
mod mask_tests {
    use test_case::test_case;

    use super::{
        compute_adjacent_penalty, compute_balance_penalty, compute_block_penalty,
        compute_finder_pattern_penalty, MaskPattern,
    };
    use crate::common::metadata::Color;

    fn grid_from_str(s: &str) -> (Vec<Color>, usize) {
        let rows = s.split_whitespace().collect::<Vec<_>>();
        let w = rows.len();
        let grid =
            rows.iter().flat_map(|r| r.chars().map(|c| Color::from(c == '#'))).collect::<Vec<_>>();
        assert_eq!(grid.len(), w * w);
        (grid, w)
    }

    #[test_case(0, 0, 0, true)]
    #[test_case(0, 1, 2, false)]
    #[test_case(1, 3, 5, false)]
    #[test_case(2, 4, 3, true)]
    #[test_case(3, 1, 2, true)]
    #[test_case(4, 2, 0, false)]
    #[test_case(4, 3, 3, true)]
    #[test_case(5, 2, 3, true)]
    #[test_case(6, 1, 3, false)]
    #[test_case(6, 2, 4, true)]
    #[test_case(7, 0, 0, true)]
    #[test_case(7, 1, 1, false)]
    fn test_mask_functions(m: u8, r: i16, c: i16, exp: bool) {
        assert_eq!(MaskPattern::new(m).mask_functions()(r, c), exp);
    }

    #[test]
    fn test_adjacent_penalty() {
        let (grid, w) = grid_from_str(
            "######
             #.#.#.
             .#.#.#
             #.#.#.
             .#.#.#
             #.#.#.",
        );
        // Row of 6 scores 4, column 0 has no run of 5
        assert_eq!(compute_adjacent_penalty(&grid, w), 4);
    }

    #[test]
    fn test_block_penalty() {
        let (grid, w) = grid_from_str(
            "##.
             ##.
             ...",
        );
        assert_eq!(compute_block_penalty(&grid, w), 3);
    }

    #[test]
    fn test_finder_pattern_penalty() {
        let (grid, w) = grid_from_str(
            "#.###.#....
             ...........
             ...........
             ...........
             ...........
             ...........
             ...........
             ...........
             ...........
             ...........
             ...........",
        );
        assert_eq!(compute_finder_pattern_penalty(&grid, w, true), 40);
        assert_eq!(compute_finder_pattern_penalty(&grid, w, false), 0);
    }

    #[test]
    fn test_balance_penalty() {
        let (grid, _) = grid_from_str(
            "##
             ..",
        );
        assert_eq!(compute_balance_penalty(&grid), 0);
        let (grid, _) = grid_from_str(
            "###
             ###
             ##.",
        );
        // 8 of 9 dark, 88.8% deviates 38.8%
        assert_eq!(compute_balance_penalty(&grid), 70);
    }
}
