use std::collections::BTreeSet;

use crate::foundation::core::CellCoord;

/// Glyph height in fine cells.
pub const GLYPH_HEIGHT: u32 = 5;
/// Blank rows between wrapped lines.
pub const LINE_GAP: u32 = 1;
/// Blank columns between adjacent glyphs (never next to a space).
pub const LETTER_GAP: u32 = 1;
/// Cells kept free around the text block.
const PADDING: u32 = 1;

const BOX: [&str; 5] = ["#####", "#...#", "#...#", "#...#", "#####"];

/// Rows of the glyph for `c` (already uppercased), `#` marking lit cells. Row length is the
/// glyph width.
fn glyph_rows(c: char) -> Option<[&'static str; 5]> {
    let rows = match c {
        'A' => [".###.", "#...#", "#####", "#...#", "#...#"],
        'B' => ["####.", "#...#", "####.", "#...#", "####."],
        'C' => [".####", "#....", "#....", "#....", ".####"],
        'D' => ["####.", "#...#", "#...#", "#...#", "####."],
        'E' => ["#####", "#....", "####.", "#....", "#####"],
        'F' => ["#####", "#....", "####.", "#....", "#...."],
        'G' => [".####", "#....", "#..##", "#...#", ".###."],
        'H' => ["#...#", "#...#", "#####", "#...#", "#...#"],
        'I' => ["#####", "..#..", "..#..", "..#..", "#####"],
        'J' => ["..###", "...#.", "...#.", "#..#.", ".##.."],
        'K' => ["#...#", "#..#.", "###..", "#..#.", "#...#"],
        'L' => ["#....", "#....", "#....", "#....", "#####"],
        'M' => ["#...#", "##.##", "#.#.#", "#...#", "#...#"],
        'N' => ["#...#", "##..#", "#.#.#", "#..##", "#...#"],
        'O' => [".###.", "#...#", "#...#", "#...#", ".###."],
        'P' => ["####.", "#...#", "####.", "#....", "#...."],
        'Q' => [".###.", "#...#", "#.#.#", "#..#.", ".##.#"],
        'R' => ["####.", "#...#", "####.", "#..#.", "#...#"],
        'S' => [".####", "#....", ".###.", "....#", "####."],
        'T' => ["#####", "..#..", "..#..", "..#..", "..#.."],
        'U' => ["#...#", "#...#", "#...#", "#...#", ".###."],
        'V' => ["#...#", "#...#", "#...#", ".#.#.", "..#.."],
        'W' => ["#...#", "#...#", "#.#.#", "##.##", "#...#"],
        'X' => ["#...#", ".#.#.", "..#..", ".#.#.", "#...#"],
        'Y' => ["#...#", ".#.#.", "..#..", "..#..", "..#.."],
        'Z' => ["#####", "...#.", "..#..", ".#...", "#####"],
        'Å' => ["..#..", ".###.", "#...#", "#####", "#...#"],
        'Ä' => ["#...#", ".###.", "#...#", "#####", "#...#"],
        'Ö' => ["#...#", ".###.", "#...#", "#...#", ".###."],
        'Æ' => [".####", "#.#..", "#####", "#.#..", "#.###"],
        'Ø' => [".####", "#..##", "#.#.#", "##..#", "####."],
        '0' => [".###.", "#..##", "#.#.#", "##..#", ".###."],
        '1' => ["..#..", ".##..", "..#..", "..#..", ".###."],
        '2' => [".###.", "#...#", "..##.", ".#...", "#####"],
        '3' => ["####.", "....#", "..##.", "....#", "####."],
        '4' => ["#..#.", "#..#.", "#####", "...#.", "...#."],
        '5' => ["#####", "#....", "####.", "....#", "####."],
        '6' => [".###.", "#....", "####.", "#...#", ".###."],
        '7' => ["#####", "....#", "...#.", "..#..", "..#.."],
        '8' => [".###.", "#...#", ".###.", "#...#", ".###."],
        '9' => [".###.", "#...#", ".####", "....#", ".###."],
        ' ' => ["...", "...", "...", "...", "..."],
        '-' => ["..", "..", "##", "..", ".."],
        '.' => [".", ".", ".", ".", "#"],
        ',' => ["..", "..", "..", ".#", "#."],
        '!' => ["#", "#", "#", ".", "#"],
        ':' => [".", "#", ".", "#", "."],
        '\'' => ["#", "#", ".", ".", "."],
        '"' => ["#.#", "#.#", "...", "...", "..."],
        '?' => [".###.", "#...#", "..##.", ".....", "..#.."],
        '/' => ["....#", "...#.", "..#..", ".#...", "#...."],
        '\\' => ["#....", ".#...", "..#..", "...#.", "....#"],
        '(' => [".#", "#.", "#.", "#.", ".#"],
        ')' => ["#.", ".#", ".#", ".#", "#."],
        '+' => ["...", ".#.", "###", ".#.", "..."],
        '=' => ["...", "###", "...", "###", "..."],
        '_' => ["...", "...", "...", "...", "###"],
        '*' => ["...", "#.#", ".#.", "#.#", "..."],
        '<' => ["..#", ".#.", "#..", ".#.", "..#"],
        '>' => ["#..", ".#.", "..#", ".#.", "#.."],
        _ => return None,
    };
    Some(rows)
}

pub fn supports(c: char) -> bool {
    glyph_rows(to_upper(c)).is_some()
}

fn to_upper(c: char) -> char {
    c.to_uppercase().next().unwrap_or(c)
}

fn rows_or_box(c: char) -> [&'static str; 5] {
    glyph_rows(c).unwrap_or(BOX)
}

fn glyph_width(c: char) -> u32 {
    rows_or_box(c)[0].len() as u32
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Align {
    pub h: HAlign,
    pub v: VAlign,
}

/// Strip trailing `-t`, `-b`, `-l`, `-r` suffixes (in any order, repeatable) and return the
/// remaining text with the alignment they select. Later suffixes override earlier ones on the
/// same axis.
pub fn split_alignment(text: &str) -> (&str, Align) {
    const SUFFIXES: [(&str, u8); 4] = [("-t", b't'), ("-b", b'b'), ("-l", b'l'), ("-r", b'r')];

    let mut rest = text;
    let mut flags = Vec::new();
    while let Some((head, flag)) = SUFFIXES
        .iter()
        .find_map(|&(suffix, flag)| rest.strip_suffix(suffix).map(|head| (head, flag)))
    {
        flags.push(flag);
        rest = head;
    }

    let mut align = Align::default();
    // Collected right to left.
    for flag in flags.into_iter().rev() {
        match flag {
            b't' => align.v = VAlign::Top,
            b'b' => align.v = VAlign::Bottom,
            b'l' => align.h = HAlign::Left,
            _ => align.h = HAlign::Right,
        }
    }
    (rest, align)
}

/// Width of a run of glyphs including letter spacing.
pub fn measure(chars: &[char]) -> u32 {
    let glyphs: u32 = chars.iter().map(|&c| glyph_width(c)).sum();
    let gaps = chars
        .windows(2)
        .filter(|w| w[0] != ' ' && w[1] != ' ')
        .count() as u32;
    glyphs + gaps * LETTER_GAP
}

/// Greedy wrap: break at the last space, else hard-break with a continuation hyphen.
pub fn wrap(text: &str, max_width: u32) -> Vec<Vec<char>> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let chars: Vec<char> = paragraph.chars().map(to_upper).collect();
        lines.extend(wrap_paragraph(&chars, max_width));
    }
    lines
}

fn wrap_paragraph(chars: &[char], max_width: u32) -> Vec<Vec<char>> {
    let mut lines: Vec<Vec<char>> = Vec::new();
    let mut cur: Vec<char> = Vec::new();
    for &c in chars {
        if c == ' ' && cur.is_empty() && !lines.is_empty() {
            continue;
        }
        cur.push(c);
        while cur.len() > 1 && measure(&cur) > max_width {
            if let Some(space) = cur.iter().rposition(|&ch| ch == ' ') {
                let rest = cur.split_off(space + 1);
                cur.pop();
                trim_end_spaces(&mut cur);
                if !cur.is_empty() {
                    lines.push(std::mem::take(&mut cur));
                }
                cur = rest;
            } else {
                let mut tail = Vec::new();
                while cur.len() > 1 && measure_hyphenated(&cur) > max_width {
                    if let Some(ch) = cur.pop() {
                        tail.insert(0, ch);
                    }
                }
                if tail.is_empty()
                    && let Some(ch) = cur.pop()
                {
                    tail.push(ch);
                }
                cur.push('-');
                lines.push(std::mem::take(&mut cur));
                cur = tail;
            }
        }
    }
    trim_end_spaces(&mut cur);
    if !cur.is_empty() || lines.is_empty() {
        lines.push(cur);
    }
    lines
}

fn measure_hyphenated(chars: &[char]) -> u32 {
    measure(chars) + LETTER_GAP + glyph_width('-')
}

fn trim_end_spaces(chars: &mut Vec<char>) {
    while chars.last() == Some(&' ') {
        chars.pop();
    }
}

/// Lay out `text` in the 5x5 font inside a `cols` x `rows` fine grid.
///
/// Input is uppercased, `\n` forces a break and trailing alignment suffixes are honored
/// (centered by default). Cells falling outside the grid are dropped; the result is sorted and
/// free of duplicates.
pub fn render_bitmap_text(text: &str, cols: u32, rows: u32) -> Vec<CellCoord> {
    let (body, align) = split_alignment(text);
    if cols == 0 || rows == 0 || body.trim().is_empty() {
        return Vec::new();
    }
    let inner_w = cols.saturating_sub(PADDING * 2).max(1);
    let lines = wrap(body, inner_w);

    let n = lines.len() as u32;
    let block_h = n * GLYPH_HEIGHT + n.saturating_sub(1) * LINE_GAP;
    let top = place(align_v(align.v), rows, block_h);

    let mut out = BTreeSet::new();
    for (i, line) in lines.iter().enumerate() {
        let y0 = top + i64::from(i as u32 * (GLYPH_HEIGHT + LINE_GAP));
        let mut x = place(align_h(align.h), cols, measure(line));
        for (j, &c) in line.iter().enumerate() {
            let glyph = rows_or_box(c);
            for (dy, row) in glyph.iter().enumerate() {
                for (dx, cell) in row.bytes().enumerate() {
                    if cell != b'#' {
                        continue;
                    }
                    let (px, py) = (x + dx as i64, y0 + dy as i64);
                    if let (Ok(px), Ok(py)) = (u32::try_from(px), u32::try_from(py))
                        && px < cols
                        && py < rows
                    {
                        out.insert(CellCoord::new(px, py));
                    }
                }
            }
            x += i64::from(glyph_width(c));
            if line.get(j + 1).is_some_and(|&next| next != ' ') && c != ' ' {
                x += i64::from(LETTER_GAP);
            }
        }
    }
    out.into_iter().collect()
}

#[derive(Clone, Copy)]
enum Edge {
    Start,
    Center,
    End,
}

fn align_h(h: HAlign) -> Edge {
    match h {
        HAlign::Left => Edge::Start,
        HAlign::Center => Edge::Center,
        HAlign::Right => Edge::End,
    }
}

fn align_v(v: VAlign) -> Edge {
    match v {
        VAlign::Top => Edge::Start,
        VAlign::Middle => Edge::Center,
        VAlign::Bottom => Edge::End,
    }
}

fn place(edge: Edge, space: u32, size: u32) -> i64 {
    let (space, size, pad) = (i64::from(space), i64::from(size), i64::from(PADDING));
    match edge {
        Edge::Start => pad,
        Edge::Center => (space - size).div_euclid(2),
        Edge::End => space - pad - size,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/glyph/bitmap.rs"]
mod tests;
