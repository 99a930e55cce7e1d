use crate::editing::buffer::byte_to_point_in_text;

/// Caret movements a front end can request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
    DocumentStart,
    DocumentEnd,
}

/// Where the caret at `offset` ends up after `motion`. Always a char boundary.
pub fn resolve(text: &str, offset: usize, motion: Motion) -> usize {
    let offset = floor_boundary(text, offset.min(text.len()));
    match motion {
        Motion::Left => text[..offset]
            .char_indices()
            .next_back()
            .map_or(0, |(i, _)| i),
        Motion::Right => text[offset..]
            .chars()
            .next()
            .map_or(offset, |c| offset + c.len_utf8()),
        Motion::LineStart => line_start(text, offset),
        Motion::LineEnd => line_end(text, offset),
        Motion::DocumentStart => 0,
        Motion::DocumentEnd => text.len(),
        Motion::Up => {
            let start = line_start(text, offset);
            if start == 0 {
                return 0;
            }
            let (_, column) = byte_to_point_in_text(text, offset);
            let prev_start = line_start(text, start - 1);
            column_on_line(text, prev_start, column)
        }
        Motion::Down => {
            let end = line_end(text, offset);
            if end == text.len() {
                return text.len();
            }
            let (_, column) = byte_to_point_in_text(text, offset);
            column_on_line(text, end + 1, column)
        }
    }
}

fn line_start(text: &str, offset: usize) -> usize {
    text[..offset].rfind('\n').map_or(0, |i| i + 1)
}

fn line_end(text: &str, offset: usize) -> usize {
    text[offset..].find('\n').map_or(text.len(), |i| offset + i)
}

fn column_on_line(text: &str, start: usize, column: usize) -> usize {
    let end = line_end(text, start);
    floor_boundary(text, (start + column).min(end))
}

fn floor_boundary(text: &str, mut offset: usize) -> usize {
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
